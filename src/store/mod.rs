//! Job-record store: entity model and SQL repository.
//!
//! This module is split into two submodules:
//! - `model`: the typed job record returned by the repository.
//! - `repo`: SQL-only functions that map rows into entities.
//!
//! External modules should import from `zonesync::store`; the repository API
//! and the record type are re-exported for convenience.

pub mod model;
pub mod repo;

pub use model::JobRecord;
pub use repo::*;
