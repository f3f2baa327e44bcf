//! Catalog synchronization between a RetailCRM-style source catalog ("Retail")
//! and a ZoneSmart-style marketplace ("Zone").
//!
//! The pipeline fetches products from the source, translates them into the
//! destination listing model, creates the listings (partial success is the
//! steady state), and registers periodic reconciliation jobs that keep price
//! and quantity in step. The source is always authoritative.

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod reconcile;
pub mod retail;
pub mod scheduler;
pub mod store;
pub mod translate;
pub mod zone;
