//! Error taxonomy for the sync core.
//!
//! Client calls return `Result<Option<T>, ClientError>`: `Ok(Some(v))` is a
//! value, `Ok(None)` is "not found on the remote side", `Err` is transport or
//! an unexpected status. Sentinel substitution (0 / "0") happens in the
//! reconciliation engine, never inside the clients.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(status: reqwest::StatusCode, body: String) -> Self {
        ClientError::Status {
            status: status.as_u16(),
            body,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    /// Source or destination credentials were rejected up front.
    #[error("source credentials rejected")]
    AuthFailure,
    /// Malformed input, rejected before any network call.
    #[error("invalid sync settings: {0}")]
    Settings(&'static str),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("job store error: {0}")]
    Store(#[from] anyhow::Error),
}
