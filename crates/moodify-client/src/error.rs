use thiserror::Error;

use moodify_shared::ValidationError;
use moodify_store::StoreError;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Input rejected before anything was stored or sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("Server responded {status}: {message}")]
    Status { status: u16, message: String },
}
