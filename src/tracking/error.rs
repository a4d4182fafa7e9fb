use thiserror::Error;

use crate::session::error::ConnectionError;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("tracking is not supported by {0}")]
    Unsupported(String),
    #[error("tracking command failed: {0}")]
    CommandFailed(String),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}
