use thiserror::Error;

use crate::session::error::ConnectionError;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("coordinates stale or unavailable: {0}")]
    StaleOrUnavailable(String),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}
