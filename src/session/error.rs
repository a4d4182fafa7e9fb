use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("mount is not connected")]
    NotConnected,
    #[error("{operation} timed out after {after:?}; connection dropped")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
    #[error("link failure: {0}")]
    LinkFailed(String),
}
