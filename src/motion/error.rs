use thiserror::Error;

use crate::{
    axis::{state::AxisState, Axis, Direction},
    session::error::ConnectionError,
};

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("axis {axis} is already {current}; stop it first")]
    AlreadyMoving { axis: Axis, current: AxisState },
    #[error("cannot stop {requested}: axis {axis} is {current}")]
    NotMoving {
        axis: Axis,
        requested: Direction,
        current: AxisState,
    },
    #[error("{command} failed: {reason}")]
    CommandFailed { command: String, reason: String },
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

impl MotionError {
    /// Usage errors are the caller's mistake and never reach the mount.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            MotionError::AlreadyMoving { .. } | MotionError::NotMoving { .. }
        )
    }
}
