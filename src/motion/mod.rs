pub mod error;

use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{
    axis::{state::AxisState, Axis, Direction, MotionAction},
    session::MountSession,
};
use error::MotionError;

/// Start/stop control of the two mount axes.
///
/// Each axis is a small state machine: `start` is only legal from `Idle`
/// and `stop` only from `Moving` in the same direction. Overlap is ruled
/// out by the state alone; commands are issued one at a time.
pub struct MotionController {
    session: Arc<MountSession>,
    axes: [AxisState; 2],
}

impl MotionController {
    pub fn new(session: Arc<MountSession>) -> Self {
        Self {
            session,
            axes: [AxisState::Idle; 2],
        }
    }

    pub fn axis_state(&self, axis: Axis) -> AxisState {
        self.axes[axis.index()]
    }

    pub async fn start(&mut self, direction: Direction) -> Result<(), MotionError> {
        let axis = direction.axis();
        self.session.ensure_connected()?;

        let current = self.axis_state(axis);
        if current.is_moving() {
            return Err(MotionError::AlreadyMoving { axis, current });
        }

        self.issue(direction, MotionAction::Start).await?;
        self.axes[axis.index()] = AxisState::Moving(direction);
        debug!("Axis {} now {}", axis, self.axes[axis.index()]);
        Ok(())
    }

    pub async fn stop(&mut self, direction: Direction) -> Result<(), MotionError> {
        let axis = direction.axis();
        self.session.ensure_connected()?;

        let current = self.axis_state(axis);
        if current != AxisState::Moving(direction) {
            return Err(MotionError::NotMoving {
                axis,
                requested: direction,
                current,
            });
        }

        self.issue(direction, MotionAction::Stop).await?;
        self.axes[axis.index()] = AxisState::Idle;
        debug!("Axis {} now idle", axis);
        Ok(())
    }

    /// Forces both axes to `Idle` and tells the mount to halt.
    ///
    /// The local state is reset whatever happens; any failure to deliver
    /// the abort is returned to the caller.
    pub async fn abort_all(&mut self) -> Result<(), MotionError> {
        self.axes = [AxisState::Idle; 2];

        let outcome = self
            .session
            .command("abort", |t| async move { t.abort().await })
            .await?;
        outcome.map_err(|e| MotionError::CommandFailed {
            command: "abort".to_string(),
            reason: e.to_string(),
        })?;

        info!("All axes aborted");
        Ok(())
    }

    /// Moves in `direction` for `duration`, then stops.
    ///
    /// The wait holds the control flow, so no other command can be issued
    /// while the pulse is in flight. If the stop is not accepted the pulse
    /// falls back to an abort, so the move never outlives the pulse; the
    /// stop error is still returned.
    pub async fn pulse(
        &mut self,
        direction: Direction,
        duration: Duration,
    ) -> Result<(), MotionError> {
        self.start(direction).await?;
        tokio::time::sleep(duration).await;
        match self.stop(direction).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_usage_error() => {
                warn!("Pulse {} ended early: {}", direction, e);
                Ok(())
            }
            Err(e) => {
                error!("Stop {} failed, aborting all axes: {}", direction, e);
                if let Err(abort) = self.abort_all().await {
                    error!("Abort after failed stop also failed: {}", abort);
                }
                Err(e)
            }
        }
    }

    async fn issue(&self, direction: Direction, action: MotionAction) -> Result<(), MotionError> {
        let command = format!("{} {}", action, direction);
        let outcome = self
            .session
            .command("motion", move |t| async move {
                t.move_axis(direction, action).await
            })
            .await?;
        outcome.map_err(|e| MotionError::CommandFailed {
            command,
            reason: e.to_string(),
        })
    }
}
