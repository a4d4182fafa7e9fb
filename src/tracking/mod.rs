pub mod error;

use std::sync::Arc;

use tracing::info;

use crate::session::MountSession;
use error::TrackingError;

/// Sidereal tracking switch. Independent of axis motion.
pub struct TrackingController {
    session: Arc<MountSession>,
    enabled: bool,
}

impl TrackingController {
    pub fn new(session: Arc<MountSession>) -> Self {
        Self {
            session,
            enabled: false,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.enabled
    }

    pub async fn set_tracking(&mut self, enabled: bool) -> Result<(), TrackingError> {
        self.session.ensure_connected()?;
        if !self.session.transport().supports_tracking() {
            return Err(TrackingError::Unsupported(
                self.session.device_name().to_string(),
            ));
        }

        self.session
            .command("tracking", move |t| async move { t.set_tracking(enabled).await })
            .await?
            .map_err(|e| TrackingError::CommandFailed(e.to_string()))?;

        self.enabled = enabled;
        info!("Tracking {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }
}
