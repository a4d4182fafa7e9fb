use anyhow::{bail, Result};

use super::{MountStatus, MountTransport};
use crate::axis::{Direction, MotionAction};

/// Transport for a physical device path with no mount backend compiled in.
///
/// Connecting always fails with the device path in the message, which the
/// session reports as an unavailable device.
pub struct UnlinkedDevice {
    path: String,
}

impl UnlinkedDevice {
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

#[async_trait::async_trait]
impl MountTransport for UnlinkedDevice {
    fn device_name(&self) -> &str {
        &self.path
    }

    async fn connect(&self) -> Result<()> {
        bail!(
            "no mount backend is linked for {}; run with --simulate",
            self.path
        )
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    async fn move_axis(&self, direction: Direction, action: MotionAction) -> Result<()> {
        bail!("cannot {} {} on {}: not connected", action, direction, self.path)
    }

    async fn abort(&self) -> Result<()> {
        bail!("cannot abort on {}: not connected", self.path)
    }

    async fn refresh_status(&self) -> Result<MountStatus> {
        bail!("cannot read status from {}: not connected", self.path)
    }

    fn supports_tracking(&self) -> bool {
        false
    }

    async fn set_tracking(&self, _enabled: bool) -> Result<()> {
        bail!("cannot change tracking on {}: not connected", self.path)
    }
}
