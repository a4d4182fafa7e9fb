pub mod config;
pub mod simulator;
pub mod unlinked;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::axis::{Direction, MotionAction};
use config::TransportConfig;
use simulator::SimulatedMount;
use unlinked::UnlinkedDevice;

/// Raw status as reported by the mount framework after a refresh.
///
/// Coordinates are optional: many mounts only report a position after
/// tracking has been enabled or a goto has completed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MountStatus {
    pub ra_hours: Option<f64>,
    pub dec_degrees: Option<f64>,
    pub tracking: bool,
    pub slewing: bool,
}

/// Narrow capability interface onto the mount-control framework.
///
/// Every call blocks (asynchronously) until the framework acknowledges the
/// command. Errors are opaque; the harness layers map them onto its own
/// error taxonomy.
#[async_trait::async_trait]
pub trait MountTransport: Send + Sync {
    fn device_name(&self) -> &str;

    async fn connect(&self) -> anyhow::Result<()>;
    async fn disconnect(&self) -> anyhow::Result<()>;

    /// Synchronous teardown used where awaiting is impossible (drop paths,
    /// timed-out commands). Must not block.
    fn release(&self) {}

    async fn move_axis(&self, direction: Direction, action: MotionAction) -> anyhow::Result<()>;
    async fn abort(&self) -> anyhow::Result<()>;

    async fn refresh_status(&self) -> anyhow::Result<MountStatus>;

    fn supports_tracking(&self) -> bool {
        true
    }

    async fn set_tracking(&self, enabled: bool) -> anyhow::Result<()>;
}

/// Picks the transport for the given configuration.
pub fn open(config: TransportConfig) -> Arc<dyn MountTransport> {
    if config.simulate {
        Arc::new(SimulatedMount::new(config.simulator))
    } else {
        Arc::new(UnlinkedDevice::new(config.device_path))
    }
}
