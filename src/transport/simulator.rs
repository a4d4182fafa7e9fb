use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Result};
use tokio::{sync::RwLock, time::Instant};
use tracing::{debug, info};

use super::{
    config::{SimulatorConfig, SimulatorFaults},
    MountStatus, MountTransport,
};
use crate::axis::{Axis, Direction, MotionAction};

/// In-process stand-in for the mount-control framework.
///
/// Slews are integrated into the reported coordinates at the configured
/// rate, so a status read after a pulse shows the mount has moved.
pub struct SimulatedMount {
    config: SimulatorConfig,
    model: RwLock<MountModel>,
    counters: Counters,
}

struct MountModel {
    connected: bool,
    has_fix: bool,
    tracking: bool,
    ra_hours: f64,
    dec_degrees: f64,
    slews: [Option<(Direction, Instant)>; 2],
}

#[derive(Default)]
struct Counters {
    connect: AtomicUsize,
    disconnect: AtomicUsize,
    motion: AtomicUsize,
    abort: AtomicUsize,
    tracking: AtomicUsize,
    refresh: AtomicUsize,
}

/// Number of calls the simulator has accepted, per command kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulatorStats {
    pub connect_calls: usize,
    pub disconnect_calls: usize,
    pub motion_commands: usize,
    pub abort_calls: usize,
    pub tracking_calls: usize,
    pub refresh_calls: usize,
}

impl SimulatedMount {
    pub fn new(config: SimulatorConfig) -> Self {
        let model = MountModel {
            connected: false,
            has_fix: false,
            tracking: false,
            ra_hours: config.park_ra_hours,
            dec_degrees: config.park_dec_degrees,
            slews: [None, None],
        };
        Self {
            config,
            model: RwLock::new(model),
            counters: Counters::default(),
        }
    }

    pub fn with_faults(mut self, faults: SimulatorFaults) -> Self {
        self.config.faults = faults;
        self
    }

    pub fn stats(&self) -> SimulatorStats {
        SimulatorStats {
            connect_calls: self.counters.connect.load(Ordering::SeqCst),
            disconnect_calls: self.counters.disconnect.load(Ordering::SeqCst),
            motion_commands: self.counters.motion.load(Ordering::SeqCst),
            abort_calls: self.counters.abort.load(Ordering::SeqCst),
            tracking_calls: self.counters.tracking.load(Ordering::SeqCst),
            refresh_calls: self.counters.refresh.load(Ordering::SeqCst),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.model.read().await.connected
    }

    pub async fn is_slewing(&self, axis: Axis) -> bool {
        self.model.read().await.slews[axis.index()].is_some()
    }

    pub async fn is_tracking(&self) -> bool {
        self.model.read().await.tracking
    }

    fn faults(&self) -> &SimulatorFaults {
        &self.config.faults
    }
}

impl MountModel {
    /// Folds elapsed slew time into the coordinates and restarts the clocks.
    fn integrate(&mut self, rate_deg_per_sec: f64) {
        let now = Instant::now();
        for slew in self.slews.iter_mut().flatten() {
            let (direction, since) = *slew;
            let degrees = rate_deg_per_sec * now.duration_since(since).as_secs_f64();
            match direction {
                Direction::North => self.dec_degrees = (self.dec_degrees + degrees).min(90.0),
                Direction::South => self.dec_degrees = (self.dec_degrees - degrees).max(-90.0),
                Direction::East => {
                    self.ra_hours = (self.ra_hours + degrees / 15.0).rem_euclid(24.0)
                }
                Direction::West => {
                    self.ra_hours = (self.ra_hours - degrees / 15.0).rem_euclid(24.0)
                }
            }
            slew.1 = now;
        }
    }

    fn halt(&mut self, rate_deg_per_sec: f64) {
        self.integrate(rate_deg_per_sec);
        self.slews = [None, None];
    }
}

#[async_trait::async_trait]
impl MountTransport for SimulatedMount {
    fn device_name(&self) -> &str {
        &self.config.device_name
    }

    async fn connect(&self) -> Result<()> {
        self.counters.connect.fetch_add(1, Ordering::SeqCst);
        if self.faults().refuse_connect {
            bail!("{} refused the connection", self.config.device_name);
        }
        let mut model = self.model.write().await;
        model.connected = true;
        if self.config.fix_on_connect {
            model.has_fix = true;
        }
        info!("Simulated mount {} connected", self.config.device_name);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.counters.disconnect.fetch_add(1, Ordering::SeqCst);
        let mut model = self.model.write().await;
        model.halt(self.config.slew_rate_deg_per_sec);
        model.tracking = false;
        model.connected = false;
        info!("Simulated mount {} disconnected", self.config.device_name);
        Ok(())
    }

    fn release(&self) {
        if let Ok(mut model) = self.model.try_write() {
            model.slews = [None, None];
            model.tracking = false;
            model.connected = false;
        }
    }

    async fn move_axis(&self, direction: Direction, action: MotionAction) -> Result<()> {
        self.counters.motion.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.faults().command_delay {
            tokio::time::sleep(delay).await;
        }
        let rejected = self.faults().fail_motion
            || (self.faults().fail_stop && action == MotionAction::Stop);
        if rejected {
            bail!("motion command {} {} rejected", action, direction);
        }

        let mut model = self.model.write().await;
        if !model.connected {
            bail!("mount is not connected");
        }
        model.integrate(self.config.slew_rate_deg_per_sec);
        let slot = &mut model.slews[direction.axis().index()];
        match action {
            MotionAction::Start => *slot = Some((direction, Instant::now())),
            MotionAction::Stop => *slot = None,
        }
        debug!("Simulated {} {} on axis {}", action, direction, direction.axis());
        Ok(())
    }

    async fn abort(&self) -> Result<()> {
        self.counters.abort.fetch_add(1, Ordering::SeqCst);
        if self.faults().fail_abort {
            bail!("abort command was not acknowledged");
        }
        let mut model = self.model.write().await;
        if !model.connected {
            bail!("mount is not connected");
        }
        model.halt(self.config.slew_rate_deg_per_sec);
        Ok(())
    }

    async fn refresh_status(&self) -> Result<MountStatus> {
        self.counters.refresh.fetch_add(1, Ordering::SeqCst);
        let mut model = self.model.write().await;
        if !model.connected {
            bail!("mount is not connected");
        }
        model.integrate(self.config.slew_rate_deg_per_sec);
        let (ra_hours, dec_degrees) = if model.has_fix {
            (Some(model.ra_hours), Some(model.dec_degrees))
        } else {
            (None, None)
        };
        Ok(MountStatus {
            ra_hours,
            dec_degrees,
            tracking: model.tracking,
            slewing: model.slews.iter().any(Option::is_some),
        })
    }

    fn supports_tracking(&self) -> bool {
        self.config.supports_tracking
    }

    async fn set_tracking(&self, enabled: bool) -> Result<()> {
        self.counters.tracking.fetch_add(1, Ordering::SeqCst);
        if !self.config.supports_tracking {
            bail!("tracking is not supported by {}", self.config.device_name);
        }
        if self.faults().fail_tracking {
            bail!("tracking command was rejected");
        }
        let mut model = self.model.write().await;
        if !model.connected {
            bail!("mount is not connected");
        }
        model.tracking = enabled;
        if enabled {
            model.has_fix = true;
        }
        Ok(())
    }
}
