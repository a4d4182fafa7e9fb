use std::time::Duration;

pub const DEFAULT_DEVICE_PATH: &str = "/dev/ttyUSB0";

pub struct TransportConfig {
    pub simulate: bool,
    pub device_path: String,
    pub simulator: SimulatorConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            simulate: false,
            device_path: DEFAULT_DEVICE_PATH.to_string(),
            simulator: SimulatorConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub device_name: String,
    /// Manual slew speed on both axes.
    pub slew_rate_deg_per_sec: f64,
    pub supports_tracking: bool,
    /// Report a position fix as soon as the mount is connected. When false
    /// the mount stays silent until tracking has been enabled once.
    pub fix_on_connect: bool,
    pub park_ra_hours: f64,
    pub park_dec_degrees: f64,
    pub faults: SimulatorFaults,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            device_name: "Mount Simulator".to_string(),
            slew_rate_deg_per_sec: 0.5,
            supports_tracking: true,
            fix_on_connect: true,
            park_ra_hours: 0.0,
            park_dec_degrees: 90.0,
            faults: SimulatorFaults::default(),
        }
    }
}

/// Failures the simulator injects on request.
#[derive(Debug, Clone, Default)]
pub struct SimulatorFaults {
    pub refuse_connect: bool,
    pub fail_abort: bool,
    pub fail_motion: bool,
    /// Only stop commands are rejected; starts still go through.
    pub fail_stop: bool,
    pub fail_tracking: bool,
    /// Every motion command hangs for this long before acknowledging.
    pub command_delay: Option<Duration>,
}
