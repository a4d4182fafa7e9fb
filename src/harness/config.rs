use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Automated,
    Interactive,
}

pub struct HarnessConfig {
    pub mode: RunMode,
    /// How long a directional pulse keeps the axis moving.
    pub pulse_duration: Duration,
    /// How long the tracking check leaves tracking on before disabling it.
    pub tracking_dwell: Duration,
    pub report_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Automated,
            pulse_duration: Duration::from_secs(1),
            tracking_dwell: Duration::from_secs(2),
            report_path: None,
        }
    }
}
