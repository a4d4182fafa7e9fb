use std::{fmt, sync::Arc, time::Duration};

use anyhow::{bail, ensure, Result};
use tracing::debug;

use crate::{
    axis::{state::AxisState, Axis, Direction},
    motion::{error::MotionError, MotionController},
    session::{config::SessionConfig, MountSession},
    status::StatusPoller,
    transport::{config::SimulatorConfig, simulator::SimulatedMount, MountTransport},
};

/// Package and target details printed by `--info`.
pub struct BuildInfo {
    pub package: &'static str,
    pub version: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
    pub profile: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            package: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program: {} v{}", self.package, self.version)?;
        writeln!(f, "Target: {}-{}", self.arch, self.os)?;
        write!(f, "Profile: {}", self.profile)
    }
}

pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

/// Hardware-free checks of the harness against the simulator.
pub async fn run_self_checks() -> Vec<CheckResult> {
    let mut results = Vec::new();
    results.push(record("build metadata", check_build_metadata()));
    results.push(record("simulator", check_simulator().await));
    results.push(record("session round trip", check_session_round_trip().await));
    results.push(record("motion state machine", check_motion().await));
    results
}

fn record(name: &'static str, outcome: Result<String>) -> CheckResult {
    let (passed, detail) = match outcome {
        Ok(detail) => (true, detail),
        Err(e) => (false, format!("{:#}", e)),
    };
    debug!("Self check {}: passed={} {}", name, passed, detail);
    CheckResult {
        name,
        passed,
        detail,
    }
}

fn check_build_metadata() -> Result<String> {
    let info = BuildInfo::current();
    ensure!(!info.version.is_empty(), "package version is empty");
    Ok(format!("{} v{}", info.package, info.version))
}

async fn check_simulator() -> Result<String> {
    let mount = Arc::new(SimulatedMount::new(SimulatorConfig::default()));
    let session = Arc::new(MountSession::new(mount.clone(), SessionConfig::default()));
    session.connect().await?;
    let coordinate = StatusPoller::new(session.clone()).read_status().await?;
    session.disconnect().await?;
    Ok(format!("{} responds at {}", mount.device_name(), coordinate))
}

async fn check_session_round_trip() -> Result<String> {
    let mount = Arc::new(SimulatedMount::new(SimulatorConfig::default()));
    let session = MountSession::new(mount.clone(), SessionConfig::default());
    for _ in 0..2 {
        session.connect().await?;
    }
    ensure!(session.is_connected(), "session not connected");
    for _ in 0..2 {
        session.disconnect().await?;
    }
    ensure!(!session.is_connected(), "session still connected");

    let stats = mount.stats();
    ensure!(
        stats.connect_calls == 1 && stats.disconnect_calls == 1,
        "expected one connect and one disconnect, saw {:?}",
        stats
    );
    Ok("connect/disconnect idempotent".to_string())
}

async fn check_motion() -> Result<String> {
    let mount = Arc::new(SimulatedMount::new(SimulatorConfig::default()));
    let session = Arc::new(MountSession::new(mount, SessionConfig::default()));
    session.connect().await?;
    let mut motion = MotionController::new(session.clone());

    motion.start(Direction::North).await?;
    match motion.start(Direction::North).await {
        Err(MotionError::AlreadyMoving { .. }) => {}
        other => bail!("second start was not rejected: {:?}", other),
    }
    motion.stop(Direction::North).await?;
    motion.pulse(Direction::West, Duration::ZERO).await?;
    motion.abort_all().await?;
    for axis in Axis::ALL {
        ensure!(
            motion.axis_state(axis) == AxisState::Idle,
            "axis {} not idle",
            axis
        );
    }
    session.disconnect().await?;
    Ok("start/stop/abort transitions hold".to_string())
}
