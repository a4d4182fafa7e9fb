use std::{sync::Arc, time::Duration};

use anyhow::Result;
use mount_harness::{
    axis::{state::AxisState, Axis, Direction, MotionAction},
    harness::{
        config::HarnessConfig,
        console::Console,
        report::StepStatus,
        shutdown::ShutdownHandle,
        MountHarness,
    },
    motion::MotionController,
    session::{config::SessionConfig, MountSession},
    status::StatusPoller,
    transport::{
        config::{SimulatorConfig, SimulatorFaults},
        simulator::SimulatedMount,
        MountStatus, MountTransport,
    },
};
use tokio::io::{AsyncRead, AsyncWrite};

fn fast_config() -> HarnessConfig {
    HarnessConfig {
        pulse_duration: Duration::from_millis(5),
        tracking_dwell: Duration::from_millis(5),
        ..HarnessConfig::default()
    }
}

fn build<R, W>(
    transport: Arc<dyn MountTransport>,
    session_config: SessionConfig,
    input: R,
    output: W,
) -> (MountHarness<R, W>, ShutdownHandle)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let session = Arc::new(MountSession::new(transport, session_config));
    let shutdown = ShutdownHandle::new(session.clone());
    let harness = MountHarness::new(
        session,
        shutdown.clone(),
        Console::new(input, output),
        fast_config(),
    );
    (harness, shutdown)
}

fn with_input(
    transport: Arc<dyn MountTransport>,
    input: &'static [u8],
) -> (MountHarness<&'static [u8], Vec<u8>>, ShutdownHandle) {
    build(transport, SessionConfig::default(), input, Vec::new())
}

fn simulator(faults: SimulatorFaults) -> Arc<SimulatedMount> {
    Arc::new(SimulatedMount::new(SimulatorConfig::default()).with_faults(faults))
}

fn transcript<R>(harness: &MountHarness<R, Vec<u8>>) -> String
where
    R: AsyncRead + Unpin,
{
    String::from_utf8_lossy(harness.console().output()).into_owned()
}

/// Simulated mount whose tracking command never returns.
struct StuckTracking(SimulatedMount);

#[async_trait::async_trait]
impl MountTransport for StuckTracking {
    fn device_name(&self) -> &str {
        self.0.device_name()
    }

    async fn connect(&self) -> Result<()> {
        self.0.connect().await
    }

    async fn disconnect(&self) -> Result<()> {
        self.0.disconnect().await
    }

    fn release(&self) {
        self.0.release()
    }

    async fn move_axis(&self, direction: Direction, action: MotionAction) -> Result<()> {
        self.0.move_axis(direction, action).await
    }

    async fn abort(&self) -> Result<()> {
        self.0.abort().await
    }

    async fn refresh_status(&self) -> Result<MountStatus> {
        self.0.refresh_status().await
    }

    async fn set_tracking(&self, _enabled: bool) -> Result<()> {
        futures::future::pending().await
    }
}

#[tokio::test]
async fn test_full_run_with_movement_passes() {
    let mount = simulator(SimulatorFaults::default());
    let (mut harness, _) = with_input(mount.clone(), &b"y\n"[..]);

    let report = harness.run_automated().await.unwrap();

    assert!(report.all_passed(), "{:?}", report.steps);
    assert_eq!(
        report.outcomes(),
        vec![
            ("connection", true),
            ("properties", true),
            ("status", true),
            ("abort", true),
            ("movement", true),
            ("tracking", true),
        ]
    );
    assert_eq!(mount.stats().motion_commands, 4);
    assert_eq!(mount.stats().disconnect_calls, 1);
    assert!(!harness.session().is_connected());

    let out = transcript(&harness);
    assert!(out.contains("Current position - RA: 00:00:00, DEC: 90:00:00"));
    assert!(out.contains("=== ALL TESTS PASSED ==="));
}

#[tokio::test]
async fn test_connection_failure_skips_everything_else() {
    let mount = simulator(SimulatorFaults {
        refuse_connect: true,
        ..SimulatorFaults::default()
    });
    let (mut harness, _) = with_input(mount.clone(), &b"y\n"[..]);

    let report = harness.run_automated().await.unwrap();

    assert!(!report.all_passed());
    assert_eq!(report.outcomes(), vec![("connection", false)]);
    let stats = mount.stats();
    assert_eq!(stats.refresh_calls, 0);
    assert_eq!(stats.abort_calls, 0);
    assert_eq!(stats.motion_commands, 0);
    assert_eq!(stats.tracking_calls, 0);
    assert!(!harness.session().is_connected());
    assert!(transcript(&harness).contains("=== SOME TESTS FAILED ==="));
}

#[tokio::test]
async fn test_abort_failure_still_disconnects() {
    let mount = simulator(SimulatorFaults {
        fail_abort: true,
        ..SimulatorFaults::default()
    });
    let (mut harness, _) = with_input(mount.clone(), &b"y\n"[..]);

    let report = harness.run_automated().await.unwrap();

    assert!(!report.all_passed());
    assert!(matches!(
        report.step("abort").map(|s| &s.status),
        Some(StepStatus::Failed(_))
    ));
    assert!(report.step("movement").is_none());
    assert!(report.step("tracking").is_none());
    assert_eq!(mount.stats().motion_commands, 0);
    assert_eq!(mount.stats().disconnect_calls, 1);
    assert!(!mount.is_connected().await);
}

#[tokio::test]
async fn test_declined_movement_is_skipped() {
    let mount = simulator(SimulatorFaults::default());
    let (mut harness, _) = with_input(mount.clone(), &b"N\n"[..]);

    let report = harness.run_automated().await.unwrap();

    assert!(report.all_passed());
    assert!(matches!(
        report.step("movement").map(|s| &s.status),
        Some(StepStatus::Skipped(_))
    ));
    assert!(report.step("tracking").is_some());
    assert_eq!(mount.stats().motion_commands, 0);
    assert!(transcript(&harness).contains("Skipping movement tests"));
}

#[tokio::test]
async fn test_no_answer_declines_movement() {
    let mount = simulator(SimulatorFaults::default());
    let (mut harness, _) = with_input(mount.clone(), &b""[..]);

    let report = harness.run_automated().await.unwrap();

    assert!(report.all_passed());
    assert_eq!(mount.stats().motion_commands, 0);
}

#[tokio::test]
async fn test_unsupported_tracking_is_a_warning() {
    let mount = Arc::new(SimulatedMount::new(SimulatorConfig {
        supports_tracking: false,
        ..SimulatorConfig::default()
    }));
    let (mut harness, _) = with_input(mount, &b"n\n"[..]);

    let report = harness.run_automated().await.unwrap();

    assert!(report.all_passed());
    assert!(matches!(
        report.step("tracking").map(|s| &s.status),
        Some(StepStatus::Warned(_))
    ));
    assert!(transcript(&harness).contains("may not be supported"));
}

#[tokio::test]
async fn test_missing_fix_is_a_warning() {
    let mount = Arc::new(SimulatedMount::new(SimulatorConfig {
        fix_on_connect: false,
        ..SimulatorConfig::default()
    }));
    let (mut harness, _) = with_input(mount, &b"n\n"[..]);

    let report = harness.run_automated().await.unwrap();

    assert!(report.all_passed());
    assert!(matches!(
        report.step("status").map(|s| &s.status),
        Some(StepStatus::Warned(_))
    ));
    assert!(transcript(&harness).contains("WARNING: Could not get current coordinates"));
}

#[tokio::test]
async fn test_tracking_connection_loss_fails_run() {
    let mount = Arc::new(StuckTracking(SimulatedMount::new(SimulatorConfig::default())));
    let session_config = SessionConfig {
        command_timeout: Duration::from_millis(50),
    };
    let (mut harness, _) = build(mount.clone(), session_config, &b"n\n"[..], Vec::new());

    let report = harness.run_automated().await.unwrap();

    assert!(!report.all_passed());
    assert!(matches!(
        report.step("tracking").map(|s| &s.status),
        Some(StepStatus::Failed(_))
    ));
    assert!(!mount.0.is_connected().await);
}

#[tokio::test]
async fn test_movement_timeout_fails_run() {
    let mount = simulator(SimulatorFaults {
        command_delay: Some(Duration::from_millis(200)),
        ..SimulatorFaults::default()
    });
    let session_config = SessionConfig {
        command_timeout: Duration::from_millis(50),
    };
    let (mut harness, _) = build(mount.clone(), session_config, &b"y\n"[..], Vec::new());

    let report = harness.run_automated().await.unwrap();

    assert!(!report.all_passed());
    assert!(matches!(
        report.step("movement").map(|s| &s.status),
        Some(StepStatus::Failed(_))
    ));
    assert!(report.step("tracking").is_none());
}

#[tokio::test]
async fn test_shutdown_before_run_is_interrupted() {
    let mount = simulator(SimulatorFaults::default());
    let (mut harness, shutdown) = with_input(mount.clone(), &b"y\n"[..]);
    shutdown.shutdown().await;

    let report = harness.run_automated().await.unwrap();

    assert!(!report.all_passed());
    assert_eq!(report.outcomes(), vec![("interrupted", false)]);
    assert_eq!(mount.stats().connect_calls, 0);
}

#[tokio::test]
async fn test_shutdown_during_movement_prompt_is_recorded_once() {
    let mount = simulator(SimulatorFaults::default());
    // The writer half stays open, so the movement question never gets an answer.
    let (_keyboard, input) = tokio::io::duplex(64);
    let (mut harness, shutdown) =
        build(mount.clone(), SessionConfig::default(), input, Vec::new());

    let signal = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.shutdown().await;
    };
    let (report, ()) = tokio::join!(harness.run_automated(), signal);
    let report = report.unwrap();

    assert_eq!(
        report.outcomes(),
        vec![
            ("connection", true),
            ("properties", true),
            ("status", true),
            ("abort", true),
            ("movement", true),
            ("interrupted", false),
        ]
    );
    assert!(matches!(
        report.step("movement").map(|s| &s.status),
        Some(StepStatus::Skipped(reason)) if reason.contains("shutdown")
    ));
    assert!(report.step("tracking").is_none());
    assert!(!report.all_passed());

    let stats = mount.stats();
    assert_eq!(stats.motion_commands, 0);
    assert_eq!(stats.tracking_calls, 0);
    assert_eq!(stats.disconnect_calls, 1);
    assert!(!transcript(&harness).contains("Skipping movement tests"));
}

#[tokio::test]
async fn test_pulse_and_abort_scenario() {
    let mount = Arc::new(SimulatedMount::new(SimulatorConfig::default()));
    let session = Arc::new(MountSession::new(mount.clone(), SessionConfig::default()));
    let mut motion = MotionController::new(session.clone());
    let status = StatusPoller::new(session.clone());

    session.connect().await.unwrap();
    let before = status.read_status().await.unwrap();
    assert_eq!(before.dec_degrees(), 90.0);

    motion.start(Direction::North).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    motion.stop(Direction::North).await.unwrap();
    assert_eq!(motion.axis_state(Axis::NorthSouth), AxisState::Idle);

    motion.abort_all().await.unwrap();
    assert_eq!(motion.axis_state(Axis::NorthSouth), AxisState::Idle);
    assert_eq!(motion.axis_state(Axis::EastWest), AxisState::Idle);

    session.disconnect().await.unwrap();
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_interactive_unknown_key_changes_nothing() {
    let mount = simulator(SimulatorFaults::default());
    let (mut harness, _) = with_input(mount.clone(), &b"x\nq\n"[..]);

    harness.run_interactive().await.unwrap();

    let out = transcript(&harness);
    assert!(out.contains("Unknown command: x"));
    assert_eq!(out.matches("Enter command: ").count(), 2);
    assert_eq!(harness.motion().axis_state(Axis::NorthSouth), AxisState::Idle);
    assert_eq!(harness.motion().axis_state(Axis::EastWest), AxisState::Idle);
    assert!(!harness.tracking().is_tracking());
    let stats = mount.stats();
    assert_eq!(stats.motion_commands, 0);
    assert_eq!(stats.tracking_calls, 0);
    assert_eq!(stats.abort_calls, 0);
}

#[tokio::test]
async fn test_interactive_commands() {
    let mount = simulator(SimulatorFaults::default());
    let (mut harness, _) = with_input(mount.clone(), &b"s\nn S\ne w\nt\na\nq\n"[..]);

    harness.run_interactive().await.unwrap();

    let stats = mount.stats();
    assert_eq!(stats.motion_commands, 8);
    assert_eq!(stats.tracking_calls, 1);
    assert_eq!(stats.abort_calls, 1);
    assert!(harness.tracking().is_tracking());
    assert!(!harness.session().is_connected());

    let out = transcript(&harness);
    assert!(out.contains("Mount state - tracking: off, slewing: no"));
    assert!(out.contains("Current position - "));
    assert!(out.contains("Moving South for 0.0 seconds..."));
    assert!(out.contains("Enabling tracking..."));
    assert!(out.contains("All movements aborted"));
}

#[tokio::test]
async fn test_interactive_abort_failure_ends_session() {
    let mount = simulator(SimulatorFaults {
        fail_abort: true,
        ..SimulatorFaults::default()
    });
    let (mut harness, _) = with_input(mount.clone(), &b"a\ns\nq\n"[..]);

    assert!(harness.run_interactive().await.is_err());
    assert_eq!(mount.stats().refresh_calls, 0);
    assert!(!harness.session().is_connected());
}

#[tokio::test]
async fn test_interactive_timeout_ends_session() {
    let mount = simulator(SimulatorFaults {
        command_delay: Some(Duration::from_millis(200)),
        ..SimulatorFaults::default()
    });
    let session_config = SessionConfig {
        command_timeout: Duration::from_millis(50),
    };
    let (mut harness, _) = build(mount.clone(), session_config, &b"n
s
q
"[..], Vec::new());

    assert!(harness.run_interactive().await.is_err());
    assert_eq!(mount.stats().refresh_calls, 0);
    assert!(!harness.session().is_connected());
    assert_eq!(transcript(&harness).matches("Enter command: ").count(), 1);
}

#[tokio::test]
async fn test_interactive_needs_connection() {
    let mount = simulator(SimulatorFaults {
        refuse_connect: true,
        ..SimulatorFaults::default()
    });
    let (mut harness, _) = with_input(mount, &b"s\nq\n"[..]);

    assert!(harness.run_interactive().await.is_err());
    assert!(!transcript(&harness).contains("Enter command: "));
}

#[tokio::test]
async fn test_signals_stop_interactive_loop_and_disconnect_once() {
    let mount = simulator(SimulatorFaults::default());
    // The writer half stays open, so the loop blocks waiting for a key.
    let (_keyboard, input) = tokio::io::duplex(64);
    let (mut harness, shutdown) =
        build(mount.clone(), SessionConfig::default(), input, Vec::new());

    let signals = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        for _ in 0..3 {
            shutdown.shutdown().await;
        }
    };
    let (result, ()) = tokio::join!(harness.run_interactive(), signals);

    result.unwrap();
    assert!(!shutdown.is_running());
    assert!(!harness.session().is_connected());
    assert_eq!(mount.stats().disconnect_calls, 1);
    assert_eq!(transcript(&harness).matches("Enter command: ").count(), 1);
}
