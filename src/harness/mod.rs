pub mod command;
pub mod config;
pub mod console;
pub mod interactive;
pub mod report;
pub mod selfcheck;
pub mod shutdown;

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, warn};

use crate::{
    axis::Direction,
    motion::MotionController,
    session::MountSession,
    status::{coordinate::Coordinate, coordinate_of, error::StatusError, StatusPoller},
    tracking::{error::TrackingError, TrackingController},
};
use config::HarnessConfig;
use console::Console;
use report::{StepStatus, TestReport};
use shutdown::ShutdownHandle;

/// Report entry recorded when a shutdown signal ends the run early.
const INTERRUPTED: &str = "interrupted";

/// Operator answer to a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirmation {
    Yes,
    No,
    Interrupted,
}

/// Checks of the automated run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Connection,
    Properties,
    Status,
    Abort,
    Movement,
    Tracking,
}

impl Step {
    pub const SEQUENCE: [Step; 6] = [
        Step::Connection,
        Step::Properties,
        Step::Status,
        Step::Abort,
        Step::Movement,
        Step::Tracking,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Connection => "connection",
            Step::Properties => "properties",
            Step::Status => "status",
            Step::Abort => "abort",
            Step::Movement => "movement",
            Step::Tracking => "tracking",
        }
    }
}

/// Context owning everything one harness run touches: the session, both
/// axis state machines, the tracking switch, the status poller and the
/// operator console. Nothing here is global; the signal listener only
/// holds a clone of the [`ShutdownHandle`].
pub struct MountHarness<R, W> {
    session: Arc<MountSession>,
    motion: MotionController,
    tracking: TrackingController,
    status: StatusPoller,
    shutdown: ShutdownHandle,
    console: Console<R, W>,
    config: HarnessConfig,
}

impl<R, W> MountHarness<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        session: Arc<MountSession>,
        shutdown: ShutdownHandle,
        console: Console<R, W>,
        config: HarnessConfig,
    ) -> Self {
        Self {
            motion: MotionController::new(session.clone()),
            tracking: TrackingController::new(session.clone()),
            status: StatusPoller::new(session.clone()),
            session,
            shutdown,
            console,
            config,
        }
    }

    pub fn session(&self) -> &Arc<MountSession> {
        &self.session
    }

    pub fn motion(&self) -> &MotionController {
        &self.motion
    }

    pub fn tracking(&self) -> &TrackingController {
        &self.tracking
    }

    pub fn console(&self) -> &Console<R, W> {
        &self.console
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs the fixed check sequence.
    ///
    /// The first failing step ends the sequence; the mount is disconnected
    /// before the summary is printed whichever way the steps ended.
    pub async fn run_automated(&mut self) -> Result<TestReport> {
        self.console.say("\n=== Running Automated Tests ===").await?;
        let mut report = TestReport::new(self.session.device_name().to_string());

        self.run_steps(&mut report).await;
        self.cleanup().await;
        report.finish();

        self.print_summary(&report).await?;
        Ok(report)
    }

    async fn run_steps(&mut self, report: &mut TestReport) {
        for step in Step::SEQUENCE {
            if !self.shutdown.is_running() {
                warn!("Shutdown requested, abandoning run before {}", step.name());
                report.record(
                    INTERRUPTED,
                    StepStatus::Failed(format!("shutdown signal before {} check", step.name())),
                );
                return;
            }

            let status = match self.run_step(step).await {
                Ok(status) => status,
                Err(e) => {
                    error!("{} check failed: {:#}", step.name(), e);
                    if let Err(say) = self.console.say(format!("ERROR: {:#}", e)).await {
                        debug!("Could not report {} failure: {}", step.name(), say);
                    }
                    StepStatus::Failed(format!("{:#}", e))
                }
            };

            let failed = !status.passed();
            report.record(step.name(), status);
            if failed {
                return;
            }
        }
    }

    async fn run_step(&mut self, step: Step) -> Result<StepStatus> {
        match step {
            Step::Connection => self.check_connection().await,
            Step::Properties => self.check_properties().await,
            Step::Status => self.check_status().await,
            Step::Abort => self.check_abort().await,
            Step::Movement => self.check_movement().await,
            Step::Tracking => self.check_tracking().await,
        }
    }

    async fn check_connection(&mut self) -> Result<StepStatus> {
        self.console.say("Testing mount connection...").await?;
        self.session
            .connect()
            .await
            .map_err(|e| anyhow!("Failed to connect to mount: {}", e))?;
        self.console.say("SUCCESS: Connected to mount").await?;
        Ok(StepStatus::Passed)
    }

    async fn check_properties(&mut self) -> Result<StepStatus> {
        self.console.say("Testing mount properties...").await?;
        let name = self.session.device_name().to_string();
        let shown = if name.is_empty() { "Unknown" } else { &name };
        self.console.say(format!("Mount name: {}", shown)).await?;

        if !self.session.is_connected() {
            bail!("Mount is not connected");
        }
        self.console.say("SUCCESS: Mount properties verified").await?;
        Ok(StepStatus::Passed)
    }

    async fn check_status(&mut self) -> Result<StepStatus> {
        self.console.say("Testing mount status reading...").await?;
        let status = match self.print_position().await? {
            Ok(_) => StepStatus::Passed,
            Err(StatusError::StaleOrUnavailable(reason)) => {
                warn!("No coordinates from mount: {}", reason);
                self.console
                    .say("WARNING: Could not get current coordinates")
                    .await?;
                StepStatus::Warned(reason)
            }
            Err(e @ StatusError::Connection(_)) => {
                bail!("Failed to read scope status: {}", e)
            }
        };
        self.console.say("SUCCESS: Mount status read").await?;
        Ok(status)
    }

    /// Refreshes the mount once and prints its motion flags and position.
    /// Status errors are handed back for the caller to classify.
    async fn print_position(&mut self) -> Result<Result<Coordinate, StatusError>> {
        let status = match self.status.refresh().await {
            Ok(status) => status,
            Err(e) => return Ok(Err(e)),
        };
        self.console
            .say(format!(
                "Mount state - tracking: {}, slewing: {}",
                if status.tracking { "on" } else { "off" },
                if status.slewing { "yes" } else { "no" }
            ))
            .await?;
        let coordinate = coordinate_of(&status);
        if let Ok(coordinate) = &coordinate {
            self.console
                .say(format!("Current position - {}", coordinate))
                .await?;
        }
        Ok(coordinate)
    }

    async fn check_abort(&mut self) -> Result<StepStatus> {
        self.console.say("Testing abort functionality...").await?;
        self.motion
            .abort_all()
            .await
            .map_err(|e| anyhow!("Failed to abort mount operations: {}", e))?;
        self.console.say("SUCCESS: Abort test completed").await?;
        Ok(StepStatus::Passed)
    }

    async fn check_movement(&mut self) -> Result<StepStatus> {
        self.console
            .say("\nWARNING: Movement tests will move the mount!")
            .await?;
        match self.confirm("Do you want to run movement tests? (y/N): ").await? {
            Confirmation::Yes => {}
            Confirmation::No => {
                self.console.say("Skipping movement tests").await?;
                return Ok(StepStatus::Skipped("declined by operator".to_string()));
            }
            Confirmation::Interrupted => {
                return Ok(StepStatus::Skipped(
                    "interrupted by shutdown signal".to_string(),
                ));
            }
        }

        self.console
            .say("Testing mount movement (small movements for safety)...")
            .await?;
        let mut warnings = Vec::new();
        for direction in [Direction::North, Direction::East] {
            self.console
                .say(format!("Testing {} movement...", direction))
                .await?;
            match self.motion.pulse(direction, self.config.pulse_duration).await {
                Ok(()) => {
                    self.console
                        .say(format!("{} movement test completed", direction))
                        .await?
                }
                Err(e) if e.is_usage_error() => {
                    warn!("{} movement skipped: {}", direction, e);
                    warnings.push(e.to_string());
                }
                Err(e) => bail!("Failed {} movement: {}", direction, e),
            }
        }

        self.console.say("SUCCESS: Movement tests completed").await?;
        if warnings.is_empty() {
            Ok(StepStatus::Passed)
        } else {
            Ok(StepStatus::Warned(warnings.join("; ")))
        }
    }

    async fn check_tracking(&mut self) -> Result<StepStatus> {
        self.console.say("Testing tracking functionality...").await?;
        let status = match self.tracking.set_tracking(true).await {
            Ok(()) => {
                self.console.say("Tracking enabled").await?;
                tokio::time::sleep(self.config.tracking_dwell).await;
                match self.tracking.set_tracking(false).await {
                    Ok(()) => {
                        self.console.say("Tracking disabled").await?;
                        StepStatus::Passed
                    }
                    Err(TrackingError::Connection(e)) => {
                        bail!("Lost connection while disabling tracking: {}", e)
                    }
                    Err(e) => {
                        warn!("Failed to disable tracking: {}", e);
                        self.console
                            .say("WARNING: Failed to disable tracking")
                            .await?;
                        StepStatus::Warned(e.to_string())
                    }
                }
            }
            Err(TrackingError::Connection(e)) => {
                bail!("Lost connection while enabling tracking: {}", e)
            }
            Err(e) => {
                warn!("Failed to enable tracking: {}", e);
                self.console
                    .say("WARNING: Failed to enable tracking (may not be supported)")
                    .await?;
                StepStatus::Warned(e.to_string())
            }
        };
        self.console.say("SUCCESS: Tracking test completed").await?;
        Ok(status)
    }

    /// Asks a yes/no question. Anything but `y`/`Y`, end of input
    /// included, is a no; a shutdown while waiting is reported apart.
    async fn confirm(&mut self, question: &str) -> Result<Confirmation> {
        let mut stopped = self.shutdown.subscribe();
        if !self.shutdown.is_running() {
            return Ok(Confirmation::Interrupted);
        }
        self.console.prompt(question).await?;
        let answer = tokio::select! {
            key = self.console.next_key() => Some(key?),
            _ = stopped.changed() => None,
        };
        self.console.discard_pending();
        match answer {
            Some(Some('y' | 'Y')) => Ok(Confirmation::Yes),
            Some(Some(_)) => Ok(Confirmation::No),
            Some(None) => {
                self.console.say("").await?;
                Ok(Confirmation::No)
            }
            None => {
                self.console.say("").await?;
                Ok(Confirmation::Interrupted)
            }
        }
    }

    /// Disconnects if still connected. Failures are logged, not returned.
    pub async fn cleanup(&mut self) {
        if !self.session.is_connected() {
            return;
        }
        if let Err(e) = self.console.say("Disconnecting from mount...").await {
            debug!("Could not announce disconnect: {}", e);
        }
        if let Err(e) = self.session.disconnect().await {
            warn!("Cleanup disconnect failed: {}", e);
        }
    }

    async fn print_summary(&mut self, report: &TestReport) -> Result<()> {
        self.console.say("\n=== Test Results ===").await?;
        for step in &report.steps {
            self.console
                .say(format!("  {:<12} {}", step.name, step.status))
                .await?;
        }
        if report.all_passed() {
            info!("Automated run {} passed", report.run_id);
            self.console.say("\n=== ALL TESTS PASSED ===").await?;
        } else {
            info!("Automated run {} failed", report.run_id);
            self.console.say("\n=== SOME TESTS FAILED ===").await?;
        }
        Ok(())
    }
}
