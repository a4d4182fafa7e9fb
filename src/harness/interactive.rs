use anyhow::{anyhow, Result};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, warn};

use super::{
    command::{InteractiveCommand, MENU},
    MountHarness,
};
use crate::{
    axis::Direction, motion::error::MotionError, session::error::ConnectionError,
    status::error::StatusError, tracking::error::TrackingError,
};

/// Whether the loop keeps reading keys after a command.
enum Flow {
    Continue,
    Quit,
}

impl<R, W> MountHarness<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Connects, runs the command loop, then disconnects.
    ///
    /// Returns an error if the mount cannot be connected, an abort could
    /// not be delivered, or the connection is lost mid-session; every
    /// other command failure is printed and the loop carries on.
    pub async fn run_interactive(&mut self) -> Result<()> {
        self.console.say("Testing mount connection...").await?;
        if let Err(e) = self.session.connect().await {
            self.console
                .say(format!("ERROR: Failed to connect to mount: {}", e))
                .await?;
            return Err(anyhow!("Failed to connect to mount: {}", e));
        }
        self.console.say("SUCCESS: Connected to mount").await?;

        let result = self.command_loop().await;
        self.cleanup().await;
        result
    }

    /// Reads one key at a time until `q`, end of input, or shutdown.
    pub async fn command_loop(&mut self) -> Result<()> {
        self.print_menu().await?;
        let mut stopped = self.shutdown.subscribe();

        while self.shutdown.is_running() {
            self.console.prompt("Enter command: ").await?;
            let key = tokio::select! {
                key = self.console.next_key() => key?,
                _ = stopped.changed() => {
                    self.console.say("").await?;
                    break;
                }
            };
            let Some(key) = key else {
                self.console.say("").await?;
                break;
            };

            let command = match InteractiveCommand::parse(key) {
                Ok(command) => command,
                Err(e) => {
                    debug!("Ignoring key {:?}", key);
                    self.console.say(e.to_string()).await?;
                    continue;
                }
            };
            if let Flow::Quit = self.dispatch(command).await? {
                break;
            }
        }
        Ok(())
    }

    async fn print_menu(&mut self) -> Result<()> {
        self.console.say("\n=== Interactive Mode ===").await?;
        self.console.say("Commands:").await?;
        for (key, description) in MENU {
            self.console.say(format!("  {} - {}", key, description)).await?;
        }
        Ok(())
    }

    async fn dispatch(&mut self, command: InteractiveCommand) -> Result<Flow> {
        match command {
            InteractiveCommand::Status => self.show_status().await?,
            InteractiveCommand::Pulse(direction) => self.pulse(direction).await?,
            InteractiveCommand::Abort => {
                self.console.say("Aborting all movements...").await?;
                if let Err(e) = self.motion.abort_all().await {
                    error!("Abort failed: {}", e);
                    self.console.say(format!("ERROR: {}", e)).await?;
                    return Err(anyhow!("Abort failed: {}", e));
                }
                self.console.say("All movements aborted").await?;
            }
            InteractiveCommand::ToggleTracking => self.toggle_tracking().await?,
            InteractiveCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn show_status(&mut self) -> Result<()> {
        match self.print_position().await? {
            Ok(_) => Ok(()),
            Err(StatusError::StaleOrUnavailable(reason)) => {
                warn!("No coordinates from mount: {}", reason);
                self.console
                    .say("WARNING: Could not get current coordinates")
                    .await?;
                Ok(())
            }
            Err(StatusError::Connection(e)) => self.connection_lost(e).await,
        }
    }

    async fn pulse(&mut self, direction: Direction) -> Result<()> {
        let duration = self.config.pulse_duration;
        self.console
            .say(format!(
                "Moving {} for {:.1} seconds...",
                direction,
                duration.as_secs_f64()
            ))
            .await?;
        match self.motion.pulse(direction, duration).await {
            Ok(()) => self.console.say(format!("{} pulse done", direction)).await?,
            Err(MotionError::Connection(e)) => return self.connection_lost(e).await,
            Err(e) => self.print_motion_error(&e).await?,
        }
        Ok(())
    }

    async fn toggle_tracking(&mut self) -> Result<()> {
        let enable = !self.tracking.is_tracking();
        self.console
            .say(format!(
                "{} tracking...",
                if enable { "Enabling" } else { "Disabling" }
            ))
            .await?;
        match self.tracking.set_tracking(enable).await {
            Ok(()) => {}
            Err(e @ TrackingError::Unsupported(_)) => {
                warn!("{}", e);
                self.console.say(format!("WARNING: {}", e)).await?;
            }
            Err(TrackingError::Connection(e)) => return self.connection_lost(e).await,
            Err(e) => {
                error!("{}", e);
                self.console.say(format!("ERROR: {}", e)).await?;
            }
        }
        Ok(())
    }

    /// Reports a dropped connection and ends the loop with it.
    async fn connection_lost(&mut self, e: ConnectionError) -> Result<()> {
        error!("Connection lost: {}", e);
        self.console.say(format!("ERROR: {}", e)).await?;
        Err(anyhow!("Connection to mount lost: {}", e))
    }

    /// Usage errors are warnings; anything that reached the mount is an error.
    async fn print_motion_error(&mut self, e: &MotionError) -> Result<()> {
        if e.is_usage_error() {
            warn!("{}", e);
            self.console.say(format!("WARNING: {}", e)).await?;
        } else {
            error!("{}", e);
            self.console.say(format!("ERROR: {}", e)).await?;
        }
        Ok(())
    }
}
