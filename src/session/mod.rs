pub mod config;
pub mod error;

use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tracing::{debug, info, warn};

use crate::transport::MountTransport;
use config::SessionConfig;
use error::ConnectionError;

/// Connection lifecycle of one mount.
///
/// The session is shared between the control flow and the shutdown path,
/// so the connected flag is atomic and both `connect` and `disconnect` are
/// idempotent. A disconnect may race an in-flight motion command; the
/// command then fails with a transport error on its own.
pub struct MountSession {
    transport: Arc<dyn MountTransport>,
    connected: AtomicBool,
    config: SessionConfig,
}

impl MountSession {
    pub fn new(transport: Arc<dyn MountTransport>, config: SessionConfig) -> Self {
        Self {
            transport,
            connected: AtomicBool::new(false),
            config,
        }
    }

    pub fn device_name(&self) -> &str {
        self.transport.device_name()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub async fn connect(&self) -> Result<(), ConnectionError> {
        if self.is_connected() {
            debug!("Already connected to {}", self.device_name());
            return Ok(());
        }

        let transport = self.transport.clone();
        self.bounded("connect", async move { transport.connect().await })
            .await?
            .map_err(|e| ConnectionError::DeviceUnavailable(e.to_string()))?;

        self.connected.store(true, Ordering::SeqCst);
        info!("Connected to {}", self.device_name());
        Ok(())
    }

    /// Best-effort and single-shot: the session counts as disconnected
    /// even when the transport reports a failure.
    pub async fn disconnect(&self) -> Result<(), ConnectionError> {
        if !self.connected.swap(false, Ordering::SeqCst) {
            debug!("Already disconnected from {}", self.device_name());
            return Ok(());
        }

        let transport = self.transport.clone();
        let result = match tokio::time::timeout(self.config.command_timeout, transport.disconnect())
            .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ConnectionError::LinkFailed(e.to_string())),
            Err(_) => {
                self.transport.release();
                Err(ConnectionError::Timeout {
                    operation: "disconnect",
                    after: self.config.command_timeout,
                })
            }
        };

        match &result {
            Ok(()) => info!("Disconnected from {}", self.device_name()),
            Err(e) => warn!("Disconnect from {} was not clean: {}", self.device_name(), e),
        }
        result
    }

    /// Fails with `NotConnected` before touching the transport.
    pub fn ensure_connected(&self) -> Result<(), ConnectionError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ConnectionError::NotConnected)
        }
    }

    /// Runs one transport command against a connected mount.
    ///
    /// The outer error is a connection-level failure (not connected, or the
    /// command exceeded the timeout, which drops the connection). The inner
    /// result is the transport's own answer.
    pub async fn command<T, F, Fut>(
        &self,
        operation: &'static str,
        f: F,
    ) -> Result<anyhow::Result<T>, ConnectionError>
    where
        F: FnOnce(Arc<dyn MountTransport>) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.ensure_connected()?;
        self.bounded(operation, f(self.transport.clone())).await
    }

    pub fn transport(&self) -> &Arc<dyn MountTransport> {
        &self.transport
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<anyhow::Result<T>, ConnectionError> {
        match tokio::time::timeout(self.config.command_timeout, fut).await {
            Ok(result) => Ok(result),
            Err(_) => {
                warn!(
                    "{} on {} timed out after {:?}, dropping connection",
                    operation,
                    self.device_name(),
                    self.config.command_timeout
                );
                self.connected.store(false, Ordering::SeqCst);
                self.transport.release();
                Err(ConnectionError::Timeout {
                    operation,
                    after: self.config.command_timeout,
                })
            }
        }
    }
}

impl Drop for MountSession {
    fn drop(&mut self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            warn!("Session for {} dropped while connected, releasing", self.device_name());
            self.transport.release();
        }
    }
}
