use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Result;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, warn};

use crate::session::MountSession;

/// Process-wide shutdown state shared by the control flow and the signal
/// listener.
///
/// `running` is an atomic flag checked before every prompt; the watch
/// channel wakes a control flow blocked on input. The disconnect requested
/// by a signal runs at most once however many signals arrive.
#[derive(Clone)]
pub struct ShutdownHandle {
    inner: Arc<Inner>,
}

struct Inner {
    running: AtomicBool,
    disconnect_requested: AtomicBool,
    stopped_tx: watch::Sender<bool>,
    session: Arc<MountSession>,
}

impl ShutdownHandle {
    pub fn new(session: Arc<MountSession>) -> Self {
        let (stopped_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                running: AtomicBool::new(true),
                disconnect_requested: AtomicBool::new(false),
                stopped_tx,
                session,
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.stopped_tx.subscribe()
    }

    /// Clears the running flag. Returns true for the first caller only.
    pub fn trigger(&self) -> bool {
        self.inner.running.store(false, Ordering::SeqCst);
        self.inner.stopped_tx.send_replace(true);
        !self.inner.disconnect_requested.swap(true, Ordering::SeqCst)
    }

    /// Signal path: stop the control flow and drop the connection once.
    pub async fn shutdown(&self) {
        if !self.trigger() {
            return;
        }
        if let Err(e) = self.inner.session.disconnect().await {
            warn!("Best-effort disconnect during shutdown failed: {}", e);
        }
    }
}

/// Spawns a task that turns SIGINT/SIGTERM into [`ShutdownHandle::shutdown`].
#[cfg(unix)]
pub fn listen_for_signals(handle: ShutdownHandle) -> Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully"),
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
            }
            handle.shutdown().await;
        }
    }))
}

#[cfg(not(unix))]
pub fn listen_for_signals(handle: ShutdownHandle) -> Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down gracefully");
            handle.shutdown().await;
        }
    }))
}
