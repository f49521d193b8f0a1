//! Termination request handling
//!
//! Turns SIGINT/SIGTERM/SIGHUP/SIGQUIT (or ctrl-c where those do not exist)
//! into a broadcast the orchestrator can select on, so a kill request becomes
//! an orderly abort instead of an abrupt exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Coordinates orderly shutdown of a run
#[derive(Debug)]
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
    listeners: Vec<JoinHandle<()>>,
}

impl ShutdownCoordinator {
    /// Create a coordinator without any signal listeners attached
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(8);
        Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            listeners: Vec::new(),
        }
    }

    /// Create a coordinator and start listening for termination signals
    ///
    /// Must be called from within a tokio runtime.
    pub fn install() -> Self {
        let mut coordinator = Self::new();
        coordinator.listeners = setup_signal_handlers(
            coordinator.shutdown_tx.clone(),
            coordinator.shutdown_requested.clone(),
        );
        coordinator
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Trigger shutdown
    pub fn trigger_shutdown(&self) {
        self.trigger_handle().trigger();
    }

    /// A handle that can request shutdown from another task
    pub fn trigger_handle(&self) -> ShutdownTrigger {
        ShutdownTrigger {
            shutdown_tx: self.shutdown_tx.clone(),
            shutdown_requested: self.shutdown_requested.clone(),
        }
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Stop listening for signals and give them back their default action
    ///
    /// Aborting the listeners alone would leave tokio's process-wide handler
    /// in place, which swallows any later termination signal.
    pub fn release(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        for listener in self.listeners.drain(..) {
            listener.abort();
        }
        restore_default_handlers();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ShutdownCoordinator {
    fn drop(&mut self) {
        self.release();
    }
}

/// Cloneable shutdown requester
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        // Release pairs with the Acquire load in is_shutdown_requested()
        self.shutdown_requested.store(true, Ordering::Release);
        let _ = self.shutdown_tx.send(());
    }
}

/// Wait until a shutdown is broadcast
///
/// A closed or lagged channel is treated as a request too; the sender only
/// goes away with the coordinator.
pub async fn wait_for_shutdown(shutdown_rx: &mut broadcast::Receiver<()>) {
    let _ = shutdown_rx.recv().await;
}

#[cfg(unix)]
const TERMINATION_SIGNALS: [libc::c_int; 4] = [libc::SIGINT, libc::SIGTERM, libc::SIGHUP, libc::SIGQUIT];

fn restore_default_handlers() {
    #[cfg(unix)]
    for sig in TERMINATION_SIGNALS {
        unsafe {
            libc::signal(sig, libc::SIG_DFL);
        }
    }
}

fn setup_signal_handlers(
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
) -> Vec<JoinHandle<()>> {
    let mut listeners = Vec::new();

    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        use std::sync::atomic::AtomicUsize;
        use tokio::signal::unix::{signal, SignalKind};
        let signal_count = Arc::new(AtomicUsize::new(0));
        let signals = [
            SignalKind::interrupt(),
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ];

        for kind in signals {
            let tx = shutdown_tx.clone();
            let requested = shutdown_requested.clone();
            let sig_ctr = signal_count.clone();

            listeners.push(tokio::spawn(async move {
                if let Ok(mut sig) = signal(kind) {
                    while sig.recv().await.is_some() {
                        let prev = sig_ctr.fetch_add(1, Ordering::AcqRel);
                        requested.store(true, Ordering::Release);
                        let _ = tx.send(());
                        if prev >= 1 {
                            // Second signal while cleanup is still running
                            log::warn!("Repeated termination request; exiting");
                            std::process::exit(130);
                        }
                        log::warn!("Termination requested; aborting run");
                    }
                }
            }));
        }
    }

    #[cfg(not(unix))]
    {
        listeners.push(tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown_requested.store(true, Ordering::Release);
                let _ = shutdown_tx.send(());
            }
        }));
    }

    listeners
}
