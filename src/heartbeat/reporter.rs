//! Periodic progress pushes

use super::metrics::Metrics;
use super::signals::{progress_payload, SignalClient, SignalContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Shortest allowed push interval
pub const MIN_INTERVAL_SECONDS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterState {
    Idle,
    Running,
    Stopped,
}

/// Background task pushing `progress` signals on a fixed interval
pub struct HeartbeatReporter {
    signals: SignalClient,
    context: SignalContext,
    metrics: Arc<Metrics>,
    interval: Duration,
    push_timeout: Duration,
    state: ReporterState,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatReporter {
    pub fn new(
        signals: SignalClient,
        context: SignalContext,
        metrics: Arc<Metrics>,
        interval_seconds: u64,
        push_timeout: Duration,
    ) -> Self {
        Self {
            signals,
            context,
            metrics,
            interval: Duration::from_secs(interval_seconds.max(MIN_INTERVAL_SECONDS)),
            push_timeout,
            state: ReporterState::Idle,
            stop_tx: None,
            task: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> ReporterState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Begin periodic pushes
    ///
    /// Without a signal URL there is nowhere to report and the reporter stays
    /// idle. Calling it again while running does nothing.
    pub fn start(&mut self) {
        if self.state != ReporterState::Idle || !self.signals.is_configured() {
            return;
        }

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let signals = self.signals.clone();
        let context = self.context.clone();
        let metrics = self.metrics.clone();
        let period = self.interval;
        let push_timeout = self.push_timeout;

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let payload = progress_payload(&context, &metrics);
                        signals.notify(&payload, push_timeout).await;
                    }
                }
            }
        });

        log::debug!("heartbeat started, interval {:?}", self.interval);
        self.stop_tx = Some(stop_tx);
        self.task = Some(task);
        self.state = ReporterState::Running;
    }

    /// Stop the timer and push one final heartbeat
    ///
    /// The final push happens after the background task has finished, so the
    /// phase it carries is the last one the control plane sees from this
    /// reporter. Stopping twice is a no-op.
    pub async fn stop(&mut self) {
        if self.state == ReporterState::Stopped {
            return;
        }
        self.state = ReporterState::Stopped;

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::debug!("heartbeat task ended abnormally: {}", e);
            }
        }

        let payload = progress_payload(&self.context, &self.metrics);
        self.signals.notify(&payload, self.push_timeout).await;
    }
}

impl Drop for HeartbeatReporter {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
