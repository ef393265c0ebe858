//! Cancellable interval tasks.
//!
//! A [`PeriodicTask`] runs a callback on a fixed interval on the tokio
//! runtime until it is stopped. The stop signal is checked alongside every
//! tick, so the loop exits within one interval of [`PeriodicTask::stop`]
//! and never while the callback is running.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Handle to a running periodic task.
///
/// Dropping the handle also stops the task.
pub struct PeriodicTask {
    name: &'static str,
    stop_tx: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawn `tick` to run every `period`, first run one period from now.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn spawn<F>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        assert!(!period.is_zero(), "periodic task `{}` needs a non-zero period", name);

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let first_tick = Instant::now() + period;

        let join = tokio::spawn(async move {
            let mut ticker = time::interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::debug!(task = name, ?period, "Periodic task started");
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => tick(),
                }
            }
            tracing::debug!(task = name, "Periodic task stopped");
        });

        Self {
            name,
            stop_tx: Some(stop_tx),
            join: Some(join),
        }
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                tracing::error!(task = self.name, error = %e, "Periodic task panicked");
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}
