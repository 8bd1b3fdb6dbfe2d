//! Fixed-period timer driving a session.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Something polled on every timer tick.
pub trait Tick: Send + Sync + 'static {
    /// Runs one tick.
    fn tick(&self) -> impl Future<Output = ()> + Send;
}

/// Re-armable polling timer.
///
/// At most one timer task exists: [`start`](Self::start) cancels the
/// previous one before arming a new one, so a stale filter is never
/// polled by a leftover timer. The first tick fires immediately. Ticks of
/// one timer run back to back, a slow tick delays the next one instead of
/// overlapping it.
#[derive(Debug)]
pub struct PollScheduler {
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollScheduler {
    /// Creates a stopped scheduler.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: Mutex::new(None),
        }
    }

    /// Polling period.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Cancels any running timer and starts a new one for `target`.
    pub async fn start<T: Tick>(&self, target: Arc<T>) {
        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            previous.abort();
        }
        let interval = self.interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                target.tick().await;
            }
        }));
        tracing::debug!(?interval, "poll timer armed");
    }

    /// Cancels the running timer, if any.
    pub async fn stop(&self) {
        if let Some(previous) = self.task.lock().await.take() {
            previous.abort();
            tracing::debug!("poll timer cancelled");
        }
    }

    /// `true` while a timer task is alive.
    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
