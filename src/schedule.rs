//! Scheduled callbacks owned by the engines.
//!
//! Every engine that needs a periodic callback owns exactly one [`RepeatingTask`] (or none).
//! Cancellation is by [`CancellationToken`]: the tick body receives the token and must
//! re-check it after taking the engine's state lock, so once a caller has cancelled the task
//! under that lock no stale tick can touch the state again.
//!
//! Dropping a task only cancels its token. That keeps it safe for a tick body to drop its own
//! task (a countdown reaching zero) and keep running to the end of the current tick.
//! [`RepeatingTask::cancel`] additionally aborts the tokio task and must only be called from
//! outside the tick.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const ENABLE_LOGS: bool = false;

use crate::log_debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

/// A fixed-period callback; the first tick fires one period after spawning.
pub struct RepeatingTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl RepeatingTask {
    pub fn spawn<F, Fut>(label: &'static str, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = TickFlow> + Send + 'static,
    {
        let token = CancellationToken::new();
        let loop_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    _ = interval.tick() => {
                        if on_tick(loop_token.clone()).await == TickFlow::Stop {
                            break;
                        }
                    }
                }
            }

            log_debug!("{label} ticker exited");
        });

        log_debug!("{label} ticker spawned ({}ms)", period.as_millis());

        Self { token, handle }
    }

    /// Cancels the token and aborts the task. Never call this from inside the task's own tick.
    pub fn cancel(&self) {
        self.token.cancel();
        self.handle.abort();
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// A cancellable one-shot callback (auto-dismiss, debounce, fallback lookups).
pub struct DelayedTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl DelayedTask {
    pub fn spawn<F, Fut>(delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = task_token.cancelled() => {}
                _ = time::sleep(delay) => on_fire(task_token).await,
            }
        });

        Self { token, handle }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for DelayedTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let task = RepeatingTask::spawn("test", Duration::from_secs(1), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                TickFlow::Continue
            }
        });

        time::sleep(Duration::from_millis(999)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_millis(2_010)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_further_ticks() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let task = RepeatingTask::spawn("test", Duration::from_millis(10), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                TickFlow::Continue
            }
        });

        time::sleep(Duration::from_millis(55)).await;
        task.cancel();
        let seen = count.load(Ordering::SeqCst);
        assert_eq!(seen, 5);

        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_flow_ends_the_loop() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let _task = RepeatingTask::spawn("test", Duration::from_millis(100), move |_| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                    TickFlow::Stop
                } else {
                    TickFlow::Continue
                }
            }
        });

        time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_task_stops_ticking() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let task = RepeatingTask::spawn("test", Duration::from_millis(100), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                TickFlow::Continue
            }
        });

        time::sleep(Duration::from_millis(150)).await;
        drop(task);
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_task_fires_once_unless_cancelled() {
        let fired = Arc::new(AtomicU32::new(0));

        let flag = fired.clone();
        let task = DelayedTask::spawn(Duration::from_secs(30), move |_| async move {
            flag.fetch_add(1, Ordering::SeqCst);
        });
        time::sleep(Duration::from_secs(31)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        drop(task);

        let flag = fired.clone();
        let cancelled = DelayedTask::spawn(Duration::from_secs(30), move |_| async move {
            flag.fetch_add(1, Ordering::SeqCst);
        });
        time::sleep(Duration::from_secs(10)).await;
        cancelled.cancel();
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
