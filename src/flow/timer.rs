use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

/// One-second countdown that fires an expiry callback exactly once.
pub struct Countdown {
    task: Option<JoinHandle<()>>,
    live: Arc<AtomicBool>,
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            task: None,
            live: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Count down from `duration_secs`, calling `on_tick(remaining)` every
    /// second and `on_expire` once `remaining` reaches zero.
    ///
    /// A running countdown is stopped first. Must be called from within a
    /// tokio runtime.
    pub fn start<T, E>(&mut self, duration_secs: u32, on_tick: T, on_expire: E)
    where
        T: Fn(u32) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        self.stop();

        let live = Arc::new(AtomicBool::new(true));
        self.live = Arc::clone(&live);

        debug!(duration_secs, "countdown started");
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            let mut remaining = duration_secs;
            loop {
                ticker.tick().await;
                remaining = remaining.saturating_sub(1);
                if !live.load(Ordering::Acquire) {
                    return;
                }
                on_tick(remaining);
                if remaining == 0 {
                    break;
                }
            }
            if live.swap(false, Ordering::AcqRel) {
                debug!("countdown expired");
                on_expire();
            }
        }));
    }

    /// Cancel the remaining ticks. Safe to call repeatedly or before `start`.
    pub fn stop(&mut self) {
        self.live.store(false, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.live.load(Ordering::Acquire)
            && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}
