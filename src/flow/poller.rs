use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

use crate::error::CheckoutError;
use crate::model::status::PaymentStatus;
use crate::service::OrderServiceRef;

/// Result of one status query.
#[derive(Debug)]
pub enum PollEvent {
    Status(PaymentStatus),
    /// A transient query failure; polling goes on.
    Error(CheckoutError),
}

/// Queries an order's status on a fixed interval until stopped or a
/// terminal status is seen.
///
/// Queries are issued one at a time: the next tick waits for the previous
/// query to resolve. Errors never stop polling.
pub struct StatusPoller {
    interval: Duration,
    immediate: bool,
    task: Option<JoinHandle<()>>,
    live: Arc<AtomicBool>,
}

impl StatusPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            immediate: false,
            task: None,
            live: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Issue the first query when started instead of one interval later.
    pub fn poll_immediately(mut self, yes: bool) -> Self {
        self.immediate = yes;
        self
    }

    /// Start polling `transaction_id`. A running poll loop is stopped first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, transaction_id: impl Into<String>, service: OrderServiceRef, on_result: F)
    where
        F: Fn(PollEvent) + Send + 'static,
    {
        self.stop();

        let transaction_id = transaction_id.into();
        let period = self.interval;
        let first = if self.immediate {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let live = Arc::new(AtomicBool::new(true));
        self.live = Arc::clone(&live);

        debug!(%transaction_id, ?period, "status polling started");
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let result = service.order_status(&transaction_id).await;
                if !live.load(Ordering::Acquire) {
                    return;
                }
                match result {
                    Ok(status) => {
                        on_result(PollEvent::Status(status));
                        if status.is_terminal() {
                            debug!(%transaction_id, ?status, "status polling finished");
                            live.store(false, Ordering::Release);
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(%transaction_id, error = %e, "status query failed, will retry");
                        on_result(PollEvent::Error(e));
                    }
                }
            }
        }));
    }

    /// Cancel the scheduled queries. Safe to call repeatedly or before `start`.
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

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
