#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use zlpay_checkout::{
    CheckoutError, CreateOrder, Customer, FlowConfig, OrderService, Outcome, PaymentOrder,
    PaymentStatus, Product, StatusCodes,
};

/// In-memory order service replaying scripted results.
///
/// Creation results are consumed in order (then succeed); status results are
/// provider result codes classified with the default mapping (then pending).
pub struct ScriptedOrderService {
    creates: Mutex<VecDeque<Result<(), String>>>,
    statuses: Mutex<VecDeque<Result<i64, String>>>,
    create_delay: Duration,
    status_delay: Duration,
    codes: StatusCodes,
    pub create_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub requests: Mutex<Vec<CreateOrder>>,
}

impl ScriptedOrderService {
    pub fn new() -> Self {
        Self {
            creates: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            create_delay: Duration::ZERO,
            status_delay: Duration::ZERO,
            codes: StatusCodes::default(),
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_creates(self, creates: Vec<Result<(), String>>) -> Self {
        *self.creates.lock().unwrap() = creates.into();
        self
    }

    pub fn with_statuses(self, statuses: Vec<Result<i64, String>>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderService for ScriptedOrderService {
    async fn create_order(&self, request: &CreateOrder) -> Result<PaymentOrder, CheckoutError> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }
        let next = self.creates.lock().unwrap().pop_front().unwrap_or(Ok(()));
        match next {
            Ok(()) => {
                let transaction_id = format!("T{n}");
                let url = format!("https://sb-openapi.zalopay.vn/pay/{transaction_id}");
                Ok(PaymentOrder::new(request, transaction_id, url.clone(), url))
            }
            Err(message) => Err(CheckoutError::Api {
                status: 500,
                message,
            }),
        }
    }

    async fn order_status(&self, _transaction_id: &str) -> Result<PaymentStatus, CheckoutError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        let next = self.statuses.lock().unwrap().pop_front().unwrap_or(Ok(2));
        match next {
            Ok(code) => Ok(self.codes.classify(code)),
            Err(message) => Err(CheckoutError::MalformedResponse(message)),
        }
    }
}

/// Records every outcome reported through the checkout callback.
#[derive(Clone, Default)]
pub struct OutcomeLog(Arc<Mutex<Vec<Outcome>>>);

impl OutcomeLog {
    pub fn callback(&self) -> impl Fn(&Outcome) + Send + Sync + 'static {
        let log = Arc::clone(&self.0);
        move |outcome: &Outcome| log.lock().unwrap().push(outcome.clone())
    }

    pub fn all(&self) -> Vec<Outcome> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

pub fn product() -> Product {
    Product::new("course-n3", "JLPT N3 complete course", 1_290_000)
}

pub fn customer() -> Customer {
    Customer::new("user-7")
}

pub fn fast_config() -> FlowConfig {
    FlowConfig::builder()
        .poll_immediately(true)
        .build()
        .unwrap()
}
