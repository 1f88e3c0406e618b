//! Checkout flow: drives one payment attempt from method selection to a
//! terminal outcome.
//!
//! A [`FlowHandle`] sends requests to a controller task that owns all flow
//! state. Hosts observe progress through [`FlowHandle::subscribe`] and learn
//! the final result through [`FlowHandle::outcome`] or an outcome callback.

pub mod controller;
pub mod poller;
pub mod timer;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::FlowConfig;
use crate::error::CheckoutError;
use crate::model::checkout::{Customer, FlowSnapshot, FlowState, Outcome, PaymentMethod, Product};
use crate::service::OrderServiceRef;

use controller::{Channels, Command};
pub use controller::OutcomeCallback;

/// Factory for checkout attempts sharing one order service and configuration.
#[derive(Clone)]
pub struct Checkout {
    service: OrderServiceRef,
    config: FlowConfig,
    on_outcome: Option<OutcomeCallback>,
}

impl Checkout {
    pub fn new(service: OrderServiceRef, config: FlowConfig) -> Result<Self, CheckoutError> {
        config.validate()?;
        Ok(Self {
            service,
            config,
            on_outcome: None,
        })
    }

    /// Called exactly once per attempt with its final outcome.
    pub fn on_outcome<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Outcome) + Send + Sync + 'static,
    {
        self.on_outcome = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Start a new checkout attempt. Must be called from within a tokio runtime.
    pub fn start(&self, product: Product, customer: Customer) -> FlowHandle {
        debug!(product_id = %product.id, customer_id = %customer.id, "starting checkout");
        let channels = controller::spawn(
            Arc::clone(&self.service),
            self.config.clone(),
            product.clone(),
            customer.clone(),
            self.on_outcome.clone(),
        );
        FlowHandle {
            channels,
            checkout: self.clone(),
            product,
            customer,
        }
    }
}

/// Start a checkout attempt with no outcome callback.
pub fn start_checkout(
    service: OrderServiceRef,
    config: FlowConfig,
    product: Product,
    customer: Customer,
) -> Result<FlowHandle, CheckoutError> {
    Ok(Checkout::new(service, config)?.start(product, customer))
}

/// Host-side handle of one checkout attempt.
///
/// Dropping the handle tears the flow down; a live flow ends as cancelled.
pub struct FlowHandle {
    channels: Channels,
    checkout: Checkout,
    product: Product,
    customer: Customer,
}

impl FlowHandle {
    pub fn select_method(&self, method: PaymentMethod) -> Result<(), CheckoutError> {
        self.send(Command::SelectMethod(method))
    }

    pub fn confirm(&self) -> Result<(), CheckoutError> {
        self.send(Command::Confirm)
    }

    pub fn cancel(&self) -> Result<(), CheckoutError> {
        self.send(Command::Cancel)
    }

    pub fn state(&self) -> FlowState {
        self.channels.snapshot.borrow().state
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        self.channels.snapshot.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<FlowSnapshot> {
        self.channels.snapshot.clone()
    }

    /// The outcome, if the flow has finished.
    pub fn try_outcome(&self) -> Option<Outcome> {
        self.channels.outcome.borrow().clone()
    }

    /// Wait for the flow to reach a terminal state.
    pub async fn outcome(&self) -> Result<Outcome, CheckoutError> {
        let mut rx = self.channels.outcome.clone();
        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| CheckoutError::FlowClosed)?;
        outcome.clone().ok_or(CheckoutError::FlowClosed)
    }

    /// Tear the flow down and wait for the controller task to end.
    ///
    /// A flow that has not finished ends as cancelled.
    pub async fn dispose(mut self) {
        let _ = self.send(Command::Dispose);
        if let Err(e) = (&mut self.channels.task).await {
            warn!(error = %e, "checkout controller task failed");
        }
    }

    /// Dispose this attempt and start a fresh one for the same product and
    /// customer, keeping the selected payment method.
    pub async fn restart(self) -> FlowHandle {
        let method = self.channels.snapshot.borrow().method.clone();
        let checkout = self.checkout.clone();
        let product = self.product.clone();
        let customer = self.customer.clone();
        self.dispose().await;

        let handle = checkout.start(product, customer);
        if let Some(method) = method {
            let _ = handle.select_method(method);
        }
        handle
    }

    fn send(&self, command: Command) -> Result<(), CheckoutError> {
        self.channels
            .mailbox
            .send(command.into())
            .map_err(|_| CheckoutError::FlowClosed)
    }
}

impl Drop for FlowHandle {
    fn drop(&mut self) {
        let _ = self.channels.mailbox.send(Command::Dispose.into());
    }
}
