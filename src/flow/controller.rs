use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::FlowConfig;
use crate::error::{CheckoutError, FailureReason};
use crate::flow::poller::{PollEvent, StatusPoller};
use crate::flow::timer::Countdown;
use crate::model::checkout::{
    Customer, FlowSnapshot, FlowState, Outcome, PaymentMethod, Product, Settlement,
};
use crate::model::order::{CreateOrder, PaymentOrder};
use crate::model::status::PaymentStatus;
use crate::service::OrderServiceRef;

pub type OutcomeCallback = Arc<dyn Fn(&Outcome) + Send + Sync>;

/// Requests from the host.
#[derive(Debug)]
pub(crate) enum Command {
    SelectMethod(PaymentMethod),
    Confirm,
    Cancel,
    Dispose,
}

/// Completions from the order service, poller and countdown, tagged with
/// the generation that started them.
#[derive(Debug)]
pub(crate) enum Event {
    OrderCreated {
        generation: u64,
        result: Result<PaymentOrder, CheckoutError>,
    },
    Poll {
        generation: u64,
        event: PollEvent,
    },
    Tick {
        generation: u64,
        remaining: u32,
    },
    Expired {
        generation: u64,
    },
}

/// Everything the controller reacts to, in the order it was posted.
#[derive(Debug)]
pub(crate) enum Msg {
    Command(Command),
    Event(Event),
}

impl From<Command> for Msg {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

/// Single owner of one checkout attempt's state.
///
/// Host commands and completions share one mailbox, so every mutation
/// happens on the controller task in the order it was posted. Work
/// started for an earlier generation (or before a terminal transition) is
/// discarded when it reports back.
struct FlowController {
    service: OrderServiceRef,
    config: FlowConfig,
    product: Product,
    customer: Customer,
    snapshot: FlowSnapshot,
    snapshot_tx: watch::Sender<FlowSnapshot>,
    outcome_tx: watch::Sender<Option<Outcome>>,
    on_outcome: Option<OutcomeCallback>,
    generation: u64,
    poller: StatusPoller,
    countdown: Countdown,
    pending_order: Option<JoinHandle<()>>,
    mailbox: mpsc::UnboundedSender<Msg>,
}

/// Host-side ends of a spawned controller.
pub(crate) struct Channels {
    pub(crate) mailbox: mpsc::UnboundedSender<Msg>,
    pub(crate) snapshot: watch::Receiver<FlowSnapshot>,
    pub(crate) outcome: watch::Receiver<Option<Outcome>>,
    pub(crate) task: JoinHandle<()>,
}

/// Spawn the controller task for one checkout attempt.
pub(crate) fn spawn(
    service: OrderServiceRef,
    config: FlowConfig,
    product: Product,
    customer: Customer,
    on_outcome: Option<OutcomeCallback>,
) -> Channels {
    let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(FlowSnapshot::new());
    let (outcome_tx, outcome_rx) = watch::channel(None);

    let span = info_span!("checkout", product_id = %product.id, customer_id = %customer.id);
    let controller = FlowController::new(
        service,
        config,
        product,
        customer,
        on_outcome,
        snapshot_tx,
        outcome_tx,
        mailbox_tx.clone(),
    );
    let task = tokio::spawn(controller.run(mailbox_rx).instrument(span));

    Channels {
        mailbox: mailbox_tx,
        snapshot: snapshot_rx,
        outcome: outcome_rx,
        task,
    }
}

impl FlowController {
    #[allow(clippy::too_many_arguments)]
    fn new(
        service: OrderServiceRef,
        config: FlowConfig,
        product: Product,
        customer: Customer,
        on_outcome: Option<OutcomeCallback>,
        snapshot_tx: watch::Sender<FlowSnapshot>,
        outcome_tx: watch::Sender<Option<Outcome>>,
        mailbox: mpsc::UnboundedSender<Msg>,
    ) -> Self {
        let poller =
            StatusPoller::new(config.poll_interval).poll_immediately(config.poll_immediately);
        Self {
            service,
            config,
            product,
            customer,
            snapshot: FlowSnapshot::new(),
            snapshot_tx,
            outcome_tx,
            on_outcome,
            generation: 0,
            poller,
            countdown: Countdown::new(),
            pending_order: None,
            mailbox,
        }
    }

    async fn run(mut self, mut mailbox: mpsc::UnboundedReceiver<Msg>) {
        self.transition(FlowState::AwaitingMethodSelection);

        while let Some(msg) = mailbox.recv().await {
            match msg {
                Msg::Command(Command::Dispose) => {
                    self.dispose();
                    break;
                }
                Msg::Command(command) => self.handle_command(command),
                Msg::Event(event) => self.handle_event(event),
            }
        }
        debug!("checkout controller stopped");
    }

    fn state(&self) -> FlowState {
        self.snapshot.state
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SelectMethod(method) => self.select_method(method),
            Command::Confirm => self.confirm(),
            Command::Cancel => self.cancel(),
            Command::Dispose => self.dispose(),
        }
    }

    fn select_method(&mut self, method: PaymentMethod) {
        if self.state() != FlowState::AwaitingMethodSelection {
            warn!(state = %self.state(), %method, "method selection ignored");
            return;
        }
        debug!(%method, "payment method selected");
        self.snapshot.method = Some(method);
        self.snapshot.last_error = None;
        self.publish();
    }

    fn confirm(&mut self) {
        if self.state() != FlowState::AwaitingMethodSelection {
            warn!(state = %self.state(), "confirm ignored");
            return;
        }
        let Some(method) = self.snapshot.method.clone() else {
            warn!("confirm without a payment method");
            self.snapshot.last_error = Some("no payment method selected".into());
            self.publish();
            return;
        };

        let next = match method.settlement() {
            Settlement::Manual => FlowState::Confirming,
            Settlement::Polled => FlowState::CreatingOrder,
        };
        debug!(%method, state = %next, "confirming payment");
        self.create_order(next);
    }

    fn cancel(&mut self) {
        if self.state().is_terminal() {
            debug!(state = %self.state(), "cancel ignored, flow already finished");
            return;
        }
        self.finish(
            FlowState::Cancelled,
            Outcome::Failure(FailureReason::UserCancelled),
        );
    }

    fn dispose(&mut self) {
        if self.state().is_terminal() {
            self.teardown();
        } else {
            self.cancel();
        }
    }

    fn create_order(&mut self, state: FlowState) {
        self.generation += 1;
        let generation = self.generation;
        self.snapshot.last_error = None;
        self.transition(state);

        let request = CreateOrder {
            amount: self.product.price,
            description: self.product.title.clone(),
            payer_id: self.customer.id.clone(),
            product_id: self.product.id.clone(),
        };
        let service = Arc::clone(&self.service);
        let mailbox = self.mailbox.clone();
        self.pending_order = Some(tokio::spawn(async move {
            let result = service.create_order(&request).await;
            let _ = mailbox.send(Event::OrderCreated { generation, result }.into());
        }));
    }

    fn handle_event(&mut self, event: Event) {
        let generation = match &event {
            Event::OrderCreated { generation, .. }
            | Event::Poll { generation, .. }
            | Event::Tick { generation, .. }
            | Event::Expired { generation } => *generation,
        };
        if generation != self.generation || self.state().is_terminal() {
            debug!(
                generation,
                current = self.generation,
                state = %self.state(),
                "discarding late event"
            );
            return;
        }

        match event {
            Event::OrderCreated { result, .. } => self.on_order_created(result),
            Event::Poll { event, .. } => self.on_poll(event),
            Event::Tick { remaining, .. } => {
                if self.state() == FlowState::AwaitingPayment {
                    self.snapshot.remaining_secs = Some(remaining);
                    self.publish();
                }
            }
            Event::Expired { .. } => self.on_expired(),
        }
    }

    fn on_order_created(&mut self, result: Result<PaymentOrder, CheckoutError>) {
        self.pending_order = None;
        match result {
            Ok(order) if self.state() == FlowState::Confirming => {
                // Offline methods are trusted without a server-side check.
                let transaction_id = order.transaction_id().to_string();
                self.snapshot.order = Some(order);
                self.finish(
                    FlowState::Succeeded,
                    Outcome::Success {
                        transaction_id: Some(transaction_id),
                    },
                );
            }
            Ok(order) => {
                debug_assert_eq!(self.state(), FlowState::CreatingOrder);
                self.await_payment(order);
            }
            Err(e) => {
                warn!(state = %self.state(), error = %e, "order creation failed");
                let message = e.to_string();
                self.snapshot.last_error = Some(message.clone());
                self.finish(
                    FlowState::Failed,
                    Outcome::Failure(FailureReason::OrderCreation(message)),
                );
            }
        }
    }

    fn await_payment(&mut self, order: PaymentOrder) {
        let generation = self.generation;
        let transaction_id = order.transaction_id().to_string();
        info!(%transaction_id, amount = order.amount(), "order created, awaiting payment");

        self.snapshot.order = Some(order);
        self.snapshot.remaining_secs = Some(self.config.countdown_secs);
        self.transition(FlowState::AwaitingPayment);

        let polls = self.mailbox.clone();
        self.poller.start(
            transaction_id,
            Arc::clone(&self.service),
            move |event| {
                let _ = polls.send(Event::Poll { generation, event }.into());
            },
        );

        let ticks = self.mailbox.clone();
        let expiry = self.mailbox.clone();
        self.countdown.start(
            self.config.countdown_secs,
            move |remaining| {
                let _ = ticks.send(
                    Event::Tick {
                        generation,
                        remaining,
                    }
                    .into(),
                );
            },
            move || {
                let _ = expiry.send(Event::Expired { generation }.into());
            },
        );
    }

    fn on_poll(&mut self, event: PollEvent) {
        if self.state() != FlowState::AwaitingPayment {
            return;
        }
        match event {
            PollEvent::Status(status) => {
                self.snapshot.last_status = Some(status);
                match status {
                    PaymentStatus::Pending => self.publish(),
                    PaymentStatus::Success => {
                        let transaction_id = self.transaction_id();
                        self.finish(FlowState::Succeeded, Outcome::Success { transaction_id });
                    }
                    PaymentStatus::Failed => self.finish(
                        FlowState::Failed,
                        Outcome::Failure(FailureReason::ProviderFailure),
                    ),
                }
            }
            PollEvent::Error(e) => {
                self.snapshot.last_error = Some(e.to_string());
                self.publish();
            }
        }
    }

    fn on_expired(&mut self) {
        if self.state() != FlowState::AwaitingPayment {
            return;
        }
        self.snapshot.remaining_secs = Some(0);
        self.finish(FlowState::Expired, Outcome::Failure(FailureReason::Timeout));
    }

    fn transaction_id(&self) -> Option<String> {
        self.snapshot
            .order
            .as_ref()
            .map(|order| order.transaction_id().to_string())
    }

    /// Stop the poller, countdown and any in-flight order creation, and
    /// invalidate every outstanding completion.
    fn teardown(&mut self) {
        self.generation += 1;
        self.poller.stop();
        self.countdown.stop();
        if let Some(task) = self.pending_order.take() {
            task.abort();
        }
    }

    fn finish(&mut self, state: FlowState, outcome: Outcome) {
        debug_assert!(state.is_terminal());
        if self.state().is_terminal() {
            return;
        }
        self.teardown();
        self.transition(state);

        match &outcome {
            Outcome::Success { transaction_id } => {
                info!(transaction_id = transaction_id.as_deref(), "checkout succeeded")
            }
            Outcome::Failure(reason) => info!(%state, %reason, "checkout failed"),
        }
        if let Some(callback) = &self.on_outcome {
            callback(&outcome);
        }
        self.outcome_tx.send_replace(Some(outcome));
    }

    fn transition(&mut self, state: FlowState) {
        debug!(from = %self.snapshot.state, to = %state, "flow transition");
        self.snapshot.state = state;
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot.clone());
    }
}
