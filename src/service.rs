use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CheckoutError;
use crate::model::order::{CreateOrder, PaymentOrder};
use crate::model::status::PaymentStatus;

/// The two order service calls the checkout flow consumes.
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, request: &CreateOrder) -> Result<PaymentOrder, CheckoutError>;

    async fn order_status(&self, transaction_id: &str) -> Result<PaymentStatus, CheckoutError>;
}

pub type OrderServiceRef = Arc<dyn OrderService>;
