use serde::{Deserialize, Serialize};

/// Input of a single order creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    pub amount: i64,
    pub description: String,
    pub payer_id: String,
    pub product_id: String,
}

/// An order created by the order service for one checkout attempt.
///
/// Immutable after creation: fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOrder {
    transaction_id: String,
    amount: i64,
    description: String,
    payer_id: String,
    product_id: String,
    qr_payload: String,
    payment_url: String,
}

impl PaymentOrder {
    pub fn new(
        request: &CreateOrder,
        transaction_id: impl Into<String>,
        qr_payload: impl Into<String>,
        payment_url: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            amount: request.amount,
            description: request.description.clone(),
            payer_id: request.payer_id.clone(),
            product_id: request.product_id.clone(),
            qr_payload: qr_payload.into(),
            payment_url: payment_url.into(),
        }
    }

    /// Polling key of the order.
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn payer_id(&self) -> &str {
        &self.payer_id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Data to render as a scannable code.
    pub fn qr_payload(&self) -> &str {
        &self.qr_payload
    }

    /// Fallback link when the code cannot be scanned.
    pub fn payment_url(&self) -> &str {
        &self.payment_url
    }
}

// ---- Wire ----

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub amount: i64,
    pub description: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "courseId")]
    pub course_id: String,
}

impl From<&CreateOrder> for CreateOrderRequest {
    fn from(req: &CreateOrder) -> Self {
        Self {
            amount: req.amount,
            description: req.description.clone(),
            user_id: req.payer_id.clone(),
            course_id: req.product_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    pub return_code: i64,
    #[serde(default)]
    pub return_message: String,
    #[serde(default)]
    pub sub_return_message: Option<String>,
    #[serde(default)]
    pub order_url: Option<String>,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub app_trans_id: Option<String>,
    #[serde(default)]
    pub zp_trans_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusResponse {
    pub return_code: i64,
    #[serde(default)]
    pub return_message: String,
    #[serde(default)]
    pub is_processing: Option<bool>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub zp_trans_id: Option<i64>,
}
