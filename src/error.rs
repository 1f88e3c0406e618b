use std::fmt;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Order service error: status={status}, message={message}")]
    Api { status: u16, message: String },

    #[error("Provider rejected order: code={code}, message={message}")]
    Provider { code: i64, message: String },

    #[error("Malformed order service response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid payment method: {0}")]
    InvalidMethod(String),

    #[error("Checkout flow is closed")]
    FlowClosed,
}

/// Why a checkout attempt ended without a successful payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The order service rejected or failed to create the order.
    OrderCreation(String),
    /// The provider explicitly reported the payment as failed.
    ProviderFailure,
    /// The countdown reached zero before a terminal provider result.
    Timeout,
    /// The payer cancelled the flow.
    UserCancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrderCreation(msg) => write!(f, "order creation failed: {msg}"),
            Self::ProviderFailure => f.write_str("payment failed"),
            Self::Timeout => f.write_str("payment window expired"),
            Self::UserCancelled => f.write_str("cancelled by user"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorResponse {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
