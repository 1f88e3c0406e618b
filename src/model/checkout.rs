use std::fmt;
use std::str::FromStr;

use crate::error::{CheckoutError, FailureReason};
use crate::model::order::PaymentOrder;
use crate::model::status::PaymentStatus;

/// How a payment method is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Settlement {
    /// Offline payment trusted on the payer's confirmation.
    Manual,
    /// The provider reports the result, discovered by polling.
    Polled,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaymentMethod {
    id: String,
    settlement: Settlement,
}

impl PaymentMethod {
    pub const BANK: &'static str = "bank";
    pub const OFFICE: &'static str = "office";
    pub const ZALOPAY: &'static str = "zalopay";

    pub fn manual(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            settlement: Settlement::Manual,
        }
    }

    pub fn polled(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            settlement: Settlement::Polled,
        }
    }

    /// Bank transfer.
    pub fn bank() -> Self {
        Self::manual(Self::BANK)
    }

    /// Payment at the office counter.
    pub fn office() -> Self {
        Self::manual(Self::OFFICE)
    }

    pub fn zalopay() -> Self {
        Self::polled(Self::ZALOPAY)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn settlement(&self) -> Settlement {
        self.settlement
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl FromStr for PaymentMethod {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            Self::BANK => Ok(Self::bank()),
            Self::OFFICE => Ok(Self::office()),
            Self::ZALOPAY => Ok(Self::zalopay()),
            other => Err(CheckoutError::InvalidMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub title: String,
    /// Price in whole currency units.
    pub price: i64,
}

impl Product {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
}

impl Customer {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Lifecycle of one checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowState {
    Idle,
    AwaitingMethodSelection,
    CreatingOrder,
    AwaitingPayment,
    Confirming,
    Succeeded,
    Failed,
    Cancelled,
    Expired,
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Cancelled | Self::Expired
        )
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::AwaitingMethodSelection => "awaiting_method_selection",
            Self::CreatingOrder => "creating_order",
            Self::AwaitingPayment => "awaiting_payment",
            Self::Confirming => "confirming",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Final result of a checkout attempt, reported once to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { transaction_id: Option<String> },
    Failure(FailureReason),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Observable view of a flow for host UIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSnapshot {
    pub state: FlowState,
    pub method: Option<PaymentMethod>,
    pub order: Option<PaymentOrder>,
    pub remaining_secs: Option<u32>,
    pub last_status: Option<PaymentStatus>,
    pub last_error: Option<String>,
}

impl FlowSnapshot {
    pub(crate) fn new() -> Self {
        Self {
            state: FlowState::Idle,
            method: None,
            order: None,
            remaining_secs: None,
            last_status: None,
            last_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builtin_methods() {
        let bank: PaymentMethod = "bank".parse().unwrap();
        assert_eq!(bank.settlement(), Settlement::Manual);
        let office: PaymentMethod = " Office ".parse().unwrap();
        assert_eq!(office.id(), "office");
        let zalo: PaymentMethod = "ZALOPAY".parse().unwrap();
        assert_eq!(zalo.settlement(), Settlement::Polled);
    }

    #[test]
    fn test_parse_unknown_method() {
        let err = "paypal".parse::<PaymentMethod>().unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidMethod(ref id) if id == "paypal"));
    }

    #[test]
    fn test_custom_provider() {
        let momo = PaymentMethod::polled("momo");
        assert_eq!(momo.to_string(), "momo");
        assert_eq!(momo.settlement(), Settlement::Polled);
    }

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = [
            FlowState::Idle,
            FlowState::AwaitingMethodSelection,
            FlowState::CreatingOrder,
            FlowState::AwaitingPayment,
            FlowState::Confirming,
            FlowState::Succeeded,
            FlowState::Failed,
            FlowState::Cancelled,
            FlowState::Expired,
        ]
        .into_iter()
        .filter(|s| s.is_terminal())
        .collect();
        assert_eq!(
            terminal,
            vec![
                FlowState::Succeeded,
                FlowState::Failed,
                FlowState::Cancelled,
                FlowState::Expired
            ]
        );
    }

    #[test]
    fn test_outcome_is_success() {
        assert!(
            Outcome::Success {
                transaction_id: None
            }
            .is_success()
        );
        assert!(!Outcome::Failure(FailureReason::Timeout).is_success());
    }
}
