use serde::{Deserialize, Serialize};

/// Payment status as reported by the order service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Provider-specific mapping from numeric result codes to [`PaymentStatus`].
///
/// Codes listed in neither set are treated as pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCodes {
    #[serde(default = "default_success_codes")]
    pub success: Vec<i64>,
    #[serde(default = "default_failure_codes")]
    pub failure: Vec<i64>,
}

fn default_success_codes() -> Vec<i64> {
    vec![1]
}

fn default_failure_codes() -> Vec<i64> {
    vec![3]
}

impl Default for StatusCodes {
    fn default() -> Self {
        Self {
            success: default_success_codes(),
            failure: default_failure_codes(),
        }
    }
}

impl StatusCodes {
    pub fn new(success: impl Into<Vec<i64>>, failure: impl Into<Vec<i64>>) -> Self {
        Self {
            success: success.into(),
            failure: failure.into(),
        }
    }

    pub fn classify(&self, code: i64) -> PaymentStatus {
        if self.success.contains(&code) {
            PaymentStatus::Success
        } else if self.failure.contains(&code) {
            PaymentStatus::Failed
        } else {
            PaymentStatus::Pending
        }
    }

    pub(crate) fn overlap(&self) -> Option<i64> {
        self.success
            .iter()
            .copied()
            .find(|code| self.failure.contains(code))
    }
}
