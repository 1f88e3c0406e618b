use std::time::Duration;

use serde::Deserialize;

use crate::error::CheckoutError;
use crate::model::status::StatusCodes;

/// Interval between two order status queries.
pub const POLL_INTERVAL_MS: u64 = 5000;
/// Seconds a payer has to complete a QR payment.
pub const COUNTDOWN_SECS: u32 = 300;
/// `return_code` of a successful order creation.
pub const DEFAULT_CREATE_OK_CODE: i64 = 1;

pub struct ClientConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub http_client: Option<reqwest::Client>,
    pub create_ok_code: i64,
    pub status_codes: StatusCodes,
}

pub struct ClientConfigBuilder {
    base_url: Option<String>,
    bearer_token: Option<String>,
    http_client: Option<reqwest::Client>,
    create_ok_code: Option<i64>,
    status_codes: Option<StatusCodes>,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            base_url: None,
            bearer_token: None,
            http_client: None,
            create_ok_code: None,
            status_codes: None,
        }
    }
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Session token sent as `Authorization: Bearer ...`.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn create_ok_code(mut self, code: i64) -> Self {
        self.create_ok_code = Some(code);
        self
    }

    pub fn status_codes(mut self, codes: StatusCodes) -> Self {
        self.status_codes = Some(codes);
        self
    }

    pub fn build(self) -> Result<ClientConfig, CheckoutError> {
        let base_url = self
            .base_url
            .ok_or_else(|| CheckoutError::Config("base_url is required".into()))?;

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CheckoutError::Config(format!(
                "base_url must be an http(s) URL, got {base_url}"
            )));
        }

        let status_codes = self.status_codes.unwrap_or_default();
        validate_status_codes(&status_codes)?;

        Ok(ClientConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: self.bearer_token.filter(|t| !t.is_empty()),
            http_client: self.http_client,
            create_ok_code: self.create_ok_code.unwrap_or(DEFAULT_CREATE_OK_CODE),
            status_codes,
        })
    }
}

/// Timing settings of a checkout flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlowConfig {
    #[serde(rename = "poll_interval_ms", with = "millis", default = "default_poll_interval")]
    pub poll_interval: Duration,
    #[serde(default)]
    pub poll_immediately: bool,
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(POLL_INTERVAL_MS)
}

fn default_countdown_secs() -> u32 {
    COUNTDOWN_SECS
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            poll_immediately: false,
            countdown_secs: COUNTDOWN_SECS,
        }
    }
}

impl FlowConfig {
    pub fn builder() -> FlowConfigBuilder {
        FlowConfigBuilder {
            config: Self::default(),
        }
    }

    /// Parse and validate a provider configuration document.
    pub fn from_json(json: &str) -> Result<Self, CheckoutError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.poll_interval.is_zero() {
            return Err(CheckoutError::Config(
                "poll_interval must be greater than zero".into(),
            ));
        }
        if self.countdown_secs == 0 {
            return Err(CheckoutError::Config(
                "countdown_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

pub struct FlowConfigBuilder {
    config: FlowConfig,
}

impl FlowConfigBuilder {
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Issue the first status query right away instead of after one interval.
    pub fn poll_immediately(mut self, yes: bool) -> Self {
        self.config.poll_immediately = yes;
        self
    }

    pub fn countdown_secs(mut self, secs: u32) -> Self {
        self.config.countdown_secs = secs;
        self
    }

    pub fn build(self) -> Result<FlowConfig, CheckoutError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn validate_status_codes(codes: &StatusCodes) -> Result<(), CheckoutError> {
    if let Some(code) = codes.overlap() {
        return Err(CheckoutError::Config(format!(
            "status code {code} is mapped to both success and failure"
        )));
    }
    Ok(())
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
