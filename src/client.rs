use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiErrorResponse, CheckoutError};

const USER_AGENT: &str = concat!("zlpay-checkout/", env!("CARGO_PKG_VERSION"));

/// REST client for the platform's order service.
pub struct OrderClient {
    pub(crate) config: ClientConfig,
    pub(crate) http: reqwest::Client,
}

impl OrderClient {
    pub fn new(config: ClientConfig) -> Self {
        let http = config.http_client.clone().unwrap_or_default();
        Self { config, http }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Send a POST request with a JSON body and return the deserialized response.
    pub(crate) async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, CheckoutError>
    where
        Req: serde::Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let body_str = serde_json::to_string(body)?;
        let resp = self.do_request(reqwest::Method::POST, path, Some(body_str)).await?;
        let resp_body = self.read_body(resp).await?;
        serde_json::from_str(&resp_body).map_err(CheckoutError::from)
    }

    /// Send a GET request and return the deserialized response.
    pub(crate) async fn get<Resp>(&self, path: &str) -> Result<Resp, CheckoutError>
    where
        Resp: serde::de::DeserializeOwned,
    {
        let resp = self.do_request(reqwest::Method::GET, path, None).await?;
        let resp_body = self.read_body(resp).await?;
        serde_json::from_str(&resp_body).map_err(CheckoutError::from)
    }

    async fn do_request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<String>,
    ) -> Result<reqwest::Response, CheckoutError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        debug!(%method, path, %request_id, "sending order service request");

        let full_url = format!("{}{path}", self.config.base_url);
        let mut req = self
            .http
            .request(method, &full_url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .header("X-Request-Id", &request_id);

        if let Some(token) = &self.config.bearer_token {
            req = req.bearer_auth(token);
        }

        if let Some(body) = body {
            req = req.header("Content-Type", "application/json").body(body);
        }

        req.send().await.map_err(CheckoutError::Http)
    }

    async fn read_body(&self, resp: reqwest::Response) -> Result<String, CheckoutError> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "order service returned an error");
            return parse_api_error(status.as_u16(), &body);
        }

        Ok(body)
    }
}

fn parse_api_error<T>(status: u16, body: &str) -> Result<T, CheckoutError> {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(ApiErrorResponse::into_message)
        .unwrap_or_else(|| body.to_string());
    Err(CheckoutError::Api { status, message })
}

/// Percent-encode a string so it is safe to use in a URL path segment or query value.
pub(crate) fn encode_path_segment(s: &str) -> String {
    utf8_percent_encode(s, NON_ALPHANUMERIC).to_string()
}
