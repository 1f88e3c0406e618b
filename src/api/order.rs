use async_trait::async_trait;
use tracing::debug;

use crate::client::{OrderClient, encode_path_segment};
use crate::error::CheckoutError;
use crate::model::order::{
    CreateOrder, CreateOrderRequest, CreateOrderResponse, OrderStatusResponse, PaymentOrder,
};
use crate::model::status::PaymentStatus;
use crate::service::OrderService;

const CREATE_ORDER_PATH: &str = "/payment/zalopay/create-order";
const ORDER_STATUS_PATH: &str = "/payment/zalopay/order-status";

impl OrderClient {
    /// Create a QR payment order.
    ///
    /// POST /payment/zalopay/create-order
    pub async fn create_qr_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, CheckoutError> {
        self.post(CREATE_ORDER_PATH, req).await
    }

    /// Query order status by transaction id.
    ///
    /// GET /payment/zalopay/order-status/{transaction_id}
    pub async fn query_order_status(
        &self,
        transaction_id: &str,
    ) -> Result<OrderStatusResponse, CheckoutError> {
        let path = format!(
            "{ORDER_STATUS_PATH}/{}",
            encode_path_segment(transaction_id)
        );
        self.get(&path).await
    }
}

#[async_trait]
impl OrderService for OrderClient {
    async fn create_order(&self, request: &CreateOrder) -> Result<PaymentOrder, CheckoutError> {
        let resp = self.create_qr_order(&CreateOrderRequest::from(request)).await?;
        into_payment_order(request, resp, self.config.create_ok_code)
    }

    async fn order_status(&self, transaction_id: &str) -> Result<PaymentStatus, CheckoutError> {
        let resp = self.query_order_status(transaction_id).await?;
        let status = self.config.status_codes.classify(resp.return_code);
        debug!(
            transaction_id,
            return_code = resp.return_code,
            ?status,
            "order status"
        );
        Ok(status)
    }
}

fn into_payment_order(
    request: &CreateOrder,
    resp: CreateOrderResponse,
    ok_code: i64,
) -> Result<PaymentOrder, CheckoutError> {
    if resp.return_code != ok_code {
        let message = resp
            .sub_return_message
            .filter(|m| !m.is_empty())
            .unwrap_or(resp.return_message);
        return Err(CheckoutError::Provider {
            code: resp.return_code,
            message,
        });
    }

    let transaction_id = resp
        .app_trans_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CheckoutError::MalformedResponse("missing app_trans_id".into()))?;
    let payment_url = resp.order_url.unwrap_or_default();
    // Some deployments only return the order URL; the wallet app scans it as well.
    let qr_payload = resp
        .qr_code
        .filter(|qr| !qr.is_empty())
        .unwrap_or_else(|| payment_url.clone());
    if qr_payload.is_empty() {
        return Err(CheckoutError::MalformedResponse(
            "missing qr_code and order_url".into(),
        ));
    }

    Ok(PaymentOrder::new(
        request,
        transaction_id,
        qr_payload,
        payment_url,
    ))
}
