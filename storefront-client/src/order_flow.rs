//! Cart assembly and order submission

use shared::models::{LineItem, ShippingDetails};
use shared::request::{CreateOrderRequest, CreateOrderResponse};
use shared::response::ApiResponse;

use crate::checkout::CheckoutSession;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Builds up a cart and submits it as one order.
///
/// Submission is a single attempt - a failed order must be retried by the
/// shopper, never automatically, so a slow server cannot double-charge.
pub struct OrderFlow {
    http: reqwest::Client,
    config: ClientConfig,
    cart: Vec<LineItem>,
    shipping: Option<ShippingDetails>,
    user_id: Option<String>,
}

impl OrderFlow {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            cart: Vec::new(),
            shipping: None,
            user_id: None,
        })
    }

    pub fn add_item(&mut self, item: LineItem) {
        self.cart.push(item);
    }

    pub fn cart(&self) -> &[LineItem] {
        &self.cart
    }

    pub fn set_shipping(&mut self, details: ShippingDetails) {
        self.shipping = Some(details);
    }

    /// Attach the signed-in user; guests skip this
    pub fn set_user(&mut self, user_id: impl Into<String>) {
        self.user_id = Some(user_id.into());
    }

    /// Submit the cart as an order using the session's payment method.
    ///
    /// The cart is cleared only on success, so the shopper can retry after
    /// a failure without rebuilding it.
    pub async fn submit(
        &mut self,
        session: &CheckoutSession,
    ) -> ClientResult<CreateOrderResponse> {
        if self.cart.is_empty() {
            return Err(ClientError::Validation("cart is empty".into()));
        }
        let shipping = self
            .shipping
            .clone()
            .ok_or_else(|| ClientError::Validation("shipping details are required".into()))?;

        let payment = session.current();
        if session.expired() {
            return Err(ClientError::Validation(
                "bank transfer window expired".into(),
            ));
        }

        let request = CreateOrderRequest {
            user_id: self.user_id.clone(),
            items: self.cart.clone(),
            shipping_details: shipping.into(),
            payment_method: payment.method,
        };

        let url = format!("{}/api/orders", self.config.api_base_url);
        let response = self.http.post(&url).json(&request).send().await?;
        let envelope: ApiResponse<CreateOrderResponse> = response.json().await?;
        let created = into_data(envelope)?;

        tracing::info!(order_id = %created.order_id, total = %created.total, "Order submitted");
        self.cart.clear();
        Ok(created)
    }
}

/// Unwrap an API envelope, turning error codes into [`ClientError::Api`]
pub(crate) fn into_data<T>(envelope: ApiResponse<T>) -> ClientResult<T> {
    if envelope.code != 0 {
        return Err(ClientError::Api {
            code: envelope.code,
            message: envelope.message,
        });
    }
    envelope.data.ok_or_else(|| ClientError::Api {
        code: 0,
        message: "success response missing data".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::PaymentMethod;

    fn flow() -> OrderFlow {
        OrderFlow::new(ClientConfig::default()).unwrap()
    }

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            name: "Ada Obi".into(),
            email: "ada@example.com".into(),
            phone: "+2348012345678".into(),
            address: "12 Marina Rd".into(),
            city: "Lagos".into(),
            state: "Lagos".into(),
            note: None,
        }
    }

    fn item() -> LineItem {
        LineItem {
            product_id: "prod-1".into(),
            name: "Widget".into(),
            unit_price: "25.99".parse().unwrap(),
            quantity: 1,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_before_any_request() {
        let mut flow = flow();
        flow.set_shipping(shipping());
        let session = CheckoutSession::new(Decimal::from(3500));
        let err = flow.submit(&session).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_shipping_rejected() {
        let mut flow = flow();
        flow.add_item(item());
        let session = CheckoutSession::new(Decimal::from(3500));
        let err = flow.submit(&session).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_window_blocks_submission() {
        let mut flow = flow();
        flow.add_item(item());
        flow.set_shipping(shipping());

        let session = CheckoutSession::new(Decimal::from(3500));
        session.select_method(PaymentMethod::BankTransfer).unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(901)).await;
        tokio::task::yield_now().await;

        let err = flow.submit(&session).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_envelope_error_surfaces_as_api_error() {
        let envelope: ApiResponse<()> = ApiResponse {
            code: 5001,
            message: "Payment method is disabled".into(),
            data: None,
            details: None,
        };
        let err = into_data(envelope).unwrap_err();
        assert!(matches!(err, ClientError::Api { code: 5001, .. }));
    }
}
