//! API request/response DTOs shared between the server and client crates

use crate::models::{LineItem, OrderStatus, PaymentMethod, ShippingDetails};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// `POST /api/orders` body
///
/// Validation covers presence only; price/stock re-validation is left to the
/// server's configurable validation hook.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    /// None for guest checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[validate(length(min = 1, message = "order must contain at least one item"))]
    pub items: Vec<LineItem>,
    #[validate(nested)]
    pub shipping_details: ShippingValidated,
    pub payment_method: PaymentMethod,
}

/// Shipping details with presence validation on the required fields
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShippingValidated {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "state is required"))]
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<ShippingValidated> for ShippingDetails {
    fn from(v: ShippingValidated) -> Self {
        Self {
            name: v.name,
            email: v.email,
            phone: v.phone,
            address: v.address,
            city: v.city,
            state: v.state,
            note: v.note,
        }
    }
}

impl From<ShippingDetails> for ShippingValidated {
    fn from(d: ShippingDetails) -> Self {
        Self {
            name: d.name,
            email: d.email,
            phone: d.phone,
            address: d.address,
            city: d.city,
            state: d.state,
            note: d.note,
        }
    }
}

/// `POST /api/orders` success payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub total: Decimal,
    pub status: OrderStatus,
    /// Present only for bank-transfer orders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

/// `PATCH /api/orders/{id}/status` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// `POST /api/orders/{id}/confirm-payment` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
    /// Must match the reference issued at checkout
    pub reference: String,
}

/// `GET /api/orders/payment-status?reference=` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub reference: String,
    pub confirmed: bool,
    pub order_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping() -> ShippingValidated {
        ShippingValidated {
            name: "Ada Obi".into(),
            email: "ada@example.com".into(),
            phone: "+2348012345678".into(),
            address: "12 Marina Rd".into(),
            city: "Lagos".into(),
            state: "Lagos".into(),
            note: None,
        }
    }

    fn line_item() -> LineItem {
        LineItem {
            product_id: "prod-1".into(),
            name: "Widget".into(),
            unit_price: "25.99".parse().unwrap(),
            quantity: 1,
            image_url: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let req = CreateOrderRequest {
            user_id: None,
            items: vec![line_item()],
            shipping_details: shipping(),
            payment_method: PaymentMethod::PayOnDelivery,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_items_rejected() {
        let req = CreateOrderRequest {
            user_id: None,
            items: vec![],
            shipping_details: shipping(),
            payment_method: PaymentMethod::PayOnDelivery,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_missing_email_rejected() {
        let mut details = shipping();
        details.email = "not-an-email".into();
        let req = CreateOrderRequest {
            user_id: None,
            items: vec![line_item()],
            shipping_details: details,
            payment_method: PaymentMethod::BankTransfer,
        };
        assert!(req.validate().is_err());
    }
}
