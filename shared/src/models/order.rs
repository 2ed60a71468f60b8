//! Order domain model
//!
//! Orders are created by checkout submission, mutated only by status
//! transitions, and never deleted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment method selected at checkout
///
/// `Card` exists on the wire but is disabled - submissions selecting it are
/// rejected with `PaymentMethodDisabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    PayOnDelivery,
    PayOnPickup,
}

impl PaymentMethod {
    /// Whether this method can be used for checkout
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Card)
    }

    /// Shipping fee applied for this method
    ///
    /// Pickup orders carry no shipping fee; every other method pays the
    /// configured base fee.
    pub fn shipping_fee(&self, base_fee: Decimal) -> Decimal {
        match self {
            Self::PayOnPickup => Decimal::ZERO,
            _ => base_fee,
        }
    }

    /// Whether payment must be verified out-of-band before fulfilment
    ///
    /// Only bank transfers await a manual confirmation; delivery and pickup
    /// orders are settled on handover.
    pub fn requires_verification(&self) -> bool {
        matches!(self, Self::BankTransfer)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Card => write!(f, "card"),
            Self::BankTransfer => write!(f, "bank_transfer"),
            Self::PayOnDelivery => write!(f, "pay_on_delivery"),
            Self::PayOnPickup => write!(f, "pay_on_pickup"),
        }
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Fulfilled,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Fulfilled => write!(f, "fulfilled"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A single product line on an order - immutable once attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product reference
    pub product_id: String,
    /// Display name (snapshot at purchase time)
    pub name: String,
    /// Unit price (snapshot at purchase time)
    pub unit_price: Decimal,
    /// Quantity, always >= 1
    pub quantity: u32,
    /// Optional product image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl LineItem {
    /// Line total: unit price × quantity
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Customer shipping record captured at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A placed order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Generated as `ORD-<millis>-<random>` - unique, sortable by creation
    pub id: String,
    /// None for guest checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub items: Vec<LineItem>,
    pub shipping: ShippingDetails,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    /// Bank-transfer reference, present only for bank-transfer orders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Last status change timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Order {
    /// Sum of line totals
    pub fn subtotal_of(items: &[LineItem]) -> Decimal {
        items.iter().map(LineItem::total).sum()
    }
}

/// Status-delta pushed through the notification pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub order_id: String,
    pub status: OrderStatus,
    /// Unix milliseconds
    pub updated_at: i64,
}
