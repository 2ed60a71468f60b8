//! Domain models shared between the server and client crates

mod order;

pub use order::{
    LineItem, Order, OrderStatus, OrderStatusUpdate, PaymentMethod, ShippingDetails,
};
