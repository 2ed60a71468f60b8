//! Shared harness for integration tests
#![allow(dead_code)]

use rust_decimal::Decimal;
use shared::models::{LineItem, Order, OrderStatus, PaymentMethod, ShippingDetails};
use shared::util::now_millis;
use std::net::SocketAddr;
use std::time::Duration;
use storefront_server::core::{Config, Server, ServerState};
use tokio::net::TcpListener;

pub fn test_config() -> Config {
    Config {
        http_port: 0,
        inventory_webhook_url: None,
        webhook_secret: "test-webhook-secret".into(),
        webhook_timeout: Duration::from_secs(2),
        websocket_url: "ws://localhost:0/ws".into(),
        site_url: "http://localhost:3000".into(),
        base_shipping_fee: Decimal::from(3500),
        jwt_secret: "test-jwt-secret".into(),
        environment: "test".into(),
    }
}

/// Serve `state` on an ephemeral port, returning the bound address
pub async fn spawn_server(state: ServerState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::new(state);
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });
    addr
}

pub fn shipping() -> ShippingDetails {
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

pub fn line_item(product_id: &str, unit_price: &str, quantity: u32) -> LineItem {
    LineItem {
        product_id: product_id.into(),
        name: format!("Product {product_id}"),
        unit_price: unit_price.parse().unwrap(),
        quantity,
        image_url: None,
    }
}

pub fn sample_order(user_id: Option<&str>) -> Order {
    let items = vec![line_item("prod-1", "25.99", 1)];
    let subtotal = Order::subtotal_of(&items);
    let now = now_millis();
    Order {
        id: format!("ORD-{now}-test"),
        user_id: user_id.map(String::from),
        items,
        shipping: shipping(),
        payment_method: PaymentMethod::PayOnDelivery,
        status: OrderStatus::Pending,
        subtotal,
        shipping_fee: Decimal::from(3500),
        total: subtotal + Decimal::from(3500),
        payment_reference: None,
        created_at: now,
        updated_at: now,
    }
}

/// Request body for raw HTTP order creation
pub fn order_body(payment_method: &str) -> serde_json::Value {
    serde_json::json!({
        "items": [
            { "product_id": "prod-1", "name": "Widget", "unit_price": 25.99, "quantity": 2 },
            { "product_id": "prod-2", "name": "Gadget", "unit_price": 10.00, "quantity": 1 }
        ],
        "shipping_details": {
            "name": "Ada Obi",
            "email": "ada@example.com",
            "phone": "+2348012345678",
            "address": "12 Marina Rd",
            "city": "Lagos",
            "state": "Lagos"
        },
        "payment_method": payment_method
    })
}
