//! HTTP API routes

pub mod health;
pub mod notifications;
pub mod orders;

use axum::Router;
use axum::routing::{get, patch, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::realtime;

/// Build the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route(
            "/api/orders/notifications",
            get(notifications::order_notifications),
        )
        .route("/api/orders/payment-status", get(orders::payment_status))
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/status", patch(orders::update_status))
        .route(
            "/api/orders/{id}/confirm-payment",
            post(orders::confirm_payment),
        )
        .route("/ws", get(realtime::handle_ws))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
