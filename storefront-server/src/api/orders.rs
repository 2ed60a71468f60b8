//! Order endpoints - creation, lookup, status transitions, payment confirmation

use async_trait::async_trait;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use http::StatusCode;
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderStatus, OrderStatusUpdate, PaymentMethod};
use shared::request::{
    ConfirmPaymentRequest, CreateOrderRequest, CreateOrderResponse, PaymentStatusResponse,
    UpdateStatusRequest,
};
use shared::response::ApiResponse;
use shared::util::{now_millis, order_id, payment_reference};
use validator::Validate;

use crate::auth::{CurrentUser, MaybeUser};
use crate::core::ServerState;

/// Price/stock re-validation hook invoked before an order is persisted
///
/// The storefront trusts prices sent by its own client by default; a catalog
/// or inventory service plugs in here to re-check them.
#[async_trait]
pub trait OrderValidator: Send + Sync {
    async fn validate(&self, request: &CreateOrderRequest) -> AppResult<()>;
}

/// Default hook: accept the request as sent
#[derive(Debug, Default)]
pub struct TrustedClientValidator;

#[async_trait]
impl OrderValidator for TrustedClientValidator {
    async fn validate(&self, _request: &CreateOrderRequest) -> AppResult<()> {
        Ok(())
    }
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<ServerState>,
    MaybeUser(user): MaybeUser,
    Json(request): Json<CreateOrderRequest>,
) -> AppResult<impl IntoResponse> {
    request
        .validate()
        .map_err(|e| validation_error(&e))?;

    if !request.payment_method.is_enabled() {
        return Err(AppError::with_message(
            ErrorCode::PaymentMethodDisabled,
            format!("{} payments are currently unavailable", request.payment_method),
        ));
    }

    if request.items.iter().any(|item| item.quantity == 0) {
        return Err(AppError::new(ErrorCode::InvalidQuantity));
    }

    state.order_validator.validate(&request).await?;

    // An authenticated caller owns the order regardless of what the body says
    let user_id = user.map(|u| u.id).or(request.user_id);

    let subtotal = Order::subtotal_of(&request.items);
    let shipping_fee = request
        .payment_method
        .shipping_fee(state.config.base_shipping_fee);
    let reference = request
        .payment_method
        .requires_verification()
        .then(payment_reference);

    let now = now_millis();
    let order = Order {
        id: order_id(),
        user_id,
        items: request.items,
        shipping: request.shipping_details.into(),
        payment_method: request.payment_method,
        status: OrderStatus::Pending,
        subtotal,
        shipping_fee,
        total: subtotal + shipping_fee,
        payment_reference: reference,
        created_at: now,
        updated_at: now,
    };

    state.store.insert(order.clone()).await?;
    tracing::info!(
        order_id = %order.id,
        payment_method = %order.payment_method,
        total = %order.total,
        "Order created"
    );

    let response = CreateOrderResponse {
        order_id: order.id.clone(),
        total: order.total,
        status: order.status,
        payment_reference: order.payment_reference.clone(),
    };

    // Notification fan-out and receipt delivery run off the request path
    let notify_state = state.clone();
    tokio::spawn(async move {
        let site_url = notify_state.config.site_url.clone();
        if let Err(e) = notify_state.receipts.send(&order, &site_url).await {
            tracing::warn!(order_id = %order.id, error = %e, "Receipt delivery failed");
        }
        notify_state.notifier.notify_new_order(order).await;
    });

    Ok((StatusCode::CREATED, ApiResponse::ok(response)))
}

/// GET /api/orders - the authenticated user's orders, newest first
pub async fn list_orders(
    State(state): State<ServerState>,
    MaybeUser(user): MaybeUser,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let user = user.ok_or_else(AppError::not_authenticated)?;
    let orders = state.store.list_for_user(&user.id).await?;
    Ok(ApiResponse::ok(orders))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<ServerState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    check_ownership(&order, user.as_ref())?;
    Ok(ApiResponse::ok(order))
}

/// PATCH /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.store.update_status(&id, request.status).await?;
    tracing::info!(order_id = %order.id, status = %order.status, "Order status updated");

    let update = OrderStatusUpdate {
        order_id: order.id.clone(),
        status: order.status,
        updated_at: order.updated_at,
    };
    let notify_state = state.clone();
    let notify_order = order.clone();
    tokio::spawn(async move {
        notify_state
            .notifier
            .notify_status_update(&notify_order, update)
            .await;
    });

    Ok(ApiResponse::ok(order))
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusQuery {
    pub reference: String,
}

/// GET /api/orders/payment-status?reference=
///
/// Polled by clients holding a pending bank-transfer order.
pub async fn payment_status(
    State(state): State<ServerState>,
    Query(query): Query<PaymentStatusQuery>,
) -> AppResult<ApiResponse<PaymentStatusResponse>> {
    let order = state
        .store
        .find_by_reference(&query.reference)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PaymentReferenceNotFound))?;

    // Only fulfilment states count as confirmed; a cancelled order must
    // not redirect the shopper to order confirmation
    let confirmed = matches!(
        order.status,
        OrderStatus::Processing
            | OrderStatus::Fulfilled
            | OrderStatus::Shipped
            | OrderStatus::Delivered
    );
    Ok(ApiResponse::ok(PaymentStatusResponse {
        reference: query.reference,
        confirmed,
        order_id: order.id,
    }))
}

/// POST /api/orders/{id}/confirm-payment
///
/// Marks a pending bank-transfer order as paid. Confirming an order that has
/// already moved past `pending` is a no-op success.
pub async fn confirm_payment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> AppResult<ApiResponse<Order>> {
    let order = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if order.payment_method != PaymentMethod::BankTransfer {
        return Err(AppError::invalid_request(
            "only bank-transfer orders require payment confirmation",
        ));
    }
    if order.payment_reference.as_deref() != Some(request.reference.as_str()) {
        return Err(AppError::new(ErrorCode::PaymentReferenceNotFound));
    }
    if order.status != OrderStatus::Pending {
        return Ok(ApiResponse::ok(order));
    }

    let order = state
        .store
        .update_status(&id, OrderStatus::Processing)
        .await?;
    tracing::info!(order_id = %order.id, "Bank transfer payment confirmed");

    let update = OrderStatusUpdate {
        order_id: order.id.clone(),
        status: order.status,
        updated_at: order.updated_at,
    };
    let notify_state = state.clone();
    let notify_order = order.clone();
    tokio::spawn(async move {
        notify_state
            .notifier
            .notify_status_update(&notify_order, update)
            .await;
    });

    Ok(ApiResponse::ok(order))
}

/// Who may read an order:
/// - guest orders (no owner) are readable by anyone holding the id
/// - owned orders require the owner's token
fn check_ownership(order: &Order, user: Option<&CurrentUser>) -> AppResult<()> {
    match (&order.user_id, user) {
        (None, _) => Ok(()),
        (Some(owner), Some(user)) if *owner == user.id => Ok(()),
        (Some(_), Some(_)) => Err(AppError::permission_denied(
            "order belongs to another account",
        )),
        (Some(_), None) => Err(AppError::not_authenticated()),
    }
}

fn validation_error(errors: &validator::ValidationErrors) -> AppError {
    let mut err = AppError::new(ErrorCode::ValidationFailed);
    for (field, field_errors) in errors.field_errors() {
        if let Some(first) = field_errors.first() {
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| first.code.to_string());
            err = err.with_detail(field.to_string(), message);
        }
    }
    err
}
