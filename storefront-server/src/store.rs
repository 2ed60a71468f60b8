//! Order store seam
//!
//! Durable persistence is an external collaborator reached through a thin
//! request/response contract, so the server only depends on the [`OrderStore`]
//! trait. [`MemoryStore`] backs the server in development and tests; a
//! spreadsheet- or database-backed implementation plugs in at the same seam.

use async_trait::async_trait;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderStatus};
use shared::util::now_millis;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Async order persistence contract
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> AppResult<()>;

    async fn get(&self, id: &str) -> AppResult<Option<Order>>;

    /// Orders belonging to a user, newest first
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Order>>;

    /// Apply a status transition and return the updated order
    async fn update_status(&self, id: &str, status: OrderStatus) -> AppResult<Order>;

    /// Look up a bank-transfer order by its payment reference
    async fn find_by_reference(&self, reference: &str) -> AppResult<Option<Order>>;
}

/// In-memory order store
#[derive(Debug, Default)]
pub struct MemoryStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: Order) -> AppResult<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get(&self, id: &str) -> AppResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update_status(&self, id: &str, status: OrderStatus) -> AppResult<Order> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(id)
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        if order.status.is_terminal() {
            return Err(AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("order {} is already {}", id, order.status),
            ));
        }

        order.status = status;
        order.updated_at = now_millis();
        Ok(order.clone())
    }

    async fn find_by_reference(&self, reference: &str) -> AppResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .find(|o| o.payment_reference.as_deref() == Some(reference))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{LineItem, PaymentMethod, ShippingDetails};
    use shared::util::order_id;

    fn sample_order(user_id: Option<&str>) -> Order {
        let items = vec![LineItem {
            product_id: "prod-1".into(),
            name: "Widget".into(),
            unit_price: "25.99".parse().unwrap(),
            quantity: 2,
            image_url: None,
        }];
        let subtotal = Order::subtotal_of(&items);
        Order {
            id: order_id(),
            user_id: user_id.map(String::from),
            items,
            shipping: ShippingDetails {
                name: "Ada Obi".into(),
                email: "ada@example.com".into(),
                phone: "+2348012345678".into(),
                address: "12 Marina Rd".into(),
                city: "Lagos".into(),
                state: "Lagos".into(),
                note: None,
            },
            payment_method: PaymentMethod::PayOnDelivery,
            status: OrderStatus::Pending,
            subtotal,
            shipping_fee: "3500".parse().unwrap(),
            total: subtotal + "3500".parse::<rust_decimal::Decimal>().unwrap(),
            payment_reference: None,
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryStore::new();
        let order = sample_order(None);
        let id = order.id.clone();

        store.insert(order).await.unwrap();
        let loaded = store.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.status, OrderStatus::Pending);

        assert!(store.get("ORD-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_for_user_filters_and_sorts() {
        let store = MemoryStore::new();
        store.insert(sample_order(Some("user-1"))).await.unwrap();
        store.insert(sample_order(Some("user-2"))).await.unwrap();

        let mut newer = sample_order(Some("user-1"));
        newer.created_at += 1000;
        let newer_id = newer.id.clone();
        store.insert(newer).await.unwrap();

        let listed = store.list_for_user("user-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer_id);
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = MemoryStore::new();
        let order = sample_order(None);
        let id = order.id.clone();
        store.insert(order).await.unwrap();

        let updated = store
            .update_status(&id, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Processing);

        let err = store
            .update_status("ORD-missing", OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn test_terminal_status_rejects_transition() {
        let store = MemoryStore::new();
        let order = sample_order(None);
        let id = order.id.clone();
        store.insert(order).await.unwrap();

        store
            .update_status(&id, OrderStatus::Cancelled)
            .await
            .unwrap();
        let err = store
            .update_status(&id, OrderStatus::Processing)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
    }

    #[tokio::test]
    async fn test_find_by_reference() {
        let store = MemoryStore::new();
        let mut order = sample_order(None);
        order.payment_method = PaymentMethod::BankTransfer;
        order.payment_reference = Some("PAY-123-abcd".into());
        let id = order.id.clone();
        store.insert(order).await.unwrap();

        let found = store.find_by_reference("PAY-123-abcd").await.unwrap();
        assert_eq!(found.unwrap().id, id);
        assert!(store.find_by_reference("PAY-none").await.unwrap().is_none());
    }
}
