//! Order placement after a confirmed payment.
//!
//! Placement is a fixed sequence of backend calls: create the order, add each
//! cart line to it, then empty the cart. There is no rollback. A failure
//! part-way leaves the order with the lines added so far, and the error says
//! which step failed so the customer can be told.

use thiserror::Error;
use threadline_backend::{BackendClient, BackendError, NewOrderItem};
use threadline_core::models::{CartItem, Order};
use threadline_core::{OrderId, UserId, VariantId};
use tracing::instrument;

/// Where order placement stopped.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The order itself could not be created; nothing was written.
    #[error("Failed to create order: {0}")]
    CreateOrder(#[source] BackendError),

    /// A line item was rejected. Earlier lines are already on the order.
    #[error("Failed to add variant {variant_id} to order {order_id}: {source}")]
    AddItem {
        order_id: OrderId,
        variant_id: VariantId,
        added: usize,
        #[source]
        source: BackendError,
    },

    /// The order is complete but the cart still holds its items.
    #[error("Order {order_id} placed but the cart was not cleared: {source}")]
    ClearCart {
        order_id: OrderId,
        #[source]
        source: BackendError,
    },
}

impl CheckoutError {
    /// Whether an order record exists despite the failure.
    #[must_use]
    pub const fn order_created(&self) -> bool {
        !matches!(self, Self::CreateOrder(_))
    }

    /// Text safe to show in a flash notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::CreateOrder(e) => format!(
                "Your payment went through but we could not create your order: {}",
                e.user_message()
            ),
            Self::AddItem { order_id, .. } => format!(
                "Your order {order_id} was created but not every item could be added. \
                 Please contact support."
            ),
            Self::ClearCart { order_id, .. } => format!(
                "Your order {order_id} was placed, but your cart could not be emptied."
            ),
        }
    }
}

/// Create an order for `payment_intent_id` holding every cart line, then
/// empty the cart.
///
/// Lines are added one at a time at their cart price. Placement stops at the
/// first rejected line.
///
/// # Errors
///
/// Returns a [`CheckoutError`] naming the step that failed.
#[instrument(skip(client, items), fields(user_id = %user_id, lines = items.len()))]
pub async fn place_order(
    client: &BackendClient,
    user_id: &UserId,
    payment_intent_id: &str,
    items: &[CartItem],
) -> Result<Order, CheckoutError> {
    let order = client
        .create_order(user_id, payment_intent_id)
        .await
        .map_err(CheckoutError::CreateOrder)?;

    for (added, item) in items.iter().enumerate() {
        let line = NewOrderItem {
            variant_id: item.variant_id.clone(),
            quantity: item.quantity,
            price_at_purchase: item.price,
        };
        if let Err(source) = client.add_order_item(&order.order_id, &line).await {
            return Err(CheckoutError::AddItem {
                order_id: order.order_id.clone(),
                variant_id: item.variant_id.clone(),
                added,
                source,
            });
        }
    }

    client
        .clear_cart(user_id)
        .await
        .map_err(|source| CheckoutError::ClearCart {
            order_id: order.order_id.clone(),
            source,
        })?;

    tracing::info!(order_id = %order.order_id, "Order placed");
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{delete, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use threadline_backend::BackendConfig;
    use tokio::sync::Mutex;
    use url::Url;

    use super::*;

    /// Records every call the checkout makes, in order.
    #[derive(Clone, Default)]
    struct Fake {
        calls: Arc<Mutex<Vec<String>>>,
        item_bodies: Arc<Mutex<Vec<Value>>>,
        reject_variant: Option<&'static str>,
    }

    async fn create_order(State(fake): State<Fake>, Json(body): Json<Value>) -> Json<Value> {
        fake.calls.lock().await.push("create_order".to_string());
        Json(json!({
            "orderId": "o1", "userId": body["userId"], "paymentIntentId": body["paymentIntentId"],
            "status": "pending", "createdAt": "2025-01-01T00:00:00Z", "items": []
        }))
    }

    async fn add_item(
        State(fake): State<Fake>,
        Path(order): Path<String>,
        Json(body): Json<Value>,
    ) -> StatusCode {
        let variant = body["variantId"].as_str().unwrap_or_default().to_string();
        fake.calls.lock().await.push(format!("add_item:{order}:{variant}"));
        if fake.reject_variant == Some(variant.as_str()) {
            return StatusCode::UNPROCESSABLE_ENTITY;
        }
        fake.item_bodies.lock().await.push(body);
        StatusCode::CREATED
    }

    async fn clear_cart(State(fake): State<Fake>, Path(user): Path<String>) -> StatusCode {
        fake.calls.lock().await.push(format!("clear_cart:{user}"));
        StatusCode::NO_CONTENT
    }

    async fn spawn(fake: Fake) -> BackendClient {
        let app = Router::new()
            .route("/api/orders", post(create_order))
            .route("/api/orders/{id}/items", post(add_item))
            .route("/api/users/{id}/cart", delete(clear_cart))
            .with_state(fake);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base = Url::parse(&format!("http://{addr}/api/")).unwrap();
        BackendClient::new(&BackendConfig::new(base))
            .unwrap()
            .authorized("token")
    }

    fn items() -> Vec<CartItem> {
        serde_json::from_value(json!([
            {"cartItemId": "i1", "variantId": "v1", "variantName": "Navy / M", "price": 19.99, "quantity": 2},
            {"cartItemId": "i2", "variantId": "v2", "variantName": "Sand / L", "price": 5.5, "quantity": 1},
            {"cartItemId": "i3", "variantId": "v3", "variantName": "Red / S", "price": 7.0, "quantity": 4}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_places_order_in_sequence() {
        let fake = Fake::default();
        let client = spawn(fake.clone()).await;

        let order = place_order(&client, &UserId::new("u1"), "pi_123", &items())
            .await
            .unwrap();
        assert_eq!(order.order_id.as_str(), "o1");
        assert_eq!(order.payment_intent_id, "pi_123");

        let calls = fake.calls.lock().await.clone();
        assert_eq!(
            calls,
            vec![
                "create_order",
                "add_item:o1:v1",
                "add_item:o1:v2",
                "add_item:o1:v3",
                "clear_cart:u1"
            ]
        );

        let bodies = fake.item_bodies.lock().await.clone();
        assert_eq!(
            bodies[0],
            json!({"variantId": "v1", "quantity": 2, "priceAtPurchase": 19.99})
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_rejected_line() {
        let fake = Fake {
            reject_variant: Some("v2"),
            ..Fake::default()
        };
        let client = spawn(fake.clone()).await;

        let err = place_order(&client, &UserId::new("u1"), "pi_123", &items())
            .await
            .unwrap_err();
        assert!(err.order_created());
        match &err {
            CheckoutError::AddItem {
                variant_id, added, ..
            } => {
                assert_eq!(variant_id.as_str(), "v2");
                assert_eq!(*added, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.user_message().contains("o1"));

        let calls = fake.calls.lock().await.clone();
        assert_eq!(calls, vec!["create_order", "add_item:o1:v1", "add_item:o1:v2"]);
    }

    #[tokio::test]
    async fn test_empty_cart_still_creates_order_and_clears() {
        let fake = Fake::default();
        let client = spawn(fake.clone()).await;

        place_order(&client, &UserId::new("u9"), "pi_9", &[])
            .await
            .unwrap();
        let calls = fake.calls.lock().await.clone();
        assert_eq!(calls, vec!["create_order", "clear_cart:u9"]);
    }
}
