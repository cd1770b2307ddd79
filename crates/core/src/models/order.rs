//! Orders and their line items.

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;
use crate::types::{OrderId, OrderItemId, OrderStatus, Price, UserId, VariantId};

/// Delivery estimate shown to customers, counted from the order date.
pub const ESTIMATED_DELIVERY_DAYS: u64 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_item_id: OrderItemId,
    pub variant_id: VariantId,
    #[serde(default)]
    pub variant_name: String,
    pub quantity: u32,
    pub price_at_purchase: Price,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price_at_purchase * self.quantity
    }
}

/// A finalized purchase tied to a payment confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub payment_intent_id: String,
    pub status: OrderStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Order date plus [`ESTIMATED_DELIVERY_DAYS`].
    #[must_use]
    pub fn estimated_arrival(&self) -> DateTime<Utc> {
        self.created_at
            .checked_add_days(Days::new(ESTIMATED_DELIVERY_DAYS))
            .unwrap_or(self.created_at)
    }
}

/// Split orders into those still in progress and those that are finished.
///
/// Relative order within each group is preserved.
#[must_use]
pub fn partition_by_progress(orders: Vec<Order>) -> (Vec<Order>, Vec<Order>) {
    orders.into_iter().partition(|order| order.status.is_open())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            order_id: OrderId::new(id),
            user_id: UserId::new("u1"),
            payment_intent_id: format!("pi_{id}"),
            status,
            created_at: Utc.with_ymd_and_hms(2025, 1, 30, 12, 0, 0).unwrap(),
            items: vec![OrderItem {
                order_item_id: OrderItemId::new(format!("{id}-1")),
                variant_id: VariantId::new("v1"),
                variant_name: "Navy / M".to_owned(),
                quantity: 3,
                price_at_purchase: Price::from_cents(1250),
            }],
        }
    }

    #[test]
    fn test_estimated_arrival_is_fourteen_days_later() {
        let arrival = order("o1", OrderStatus::Pending).estimated_arrival();
        assert_eq!(arrival, Utc.with_ymd_and_hms(2025, 2, 13, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_partition_by_progress() {
        let (open, done) = partition_by_progress(vec![
            order("o1", OrderStatus::Delivered),
            order("o2", OrderStatus::Pending),
            order("o3", OrderStatus::Cancelled),
            order("o4", OrderStatus::Shipped),
        ]);
        let ids = |orders: &[Order]| -> Vec<String> {
            orders.iter().map(|o| o.order_id.to_string()).collect()
        };
        assert_eq!(ids(&open), vec!["o2", "o4"]);
        assert_eq!(ids(&done), vec!["o1", "o3"]);
    }

    #[test]
    fn test_order_total() {
        assert_eq!(order("o1", OrderStatus::Pending).total(), Price::from_cents(3750));
    }

    #[test]
    fn test_deserializes_lowercase_status() {
        let json = r#"{"orderId":"o1","userId":"u1","paymentIntentId":"pi_1",
            "status":"delivered","createdAt":"2025-01-30T12:00:00Z","items":[]}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
    }
}
