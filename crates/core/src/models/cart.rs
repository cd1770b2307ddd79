//! Shopping cart records and totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;
use crate::types::{CartId, CartItemId, Price, UserId, VariantId};

/// A quantity of one variant in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub cart_item_id: CartItemId,
    pub variant_id: VariantId,
    #[serde(default)]
    pub variant_name: String,
    pub price: Price,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub cart_id: CartId,
    pub user_id: UserId,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Sum of price × quantity over every item.
    #[must_use]
    pub fn total(&self) -> Price {
        cart_total(&self.items)
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Sum of price × quantity over `items`.
#[must_use]
pub fn cart_total(items: &[CartItem]) -> Price {
    items.iter().map(CartItem::line_total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, cents: i64, quantity: u32) -> CartItem {
        CartItem {
            cart_item_id: CartItemId::new(id),
            variant_id: VariantId::new(format!("v-{id}")),
            variant_name: format!("Variant {id}"),
            price: Price::from_cents(cents),
            quantity,
        }
    }

    #[test]
    fn test_total_is_sum_of_price_times_quantity() {
        let items = vec![item("a", 1999, 2), item("b", 550, 3), item("c", 1, 1)];
        assert_eq!(cart_total(&items), Price::from_cents(1999 * 2 + 550 * 3 + 1));
        assert_eq!(cart_total(&items).to_cents(), 5649);
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        assert_eq!(cart_total(&[]), Price::ZERO);
    }

    #[test]
    fn test_deserializes_cart_with_naive_timestamp() {
        let json = r#"{
            "cartId": "c1",
            "userId": "u1",
            "createdAt": "2025-03-01T10:15:00.123",
            "items": [{"cartItemId": "ci1", "variantId": "v1", "variantName": "Navy / M", "price": 10.5, "quantity": 2}]
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Price::from_cents(2100));
    }
}
