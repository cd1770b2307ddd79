//! Saved-for-later products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;
use crate::types::{ProductId, UserId, WishlistItemId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub wishlist_item_id: WishlistItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    #[serde(with = "timestamp")]
    pub added_at: DateTime<Utc>,
}
