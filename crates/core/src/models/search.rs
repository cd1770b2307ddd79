//! Search index documents.
//!
//! The search endpoint returns a flattened projection of products rather than
//! the full catalog record.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, VariantId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedVariant {
    pub id: VariantId,
    pub color: String,
    pub size: String,
    pub price: Price,
    pub stock: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedCategory {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub variants: Vec<IndexedVariant>,
    #[serde(default)]
    pub categories: Vec<IndexedCategory>,
}

impl IndexedProduct {
    /// Cheapest variant price, if any variant exists.
    #[must_use]
    pub fn starting_price(&self) -> Option<Price> {
        self.variants.iter().map(|variant| variant.price).min()
    }

    /// Comma-separated category names.
    #[must_use]
    pub fn category_names(&self) -> String {
        self.categories
            .iter()
            .map(|category| category.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
