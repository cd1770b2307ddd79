//! Request and response bodies that are not catalog records.

use serde::{Deserialize, Serialize};
use threadline_core::models::{Category, Product, Variant};
use threadline_core::{CategoryId, Price, ProductId, UserId, UserRole, VariantId};

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Issued bearer token and its lifetime in seconds.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpdateUserRequest {
    pub role: UserRole,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Name,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Optional filters for the product listing.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

impl ProductFilter {
    /// Only products that are not archived.
    #[must_use]
    pub fn active() -> Self {
        Self {
            is_archived: Some(false),
            ..Self::default()
        }
    }
}

/// One page of products and the unpaginated total.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedProducts {
    pub total_products: u64,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub is_archived: bool,
    pub variants: Vec<Variant>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    pub description: String,
    pub is_archived: bool,
    pub categories: Vec<Category>,
}

// =============================================================================
// Variants & images
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVariant {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub price: Price,
    pub stock: i32,
    pub sku: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantUpdate {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub price: Price,
    pub stock: i32,
    pub sku: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewImage {
    pub variant_id: VariantId,
    pub image_url: String,
    pub is_default: bool,
}

/// Result of storing a file in object storage.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_name: String,
    pub file_url: String,
}

/// A file received from a browser form, ready to forward.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CategoryName<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategoryLink<'a> {
    pub category_id: &'a CategoryId,
    pub product_id: &'a ProductId,
}

// =============================================================================
// Carts, orders, payments
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItem {
    pub variant_id: VariantId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: UserId,
    pub payment_intent_id: String,
    pub status: threadline_core::OrderStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub variant_id: VariantId,
    pub quantity: u32,
    pub price_at_purchase: Price,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PaymentIntentRequest {
    /// Amount in cents.
    pub amount: i64,
}

/// Client secret handed to the payment SDK in the browser.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
}

impl PaymentIntent {
    /// The intent id is the client secret's prefix before `_secret_`.
    #[must_use]
    pub fn id(&self) -> &str {
        self.client_secret
            .split_once("_secret_")
            .map_or(self.client_secret.as_str(), |(id, _)| id)
    }
}

impl std::fmt::Debug for PaymentIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentIntent")
            .field("id", &self.id())
            .finish_non_exhaustive()
    }
}

/// Wishlist entries resolved to products.
#[derive(Debug, Clone, Default)]
pub struct WishlistProducts {
    /// Products still in the catalog, in wishlist order.
    pub products: Vec<Product>,
    /// Saved products the catalog no longer has.
    pub unavailable: Vec<ProductId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistProduct<'a> {
    pub product_id: &'a ProductId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_skips_unset_fields() {
        let filter = ProductFilter {
            sort_by: Some(SortBy::CreatedAt),
            sort_direction: Some(SortDirection::Desc),
            ..ProductFilter::active()
        };
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"sortBy": "createdAt", "sortDirection": "desc", "isArchived": false})
        );
    }

    #[test]
    fn test_payment_intent_id_from_secret() {
        let intent = PaymentIntent {
            client_secret: "pi_3Abc_secret_xyz".to_string(),
        };
        assert_eq!(intent.id(), "pi_3Abc");
        assert!(!format!("{intent:?}").contains("xyz"));
    }

    #[test]
    fn test_order_item_serializes_price_as_number() {
        let item = NewOrderItem {
            variant_id: VariantId::new("v1"),
            quantity: 2,
            price_at_purchase: Price::from_cents(1999),
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            serde_json::json!({"variantId": "v1", "quantity": 2, "priceAtPurchase": 19.99})
        );
    }

    #[test]
    fn test_login_response_debug_redacts_token() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"token":"jwt.value","expiresIn":3600}"#).unwrap();
        assert_eq!(response.expires_in, 3600);
        assert!(!format!("{response:?}").contains("jwt.value"));
    }
}
