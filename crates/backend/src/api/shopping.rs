//! Carts, orders, wishlists, search and payment intents.

use reqwest::Method;
use threadline_core::models::{Cart, IndexedProduct, Order, WishlistItem};
use threadline_core::{CartItemId, OrderId, OrderStatus, ProductId, UserId};
use tracing::instrument;

use crate::client::BackendClient;
use crate::error::BackendError;
use crate::requests::{
    AddCartItem, NewOrder, NewOrderItem, PaymentIntent, PaymentIntentRequest, WishlistProduct,
    WishlistProducts,
};

impl BackendClient {
    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the user has no cart yet.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: &UserId) -> Result<Cart, BackendError> {
        let request = self.request(Method::GET, &["users", user_id.as_str(), "cart"])?;
        self.send_json(request).await
    }

    /// Create an empty cart for a newly registered user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn create_cart(&self, user_id: &UserId) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, &["users", user_id.as_str(), "cart"])?
            .json(&serde_json::json!({ "userId": user_id }));
        self.send_empty(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the item (e.g. not enough stock).
    #[instrument(skip(self, item), fields(user_id = %user_id, variant_id = %item.variant_id, quantity = item.quantity))]
    pub async fn add_cart_item(
        &self,
        user_id: &UserId,
        item: &AddCartItem,
    ) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, &["users", user_id.as_str(), "cart", "items"])?
            .json(item);
        self.send_empty(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, cart_item_id = %item_id))]
    pub async fn remove_cart_item(
        &self,
        user_id: &UserId,
        item_id: &CartItemId,
    ) -> Result<(), BackendError> {
        let request = self.request(
            Method::DELETE,
            &["users", user_id.as_str(), "cart", "items", item_id.as_str()],
        )?;
        self.send_empty(request).await
    }

    /// Remove every item from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: &UserId) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, &["users", user_id.as_str(), "cart"])?;
        self.send_empty(request).await
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, BackendError> {
        let request = self.request(Method::GET, &["orders", "user", user_id.as_str()])?;
        self.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, BackendError> {
        let request = self.request(Method::GET, &["orders", id.as_str()])?;
        self.send_json(request).await
    }

    /// Open a pending order for a confirmed payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn create_order(
        &self,
        user_id: &UserId,
        payment_intent_id: &str,
    ) -> Result<Order, BackendError> {
        let request = self.request(Method::POST, &["orders"])?.json(&NewOrder {
            user_id: user_id.clone(),
            payment_intent_id: payment_intent_id.to_string(),
            status: OrderStatus::Pending,
        });
        self.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, item), fields(order_id = %order_id, variant_id = %item.variant_id))]
    pub async fn add_order_item(
        &self,
        order_id: &OrderId,
        item: &NewOrderItem,
    ) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, &["orders", order_id.as_str(), "items"])?
            .json(item);
        self.send_empty(request).await?;
        // Stock moved; the owning product is unknown here.
        self.cache().invalidate_all();
        Ok(())
    }

    // =========================================================================
    // Wishlist Methods
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn wishlist_items(&self, user_id: &UserId) -> Result<Vec<WishlistItem>, BackendError> {
        let request = self.request(Method::GET, &["users", user_id.as_str(), "wishlist"])?;
        self.send_json(request).await
    }

    /// Wishlist entries resolved to full products, in wishlist order.
    ///
    /// Products are fetched one after another. Entries whose product was
    /// deleted are reported in `unavailable` instead of failing the list.
    ///
    /// # Errors
    ///
    /// Returns the first error other than a missing product.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn wishlist_products(
        &self,
        user_id: &UserId,
    ) -> Result<WishlistProducts, BackendError> {
        let items = self.wishlist_items(user_id).await?;
        let mut resolved = WishlistProducts {
            products: Vec::with_capacity(items.len()),
            unavailable: Vec::new(),
        };
        for item in items {
            match self.get_product(&item.product_id).await {
                Ok(product) => resolved.products.push(product),
                Err(e) if e.is_not_found() => {
                    tracing::warn!(product_id = %item.product_id, "Wishlist product no longer exists");
                    resolved.unavailable.push(item.product_id);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(resolved)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_wishlist_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, &["users", user_id.as_str(), "wishlist", "items"])?
            .json(&WishlistProduct { product_id });
        self.send_empty(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_wishlist_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        let request = self
            .request(Method::DELETE, &["users", user_id.as_str(), "wishlist", "items"])?
            .json(&WishlistProduct { product_id });
        self.send_empty(request).await
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Full-text product search.
    ///
    /// A blank query returns no results without contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<IndexedProduct>, BackendError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .request(Method::GET, &["search"])?
            .query(&[("q", query)]);
        self.send_json(request).await
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Create a payment intent for `amount_cents` and return its client
    /// secret for the browser-side payment SDK.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn create_payment_intent(
        &self,
        amount_cents: i64,
    ) -> Result<PaymentIntent, BackendError> {
        let request = self
            .request(Method::POST, &["payments", "create-payment-intent"])?
            .json(&PaymentIntentRequest {
                amount: amount_cents,
            });
        self.send_json(request).await
    }
}
