//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (category tiles + catalog)
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database)
//!
//! # Products
//! GET  /products/{id}             - Product detail (?color=&size=&page=)
//! GET  /products/{id}/gallery     - Gallery page fragment (HTMX)
//! GET  /products/{id}/lightbox    - Lightbox frame fragment (HTMX)
//!
//! # Cart (requires auth except the badge)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add selected variant
//! POST /cart/items/{id}/remove    - Remove a line
//! GET  /cart/count                - Cart count badge (fragment)
//! GET  /variants/{id}/preview     - Variant preview (fragment)
//!
//! # Checkout (requires auth, rate limited)
//! GET  /checkout                  - Create payment intent, render card form
//! POST /checkout/complete         - Place the order after payment
//!
//! # Search
//! GET  /search                    - Results page
//! GET  /search/suggest            - Suggestions fragment (HTMX)
//!
//! # Wishlist (requires auth except the carousel)
//! GET  /wishlist                  - Wishlist page
//! POST /wishlist/{id}             - Save product
//! POST /wishlist/{id}/remove      - Remove product
//! GET  /wishlist/{id}/carousel    - Carousel frame fragment (HTMX)
//!
//! # Orders (requires auth)
//! GET  /orders                    - Open and completed orders
//! GET  /orders/{id}               - Order detail
//!
//! # Auth (login/register rate limited)
//! GET  /auth                      - Sign-in / registration page
//! POST /auth/login                - Login action
//! POST /auth/register             - Register action
//! POST /auth/logout               - Logout action
//!
//! # Preferences
//! POST /preferences/theme         - Toggle light/dark theme
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod preferences;
pub mod products;
pub mod search;
pub mod views;
pub mod wishlist;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};

use crate::filters;
use crate::middleware::{PageContext, auth_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|value| value.as_bytes() == b"true")
}

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub page: PageContext,
}

/// Fallback for unknown paths.
pub async fn not_found(page: PageContext) -> (StatusCode, NotFoundTemplate) {
    (StatusCode::NOT_FOUND, NotFoundTemplate { page })
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/gallery", get(products::gallery))
        .route("/products/{id}/lightbox", get(products::lightbox))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/items/{id}/remove", post(cart::remove))
        .route("/cart/count", get(cart::count))
        .route("/variants/{id}/preview", get(cart::variant_preview))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::show))
        .route("/checkout/complete", post(checkout::complete))
        .route_layer(checkout_rate_limiter())
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/wishlist", get(wishlist::show))
        .route("/wishlist/{id}", post(wishlist::add))
        .route("/wishlist/{id}/remove", post(wishlist::remove))
        .route("/wishlist/{id}/carousel", get(wishlist::carousel))
}

/// Create the order history routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route_layer(auth_rate_limiter());

    Router::new()
        .route("/auth", get(auth::page))
        .route("/auth/logout", post(auth::logout))
        .merge(limited)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/search", get(search::search))
        .route("/search/suggest", get(search::suggest))
        .route("/preferences/theme", post(preferences::toggle_theme))
        .merge(product_routes())
        .merge(cart_routes())
        .merge(checkout_routes())
        .merge(wishlist_routes())
        .merge(order_routes())
        .merge(auth_routes())
}
