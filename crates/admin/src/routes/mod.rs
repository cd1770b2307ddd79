//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                      - Dashboard
//! GET  /health                                - Liveness check
//! GET  /health/ready                          - Readiness check (database)
//!
//! # Auth (login rate limited)
//! GET  /auth/login                            - Sign-in page
//! POST /auth/login                            - Login action
//! POST /auth/logout                           - Logout action
//!
//! # Products
//! GET  /products                              - Product grid (?page=)
//! POST /products                              - Create product
//! GET  /products/{id}/edit                    - Details, categories and variants
//! POST /products/{id}                         - Update details and categories
//! POST /products/{id}/delete                  - Delete product
//! POST /products/{id}/variants                - Add variant (multipart, optional images)
//!
//! # Variants
//! POST /variants/{id}                         - Update variant
//! POST /variants/{id}/delete                  - Delete variant
//! POST /variants/{id}/images                  - Upload images (multipart)
//! POST /variants/{id}/images/{image_id}/default   - Make image the default
//! POST /variants/{id}/images/{image_id}/delete    - Delete stored file and image
//!
//! # Users
//! GET  /users                                 - User grid (masked emails)
//! GET  /users/{id}/edit                       - Role form
//! POST /users/{id}                            - Change role
//! POST /users/{id}/delete                     - Delete user
//!
//! # Categories
//! GET  /categories                            - List (?q= filter, rows fragment for HTMX)
//! POST /categories                            - Create
//! POST /categories/{id}                       - Rename
//! POST /categories/{id}/delete                - Delete
//!
//! # Color palette
//! GET  /palette                               - List (?q= filter, rows fragment for HTMX)
//! POST /palette                               - Add color
//! POST /palette/reset                         - Restore defaults
//! POST /palette/{name}                        - Edit or rename color
//! POST /palette/{name}/delete                 - Delete color
//! ```

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod palette;
pub mod products;
pub mod users;
pub mod variants;
pub mod views;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};

use crate::filters;
use crate::middleware::{PageContext, login_rate_limiter};
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

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/auth/login", post(auth::login))
        .route_layer(login_rate_limiter());

    Router::new()
        .route("/auth/login", get(auth::login_page))
        .route("/auth/logout", post(auth::logout))
        .merge(limited)
}

/// Create the product and variant routes router.
///
/// Multipart uploads may be up to `max_upload_bytes`.
pub fn catalog_routes(max_upload_bytes: usize) -> Router<AppState> {
    let uploads = Router::new()
        .route("/products/{id}/variants", post(variants::create))
        .route("/variants/{id}/images", post(variants::upload_images))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/products", get(products::index).post(products::create))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit))
        .route("/products/{id}/delete", post(products::delete))
        .route("/variants/{id}", post(variants::update))
        .route("/variants/{id}/delete", post(variants::delete))
        .route(
            "/variants/{id}/images/{image_id}/default",
            post(variants::set_default_image),
        )
        .route(
            "/variants/{id}/images/{image_id}/delete",
            post(variants::delete_image),
        )
        .merge(uploads)
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::index))
        .route("/users/{id}", post(users::update_role))
        .route("/users/{id}/edit", get(users::edit))
        .route("/users/{id}/delete", post(users::delete))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route("/categories/{id}", post(categories::update))
        .route("/categories/{id}/delete", post(categories::delete))
}

/// Create the color palette routes router.
pub fn palette_routes() -> Router<AppState> {
    Router::new()
        .route("/palette", get(palette::index).post(palette::create))
        .route("/palette/reset", post(palette::reset))
        .route("/palette/{name}", post(palette::update))
        .route("/palette/{name}/delete", post(palette::delete))
}

/// Create all routes for the admin.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .merge(auth_routes())
        .merge(catalog_routes(max_upload_bytes))
        .merge(user_routes())
        .merge(category_routes())
        .merge(palette_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", "true".parse().expect("valid header"));
        assert!(is_htmx(&headers));
    }
}
