//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use serde::Deserialize;
use threadline_core::ProductId;
use threadline_core::models::Product;
use tower_sessions::Session;
use tracing::instrument;

use super::views::CarouselView;
use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, RequireCustomer, set_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Carousel step query.
#[derive(Debug, Deserialize)]
pub struct CarouselQuery {
    #[serde(default)]
    pub index: usize,
}

/// Wishlist entry display data.
#[derive(Debug, Clone)]
pub struct WishlistEntryView {
    pub id: String,
    pub name: String,
    pub price_range: String,
    pub carousel: CarouselView,
}

impl From<&Product> for WishlistEntryView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.product_id.to_string(),
            name: product.name.clone(),
            price_range: product
                .price_range()
                .map(|range| range.display())
                .unwrap_or_default(),
            carousel: CarouselView::new(&product.gallery_images(), 0),
        }
    }
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist.html")]
pub struct WishlistTemplate {
    pub page: PageContext,
    pub entries: Vec<WishlistEntryView>,
}

/// Carousel frame fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_carousel.html")]
pub struct WishlistCarouselTemplate {
    pub product_id: String,
    pub product_name: String,
    pub carousel: CarouselView,
}

/// Notice for saved products that were removed from the catalog.
#[must_use]
pub fn unavailable_notice(count: usize) -> Option<Flash> {
    match count {
        0 => None,
        1 => Some(Flash::info("1 saved product is no longer available.")),
        n => Some(Flash::info(format!("{n} saved products are no longer available."))),
    }
}

/// Display the customer's wishlist.
///
/// Backend failures render an empty list with an error notice.
#[instrument(skip(state, customer, page))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    mut page: PageContext,
) -> Result<WishlistTemplate> {
    let result = state
        .backend_for(&customer)
        .wishlist_products(&customer.user_id)
        .await;

    let entries = match result {
        Ok(wishlist) => {
            if let Some(notice) = unavailable_notice(wishlist.unavailable.len()) {
                page.flash = Some(notice);
            }
            wishlist.products.iter().map(WishlistEntryView::from).collect()
        }
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load wishlist");
            page.flash = Some(Flash::error(e.user_message()));
            Vec::new()
        }
    };

    Ok(WishlistTemplate { page, entries })
}

/// Save a product to the wishlist.
#[instrument(skip(state, customer, session), fields(product_id = %id))]
pub async fn add(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let product_id = ProductId::new(id);
    let result = state
        .backend_for(&customer)
        .add_wishlist_item(&customer.user_id, &product_id)
        .await;

    let flash = match result {
        Ok(()) => Flash::success("Saved to your wishlist."),
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add wishlist item");
            Flash::error(e.user_message())
        }
    };
    set_flash(&session, flash).await;
    Ok(Redirect::to(&format!(
        "/products/{}",
        urlencoding::encode(product_id.as_str())
    )))
}

/// Remove a product from the wishlist.
#[instrument(skip(state, customer, session), fields(product_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let result = state
        .backend_for(&customer)
        .remove_wishlist_item(&customer.user_id, &ProductId::new(id))
        .await;

    let flash = match result {
        Ok(()) => Flash::success("Removed from your wishlist."),
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to remove wishlist item");
            Flash::error(e.user_message())
        }
    };
    set_flash(&session, flash).await;
    Ok(Redirect::to("/wishlist"))
}

/// One carousel frame for a wishlist entry (HTMX).
#[instrument(skip(state), fields(product_id = %id))]
pub async fn carousel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CarouselQuery>,
) -> Result<WishlistCarouselTemplate> {
    let product = state.backend().get_product(&ProductId::new(id)).await?;

    Ok(WishlistCarouselTemplate {
        product_id: product.product_id.to_string(),
        product_name: product.name.clone(),
        carousel: CarouselView::new(&product.gallery_images(), query.index),
    })
}
