//! Cart route handlers.
//!
//! Adding to the cart works as a plain form post (redirect plus flash) and as
//! an HTMX request (inline notice plus a `cart-updated` trigger so the header
//! badge refreshes itself).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use threadline_backend::{AddCartItem, BackendClient, BackendError};
use threadline_core::models::{Cart, CartItem, Product, Variant};
use threadline_core::pagination::CART_PAGE_SIZE;
use threadline_core::{CartItemId, Pagination, Price, ProductId, UserId, VariantId};
use tower_sessions::Session;
use tracing::instrument;

use super::is_htmx;
use super::views::PagerView;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalCustomer, PageContext, RequireCustomer, set_flash};
use crate::models::{Flash, session_keys};
use crate::state::AppState;

// =============================================================================
// Forms & Queries
// =============================================================================

/// Add to cart form data, posted from the product page.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub quantity: String,
}

/// Cart page query parameters.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub page: Option<u32>,
}

// =============================================================================
// Views
// =============================================================================

/// Cart line display data.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: String,
    pub variant_id: String,
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.cart_item_id.to_string(),
            variant_id: item.variant_id.to_string(),
            name: item.variant_name.clone(),
            price: item.price.display(),
            quantity: item.quantity,
            line_total: item.line_total().display(),
        }
    }
}

/// Variant summary shown when hovering a cart line.
#[derive(Debug, Clone)]
pub struct VariantPreviewView {
    pub product_id: String,
    pub product_name: String,
    pub label: String,
    pub price: String,
    pub stock: i32,
    pub image_url: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
    pub pager: PagerView,
    /// Show the order-placed banner (once, right after checkout).
    pub checkout_complete: bool,
}

/// Cart count badge fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Inline add-to-cart result (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_notice.html")]
pub struct CartNoticeTemplate {
    pub flash: Flash,
}

/// Variant preview fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/variant_preview.html")]
pub struct VariantPreviewTemplate {
    pub variant: VariantPreviewView,
}

// =============================================================================
// Validation
// =============================================================================

/// Parse a quantity field; anything that is not a positive integer is rejected.
#[must_use]
pub fn parse_quantity(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|qty| *qty > 0)
}

/// Resolve the variant a customer picked and check it can go in the cart.
///
/// # Errors
///
/// Returns the message to show the customer when the selection is incomplete,
/// does not exist, or is out of stock, or the quantity is not positive.
pub fn resolve_selection<'a>(
    product: &'a Product,
    color: &str,
    size: &str,
    quantity: &str,
) -> std::result::Result<(&'a Variant, u32), &'static str> {
    if color.is_empty() || size.is_empty() {
        return Err("Please select a color and size.");
    }
    let variant = product
        .find_variant(color, size)
        .ok_or("That color and size combination is not available.")?;
    let quantity = parse_quantity(quantity).ok_or("Quantity must be at least 1.")?;
    if !variant.is_available() {
        return Err("That variant is out of stock.");
    }
    Ok((variant, quantity))
}

/// Fetch the customer's cart; a customer without one has an empty cart.
async fn fetch_cart(
    client: &BackendClient,
    user_id: &UserId,
) -> std::result::Result<Option<Cart>, BackendError> {
    match client.get_cart(user_id).await {
        Ok(cart) => Ok(Some(cart)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart, five lines per page.
#[instrument(skip(state, customer, page, session))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    session: Session,
    Query(query): Query<CartQuery>,
) -> Result<CartShowTemplate> {
    let client = state.backend_for(&customer);
    let cart = fetch_cart(&client, &customer.user_id).await?;
    let items = cart.map(|cart| cart.items).unwrap_or_default();

    let checkout_complete = session
        .remove::<bool>(session_keys::CHECKOUT_COMPLETE)
        .await?
        .unwrap_or(false);

    let pagination = Pagination::new(
        query.page.unwrap_or(1),
        CART_PAGE_SIZE,
        items.len() as u64,
    );
    let total: Price = threadline_core::models::cart::cart_total(&items);

    Ok(CartShowTemplate {
        page,
        lines: pagination
            .slice(&items)
            .iter()
            .map(CartLineView::from)
            .collect(),
        total: total.display(),
        item_count: items.iter().map(|item| item.quantity).sum(),
        pager: PagerView::new(&pagination, "/cart"),
        checkout_complete,
    })
}

/// Add the selected variant to the cart.
#[instrument(skip(state, customer, session, headers, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let htmx = is_htmx(&headers);
    let back = format!(
        "/products/{}?color={}&size={}",
        urlencoding::encode(&form.product_id),
        urlencoding::encode(&form.color),
        urlencoding::encode(&form.size)
    );

    let product = state
        .backend()
        .fetch_product(&ProductId::new(form.product_id.clone()))
        .await?;

    let outcome = match resolve_selection(&product, &form.color, &form.size, &form.quantity) {
        Err(message) => Err(message.to_string()),
        Ok((variant, quantity)) => {
            let item = AddCartItem {
                variant_id: variant.variant_id.clone(),
                quantity,
            };
            match state
                .backend_for(&customer)
                .add_cart_item(&customer.user_id, &item)
                .await
            {
                Ok(()) => {
                    add_breadcrumb(
                        "cart",
                        "Added to cart",
                        Some(&[("variant_id", variant.variant_id.as_str())]),
                    );
                    Ok(format!("Added {quantity} x {} to your cart.", variant.label()))
                }
                Err(e) if e.is_unauthorized() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to add item to cart");
                    Err(e.user_message())
                }
            }
        }
    };

    if htmx {
        return Ok(match outcome {
            Ok(message) => (
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartNoticeTemplate {
                    flash: Flash::success(message),
                },
            )
                .into_response(),
            Err(message) => CartNoticeTemplate {
                flash: Flash::error(message),
            }
            .into_response(),
        });
    }

    let flash = match outcome {
        Ok(message) => Flash::success(message),
        Err(message) => Flash::error(message),
    };
    set_flash(&session, flash).await;
    Ok(Redirect::to(&back).into_response())
}

/// Remove one line from the cart.
#[instrument(skip(state, customer, session), fields(cart_item_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let result = state
        .backend_for(&customer)
        .remove_cart_item(&customer.user_id, &CartItemId::new(id))
        .await;

    let flash = match result {
        Ok(()) => Flash::success("Item removed from your cart."),
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to remove cart item");
            Flash::error(e.user_message())
        }
    };
    set_flash(&session, flash).await;
    Ok(Redirect::to("/cart"))
}

/// Cart count badge (HTMX). Zero for guests or when the cart cannot be read.
#[instrument(skip(state, customer))]
pub async fn count(
    State(state): State<AppState>,
    OptionalCustomer(customer): OptionalCustomer,
) -> CartCountTemplate {
    let Some(customer) = customer else {
        return CartCountTemplate { count: 0 };
    };

    let count = match fetch_cart(&state.backend_for(&customer), &customer.user_id).await {
        Ok(cart) => cart.map_or(0, |cart| cart.item_count()),
        Err(e) => {
            tracing::debug!(error = %e, "Cart count unavailable");
            0
        }
    };

    CartCountTemplate { count }
}

/// Variant preview fragment (HTMX).
#[instrument(skip(state), fields(variant_id = %id))]
pub async fn variant_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<VariantPreviewTemplate> {
    let variant = state.backend().get_variant(&VariantId::new(id)).await?;
    let product = state.backend().get_product(&variant.product_id).await?;

    Ok(VariantPreviewTemplate {
        variant: VariantPreviewView {
            product_id: product.product_id.to_string(),
            product_name: product.name.clone(),
            label: variant.label(),
            price: variant.price.display(),
            stock: variant.stock,
            image_url: variant.default_image().map(|image| image.image_url.clone()),
        },
    })
}
