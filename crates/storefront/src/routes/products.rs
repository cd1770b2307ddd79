//! Product detail route handlers.
//!
//! Color and size selection travel in the query string, so every selection
//! is a plain link and the page works without JavaScript. The gallery and
//! lightbox have HTMX fragment endpoints for in-place updates.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use threadline_core::models::{Image, Product};
use threadline_core::pagination::GALLERY_PAGE_SIZE;
use threadline_core::{ColorPalette, Pagination, ProductId};
use tracing::instrument;

use super::views::{CarouselView, ColorSwatchView};
use crate::error::Result;
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Selection and gallery page carried in the product URL.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    pub color: Option<String>,
    pub size: Option<String>,
    pub page: Option<u32>,
}

/// Gallery page query.
#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub page: Option<u32>,
}

/// Lightbox frame query.
#[derive(Debug, Deserialize)]
pub struct LightboxQuery {
    #[serde(default)]
    pub index: usize,
}

// =============================================================================
// Views
// =============================================================================

/// Selectable color.
#[derive(Debug, Clone)]
pub struct ColorOptionView {
    pub swatch: ColorSwatchView,
    pub selected: bool,
    pub href: String,
}

/// Selectable size.
#[derive(Debug, Clone)]
pub struct SizeOptionView {
    pub name: String,
    pub selected: bool,
    /// In stock for the selected color (or for any color when none is selected).
    pub available: bool,
    pub href: String,
}

/// The variant matching the current color and size.
#[derive(Debug, Clone)]
pub struct SelectedVariantView {
    pub id: String,
    pub label: String,
    pub price: String,
    pub stock: i32,
    pub available: bool,
}

/// Product detail display data.
#[derive(Debug, Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Selected variant price, else the product's price range.
    pub price: String,
    pub main_image_url: String,
    pub colors: Vec<ColorOptionView>,
    pub sizes: Vec<SizeOptionView>,
    pub selected_color: String,
    pub selected_size: String,
    pub variant: Option<SelectedVariantView>,
    /// Why the add-to-cart button is disabled, if it is.
    pub cart_hint: Option<&'static str>,
}

impl ProductDetailView {
    #[must_use]
    pub const fn can_add_to_cart(&self) -> bool {
        self.cart_hint.is_none()
    }
}

/// Gallery thumbnail.
#[derive(Debug, Clone)]
pub struct ThumbnailView {
    /// Position in the full gallery, used to open the lightbox.
    pub index: usize,
    pub url: String,
}

/// One page of the product gallery.
#[derive(Debug, Clone)]
pub struct GalleryView {
    pub product_id: String,
    pub product_name: String,
    pub thumbnails: Vec<ThumbnailView>,
    pub page: u32,
    pub total_pages: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

// =============================================================================
// Templates
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: ProductDetailView,
    pub gallery: GalleryView,
}

/// Gallery fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/gallery.html")]
pub struct GalleryTemplate {
    pub gallery: GalleryView,
}

/// Lightbox fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/lightbox.html")]
pub struct LightboxTemplate {
    pub product_id: String,
    pub product_name: String,
    pub frame: CarouselView,
}

// =============================================================================
// View Builders
// =============================================================================

fn selection_href(product_id: &str, color: Option<&str>, size: Option<&str>) -> String {
    let mut params = Vec::new();
    if let Some(color) = color {
        params.push(format!("color={}", urlencoding::encode(color)));
    }
    if let Some(size) = size {
        params.push(format!("size={}", urlencoding::encode(size)));
    }
    if params.is_empty() {
        format!("/products/{product_id}")
    } else {
        format!("/products/{product_id}?{}", params.join("&"))
    }
}

/// Build the detail view for a selection. Unknown colors or sizes are
/// treated as not selected.
#[must_use]
pub fn detail_view(
    product: &Product,
    palette: &ColorPalette,
    color: Option<&str>,
    size: Option<&str>,
) -> ProductDetailView {
    let id = product.product_id.as_str();
    let colors = product.colors();
    let sizes = product.sizes();

    let color = color.filter(|c| colors.contains(c));
    let size = size.filter(|s| sizes.contains(s));

    let color_options = colors
        .iter()
        .map(|name| ColorOptionView {
            swatch: ColorSwatchView::new(palette, name),
            selected: color == Some(*name),
            href: selection_href(id, Some(name), size),
        })
        .collect();

    let size_options = sizes
        .iter()
        .map(|name| {
            let available = match color {
                Some(color) => product
                    .find_variant(color, name)
                    .is_some_and(|v| v.is_available()),
                None => product
                    .variants
                    .iter()
                    .any(|v| v.size == *name && v.is_available()),
            };
            SizeOptionView {
                name: (*name).to_string(),
                selected: size == Some(*name),
                available,
                href: selection_href(id, color, Some(name)),
            }
        })
        .collect();

    let variant = match (color, size) {
        (Some(color), Some(size)) => product.find_variant(color, size),
        _ => None,
    };

    let cart_hint = match (color, size, variant) {
        (None, _, _) | (_, None, _) => Some("Select a color and size."),
        (_, _, None) => Some("This combination is not available."),
        (_, _, Some(v)) if !v.is_available() => Some("Out of stock."),
        _ => None,
    };

    let price = variant.map_or_else(
        || {
            product
                .price_range()
                .map(|range| range.display())
                .unwrap_or_default()
        },
        |v| v.price.display(),
    );

    let main_image_url = variant
        .and_then(|v| v.default_image())
        .map_or_else(
            || product.listing_image_url().to_string(),
            |image| image.image_url.clone(),
        );

    ProductDetailView {
        id: id.to_string(),
        name: product.name.clone(),
        description: product.description.clone(),
        price,
        main_image_url,
        colors: color_options,
        sizes: size_options,
        selected_color: color.unwrap_or_default().to_string(),
        selected_size: size.unwrap_or_default().to_string(),
        variant: variant.map(|v| SelectedVariantView {
            id: v.variant_id.to_string(),
            label: v.label(),
            price: v.price.display(),
            stock: v.stock,
            available: v.is_available(),
        }),
        cart_hint,
    }
}

/// Build one page of the gallery. Out-of-range pages show the first page.
#[must_use]
pub fn gallery_view(product: &Product, requested_page: u32) -> GalleryView {
    let images: Vec<&Image> = product.gallery_images();
    let pagination = Pagination::new(requested_page, GALLERY_PAGE_SIZE, images.len() as u64);
    let offset = pagination.offset();

    GalleryView {
        product_id: product.product_id.to_string(),
        product_name: product.name.clone(),
        thumbnails: pagination
            .slice(&images)
            .iter()
            .enumerate()
            .map(|(i, image)| ThumbnailView {
                index: offset + i,
                url: image.image_url.clone(),
            })
            .collect(),
        page: pagination.page(),
        total_pages: pagination.last_page(),
        prev_page: pagination.has_prev().then(|| pagination.prev_page()),
        next_page: pagination.has_next().then(|| pagination.next_page()),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display product detail page.
#[instrument(skip(state, page), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<String>,
    Query(query): Query<SelectionQuery>,
) -> Result<ProductShowTemplate> {
    let product = state.backend().fetch_product(&ProductId::new(id)).await?;
    let palette = state.palette().await;

    let color = query.color.as_deref().filter(|c| !c.is_empty());
    let size = query.size.as_deref().filter(|s| !s.is_empty());

    Ok(ProductShowTemplate {
        page,
        product: detail_view(&product, &palette, color, size),
        gallery: gallery_view(&product, query.page.unwrap_or(1)),
    })
}

/// Gallery page fragment (HTMX).
#[instrument(skip(state), fields(product_id = %id))]
pub async fn gallery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<GalleryQuery>,
) -> Result<GalleryTemplate> {
    let product = state.backend().get_product(&ProductId::new(id)).await?;
    Ok(GalleryTemplate {
        gallery: gallery_view(&product, query.page.unwrap_or(1)),
    })
}

/// Lightbox frame fragment (HTMX). Navigation wraps around the gallery.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn lightbox(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LightboxQuery>,
) -> Result<LightboxTemplate> {
    let product = state.backend().get_product(&ProductId::new(id)).await?;
    let images = product.gallery_images();

    Ok(LightboxTemplate {
        product_id: product.product_id.to_string(),
        product_name: product.name.clone(),
        frame: CarouselView::new(&images, query.index),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        serde_json::from_value(serde_json::json!({
            "productId": "p1",
            "name": "Oxford Shirt",
            "description": "Cotton",
            "isArchived": false,
            "categories": [],
            "variants": [
                {
                    "variantId": "v1", "productId": "p1", "size": "M", "color": "Navy",
                    "price": 30.0, "stock": 3, "sku": "OX-M-N",
                    "images": [
                        {"imageId": "i1", "variantId": "v1", "imageUrl": "https://img/1.png", "isDefault": false},
                        {"imageId": "i2", "variantId": "v1", "imageUrl": "https://img/2.png", "isDefault": true}
                    ]
                },
                {
                    "variantId": "v2", "productId": "p1", "size": "L", "color": "Navy",
                    "price": 32.5, "stock": 0, "sku": "OX-L-N", "images": []
                },
                {
                    "variantId": "v3", "productId": "p1", "size": "L", "color": "White",
                    "price": 32.5, "stock": 1, "sku": "OX-L-W",
                    "images": [
                        {"imageId": "i3", "variantId": "v3", "imageUrl": "https://img/3.png", "isDefault": true},
                        {"imageId": "i4", "variantId": "v3", "imageUrl": "https://img/4.png", "isDefault": false},
                        {"imageId": "i5", "variantId": "v3", "imageUrl": "https://img/5.png", "isDefault": false}
                    ]
                }
            ]
        }))
        .expect("valid product json")
    }

    #[test]
    fn test_no_selection_shows_price_range_and_hint() {
        let view = detail_view(&product(), &ColorPalette::default(), None, None);
        assert_eq!(view.price, "$30.00 - $32.50");
        assert_eq!(view.cart_hint, Some("Select a color and size."));
        assert!(view.variant.is_none());
        assert_eq!(view.colors.len(), 2);
        assert_eq!(view.sizes.len(), 2);
    }

    #[test]
    fn test_selected_variant_price_and_image() {
        let view = detail_view(&product(), &ColorPalette::default(), Some("Navy"), Some("M"));
        assert!(view.can_add_to_cart());
        assert_eq!(view.price, "$30.00");
        assert_eq!(view.main_image_url, "https://img/2.png");
        let variant = view.variant.expect("variant selected");
        assert_eq!(variant.id, "v1");
        assert_eq!(variant.stock, 3);
    }

    #[test]
    fn test_out_of_stock_selection_blocks_cart() {
        let view = detail_view(&product(), &ColorPalette::default(), Some("Navy"), Some("L"));
        assert_eq!(view.cart_hint, Some("Out of stock."));
        let large = view.sizes.iter().find(|s| s.name == "L").expect("size L");
        assert!(!large.available);
    }

    #[test]
    fn test_unknown_selection_is_ignored() {
        let view = detail_view(&product(), &ColorPalette::default(), Some("Plaid"), Some("M"));
        assert_eq!(view.selected_color, "");
        assert_eq!(view.selected_size, "M");
        assert_eq!(view.cart_hint, Some("Select a color and size."));
    }

    #[test]
    fn test_missing_combination() {
        let view = detail_view(&product(), &ColorPalette::default(), Some("White"), Some("M"));
        assert_eq!(view.cart_hint, Some("This combination is not available."));
    }

    #[test]
    fn test_selection_links_keep_other_choice() {
        let view = detail_view(&product(), &ColorPalette::default(), Some("Navy"), None);
        let white = view
            .colors
            .iter()
            .find(|c| c.swatch.name == "White")
            .expect("white option");
        assert_eq!(white.href, "/products/p1?color=White");
        let medium = view.sizes.iter().find(|s| s.name == "M").expect("size M");
        assert_eq!(medium.href, "/products/p1?color=Navy&size=M");
    }

    #[test]
    fn test_gallery_pages_of_four() {
        let first = gallery_view(&product(), 1);
        assert_eq!(first.thumbnails.len(), 4);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.next_page, Some(2));
        assert_eq!(first.prev_page, None);

        let second = gallery_view(&product(), 2);
        assert_eq!(second.thumbnails.len(), 1);
        assert_eq!(second.thumbnails.first().map(|t| t.index), Some(4));

        let clamped = gallery_view(&product(), 9);
        assert_eq!(clamped.page, 1);
    }
}
