//! Display types shared by several pages.
//!
//! Everything here is pre-formatted so templates only print strings.

use threadline_core::models::{Image, IndexedProduct, Product};
use threadline_core::models::catalog::PLACEHOLDER_IMAGE_URL;
use threadline_core::{Carousel, ColorPalette, Pagination};

/// Product tile on the home, search and wishlist pages.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub image_url: String,
    /// Lowest variant price, e.g. `"$19.99"`; empty when there are no variants.
    pub price: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.product_id.to_string(),
            name: product.name.clone(),
            image_url: product.listing_image_url().to_string(),
            price: product
                .starting_price()
                .map(|price| price.display())
                .unwrap_or_default(),
        }
    }
}

impl From<&IndexedProduct> for ProductCardView {
    fn from(product: &IndexedProduct) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            image_url: PLACEHOLDER_IMAGE_URL.to_string(),
            price: product
                .starting_price()
                .map(|price| price.display())
                .unwrap_or_default(),
        }
    }
}

/// Previous/next links for a paginated list.
#[derive(Debug, Clone)]
pub struct PagerView {
    pub page: u32,
    pub total_pages: u32,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl PagerView {
    /// Build links as `{base}{sep}page=N`, where `base` may already carry a query.
    #[must_use]
    pub fn new(pagination: &Pagination, base: &str) -> Self {
        let sep = if base.contains('?') { '&' } else { '?' };
        let href = |page: u32| format!("{base}{sep}page={page}");

        Self {
            page: pagination.page(),
            total_pages: pagination.last_page(),
            prev_href: pagination
                .has_prev()
                .then(|| href(pagination.prev_page())),
            next_href: pagination
                .has_next()
                .then(|| href(pagination.next_page())),
        }
    }

    /// Whether there is more than one page to navigate.
    #[must_use]
    pub const fn is_needed(&self) -> bool {
        self.total_pages > 1
    }
}

/// Color swatch, painted with an SVG `fill` so the CSP needs no inline styles.
#[derive(Debug, Clone)]
pub struct ColorSwatchView {
    pub name: String,
    /// Valid CSS color to fill with; empty when the color cannot be painted.
    pub fill: String,
    /// Outline color: dark around light swatches.
    pub stroke: &'static str,
}

impl ColorSwatchView {
    #[must_use]
    pub fn new(palette: &ColorPalette, name: &str) -> Self {
        let chip = palette.chip(name);
        let stroke = if chip.light { "#222" } else { "#aaa" };
        Self {
            name: chip.name,
            fill: if chip.valid { chip.css } else { String::new() },
            stroke,
        }
    }

    #[must_use]
    pub fn is_paintable(&self) -> bool {
        !self.fill.is_empty()
    }
}

/// One frame of an image carousel with wrap-around neighbours.
#[derive(Debug, Clone)]
pub struct CarouselView {
    pub image_url: String,
    pub index: usize,
    pub prev_index: usize,
    pub next_index: usize,
    /// 1-based position, e.g. `3` in "3 / 7".
    pub position: usize,
    pub len: usize,
}

impl CarouselView {
    /// Frame for `index` (clamped) over `images`; placeholder when empty.
    #[must_use]
    pub fn new(images: &[&Image], index: usize) -> Self {
        let carousel = Carousel::new(images.len(), index);
        let image_url = images
            .get(carousel.index())
            .map_or(PLACEHOLDER_IMAGE_URL, |image| image.image_url.as_str())
            .to_string();

        Self {
            image_url,
            index: carousel.index(),
            prev_index: carousel.prev_index(),
            next_index: carousel.next_index(),
            position: carousel.position(),
            len: carousel.len(),
        }
    }

    /// Whether prev/next controls should be shown.
    #[must_use]
    pub const fn has_controls(&self) -> bool {
        self.len > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pager_links() {
        let pagination = Pagination::new(2, 20, 45);
        let pager = PagerView::new(&pagination, "/");
        assert_eq!(pager.prev_href.as_deref(), Some("/?page=1"));
        assert_eq!(pager.next_href.as_deref(), Some("/?page=3"));
        assert_eq!(pager.total_pages, 3);
        assert!(pager.is_needed());
    }

    #[test]
    fn test_pager_appends_to_existing_query() {
        let pagination = Pagination::new(1, 4, 9);
        let pager = PagerView::new(&pagination, "/products/p1/gallery?color=red");
        assert_eq!(pager.prev_href, None);
        assert_eq!(
            pager.next_href.as_deref(),
            Some("/products/p1/gallery?color=red&page=2")
        );
    }

    #[test]
    fn test_single_page_needs_no_pager() {
        let pager = PagerView::new(&Pagination::new(1, 5, 0), "/cart");
        assert!(!pager.is_needed());
        assert_eq!(pager.total_pages, 1);
    }

    #[test]
    fn test_swatch_for_named_palette_color() {
        let palette = ColorPalette::default();
        let swatch = ColorSwatchView::new(&palette, "Navy");
        assert_eq!(swatch.fill, "#22274c");
        assert_eq!(swatch.stroke, "#aaa");
        assert!(swatch.is_paintable());
    }

    #[test]
    fn test_swatch_for_unknown_color_is_unpainted() {
        let palette = ColorPalette::default();
        let swatch = ColorSwatchView::new(&palette, "sunset shimmer");
        assert!(!swatch.is_paintable());
    }

    #[test]
    fn test_empty_carousel_uses_placeholder() {
        let view = CarouselView::new(&[], 3);
        assert_eq!(view.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(view.position, 0);
        assert!(!view.has_controls());
    }
}
