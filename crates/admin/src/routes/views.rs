//! Display types shared by the admin pages.

use threadline_core::Pagination;
use threadline_core::models::{Category, Image, Product, Variant};

/// Longest description shown in the product grid.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 60;

/// Shorten `text` to at most `max_chars` characters, marking the cut with `…`.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

/// Previous/next links for a paginated grid.
#[derive(Debug, Clone)]
pub struct PagerView {
    pub page: u32,
    pub total_pages: u32,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl PagerView {
    #[must_use]
    pub fn new(pagination: &Pagination, base: &str) -> Self {
        let href = |page: u32| format!("{base}?page={page}");

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

    #[must_use]
    pub const fn is_needed(&self) -> bool {
        self.total_pages > 1
    }
}

/// One row of the product grid.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub total_stock: i64,
    pub archived: bool,
}

impl From<&Product> for ProductRowView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.product_id.to_string(),
            name: product.name.clone(),
            description: truncate_chars(&product.description, DESCRIPTION_PREVIEW_CHARS),
            total_stock: product.total_stock(),
            archived: product.is_archived,
        }
    }
}

/// Category checkbox on the product forms.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub checked: bool,
}

impl CategoryOption {
    /// Every category, checked when `product` already belongs to it.
    #[must_use]
    pub fn list(categories: &[Category], product: Option<&Product>) -> Vec<Self> {
        categories
            .iter()
            .map(|category| Self {
                id: category.category_id.to_string(),
                name: category.name.clone(),
                checked: product.is_some_and(|product| {
                    product
                        .categories
                        .iter()
                        .any(|c| c.category_id == category.category_id)
                }),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ImageView {
    pub id: String,
    pub url: String,
    pub is_default: bool,
}

impl From<&Image> for ImageView {
    fn from(image: &Image) -> Self {
        Self {
            id: image.image_id.to_string(),
            url: image.image_url.clone(),
            is_default: image.is_default,
        }
    }
}

/// Editable variant card on the product page.
#[derive(Debug, Clone)]
pub struct VariantView {
    pub id: String,
    pub size: String,
    pub color: String,
    /// Swatch color for `color`, resolved through the palette.
    pub swatch: String,
    /// Plain decimal for the price input, e.g. `"19.99"`.
    pub price: String,
    pub stock: i32,
    pub sku: String,
    pub images: Vec<ImageView>,
}

impl VariantView {
    #[must_use]
    pub fn new(variant: &Variant, swatch: &str) -> Self {
        Self {
            id: variant.variant_id.to_string(),
            size: variant.size.clone(),
            color: variant.color.clone(),
            swatch: swatch.to_string(),
            price: format!("{:.2}", variant.price.amount()),
            stock: variant.stock,
            sku: variant.sku.clone(),
            images: variant.images.iter().map(ImageView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_keeps_short_text() {
        assert_eq!(truncate_chars("  Wool coat ", 60), "Wool coat");
    }

    #[test]
    fn test_truncate_chars_marks_cut() {
        let cut = truncate_chars("Double breasted wool coat", 10);
        assert_eq!(cut, "Double br…");
        assert_eq!(cut.chars().count(), 10);
    }

    #[test]
    fn test_truncate_chars_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("ééééé", 5), "ééééé");
        assert_eq!(truncate_chars("éééééé", 5), "éééé…");
    }

    #[test]
    fn test_pager_links() {
        let pagination = Pagination::new(2, 10, 35);
        let pager = PagerView::new(&pagination, "/products");
        assert_eq!(pager.prev_href.as_deref(), Some("/products?page=1"));
        assert_eq!(pager.next_href.as_deref(), Some("/products?page=3"));
        assert_eq!(pager.total_pages, 4);
    }

    #[test]
    fn test_single_page_needs_no_pager() {
        let pager = PagerView::new(&Pagination::new(1, 10, 7), "/products");
        assert!(!pager.is_needed());
        assert!(pager.prev_href.is_none() && pager.next_href.is_none());
    }
}
