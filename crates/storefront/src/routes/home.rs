//! Home page route handler: category tiles and the product catalog.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use threadline_backend::ProductFilter;
use threadline_core::Pagination;
use threadline_core::pagination::CATALOG_PAGE_SIZE;
use tracing::instrument;

use super::views::{PagerView, ProductCardView};
use crate::error::Result;
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// Shortcut tiles above the catalog. Each links to a search for its label.
pub const CATEGORY_TILES: &[&str] = &["FORMAL", "CASUAL", "WOMEN", "KIDS"];

/// Category shortcut tile.
#[derive(Debug, Clone)]
pub struct CategoryTileView {
    pub label: &'static str,
    pub href: String,
}

/// Catalog query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub page: Option<u32>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub tiles: Vec<CategoryTileView>,
    pub products: Vec<ProductCardView>,
    pub pager: PagerView,
}

fn category_tiles() -> Vec<CategoryTileView> {
    CATEGORY_TILES
        .iter()
        .map(|label| CategoryTileView {
            label,
            href: format!("/search?q={}", urlencoding::encode(&label.to_lowercase())),
        })
        .collect()
}

/// Display the home page with one page of non-archived products.
///
/// A page number past the end of the catalog shows the first page.
#[instrument(skip(state, page))]
pub async fn home(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<CatalogQuery>,
) -> Result<HomeTemplate> {
    let requested = query.page.unwrap_or(1).max(1);
    let filter = ProductFilter::active();

    let mut listing = state
        .backend()
        .list_products(requested, CATALOG_PAGE_SIZE, &filter)
        .await?;

    let pagination = Pagination::new(requested, CATALOG_PAGE_SIZE, listing.total_products);
    if pagination.page() != requested {
        listing = state
            .backend()
            .list_products(pagination.page(), CATALOG_PAGE_SIZE, &filter)
            .await?;
    }

    Ok(HomeTemplate {
        page,
        tiles: category_tiles(),
        products: listing.products.iter().map(ProductCardView::from).collect(),
        pager: PagerView::new(&pagination, "/"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tiles_link_to_search() {
        let tiles = category_tiles();
        assert_eq!(tiles.len(), 4);
        let first = tiles.first().expect("four tiles");
        assert_eq!(first.label, "FORMAL");
        assert_eq!(first.href, "/search?q=formal");
    }
}
