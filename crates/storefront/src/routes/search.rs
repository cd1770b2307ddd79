//! Search route handlers.
//!
//! The header search box asks for suggestions as the customer types (HTMX,
//! debounced 300 ms in the markup) and submits to the full results page.
//! Blank queries never reach the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use threadline_core::models::IndexedProduct;
use tracing::instrument;

use super::views::ProductCardView;
use crate::error::Result;
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// Most suggestions shown under the search box.
pub const MAX_SUGGESTIONS: usize = 8;

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search suggestion display data.
#[derive(Debug, Clone)]
pub struct SuggestionView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub categories: String,
}

impl From<&IndexedProduct> for SuggestionView {
    fn from(product: &IndexedProduct) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product
                .starting_price()
                .map(|price| price.display())
                .unwrap_or_default(),
            categories: product.category_names(),
        }
    }
}

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub page: PageContext,
    pub query: String,
    pub results: Vec<ProductCardView>,
}

/// Search suggestions fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/search_suggest.html")]
pub struct SuggestTemplate {
    pub query: String,
    pub suggestions: Vec<SuggestionView>,
}

/// Hits that should be shown to customers.
fn visible(results: Vec<IndexedProduct>) -> impl Iterator<Item = IndexedProduct> {
    results.into_iter().filter(|product| !product.is_archived)
}

/// Full search results page.
#[instrument(skip(state, page), fields(query = %query.q))]
pub async fn search(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<SearchQuery>,
) -> Result<SearchTemplate> {
    let term = query.q.trim().to_string();
    let results = state.backend().search(&term).await?;

    Ok(SearchTemplate {
        page,
        results: visible(results)
            .map(|product| ProductCardView::from(&product))
            .collect(),
        query: term,
    })
}

/// Suggestions fragment (HTMX). Failures render an empty list.
#[instrument(skip(state), fields(query = %query.q))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> SuggestTemplate {
    let term = query.q.trim().to_string();

    let suggestions = match state.backend().search(&term).await {
        Ok(results) => visible(results)
            .take(MAX_SUGGESTIONS)
            .map(|product| SuggestionView::from(&product))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Search suggestions unavailable");
            Vec::new()
        }
    };

    SuggestTemplate {
        query: term,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, archived: bool) -> IndexedProduct {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Item {id}"),
            "isArchived": archived,
            "variants": [
                {"id": "v1", "color": "Navy", "size": "M", "price": 12.0, "stock": 1},
                {"id": "v2", "color": "Navy", "size": "L", "price": 9.5, "stock": 0}
            ],
            "categories": [{"name": "Formal"}, {"name": "Men"}]
        }))
        .expect("valid indexed product json")
    }

    #[test]
    fn test_archived_hits_are_hidden() {
        let shown: Vec<_> = visible(vec![hit("a", false), hit("b", true), hit("c", false)])
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(shown, vec!["a", "c"]);
    }

    #[test]
    fn test_suggestion_view() {
        let view = SuggestionView::from(&hit("a", false));
        assert_eq!(view.price, "$9.50");
        assert_eq!(view.categories, "Formal, Men");
    }
}
