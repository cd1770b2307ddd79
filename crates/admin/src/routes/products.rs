//! Product management handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use threadline_backend::{BackendClient, BackendError, NewProduct, ProductFilter, ProductUpdate};
use threadline_core::models::Category;
use threadline_core::pagination::ADMIN_PAGE_SIZE;
use threadline_core::{CategoryId, ColorPalette, Pagination, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use super::views::{CategoryOption, PagerView, ProductRowView, VariantView};
use crate::db::PaletteRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, set_flash};
use crate::models::Flash;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub page: Option<u32>,
}

/// Fields shared by the create and edit forms.
///
/// Category checkboxes repeat `category_ids`, so the body arrives as raw
/// pairs.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub is_archived: bool,
    pub category_ids: Vec<CategoryId>,
}

impl ProductForm {
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "name" => form.name = value.trim().to_string(),
                "description" => form.description = value.trim().to_string(),
                "is_archived" => form.is_archived = matches!(value.as_str(), "on" | "true"),
                "category_ids" if !value.trim().is_empty() => {
                    let id = CategoryId::new(value.trim());
                    if !form.category_ids.contains(&id) {
                        form.category_ids.push(id);
                    }
                }
                _ => {}
            }
        }
        form
    }

    /// # Errors
    ///
    /// Returns a message naming the first missing field.
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.name.is_empty() {
            return Err("Product name is required.");
        }
        if self.description.is_empty() {
            return Err("Product description is required.");
        }
        Ok(())
    }
}

/// Fetch each selected category, in the order they were ticked.
async fn resolve_categories(
    backend: &BackendClient,
    ids: &[CategoryId],
) -> std::result::Result<Vec<Category>, BackendError> {
    let mut categories = Vec::with_capacity(ids.len());
    for id in ids {
        categories.push(backend.get_category(id).await?);
    }
    Ok(categories)
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub page: PageContext,
    pub products: Vec<ProductRowView>,
    pub total: u64,
    pub pager: PagerView,
    pub categories: Vec<CategoryOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/edit.html")]
pub struct ProductEditTemplate {
    pub page: PageContext,
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_archived: bool,
    pub categories: Vec<CategoryOption>,
    pub variants: Vec<VariantView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Product grid, ten per page.
#[instrument(skip(state, admin, page))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    page: PageContext,
    Query(query): Query<ProductsQuery>,
) -> Result<Response> {
    let backend = state.backend_for(&admin);
    let requested = query.page.unwrap_or(1);

    let listing = backend
        .list_products(requested, ADMIN_PAGE_SIZE, &ProductFilter::default())
        .await?;
    let pagination = Pagination::new(requested, ADMIN_PAGE_SIZE, listing.total_products);
    if pagination.page() != requested && listing.total_products > 0 {
        return Ok(Redirect::to("/products").into_response());
    }

    let categories = backend.list_categories().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories for the product form");
        Vec::new()
    });

    Ok(ProductsTemplate {
        page,
        products: listing.products.iter().map(ProductRowView::from).collect(),
        total: listing.total_products,
        pager: PagerView::new(&pagination, "/products"),
        categories: CategoryOption::list(&categories, None),
    }
    .into_response())
}

/// Create a product with no variants, then open it for editing.
#[instrument(skip(state, admin, session, pairs))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Redirect {
    let form = ProductForm::from_pairs(pairs);
    if let Err(message) = form.validate() {
        set_flash(&session, Flash::error(message)).await;
        return Redirect::to("/products");
    }

    let backend = state.backend_for(&admin);
    let categories = match resolve_categories(&backend, &form.category_ids).await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to resolve product categories");
            set_flash(&session, Flash::error(e.user_message())).await;
            return Redirect::to("/products");
        }
    };

    let new_product = NewProduct {
        name: form.name,
        description: form.description,
        is_archived: form.is_archived,
        variants: Vec::new(),
        categories,
    };

    match backend.create_product(&new_product).await {
        Ok(product) => {
            tracing::info!(product_id = %product.product_id, "Product created");
            set_flash(&session, Flash::success("Product created.")).await;
            Redirect::to(&format!("/products/{}/edit", product.product_id))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create product");
            set_flash(&session, Flash::error(e.user_message())).await;
            Redirect::to("/products")
        }
    }
}

#[instrument(skip(state, admin, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<ProductId>,
) -> Redirect {
    match state.backend_for(&admin).delete_product(&id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product deleted");
            set_flash(&session, Flash::success("Product deleted.")).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "Failed to delete product");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Redirect::to("/products")
}

/// Product details, categories and variants on one page.
#[instrument(skip(state, admin, page))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    page: PageContext,
    Path(id): Path<ProductId>,
) -> Result<ProductEditTemplate> {
    let backend = state.backend_for(&admin);
    let product = backend.fetch_product(&id).await?;
    let categories = backend.list_categories().await?;

    let palette = PaletteRepository::new(state.pool())
        .load()
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to the default color palette");
            ColorPalette::default()
        });

    let variants = product
        .variants
        .iter()
        .map(|variant| VariantView::new(variant, palette.chip_color(&variant.color)))
        .collect();

    Ok(ProductEditTemplate {
        page,
        id: product.product_id.to_string(),
        categories: CategoryOption::list(&categories, Some(&product)),
        name: product.name,
        description: product.description,
        is_archived: product.is_archived,
        variants,
    })
}

/// Save the product details and its category selection.
#[instrument(skip(state, admin, session, pairs))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<ProductId>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Redirect {
    let back = Redirect::to(&format!("/products/{id}/edit"));
    let form = ProductForm::from_pairs(pairs);
    if let Err(message) = form.validate() {
        set_flash(&session, Flash::error(message)).await;
        return back;
    }

    let backend = state.backend_for(&admin);
    let result = match resolve_categories(&backend, &form.category_ids).await {
        Ok(categories) => {
            let update = ProductUpdate {
                name: form.name,
                description: form.description,
                is_archived: form.is_archived,
                categories,
            };
            backend.update_product(&id, &update).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product updated");
            set_flash(&session, Flash::success("Product details updated.")).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "Failed to update product");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    back
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_form_collects_repeated_categories() {
        let form = ProductForm::from_pairs(pairs(&[
            ("name", " Harbor Coat "),
            ("description", "Wool blend"),
            ("category_ids", "c1"),
            ("category_ids", "c2"),
            ("category_ids", "c1"),
            ("category_ids", ""),
        ]));
        assert_eq!(form.name, "Harbor Coat");
        assert_eq!(form.category_ids, vec![CategoryId::new("c1"), CategoryId::new("c2")]);
        assert!(!form.is_archived);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_archived_checkbox() {
        let form = ProductForm::from_pairs(pairs(&[("is_archived", "on")]));
        assert!(form.is_archived);
    }

    #[test]
    fn test_name_and_description_required() {
        let form = ProductForm::from_pairs(pairs(&[("name", "  "), ("description", "x")]));
        assert_eq!(form.validate(), Err("Product name is required."));

        let form = ProductForm::from_pairs(pairs(&[("name", "Coat")]));
        assert_eq!(form.validate(), Err("Product description is required."));
    }
}
