//! Category handlers.
//!
//! The list filters as the admin types; HTMX requests receive only the
//! table rows.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use threadline_core::CategoryId;
use threadline_core::models::Category;
use tower_sessions::Session;
use tracing::instrument;

use super::is_htmx;
use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, set_flash};
use crate::models::Flash;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CategoryRowView {
    pub id: String,
    pub name: String,
}

/// Categories whose name contains `term`, case-insensitively.
#[must_use]
pub fn filter_categories<'a>(categories: &'a [Category], term: &str) -> Vec<&'a Category> {
    let term = term.trim().to_lowercase();
    categories
        .iter()
        .filter(|category| term.is_empty() || category.name.to_lowercase().contains(&term))
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub page: PageContext,
    pub query: String,
    pub rows: Vec<CategoryRowView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/category_rows.html")]
pub struct CategoryRowsTemplate {
    pub rows: Vec<CategoryRowView>,
}

#[instrument(skip(state, admin, page, headers))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    page: PageContext,
    headers: HeaderMap,
    Query(query): Query<FilterQuery>,
) -> Result<Response> {
    let categories = state.backend_for(&admin).list_categories().await?;
    let rows = filter_categories(&categories, &query.q)
        .into_iter()
        .map(|category| CategoryRowView {
            id: category.category_id.to_string(),
            name: category.name.clone(),
        })
        .collect();

    if is_htmx(&headers) {
        return Ok(CategoryRowsTemplate { rows }.into_response());
    }
    Ok(CategoriesTemplate {
        page,
        query: query.q,
        rows,
    }
    .into_response())
}

#[instrument(skip(state, admin, session))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let name = form.name.trim();
    if name.is_empty() {
        set_flash(&session, Flash::error("Category name is required.")).await;
        return Redirect::to("/categories");
    }

    match state.backend_for(&admin).create_category(name).await {
        Ok(category) => {
            tracing::info!(category_id = %category.category_id, "Category created");
            set_flash(
                &session,
                Flash::success(format!("Category \"{}\" created.", category.name)),
            )
            .await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create category");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Redirect::to("/categories")
}

/// Rename a category.
#[instrument(skip(state, admin, session))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let name = form.name.trim();
    if name.is_empty() {
        set_flash(&session, Flash::error("Category name is required.")).await;
        return Redirect::to("/categories");
    }

    match state.backend_for(&admin).update_category(&id, name).await {
        Ok(()) => {
            tracing::info!(category_id = %id, "Category renamed");
            set_flash(&session, Flash::success("Category updated.")).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, category_id = %id, "Failed to rename category");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Redirect::to("/categories")
}

#[instrument(skip(state, admin, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<CategoryId>,
) -> Redirect {
    match state.backend_for(&admin).delete_category(&id).await {
        Ok(()) => {
            tracing::info!(category_id = %id, "Category deleted");
            set_flash(&session, Flash::success("Category deleted.")).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, category_id = %id, "Failed to delete category");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Redirect::to("/categories")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str) -> Category {
        Category {
            category_id: CategoryId::new(id),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let categories = vec![
            category("1", "Outerwear"),
            category("2", "Formal"),
            category("3", "Knitwear"),
        ];
        let names: Vec<_> = filter_categories(&categories, " WEAR ")
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Outerwear", "Knitwear"]);
    }

    #[test]
    fn test_blank_filter_keeps_everything() {
        let categories = vec![category("1", "Outerwear"), category("2", "Formal")];
        assert_eq!(filter_categories(&categories, "   ").len(), 2);
    }
}
