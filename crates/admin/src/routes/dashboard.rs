//! Dashboard with a count per managed collection.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use threadline_backend::ProductFilter;
use tracing::instrument;

use crate::db::PaletteRepository;
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin};
use crate::state::AppState;

/// One dashboard tile. `count` is `None` when it could not be loaded.
#[derive(Debug, Clone)]
pub struct Tile {
    pub label: &'static str,
    pub href: &'static str,
    pub count: Option<u64>,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub tiles: Vec<Tile>,
}

fn count_or_log<T, E: std::fmt::Display>(
    what: &str,
    result: Result<T, E>,
    count: fn(T) -> u64,
) -> Option<u64> {
    match result {
        Ok(value) => Some(count(value)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to count {what}");
            None
        }
    }
}

fn len(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

/// Display the dashboard. A failing count shows as unavailable rather than
/// failing the page.
#[instrument(skip(state, admin, page))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    page: PageContext,
) -> DashboardTemplate {
    let backend = state.backend_for(&admin);
    let palette_repo = PaletteRepository::new(state.pool());
    let filter = ProductFilter::default();

    let (products, users, categories, palette) = tokio::join!(
        backend.list_products(1, 1, &filter),
        backend.list_users(),
        backend.list_categories(),
        palette_repo.load(),
    );

    let tiles = vec![
        Tile {
            label: "Products",
            href: "/products",
            count: count_or_log("products", products, |page| page.total_products),
        },
        Tile {
            label: "Users",
            href: "/users",
            count: count_or_log("users", users, |users| len(users.len())),
        },
        Tile {
            label: "Categories",
            href: "/categories",
            count: count_or_log("categories", categories, |list| len(list.len())),
        },
        Tile {
            label: "Colors",
            href: "/palette",
            count: count_or_log("palette colors", palette, |palette| len(palette.len())),
        },
    ];

    DashboardTemplate { page, tiles }
}
