//! Read access to the shared color palette table.
//!
//! The admin binary owns writes; the storefront only needs the current
//! mapping to paint color chips.

use sqlx::PgPool;
use threadline_core::{ColorPalette, palette::is_valid_css_color};

use super::RepositoryError;

/// Load the stored palette, or the defaults when none was ever saved.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
/// Returns `RepositoryError::DataCorruption` if a stored color is not valid CSS.
pub async fn load_palette(pool: &PgPool) -> Result<ColorPalette, RepositoryError> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        r"
        SELECT name, css_color
        FROM color_palette
        ORDER BY name
        ",
    )
    .fetch_all(pool)
    .await?;

    let customised: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM color_palette_state)")
        .fetch_one(pool)
        .await?;

    if let Some((name, css)) = rows.iter().find(|(_, css)| !is_valid_css_color(css)) {
        return Err(RepositoryError::DataCorruption(format!(
            "invalid css color {css:?} for {name:?}"
        )));
    }

    Ok(ColorPalette::from_store(rows, customised))
}
