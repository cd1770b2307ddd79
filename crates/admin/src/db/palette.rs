//! Color palette repository.
//!
//! The admin owns writes to `color_palette`; the storefront reads the same
//! table. Until a palette is saved (`color_palette_state` has no row) the
//! built-in defaults apply; after that an empty table is an empty palette.

use sqlx::PgPool;
use threadline_core::ColorPalette;
use threadline_core::palette::is_valid_css_color;

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct PaletteRow {
    name: String,
    css_color: String,
}

/// Repository for the shared color palette.
pub struct PaletteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaletteRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the stored palette, or the defaults when none was ever saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored color is not valid CSS.
    pub async fn load(&self) -> Result<ColorPalette, RepositoryError> {
        let rows: Vec<PaletteRow> = sqlx::query_as(
            r"
            SELECT name, css_color
            FROM color_palette
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let customised: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM color_palette_state)")
                .fetch_one(self.pool)
                .await?;

        if let Some(row) = rows.iter().find(|row| !is_valid_css_color(&row.css_color)) {
            return Err(RepositoryError::DataCorruption(format!(
                "invalid css color {:?} for {:?}",
                row.css_color, row.name
            )));
        }

        Ok(ColorPalette::from_store(
            rows.into_iter().map(|row| (row.name, row.css_color)).collect(),
            customised,
        ))
    }

    /// Replace the stored palette with `palette` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// changed in that case.
    pub async fn save(&self, palette: &ColorPalette) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM color_palette")
            .execute(&mut *tx)
            .await?;

        for (name, css) in palette.entries() {
            sqlx::query(
                r"
                INSERT INTO color_palette (name, css_color, updated_at)
                VALUES ($1, $2, NOW())
                ",
            )
            .bind(name)
            .bind(css)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r"
            INSERT INTO color_palette_state (singleton, customised_at)
            VALUES (TRUE, NOW())
            ON CONFLICT (singleton) DO UPDATE SET customised_at = EXCLUDED.customised_at
            ",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(entries = palette.len(), "Color palette saved");
        Ok(())
    }

    /// Forget all customisation so the defaults apply again.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn reset(&self) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM color_palette")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM color_palette_state")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(removed = result.rows_affected(), "Color palette reset");
        Ok(result.rows_affected())
    }
}
