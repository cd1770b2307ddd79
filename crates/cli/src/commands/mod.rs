//! Subcommand implementations.

pub mod migrate;
pub mod palette;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Errors shared by every command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Palette error: {0}")]
    Palette(#[from] threadline_core::PaletteError),

    #[error(transparent)]
    Repository(#[from] threadline_admin::db::RepositoryError),
}

/// Read the first of `names` that is set.
pub fn database_url(names: &[&'static str]) -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
        .map(SecretString::from)
        .ok_or_else(|| CommandError::MissingEnvVar(names.first().copied().unwrap_or("DATABASE_URL")))
}

/// Open a small pool for one command.
pub async fn connect(url: &SecretString) -> Result<PgPool, CommandError> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(url.expose_secret())
        .await?;
    Ok(pool)
}
