//! Database migration commands.
//!
//! Storefront and admin share one database. Each migration set only knows
//! its own versions, so both migrators ignore versions applied by the other.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) for storefront migrations
//! - `ADMIN_DATABASE_URL` (or `DATABASE_URL`) for admin migrations
//!
//! The `color_palette` table is created by the storefront set, so a fresh
//! database needs `tl-cli migrate all` before the admin starts.

use sqlx::migrate::Migrator;

use super::{CommandError, connect, database_url};

const STOREFRONT_ENV: &[&str] = &["STOREFRONT_DATABASE_URL", "DATABASE_URL"];
const ADMIN_ENV: &[&str] = &["ADMIN_DATABASE_URL", "DATABASE_URL"];

async fn run(label: &str, mut migrator: Migrator, env: &[&'static str]) -> Result<(), CommandError> {
    let url = database_url(env)?;

    tracing::info!("Connecting to {label} database...");
    let pool = connect(&url).await?;

    migrator.set_ignore_missing(true);
    tracing::info!(count = migrator.iter().count(), "Running {label} migrations...");
    migrator.run(&pool).await?;

    tracing::info!("{label} migrations complete");
    Ok(())
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is unset, the connection fails, or
/// a migration fails.
pub async fn storefront() -> Result<(), CommandError> {
    run(
        "storefront",
        sqlx::migrate!("../storefront/migrations"),
        STOREFRONT_ENV,
    )
    .await
}

/// Run admin database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is unset, the connection fails, or
/// a migration fails.
pub async fn admin() -> Result<(), CommandError> {
    run("admin", sqlx::migrate!("../admin/migrations"), ADMIN_ENV).await
}
