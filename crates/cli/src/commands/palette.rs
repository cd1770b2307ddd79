//! Color palette maintenance.
//!
//! Uses the admin connection (`ADMIN_DATABASE_URL` or `DATABASE_URL`).

#![allow(clippy::print_stdout)]

use threadline_admin::db::PaletteRepository;

use super::{CommandError, connect, database_url};

const ENV: &[&str] = &["ADMIN_DATABASE_URL", "DATABASE_URL"];

/// Print every palette entry.
///
/// # Errors
///
/// Returns an error if the database cannot be read.
pub async fn list() -> Result<(), CommandError> {
    let pool = connect(&database_url(ENV)?).await?;
    let palette = PaletteRepository::new(&pool).load().await?;

    for (name, css) in palette.entries() {
        let tone = if palette.is_light(css) { "light" } else { "dark" };
        println!("{name:<24} {css:<10} {tone}");
    }
    Ok(())
}

/// Add `name`, or recolor it when it already exists.
///
/// # Errors
///
/// Returns an error for a blank name, an invalid color, or a database failure.
pub async fn set(name: &str, color: &str) -> Result<(), CommandError> {
    let pool = connect(&database_url(ENV)?).await?;
    let repo = PaletteRepository::new(&pool);
    let mut palette = repo.load().await?;

    if palette.get(name).is_some() {
        palette.update(name, name, color)?;
    } else {
        palette.insert(name, color)?;
    }

    repo.save(&palette).await?;
    tracing::info!(name, color, "Palette entry saved");
    Ok(())
}

/// Remove `name` from the palette.
///
/// # Errors
///
/// Returns an error if the name is unknown or the database fails.
pub async fn remove(name: &str) -> Result<(), CommandError> {
    let pool = connect(&database_url(ENV)?).await?;
    let repo = PaletteRepository::new(&pool);
    let mut palette = repo.load().await?;

    if !palette.remove(name) {
        return Err(threadline_core::PaletteError::NotFound(name.to_owned()).into());
    }

    repo.save(&palette).await?;
    tracing::info!(name, "Palette entry removed");
    Ok(())
}

/// Drop all customisation so the built-in defaults apply.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn reset() -> Result<(), CommandError> {
    let pool = connect(&database_url(ENV)?).await?;
    let removed = PaletteRepository::new(&pool).reset().await?;
    tracing::info!(removed, "Palette reset to defaults");
    Ok(())
}
