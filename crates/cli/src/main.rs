//! Threadline CLI - database migrations and palette maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! tl-cli migrate storefront
//!
//! # Run admin database migrations
//! tl-cli migrate admin
//!
//! # Run all database migrations
//! tl-cli migrate all
//!
//! # Inspect or edit the shared color palette
//! tl-cli palette list
//! tl-cli palette set "Forest Green" "#228b22"
//! tl-cli palette remove "forest green"
//! tl-cli palette reset
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tl-cli")]
#[command(author, version, about = "Threadline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage the color palette shared by storefront and admin
    Palette {
        #[command(subcommand)]
        action: PaletteAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run storefront database migrations
    Storefront,
    /// Run admin database migrations
    Admin,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum PaletteAction {
    /// List palette entries
    List,
    /// Add a color, or recolor an existing one
    Set {
        /// Color name as used on variants
        name: String,

        /// Any CSS color (`#a5bde0`, `rgb(1 2 3)`, `navy`)
        color: String,
    },
    /// Remove a color
    Remove {
        /// Color name
        name: String,
    },
    /// Restore the built-in defaults
    Reset,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tl_cli=info,sqlx=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Palette { action } => match action {
            PaletteAction::List => commands::palette::list().await?,
            PaletteAction::Set { name, color } => commands::palette::set(&name, &color).await?,
            PaletteAction::Remove { name } => commands::palette::remove(&name).await?,
            PaletteAction::Reset => commands::palette::reset().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_palette_set() {
        let cli = Cli::try_parse_from(["tl-cli", "palette", "set", "Forest Green", "#228b22"])
            .expect("valid args");
        match cli.command {
            Commands::Palette {
                action: PaletteAction::Set { name, color },
            } => {
                assert_eq!(name, "Forest Green");
                assert_eq!(color, "#228b22");
            }
            _ => panic!("expected palette set"),
        }
    }

    #[test]
    fn test_rejects_unknown_migration_target() {
        assert!(Cli::try_parse_from(["tl-cli", "migrate", "warehouse"]).is_err());
    }
}
