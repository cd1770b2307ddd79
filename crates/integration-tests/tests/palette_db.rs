//! Color palette persistence against a migrated database.

#![allow(clippy::unwrap_used)]

use threadline_admin::db::PaletteRepository;
use threadline_core::ColorPalette;
use threadline_integration_tests::database;
use tokio::sync::Mutex;

/// Both tests rewrite the same table.
static PALETTE_TABLE: Mutex<()> = Mutex::const_new(());

#[tokio::test]
#[ignore = "Requires migrated PostgreSQL database (DATABASE_URL)"]
async fn test_palette_save_load_reset() {
    let _guard = PALETTE_TABLE.lock().await;
    let pool = database().await.unwrap();
    let repo = PaletteRepository::new(&pool);

    let mut palette = ColorPalette::empty();
    palette.insert("Cream", "#fffdd0").unwrap();
    palette.insert("Forest Green", "rgb(34 139 34)").unwrap();
    repo.save(&palette).await.unwrap();

    let loaded = repo.load().await.unwrap();
    assert_eq!(loaded.get("cream"), Some("#fffdd0"));
    assert_eq!(loaded.get("forest green"), Some("rgb(34 139 34)"));
    assert_eq!(loaded.len(), 2);

    repo.reset().await.unwrap();
    assert_eq!(repo.load().await.unwrap(), ColorPalette::default());
}

#[tokio::test]
#[ignore = "Requires migrated PostgreSQL database (DATABASE_URL)"]
async fn test_removing_every_color_keeps_palette_empty() {
    let _guard = PALETTE_TABLE.lock().await;
    let pool = database().await.unwrap();
    let repo = PaletteRepository::new(&pool);
    repo.reset().await.unwrap();

    let mut palette = repo.load().await.unwrap();
    assert!(palette.remove("navy"));
    assert!(palette.remove("blue houndstooth"));
    repo.save(&palette).await.unwrap();

    let loaded = repo.load().await.unwrap();
    assert!(loaded.is_empty());

    repo.reset().await.unwrap();
    assert_eq!(repo.load().await.unwrap(), ColorPalette::default());
}
