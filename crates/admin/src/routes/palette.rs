//! Color palette handlers.
//!
//! Every edit loads the stored palette, applies one change and saves the
//! whole palette back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use threadline_core::{ColorPalette, PaletteError};
use tower_sessions::Session;
use tracing::instrument;

use super::is_htmx;
use crate::db::PaletteRepository;
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
pub struct ColorForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub css_color: String,
}

/// One palette entry with its swatch.
#[derive(Debug, Clone)]
pub struct PaletteRowView {
    pub name: String,
    /// `name` percent-encoded for use in a path segment.
    pub slug: String,
    pub css: String,
    pub text_color: &'static str,
}

impl PaletteRowView {
    #[must_use]
    pub fn list(palette: &ColorPalette, term: &str) -> Vec<Self> {
        palette
            .filter(term)
            .into_iter()
            .map(|(name, css)| Self {
                name: name.to_string(),
                slug: urlencoding::encode(name).into_owned(),
                css: css.to_string(),
                text_color: palette.text_color_for(css),
            })
            .collect()
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "palette/index.html")]
pub struct PaletteTemplate {
    pub page: PageContext,
    pub query: String,
    pub rows: Vec<PaletteRowView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/palette_rows.html")]
pub struct PaletteRowsTemplate {
    pub rows: Vec<PaletteRowView>,
}

/// Load, change and save the palette, flashing the outcome.
async fn edit_palette<F>(
    state: &AppState,
    session: &Session,
    success: &str,
    change: F,
) -> Result<()>
where
    F: FnOnce(&mut ColorPalette) -> std::result::Result<(), PaletteError>,
{
    let repo = PaletteRepository::new(state.pool());
    let mut palette = repo.load().await?;

    match change(&mut palette) {
        Ok(()) => {
            repo.save(&palette).await?;
            tracing::info!(colors = palette.len(), "{success}");
            set_flash(session, Flash::success(success)).await;
        }
        Err(e) => set_flash(session, Flash::error(capitalize(&e.to_string()))).await,
    }
    Ok(())
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect::<String>() + "."
    })
}

#[instrument(skip(state, _admin, page, headers))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
    headers: HeaderMap,
    Query(query): Query<FilterQuery>,
) -> Result<Response> {
    let palette = PaletteRepository::new(state.pool()).load().await?;
    let rows = PaletteRowView::list(&palette, &query.q);

    if is_htmx(&headers) {
        return Ok(PaletteRowsTemplate { rows }.into_response());
    }
    Ok(PaletteTemplate {
        page,
        query: query.q,
        rows,
    }
    .into_response())
}

#[instrument(skip(state, _admin, session))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    session: Session,
    Form(form): Form<ColorForm>,
) -> Result<Redirect> {
    edit_palette(&state, &session, "Color added.", |palette| {
        palette.insert(&form.name, &form.css_color)
    })
    .await?;
    Ok(Redirect::to("/palette"))
}

/// Change a color's value and optionally rename it.
#[instrument(skip(state, _admin, session))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    session: Session,
    Path(current): Path<String>,
    Form(form): Form<ColorForm>,
) -> Result<Redirect> {
    edit_palette(&state, &session, "Color updated.", |palette| {
        palette.update(&current, &form.name, &form.css_color)
    })
    .await?;
    Ok(Redirect::to("/palette"))
}

#[instrument(skip(state, _admin, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    session: Session,
    Path(name): Path<String>,
) -> Result<Redirect> {
    edit_palette(&state, &session, "Color deleted.", |palette| {
        if palette.remove(&name) {
            Ok(())
        } else {
            Err(PaletteError::NotFound(name.trim().to_lowercase()))
        }
    })
    .await?;
    Ok(Redirect::to("/palette"))
}

/// Drop every customisation and go back to the built-in colors.
#[instrument(skip(state, _admin, session))]
pub async fn reset(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    session: Session,
) -> Result<Redirect> {
    let removed = PaletteRepository::new(state.pool()).reset().await?;
    tracing::info!(removed, "Color palette reset");
    set_flash(&session, Flash::success("Palette restored to the default colors.")).await;
    Ok(Redirect::to("/palette"))
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_encode_names_for_paths() {
        let rows = PaletteRowView::list(&ColorPalette::default(), "hound");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "blue houndstooth");
        assert_eq!(rows[0].slug, "blue%20houndstooth");
    }

    #[test]
    fn test_swatch_text_contrasts_with_color() {
        let palette = ColorPalette::from_entries([
            ("cream".to_string(), "#fffdd0".to_string()),
            ("navy".to_string(), "#22274c".to_string()),
        ]);
        let rows = PaletteRowView::list(&palette, "");
        assert_eq!(rows[0].name, "cream");
        assert_eq!(rows[0].text_color, "#000");
        assert_eq!(rows[1].text_color, "#fff");
    }

    #[test]
    fn test_error_messages_are_sentences() {
        assert_eq!(
            capitalize(&PaletteError::EmptyName.to_string()),
            "Color name cannot be empty."
        );
        assert_eq!(capitalize(""), "");
    }
}
