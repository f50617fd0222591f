//! Font catalog and style sample handlers.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vtext_media::{render_sample, sample_text, FontReport};
use vtext_models::{FontSlant, FontVariant, FontWeight, TextStyleRequest};

use crate::error::{ApiError, ApiResult};
use crate::handlers::jobs::confine_font;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FontsQuery {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

#[derive(Serialize)]
pub struct FontsResponse {
    pub variant: FontVariant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_family: Option<String>,
    pub fonts_indexed: usize,
    pub fonts: Vec<FontReport>,
}

/// How each catalog family resolves on this host.
pub async fn list_fonts(
    State(state): State<AppState>,
    Query(query): Query<FontsQuery>,
) -> Json<FontsResponse> {
    let variant = FontVariant::from_parts(
        if query.bold {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        },
        if query.italic {
            FontSlant::Italic
        } else {
            FontSlant::Normal
        },
    );
    let resolver = state.resolver();

    Json(FontsResponse {
        variant,
        default_family: resolver.default_family().map(|f| f.to_string()),
        fonts_indexed: resolver.index().len(),
        fonts: resolver.catalog_report(variant),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct SampleRequest {
    #[serde(default)]
    pub style: TextStyleRequest,
    /// Overlay text; only its first line is drawn
    #[serde(default)]
    pub text: Option<String>,
}

/// Render a PNG preview of a style.
pub async fn font_sample(
    State(state): State<AppState>,
    Json(mut request): Json<SampleRequest>,
) -> ApiResult<Response> {
    confine_font(&state.config.upload_dir, &mut request.style)?;
    let style = request.style.validate()?;
    let font = state.resolver().resolve(&style.font)?;
    for warning in font.warnings() {
        warn!("{}", warning);
    }

    let text = sample_text(request.text.as_deref());
    let font_path = font.path.clone();
    let png = tokio::task::spawn_blocking(move || render_sample(&font, &style, &text))
        .await
        .map_err(|e| ApiError::internal(format!("sample task failed: {}", e)))??;

    info!(font = %font_path.display(), bytes = png.len(), "Rendered style sample");
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
