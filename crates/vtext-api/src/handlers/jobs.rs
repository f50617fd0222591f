//! Overlay job handler.

use std::path::{Component, Path, PathBuf};

use axum::extract::State;
use axum::Json;
use tracing::info;

use vtext_models::{JobOutcome, JobRequest, TextStyleRequest};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Resolve `path` inside `root`, rejecting anything that could escape it.
///
/// Relative paths are taken relative to `root`; absolute ones must already be under it.
pub fn confine(root: &Path, path: &Path, what: &str) -> ApiResult<PathBuf> {
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(ApiError::bad_request(format!(
            "{} path must not contain '..'",
            what
        )));
    }
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    if !resolved.starts_with(root) {
        return Err(ApiError::bad_request(format!(
            "{} path must be inside {}",
            what,
            root.display()
        )));
    }
    Ok(resolved)
}

/// Custom font files are uploads too; keep them under `root`.
pub fn confine_font(root: &Path, style: &mut TextStyleRequest) -> ApiResult<()> {
    if let Some(font) = style.custom_font.take() {
        style.custom_font = Some(confine(root, &font, "custom font")?);
    }
    Ok(())
}

/// Run one overlay job to completion.
///
/// Returns the outcome with 200 when the job is done and 422 when it failed.
pub async fn create_job(
    State(state): State<AppState>,
    Json(mut request): Json<JobRequest>,
) -> ApiResult<Json<JobOutcome>> {
    request.input = confine(&state.config.upload_dir, &request.input, "input")?;
    confine_font(&state.config.upload_dir, &mut request.style)?;
    if let Some(output) = request.output.take() {
        request.output = Some(confine(&state.config.output_dir, &output, "output")?);
    }

    let spec = request.into_spec(&state.config.output_dir)?;
    info!(job_id = %spec.id, input = %spec.input.display(), "Running job");

    let outcome = state.runner.run(spec, None).await;
    if outcome.is_success() {
        Ok(Json(outcome))
    } else {
        Err(ApiError::JobFailed(Box::new(outcome)))
    }
}
