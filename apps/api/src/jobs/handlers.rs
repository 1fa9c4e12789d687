//! Axum route handlers for the Jobs API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::jobs::extractor::{extract_job_posting_blocking, fetch_and_extract, ExtractionResult};
use crate::jobs::intake::{intake_job, JobIntake, JobRecord};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractUrlRequest {
    pub job_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ExtractHtmlRequest {
    pub html: String,
    #[serde(default)]
    pub source_url: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/extract
///
/// Fetches the posting and returns description, title and company.
pub async fn handle_extract_url(
    State(state): State<AppState>,
    Json(request): Json<ExtractUrlRequest>,
) -> Result<Json<ExtractionResult>, AppError> {
    if request.job_url.trim().is_empty() {
        return Err(AppError::Validation("job_url cannot be empty".to_string()));
    }

    let result = fetch_and_extract(state.fetcher.as_ref(), request.job_url.trim()).await?;
    Ok(Json(result))
}

/// POST /api/v1/jobs/extract-html
///
/// Same as `/extract` for callers that already hold the page HTML.
pub async fn handle_extract_html(
    Json(request): Json<ExtractHtmlRequest>,
) -> Result<Json<ExtractionResult>, AppError> {
    let result = extract_job_posting_blocking(request.html, request.source_url).await?;
    Ok(Json(result))
}

/// POST /api/v1/jobs
///
/// Validates an intake and, when a URL is given, extracts the posting.
/// Extraction failures come back as `extraction_status: "failed"`.
pub async fn handle_intake(
    State(state): State<AppState>,
    Json(intake): Json<JobIntake>,
) -> Result<Json<JobRecord>, AppError> {
    let record = intake_job(&intake, state.fetcher.as_ref())
        .await
        .map_err(AppError::Validation)?;
    Ok(Json(record))
}
