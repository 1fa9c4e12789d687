//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};

use crate::analysis::analyzer::{analyze_resume, AnalysisRequest};
use crate::analysis::normalizer::AnalysisResult;
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/analysis
///
/// Scores a resume against a job description. Runs synchronously; the
/// caller owns persistence and any status tracking.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let input = request.validate().map_err(AppError::Validation)?;
    let result = analyze_resume(state.completion.as_ref(), &input).await?;
    Ok(Json(result))
}
