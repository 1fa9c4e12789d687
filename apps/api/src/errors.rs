use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::analyzer::AnalysisError;
use crate::analysis::json_repair::MalformedResponseError;
use crate::jobs::description::ExtractionQualityError;
use crate::jobs::extractor::JobError;
use crate::jobs::fetcher::FetchError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    ExtractionQuality(#[from] ExtractionQualityError),

    #[error(transparent)]
    MalformedResponse(#[from] MalformedResponseError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JobError> for AppError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::Fetch(e) => AppError::Fetch(e),
            JobError::Quality(e) => AppError::ExtractionQuality(e),
            JobError::Task(e) => {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}"))
            }
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Completion(e) => AppError::Llm(e),
            AnalysisError::Malformed(e) => AppError::MalformedResponse(e),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Fetch(e) => {
                tracing::warn!("Fetch error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "FETCH_ERROR",
                    format!("Could not fetch the job posting: {e}"),
                )
            }
            AppError::ExtractionQuality(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_QUALITY",
                e.to_string(),
            ),
            AppError::MalformedResponse(e) => {
                tracing::error!("Malformed model response: {}", e.reason);
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_RESPONSE",
                    "The model returned a response that could not be parsed".to_string(),
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Fetch(FetchError::Status(404)), StatusCode::BAD_GATEWAY),
            (
                AppError::ExtractionQuality(ExtractionQualityError),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::Llm(LlmError::EmptyContent), StatusCode::BAD_GATEWAY),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_job_error_conversion_keeps_kind() {
        let quality: AppError = JobError::Quality(ExtractionQualityError).into();
        let (status, code, message) = quality.parts();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "EXTRACTION_QUALITY");
        assert_eq!(
            message,
            "Could not extract sufficient content from the job posting."
        );

        let fetch: AppError = JobError::Fetch(FetchError::Status(403)).into();
        assert_eq!(fetch.parts().1, "FETCH_ERROR");
    }

    #[test]
    fn test_malformed_response_hides_raw_text() {
        let err: AppError = AnalysisError::Malformed(MalformedResponseError {
            reason: "expected value".to_string(),
            raw: "secret model output".to_string(),
        })
        .into();
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "MALFORMED_RESPONSE");
        assert!(!message.contains("secret"));
    }

    #[tokio::test]
    async fn test_panicked_extraction_task_is_internal_error() {
        let join_err = tokio::task::spawn_blocking(|| panic!("parser blew up"))
            .await
            .unwrap_err();
        let err: AppError = JobError::Task(join_err).into();
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
        assert!(!message.contains("parser blew up"));
    }
}
