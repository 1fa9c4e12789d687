//! Job posting extraction: description + metadata from one parsed page.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::html::Page;
use crate::jobs::description::{extract_from_page, ExtractionQualityError, PostingPage};
use crate::jobs::fetcher::{FetchError, Fetcher};
use crate::jobs::metadata::resolve_from_page;

/// The combined extraction record handed to callers.
/// `job_title` / `company_name` may be empty; `job_description` never is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub job_description: String,
    pub job_title: String,
    pub company_name: String,
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Quality(#[from] ExtractionQualityError),

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Runs the Content Extraction Engine and the Metadata Resolver over the
/// same parsed document. Fails only when the description misses the quality gate.
///
/// CPU-bound on large pages; async callers go through [`extract_job_posting_blocking`].
pub fn extract_job_posting(
    html: &str,
    source_url: &str,
) -> Result<ExtractionResult, ExtractionQualityError> {
    let page = Page::parse(html);
    let job_description = extract_from_page(&PostingPage { html, page: &page })?;
    let (job_title, company_name) = resolve_from_page(&page, source_url);

    Ok(ExtractionResult {
        job_description,
        job_title,
        company_name,
    })
}

/// Runs [`extract_job_posting`] on the blocking pool so parsing never stalls
/// the async workers. Takes owned data for the `'static` closure bound.
pub async fn extract_job_posting_blocking(
    html: String,
    source_url: String,
) -> Result<ExtractionResult, JobError> {
    let result =
        tokio::task::spawn_blocking(move || extract_job_posting(&html, &source_url)).await??;
    Ok(result)
}

/// Fetches `url` through the injected fetcher and extracts the posting.
pub async fn fetch_and_extract(
    fetcher: &dyn Fetcher,
    url: &str,
) -> Result<ExtractionResult, JobError> {
    let html = fetcher.fetch(url).await?;
    let result = extract_job_posting_blocking(html, url.to_string()).await?;
    info!(
        "Extracted job posting: '{}' at '{}' ({} chars)",
        result.job_title,
        result.company_name,
        result.job_description.chars().count()
    );
    Ok(result)
}
