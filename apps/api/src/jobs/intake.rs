//! Job intake — a posting arrives either as a URL to extract or as manual fields.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::jobs::extractor::fetch_and_extract;
use crate::jobs::fetcher::Fetcher;

pub const INTAKE_VALIDATION_MESSAGE: &str =
    "Provide a job URL or provide all manual fields: company_name, job_title, and job_description.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobIntake {
    pub job_url: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionSource {
    Manual,
    Extracted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub job_url: Option<String>,
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub description_source: DescriptionSource,
    pub extraction_status: ExtractionStatus,
    pub extraction_error: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl JobIntake {
    /// A URL alone is enough; otherwise all three manual fields are required.
    pub fn validate(&self) -> Result<(), String> {
        let has_url = non_blank(&self.job_url).is_some();
        let has_manual = non_blank(&self.company_name).is_some()
            && non_blank(&self.job_title).is_some()
            && non_blank(&self.job_description).is_some();

        if has_url || has_manual {
            Ok(())
        } else {
            Err(INTAKE_VALIDATION_MESSAGE.to_string())
        }
    }

    fn manual_record(&self) -> JobRecord {
        JobRecord {
            job_url: non_blank(&self.job_url).map(str::to_string),
            company_name: non_blank(&self.company_name).unwrap_or_default().to_string(),
            job_title: non_blank(&self.job_title).unwrap_or_default().to_string(),
            job_description: non_blank(&self.job_description)
                .unwrap_or_default()
                .to_string(),
            description_source: DescriptionSource::Manual,
            extraction_status: ExtractionStatus::Pending,
            extraction_error: None,
        }
    }
}

/// Builds a job record, extracting from the URL when one is given.
/// Extraction failures are recorded on the record, never returned.
pub async fn intake_job(intake: &JobIntake, fetcher: &dyn Fetcher) -> Result<JobRecord, String> {
    intake.validate()?;
    let mut record = intake.manual_record();

    let Some(url) = record.job_url.clone() else {
        return Ok(record);
    };

    match fetch_and_extract(fetcher, &url).await {
        Ok(extracted) => {
            record.job_description = extracted.job_description;
            if record.job_title.is_empty() {
                record.job_title = extracted.job_title;
            }
            if record.company_name.is_empty() {
                record.company_name = extracted.company_name;
            }
            record.description_source = DescriptionSource::Extracted;
            record.extraction_status = ExtractionStatus::Success;
        }
        Err(e) => {
            warn!("Extraction failed for {}: {}", url, e);
            record.extraction_status = ExtractionStatus::Failed;
            record.extraction_error = Some(e.to_string());
        }
    }

    Ok(record)
}
