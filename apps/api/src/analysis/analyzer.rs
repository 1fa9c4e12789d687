//! Resume analysis pipeline: validate → prompt → complete → decode → normalize.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::analysis::json_repair::{decode_loose_json, MalformedResponseError};
use crate::analysis::normalizer::{normalize, AnalysisResult, SchemaVariant};
use crate::analysis::prompts::{
    ANALYSIS_SYSTEM, BREAKDOWN_PROMPT_TEMPLATE, EXPERIENCED_GUIDANCE, FRESHER_GUIDANCE,
    NO_TARGET_STACK, SIMPLE_PROMPT_TEMPLATE,
};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{CompletionClient, LlmError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Completion(#[from] LlmError),

    #[error(transparent)]
    Malformed(#[from] MalformedResponseError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateLevel {
    Fresher,
    #[default]
    Experienced,
}

impl CandidateLevel {
    /// Trimmed, case-insensitive. Anything but the two levels is rejected.
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_lowercase().as_str() {
            "fresher" => Ok(CandidateLevel::Fresher),
            "experienced" => Ok(CandidateLevel::Experienced),
            _ => Err("candidate_level must be either 'fresher' or 'experienced'.".to_string()),
        }
    }

    fn guidance(self) -> &'static str {
        match self {
            CandidateLevel::Fresher => FRESHER_GUIDANCE,
            CandidateLevel::Experienced => EXPERIENCED_GUIDANCE,
        }
    }
}

/// Raw analysis request as received over HTTP.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
    pub candidate_level: Option<String>,
    pub target_stack: Option<Value>,
    pub schema_variant: Option<SchemaVariant>,
}

/// A validated request, ready to prompt with.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInput {
    pub resume_text: String,
    pub job_description: String,
    pub candidate_level: CandidateLevel,
    pub target_stack: Vec<String>,
    pub variant: SchemaVariant,
}

impl AnalysisRequest {
    pub fn validate(self) -> Result<AnalysisInput, String> {
        if self.resume_text.trim().is_empty() {
            return Err("Resume text is empty.".to_string());
        }
        if self.job_description.trim().is_empty() {
            return Err(
                "Job description is missing. Add it manually or complete extraction first."
                    .to_string(),
            );
        }
        let candidate_level = match self.candidate_level.as_deref() {
            Some(raw) => CandidateLevel::parse(raw)?,
            None => CandidateLevel::default(),
        };

        Ok(AnalysisInput {
            resume_text: self.resume_text,
            job_description: self.job_description,
            candidate_level,
            target_stack: normalize_target_stack(self.target_stack.as_ref()),
            variant: self.schema_variant.unwrap_or_default(),
        })
    }
}

/// `null` → empty; comma-separated string or list → trimmed non-blank items.
pub fn normalize_target_stack(value: Option<&Value>) -> Vec<String> {
    let items: Vec<String> = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(other) => vec![other.to_string()],
    };
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns `(system, user)` prompts for the requested schema variant.
pub fn build_prompts(input: &AnalysisInput) -> (String, String) {
    let user = match input.variant {
        SchemaVariant::Simple => fill_template(
            SIMPLE_PROMPT_TEMPLATE,
            &[
                ("{resume_text}", input.resume_text.as_str()),
                ("{job_description}", input.job_description.as_str()),
            ],
        ),
        SchemaVariant::ScoredBreakdown => {
            let stack = if input.target_stack.is_empty() {
                NO_TARGET_STACK.to_string()
            } else {
                input.target_stack.join(", ")
            };
            fill_template(
                BREAKDOWN_PROMPT_TEMPLATE,
                &[
                    ("{candidate_guidance}", input.candidate_level.guidance()),
                    ("{target_stack}", stack.as_str()),
                    ("{resume_text}", input.resume_text.as_str()),
                    ("{job_description}", input.job_description.as_str()),
                ],
            )
        }
    };
    (format!("{ANALYSIS_SYSTEM} {JSON_ONLY_SYSTEM}"), user)
}

/// Substitutes placeholders in one left-to-right pass over `template`.
/// Inserted values are never rescanned, so user text that happens to contain
/// a placeholder stays literal.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    loop {
        let next = values
            .iter()
            .filter_map(|&(key, value)| rest.find(key).map(|at| (at, key, value)))
            .min_by_key(|&(at, _, _)| at);
        let Some((at, key, value)) = next else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + key.len()..];
    }
}

/// Decodes and normalizes raw model text. Logs the raw text on decode failure.
pub fn interpret_completion(
    text: &str,
    variant: SchemaVariant,
) -> Result<AnalysisResult, MalformedResponseError> {
    let decoded = decode_loose_json(text).map_err(|e| {
        error!("Invalid JSON returned by model ({}): {}", e.reason, e.raw);
        e
    })?;
    Ok(normalize(&decoded, variant))
}

/// Runs a full analysis through the injected completion client.
pub async fn analyze_resume(
    client: &dyn CompletionClient,
    input: &AnalysisInput,
) -> Result<AnalysisResult, AnalysisError> {
    info!(
        "Running {:?} analysis (resume {} chars, job description {} chars)",
        input.variant,
        input.resume_text.chars().count(),
        input.job_description.chars().count()
    );

    let (system, user) = build_prompts(input);
    let text = client.complete(&system, &user).await?;
    debug!("Model response: {} chars", text.len());

    let result = interpret_completion(&text, input.variant)?;
    info!("Analysis complete: ats_score={}", result.ats_score);
    Ok(result)
}
