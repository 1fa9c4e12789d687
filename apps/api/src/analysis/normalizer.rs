//! Response Normalizer — coerces a decoded model response into `AnalysisResult`.
//!
//! Field-level deviations never fail: uncoercible scores become 0 and
//! missing lists become empty. Only structural decode failure (upstream, in
//! `json_repair`) is fatal.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub const MAX_ATS_SCORE: u32 = 100;
pub const MAX_CATEGORY_SCORE: u32 = 25;

/// Which response shape the prompt asked the model for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// `ats_score` plus three lists. Lists are stringified as-is.
    Simple,
    /// Adds a four-category `score_breakdown`. Blank list entries are dropped.
    #[default]
    ScoredBreakdown,
}

/// Per-category scores, each in `0..=25`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills_match: u32,
    pub project_impact: u32,
    pub tools_frameworks: u32,
    pub role_fit: u32,
}

impl ScoreBreakdown {
    pub const KEYS: [&'static str; 4] =
        ["skills_match", "project_impact", "tools_frameworks", "role_fit"];

    /// Non-object values yield an all-zero breakdown; missing keys are 0.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };
        let [skills_match, project_impact, tools_frameworks, role_fit] =
            Self::KEYS.map(|key| coerce_score(map.get(key), MAX_CATEGORY_SCORE));
        Self {
            skills_match,
            project_impact,
            tools_frameworks,
            role_fit,
        }
    }

    pub fn total(&self) -> u32 {
        self.skills_match + self.project_impact + self.tools_frameworks + self.role_fit
    }
}

/// The schema-valid analysis handed back to callers.
///
/// When `score_breakdown` sums above zero, `ats_score` equals that sum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ats_score: u32,
    pub score_breakdown: ScoreBreakdown,
    pub missing_keywords: Vec<String>,
    pub strengths: Vec<String>,
    pub suggestions: Vec<String>,
}

pub fn normalize(decoded: &Value, variant: SchemaVariant) -> AnalysisResult {
    let list = |key: &str| match variant {
        SchemaVariant::Simple => coerce_list(decoded.get(key)),
        SchemaVariant::ScoredBreakdown => coerce_list_strict(decoded.get(key)),
    };

    let score_breakdown = match variant {
        SchemaVariant::Simple => ScoreBreakdown::default(),
        SchemaVariant::ScoredBreakdown => ScoreBreakdown::from_value(decoded.get("score_breakdown")),
    };

    let ats_score = match score_breakdown.total() {
        0 => direct_score(decoded.get("ats_score")),
        total => total,
    };

    AnalysisResult {
        ats_score,
        score_breakdown,
        missing_keywords: list("missing_keywords"),
        strengths: list("strengths"),
        suggestions: list("suggestions"),
    }
}

fn direct_score(value: Option<&Value>) -> u32 {
    if as_float(value).is_none() {
        warn!("ats_score missing or invalid, defaulting to 0");
    }
    coerce_score(value, MAX_ATS_SCORE)
}

/// Float conversion, truncation toward zero, then clamp to `0..=max`.
/// Anything that does not convert to a finite number scores 0.
pub fn coerce_score(value: Option<&Value>, max: u32) -> u32 {
    match as_float(value) {
        Some(number) => number.trunc().clamp(0.0, f64::from(max)) as u32,
        None => 0,
    }
}

fn as_float(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Lenient list rule: every element stringified, nothing dropped.
pub fn coerce_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(stringify).collect(),
        Some(scalar) => vec![stringify(scalar)],
    }
}

/// Strict list rule: entries trimmed, blank entries dropped.
pub fn coerce_list_strict(value: Option<&Value>) -> Vec<String> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items.iter().map(stringify).collect::<Vec<_>>(),
        Some(scalar) => vec![stringify(scalar)],
    };
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Strings verbatim; every other value as its JSON text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_breakdown_values_are_clamped_and_summed() {
        let decoded = json!({
            "ats_score": 99,
            "score_breakdown": {
                "skills_match": 30,
                "project_impact": -5,
                "tools_frameworks": 10,
                "role_fit": 10
            }
        });
        let result = normalize(&decoded, SchemaVariant::ScoredBreakdown);
        assert_eq!(
            result.score_breakdown,
            ScoreBreakdown {
                skills_match: 25,
                project_impact: 0,
                tools_frameworks: 10,
                role_fit: 10,
            }
        );
        assert_eq!(result.ats_score, 45);
    }

    #[test]
    fn test_zero_breakdown_falls_back_to_truncated_direct_score() {
        let decoded = json!({
            "ats_score": "87.9",
            "score_breakdown": {"skills_match": 0, "role_fit": "0"}
        });
        let result = normalize(&decoded, SchemaVariant::ScoredBreakdown);
        assert_eq!(result.ats_score, 87);
        assert_eq!(result.score_breakdown, ScoreBreakdown::default());
    }

    #[test]
    fn test_absent_breakdown_uses_direct_score() {
        let result = normalize(&json!({"ats_score": 87.9}), SchemaVariant::ScoredBreakdown);
        assert_eq!(result.ats_score, 87);
    }

    #[test]
    fn test_non_object_breakdown_is_all_zero() {
        let decoded = json!({"ats_score": 40, "score_breakdown": [25, 25, 25, 25]});
        let result = normalize(&decoded, SchemaVariant::ScoredBreakdown);
        assert_eq!(result.score_breakdown, ScoreBreakdown::default());
        assert_eq!(result.ats_score, 40);
    }

    #[test]
    fn test_breakdown_keys_coerced_independently() {
        let decoded = json!({
            "score_breakdown": {"skills_match": "20.7", "project_impact": "n/a", "role_fit": null}
        });
        let result = normalize(&decoded, SchemaVariant::ScoredBreakdown);
        assert_eq!(result.score_breakdown.skills_match, 20);
        assert_eq!(result.score_breakdown.project_impact, 0);
        assert_eq!(result.score_breakdown.tools_frameworks, 0);
        assert_eq!(result.ats_score, 20);
    }

    #[test]
    fn test_simple_variant_ignores_breakdown() {
        let decoded = json!({
            "ats_score": 150,
            "score_breakdown": {"skills_match": 10}
        });
        let result = normalize(&decoded, SchemaVariant::Simple);
        assert_eq!(result.ats_score, 100);
        assert_eq!(result.score_breakdown, ScoreBreakdown::default());
    }

    #[test]
    fn test_uncoercible_scores_default_to_zero() {
        for raw in [json!(null), json!("high"), json!([70]), json!({"v": 1}), json!("NaN"), json!("inf")] {
            let result = normalize(&json!({ "ats_score": raw.clone() }), SchemaVariant::Simple);
            assert_eq!(result.ats_score, 0, "input: {raw}");
        }
        assert_eq!(normalize(&json!({}), SchemaVariant::Simple).ats_score, 0);
    }

    #[test]
    fn test_out_of_range_literal_scores_zero() {
        let decoded: Value = serde_json::from_str(
            r#"{"ats_score": 1e400, "score_breakdown": {"skills_match": -1e400, "role_fit": 12},
                "missing_keywords": ["Kafka"]}"#,
        )
        .unwrap();
        let result = normalize(&decoded, SchemaVariant::ScoredBreakdown);
        assert_eq!(result.score_breakdown.skills_match, 0);
        assert_eq!(result.ats_score, 12);
        assert_eq!(result.missing_keywords, vec!["Kafka"]);

        let simple = normalize(&json!({"ats_score": decoded["ats_score"].clone()}), SchemaVariant::Simple);
        assert_eq!(simple.ats_score, 0);
    }

    #[test]
    fn test_negative_and_bool_scores() {
        assert_eq!(coerce_score(Some(&json!(-12.5)), MAX_ATS_SCORE), 0);
        assert_eq!(coerce_score(Some(&json!(true)), MAX_ATS_SCORE), 1);
        assert_eq!(coerce_score(Some(&json!(" 42 ")), MAX_ATS_SCORE), 42);
        assert_eq!(coerce_score(Some(&json!(1e12)), MAX_CATEGORY_SCORE), 25);
    }

    #[test]
    fn test_strict_list_drops_blank_entries() {
        let decoded = json!({"missing_keywords": ["React", "", "  ", "Go"]});
        let result = normalize(&decoded, SchemaVariant::ScoredBreakdown);
        assert_eq!(result.missing_keywords, vec!["React", "Go"]);
    }

    #[test]
    fn test_simple_list_keeps_blank_entries() {
        let decoded = json!({"missing_keywords": ["React", "", "  ", "Go"]});
        let result = normalize(&decoded, SchemaVariant::Simple);
        assert_eq!(result.missing_keywords, vec!["React", "", "  ", "Go"]);
    }

    #[test]
    fn test_list_scalars_and_nulls() {
        assert!(coerce_list(None).is_empty());
        assert!(coerce_list(Some(&json!(null))).is_empty());
        assert_eq!(coerce_list(Some(&json!("Docker"))), vec!["Docker"]);
        assert_eq!(coerce_list(Some(&json!([1, true, "x"]))), vec!["1", "true", "x"]);

        assert!(coerce_list_strict(Some(&json!("   "))).is_empty());
        assert_eq!(coerce_list_strict(Some(&json!(" Kafka "))), vec!["Kafka"]);
        assert_eq!(coerce_list_strict(Some(&json!(7))), vec!["7"]);
    }

    #[test]
    fn test_non_object_response_yields_defaults() {
        let result = normalize(&json!(["not", "an", "object"]), SchemaVariant::ScoredBreakdown);
        assert_eq!(result, AnalysisResult::default());
    }

    #[test]
    fn test_result_serializes_with_breakdown_keys() {
        let result = normalize(
            &json!({"score_breakdown": {"skills_match": 5}}),
            SchemaVariant::ScoredBreakdown,
        );
        let value = serde_json::to_value(&result).unwrap();
        for key in ScoreBreakdown::KEYS {
            assert!(value["score_breakdown"].get(key).is_some());
        }
        assert_eq!(value["ats_score"], json!(5));
    }
}
