// Resume analysis: prompt building, model completion, JSON repair and normalization.
// All model calls go through llm_client; this module only sees the response text.

pub mod analyzer;
pub mod handlers;
pub mod json_repair;
pub mod normalizer;
pub mod prompts;
