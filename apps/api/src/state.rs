use std::sync::Arc;

use crate::jobs::fetcher::Fetcher;
use crate::llm_client::CompletionClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Both collaborators are trait objects so tests can swap in network-free fakes.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn Fetcher>,
    pub completion: Arc<dyn CompletionClient>,
}
