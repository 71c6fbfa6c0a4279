use std::sync::Arc;

use crate::config::Config;
use crate::email::finder::EmailFinder;
use crate::http_client::{RetryClient, Transport};
use crate::llm_client::LlmClient;
use crate::search::client::SearchClient;
use crate::search::sources::search_sources;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-user data: API keys arrive with each request.
#[derive(Clone)]
pub struct AppState {
    pub search: SearchClient,
    pub llm: LlmClient,
    /// All four email sources, company website first.
    pub finder: Arc<EmailFinder>,
}

impl AppState {
    /// Wires both upstream clients over one transport so they share a connection pool.
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let http = RetryClient::new(transport, config.retry_policy());
        let search = SearchClient::new(http.clone(), &config.search_api_url);
        let llm = LlmClient::new(http, &config.chat_api_url, &config.chat_model);
        let finder = Arc::new(EmailFinder::new(search_sources(
            &search,
            config.extended_web_queries,
        )));

        Self {
            search,
            llm,
            finder,
        }
    }
}
