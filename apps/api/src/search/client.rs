//! Search client: Serper-style Google SERP proxy behind the retry client.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::http_client::{OutboundRequest, RetryClient, Upstream, UpstreamError};

pub const DEFAULT_SEARCH_URL: &str = "https://google.serper.dev/search";

/// The upstream accepts 1..=100, but this service never asks for fewer than 2 or more than 10.
pub const MIN_RESULTS: u8 = 2;
pub const MAX_RESULTS: u8 = 10;

/// One organic result row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub link: String,
}

impl SearchHit {
    /// Title and snippet joined with a space: the text emails are harvested from.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.snippet)
    }
}

#[derive(Clone)]
pub struct SearchClient {
    http: RetryClient,
    endpoint: String,
}

impl SearchClient {
    pub fn new(http: RetryClient, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Runs one query. `num` is clamped to `MIN_RESULTS..=MAX_RESULTS`.
    pub async fn search(
        &self,
        query: &str,
        num: u8,
        api_key: &str,
    ) -> Result<Vec<SearchHit>, UpstreamError> {
        let num = num.clamp(MIN_RESULTS, MAX_RESULTS);
        let request = OutboundRequest::post_json(&self.endpoint, json!({ "q": query, "num": num }))
            .header("X-API-KEY", api_key);

        debug!("Search query (num={num}): {query}");
        let response: Value = self.http.call(Upstream::Search, &request).await?;
        let hits = organic_hits(&response);
        debug!("Search returned {} organic hit(s)", hits.len());
        Ok(hits)
    }
}

/// Reads `organic` leniently: a missing or non-array field is an empty list,
/// and rows that are not objects are skipped.
fn organic_hits(response: &Value) -> Vec<SearchHit> {
    response
        .get("organic")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| serde_json::from_value::<SearchHit>(row.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
