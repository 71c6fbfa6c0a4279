//! Profile search: finds candidate contacts (LinkedIn profile hits) for a company and role.
//!
//! Unlike the email sources, failures here propagate: without profiles there is
//! nothing to analyze.

use tracing::info;

use crate::http_client::UpstreamError;
use crate::search::client::{SearchClient, SearchHit, MAX_RESULTS};

pub fn profile_query(company: &str, role: &str) -> String {
    format!(
        "site:linkedin.com/in/ \"{company}\" (\"{role}\" OR \"Talent Acquisition\" OR \"Recruiter\" OR \"Head of\" OR \"Manager\")"
    )
}

pub async fn search_profiles(
    client: &SearchClient,
    company: &str,
    role: &str,
    api_key: &str,
) -> Result<Vec<SearchHit>, UpstreamError> {
    let profiles = client
        .search(&profile_query(company, role), MAX_RESULTS, api_key)
        .await?;
    info!(
        "Found {} candidate profile(s) for {role} at {company}",
        profiles.len()
    );
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http_client::testing::{RawResponseExt, ScriptedTransport};
    use crate::http_client::{RawResponse, RetryClient, RetryPolicy};
    use crate::search::client::DEFAULT_SEARCH_URL;

    #[test]
    fn test_profile_query_shape() {
        let q = profile_query("Acme", "Data Engineer");
        assert!(q.starts_with("site:linkedin.com/in/ \"Acme\""));
        assert!(q.contains("\"Data Engineer\" OR \"Talent Acquisition\""));
    }

    #[tokio::test]
    async fn test_profile_search_asks_for_ten_and_propagates_errors() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            RawResponse::ok(r#"{"organic": [{"title": "Jane Doe - Head of Talent at Acme"}]}"#),
            RawResponse::status(401, "{}"),
        ]));
        let client = SearchClient::new(
            RetryClient::new(transport.clone(), RetryPolicy::default()),
            DEFAULT_SEARCH_URL,
        );

        let profiles = search_profiles(&client, "Acme", "Engineer", "k").await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(transport.requests()[0].body["num"], 10);

        let err = search_profiles(&client, "Acme", "Engineer", "k")
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidCredentials { .. }));
    }
}
