//! Email sources: four independent search strategies, each with a fixed confidence policy.
//!
//! | Source          | Query scope                        | Confidence                      |
//! |-----------------|------------------------------------|---------------------------------|
//! | Company website | `site:<company>.com` variants      | High on company domain, else Medium |
//! | Web search      | open web, one or more variants     | Medium (de-duplicated)          |
//! | Code host       | `site:github.com`                  | Medium                          |
//! | Social media    | `site:twitter.com OR site:x.com`   | Low                             |
//!
//! Every source swallows its own failures: a broken query is logged and
//! contributes nothing.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::email::candidate::{Confidence, EmailCandidate, EmailSource};
use crate::email::extract::extract_emails;
use crate::email::finder::{CandidateSource, EmailLookup};
use crate::http_client::UpstreamError;
use crate::search::client::SearchClient;

const COMPANY_RESULTS: u8 = 3;
const WEB_RESULTS: u8 = 2;
const CODE_HOST_RESULTS: u8 = 3;
const SOCIAL_RESULTS: u8 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Query builders
// ────────────────────────────────────────────────────────────────────────────

/// Company name lower-cased with whitespace removed (`acmecorp`) and hyphenated (`acme-corp`).
pub fn company_domain_stems(company: &str) -> (String, String) {
    let lowered = company.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    (words.concat(), words.join("-"))
}

pub fn company_site_query(name: &str, company: &str) -> String {
    let (joined, hyphenated) = company_domain_stems(company);
    format!(
        "\"{name}\" \"{company}\" (email OR contact OR \"@\") (site:{joined}.com OR site:{hyphenated}.com)"
    )
}

/// The canonical web query, plus three more variants when `extended` is set.
pub fn web_search_queries(name: &str, company: &str, role: &str, extended: bool) -> Vec<String> {
    let mut queries = vec![format!("\"{name}\" \"{company}\" email")];
    if extended {
        queries.push(format!("\"{name}\" \"{company}\" contact"));
        if !role.trim().is_empty() {
            queries.push(format!("\"{name}\" \"{role}\" \"{company}\" \"@\""));
        }
        queries.push(format!("\"{name}\" \"{company}\" mailto:"));
    }
    queries
}

pub fn code_host_query(name: &str, company: &str) -> String {
    format!("\"{name}\" \"{company}\" site:github.com email")
}

pub fn social_media_query(name: &str, company: &str) -> String {
    format!("\"{name}\" \"{company}\" (site:twitter.com OR site:x.com) email")
}

// ────────────────────────────────────────────────────────────────────────────
// Source functions
// ────────────────────────────────────────────────────────────────────────────

pub async fn search_company_website(
    client: &SearchClient,
    lookup: &EmailLookup,
) -> Vec<EmailCandidate> {
    let query = company_site_query(&lookup.name, &lookup.company);
    let emails = match harvest(client, &query, COMPANY_RESULTS, &lookup.api_key).await {
        Ok(emails) => emails,
        Err(e) => {
            warn!("Company website search failed: {e}");
            return Vec::new();
        }
    };

    let (joined, hyphenated) = company_domain_stems(&lookup.company);
    emails
        .into_iter()
        .map(|email| {
            let confidence = if domain_matches_company(&email, &joined, &hyphenated) {
                Confidence::High
            } else {
                Confidence::Medium
            };
            EmailCandidate::new(email, EmailSource::CompanyWebsite, confidence)
        })
        .collect()
}

pub async fn search_web(
    client: &SearchClient,
    lookup: &EmailLookup,
    extended: bool,
) -> Vec<EmailCandidate> {
    let mut found: Vec<EmailCandidate> = Vec::new();

    for query in web_search_queries(&lookup.name, &lookup.company, &lookup.role, extended) {
        let emails = match harvest(client, &query, WEB_RESULTS, &lookup.api_key).await {
            Ok(emails) => emails,
            Err(e) => {
                warn!("Web search query failed, moving on: {e}");
                continue;
            }
        };

        for email in emails {
            if !found.iter().any(|c| c.email.eq_ignore_ascii_case(&email)) {
                found.push(EmailCandidate::new(
                    email,
                    EmailSource::WebSearch,
                    Confidence::Medium,
                ));
            }
        }
    }

    found
}

pub async fn search_code_host(client: &SearchClient, lookup: &EmailLookup) -> Vec<EmailCandidate> {
    let query = code_host_query(&lookup.name, &lookup.company);
    tagged(
        client,
        &query,
        CODE_HOST_RESULTS,
        lookup,
        EmailSource::CodeHost,
        Confidence::Medium,
    )
    .await
}

pub async fn search_social_media(
    client: &SearchClient,
    lookup: &EmailLookup,
) -> Vec<EmailCandidate> {
    let query = social_media_query(&lookup.name, &lookup.company);
    tagged(
        client,
        &query,
        SOCIAL_RESULTS,
        lookup,
        EmailSource::SocialMedia,
        Confidence::Low,
    )
    .await
}

/// Single-query source with a flat confidence.
async fn tagged(
    client: &SearchClient,
    query: &str,
    num: u8,
    lookup: &EmailLookup,
    source: EmailSource,
    confidence: Confidence,
) -> Vec<EmailCandidate> {
    match harvest(client, query, num, &lookup.api_key).await {
        Ok(emails) => emails
            .into_iter()
            .map(|email| EmailCandidate::new(email, source, confidence))
            .collect(),
        Err(e) => {
            warn!("{} search failed: {e}", source.label());
            Vec::new()
        }
    }
}

/// Runs `query` and extracts emails from the lower-cased text of every hit, in hit order.
async fn harvest(
    client: &SearchClient,
    query: &str,
    num: u8,
    api_key: &str,
) -> Result<Vec<String>, UpstreamError> {
    let hits = client.search(query, num, api_key).await?;
    Ok(hits
        .iter()
        .flat_map(|hit| extract_emails(&hit.text().to_lowercase()))
        .collect())
}

fn domain_matches_company(email: &str, joined: &str, hyphenated: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let domain = domain.to_lowercase();
    [joined, hyphenated]
        .iter()
        .any(|stem| !stem.is_empty() && domain.contains(stem))
}

// ────────────────────────────────────────────────────────────────────────────
// CandidateSource adapter
// ────────────────────────────────────────────────────────────────────────────

/// One of the four search-backed sources, pluggable into `EmailFinder`.
#[derive(Clone)]
pub struct SearchSource {
    kind: EmailSource,
    client: SearchClient,
    extended_web_queries: bool,
}

#[async_trait]
impl CandidateSource for SearchSource {
    fn source(&self) -> EmailSource {
        self.kind
    }

    async fn candidates(&self, lookup: &EmailLookup) -> Vec<EmailCandidate> {
        match self.kind {
            EmailSource::CompanyWebsite => search_company_website(&self.client, lookup).await,
            EmailSource::WebSearch => {
                search_web(&self.client, lookup, self.extended_web_queries).await
            }
            EmailSource::CodeHost => search_code_host(&self.client, lookup).await,
            EmailSource::SocialMedia => search_social_media(&self.client, lookup).await,
        }
    }
}

/// All four sources in merge order (company website first).
pub fn search_sources(
    client: &SearchClient,
    extended_web_queries: bool,
) -> Vec<Arc<dyn CandidateSource>> {
    EmailSource::ALL
        .iter()
        .map(|kind| {
            Arc::new(SearchSource {
                kind: *kind,
                client: client.clone(),
                extended_web_queries,
            }) as Arc<dyn CandidateSource>
        })
        .collect()
}
