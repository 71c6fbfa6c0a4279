//! Email Finder: fans out to every candidate source, merges, ranks and picks one address.
//!
//! Flow: spawn one task per source → join all → concatenate in source order →
//!       stable sort by confidence → shape-check the top candidate.
//!
//! A source that fails or panics contributes nothing; it never fails the lookup.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, error, info};

use crate::email::candidate::{EmailCandidate, EmailSource};
use crate::email::extract::is_plausible_email;

/// Who we are looking for. Owned so it can move into spawned source tasks.
#[derive(Debug, Clone)]
pub struct EmailLookup {
    pub name: String,
    pub company: String,
    pub role: String,
    pub api_key: String,
}

/// One independent lookup strategy. Implementations absorb their own failures
/// and return an empty list instead.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    fn source(&self) -> EmailSource;

    async fn candidates(&self, lookup: &EmailLookup) -> Vec<EmailCandidate>;
}

pub struct EmailFinder {
    sources: Vec<Arc<dyn CandidateSource>>,
}

impl EmailFinder {
    /// `sources` order is the tie-break order: earlier sources win equal confidence.
    pub fn new(sources: Vec<Arc<dyn CandidateSource>>) -> Self {
        Self { sources }
    }

    /// Returns the best email for `lookup`, or an empty string when none qualifies.
    pub async fn find_email(&self, lookup: &EmailLookup) -> String {
        let candidates = self.gather(lookup).await;
        let best = select_best(candidates);
        if best.is_empty() {
            info!(
                "No usable email found for {} at {}",
                lookup.name, lookup.company
            );
        } else {
            info!("Resolved an email for {} at {}", lookup.name, lookup.company);
            debug!("Resolved email: {best}");
        }
        best
    }

    /// Runs every source concurrently and concatenates results in source order.
    async fn gather(&self, lookup: &EmailLookup) -> Vec<EmailCandidate> {
        let tasks = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            let lookup = lookup.clone();
            tokio::spawn(async move { source.candidates(&lookup).await })
        });
        let results = join_all(tasks).await;

        let mut all = Vec::new();
        for (source, result) in self.sources.iter().zip(results) {
            match result {
                Ok(candidates) => {
                    debug!(
                        "{} source returned {} candidate(s)",
                        source.source().label(),
                        candidates.len()
                    );
                    all.extend(candidates);
                }
                Err(e) => {
                    error!(
                        "{} source task failed to join: {}",
                        source.source().label(),
                        e
                    );
                }
            }
        }
        all
    }
}

/// Orders candidates High → Low. `sort_by` is stable, so discovery order breaks ties.
pub fn rank_candidates(mut candidates: Vec<EmailCandidate>) -> Vec<EmailCandidate> {
    candidates.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    candidates
}

/// Top-ranked candidate if it passes the minimal shape check, otherwise `""`.
/// There is no fallback to the runner-up.
pub fn select_best(candidates: Vec<EmailCandidate>) -> String {
    match rank_candidates(candidates).into_iter().next() {
        None => String::new(),
        Some(best) if is_plausible_email(&best.email) => best.email,
        Some(best) => {
            debug!("Top candidate '{}' failed the shape check", best.email);
            String::new()
        }
    }
}
