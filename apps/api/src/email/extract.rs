//! Email extraction: pulls address-shaped tokens out of search snippets.

use once_cell::sync::Lazy;
use regex::Regex;

/// Addresses containing any of these are almost always placeholders in docs and forms.
pub const PLACEHOLDER_DOMAINS: [&str; 4] = ["example.com", "test.com", "domain.com", "email.com"];

static EMAIL_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("email token pattern is valid")
});

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email shape pattern is valid"));

/// Returns every non-placeholder email token in `text`, in order of appearance.
pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL_TOKEN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|email| !is_placeholder(email))
        .map(str::to_string)
        .collect()
}

/// Minimal `local@domain.tld` check: no whitespace, exactly one `@`.
/// Only rejects obvious extraction garbage.
pub fn is_plausible_email(candidate: &str) -> bool {
    EMAIL_SHAPE.is_match(candidate)
}

fn is_placeholder(email: &str) -> bool {
    PLACEHOLDER_DOMAINS
        .iter()
        .any(|placeholder| email.contains(placeholder))
}
