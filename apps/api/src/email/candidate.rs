use serde::{Deserialize, Serialize};

/// Where a candidate email was found. Declaration order is the fixed merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailSource {
    CompanyWebsite,
    WebSearch,
    CodeHost,
    SocialMedia,
}

impl EmailSource {
    pub const ALL: [EmailSource; 4] = [
        EmailSource::CompanyWebsite,
        EmailSource::WebSearch,
        EmailSource::CodeHost,
        EmailSource::SocialMedia,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EmailSource::CompanyWebsite => "Company Website",
            EmailSource::WebSearch => "Web Search",
            EmailSource::CodeHost => "Code Host",
            EmailSource::SocialMedia => "Social Media",
        }
    }
}

/// Confidence tier. Variant order gives `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailCandidate {
    pub email: String,
    pub source: EmailSource,
    pub confidence: Confidence,
}

impl EmailCandidate {
    pub fn new(email: impl Into<String>, source: EmailSource, confidence: Confidence) -> Self {
        Self {
            email: email.into(),
            source,
            confidence,
        }
    }
}
