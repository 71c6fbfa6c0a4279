//! Profile Analysis: scores and classifies candidate profiles with one LLM call.
//!
//! Each input profile is sent with its positional index as `id`; the model echoes
//! the id back so results can be joined to the input list.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info};

use crate::llm_client::prompts::{JSON_ASSISTANT_SYSTEM, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{ChatMessage, LlmClient, LlmError};
use crate::outreach::prompts::{ANALYSIS_PROMPT_TEMPLATE, NOT_PROVIDED};
use crate::search::client::SearchHit;

/// Candidate profiles are plain search hits (LinkedIn title/snippet/link).
pub type CandidateProfile = SearchHit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContactType {
    #[serde(rename = "Hiring Manager")]
    HiringManager,
    Recruiter,
    Peer,
    Irrelevant,
}

impl ContactType {
    /// Maps a model-supplied label to a type, ignoring case, spaces, `_` and `-`.
    /// Labels outside the known set map to `Irrelevant`.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "hiringmanager" | "manager" => ContactType::HiringManager,
            "recruiter" | "talentacquisition" | "hr" => ContactType::Recruiter,
            "peer" => ContactType::Peer,
            _ => ContactType::Irrelevant,
        }
    }
}

impl<'de> Deserialize<'de> for ContactType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(ContactType::from_label(&label))
    }
}

/// One analyzed profile as returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedContact {
    /// Positional index of the input profile.
    pub id: usize,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    /// 0 – 100
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub link: String,
    #[serde(
        default,
        deserialize_with = "deserialize_email",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
}

/// Models sometimes answer `85.0` or `120`; round and clamp into 0 – 100.
fn deserialize_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// The prompt asks for `""` when no email is visible; treat that as absent.
fn deserialize_email<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty()))
}

/// Sends all profiles in one prompt and parses the model's JSON array.
/// API and parse failures propagate to the caller.
pub async fn analyze_profiles(
    llm: &LlmClient,
    profiles: &[CandidateProfile],
    target_role: &str,
    job_description: Option<&str>,
    api_key: &str,
    location: Option<&str>,
) -> Result<Vec<AnalyzedContact>, LlmError> {
    let prompt = build_analysis_prompt(profiles, target_role, job_description, location);
    let messages = [
        ChatMessage::system(JSON_ASSISTANT_SYSTEM),
        ChatMessage::user(&prompt),
    ];

    let contacts: Vec<AnalyzedContact> = llm
        .call_json(&messages, Some(0.0), api_key)
        .await
        .map_err(|e| {
            error!("Profile analysis failed: {e}");
            e
        })?;

    info!(
        "Analyzed {} profile(s) into {} contact(s) for '{target_role}'",
        profiles.len(),
        contacts.len()
    );
    Ok(contacts)
}

fn build_analysis_prompt(
    profiles: &[CandidateProfile],
    target_role: &str,
    job_description: Option<&str>,
    location: Option<&str>,
) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{target_role}", target_role)
        .replace("{job_description}", or_not_provided(job_description))
        .replace("{location}", or_not_provided(location))
        .replace("{profiles}", &format_profiles(profiles))
}

fn or_not_provided(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_PROVIDED)
}

fn format_profiles(profiles: &[CandidateProfile]) -> String {
    profiles
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "ID: {i}, Title: {}, Snippet: {}, Link: {}",
                p.title, p.snippet, p.link
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Joins model output back to the input profiles by `id`.
/// Contacts whose id matches no input are dropped; an empty `link` is filled
/// from the matching profile.
pub fn attach_profile_links(
    contacts: Vec<AnalyzedContact>,
    profiles: &[CandidateProfile],
) -> Vec<AnalyzedContact> {
    contacts
        .into_iter()
        .filter_map(|mut contact| {
            let profile = profiles.get(contact.id)?;
            if contact.link.trim().is_empty() {
                contact.link = profile.link.clone();
            }
            Some(contact)
        })
        .collect()
}

/// Highest score first; equal scores keep model order.
pub fn rank_contacts(mut contacts: Vec<AnalyzedContact>) -> Vec<AnalyzedContact> {
    contacts.sort_by(|a, b| b.score.cmp(&a.score));
    contacts
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http_client::testing::{RawResponseExt, ScriptedTransport};
    use crate::http_client::{RawResponse, RetryClient, RetryPolicy};
    use crate::llm_client::{DEFAULT_CHAT_URL, DEFAULT_MODEL};
    use serde_json::json;

    fn llm_answering(content: &str) -> (LlmClient, Arc<ScriptedTransport>) {
        let body = json!({"choices": [{"message": {"content": content}}]}).to_string();
        let transport = Arc::new(ScriptedTransport::new(vec![RawResponse::ok(&body)]));
        let llm = LlmClient::new(
            RetryClient::new(transport.clone(), RetryPolicy::default()),
            DEFAULT_CHAT_URL,
            DEFAULT_MODEL,
        );
        (llm, transport)
    }

    fn jane() -> CandidateProfile {
        SearchHit {
            title: "Jane Doe - Head of Talent at Acme".to_string(),
            snippet: "Building the Acme engineering team.".to_string(),
            link: "https://linkedin.com/in/janedoe".to_string(),
        }
    }

    fn contact(id: usize, score: u8) -> AnalyzedContact {
        AnalyzedContact {
            id,
            name: format!("Person {id}"),
            role: "Engineer".to_string(),
            score,
            contact_type: ContactType::Peer,
            reason: String::new(),
            link: String::new(),
            email: None,
        }
    }

    #[tokio::test]
    async fn test_fenced_response_parses_to_one_contact() {
        let (llm, transport) = llm_answering(
            "```json\n[{\"id\": 0, \"name\": \"Jane Doe\", \"role\": \"Head of Talent\", \"score\": 92, \
             \"type\": \"Recruiter\", \"reason\": \"Runs hiring at Acme.\", \
             \"link\": \"https://linkedin.com/in/janedoe\", \"email\": \"\"}]\n```",
        );

        let contacts = analyze_profiles(&llm, &[jane()], "Backend Engineer", None, "k", None)
            .await
            .unwrap();

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, 0);
        assert_eq!(contacts[0].contact_type, ContactType::Recruiter);
        assert_eq!(contacts[0].email, None);

        let sent = &transport.requests()[0];
        assert_eq!(sent.body["temperature"], 0.0);
        assert_eq!(sent.body["messages"][0]["content"], JSON_ASSISTANT_SYSTEM);
        let prompt = sent.body["messages"][1]["content"].as_str().unwrap();
        assert!(prompt.contains("ID: 0, Title: Jane Doe - Head of Talent at Acme"));
        assert!(prompt.contains("Job description (context): Not provided"));
    }

    #[tokio::test]
    async fn test_unparseable_response_propagates() {
        let (llm, _) = llm_answering("Sorry, I can't help with that.");

        let err = analyze_profiles(&llm, &[jane()], "Engineer", Some("Rust"), "k", Some("Paris"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[test]
    fn test_contact_type_wire_names() {
        let parsed: ContactType = serde_json::from_str(r#""Hiring Manager""#).unwrap();
        assert_eq!(parsed, ContactType::HiringManager);
        let aliased: ContactType = serde_json::from_str(r#""HiringManager""#).unwrap();
        assert_eq!(aliased, ContactType::HiringManager);
        assert_eq!(
            serde_json::to_string(&ContactType::HiringManager).unwrap(),
            r#""Hiring Manager""#
        );
    }

    #[test]
    fn test_contact_type_labels_are_lenient() {
        assert_eq!(ContactType::from_label("hiring manager"), ContactType::HiringManager);
        assert_eq!(ContactType::from_label("HIRING_MANAGER"), ContactType::HiringManager);
        assert_eq!(ContactType::from_label("HR"), ContactType::Recruiter);
        assert_eq!(ContactType::from_label("Talent Acquisition"), ContactType::Recruiter);
        assert_eq!(ContactType::from_label(" peer "), ContactType::Peer);
        assert_eq!(ContactType::from_label("Founder"), ContactType::Irrelevant);
    }

    #[tokio::test]
    async fn test_unusual_type_labels_do_not_fail_the_batch() {
        let (llm, _) = llm_answering(
            r#"[{"id": 0, "score": 80, "type": "hiring manager"},
                {"id": 1, "score": 60, "type": "HR"},
                {"id": 2, "score": 10, "type": "Investor"}]"#,
        );

        let contacts = analyze_profiles(&llm, &[jane(), jane(), jane()], "SRE", None, "k", None)
            .await
            .unwrap();

        let types: Vec<_> = contacts.iter().map(|c| c.contact_type).collect();
        assert_eq!(
            types,
            vec![
                ContactType::HiringManager,
                ContactType::Recruiter,
                ContactType::Irrelevant
            ]
        );
    }

    #[test]
    fn test_score_is_rounded_and_clamped() {
        let over: AnalyzedContact = serde_json::from_value(json!({
            "id": 1, "score": 140, "type": "Peer"
        }))
        .unwrap();
        assert_eq!(over.score, 100);

        let fractional: AnalyzedContact = serde_json::from_value(json!({
            "id": 1, "score": 71.6, "type": "Peer", "email": " jd@acme.io "
        }))
        .unwrap();
        assert_eq!(fractional.score, 72);
        assert_eq!(fractional.email.as_deref(), Some("jd@acme.io"));
    }

    #[test]
    fn test_prompt_includes_context_when_given() {
        let prompt = build_analysis_prompt(&[jane(), jane()], "SRE", Some("Kubernetes"), Some("Lyon"));
        assert!(prompt.contains("position of 'SRE'"));
        assert!(prompt.contains("Job description (context): Kubernetes"));
        assert!(prompt.contains("Job location (context): Lyon"));
        assert!(prompt.contains("ID: 1, Title:"));
        assert!(prompt.contains(JSON_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_attach_links_and_drop_unknown_ids() {
        let mut linked = contact(0, 50);
        linked.link = "https://keep.me".to_string();
        let joined = attach_profile_links(vec![contact(0, 10), linked, contact(7, 90)], &[jane()]);

        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].link, "https://linkedin.com/in/janedoe");
        assert_eq!(joined[1].link, "https://keep.me");
    }

    #[test]
    fn test_rank_contacts_is_stable_by_score() {
        let ranked = rank_contacts(vec![contact(0, 40), contact(1, 90), contact(2, 90)]);
        let ids: Vec<_> = ranked.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }
}
