//! Outreach drafting: one LinkedIn note plus one cold email for a chosen contact.
//!
//! The output is returned as-is; splitting the two parts is left to the caller.

use tracing::{error, info};

use crate::llm_client::{ChatMessage, LlmClient, LlmError};
use crate::outreach::analysis::{AnalyzedContact, ContactType};
use crate::outreach::prompts::{DRAFT_PROMPT_TEMPLATE, NOT_PROVIDED};

pub async fn draft_message(
    llm: &LlmClient,
    contact: &AnalyzedContact,
    target_role: &str,
    user_context: &str,
    api_key: &str,
) -> Result<String, LlmError> {
    let prompt = build_draft_prompt(contact, target_role, user_context);

    let message = llm
        .call_text(&[ChatMessage::user(&prompt)], None, api_key)
        .await
        .map_err(|e| {
            error!("Message generation failed: {e}");
            e
        })?;

    info!(
        "Drafted outreach for {} ({} chars)",
        contact.name,
        message.chars().count()
    );
    Ok(message)
}

fn build_draft_prompt(contact: &AnalyzedContact, target_role: &str, user_context: &str) -> String {
    let user_context = if user_context.trim().is_empty() {
        NOT_PROVIDED
    } else {
        user_context
    };
    DRAFT_PROMPT_TEMPLATE
        .replace("{target_role}", target_role)
        .replace("{contact_name}", &contact.name)
        .replace("{contact_role}", &contact.role)
        .replace("{contact_type}", contact_type_label(contact.contact_type))
        .replace("{user_context}", user_context)
}

fn contact_type_label(contact_type: ContactType) -> &'static str {
    match contact_type {
        ContactType::HiringManager => "Hiring Manager",
        ContactType::Recruiter => "Recruiter",
        ContactType::Peer => "Peer",
        ContactType::Irrelevant => "Irrelevant",
    }
}
