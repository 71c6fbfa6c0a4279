//! Axum route handlers for the Contacts API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::email::finder::EmailLookup;
use crate::errors::AppError;
use crate::outreach::analysis::{
    analyze_profiles, attach_profile_links, rank_contacts, AnalyzedContact, CandidateProfile,
};
use crate::outreach::drafting::draft_message;
use crate::search::profiles::search_profiles;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// The caller's own upstream keys. Only the ones an endpoint needs are checked.
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub chat: String,
}

impl ApiKeys {
    fn search(&self) -> Result<&str, AppError> {
        require("api_keys.search", &self.search)
    }

    fn chat(&self) -> Result<&str, AppError> {
        require("api_keys.chat", &self.chat)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchContactsRequest {
    pub company: String,
    pub role: String,
    pub job_description: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub api_keys: ApiKeys,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeProfilesRequest {
    pub profiles: Vec<CandidateProfile>,
    pub role: String,
    pub job_description: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub api_keys: ApiKeys,
}

#[derive(Debug, Serialize)]
pub struct ContactsResponse {
    pub profiles_found: usize,
    pub contacts: Vec<AnalyzedContact>,
}

#[derive(Debug, Deserialize)]
pub struct FindEmailRequest {
    pub name: String,
    pub company: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub api_keys: ApiKeys,
}

#[derive(Debug, Serialize)]
pub struct FindEmailResponse {
    /// Empty when no candidate qualified.
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub contact: AnalyzedContact,
    pub role: String,
    #[serde(default)]
    pub user_context: String,
    #[serde(default)]
    pub api_keys: ApiKeys,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/contacts/search
///
/// Profile search → AI analysis → join by id → rank by score.
pub async fn handle_search_contacts(
    State(state): State<AppState>,
    Json(request): Json<SearchContactsRequest>,
) -> Result<Json<ContactsResponse>, AppError> {
    let company = require("company", &request.company)?;
    let role = require("role", &request.role)?;
    let search_key = request.api_keys.search()?;
    let chat_key = request.api_keys.chat()?;

    let profiles = search_profiles(&state.search, company, role, search_key).await?;

    let contacts = analyze_and_rank(
        &state,
        &profiles,
        role,
        request.job_description.as_deref(),
        request.location.as_deref(),
        chat_key,
    )
    .await?;

    Ok(Json(ContactsResponse {
        profiles_found: profiles.len(),
        contacts,
    }))
}

/// POST /api/v1/contacts/analyze
///
/// AI analysis of profiles the caller already has.
pub async fn handle_analyze_profiles(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeProfilesRequest>,
) -> Result<Json<ContactsResponse>, AppError> {
    let role = require("role", &request.role)?;
    let chat_key = request.api_keys.chat()?;

    let contacts = analyze_and_rank(
        &state,
        &request.profiles,
        role,
        request.job_description.as_deref(),
        request.location.as_deref(),
        chat_key,
    )
    .await?;

    Ok(Json(ContactsResponse {
        profiles_found: request.profiles.len(),
        contacts,
    }))
}

/// POST /api/v1/contacts/email
///
/// Best-guess email across all sources. Never fails on search errors;
/// an empty `email` means nothing usable was found.
pub async fn handle_find_email(
    State(state): State<AppState>,
    Json(request): Json<FindEmailRequest>,
) -> Result<Json<FindEmailResponse>, AppError> {
    let lookup = EmailLookup {
        name: require("name", &request.name)?.to_string(),
        company: require("company", &request.company)?.to_string(),
        role: request.role.trim().to_string(),
        api_key: request.api_keys.search()?.to_string(),
    };

    let email = state.finder.find_email(&lookup).await;

    Ok(Json(FindEmailResponse { email }))
}

/// POST /api/v1/contacts/draft
///
/// LinkedIn note + cold email for one analyzed contact, as raw text.
pub async fn handle_draft_message(
    State(state): State<AppState>,
    Json(request): Json<DraftRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    let role = require("role", &request.role)?;
    let chat_key = request.api_keys.chat()?;

    let message = draft_message(
        &state.llm,
        &request.contact,
        role,
        &request.user_context,
        chat_key,
    )
    .await?;

    Ok(Json(DraftResponse { message }))
}

async fn analyze_and_rank(
    state: &AppState,
    profiles: &[CandidateProfile],
    role: &str,
    job_description: Option<&str>,
    location: Option<&str>,
    chat_key: &str,
) -> Result<Vec<AnalyzedContact>, AppError> {
    if profiles.is_empty() {
        return Ok(Vec::new());
    }

    let contacts =
        analyze_profiles(&state.llm, profiles, role, job_description, chat_key, location).await?;

    Ok(rank_contacts(attach_profile_links(contacts, profiles)))
}

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(value)
}
