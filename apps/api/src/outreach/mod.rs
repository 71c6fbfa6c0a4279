// Outreach: contact analysis and message drafting on top of llm_client,
// plus the HTTP handlers for the contacts API.
// All LLM calls go through llm_client; no direct chat API calls here.

pub mod analysis;
pub mod drafting;
pub mod handlers;
pub mod prompts;
