// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt for every call that expects a JSON payload back.
pub const JSON_ASSISTANT_SYSTEM: &str = "You are a helpful JSON assistant.";

/// Closing instruction appended to JSON-returning prompts.
pub const JSON_ONLY_INSTRUCTION: &str =
    "Respond ONLY with the JSON array (no markdown, no text before/after).";
