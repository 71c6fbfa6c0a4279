pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::outreach::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Contacts API
        .route(
            "/api/v1/contacts/search",
            post(handlers::handle_search_contacts),
        )
        .route(
            "/api/v1/contacts/analyze",
            post(handlers::handle_analyze_profiles),
        )
        .route("/api/v1/contacts/email", post(handlers::handle_find_email))
        .route("/api/v1/contacts/draft", post(handlers::handle_draft_message))
        .with_state(state)
}
