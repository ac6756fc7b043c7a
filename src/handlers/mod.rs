mod error;
mod generate;
mod health;
mod metrics;
mod request_id;

pub use error::ApiError;
pub use generate::{
    changelog_handler, chat_handler, explain_handler, generate_handler, greeting_handler,
    release_notes_handler,
};
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use request_id::{REQUEST_ID_HEADER, RequestId, propagate_request_id};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::state::AppState;

// creating the router with routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/generate", post(generate_handler))
        .route("/api/v1/release-notes/generate", post(release_notes_handler))
        .route("/api/v1/greeting/generate", post(greeting_handler))
        .route("/api/v1/release-note", post(changelog_handler))
        .route("/api/v1/explain", post(explain_handler))
        .route("/api/v1/chat", post(chat_handler))
        .with_state(state)
        .layer(middleware::from_fn(propagate_request_id))
}
