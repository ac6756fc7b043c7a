use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::state::AppState;

// health handler
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "llm_default_provider": state.settings.default_provider,
        "use_mock_llm": state.settings.force_mock,
        "cache": state.service.cache().backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
