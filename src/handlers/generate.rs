use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

use super::error::{ApiError, require_text};
use super::request_id::RequestId;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{
    ChangelogRequest, ChangelogResponse, ChatRequest, ChatResponse, ExplainRequest, ExplainResponse, GenerateRequest,
    GenerateResponse, GenerationRequest, GreetingRequest, GreetingResponse, ProviderKind,
    ReleaseNoteRequest, ReleaseNoteResponse,
};
use crate::operations::{ChangelogLine, Conversation, Explanation, Greeting, ReleaseNotes};
use crate::state::AppState;

const MAX_PROMPT_CHARS: usize = 16_000;
const MAX_CHAT_MESSAGE_CHARS: usize = 8_000;

// ?provider=openai|oss|mock
#[derive(Debug, Deserialize)]
pub struct ProviderQuery {
    pub provider: Option<ProviderKind>,
}

// counts the request and records latency when dropped
struct RequestTimer(Instant);

impl RequestTimer {
    fn start() -> Self {
        REQUEST_TOTAL.inc();
        Self(Instant::now())
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        REQUEST_LATENCY.observe(self.0.elapsed().as_secs_f64());
    }
}

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let _timer = RequestTimer::start();
    require_text("prompt", &payload.prompt, 1, MAX_PROMPT_CHARS)?;

    let request = GenerationRequest::new(payload.prompt)
        .with_override(payload.provider)
        .cacheable(payload.cacheable);
    let out = state.service.generate(&request).await;

    Ok(Json(GenerateResponse {
        result: out.value,
        cached: out.from_cache,
    }))
}

pub async fn release_notes_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProviderQuery>,
    Json(payload): Json<ReleaseNoteRequest>,
) -> Result<Json<ReleaseNoteResponse>, ApiError> {
    let _timer = RequestTimer::start();
    require_text("title", &payload.title, 3, 200)?;
    require_text("description", &payload.description, 10, 5000)?;

    let out = state
        .service
        .run(&ReleaseNotes::new(&payload, query.provider))
        .await;

    let mut response = out.value;
    response.cached = out.from_cache;
    Ok(Json(response))
}

pub async fn greeting_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GreetingRequest>,
) -> Result<Json<GreetingResponse>, ApiError> {
    let _timer = RequestTimer::start();
    require_text("name", &payload.name, 1, 100)?;

    let today = chrono::Local::now().date_naive();
    let out = state.service.run(&Greeting::new(&payload, today)).await;

    let mut response = out.value;
    response.cached = out.from_cache;
    Ok(Json(response))
}

pub async fn changelog_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChangelogRequest>,
) -> Result<Json<ChangelogResponse>, ApiError> {
    let _timer = RequestTimer::start();
    require_text("change_summary", &payload.change_summary, 5, 1000)?;

    let out = state.service.run(&ChangelogLine::new(&payload)).await;
    Ok(Json(out.value))
}

pub async fn explain_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, ApiError> {
    let _timer = RequestTimer::start();
    require_text("topic", &payload.topic, 1, 500)?;

    let out = state.service.run(&Explanation::new(&payload)).await;
    Ok(Json(out.value))
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let _timer = RequestTimer::start();
    let conversation = Conversation::from_request(&payload).ok_or(ApiError::MissingInput {
        expected: "'messages' or 'message'",
    })?;
    for message in conversation.messages() {
        require_text("content", &message.content, 1, MAX_CHAT_MESSAGE_CHARS)?;
    }

    let out = state.service.run(&conversation).await;
    Ok(Json(ChatResponse {
        reply: out.value.text,
        provider: out.value.provider_used,
        model: out.value.model,
        request_id: request_id.0,
    }))
}
