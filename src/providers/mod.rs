//! Text generation backends.
//!
//! The backend set is closed (mock, hosted chat-completion API, self-hosted
//! model server) so dispatch is a plain `match` on [`ProviderBackend`].
//! Backends never fall back on their own: every failure is returned as a
//! [`BackendError`] and the router decides what to do with it.

mod mock;
mod openai;
mod oss;

pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use oss::ModelServiceBackend;

use std::fmt;
use thiserror::Error;

use crate::models::{ChatMessage, ChatRole, ProviderKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    Timeout,
    Network,
    AuthMissing,
    InvalidResponse,
    Unknown,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BackendErrorKind::Timeout => "timeout",
            BackendErrorKind::Network => "network",
            BackendErrorKind::AuthMissing => "auth_missing",
            BackendErrorKind::InvalidResponse => "invalid_response",
            BackendErrorKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
#[error("{kind} error from backend: {message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::InvalidResponse, message)
    }

    // Classify a transport failure from reqwest
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            BackendErrorKind::Timeout
        } else if err.is_connect() || err.is_request() {
            BackendErrorKind::Network
        } else if err.is_decode() || err.is_body() {
            BackendErrorKind::InvalidResponse
        } else {
            BackendErrorKind::Unknown
        };
        Self::new(kind, err.to_string())
    }

    // Classify a non-2xx status
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let kind = match status.as_u16() {
            401 | 403 => BackendErrorKind::AuthMissing,
            _ => BackendErrorKind::InvalidResponse,
        };
        let snippet: String = body.chars().take(200).collect();
        Self::new(kind, format!("HTTP {}: {}", status, snippet))
    }
}

/// Text produced by a backend, plus the model that claims to have produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOutput {
    pub text: String,
    pub model: Option<String>,
}

/// What a backend is asked to continue: a conversation, oldest turn first,
/// and optionally a model other than the backend's configured one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
}

impl Completion {
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            model: None,
        }
    }

    pub fn chat(messages: Vec<ChatMessage>, model: Option<String>) -> Self {
        Self { messages, model }
    }

    pub fn has_system_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == ChatRole::System)
    }

    /// Most recent turn; the mock echoes it.
    pub fn last_content(&self) -> &str {
        self.messages.last().map(|m| m.content.as_str()).unwrap_or("")
    }

    /// Single-prompt form for protocols without message lists. A lone user
    /// turn is passed through untouched.
    pub fn transcript(&self) -> String {
        match self.messages.as_slice() {
            [only] if only.role == ChatRole::User => only.content.clone(),
            messages => {
                let mut out: Vec<String> = messages
                    .iter()
                    .map(|m| format!("{}: {}", m.role.as_str(), m.content))
                    .collect();
                out.push(format!("{}:", ChatRole::Assistant.as_str()));
                out.join("\n")
            }
        }
    }
}

pub enum ProviderBackend {
    Mock(MockBackend),
    PrimaryHosted(OpenAiBackend),
    SecondaryHosted(ModelServiceBackend),
}

impl ProviderBackend {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderBackend::Mock(_) => ProviderKind::Mock,
            ProviderBackend::PrimaryHosted(_) => ProviderKind::PrimaryHosted,
            ProviderBackend::SecondaryHosted(_) => ProviderKind::SecondaryHosted,
        }
    }

    pub async fn complete(&self, completion: &Completion) -> Result<BackendOutput, BackendError> {
        match self {
            ProviderBackend::Mock(b) => Ok(b.complete(completion, ProviderKind::Mock.as_str())),
            ProviderBackend::PrimaryHosted(b) => b.complete(completion).await,
            ProviderBackend::SecondaryHosted(b) => b.complete(completion).await,
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<BackendOutput, BackendError> {
        self.complete(&Completion::prompt(prompt)).await
    }
}
