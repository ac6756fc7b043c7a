use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::{BackendError, BackendOutput, Completion};
use crate::config::{ConfigError, HostedSettings};

const SYSTEM_PROMPT: &str = "You are a concise assistant that writes release notes, \
     changelog entries, greetings and short technical explanations.";

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

/// Hosted chat-completion backend (OpenAI-compatible API).
///
/// Only constructible with a credential; a missing key is a startup problem,
/// not a per-request one.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiBackend {
    pub fn new(client: reqwest::Client, settings: &HostedSettings) -> Result<Self, ConfigError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or(ConfigError::MissingCredential("OPENAI_API_KEY"))?;

        info!(model = %settings.model, "hosted backend initialized");

        Ok(Self {
            client,
            api_key,
            url: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: settings.timeout,
        })
    }

    pub async fn generate(&self, prompt: &str) -> Result<BackendOutput, BackendError> {
        self.complete(&Completion::prompt(prompt)).await
    }

    pub async fn complete(&self, completion: &Completion) -> Result<BackendOutput, BackendError> {
        let model = completion.model.as_deref().unwrap_or(&self.model);
        let body = ChatCompletionRequest {
            model,
            messages: wire_messages(completion),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(
            url = %self.url,
            model = %model,
            turns = completion.messages.len(),
            "calling hosted chat completions"
        );

        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        let status = res.status();
        let raw = res.text().await.map_err(BackendError::from_transport)?;
        if !status.is_success() {
            return Err(BackendError::from_status(status, &raw));
        }

        let json: Value = serde_json::from_str(&raw)
            .map_err(|e| BackendError::invalid_response(format!("malformed JSON: {}", e)))?;
        let text = extract_content(&json)?;
        let model = json["model"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| model.to_string());

        debug!(chars = text.len(), "hosted response received");
        Ok(BackendOutput {
            text: text.trim().to_string(),
            model: Some(model),
        })
    }
}

// The house system prompt leads unless the caller brought its own
fn wire_messages(completion: &Completion) -> Vec<WireMessage<'_>> {
    let mut messages = Vec::with_capacity(completion.messages.len() + 1);
    if !completion.has_system_message() {
        messages.push(WireMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        });
    }
    messages.extend(completion.messages.iter().map(|m| WireMessage {
        role: m.role.as_str(),
        content: m.content.as_str(),
    }));
    messages
}

// choices[0].message.content is either a string or a list of text parts
fn extract_content(json: &Value) -> Result<String, BackendError> {
    let content = &json["choices"][0]["message"]["content"];
    match content {
        Value::String(s) => Ok(s.clone()),
        Value::Array(parts) => Ok(parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .concat()),
        Value::Null => Err(BackendError::invalid_response(
            "response has no choices[0].message.content",
        )),
        other => Err(BackendError::invalid_response(format!(
            "unexpected content type: {}",
            other
        ))),
    }
}
