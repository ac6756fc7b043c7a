use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{BackendError, BackendOutput, Completion};
use crate::config::{ModelServiceProtocol, ModelServiceSettings};

// Model service request format (/api/v1/generate)
#[derive(Serialize)]
struct ServiceGenerateRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct ServiceGenerateResponse {
    text: Option<String>,
    model: Option<String>,
}

// Ollama API request format (/api/generate)
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: Option<String>,
    model: Option<String>,
}

// Ollama chat format (/api/chat)
#[derive(Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
    model: Option<String>,
}

// Self-hosted model server
#[derive(Debug)]
pub struct ModelServiceBackend {
    client: reqwest::Client,
    base_url: String,
    protocol: ModelServiceProtocol,
    model: String,
    timeout: Duration,
}

impl ModelServiceBackend {
    pub fn new(client: reqwest::Client, settings: &ModelServiceSettings) -> Self {
        // add http:// if not present
        let base = settings.base_url.trim().trim_end_matches('/');
        let base_url = if base.starts_with("http") {
            base.to_string()
        } else {
            format!("http://{}", base)
        };

        Self {
            client,
            base_url,
            protocol: settings.protocol,
            model: settings.model.clone(),
            timeout: settings.timeout,
        }
    }

    fn path(&self) -> &'static str {
        match self.protocol {
            ModelServiceProtocol::Generate => "/api/v1/generate",
            ModelServiceProtocol::OllamaGenerate => "/api/generate",
            ModelServiceProtocol::OllamaChat => "/api/chat",
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<BackendOutput, BackendError> {
        self.complete(&Completion::prompt(prompt)).await
    }

    pub async fn complete(&self, completion: &Completion) -> Result<BackendOutput, BackendError> {
        let model = completion.model.as_deref().unwrap_or(&self.model);
        let url = format!("{}{}", self.base_url, self.path());
        debug!(url = %url, model = %model, turns = completion.messages.len(), "calling model service");

        let request = self.client.post(&url).timeout(self.timeout);
        let request = match self.protocol {
            ModelServiceProtocol::Generate => request.json(&ServiceGenerateRequest {
                prompt: &completion.transcript(),
                model,
                stream: false,
            }),
            ModelServiceProtocol::OllamaGenerate => request.json(&OllamaGenerateRequest {
                model,
                prompt: &completion.transcript(),
                stream: false,
            }),
            ModelServiceProtocol::OllamaChat => request.json(&OllamaChatRequest {
                model,
                messages: completion
                    .messages
                    .iter()
                    .map(|m| OllamaMessage {
                        role: m.role.as_str().to_string(),
                        content: m.content.clone(),
                    })
                    .collect(),
                stream: false,
            }),
        };

        let res = request.send().await.map_err(BackendError::from_transport)?;
        let status = res.status();
        let raw = res.text().await.map_err(BackendError::from_transport)?;
        if !status.is_success() {
            return Err(BackendError::from_status(status, &raw));
        }

        let (text, reported) = self.parse(&raw)?;
        Ok(BackendOutput {
            text,
            model: Some(reported.unwrap_or_else(|| model.to_string())),
        })
    }

    fn parse(&self, raw: &str) -> Result<(String, Option<String>), BackendError> {
        let malformed = |e: serde_json::Error| {
            BackendError::invalid_response(format!("malformed JSON from model service: {}", e))
        };
        let missing = || BackendError::invalid_response("model service response has no text");

        match self.protocol {
            ModelServiceProtocol::Generate => {
                let body: ServiceGenerateResponse = serde_json::from_str(raw).map_err(malformed)?;
                Ok((body.text.ok_or_else(missing)?, body.model))
            }
            ModelServiceProtocol::OllamaGenerate => {
                let body: OllamaGenerateResponse = serde_json::from_str(raw).map_err(malformed)?;
                Ok((body.response.ok_or_else(missing)?, body.model))
            }
            ModelServiceProtocol::OllamaChat => {
                let body: OllamaChatResponse = serde_json::from_str(raw).map_err(malformed)?;
                let text = body.message.map(|m| m.content).ok_or_else(missing)?;
                Ok((text, body.model))
            }
        }
    }
}
