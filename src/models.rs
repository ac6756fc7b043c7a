use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Backends a caller may ask for explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    PrimaryHosted,
    #[serde(rename = "oss")]
    SecondaryHosted,
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::PrimaryHosted => "openai",
            ProviderKind::SecondaryHosted => "oss",
            ProviderKind::Mock => "mock",
        }
    }

    // Unknown identifiers are not an error here; the router falls back on them
    pub fn from_identifier(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderKind::PrimaryHosted),
            "oss" => Some(ProviderKind::SecondaryHosted),
            "mock" => Some(ProviderKind::Mock),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which backend actually produced a piece of text.
///
/// Serialized as a flat string: `openai`, `oss`, `mock`, or
/// `mock-fallback-<attempted>` when a live backend failed and the mock
/// answered in its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Provenance {
    PrimaryHosted,
    SecondaryHosted,
    Mock,
    MockFallback(String),
}

const FALLBACK_PREFIX: &str = "mock-fallback-";

impl Provenance {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Provenance::MockFallback(_))
    }
}

impl From<ProviderKind> for Provenance {
    fn from(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::PrimaryHosted => Provenance::PrimaryHosted,
            ProviderKind::SecondaryHosted => Provenance::SecondaryHosted,
            ProviderKind::Mock => Provenance::Mock,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::PrimaryHosted => f.write_str("openai"),
            Provenance::SecondaryHosted => f.write_str("oss"),
            Provenance::Mock => f.write_str("mock"),
            Provenance::MockFallback(attempted) => write!(f, "{}{}", FALLBACK_PREFIX, attempted),
        }
    }
}

impl From<Provenance> for String {
    fn from(p: Provenance) -> Self {
        p.to_string()
    }
}

impl FromStr for Provenance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(attempted) = s.strip_prefix(FALLBACK_PREFIX) {
            if attempted.is_empty() {
                return Err(format!("fallback provenance without provider: {}", s));
            }
            return Ok(Provenance::MockFallback(attempted.to_string()));
        }
        ProviderKind::from_identifier(s)
            .map(Provenance::from)
            .ok_or_else(|| format!("unknown provenance: {}", s))
    }
}

impl TryFrom<String> for Provenance {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// A single text generation call, already rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub provider_override: Option<ProviderKind>,
    pub cacheable: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            provider_override: None,
            cacheable: false,
        }
    }

    pub fn with_override(mut self, provider: Option<ProviderKind>) -> Self {
        self.provider_override = provider;
        self
    }

    pub fn cacheable(mut self, cacheable: bool) -> Self {
        self.cacheable = cacheable;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    #[serde(rename = "provider")]
    pub provider_used: Provenance,
    pub model: Option<String>,
}

// ---- raw generate ----

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    #[serde(default)]
    pub cacheable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(flatten)]
    pub result: GenerationResult,
    #[serde(default)]
    pub cached: bool,
}

// ---- release notes + test scenarios ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseNoteRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub impact_area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNoteResponse {
    pub release_note: String,
    pub test_scenarios: Vec<String>,
    pub provider: Provenance,
    pub model: Option<String>,
    #[serde(default)]
    pub cached: bool,
}

// ---- birthday-aware greeting ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetingRequest {
    pub name: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingResponse {
    pub greeting_message: String,
    pub is_birthday_month: bool,
    pub provider: Provenance,
    pub model: Option<String>,
    #[serde(default)]
    pub cached: bool,
}

// ---- one-line changelog entry ----

fn default_tone() -> String {
    "neutral".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogRequest {
    pub change_summary: String,
    #[serde(default = "default_tone")]
    pub tone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogResponse {
    pub release_note: String,
    pub provider: Provenance,
    pub model: Option<String>,
}

// ---- ad-hoc explanation / Q&A ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    #[default]
    Short,
    Deep,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSnippet {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub topic: String,
    #[serde(default)]
    pub detail_level: DetailLevel,
    #[serde(default)]
    pub context: Vec<ContextSnippet>,
    #[serde(default)]
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub topic: String,
    pub explanation: String,
    pub provider: Provenance,
    pub model: Option<String>,
}

// ---- multi-turn chat ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    #[default]
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }
}

// Either a history in `messages` or a single `message`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub provider: Provenance,
    pub model: Option<String>,
    pub request_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_string_forms() {
        assert_eq!(Provenance::PrimaryHosted.to_string(), "openai");
        assert_eq!(Provenance::Mock.to_string(), "mock");
        assert_eq!(
            Provenance::MockFallback("oss".into()).to_string(),
            "mock-fallback-oss"
        );
        assert_eq!(
            "mock-fallback-openai".parse::<Provenance>().unwrap(),
            Provenance::MockFallback("openai".into())
        );
        assert!("mock-fallback-".parse::<Provenance>().is_err());
        assert!("gemini".parse::<Provenance>().is_err());
    }

    #[test]
    fn provenance_serializes_as_plain_string() {
        let result = GenerationResult {
            text: "hi".into(),
            provider_used: Provenance::MockFallback("openai".into()),
            model: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["provider"], "mock-fallback-openai");
        let back: GenerationResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn provider_identifier_is_case_insensitive() {
        assert_eq!(
            ProviderKind::from_identifier(" OpenAI "),
            Some(ProviderKind::PrimaryHosted)
        );
        assert_eq!(ProviderKind::from_identifier("oss"), Some(ProviderKind::SecondaryHosted));
        assert_eq!(ProviderKind::from_identifier("anthropic"), None);
    }

    #[test]
    fn provider_override_deserializes_from_wire_names() {
        let req: GreetingRequest = serde_json::from_str(
            r#"{"name":"Ada","date_of_birth":"1990-06-15","provider":"oss"}"#,
        )
        .unwrap();
        assert_eq!(req.provider, Some(ProviderKind::SecondaryHosted));
    }

    #[test]
    fn chat_role_defaults_to_user() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"messages":[{"content":"hi"},{"role":"assistant","content":"hello"}],"model":"llama3.2:1b"}"#,
        )
        .unwrap();
        let messages = req.messages.unwrap();
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert_eq!(req.model.as_deref(), Some("llama3.2:1b"));
        assert!(req.message.is_none());
    }
}
