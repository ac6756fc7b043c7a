use super::NO_CONTENT;
use crate::cache::KeyFields;
use crate::models::{ChatMessage, ChatRequest, GenerationResult, ProviderKind};
use crate::providers::Completion;
use crate::router::Selection;
use crate::service::Operation;

pub const NAMESPACE: &str = "genai:chat";

// Older turns are dropped before the backend sees the history
pub const MAX_HISTORY: usize = 20;

// Multi-turn conversation, never cached
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    model: Option<String>,
    provider: Option<ProviderKind>,
}

impl Conversation {
    /// `None` when the request has neither a history nor a single message.
    /// A non-empty history wins over `message`.
    pub fn from_request(request: &ChatRequest) -> Option<Self> {
        let messages = match (&request.messages, &request.message) {
            (Some(history), _) if !history.is_empty() => {
                let skip = history.len().saturating_sub(MAX_HISTORY);
                history[skip..].to_vec()
            }
            (_, Some(message)) => vec![ChatMessage::user(message.clone())],
            _ => return None,
        };

        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from);

        Some(Self {
            messages,
            model,
            provider: request.provider,
        })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

impl Operation for Conversation {
    type Output = GenerationResult;

    fn namespace(&self) -> &'static str {
        NAMESPACE
    }

    fn provider_override(&self) -> Option<ProviderKind> {
        self.provider
    }

    fn key_fields(&self, _selection: &Selection) -> Option<KeyFields> {
        None
    }

    fn render_prompt(&self) -> String {
        self.completion().transcript()
    }

    fn completion(&self) -> Completion {
        Completion::chat(self.messages.clone(), self.model.clone())
    }

    fn shape(&self, result: GenerationResult) -> GenerationResult {
        let reply = result.text.trim();
        let text = if reply.is_empty() {
            NO_CONTENT.to_string()
        } else {
            reply.to_string()
        };
        GenerationResult { text, ..result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatRole, Provenance};

    fn turn(i: usize) -> ChatMessage {
        let role = if i % 2 == 0 { ChatRole::User } else { ChatRole::Assistant };
        ChatMessage::new(role, format!("turn {}", i))
    }

    #[test]
    fn long_history_keeps_the_latest_turns() {
        let request = ChatRequest {
            messages: Some((0..25).map(turn).collect()),
            ..Default::default()
        };
        let chat = Conversation::from_request(&request).unwrap();
        assert_eq!(chat.messages().len(), MAX_HISTORY);
        assert_eq!(chat.messages()[0].content, "turn 5");
        assert_eq!(chat.messages()[MAX_HISTORY - 1].content, "turn 24");
    }

    #[test]
    fn single_message_becomes_a_user_turn() {
        let request = ChatRequest {
            message: Some("hello".into()),
            model: Some("  ".into()),
            ..Default::default()
        };
        let chat = Conversation::from_request(&request).unwrap();
        assert_eq!(chat.messages(), &[ChatMessage::user("hello")]);
        assert!(chat.completion().model.is_none());
    }

    #[test]
    fn history_wins_over_message() {
        let request = ChatRequest {
            messages: Some(vec![turn(0)]),
            message: Some("ignored".into()),
            model: Some("llama3.2:1b".into()),
            ..Default::default()
        };
        let chat = Conversation::from_request(&request).unwrap();
        assert_eq!(chat.messages()[0].content, "turn 0");
        assert_eq!(chat.completion().model.as_deref(), Some("llama3.2:1b"));
    }

    #[test]
    fn empty_request_has_no_conversation() {
        assert!(Conversation::from_request(&ChatRequest::default()).is_none());
        let request = ChatRequest {
            messages: Some(Vec::new()),
            ..Default::default()
        };
        assert!(Conversation::from_request(&request).is_none());
    }

    #[test]
    fn blank_reply_is_replaced() {
        let chat = Conversation::from_request(&ChatRequest {
            message: Some("hi".into()),
            ..Default::default()
        })
        .unwrap();
        let shaped = chat.shape(GenerationResult {
            text: "  \n".into(),
            provider_used: Provenance::SecondaryHosted,
            model: Some("llama3.2:3b".into()),
        });
        assert_eq!(shaped.text, NO_CONTENT);
        assert_eq!(shaped.provider_used, Provenance::SecondaryHosted);
    }
}
