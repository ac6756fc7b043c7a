use crate::cache::KeyFields;
use crate::models::{DetailLevel, ExplainRequest, ExplainResponse, GenerationResult, ProviderKind};
use crate::router::Selection;
use crate::service::Operation;

pub const NAMESPACE: &str = "genai:explain";

// Only the head of each context document goes into the prompt
const SNIPPET_CHARS: usize = 300;

// Ad-hoc Q&A over caller-supplied context, never cached
pub struct Explanation<'a> {
    pub request: &'a ExplainRequest,
}

impl<'a> Explanation<'a> {
    pub fn new(request: &'a ExplainRequest) -> Self {
        Self { request }
    }

    fn context_block(&self) -> Option<String> {
        if self.request.context.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .request
            .context
            .iter()
            .map(|doc| {
                let snippet: String = doc.content.chars().take(SNIPPET_CHARS).collect();
                format!("Title: {}\nSnippet: {}", doc.title, snippet)
            })
            .collect();
        Some(parts.join("\n\n---\n\n"))
    }
}

impl Operation for Explanation<'_> {
    type Output = ExplainResponse;

    fn namespace(&self) -> &'static str {
        NAMESPACE
    }

    fn provider_override(&self) -> Option<ProviderKind> {
        self.request.provider
    }

    fn key_fields(&self, _selection: &Selection) -> Option<KeyFields> {
        None
    }

    fn render_prompt(&self) -> String {
        let instruction = match self.request.detail_level {
            DetailLevel::Short => "Explain in 3-4 concise bullet points.",
            DetailLevel::Deep => {
                "Explain step by step with examples, short code snippets, and common pitfalls."
            }
        };

        let mut prompt = format!(
            "You are a senior engineering mentor.\n\nTopic: {}\n\nInstruction: {}\n\n",
            self.request.topic.trim(),
            instruction
        );
        if let Some(context) = self.context_block() {
            prompt.push_str(&format!(
                "Context:\n{}\n\nReference the relevant document titles when appropriate.\n",
                context
            ));
        }
        prompt.push_str("Answer clearly and in plain language.");
        prompt
    }

    fn shape(&self, result: GenerationResult) -> ExplainResponse {
        ExplainResponse {
            topic: self.request.topic.trim().to_string(),
            explanation: result.text,
            provider: result.provider_used,
            model: result.model,
        }
    }
}
