use super::{BackendOutput, Completion};

// How much of the prompt is echoed back
const PROMPT_PREVIEW_CHARS: usize = 200;

pub const MOCK_MODEL: &str = "mock";

// Deterministic stand-in, no I/O
#[derive(Debug, Clone, Default)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }

    // `tag` names the backend the caller meant to reach
    pub fn generate(&self, prompt: &str, tag: &str) -> BackendOutput {
        let preview: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
        BackendOutput {
            text: format!("[MOCK:{}] Response for prompt: {}", tag, preview),
            model: Some(MOCK_MODEL.to_string()),
        }
    }

    // Echoes the latest turn only
    pub fn complete(&self, completion: &Completion, tag: &str) -> BackendOutput {
        self.generate(completion.last_content(), tag)
    }
}
