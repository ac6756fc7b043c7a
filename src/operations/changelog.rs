use crate::cache::KeyFields;
use crate::models::{ChangelogRequest, ChangelogResponse, GenerationResult, ProviderKind};
use crate::router::Selection;
use crate::service::Operation;

use super::single_line;

pub const NAMESPACE: &str = "genai:changelog";

// One changelog sentence for an infrastructure change; never cached
pub struct ChangelogLine<'a> {
    pub request: &'a ChangelogRequest,
}

impl<'a> ChangelogLine<'a> {
    pub fn new(request: &'a ChangelogRequest) -> Self {
        Self { request }
    }

    fn tone_instruction(&self) -> String {
        let tone = self.request.tone.trim().to_lowercase();
        if tone.is_empty() || tone == "neutral" {
            "Use a neutral, professional tone.".to_string()
        } else {
            format!("Use a {} tone.", tone)
        }
    }
}

impl Operation for ChangelogLine<'_> {
    type Output = ChangelogResponse;

    fn namespace(&self) -> &'static str {
        NAMESPACE
    }

    fn provider_override(&self) -> Option<ProviderKind> {
        None
    }

    fn key_fields(&self, _selection: &Selection) -> Option<KeyFields> {
        None
    }

    fn render_prompt(&self) -> String {
        format!(
            "You are helping a platform team write concise release notes for \
             infrastructure changes (Terraform, AWS, Kubernetes, databases).\n\n\
             Change description:\n{}\n\n\
             Return exactly one sentence suitable for a technical changelog.\n{}",
            self.request.change_summary.trim(),
            self.tone_instruction()
        )
    }

    fn shape(&self, result: GenerationResult) -> ChangelogResponse {
        ChangelogResponse {
            release_note: single_line(&result.text),
            provider: result.provider_used,
            model: result.model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provenance;

    fn request(tone: &str) -> ChangelogRequest {
        ChangelogRequest {
            change_summary: "Upgraded RDS instance from t3.micro to t3.small in dev".into(),
            tone: tone.into(),
        }
    }

    #[test]
    fn tone_instruction() {
        let req = request("Neutral");
        assert!(ChangelogLine::new(&req).render_prompt().ends_with("Use a neutral, professional tone."));
        let req = request("Casual");
        assert!(ChangelogLine::new(&req).render_prompt().ends_with("Use a casual tone."));
    }

    #[test]
    fn never_cacheable() {
        let req = request("neutral");
        assert!(ChangelogLine::new(&req)
            .key_fields(&Selection::Backend(ProviderKind::Mock))
            .is_none());
    }

    #[test]
    fn output_is_one_punctuated_line() {
        let req = request("neutral");
        let out = ChangelogLine::new(&req).shape(GenerationResult {
            text: "Upgraded the dev RDS instance\nto t3.small".into(),
            provider_used: Provenance::PrimaryHosted,
            model: Some("gpt-4o-mini".into()),
        });
        assert_eq!(out.release_note, "Upgraded the dev RDS instance to t3.small.");
    }
}
