use crate::cache::{KeyFields, normalize};
use crate::models::{GenerationResult, ProviderKind, ReleaseNoteRequest, ReleaseNoteResponse};
use crate::router::Selection;
use crate::service::Operation;

use super::split_primary_and_items;

pub const NAMESPACE: &str = "genai:release-notes";

// Lines mentioning this word count as test scenarios even without a bullet
const SCENARIO_KEYWORD: &str = "test";

/// Release note paragraph plus a short list of test scenarios.
pub struct ReleaseNotes<'a> {
    pub request: &'a ReleaseNoteRequest,
    pub provider: Option<ProviderKind>,
}

impl<'a> ReleaseNotes<'a> {
    pub fn new(request: &'a ReleaseNoteRequest, provider: Option<ProviderKind>) -> Self {
        Self { request, provider }
    }
}

impl Operation for ReleaseNotes<'_> {
    type Output = ReleaseNoteResponse;

    fn namespace(&self) -> &'static str {
        NAMESPACE
    }

    fn provider_override(&self) -> Option<ProviderKind> {
        self.provider
    }

    fn key_fields(&self, selection: &Selection) -> Option<KeyFields> {
        let req = self.request;
        Some(
            KeyFields::new()
                .field("title", req.title.trim())
                .field("description", req.description.trim())
                .optional_field("risk_level", req.risk_level.as_deref().map(normalize))
                .optional_field("impact_area", req.impact_area.as_deref().map(normalize))
                .field("provider", selection.identifier()),
        )
    }

    fn render_prompt(&self) -> String {
        let req = self.request;
        let risk = req.risk_level.as_deref().unwrap_or("unspecified");
        let impact = req.impact_area.as_deref().unwrap_or("general");

        format!(
            "You are an assistant that writes clear, concise release notes and test scenarios.\n\n\
             Title: {}\n\
             Risk level: {}\n\
             Impact area: {}\n\
             Change description:\n{}\n\n\
             Please produce:\n\
             1) A short release note (2-4 sentences) suitable for end users.\n\
             2) 2-3 bullet-point test scenarios.\n\n\
             Return the answer as plain text, where the first paragraph is the release note \
             and the following lines (starting with '-') are the test scenarios.\n",
            req.title, risk, impact, req.description
        )
    }

    fn shape(&self, result: GenerationResult) -> ReleaseNoteResponse {
        let (release_note, test_scenarios) = split_primary_and_items(&result.text, SCENARIO_KEYWORD);
        ReleaseNoteResponse {
            release_note,
            test_scenarios,
            provider: result.provider_used,
            model: result.model,
            cached: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provenance;
    use crate::operations::FALLBACK_ITEMS;

    fn request() -> ReleaseNoteRequest {
        ReleaseNoteRequest {
            title: "Improve login error messages".into(),
            description: "Clarified errors for wrong password vs locked account.".into(),
            risk_level: Some("Low".into()),
            impact_area: Some("authentication".into()),
        }
    }

    #[test]
    fn prompt_carries_request_fields() {
        let req = request();
        let prompt = ReleaseNotes::new(&req, None).render_prompt();
        assert!(prompt.contains("Title: Improve login error messages"));
        assert!(prompt.contains("Risk level: Low"));
        assert!(prompt.contains("Impact area: authentication"));
    }

    #[test]
    fn prompt_defaults_missing_fields() {
        let mut req = request();
        req.risk_level = None;
        req.impact_area = None;
        let prompt = ReleaseNotes::new(&req, None).render_prompt();
        assert!(prompt.contains("Risk level: unspecified"));
        assert!(prompt.contains("Impact area: general"));
    }

    #[test]
    fn risk_level_casing_does_not_change_key() {
        let a = request();
        let mut b = request();
        b.risk_level = Some(" LOW ".into());
        let selection = Selection::Backend(ProviderKind::PrimaryHosted);
        assert_eq!(
            ReleaseNotes::new(&a, None).key_fields(&selection),
            ReleaseNotes::new(&b, None).key_fields(&selection)
        );
    }

    #[test]
    fn shape_parses_scenarios() {
        let req = request();
        let op = ReleaseNotes::new(&req, None);
        let out = op.shape(GenerationResult {
            text: "Release note generated line\n- scenario A\n- scenario B".into(),
            provider_used: Provenance::SecondaryHosted,
            model: Some("oss-test-model".into()),
        });
        assert_eq!(out.release_note, "Release note generated line");
        assert_eq!(out.test_scenarios, vec!["scenario A", "scenario B"]);
        assert!(!out.cached);

        let out = op.shape(GenerationResult {
            text: "[MOCK:openai] Response for prompt: ...".into(),
            provider_used: Provenance::Mock,
            model: Some("mock".into()),
        });
        assert_eq!(out.test_scenarios, FALLBACK_ITEMS.to_vec());
    }
}
