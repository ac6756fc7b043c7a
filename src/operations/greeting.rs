use chrono::{Datelike, NaiveDate};

use crate::cache::{KeyFields, normalize};
use crate::models::{GenerationResult, GreetingRequest, GreetingResponse, ProviderKind};
use crate::router::Selection;
use crate::service::Operation;

pub const NAMESPACE: &str = "genai:greeting";

pub const BIRTHDAY_MONTH_INSTRUCTION: &str = "Mention that this is their birthday month.";

// Birthday-aware greeting. `today` is injected so the month check is testable.
pub struct Greeting<'a> {
    request: &'a GreetingRequest,
    is_birthday_month: bool,
}

impl<'a> Greeting<'a> {
    pub fn new(request: &'a GreetingRequest, today: NaiveDate) -> Self {
        Self {
            request,
            is_birthday_month: request.date_of_birth.month() == today.month(),
        }
    }

    pub fn is_birthday_month(&self) -> bool {
        self.is_birthday_month
    }
}

impl Operation for Greeting<'_> {
    type Output = GreetingResponse;

    fn namespace(&self) -> &'static str {
        NAMESPACE
    }

    fn provider_override(&self) -> Option<ProviderKind> {
        self.request.provider
    }

    fn key_fields(&self, selection: &Selection) -> Option<KeyFields> {
        Some(
            KeyFields::new()
                .field("name", normalize(&self.request.name))
                .field("dob", self.request.date_of_birth.format("%Y-%m-%d"))
                .field("provider", selection.identifier())
                .field("is_birthday_month", self.is_birthday_month),
        )
    }

    fn render_prompt(&self) -> String {
        let name = self.request.name.trim();
        let dob = self.request.date_of_birth;
        let dob_str = dob.format("%d %B %Y");

        if self.is_birthday_month {
            return format!(
                "You are a friendly assistant.\n\n\
                 Generate a warm, cheerful birthday-month greeting for a person.\n\n\
                 Name: {}\n\
                 Date of birth: {}\n\n\
                 Requirements:\n\
                 - {}\n\
                 - Keep it short (2-4 sentences).\n\
                 - Sound natural and kind, without over-the-top emojis.\n",
                name, dob_str, BIRTHDAY_MONTH_INSTRUCTION
            );
        }

        format!(
            "You are a friendly assistant.\n\n\
             Generate a short, positive greeting for a person.\n\
             It is not their birthday month, but you can optionally mention \
             when their birthday month is.\n\n\
             Name: {}\n\
             Date of birth: {}\n\n\
             Requirements:\n\
             - Keep it short (2-4 sentences).\n\
             - You may gently mention that their birthday month is {}.\n\
             - Sound polite and encouraging.\n",
            name,
            dob_str,
            dob.format("%B")
        )
    }

    fn shape(&self, result: GenerationResult) -> GreetingResponse {
        GreetingResponse {
            greeting_message: result.text.trim().to_string(),
            is_birthday_month: self.is_birthday_month,
            provider: result.provider_used,
            model: result.model,
            cached: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(name: &str) -> GreetingRequest {
        GreetingRequest {
            name: name.into(),
            date_of_birth: date("1990-06-15"),
            provider: None,
        }
    }

    #[test]
    fn same_month_is_birthday_month() {
        let req = request("Ada");
        let op = Greeting::new(&req, date("2026-06-01"));
        assert!(op.is_birthday_month());
        let prompt = op.render_prompt();
        assert!(prompt.contains(BIRTHDAY_MONTH_INSTRUCTION));
        assert!(prompt.contains("Date of birth: 15 June 1990"));
    }

    #[test]
    fn other_month_mentions_birth_month() {
        let req = request("Ada");
        let op = Greeting::new(&req, date("2026-10-16"));
        assert!(!op.is_birthday_month());
        let prompt = op.render_prompt();
        assert!(!prompt.contains(BIRTHDAY_MONTH_INSTRUCTION));
        assert!(prompt.contains("birthday month is June"));
    }

    #[test]
    fn name_casing_and_whitespace_share_a_key() {
        let today = date("2026-06-01");
        let selection = Selection::Backend(ProviderKind::PrimaryHosted);
        let a = request("Ada");
        let b = request("  ADA ");
        let key_a = Greeting::new(&a, today).key_fields(&selection).unwrap().derive_key(NAMESPACE);
        let key_b = Greeting::new(&b, today).key_fields(&selection).unwrap().derive_key(NAMESPACE);
        assert_eq!(key_a, key_b);
    }

    #[test]
    fn birthday_flag_changes_the_key() {
        let req = request("Ada");
        let selection = Selection::Backend(ProviderKind::PrimaryHosted);
        let june = Greeting::new(&req, date("2026-06-01")).key_fields(&selection);
        let july = Greeting::new(&req, date("2026-07-01")).key_fields(&selection);
        assert_ne!(june, july);
    }
}
