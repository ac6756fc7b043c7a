//! Call sites served by the gateway. Each one renders its own prompt, picks
//! its cache fields and shapes raw backend text into its response type.

pub mod changelog;
pub mod chat;
pub mod explain;
pub mod greeting;
pub mod release_notes;

pub use changelog::ChangelogLine;
pub use chat::Conversation;
pub use explain::Explanation;
pub use greeting::Greeting;
pub use release_notes::ReleaseNotes;

pub const NO_CONTENT: &str = "No content generated.";

// Substituted whenever the backend gives us no list items
pub const FALLBACK_ITEMS: [&str; 3] = [
    "Verify the main feature works as described in the release note.",
    "Test edge cases and error conditions for this change.",
    "Validate there are no regressions in related features.",
];

fn fallback_items() -> Vec<String> {
    FALLBACK_ITEMS.iter().map(|s| s.to_string()).collect()
}

/// Split generated text into a primary line and follow-up items.
///
/// The first non-blank line is primary. After that, `-`/`*` bullets become
/// items with the marker stripped, and any other line mentioning `keyword`
/// (case-insensitive) is kept verbatim. No items means the fixed fallback.
pub fn split_primary_and_items(text: &str, keyword: &str) -> (String, Vec<String>) {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let Some(primary) = lines.next() else {
        return (NO_CONTENT.to_string(), fallback_items());
    };

    let keyword = keyword.to_lowercase();
    let mut items: Vec<String> = lines
        .filter_map(|line| {
            if line.starts_with(['-', '*']) {
                let item = line.trim_start_matches(['-', '*', ' ']).trim();
                (!item.is_empty()).then(|| item.to_string())
            } else if line.to_lowercase().contains(&keyword) {
                Some(line.to_string())
            } else {
                None
            }
        })
        .collect();

    if items.is_empty() {
        items = fallback_items();
    }
    (primary.to_string(), items)
}

/// Collapse text to a single sentence-like line ending in punctuation.
pub fn single_line(text: &str) -> String {
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.is_empty() {
        return NO_CONTENT.to_string();
    }
    if line.ends_with(['.', '!', '?']) {
        line
    } else {
        format!("{}.", line)
    }
}
