//! Phrase redaction filter.
//!
//! Replaces configured phrases (case-insensitive) before text enters the
//! transcript. Text that is left empty after redaction is rejected, so the
//! pipeline treats it as a failed generation.

use panel_application::ports::content_filter::{ContentFilter, FilterVerdict};
use panel_domain::Persona;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_REPLACEMENT: &str = "[removed]";

/// One phrase and the text that replaces it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionRule {
    pub phrase: String,
    #[serde(default)]
    pub replacement: Option<String>,
}

impl RedactionRule {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            replacement: None,
        }
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PhraseRedactionFilter {
    /// (lowercased phrase, replacement), longest phrase first
    rules: Vec<(String, String)>,
    /// Reject instead of rewriting when any phrase matches
    reject_on_match: bool,
}

impl PhraseRedactionFilter {
    pub fn new(rules: impl IntoIterator<Item = RedactionRule>) -> Self {
        let mut rules: Vec<(String, String)> = rules
            .into_iter()
            .filter(|r| !r.phrase.trim().is_empty())
            .map(|r| {
                (
                    r.phrase.trim().to_ascii_lowercase(),
                    r.replacement
                        .unwrap_or_else(|| DEFAULT_REPLACEMENT.to_string()),
                )
            })
            .collect();
        rules.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self {
            rules,
            reject_on_match: false,
        }
    }

    pub fn rejecting(mut self, reject_on_match: bool) -> Self {
        self.reject_on_match = reject_on_match;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Text with every rule applied, plus the number of replacements made
    pub fn redact(&self, text: &str) -> (String, usize) {
        let mut out = text.to_string();
        let mut hits = 0;
        for (phrase, replacement) in &self.rules {
            let (next, n) = replace_ascii_case_insensitive(&out, phrase, replacement);
            out = next;
            hits += n;
        }
        (out, hits)
    }
}

impl ContentFilter for PhraseRedactionFilter {
    fn filter(&self, speaker: &Persona, text: &str) -> FilterVerdict {
        let (redacted, hits) = self.redact(text);
        if hits == 0 {
            return FilterVerdict::Accept(redacted);
        }
        debug!(speaker = %speaker.id, hits, "redacted blocked phrases");
        if self.reject_on_match {
            return FilterVerdict::Reject(format!("{} blocked phrase(s)", hits));
        }
        if redacted.trim().is_empty() {
            return FilterVerdict::Reject("nothing left after redaction".to_string());
        }
        FilterVerdict::Accept(redacted)
    }
}

/// ASCII lowercasing keeps byte offsets, so matches found in the lowered copy
/// index the original text directly.
fn replace_ascii_case_insensitive(text: &str, needle: &str, replacement: &str) -> (String, usize) {
    let haystack = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut hits = 0;
    for (start, _) in haystack.match_indices(needle) {
        out.push_str(&text[last..start]);
        out.push_str(replacement);
        last = start + needle.len();
        hits += 1;
    }
    out.push_str(&text[last..]);
    (out, hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_domain::PersonalityTraits;

    fn speaker() -> Persona {
        Persona::new("marcus", "Marcus", PersonalityTraits::default())
    }

    fn filter() -> PhraseRedactionFilter {
        PhraseRedactionFilter::new([
            RedactionRule::new("guaranteed returns").with_replacement("potential returns"),
            RedactionRule::new("no risk").with_replacement("managed risk"),
            RedactionRule::new("sure thing"),
        ])
    }

    #[test]
    fn test_clean_text_passes_unchanged() {
        let verdict = filter().filter(&speaker(), "CAC is up 40%.");
        assert_eq!(verdict, FilterVerdict::Accept("CAC is up 40%.".to_string()));
    }

    #[test]
    fn test_phrases_replaced_case_insensitively() {
        let verdict = filter().filter(
            &speaker(),
            "Guaranteed Returns with No Risk. It's a sure thing.",
        );
        assert_eq!(
            verdict,
            FilterVerdict::Accept(
                "potential returns with managed risk. It's a [removed].".to_string()
            )
        );
    }

    #[test]
    fn test_reject_mode() {
        let verdict = filter()
            .rejecting(true)
            .filter(&speaker(), "This is a sure thing.");
        assert!(matches!(verdict, FilterVerdict::Reject(_)));
    }

    #[test]
    fn test_fully_redacted_text_rejected() {
        let filter = PhraseRedactionFilter::new([RedactionRule::new("sure thing").with_replacement("")]);
        assert!(matches!(
            filter.filter(&speaker(), "Sure thing"),
            FilterVerdict::Reject(_)
        ));
    }

    #[test]
    fn test_multibyte_text_is_safe() {
        let (out, hits) = filter().redact("Größe: no risk · 日本");
        assert_eq!(out, "Größe: managed risk · 日本");
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_blank_rules_ignored() {
        assert!(PhraseRedactionFilter::new([RedactionRule::new("  ")]).is_empty());
    }
}
