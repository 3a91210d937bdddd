//! Keyword tables and phrase matching

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configured phrase lists used by the selector, ledger and synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTables {
    /// Markers of agreement ("exactly", "building on", "agree")
    pub agreement: Vec<String>,
    /// Markers of disagreement ("disagree", "that's wrong", "stop")
    pub disagreement: Vec<String>,
    /// Markers of a recommendation-bearing utterance ("we should", "recommend")
    pub recommendation: Vec<String>,
    /// Domain tag -> keywords that route the floor to personas with that tag
    pub domain_routing: BTreeMap<String, Vec<String>>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        let mut domain_routing = BTreeMap::new();
        domain_routing.insert(
            "brand".to_string(),
            strings(&["brand", "positioning", "perception", "messaging"]),
        );
        domain_routing.insert(
            "strategy".to_string(),
            strings(&["strategy", "strategic", "competitive", "differentiation", "market"]),
        );
        domain_routing.insert(
            "campaigns".to_string(),
            strings(&["campaign", "ads", "paid", "channel", "cac"]),
        );
        domain_routing.insert(
            "budget".to_string(),
            strings(&["budget", "cost", "spend", "roi"]),
        );
        domain_routing.insert(
            "content".to_string(),
            strings(&["content", "story", "seo", "narrative"]),
        );
        domain_routing.insert("creative".to_string(), strings(&["creative", "idea"]));
        domain_routing.insert(
            "experience".to_string(),
            strings(&["user", "experience", "ux", "journey", "onboarding", "friction"]),
        );
        domain_routing.insert(
            "analytics".to_string(),
            strings(&["data", "metric", "numbers", "attribution", "measure"]),
        );
        domain_routing.insert(
            "growth".to_string(),
            strings(&["growth", "viral", "referral", "retention", "scale"]),
        );

        Self {
            agreement: strings(&["exactly", "building on", "agree"]),
            disagreement: strings(&["disagree", "that's wrong", "stop"]),
            recommendation: strings(&["we should", "recommend", "suggest", "propose"]),
            domain_routing,
        }
    }
}

impl KeywordTables {
    pub fn has_agreement(&self, text: &str) -> bool {
        contains_any(text, &self.agreement)
    }

    pub fn has_disagreement(&self, text: &str) -> bool {
        contains_any(text, &self.disagreement)
    }

    pub fn has_recommendation(&self, text: &str) -> bool {
        contains_any(text, &self.recommendation)
    }

    /// Number of distinct routing keywords of `tag` present in `text`.
    pub fn domain_hits(&self, tag: &str, text: &str) -> usize {
        self.domain_routing
            .get(tag)
            .map(|keywords| keywords.iter().filter(|k| contains_phrase(text, k)).count())
            .unwrap_or(0)
    }

    /// Domain tag in `tags` with the most keyword hits; earlier tags win ties.
    pub fn best_tag<'a>(&self, tags: &'a [String], text: &str) -> Option<(&'a str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for tag in tags {
            let hits = self.domain_hits(tag, text);
            if best.is_none_or(|(_, b)| hits > b) {
                best = Some((tag.as_str(), hits));
            }
        }
        best
    }
}

/// True when any phrase in `phrases` occurs in `text`.
pub fn contains_any(text: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|p| contains_phrase(text, p))
}

/// Case-insensitive phrase match anchored at a word start.
///
/// The phrase must begin at a word boundary but may run into a longer word,
/// so "agree" matches "agreed" but not "disagree", and "stop" matches
/// "stopped" but not "nonstop".
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let phrase = phrase.trim().to_lowercase();
    if phrase.is_empty() {
        return false;
    }
    let text = text.to_lowercase();

    let mut from = 0;
    while let Some(pos) = text[from..].find(&phrase) {
        let start = from + pos;
        let at_word_start = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        if at_word_start {
            return true;
        }
        from = start + phrase.len();
    }
    false
}
