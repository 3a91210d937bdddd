//! Relevance-ranked context window
//!
//! Picks the transcript lines most relevant to the persona about to speak:
//! recent lines, lines that name them, contested lines, lines citing data and
//! recommendations, and lines from colleagues in the same domain.

use super::utterance::Utterance;
use crate::heuristics::{KeywordTables, contains_phrase};
use crate::persona::{Persona, PersonaRegistry};
use serde::{Deserialize, Serialize};

/// Score contributions per signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceWeights {
    /// Multiplied by the line's relative position (newest = 1.0)
    pub recent: f64,
    pub direct_mention: f64,
    pub disagreement: f64,
    pub agreement: f64,
    pub data_point: f64,
    pub recommendation: f64,
    pub same_domain: f64,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            recent: 0.8,
            direct_mention: 0.9,
            disagreement: 0.7,
            agreement: 0.6,
            data_point: 0.7,
            recommendation: 0.8,
            same_domain: 0.5,
        }
    }
}

/// Bounded selection of prior utterances handed to the text generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextWindow {
    pub max_utterances: usize,
    /// Stop adding lines once their combined text exceeds this many bytes
    pub max_chars: usize,
    pub weights: RelevanceWeights,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self {
            max_utterances: 10,
            max_chars: 2800,
            weights: RelevanceWeights::default(),
        }
    }
}

impl ContextWindow {
    pub fn new(max_utterances: usize) -> Self {
        Self {
            max_utterances,
            ..Default::default()
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_weights(mut self, weights: RelevanceWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Select up to `max_utterances` lines for `persona`, returned in
    /// transcript order.
    pub fn select<'a>(
        &self,
        history: &'a [Utterance],
        persona: &Persona,
        panel: &PersonaRegistry,
        tables: &KeywordTables,
    ) -> Vec<&'a Utterance> {
        if self.max_utterances == 0 || history.is_empty() {
            return Vec::new();
        }

        let total = history.len() as f64;
        let mut scored: Vec<(f64, &Utterance)> = history
            .iter()
            .enumerate()
            .map(|(i, u)| {
                let recency = (i as f64 + 1.0) / total;
                (self.score(u, recency, persona, panel, tables), u)
            })
            .collect();

        // Highest score first; newer lines win ties
        scored.sort_by(|(sa, ua), (sb, ub)| {
            sb.total_cmp(sa)
                .then_with(|| ub.sequence_number.cmp(&ua.sequence_number))
        });

        let mut selected = Vec::new();
        let mut used = 0usize;
        for (_, utterance) in scored {
            if selected.len() >= self.max_utterances {
                break;
            }
            if !selected.is_empty() && used + utterance.text.len() > self.max_chars {
                break;
            }
            used += utterance.text.len();
            selected.push(utterance);
        }

        selected.sort_by_key(|u| u.sequence_number);
        selected
    }

    fn score(
        &self,
        utterance: &Utterance,
        recency: f64,
        persona: &Persona,
        panel: &PersonaRegistry,
        tables: &KeywordTables,
    ) -> f64 {
        let w = &self.weights;
        let text = utterance.text.as_str();
        let mut score = w.recent * recency;

        if utterance.speaker_id != persona.id
            && persona
                .reference_names()
                .iter()
                .any(|name| contains_phrase(text, name))
        {
            score += w.direct_mention;
        }

        if tables.has_disagreement(text) {
            score += w.disagreement;
        } else if tables.has_agreement(text) {
            score += w.agreement;
        }

        if text.contains('$') || text.contains('%') {
            score += w.data_point;
        }
        if tables.has_recommendation(text) {
            score += w.recommendation;
        }

        let same_domain = panel.get(&utterance.speaker_id).is_some_and(|speaker| {
            speaker.id != persona.id && speaker.domain_tags().iter().any(|t| persona.has_tag(t))
        });
        if same_domain {
            score += w.same_domain;
        }

        score
    }
}
