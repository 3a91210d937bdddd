//! Per-utterance signal extraction

use super::keywords::{KeywordTables, contains_phrase};
use crate::persona::{PersonaId, PersonaRegistry};

/// Shallow signals extracted from one utterance's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSignals {
    pub agreement: bool,
    pub disagreement: bool,
    pub recommendation: bool,
    /// Other personas referenced by id or display name, in registry order
    pub mentions: Vec<PersonaId>,
}

impl TextSignals {
    pub fn scan(
        text: &str,
        speaker: &PersonaId,
        panel: &PersonaRegistry,
        tables: &KeywordTables,
    ) -> Self {
        let mentions = panel
            .iter()
            .filter(|p| &p.id != speaker)
            .filter(|p| {
                p.reference_names()
                    .iter()
                    .any(|name| contains_phrase(text, name))
            })
            .map(|p| p.id.clone())
            .collect();

        Self {
            agreement: tables.has_agreement(text),
            disagreement: tables.has_disagreement(text),
            recommendation: tables.has_recommendation(text),
            mentions,
        }
    }

    /// Agreement that names at least one other persona
    pub fn agreement_with_reference(&self) -> bool {
        self.agreement && !self.mentions.is_empty()
    }
}
