//! Speaker selection
//!
//! Rules are evaluated top to bottom and the first one that applies picks the
//! candidate:
//!
//! 1. Someone has not spoken in this phase: best domain-keyword match against
//!    the most recent utterance (the topic before the first turn).
//! 2. The last utterance agrees with a named persona: weighted draw favouring
//!    the last speaker's allies.
//! 3. The last utterance disagrees: the most contrarian other persona.
//! 4. Weighted draw by `assertiveness + contrarianism` over everyone except
//!    the last speaker.
//!
//! The candidate may then interrupt the floor holder.

use super::scheduler::TurnScheduler;
use crate::conversation::ConversationSession;
use crate::heuristics::{KeywordTables, TextSignals};
use crate::persona::{Persona, PersonaId};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No eligible personas to take the next turn")]
    NoEligiblePersonas,
}

/// Which selection rule produced a choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    UnspokenDomainMatch,
    AllianceThread,
    Contrarian,
    Weighted,
    SoleParticipant,
}

impl SelectionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionRule::UnspokenDomainMatch => "unspoken_domain_match",
            SelectionRule::AllianceThread => "alliance_thread",
            SelectionRule::Contrarian => "contrarian",
            SelectionRule::Weighted => "weighted",
            SelectionRule::SoleParticipant => "sole_participant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerChoice {
    pub speaker: PersonaId,
    pub is_interruption: bool,
    pub interrupted: Option<PersonaId>,
    pub rule: SelectionRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Extra weight per recorded alliance with the last speaker (rule 2)
    pub alliance_bias: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self { alliance_bias: 1.0 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpeakerSelector {
    config: SelectorConfig,
}

impl SpeakerSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn select_next<R: Rng + ?Sized>(
        &self,
        session: &ConversationSession,
        tables: &KeywordTables,
        scheduler: &TurnScheduler,
        rng: &mut R,
    ) -> Result<SpeakerChoice, SelectionError> {
        let panel = session.participants();
        let everyone: Vec<&Persona> = panel.iter().collect();
        let floor_holder = session.floor_holder();

        match everyone.as_slice() {
            [] => return Err(SelectionError::NoEligiblePersonas),
            [only] => {
                return Ok(SpeakerChoice {
                    speaker: only.id.clone(),
                    is_interruption: false,
                    interrupted: None,
                    rule: SelectionRule::SoleParticipant,
                });
            }
            _ => {}
        }

        let (candidate, rule) = self.pick_candidate(session, &everyone, floor_holder, tables, rng)?;

        let floor_persona = floor_holder.and_then(|id| panel.get(id));
        let interrupted = match floor_persona {
            Some(current)
                if scheduler.should_interrupt(candidate, current, session.relationships(), rng) =>
            {
                Some(current.id.clone())
            }
            _ => None,
        };

        Ok(SpeakerChoice {
            speaker: candidate.id.clone(),
            is_interruption: interrupted.is_some(),
            interrupted,
            rule,
        })
    }

    fn pick_candidate<'a, R: Rng + ?Sized>(
        &self,
        session: &ConversationSession,
        everyone: &[&'a Persona],
        floor_holder: Option<&PersonaId>,
        tables: &KeywordTables,
        rng: &mut R,
    ) -> Result<(&'a Persona, SelectionRule), SelectionError> {
        let last = session.transcript().last();
        let last_text = last.map_or(session.topic.as_str(), |u| u.text.as_str());

        // Rule 1
        let mut unspoken: Vec<&Persona> = everyone
            .iter()
            .copied()
            .filter(|p| !session.has_spoken_this_phase(&p.id))
            .collect();
        if unspoken.len() > 1 {
            unspoken.retain(|p| Some(&p.id) != floor_holder);
        }
        if !unspoken.is_empty() {
            let best = unspoken
                .into_iter()
                .max_by(|a, b| {
                    let hits = |p: &Persona| {
                        tables
                            .best_tag(p.domain_tags(), last_text)
                            .map_or(0, |(_, n)| n)
                    };
                    hits(a)
                        .cmp(&hits(b))
                        .then_with(|| by_assertiveness(a, b))
                        .then_with(|| b.id.cmp(&a.id))
                })
                .ok_or(SelectionError::NoEligiblePersonas)?;
            return Ok((best, SelectionRule::UnspokenDomainMatch));
        }

        let others: Vec<&Persona> = everyone
            .iter()
            .copied()
            .filter(|p| Some(&p.id) != floor_holder)
            .collect();
        if others.is_empty() {
            return Err(SelectionError::NoEligiblePersonas);
        }

        if let Some(last) = last {
            let signals =
                TextSignals::scan(&last.text, &last.speaker_id, session.participants(), tables);

            // Rule 2
            if signals.agreement_with_reference() {
                let weights: Vec<f64> = others
                    .iter()
                    .map(|p| {
                        let alliances =
                            session.relationships().alliance_count(&last.speaker_id, &p.id);
                        1.0 + self.config.alliance_bias * alliances as f64
                    })
                    .collect();
                let pick = weighted_pick(&others, &weights, rng)?;
                return Ok((pick, SelectionRule::AllianceThread));
            }

            // Rule 3
            if signals.disagreement {
                let pick = others
                    .iter()
                    .copied()
                    .max_by(|a, b| {
                        a.traits
                            .contrarianism
                            .total_cmp(&b.traits.contrarianism)
                            .then_with(|| by_assertiveness(a, b))
                            .then_with(|| b.id.cmp(&a.id))
                    })
                    .ok_or(SelectionError::NoEligiblePersonas)?;
                return Ok((pick, SelectionRule::Contrarian));
            }
        }

        // Rule 4
        let weights: Vec<f64> = others
            .iter()
            .map(|p| p.traits.assertiveness + p.traits.contrarianism)
            .collect();
        let pick = weighted_pick(&others, &weights, rng)?;
        Ok((pick, SelectionRule::Weighted))
    }
}

fn by_assertiveness(a: &Persona, b: &Persona) -> Ordering {
    a.traits.assertiveness.total_cmp(&b.traits.assertiveness)
}

/// Weighted draw; uniform when every weight is zero.
fn weighted_pick<'a, R: Rng + ?Sized>(
    candidates: &[&'a Persona],
    weights: &[f64],
    rng: &mut R,
) -> Result<&'a Persona, SelectionError> {
    match WeightedIndex::new(weights) {
        Ok(dist) => Ok(candidates[dist.sample(rng)]),
        Err(_) => candidates
            .choose(rng)
            .copied()
            .ok_or(SelectionError::NoEligiblePersonas),
    }
}
