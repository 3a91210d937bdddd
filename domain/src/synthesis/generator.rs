//! Deterministic synthesis of a session transcript.
//!
//! No randomness and no I/O: the same session always yields the same document.

use super::document::{
    ConflictNote, DataPoint, Excerpt, PhaseTimeline, Recommendation, SynthesisDocument,
};
use crate::conversation::{ConversationSession, DiscussionPhase, Utterance};
use crate::core::string::{excerpt, sentences, truncate};
use crate::heuristics::{KeywordTables, contains_any};
use crate::persona::PersonaId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Dollar amounts, percentages, ratios like `3:1` and decimal figures
const FIGURE_PATTERN: &str =
    r"\$\s?\d[\d,]*(?:\.\d+)?[KkMmBb]?|\d+(?:\.\d+)?\s?%|\d+(?:\.\d+)?:\d+|\d+\.\d+";

static FIGURES: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(FIGURE_PATTERN).ok());

const GENERAL_OWNER: &str = "general";

/// Section size limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub executive_summary_lines: usize,
    pub max_items_per_section: usize,
    pub max_data_points: usize,
    /// Byte limit of each quoted excerpt
    pub excerpt_max_chars: usize,
    /// Pairs listed per relationship insight category
    pub insight_limit: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            executive_summary_lines: 3,
            max_items_per_section: 8,
            max_data_points: 10,
            excerpt_max_chars: 200,
            insight_limit: 3,
        }
    }
}

pub fn synthesize(
    session: &ConversationSession,
    tables: &KeywordTables,
    config: &SynthesisConfig,
) -> SynthesisDocument {
    let transcript = session.transcript().as_slice();
    let usable: Vec<&Utterance> = transcript.iter().filter(|u| !u.degraded).collect();
    let quote = |u: &Utterance| Excerpt {
        sequence_number: u.sequence_number,
        speaker_id: u.speaker_id.clone(),
        text: excerpt(&u.text, config.excerpt_max_chars),
    };

    let recommendations: Vec<Recommendation> = usable
        .iter()
        .filter(|u| tables.has_recommendation(&u.text))
        .take(config.max_items_per_section)
        .map(|u| Recommendation {
            owner: owner_for(session, &u.speaker_id, &u.text, tables),
            sequence_number: u.sequence_number,
            speaker_id: u.speaker_id.clone(),
            text: recommendation_sentence(&u.text, tables, config.excerpt_max_chars),
        })
        .collect();

    let executive_summary = recommendations
        .iter()
        .take(config.executive_summary_lines)
        .map(|r| r.text.clone())
        .collect();

    let in_phases = |phases: &[DiscussionPhase]| -> Vec<Excerpt> {
        usable
            .iter()
            .filter(|u| phases.contains(&u.phase))
            .take(config.max_items_per_section)
            .map(|&u| quote(u))
            .collect()
    };
    let situation_analysis = in_phases(&[DiscussionPhase::Discovery, DiscussionPhase::Analysis]);
    let next_steps = in_phases(&[DiscussionPhase::Recommendation, DiscussionPhase::Synthesis]);

    let contentious: Vec<&Utterance> = usable
        .iter()
        .copied()
        .filter(|u| u.lowered_respect)
        .take(config.max_items_per_section)
        .collect();
    let risks = contentious.iter().map(|&u| quote(u)).collect();
    let conflicts = contentious
        .iter()
        .map(|u| ConflictNote {
            sequence_number: u.sequence_number,
            speaker_id: u.speaker_id.clone(),
            counterparts: u.triggered_reactions.iter().cloned().collect(),
            interruption: u.is_interruption(),
            text: excerpt(&u.text, config.excerpt_max_chars),
        })
        .collect();

    SynthesisDocument {
        title: format!("Strategic Brief: {}", truncate(session.topic.as_str(), 80)),
        topic: session.topic.as_str().to_string(),
        executive_summary,
        situation_analysis,
        recommendations,
        risks,
        conflicts,
        next_steps,
        data_points: data_points(&usable, config),
        themes: themes(&usable, tables),
        timeline: timeline(transcript),
        relationship_insights: session.relationships().insights(config.insight_limit),
        total_utterances: transcript.len(),
        degraded_utterances: transcript.len() - usable.len(),
    }
}

fn owner_for(
    session: &ConversationSession,
    speaker: &PersonaId,
    text: &str,
    tables: &KeywordTables,
) -> String {
    session
        .participants()
        .get(speaker)
        .and_then(|p| tables.best_tag(p.domain_tags(), text))
        .map_or_else(|| GENERAL_OWNER.to_string(), |(tag, _)| tag.to_string())
}

/// The first sentence carrying a recommendation phrase, else the first sentence
fn recommendation_sentence(text: &str, tables: &KeywordTables, max_len: usize) -> String {
    sentences(text)
        .into_iter()
        .find(|s| contains_any(s, &tables.recommendation))
        .map_or_else(|| excerpt(text, max_len), |s| truncate(s, max_len))
}

fn data_points(usable: &[&Utterance], config: &SynthesisConfig) -> Vec<DataPoint> {
    let Some(pattern) = FIGURES.as_ref() else {
        return Vec::new();
    };
    usable
        .iter()
        .flat_map(|u| {
            sentences(&u.text)
                .into_iter()
                .filter_map(|sentence| {
                    let figures: Vec<String> = pattern
                        .find_iter(sentence)
                        .map(|m| m.as_str().trim().to_string())
                        .collect();
                    (!figures.is_empty()).then(|| DataPoint {
                        sequence_number: u.sequence_number,
                        speaker_id: u.speaker_id.clone(),
                        sentence: truncate(sentence, config.excerpt_max_chars),
                        figures,
                    })
                })
                .collect::<Vec<_>>()
        })
        .take(config.max_data_points)
        .collect()
}

fn themes(usable: &[&Utterance], tables: &KeywordTables) -> Vec<String> {
    let mut scored: Vec<(&String, usize)> = tables
        .domain_routing
        .keys()
        .map(|tag| {
            let hits = usable.iter().map(|u| tables.domain_hits(tag, &u.text)).sum();
            (tag, hits)
        })
        .filter(|(_, hits)| *hits > 0)
        .collect();
    // Stable sort keeps alphabetical order among equal counts
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(tag, _)| tag.clone()).collect()
}

fn timeline(transcript: &[Utterance]) -> Vec<PhaseTimeline> {
    DiscussionPhase::ALL
        .into_iter()
        .map(|phase| {
            let lines: Vec<&Utterance> = transcript.iter().filter(|u| u.phase == phase).collect();
            let mut speakers: Vec<PersonaId> = Vec::new();
            for u in &lines {
                if !speakers.contains(&u.speaker_id) {
                    speakers.push(u.speaker_id.clone());
                }
            }
            PhaseTimeline {
                phase,
                utterance_count: lines.len(),
                first_sequence: lines.first().map(|u| u.sequence_number),
                last_sequence: lines.last().map(|u| u.sequence_number),
                speakers,
                interruptions: lines.iter().filter(|u| u.is_interruption()).count(),
            }
        })
        .collect()
}
