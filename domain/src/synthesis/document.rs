use crate::conversation::DiscussionPhase;
use crate::persona::PersonaId;
use crate::relationship::RelationshipInsights;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A short quotation from the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excerpt {
    pub sequence_number: u64,
    pub speaker_id: PersonaId,
    pub text: String,
}

/// A recommendation attributed to the domain of the persona who made it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Best-matching domain tag of the speaker, or `general`
    pub owner: String,
    pub sequence_number: u64,
    pub speaker_id: PersonaId,
    pub text: String,
}

/// An utterance that cost respect between participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictNote {
    pub sequence_number: u64,
    pub speaker_id: PersonaId,
    pub counterparts: Vec<PersonaId>,
    pub interruption: bool,
    pub text: String,
}

/// A sentence citing money, percentages or ratios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    pub sequence_number: u64,
    pub speaker_id: PersonaId,
    pub sentence: String,
    pub figures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTimeline {
    pub phase: DiscussionPhase,
    pub utterance_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_sequence: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sequence: Option<u64>,
    /// Distinct speakers in order of first contribution
    pub speakers: Vec<PersonaId>,
    pub interruptions: usize,
}

/// Final structured output of a session. Built once, never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisDocument {
    pub title: String,
    pub topic: String,
    pub executive_summary: Vec<String>,
    pub situation_analysis: Vec<Excerpt>,
    pub recommendations: Vec<Recommendation>,
    pub risks: Vec<Excerpt>,
    pub conflicts: Vec<ConflictNote>,
    pub next_steps: Vec<Excerpt>,
    pub data_points: Vec<DataPoint>,
    /// Domain tags discussed, most-mentioned first
    pub themes: Vec<String>,
    pub timeline: Vec<PhaseTimeline>,
    pub relationship_insights: RelationshipInsights,
    pub total_utterances: usize,
    pub degraded_utterances: usize,
}

impl SynthesisDocument {
    /// Recommendations grouped by owner, owners sorted alphabetically
    pub fn recommendations_by_owner(&self) -> BTreeMap<&str, Vec<&Recommendation>> {
        let mut grouped: BTreeMap<&str, Vec<&Recommendation>> = BTreeMap::new();
        for rec in &self.recommendations {
            grouped.entry(rec.owner.as_str()).or_default().push(rec);
        }
        grouped
    }
}
