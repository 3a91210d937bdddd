//! Utterance value object

use super::phase::DiscussionPhase;
use crate::persona::PersonaId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One finalized contribution to the transcript (immutable once created)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Position in the transcript, starting at 1 with no gaps
    pub sequence_number: u64,
    pub speaker_id: PersonaId,
    pub text: String,
    pub phase: DiscussionPhase,
    /// Session clock (cumulative thinking time) when the turn was finalized
    pub timestamp_offset_ms: u64,
    /// Thinking time consumed by this turn
    pub thinking_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupted_speaker_id: Option<PersonaId>,
    /// Personas whose relationship edge with the speaker changed
    #[serde(default)]
    pub triggered_reactions: BTreeSet<PersonaId>,
    /// Fallback text was substituted after repeated generation failures
    #[serde(default)]
    pub degraded: bool,
    /// At least one respect score was decremented by this utterance
    #[serde(default)]
    pub lowered_respect: bool,
}

impl Utterance {
    pub fn is_interruption(&self) -> bool {
        self.interrupted_speaker_id.is_some()
    }
}

/// Fields known before the relationship ledger has been applied.
///
/// Turned into an [`Utterance`] once the ledger reports which edges changed,
/// so the finished utterance never needs to be mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceDraft {
    pub speaker_id: PersonaId,
    pub text: String,
    pub phase: DiscussionPhase,
    pub thinking_time_ms: u64,
    pub interrupted_speaker_id: Option<PersonaId>,
    pub degraded: bool,
}

impl UtteranceDraft {
    pub fn new(
        speaker_id: PersonaId,
        text: impl Into<String>,
        phase: DiscussionPhase,
        thinking_time_ms: u64,
    ) -> Self {
        Self {
            speaker_id,
            text: text.into(),
            phase,
            thinking_time_ms,
            interrupted_speaker_id: None,
            degraded: false,
        }
    }

    pub fn interrupting(mut self, interrupted: Option<PersonaId>) -> Self {
        self.interrupted_speaker_id = interrupted;
        self
    }

    pub fn degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }

    pub fn finalize(
        self,
        sequence_number: u64,
        timestamp_offset_ms: u64,
        triggered_reactions: BTreeSet<PersonaId>,
        lowered_respect: bool,
    ) -> Utterance {
        Utterance {
            sequence_number,
            speaker_id: self.speaker_id,
            text: self.text,
            phase: self.phase,
            timestamp_offset_ms,
            thinking_time_ms: self.thinking_time_ms,
            interrupted_speaker_id: self.interrupted_speaker_id,
            triggered_reactions,
            degraded: self.degraded,
            lowered_respect,
        }
    }
}
