//! Conversation session aggregate

use super::phase::DiscussionPhase;
use super::transcript::Transcript;
use super::utterance::{Utterance, UtteranceDraft};
use crate::core::error::DomainError;
use crate::core::topic::Topic;
use crate::heuristics::KeywordTables;
use crate::persona::{PersonaId, PersonaRegistry};
use crate::relationship::RelationshipLedger;
use crate::synthesis::SynthesisDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque session identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Completed,
    Cancelled,
    Failed { reason: String },
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Failed { reason } => write!(f, "failed: {}", reason),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// One panel discussion: participants, transcript, relationships and phase.
///
/// The session clock is simulated: it advances by each turn's thinking time,
/// independent of how long generation or pacing actually took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: SessionId,
    pub topic: Topic,
    participants: PersonaRegistry,
    current_phase: DiscussionPhase,
    transcript: Transcript,
    spoken_this_phase: BTreeSet<PersonaId>,
    relationships: RelationshipLedger,
    status: SessionStatus,
    clock_ms: u64,
    phase_started_at_ms: u64,
    synthesis: Option<SynthesisDocument>,
}

impl ConversationSession {
    pub fn new(id: SessionId, topic: Topic, participants: PersonaRegistry) -> Result<Self, DomainError> {
        if participants.is_empty() {
            return Err(DomainError::NoPersonas);
        }
        Ok(Self {
            id,
            topic,
            participants,
            current_phase: DiscussionPhase::Discovery,
            transcript: Transcript::new(),
            spoken_this_phase: BTreeSet::new(),
            relationships: RelationshipLedger::new(),
            status: SessionStatus::Running,
            clock_ms: 0,
            phase_started_at_ms: 0,
            synthesis: None,
        })
    }

    /// Start from a pre-populated ledger (fixtures, resumed panels)
    pub fn with_relationships(mut self, relationships: RelationshipLedger) -> Self {
        self.relationships = relationships;
        self
    }

    // ==================== Accessors ====================

    pub fn participants(&self) -> &PersonaRegistry {
        &self.participants
    }

    pub fn current_phase(&self) -> DiscussionPhase {
        self.current_phase
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn spoken_this_phase(&self) -> &BTreeSet<PersonaId> {
        &self.spoken_this_phase
    }

    pub fn has_spoken_this_phase(&self, id: &PersonaId) -> bool {
        self.spoken_this_phase.contains(id)
    }

    pub fn relationships(&self) -> &RelationshipLedger {
        &self.relationships
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn phase_started_at_ms(&self) -> u64 {
        self.phase_started_at_ms
    }

    /// Simulated time spent in the current phase
    pub fn phase_elapsed_ms(&self) -> u64 {
        self.clock_ms.saturating_sub(self.phase_started_at_ms)
    }

    /// Utterances recorded in the current phase
    pub fn phase_utterance_count(&self) -> usize {
        self.transcript.in_phase(self.current_phase).count()
    }

    /// Speaker of the most recent utterance; their turn is still in flight
    /// until someone else takes the floor.
    pub fn floor_holder(&self) -> Option<&PersonaId> {
        self.transcript.last().map(|u| &u.speaker_id)
    }

    pub fn synthesis(&self) -> Option<&SynthesisDocument> {
        self.synthesis.as_ref()
    }

    // ==================== Mutations ====================

    /// Finalize a turn: apply the ledger, advance the clock, append to the
    /// transcript and mark the speaker as having spoken.
    pub fn record(
        &mut self,
        draft: UtteranceDraft,
        tables: &KeywordTables,
    ) -> Result<&Utterance, DomainError> {
        if !self.is_running() {
            return Err(DomainError::SessionNotRunning);
        }
        if self.participants.get(&draft.speaker_id).is_none() {
            return Err(DomainError::UnknownPersona(draft.speaker_id.to_string()));
        }

        let previous = self.floor_holder().cloned();
        let update = self
            .relationships
            .apply(&draft, previous.as_ref(), &self.participants, tables);

        self.clock_ms = self.clock_ms.saturating_add(draft.thinking_time_ms);
        let speaker = draft.speaker_id.clone();
        let utterance = draft.finalize(
            self.transcript.next_sequence(),
            self.clock_ms,
            update.reactions,
            update.lowered_respect,
        );
        self.transcript.append(utterance)?;
        self.spoken_this_phase.insert(speaker);

        self.transcript.last().ok_or(DomainError::SessionNotRunning)
    }

    /// Move to the next phase. Returns the new phase, or `None` if already
    /// terminal.
    pub fn advance_phase(&mut self) -> Option<DiscussionPhase> {
        let next = self.current_phase.next()?;
        self.current_phase = next;
        self.spoken_this_phase.clear();
        self.phase_started_at_ms = self.clock_ms;
        Some(next)
    }

    /// Attach the synthesis document and mark the session completed.
    /// The document is written once; later calls keep the first one.
    pub fn complete(&mut self, document: SynthesisDocument) {
        if self.synthesis.is_none() {
            self.synthesis = Some(document);
        }
        if self.is_running() {
            self.status = SessionStatus::Completed;
        }
    }

    pub fn cancel(&mut self) {
        if self.is_running() {
            self.status = SessionStatus::Cancelled;
        }
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.is_running() {
            self.status = SessionStatus::Failed {
                reason: reason.into(),
            };
        }
    }
}
