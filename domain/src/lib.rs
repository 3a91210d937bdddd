//! Domain layer for persona-panel
//!
//! This crate contains the core conversation logic: personas, relationships,
//! turn scheduling, speaker selection, phase transitions and synthesis.
//! It has no dependencies on infrastructure or presentation concerns and
//! performs no I/O.
//!
//! # Core Concepts
//!
//! ## Panel
//!
//! A panel is a set of [`Persona`]s discussing one [`Topic`]. Each persona
//! carries personality traits that drive how quickly they speak, how often
//! they interrupt and whom they challenge.
//!
//! ## Session
//!
//! A [`ConversationSession`] moves forward through the [`DiscussionPhase`]s.
//! Every utterance is appended to an immutable transcript and updates the
//! [`RelationshipLedger`]. Entering the synthesis phase produces a
//! [`SynthesisDocument`].

pub mod config;
pub mod conversation;
pub mod core;
pub mod heuristics;
pub mod orchestration;
pub mod persona;
pub mod prompt;
pub mod relationship;
pub mod synthesis;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use conversation::{
    ContextWindow, ConversationSession, DiscussionPhase, RelevanceWeights, SessionId,
    SessionStatus, Transcript, Utterance, UtteranceDraft,
};
pub use core::{error::DomainError, topic::Topic};
pub use heuristics::{KeywordTables, TextSignals};
pub use orchestration::{
    AdvanceReason, PhaseDecision, PhaseLimits, PhasePolicy, SchedulerConfig, SelectionError,
    SelectionRule, SelectorConfig, SpeakerChoice, SpeakerSelector, TurnScheduler,
};
pub use persona::{Persona, PersonaId, PersonaRegistry, PersonalityTraits};
pub use prompt::PromptTemplate;
pub use relationship::{
    RelationshipEdge, RelationshipInsights, RelationshipLedger, RelationshipSummary,
};
pub use synthesis::{SynthesisConfig, SynthesisDocument, synthesize};
