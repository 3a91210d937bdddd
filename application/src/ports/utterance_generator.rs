//! Utterance generator port
//!
//! Defines the interface to whatever produces persona text (a language
//! model bridge, scripted lines, a deterministic echo for tests).

use async_trait::async_trait;
use panel_domain::{
    DiscussionPhase, Persona, PromptTemplate, RelationshipSummary, SessionId, Topic, Utterance,
};
use thiserror::Error;

/// Errors that can occur while generating an utterance.
///
/// Every variant is treated as a transient failure by the pipeline: the turn
/// is retried once with a simplified request, then replaced by a fallback line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Generation failed: {0}")]
    Failed(String),

    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    #[error("Generation timed out")]
    Timeout,

    #[error("Generator returned empty text")]
    EmptyResponse,

    #[error("Text rejected by content filter: {0}")]
    Rejected(String),
}

/// Everything a generator needs for one turn
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub session_id: SessionId,
    pub persona: Persona,
    pub topic: Topic,
    pub phase: DiscussionPhase,
    /// Relevance-ranked prior utterances, in transcript order
    pub context: Vec<Utterance>,
    /// `None` on the simplified retry
    pub relationships: Option<RelationshipSummary>,
    /// The persona being cut off, when this turn is an interruption
    pub interrupting: Option<Persona>,
    /// Sequence number the resulting utterance will carry
    pub sequence_number: u64,
    /// 1 for the first attempt, 2 for the simplified retry
    pub attempt: u32,
}

impl GenerationRequest {
    pub fn is_simplified(&self) -> bool {
        self.attempt > 1
    }

    /// Reduced request for the retry: fewer context lines, no relationships
    pub fn simplified(&self, context: Vec<Utterance>) -> Self {
        Self {
            context,
            relationships: None,
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }

    pub fn system_prompt(&self) -> String {
        PromptTemplate::persona_system(&self.persona)
    }

    pub fn user_prompt(&self) -> String {
        let relationships = self
            .relationships
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| s.render());
        PromptTemplate::turn_prompt(
            self.topic.as_str(),
            self.phase,
            &self.context,
            relationships.as_deref(),
            self.interrupting.as_ref().map(|p| p.display_name.as_str()),
        )
    }
}

/// Producer of persona utterance text.
///
/// Implementations (adapters) live in the infrastructure layer. Returning
/// empty or whitespace-only text counts as a failure.
#[async_trait]
pub trait UtteranceGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
