//! Conversation model: phases, utterances, transcript and the session aggregate

mod context_window;
mod phase;
mod session;
mod transcript;
mod utterance;

pub use context_window::{ContextWindow, RelevanceWeights};
pub use phase::DiscussionPhase;
pub use session::{ConversationSession, SessionId, SessionStatus};
pub use transcript::Transcript;
pub use utterance::{Utterance, UtteranceDraft};
