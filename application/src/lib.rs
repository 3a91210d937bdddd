//! Application layer for persona-panel
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{OrchestratorConfig, PipelineParams};
pub use ports::{
    content_filter::{ContentFilter, FilterVerdict, PassthroughFilter},
    event_sink::{
        ChannelEventSink, CompositeEventSink, EventSink, NoEventSink, PanelEvent,
        PhaseChangedEvent, SinkError, SynthesisEvent, TerminatedEvent, UtteranceEvent,
    },
    utterance_generator::{GenerationError, GenerationRequest, UtteranceGenerator},
};
pub use use_cases::run_panel::{RunPanelError, RunPanelUseCase, SessionOutcome};
pub use use_cases::session_manager::{PanelSessionManager, SessionManagerError, SessionSummary};
