//! Infrastructure layer for persona-panel
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod filters;
pub mod generators;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigSource, ConfigValidationError, FileConfig, FileGeneratorConfig,
    FileOutputConfig, FileOutputFormat, FilePanelConfig, FilePipelineConfig, GeneratorKind,
};
pub use filters::{PhraseRedactionFilter, RedactionRule};
pub use generators::{CommandGenerator, EchoGenerator, PersonaScript, ScriptedGenerator};
pub use logging::JsonlEventSink;
