//! Configuration file loading for persona-panel
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./panel.toml` or `./.panel.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/persona-panel/config.toml`
//!    (falls back to `~/.config/persona-panel/config.toml`)
//! 4. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileGeneratorConfig, FileOutputConfig, FileOutputFormat,
    FilePanelConfig, FilePersonaConfig, FilePhaseLimit, FilePhasesConfig, FilePipelineConfig,
    GeneratorKind,
};
pub use loader::{ConfigLoader, ConfigSource};
