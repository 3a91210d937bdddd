//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`PipelineParams`]: utterance pipeline control (context sizes, timeouts, pacing, seed)
//! - [`OrchestratorConfig`]: everything a panel session needs, domain rules included

pub mod orchestrator_config;
pub mod pipeline_params;

pub use orchestrator_config::OrchestratorConfig;
pub use pipeline_params::{MAX_PACING, PipelineParams};
