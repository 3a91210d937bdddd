//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate
//! (`[scheduler]`, `[selector]`, `[keywords]` and `[synthesis]` map straight
//! onto their domain counterparts).

mod generator;
mod output;
mod panel;
mod phases;
mod pipeline;

pub use generator::{FileGeneratorConfig, GeneratorKind};
pub use output::{FileOutputConfig, FileOutputFormat};
pub use panel::{FilePanelConfig, FilePersonaConfig};
pub use phases::{FilePhaseLimit, FilePhasesConfig};
pub use pipeline::FilePipelineConfig;

use panel_application::OrchestratorConfig;
use panel_domain::{
    ConfigIssue, ConfigIssueCode, DomainError, KeywordTables, PersonaRegistry, SchedulerConfig,
    SelectorConfig, SynthesisConfig,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),

    #[error(transparent)]
    Panel(#[from] DomainError),

    #[error("generator setup failed: {0}")]
    Generator(String),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Persona roster
    pub panel: FilePanelConfig,
    /// Per-phase caps and time budgets
    pub phases: FilePhasesConfig,
    /// Thinking time and interruption constants
    pub scheduler: SchedulerConfig,
    /// Speaker selection weights
    pub selector: SelectorConfig,
    /// Agreement, disagreement, recommendation and domain routing phrases
    pub keywords: KeywordTables,
    /// Context window, timeout, pacing, seed, fallback and blocked phrases
    pub pipeline: FilePipelineConfig,
    /// Synthesis section limits
    pub synthesis: SynthesisConfig,
    /// Text generator adapter
    pub generator: FileGeneratorConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. The persona roster (ids, traits, members, routed tags)
    /// 2. Phase limits
    /// 3. Scheduler probabilities
    /// 4. Keyword tables
    /// 5. Pipeline limits
    /// 6. Generator settings
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Roster
        issues.extend(self.panel.validate(&self.keywords));

        // 2. Phases
        issues.extend(self.phases.validate());

        // 3. Scheduler
        let cap = self.scheduler.interrupt_probability_cap;
        if !(0.0..=1.0).contains(&cap) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ProbabilityOutOfRange,
                format!("scheduler.interrupt_probability_cap: {} is outside [0, 1]", cap),
            ));
        }
        for (name, value) in [
            ("interrupt_scale", self.scheduler.interrupt_scale),
            ("per_conflict_weight", self.scheduler.per_conflict_weight),
            ("max_conflict_weight", self.scheduler.max_conflict_weight),
            ("selector.alliance_bias", self.selector.alliance_bias),
        ] {
            if !value.is_finite() || value < 0.0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ProbabilityOutOfRange,
                    format!("{}: {} must be a non-negative number", name, value),
                ));
            }
        }

        // 4. Keyword tables
        for (name, table) in [
            ("agreement", &self.keywords.agreement),
            ("disagreement", &self.keywords.disagreement),
            ("recommendation", &self.keywords.recommendation),
        ] {
            if table.iter().all(|p| p.trim().is_empty()) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::EmptyKeywordTable,
                    format!("keywords.{}: no phrases configured", name),
                ));
            }
        }

        // 5. Pipeline
        issues.extend(self.pipeline.validate());

        // 6. Generator
        issues.extend(self.generator.validate());

        issues
    }

    /// Whether any issue makes the configuration unusable
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.is_error())
    }

    /// Orchestrator settings for the application layer
    pub fn to_orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .with_keywords(self.keywords.clone())
            .with_scheduler(self.scheduler)
            .with_selector(self.selector)
            .with_phases(self.phases.to_policy())
            .with_synthesis(self.synthesis)
            .with_pipeline(self.pipeline.to_params())
    }

    pub fn to_registry(&self) -> Result<PersonaRegistry, ConfigValidationError> {
        Ok(self.panel.to_registry()?)
    }

    /// Validate, failing on any error-level issue. Warnings are returned.
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let issues = self.validate();
        if Self::has_errors(&issues) {
            let errors = issues.into_iter().filter(|i| i.is_error()).collect();
            return Err(ConfigValidationError::Invalid(errors));
        }
        Ok(issues)
    }
}
