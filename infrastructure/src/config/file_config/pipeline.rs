//! Utterance pipeline settings from TOML (`[pipeline]` section)

use crate::filters::{PhraseRedactionFilter, RedactionRule};
use panel_application::PipelineParams;
use panel_application::config::MAX_PACING;
use panel_domain::{ConfigIssue, ConfigIssueCode, RelevanceWeights};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePipelineConfig {
    pub context_window: usize,
    pub simplified_context_window: usize,
    pub max_context_chars: usize,
    pub relevance: RelevanceWeights,
    pub generation_timeout_secs: u64,
    /// Wall-clock scale of thinking time (0 = no waiting)
    pub pacing: f64,
    pub seed: Option<u64>,
    /// Replaces the built-in fallback lines when non-empty
    pub fallback_lines: Vec<String>,
    /// Phrases removed from generated text
    pub blocked_phrases: Vec<RedactionRule>,
    /// Reject text containing a blocked phrase instead of rewriting it
    pub reject_blocked: bool,
}

impl Default for FilePipelineConfig {
    fn default() -> Self {
        let params = PipelineParams::default();
        Self {
            context_window: params.context_window,
            simplified_context_window: params.simplified_context_window,
            max_context_chars: params.max_context_chars,
            relevance: params.relevance,
            generation_timeout_secs: params.generation_timeout.as_secs(),
            pacing: params.pacing,
            seed: None,
            fallback_lines: Vec::new(),
            blocked_phrases: Vec::new(),
            reject_blocked: false,
        }
    }
}

impl FilePipelineConfig {
    pub fn to_params(&self) -> PipelineParams {
        let mut params = PipelineParams::default()
            .with_context_window(self.context_window, self.simplified_context_window)
            .with_generation_timeout(Duration::from_secs(self.generation_timeout_secs))
            .with_pacing(self.pacing)
            .with_seed(self.seed);
        params.max_context_chars = self.max_context_chars;
        params.relevance = self.relevance;
        if !self.fallback_lines.is_empty() {
            params = params.with_fallback_lines(self.fallback_lines.clone());
        }
        params
    }

    /// Redaction filter for the blocked phrases, if any are configured
    pub fn content_filter(&self) -> Option<PhraseRedactionFilter> {
        let filter = PhraseRedactionFilter::new(self.blocked_phrases.iter().cloned())
            .rejecting(self.reject_blocked);
        (!filter.is_empty()).then_some(filter)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.generation_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "pipeline.generation_timeout_secs: 0 fails every generation",
            ));
        }
        if self.context_window == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyContextWindow,
                "pipeline.context_window: generators need at least one prior utterance",
            ));
        }
        if self.simplified_context_window > self.context_window {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptyContextWindow,
                format!(
                    "pipeline.simplified_context_window ({}) is larger than context_window ({})",
                    self.simplified_context_window, self.context_window
                ),
            ));
        }
        if self.pacing.is_nan() || self.pacing < 0.0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ProbabilityOutOfRange,
                format!("pipeline.pacing: {} is treated as 0", self.pacing),
            ));
        } else if self.pacing > MAX_PACING {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ProbabilityOutOfRange,
                format!("pipeline.pacing: {} is clamped to {}", self.pacing, MAX_PACING),
            ));
        }

        issues
    }
}
