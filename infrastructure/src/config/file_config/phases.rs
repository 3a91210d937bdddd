//! Phase limits from TOML (`[phases]` section)

use panel_domain::{ConfigIssue, ConfigIssueCode, PhaseLimits, PhasePolicy};
use serde::{Deserialize, Serialize};

/// Limits of one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePhaseLimit {
    pub max_utterances: usize,
    /// Simulated seconds after which the phase ends
    pub time_budget_secs: Option<u64>,
}

impl Default for FilePhaseLimit {
    fn default() -> Self {
        Self {
            max_utterances: 6,
            time_budget_secs: None,
        }
    }
}

impl FilePhaseLimit {
    fn capped(max_utterances: usize) -> Self {
        Self {
            max_utterances,
            time_budget_secs: None,
        }
    }

    fn to_limits(self) -> PhaseLimits {
        let limits = PhaseLimits::capped(self.max_utterances);
        match self.time_budget_secs {
            Some(secs) => limits.with_time_budget(secs.saturating_mul(1000)),
            None => limits,
        }
    }
}

/// Raw phase configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePhasesConfig {
    pub discovery: FilePhaseLimit,
    pub analysis: FilePhaseLimit,
    pub recommendation: FilePhaseLimit,
}

impl Default for FilePhasesConfig {
    fn default() -> Self {
        let policy = PhasePolicy::default();
        Self {
            discovery: FilePhaseLimit::capped(policy.discovery.max_utterances),
            analysis: FilePhaseLimit::capped(policy.analysis.max_utterances),
            recommendation: FilePhaseLimit::capped(policy.recommendation.max_utterances),
        }
    }
}

impl FilePhasesConfig {
    pub fn to_policy(&self) -> PhasePolicy {
        PhasePolicy {
            discovery: self.discovery.to_limits(),
            analysis: self.analysis.to_limits(),
            recommendation: self.recommendation.to_limits(),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        [
            ("discovery", self.discovery),
            ("analysis", self.analysis),
            ("recommendation", self.recommendation),
        ]
        .into_iter()
        .filter(|(_, limit)| limit.max_utterances == 0 || limit.time_budget_secs == Some(0))
        .map(|(name, _)| {
            ConfigIssue::warning(
                ConfigIssueCode::PhaseSkipped,
                format!("phases.{}: a zero limit skips this phase entirely", name),
            )
        })
        .collect()
    }
}
