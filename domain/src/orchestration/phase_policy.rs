//! Phase transition policy

use crate::conversation::{ConversationSession, DiscussionPhase};
use serde::{Deserialize, Serialize};

/// Limits for one discussion phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseLimits {
    /// Utterances after which the phase ends even if someone has not spoken
    pub max_utterances: usize,
    /// Simulated time after which the phase ends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget_ms: Option<u64>,
}

impl PhaseLimits {
    pub fn capped(max_utterances: usize) -> Self {
        Self {
            max_utterances,
            time_budget_ms: None,
        }
    }

    pub fn with_time_budget(mut self, budget_ms: u64) -> Self {
        self.time_budget_ms = Some(budget_ms);
        self
    }
}

/// Why a phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceReason {
    AllSpoke,
    CapReached,
    TimeBudget,
}

impl AdvanceReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvanceReason::AllSpoke => "all_spoke",
            AdvanceReason::CapReached => "cap_reached",
            AdvanceReason::TimeBudget => "time_budget",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseDecision {
    Stay,
    Advance(AdvanceReason),
}

/// Per-phase limits. Synthesis has none; it is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePolicy {
    pub discovery: PhaseLimits,
    pub analysis: PhaseLimits,
    pub recommendation: PhaseLimits,
}

impl Default for PhasePolicy {
    fn default() -> Self {
        Self {
            discovery: PhaseLimits::capped(6),
            analysis: PhaseLimits::capped(6),
            recommendation: PhaseLimits::capped(4),
        }
    }
}

impl PhasePolicy {
    /// The same limits for every discussion phase
    pub fn uniform(limits: PhaseLimits) -> Self {
        Self {
            discovery: limits,
            analysis: limits,
            recommendation: limits,
        }
    }

    pub fn limits(&self, phase: DiscussionPhase) -> Option<&PhaseLimits> {
        match phase {
            DiscussionPhase::Discovery => Some(&self.discovery),
            DiscussionPhase::Analysis => Some(&self.analysis),
            DiscussionPhase::Recommendation => Some(&self.recommendation),
            DiscussionPhase::Synthesis => None,
        }
    }

    /// Whether the current phase is done. Full participation is checked
    /// first, then the utterance cap, then the time budget.
    pub fn evaluate(&self, session: &ConversationSession) -> PhaseDecision {
        let Some(limits) = self.limits(session.current_phase()) else {
            return PhaseDecision::Stay;
        };

        let everyone_spoke = session
            .participants()
            .iter()
            .all(|p| session.has_spoken_this_phase(&p.id));
        if everyone_spoke {
            return PhaseDecision::Advance(AdvanceReason::AllSpoke);
        }

        if session.phase_utterance_count() >= limits.max_utterances {
            return PhaseDecision::Advance(AdvanceReason::CapReached);
        }

        if let Some(budget) = limits.time_budget_ms
            && session.phase_elapsed_ms() >= budget
        {
            return PhaseDecision::Advance(AdvanceReason::TimeBudget);
        }

        PhaseDecision::Stay
    }
}
