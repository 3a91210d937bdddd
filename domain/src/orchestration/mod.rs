//! Turn orchestration
//!
//! Scheduling, speaker selection and phase transitions. Everything here is a
//! pure function of the session plus a caller-supplied RNG.

mod phase_policy;
mod scheduler;
mod selector;

pub use phase_policy::{AdvanceReason, PhaseDecision, PhaseLimits, PhasePolicy};
pub use scheduler::{SchedulerConfig, TurnScheduler};
pub use selector::{SelectionError, SelectionRule, SelectorConfig, SpeakerChoice, SpeakerSelector};
