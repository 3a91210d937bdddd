//! Pipeline parameters: utterance loop control.
//!
//! [`PipelineParams`] groups the static parameters that control the turn loop
//! in [`RunPanelUseCase`](crate::use_cases::run_panel::RunPanelUseCase).
//! These are application-layer concerns, not domain policy.

use panel_domain::RelevanceWeights;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest accepted pacing factor; larger values are clamped.
pub const MAX_PACING: f64 = 100.0;

/// Utterance pipeline control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Utterances handed to the generator on the first attempt.
    pub context_window: usize,
    /// Utterances handed to the generator on the retry.
    pub simplified_context_window: usize,
    /// Byte budget of the context window text.
    pub max_context_chars: usize,
    pub relevance: RelevanceWeights,
    /// Upper bound on each generation call.
    pub generation_timeout: Duration,
    /// Wall-clock scale applied to thinking time (0 = no waiting, 1 = real time).
    pub pacing: f64,
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Persona-neutral lines used when generation fails twice.
    pub fallback_lines: Vec<String>,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            context_window: 8,
            simplified_context_window: 3,
            max_context_chars: 2800,
            relevance: RelevanceWeights::default(),
            generation_timeout: Duration::from_secs(30),
            pacing: 1.0,
            seed: None,
            fallback_lines: vec![
                "I need a moment to gather my thoughts on this. Please carry on.".to_string(),
                "Let me hold my view for now and hear more from the group.".to_string(),
                "I don't have anything solid to add yet. Let's keep going.".to_string(),
            ],
        }
    }
}

impl PipelineParams {
    // ==================== Builder Methods ====================

    pub fn with_context_window(mut self, full: usize, simplified: usize) -> Self {
        self.context_window = full;
        self.simplified_context_window = simplified;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Clamped to `0.0..=MAX_PACING`; NaN becomes 0.
    pub fn with_pacing(mut self, pacing: f64) -> Self {
        self.pacing = if pacing.is_nan() { 0.0 } else { pacing.clamp(0.0, MAX_PACING) };
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_fallback_lines(mut self, lines: Vec<String>) -> Self {
        self.fallback_lines = lines;
        self
    }

    /// Fallback line for the utterance at `sequence_number`; rotates through
    /// the configured lines so output stays deterministic.
    pub fn fallback_line(&self, sequence_number: u64) -> String {
        if self.fallback_lines.is_empty() {
            return "...".to_string();
        }
        let index = (sequence_number as usize).saturating_sub(1) % self.fallback_lines.len();
        self.fallback_lines[index].clone()
    }

    /// Wall-clock wait for a simulated thinking time.
    pub fn wall_clock_wait(&self, thinking_time_ms: u64) -> Duration {
        if self.pacing <= 0.0 || !self.pacing.is_finite() {
            return Duration::ZERO;
        }
        let pacing = self.pacing.min(MAX_PACING);
        Duration::try_from_secs_f64(thinking_time_ms as f64 / 1000.0 * pacing)
            .unwrap_or(Duration::MAX)
    }
}
