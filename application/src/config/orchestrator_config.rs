//! Orchestrator configuration container.
//!
//! [`OrchestratorConfig`] groups the domain rules (keyword tables, scheduler
//! constants, selector bias, phase limits, synthesis limits) with the
//! application's [`PipelineParams`]. It is loaded once and shared read-only
//! by every session through an `Arc`.

use crate::config::PipelineParams;
use panel_domain::{
    ContextWindow, KeywordTables, PhasePolicy, SchedulerConfig, SelectorConfig, SpeakerSelector,
    SynthesisConfig, TurnScheduler,
};

#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub keywords: KeywordTables,
    pub scheduler: SchedulerConfig,
    pub selector: SelectorConfig,
    pub phases: PhasePolicy,
    pub synthesis: SynthesisConfig,
    pub pipeline: PipelineParams,
}

impl OrchestratorConfig {
    // ==================== Builder Methods ====================

    pub fn with_keywords(mut self, keywords: KeywordTables) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_selector(mut self, selector: SelectorConfig) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_phases(mut self, phases: PhasePolicy) -> Self {
        self.phases = phases;
        self
    }

    pub fn with_synthesis(mut self, synthesis: SynthesisConfig) -> Self {
        self.synthesis = synthesis;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineParams) -> Self {
        self.pipeline = pipeline;
        self
    }

    // ==================== Factories ====================

    pub fn turn_scheduler(&self) -> TurnScheduler {
        TurnScheduler::new(self.scheduler)
    }

    pub fn speaker_selector(&self) -> SpeakerSelector {
        SpeakerSelector::new(self.selector)
    }

    /// Context window for the first generation attempt
    pub fn context_window(&self) -> ContextWindow {
        ContextWindow::new(self.pipeline.context_window)
            .with_max_chars(self.pipeline.max_context_chars)
            .with_weights(self.pipeline.relevance)
    }

    /// Smaller context window for the retry
    pub fn simplified_context_window(&self) -> ContextWindow {
        ContextWindow::new(self.pipeline.simplified_context_window)
            .with_max_chars(self.pipeline.max_context_chars)
            .with_weights(self.pipeline.relevance)
    }
}
