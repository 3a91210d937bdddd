//! Run Panel use case
//!
//! Drives one panel session from the first turn to the synthesis document.
//!
//! Each turn: select a speaker, compute thinking time, wait (cancellable),
//! generate text (bounded by a timeout, one simplified retry, then a fallback
//! line), filter, record, emit. The phase policy is consulted before every
//! turn, so a phase ends right after the utterance that completed it.

use crate::config::OrchestratorConfig;
use crate::ports::content_filter::{ContentFilter, FilterVerdict, PassthroughFilter};
use crate::ports::event_sink::{
    EventSink, NoEventSink, PanelEvent, PhaseChangedEvent, SynthesisEvent, TerminatedEvent,
    UtteranceEvent,
};
use crate::ports::utterance_generator::{GenerationError, GenerationRequest, UtteranceGenerator};
use crate::use_cases::shared::{cancellable, cancellable_sleep, check_cancelled};
use chrono::Utc;
use panel_domain::{
    AdvanceReason, ConversationSession, DiscussionPhase, DomainError, Persona, PhaseDecision,
    SelectionError, SessionId, SessionStatus, SpeakerChoice, SpeakerSelector, SynthesisDocument,
    TurnScheduler, Utterance, UtteranceDraft, synthesize,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a panel session early
#[derive(Error, Debug)]
pub enum RunPanelError {
    #[error("Speaker selection failed: {0}")]
    Selection(#[from] SelectionError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RunPanelError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunPanelError::Cancelled)
    }
}

/// Final state of a session once its task has finished
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub utterance_count: usize,
    pub degraded_count: usize,
    pub synthesis: Option<SynthesisDocument>,
}

impl SessionOutcome {
    pub fn from_session(session: &ConversationSession) -> Self {
        Self {
            session_id: session.id.clone(),
            status: session.status().clone(),
            utterance_count: session.transcript().len(),
            degraded_count: session.transcript().iter().filter(|u| u.degraded).count(),
            synthesis: session.synthesis().cloned(),
        }
    }
}

/// A selected turn waiting for its text
struct TurnPlan {
    choice: SpeakerChoice,
    persona: Persona,
    thinking_time_ms: u64,
    request: GenerationRequest,
    simplified_context: Vec<Utterance>,
}

/// Use case for running a panel discussion
#[derive(Clone)]
pub struct RunPanelUseCase {
    generator: Arc<dyn UtteranceGenerator>,
    config: Arc<OrchestratorConfig>,
    sink: Arc<dyn EventSink>,
    filter: Arc<dyn ContentFilter>,
    cancellation_token: Option<CancellationToken>,
}

impl RunPanelUseCase {
    pub fn new(generator: Arc<dyn UtteranceGenerator>, config: Arc<OrchestratorConfig>) -> Self {
        Self {
            generator,
            config,
            sink: Arc::new(NoEventSink),
            filter: Arc::new(PassthroughFilter),
            cancellation_token: None,
        }
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_content_filter(mut self, filter: Arc<dyn ContentFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Run an owned session to completion and return its final state
    pub async fn execute(&self, session: ConversationSession) -> ConversationSession {
        let shared = Arc::new(Mutex::new(session));
        self.drive(&shared).await;
        match Arc::try_unwrap(shared) {
            Ok(mutex) => mutex.into_inner(),
            Err(shared) => shared.lock().await.clone(),
        }
    }

    /// Run a shared session to completion.
    ///
    /// The lock is only held while reading or updating the session, never
    /// across the thinking wait or the generation call, so snapshots can be
    /// taken while the session runs.
    pub async fn drive(&self, shared: &Arc<Mutex<ConversationSession>>) -> SessionOutcome {
        let seed = self.config.pipeline.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let session_id = shared.lock().await.id.clone();
        info!(session = %session_id, seed, "Starting panel session");

        let result = self.run_turns(shared, &mut rng).await;

        let mut session = shared.lock().await;
        match result {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {
                info!(session = %session_id, "Panel session cancelled");
                session.cancel();
            }
            Err(e) => {
                warn!(session = %session_id, error = %e, "Panel session failed");
                session.fail(e.to_string());
            }
        }
        let outcome = SessionOutcome::from_session(&session);
        drop(session);

        info!(
            session = %session_id,
            status = %outcome.status,
            utterances = outcome.utterance_count,
            degraded = outcome.degraded_count,
            "Panel session finished"
        );
        self.emit(PanelEvent::Terminated(TerminatedEvent {
            session_id,
            status: outcome.status.clone(),
            utterance_count: outcome.utterance_count,
            timestamp: Utc::now(),
        }));
        outcome
    }

    async fn run_turns(
        &self,
        shared: &Arc<Mutex<ConversationSession>>,
        rng: &mut StdRng,
    ) -> Result<(), RunPanelError> {
        let scheduler = self.config.turn_scheduler();
        let selector = self.config.speaker_selector();

        let opening = phase_changed(&*shared.lock().await, None, None);
        self.emit(opening);

        loop {
            check_cancelled(&self.cancellation_token)?;

            let plan = {
                let mut session = shared.lock().await;
                if !session.is_running() {
                    return Err(RunPanelError::Cancelled);
                }

                let decision = if session.current_phase().is_terminal() {
                    None
                } else {
                    Some(self.config.phases.evaluate(&session))
                };
                match decision {
                    None => {
                        let events = self.finish(&mut session);
                        drop(session);
                        events.into_iter().for_each(|e| self.emit(e));
                        return Ok(());
                    }
                    Some(PhaseDecision::Advance(reason)) => {
                        let events = self.advance(&mut session, reason);
                        drop(session);
                        events.into_iter().for_each(|e| self.emit(e));
                        continue;
                    }
                    Some(PhaseDecision::Stay) => {}
                }

                self.plan_turn(&session, &scheduler, &selector, rng)?
            };

            let wait = self.config.pipeline.wall_clock_wait(plan.thinking_time_ms);
            cancellable_sleep(&self.cancellation_token, wait).await?;

            let (text, degraded) = self.generate_text(&plan).await?;

            let utterance = {
                let mut session = shared.lock().await;
                if !session.is_running() {
                    return Err(RunPanelError::Cancelled);
                }
                let draft = UtteranceDraft::new(
                    plan.persona.id.clone(),
                    text,
                    plan.request.phase,
                    plan.thinking_time_ms,
                )
                .interrupting(plan.choice.interrupted.clone())
                .degraded(degraded);
                session.record(draft, &self.config.keywords)?.clone()
            };

            debug!(
                session = %plan.request.session_id,
                seq = utterance.sequence_number,
                speaker = %utterance.speaker_id,
                interruption = utterance.is_interruption(),
                reactions = utterance.triggered_reactions.len(),
                degraded,
                "Utterance recorded"
            );
            self.emit(PanelEvent::Utterance(UtteranceEvent::from_utterance(
                &plan.request.session_id,
                &utterance,
                &plan.persona.display_name,
            )));
        }
    }

    fn plan_turn(
        &self,
        session: &ConversationSession,
        scheduler: &TurnScheduler,
        selector: &SpeakerSelector,
        rng: &mut StdRng,
    ) -> Result<TurnPlan, RunPanelError> {
        let tables = &self.config.keywords;
        let choice = selector.select_next(session, tables, scheduler, rng)?;
        let panel = session.participants();
        let persona = panel
            .get(&choice.speaker)
            .cloned()
            .ok_or_else(|| DomainError::UnknownPersona(choice.speaker.to_string()))?;

        let thinking_time_ms = if choice.is_interruption {
            scheduler.interrupt_delay_ms()
        } else {
            scheduler.thinking_time_ms(&persona, rng)
        };

        let history = session.transcript().as_slice();
        let context: Vec<Utterance> = self
            .config
            .context_window()
            .select(history, &persona, panel, tables)
            .into_iter()
            .cloned()
            .collect();
        let simplified_context: Vec<Utterance> = self
            .config
            .simplified_context_window()
            .select(history, &persona, panel, tables)
            .into_iter()
            .cloned()
            .collect();
        let interrupting = choice
            .interrupted
            .as_ref()
            .and_then(|id| panel.get(id))
            .cloned();

        debug!(
            session = %session.id,
            speaker = %persona.id,
            rule = choice.rule.as_str(),
            interruption = choice.is_interruption,
            thinking_ms = thinking_time_ms,
            "Turn planned"
        );

        let request = GenerationRequest {
            session_id: session.id.clone(),
            persona: persona.clone(),
            topic: session.topic.clone(),
            phase: session.current_phase(),
            context,
            relationships: Some(session.relationships().summary_for(&persona.id)),
            interrupting,
            sequence_number: session.transcript().next_sequence(),
            attempt: 1,
        };

        Ok(TurnPlan {
            choice,
            persona,
            thinking_time_ms,
            request,
            simplified_context,
        })
    }

    /// Text for a planned turn plus whether the fallback line was used
    async fn generate_text(&self, plan: &TurnPlan) -> Result<(String, bool), RunPanelError> {
        match self.attempt(&plan.request).await? {
            Ok(text) => return Ok((text, false)),
            Err(e) => warn!(
                session = %plan.request.session_id,
                speaker = %plan.persona.id,
                error = %e,
                "Generation failed, retrying with simplified context"
            ),
        }

        let retry = plan.request.simplified(plan.simplified_context.clone());
        match self.attempt(&retry).await? {
            Ok(text) => Ok((text, false)),
            Err(e) => {
                warn!(
                    session = %plan.request.session_id,
                    speaker = %plan.persona.id,
                    error = %e,
                    "Generation failed twice, using fallback line"
                );
                let line = self
                    .config
                    .pipeline
                    .fallback_line(plan.request.sequence_number);
                Ok((line, true))
            }
        }
    }

    /// One bounded, cancellable generation call.
    ///
    /// The outer error is cancellation; the inner one a generation failure.
    async fn attempt(
        &self,
        request: &GenerationRequest,
    ) -> Result<Result<String, GenerationError>, RunPanelError> {
        let call = tokio::time::timeout(
            self.config.pipeline.generation_timeout,
            self.generator.generate(request),
        );
        let result = match cancellable(&self.cancellation_token, call).await? {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout),
        };
        Ok(result.and_then(|text| self.accept(&request.persona, &text)))
    }

    fn accept(&self, persona: &Persona, text: &str) -> Result<String, GenerationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        match self.filter.filter(persona, text) {
            FilterVerdict::Accept(filtered) if !filtered.trim().is_empty() => {
                Ok(filtered.trim().to_string())
            }
            FilterVerdict::Accept(_) => Err(GenerationError::EmptyResponse),
            FilterVerdict::Reject(reason) => Err(GenerationError::Rejected(reason)),
        }
    }

    fn advance(&self, session: &mut ConversationSession, reason: AdvanceReason) -> Vec<PanelEvent> {
        let from = session.current_phase();
        let Some(to) = session.advance_phase() else {
            return Vec::new();
        };
        info!(
            session = %session.id,
            from = from.as_str(),
            to = to.as_str(),
            reason = reason.as_str(),
            "Phase transition"
        );

        let mut events = vec![phase_changed(session, Some(from), Some(reason))];
        if to.is_terminal() {
            events.extend(self.finish(session));
        }
        events
    }

    /// Write the synthesis document and complete the session
    fn finish(&self, session: &mut ConversationSession) -> Vec<PanelEvent> {
        let document = synthesize(session, &self.config.keywords, &self.config.synthesis);
        info!(
            session = %session.id,
            recommendations = document.recommendations.len(),
            risks = document.risks.len(),
            data_points = document.data_points.len(),
            "Synthesis complete"
        );
        session.complete(document);

        session
            .synthesis()
            .map(|document| {
                PanelEvent::Synthesis(SynthesisEvent {
                    session_id: session.id.clone(),
                    document: document.clone(),
                    timestamp: Utc::now(),
                })
            })
            .into_iter()
            .collect()
    }

    fn emit(&self, event: PanelEvent) {
        if let Err(e) = self.sink.emit(&event) {
            warn!(
                session = %event.session_id(),
                event = event.event_type(),
                error = %e,
                "Event sink rejected event, dropping"
            );
        }
    }
}

fn phase_changed(
    session: &ConversationSession,
    from: Option<DiscussionPhase>,
    reason: Option<AdvanceReason>,
) -> PanelEvent {
    let phase = session.current_phase();
    PanelEvent::PhaseChanged(PhaseChangedEvent {
        session_id: session.id.clone(),
        from,
        phase,
        display_name: phase.display_name().to_string(),
        goal: phase.goal().to_string(),
        reason,
        timestamp_offset_ms: session.clock_ms(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineParams;
    use crate::ports::event_sink::SinkError;
    use async_trait::async_trait;
    use panel_domain::{
        PersonaId, PersonaRegistry, PersonalityTraits, PhaseLimits, PhasePolicy, SchedulerConfig,
        Topic,
    };
    use std::collections::{BTreeSet, VecDeque};
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // ==================== Test Infrastructure ====================

    /// Deterministic generator whose text depends only on the request
    struct EchoGenerator;

    #[async_trait]
    impl UtteranceGenerator for EchoGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            let name = &request.persona.display_name;
            Ok(match request.context.last() {
                None => format!("{} opens the {} phase.", name, request.phase.as_str()),
                Some(last) if request.sequence_number % 3 == 0 => format!(
                    "I disagree with {}, churn is up 12% this quarter.",
                    last.speaker_id
                ),
                Some(last) => format!("Building on {}, we should test this first.", last.speaker_id),
            })
        }
    }

    /// Records every request and replies from a script, then with a default line
    struct ScriptedGenerator {
        replies: StdMutex<VecDeque<Result<String, GenerationError>>>,
        requests: StdMutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                replies: StdMutex::new(replies.into()),
                requests: StdMutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self::new(Vec::new())
        }

        fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UtteranceGenerator for ScriptedGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::Failed("script exhausted".to_string())))
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl UtteranceGenerator for SlowGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("Too late.".to_string())
        }
    }

    /// Cancels the session from inside the n-th generation call
    struct CancelAfter {
        calls: AtomicUsize,
        limit: usize,
        token: CancellationToken,
    }

    #[async_trait]
    impl UtteranceGenerator for CancelAfter {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.limit {
                self.token.cancel();
            }
            Ok(format!("Point number {}.", n))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: StdMutex<Vec<PanelEvent>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<PanelEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: &PanelEvent) -> Result<(), SinkError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl EventSink for FailingSink {
        fn emit(&self, _event: &PanelEvent) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    struct RejectAll;

    impl ContentFilter for RejectAll {
        fn filter(&self, _speaker: &Persona, _text: &str) -> FilterVerdict {
            FilterVerdict::Reject("blocked".to_string())
        }
    }

    struct Redact;

    impl ContentFilter for Redact {
        fn filter(&self, _speaker: &Persona, text: &str) -> FilterVerdict {
            FilterVerdict::Accept(text.replace("guaranteed", "[removed]"))
        }
    }

    fn fast_config() -> OrchestratorConfig {
        OrchestratorConfig::default().with_pipeline(
            PipelineParams::default()
                .with_pacing(0.0)
                .with_seed(Some(42))
                .with_generation_timeout(Duration::from_secs(2)),
        )
    }

    fn one_turn_per_phase() -> OrchestratorConfig {
        fast_config().with_phases(PhasePolicy::uniform(PhaseLimits::capped(1)))
    }

    fn new_session(panel: PersonaRegistry) -> ConversationSession {
        ConversationSession::new(
            SessionId::new("test"),
            Topic::parse("Our CAC doubled in six months").unwrap(),
            panel,
        )
        .unwrap()
    }

    fn abc_panel() -> PersonaRegistry {
        PersonaRegistry::new(vec![
            Persona::new("a", "Ana", PersonalityTraits::new(0.9, 0.5, 0.5, 0.5)),
            Persona::new("b", "Ben", PersonalityTraits::new(0.2, 0.5, 0.5, 0.5)),
            Persona::new("c", "Cy", PersonalityTraits::new(0.5, 0.5, 0.5, 0.5)),
        ])
        .unwrap()
    }

    fn use_case(generator: Arc<dyn UtteranceGenerator>, config: OrchestratorConfig) -> RunPanelUseCase {
        RunPanelUseCase::new(generator, Arc::new(config))
    }

    // ==================== Full runs ====================

    #[tokio::test]
    async fn test_session_completes_with_synthesis() {
        let sink = Arc::new(RecordingSink::default());
        let panel = use_case(Arc::new(EchoGenerator), fast_config()).with_event_sink(sink.clone());

        let session = panel.execute(new_session(PersonaRegistry::builtin())).await;

        assert_eq!(session.status(), &SessionStatus::Completed);
        assert_eq!(session.current_phase(), DiscussionPhase::Synthesis);
        assert!(session.synthesis().is_some());

        let seqs: Vec<u64> = session.transcript().iter().map(|u| u.sequence_number).collect();
        let expected: Vec<u64> = (1..=seqs.len() as u64).collect();
        assert_eq!(seqs, expected);
        assert!(session.transcript().in_phase(DiscussionPhase::Synthesis).next().is_none());

        let events = sink.events();
        assert!(matches!(
            events.first(),
            Some(PanelEvent::PhaseChanged(PhaseChangedEvent { from: None, phase: DiscussionPhase::Discovery, .. }))
        ));
        assert!(matches!(
            events.last(),
            Some(PanelEvent::Terminated(TerminatedEvent { status: SessionStatus::Completed, .. }))
        ));
        let utterance_events = events
            .iter()
            .filter(|e| matches!(e, PanelEvent::Utterance(_)))
            .count();
        assert_eq!(utterance_events, session.transcript().len());
        assert_eq!(
            events.iter().filter(|e| matches!(e, PanelEvent::Synthesis(_))).count(),
            1
        );

        let phases: Vec<DiscussionPhase> = events
            .iter()
            .filter_map(|e| match e {
                PanelEvent::PhaseChanged(p) => Some(p.phase),
                _ => None,
            })
            .collect();
        assert_eq!(phases, DiscussionPhase::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_seeded_runs_are_identical() {
        let run = || async {
            use_case(Arc::new(EchoGenerator), fast_config())
                .execute(new_session(PersonaRegistry::builtin()))
                .await
        };
        let first = run().await;
        let second = run().await;

        assert_eq!(
            serde_json::to_string(first.transcript()).unwrap(),
            serde_json::to_string(second.transcript()).unwrap()
        );
        assert_eq!(first.relationships(), second.relationships());
        assert_eq!(first.synthesis(), second.synthesis());
    }

    #[tokio::test]
    async fn test_respect_stays_bounded_over_long_run() {
        let config = fast_config().with_phases(PhasePolicy::uniform(PhaseLimits::capped(40)));
        let session = use_case(Arc::new(EchoGenerator), config)
            .execute(new_session(PersonaRegistry::builtin()))
            .await;
        for (_, edge) in session.relationships().iter() {
            assert!((-10..=10).contains(&edge.respect));
        }
    }

    // ==================== Phase participation ====================

    #[tokio::test]
    async fn test_all_three_speak_within_cap() {
        let config = fast_config().with_phases(PhasePolicy::uniform(PhaseLimits::capped(4)));
        let session = use_case(Arc::new(EchoGenerator), config).execute(new_session(abc_panel())).await;

        for phase in [
            DiscussionPhase::Discovery,
            DiscussionPhase::Analysis,
            DiscussionPhase::Recommendation,
        ] {
            let lines: Vec<&Utterance> = session.transcript().in_phase(phase).collect();
            let speakers: BTreeSet<&PersonaId> = lines.iter().map(|u| &u.speaker_id).collect();
            assert!(lines.len() <= 4);
            assert_eq!(speakers.len(), 3, "phase {phase:?}");
        }
    }

    #[tokio::test]
    async fn test_cap_forces_advance_before_everyone_speaks() {
        let config = fast_config().with_phases(PhasePolicy::uniform(PhaseLimits::capped(2)));
        let session = use_case(Arc::new(EchoGenerator), config).execute(new_session(abc_panel())).await;

        let discovery: Vec<&Utterance> =
            session.transcript().in_phase(DiscussionPhase::Discovery).collect();
        assert_eq!(discovery.len(), 2);
        let speakers: BTreeSet<&PersonaId> = discovery.iter().map(|u| &u.speaker_id).collect();
        assert_eq!(speakers.len(), 2);
        assert!(!speakers.contains(&PersonaId::new("b")));
        assert_eq!(session.status(), &SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_cap_of_four_advances_with_quiet_persona_silent() {
        // A and C trade the floor four times in Discovery; B never gets in.
        let tables = panel_domain::KeywordTables::default();
        let mut session = new_session(abc_panel());
        let turns = [
            ("a", None, "Spend is up and pipeline is flat."),
            ("c", Some("a"), "Hold on, the pipeline numbers are stale."),
            ("a", Some("c"), "They were refreshed this morning."),
            ("c", Some("a"), "Then the attribution model is the problem."),
        ];
        for (speaker, interrupted, text) in turns {
            let draft = UtteranceDraft::new(
                PersonaId::new(speaker),
                text,
                DiscussionPhase::Discovery,
                300,
            )
            .interrupting(interrupted.map(PersonaId::new));
            session.record(draft, &tables).unwrap();
        }

        let sink = Arc::new(RecordingSink::default());
        let config = fast_config().with_phases(PhasePolicy::uniform(PhaseLimits::capped(4)));
        let session = use_case(Arc::new(EchoGenerator), config)
            .with_event_sink(sink.clone())
            .execute(session)
            .await;

        let discovery: Vec<&Utterance> =
            session.transcript().in_phase(DiscussionPhase::Discovery).collect();
        assert_eq!(discovery.len(), 4);
        let speakers: BTreeSet<&PersonaId> = discovery.iter().map(|u| &u.speaker_id).collect();
        assert!(!speakers.contains(&PersonaId::new("b")));
        assert_eq!(discovery.iter().filter(|u| u.is_interruption()).count(), 3);

        let first_advance = sink.events().into_iter().find_map(|e| match e {
            PanelEvent::PhaseChanged(p) if p.from == Some(DiscussionPhase::Discovery) => p.reason,
            _ => None,
        });
        assert_eq!(first_advance, Some(AdvanceReason::CapReached));
        assert_eq!(session.status(), &SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_every_phase_full_participation_or_cap() {
        for seed in 0..10 {
            let mut config = fast_config().with_phases(PhasePolicy {
                discovery: PhaseLimits::capped(3),
                analysis: PhaseLimits::capped(8),
                recommendation: PhaseLimits::capped(5),
            });
            config.pipeline.seed = Some(seed);
            let session = use_case(Arc::new(EchoGenerator), config.clone())
                .execute(new_session(PersonaRegistry::builtin()))
                .await;

            for phase in [
                DiscussionPhase::Discovery,
                DiscussionPhase::Analysis,
                DiscussionPhase::Recommendation,
            ] {
                let lines: Vec<&Utterance> = session.transcript().in_phase(phase).collect();
                let speakers: BTreeSet<&PersonaId> = lines.iter().map(|u| &u.speaker_id).collect();
                let cap = config.phases.limits(phase).unwrap().max_utterances;
                assert!(lines.len() <= cap);
                assert!(speakers.len() == 6 || lines.len() == cap);
            }
        }
    }

    // ==================== Generation failures ====================

    #[tokio::test]
    async fn test_generation_failure_falls_back() {
        let generator = Arc::new(ScriptedGenerator::failing());
        let config = one_turn_per_phase();
        let fallback = config.pipeline.fallback_line(1);
        let session = use_case(generator.clone(), config)
            .execute(new_session(PersonaRegistry::builtin()))
            .await;

        assert_eq!(session.status(), &SessionStatus::Completed);
        assert_eq!(session.transcript().len(), 3);
        assert!(session.transcript().iter().all(|u| u.degraded));
        assert_eq!(session.transcript().as_slice()[0].text, fallback);

        let requests = generator.requests();
        assert_eq!(requests.len(), 6);
        for pair in requests.chunks(2) {
            assert_eq!(pair[0].attempt, 1);
            assert!(pair[0].relationships.is_some());
            assert_eq!(pair[1].attempt, 2);
            assert!(pair[1].relationships.is_none());
            assert!(pair[1].context.len() <= 3);
        }
        assert_eq!(session.synthesis().unwrap().degraded_utterances, 3);
    }

    #[tokio::test]
    async fn test_empty_text_is_retried() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("   ".to_string()),
            Ok("Recovered line.".to_string()),
            Ok("Second turn.".to_string()),
            Ok("Third turn.".to_string()),
        ]));
        let session = use_case(generator.clone(), one_turn_per_phase())
            .execute(new_session(PersonaRegistry::builtin()))
            .await;

        let texts: Vec<&str> = session.transcript().iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["Recovered line.", "Second turn.", "Third turn."]);
        assert!(session.transcript().iter().all(|u| !u.degraded));
        assert_eq!(generator.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_generation_timeout_counts_as_failure() {
        let mut config = one_turn_per_phase();
        config.pipeline.generation_timeout = Duration::from_millis(20);
        let session = use_case(Arc::new(SlowGenerator), config)
            .execute(new_session(PersonaRegistry::builtin()))
            .await;

        assert_eq!(session.status(), &SessionStatus::Completed);
        assert!(session.transcript().iter().all(|u| u.degraded));
    }

    #[tokio::test]
    async fn test_rejected_text_degrades() {
        let session = use_case(Arc::new(EchoGenerator), one_turn_per_phase())
            .with_content_filter(Arc::new(RejectAll))
            .execute(new_session(PersonaRegistry::builtin()))
            .await;
        assert!(session.transcript().iter().all(|u| u.degraded));
    }

    #[tokio::test]
    async fn test_filter_can_rewrite_text() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(
            "Returns are guaranteed.".to_string(),
        )]));
        let config = fast_config().with_phases(PhasePolicy {
            discovery: PhaseLimits::capped(1),
            analysis: PhaseLimits::capped(0),
            recommendation: PhaseLimits::capped(0),
        });
        let session = use_case(generator, config)
            .with_content_filter(Arc::new(Redact))
            .execute(new_session(PersonaRegistry::builtin()))
            .await;
        assert_eq!(session.transcript().as_slice()[0].text, "Returns are [removed].");
    }

    // ==================== Interruptions ====================

    #[tokio::test]
    async fn test_interruptions_cost_respect() {
        let config = fast_config().with_scheduler(SchedulerConfig {
            interrupt_scale: 10.0,
            interrupt_probability_cap: 1.0,
            interrupt_delay_ms: 250,
            ..Default::default()
        });
        let session = use_case(Arc::new(EchoGenerator), config)
            .execute(new_session(abc_panel()))
            .await;

        let lines = session.transcript().as_slice();
        assert!(!lines[0].is_interruption());
        for pair in lines.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            assert_eq!(cur.interrupted_speaker_id.as_ref(), Some(&prev.speaker_id));
            assert_ne!(cur.speaker_id, prev.speaker_id);
            assert_eq!(cur.thinking_time_ms, 250);
            assert!(cur.lowered_respect);
        }
    }

    // ==================== Cancellation & sinks ====================

    #[tokio::test]
    async fn test_cancellation_keeps_partial_transcript() {
        let token = CancellationToken::new();
        let generator = Arc::new(CancelAfter {
            calls: AtomicUsize::new(0),
            limit: 2,
            token: token.clone(),
        });
        let sink = Arc::new(RecordingSink::default());
        let session = use_case(generator, fast_config())
            .with_event_sink(sink.clone())
            .with_cancellation(token)
            .execute(new_session(PersonaRegistry::builtin()))
            .await;

        assert_eq!(session.status(), &SessionStatus::Cancelled);
        assert_eq!(session.transcript().len(), 2);
        assert!(session.synthesis().is_none());

        let events = sink.events();
        assert!(matches!(
            events.last(),
            Some(PanelEvent::Terminated(TerminatedEvent { status: SessionStatus::Cancelled, .. }))
        ));
        assert!(!events.iter().any(|e| matches!(e, PanelEvent::Synthesis(_))));
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_stop_session() {
        let session = use_case(Arc::new(EchoGenerator), one_turn_per_phase())
            .with_event_sink(Arc::new(FailingSink))
            .execute(new_session(PersonaRegistry::builtin()))
            .await;
        assert_eq!(session.status(), &SessionStatus::Completed);
        assert_eq!(session.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_requests_carry_bounded_context_and_relationships() {
        let generator = Arc::new(ScriptedGenerator::new(
            (0..40).map(|i| Ok(format!("Line {}.", i))).collect(),
        ));
        let mut config = fast_config();
        config.pipeline = config.pipeline.clone().with_context_window(4, 2);
        let session = use_case(generator.clone(), config)
            .execute(new_session(PersonaRegistry::builtin()))
            .await;

        let requests = generator.requests();
        assert_eq!(requests.len(), session.transcript().len());
        for (i, request) in requests.iter().enumerate() {
            assert_eq!(request.attempt, 1);
            assert_eq!(request.sequence_number, i as u64 + 1);
            assert!(request.context.len() <= 4);
            assert!(request.relationships.is_some());
            let seqs: Vec<u64> = request.context.iter().map(|u| u.sequence_number).collect();
            let mut sorted = seqs.clone();
            sorted.sort();
            assert_eq!(seqs, sorted);
        }
    }
}
