//! Panel session manager
//!
//! Starts each panel session on its own tokio task and tracks it by id.
//! Sessions share only the persona registry and configuration; state,
//! relationships and cancellation are per session.

use crate::config::OrchestratorConfig;
use crate::ports::content_filter::{ContentFilter, PassthroughFilter};
use crate::ports::event_sink::{EventSink, NoEventSink};
use crate::ports::utterance_generator::UtteranceGenerator;
use crate::use_cases::run_panel::{RunPanelUseCase, SessionOutcome};
use panel_domain::{
    ConversationSession, DiscussionPhase, DomainError, PersonaId, PersonaRegistry, SessionId,
    SessionStatus, Topic,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SessionManagerError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Session task failed: {0}")]
    TaskFailed(String),

    #[error("Session is still running: {0}")]
    StillRunning(SessionId),
}

/// Lightweight view of a tracked session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub topic: String,
    pub status: SessionStatus,
    pub phase: DiscussionPhase,
    pub utterance_count: usize,
    pub participants: Vec<PersonaId>,
}

impl SessionSummary {
    fn from_session(session: &ConversationSession) -> Self {
        Self {
            id: session.id.clone(),
            topic: session.topic.as_str().to_string(),
            status: session.status().clone(),
            phase: session.current_phase(),
            utterance_count: session.transcript().len(),
            participants: session.participants().ids(),
        }
    }
}

struct SessionHandle {
    state: Arc<Mutex<ConversationSession>>,
    token: CancellationToken,
    task: Mutex<Option<JoinHandle<SessionOutcome>>>,
}

/// Owns the running panel sessions of one process
pub struct PanelSessionManager {
    registry: Arc<PersonaRegistry>,
    config: Arc<OrchestratorConfig>,
    generator: Arc<dyn UtteranceGenerator>,
    sink: Arc<dyn EventSink>,
    filter: Arc<dyn ContentFilter>,
    sessions: RwLock<HashMap<SessionId, Arc<SessionHandle>>>,
}

impl PanelSessionManager {
    pub fn new(
        registry: Arc<PersonaRegistry>,
        config: Arc<OrchestratorConfig>,
        generator: Arc<dyn UtteranceGenerator>,
    ) -> Self {
        Self {
            registry,
            config,
            generator,
            sink: Arc::new(NoEventSink),
            filter: Arc::new(PassthroughFilter),
            sessions: RwLock::new(HashMap::new()),
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

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Start a session on `topic` and return its id immediately.
    ///
    /// An empty `panel` seats every persona in the registry.
    pub async fn start_session(
        &self,
        topic: &str,
        panel: &[PersonaId],
    ) -> Result<SessionId, SessionManagerError> {
        let topic = Topic::parse(topic)?;
        let participants = if panel.is_empty() {
            (*self.registry).clone()
        } else {
            self.registry.subset(panel)?
        };

        let id = SessionId::new(Uuid::new_v4().to_string());
        let session = ConversationSession::new(id.clone(), topic, participants)?;
        let state = Arc::new(Mutex::new(session));
        let token = CancellationToken::new();

        let use_case = RunPanelUseCase::new(self.generator.clone(), self.config.clone())
            .with_event_sink(self.sink.clone())
            .with_content_filter(self.filter.clone())
            .with_cancellation(token.clone());
        let task_state = state.clone();
        let task = tokio::spawn(async move { use_case.drive(&task_state).await });

        let handle = Arc::new(SessionHandle {
            state,
            token,
            task: Mutex::new(Some(task)),
        });
        self.sessions.write().await.insert(id.clone(), handle);

        info!(session = %id, panel = panel.len(), "Session started");
        Ok(id)
    }

    /// Request cooperative cancellation.
    ///
    /// The session stops at its next suspension point and keeps its partial
    /// transcript. Ending a finished session has no effect.
    pub async fn end_session(&self, id: &SessionId) -> Result<(), SessionManagerError> {
        let handle = self.handle(id).await?;
        handle.token.cancel();
        info!(session = %id, "Session end requested");
        Ok(())
    }

    /// Snapshot of the session as it is right now
    pub async fn get_session(
        &self,
        id: &SessionId,
    ) -> Result<ConversationSession, SessionManagerError> {
        let handle = self.handle(id).await?;
        let snapshot = handle.state.lock().await.clone();
        Ok(snapshot)
    }

    /// Wait for the session task to finish
    pub async fn wait(&self, id: &SessionId) -> Result<SessionOutcome, SessionManagerError> {
        let handle = self.handle(id).await?;
        let task = handle.task.lock().await.take();
        match task {
            Some(task) => match task.await {
                Ok(outcome) => Ok(outcome),
                Err(e) => {
                    warn!(session = %id, error = %e, "Session task ended abnormally");
                    let mut session = handle.state.lock().await;
                    if session.is_running() {
                        session.fail(format!("session task ended abnormally: {}", e));
                    }
                    Err(SessionManagerError::TaskFailed(e.to_string()))
                }
            },
            None => Ok(SessionOutcome::from_session(&*handle.state.lock().await)),
        }
    }

    /// Summaries of all tracked sessions, ordered by id
    pub async fn list_sessions(&self) -> Vec<SessionSummary> {
        let handles: Vec<Arc<SessionHandle>> =
            self.sessions.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            summaries.push(SessionSummary::from_session(&*handle.state.lock().await));
        }
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    /// Stop tracking a finished session and return its final summary.
    ///
    /// Running sessions are left in place; end and wait for them first.
    pub async fn remove_session(
        &self,
        id: &SessionId,
    ) -> Result<SessionSummary, SessionManagerError> {
        let mut sessions = self.sessions.write().await;
        let handle = sessions
            .get(id)
            .cloned()
            .ok_or_else(|| SessionManagerError::NotFound(id.clone()))?;
        let summary = SessionSummary::from_session(&*handle.state.lock().await);
        if !summary.status.is_terminal() {
            return Err(SessionManagerError::StillRunning(id.clone()));
        }
        sessions.remove(id);
        info!(session = %id, "Session removed");
        Ok(summary)
    }

    async fn handle(&self, id: &SessionId) -> Result<Arc<SessionHandle>, SessionManagerError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SessionManagerError::NotFound(id.clone()))
    }
}
