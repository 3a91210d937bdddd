//! Event sink port
//!
//! Push-only delivery of panel events to outside observers. Emitting never
//! blocks the session; a failed delivery is logged by the caller and dropped.

use chrono::{DateTime, Utc};
use panel_domain::{
    AdvanceReason, DiscussionPhase, PersonaId, SessionId, SessionStatus, SynthesisDocument,
    Utterance,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SinkError {
    #[error("Event channel is full")]
    Full,

    #[error("Event channel is closed")]
    Closed,

    #[error("Event write failed: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtteranceEvent {
    pub session_id: SessionId,
    pub sequence_number: u64,
    pub speaker_id: PersonaId,
    pub speaker_name: String,
    pub text: String,
    pub phase: DiscussionPhase,
    pub is_interruption: bool,
    pub interrupted_id: Option<PersonaId>,
    pub thinking_time_ms: u64,
    pub timestamp_offset_ms: u64,
    pub triggered_reactions: Vec<PersonaId>,
    pub degraded: bool,
    pub timestamp: DateTime<Utc>,
}

impl UtteranceEvent {
    pub fn from_utterance(
        session_id: &SessionId,
        utterance: &Utterance,
        speaker_name: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.clone(),
            sequence_number: utterance.sequence_number,
            speaker_id: utterance.speaker_id.clone(),
            speaker_name: speaker_name.into(),
            text: utterance.text.clone(),
            phase: utterance.phase,
            is_interruption: utterance.is_interruption(),
            interrupted_id: utterance.interrupted_speaker_id.clone(),
            thinking_time_ms: utterance.thinking_time_ms,
            timestamp_offset_ms: utterance.timestamp_offset_ms,
            triggered_reactions: utterance.triggered_reactions.iter().cloned().collect(),
            degraded: utterance.degraded,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseChangedEvent {
    pub session_id: SessionId,
    /// `None` when the session enters its first phase
    pub from: Option<DiscussionPhase>,
    pub phase: DiscussionPhase,
    pub display_name: String,
    pub goal: String,
    pub reason: Option<AdvanceReason>,
    pub timestamp_offset_ms: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisEvent {
    pub session_id: SessionId,
    pub document: SynthesisDocument,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminatedEvent {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub status: SessionStatus,
    pub utterance_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted by a running panel session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelEvent {
    Utterance(UtteranceEvent),
    PhaseChanged(PhaseChangedEvent),
    Synthesis(SynthesisEvent),
    Terminated(TerminatedEvent),
}

impl PanelEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            PanelEvent::Utterance(e) => &e.session_id,
            PanelEvent::PhaseChanged(e) => &e.session_id,
            PanelEvent::Synthesis(e) => &e.session_id,
            PanelEvent::Terminated(e) => &e.session_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            PanelEvent::Utterance(_) => "utterance",
            PanelEvent::PhaseChanged(_) => "phase_changed",
            PanelEvent::Synthesis(_) => "synthesis",
            PanelEvent::Terminated(_) => "terminated",
        }
    }
}

/// Receiver of panel events.
///
/// `emit` is synchronous and must not block; slow consumers should buffer
/// on their side (see [`ChannelEventSink`]).
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &PanelEvent) -> Result<(), SinkError>;
}

/// No-op sink for when nobody is listening
pub struct NoEventSink;

impl EventSink for NoEventSink {
    fn emit(&self, _event: &PanelEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Forwards events into a bounded channel without waiting for capacity.
pub struct ChannelEventSink {
    sender: mpsc::Sender<PanelEvent>,
}

impl ChannelEventSink {
    pub fn new(sender: mpsc::Sender<PanelEvent>) -> Self {
        Self { sender }
    }

    /// Sink plus the receiving end of a channel holding `capacity` events
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PanelEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: &PanelEvent) -> Result<(), SinkError> {
        self.sender.try_send(event.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Fans each event out to several sinks.
///
/// Every delegate receives the event even if an earlier one fails; the last
/// failure is returned.
pub struct CompositeEventSink {
    delegates: Vec<Arc<dyn EventSink>>,
}

impl CompositeEventSink {
    pub fn new(delegates: Vec<Arc<dyn EventSink>>) -> Self {
        Self { delegates }
    }

    pub fn push(&mut self, sink: Arc<dyn EventSink>) {
        self.delegates.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl EventSink for CompositeEventSink {
    fn emit(&self, event: &PanelEvent) -> Result<(), SinkError> {
        let mut result = Ok(());
        for d in &self.delegates {
            if let Err(e) = d.emit(event) {
                result = Err(e);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_domain::UtteranceDraft;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    struct Recording(Mutex<Vec<&'static str>>);

    impl EventSink for Recording {
        fn emit(&self, event: &PanelEvent) -> Result<(), SinkError> {
            self.0.lock().unwrap().push(event.event_type());
            Ok(())
        }
    }

    struct Failing;

    impl EventSink for Failing {
        fn emit(&self, _event: &PanelEvent) -> Result<(), SinkError> {
            Err(SinkError::Io("disk full".to_string()))
        }
    }

    fn terminated() -> PanelEvent {
        PanelEvent::Terminated(TerminatedEvent {
            session_id: SessionId::new("s"),
            status: SessionStatus::Failed {
                reason: "boom".to_string(),
            },
            utterance_count: 3,
            timestamp: Utc::now(),
        })
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serde_json::to_value(terminated()).unwrap();
        assert_eq!(json["type"], "terminated");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "boom");
        assert_eq!(json["utterance_count"], 3);
    }

    #[test]
    fn test_utterance_event_fields() {
        let utterance = UtteranceDraft::new(
            PersonaId::new("marcus"),
            "Cutting in.",
            DiscussionPhase::Analysis,
            500,
        )
        .interrupting(Some(PersonaId::new("david")))
        .finalize(7, 9000, BTreeSet::from([PersonaId::new("david")]), true);
        let event = UtteranceEvent::from_utterance(&SessionId::new("s"), &utterance, "Marcus");
        assert!(event.is_interruption);
        assert_eq!(event.interrupted_id, Some(PersonaId::new("david")));
        assert_eq!(event.sequence_number, 7);

        let json = serde_json::to_value(PanelEvent::Utterance(event)).unwrap();
        assert_eq!(json["type"], "utterance");
        assert_eq!(json["phase"], "analysis");
        assert_eq!(json["speaker_id"], "marcus");
    }

    #[test]
    fn test_channel_sink_reports_full_and_closed() {
        let (sink, mut rx) = ChannelEventSink::channel(1);
        assert!(sink.emit(&terminated()).is_ok());
        assert_eq!(sink.emit(&terminated()), Err(SinkError::Full));
        assert!(rx.try_recv().is_ok());
        drop(rx);
        assert_eq!(sink.emit(&terminated()), Err(SinkError::Closed));
    }

    #[test]
    fn test_composite_delivers_to_all() {
        let recording = Arc::new(Recording(Mutex::new(Vec::new())));
        let composite = CompositeEventSink::new(vec![
            Arc::new(Failing),
            recording.clone() as Arc<dyn EventSink>,
        ]);
        assert!(composite.emit(&terminated()).is_err());
        assert_eq!(*recording.0.lock().unwrap(), vec!["terminated"]);
    }
}
