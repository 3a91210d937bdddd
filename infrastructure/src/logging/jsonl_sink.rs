//! JSONL file writer for panel events.
//!
//! Each [`PanelEvent`] is serialized as a single JSON line carrying its `type`
//! tag, session id and timestamp, appended through a buffered writer.

use panel_application::ports::event_sink::{EventSink, PanelEvent, SinkError};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Event sink that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every event and
/// on `Drop`.
pub struct JsonlEventSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventSink {
    /// Create a sink writing to `path`, truncating any existing file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        Self::open(path.as_ref(), false)
    }

    /// Create a sink that appends to `path`.
    pub fn append(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        Self::open(path.as_ref(), true)
    }

    fn open(path: &Path, append: bool) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create event log directory {}: {}",
                parent.display(),
                e
            );
            return Err(SinkError::Io(e.to_string()));
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .map_err(|e| {
                warn!("Could not open event log file {}: {}", path.display(), e);
                SinkError::Io(e.to_string())
            })?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the event log.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlEventSink {
    fn emit(&self, event: &PanelEvent) -> Result<(), SinkError> {
        let line = serde_json::to_string(event).map_err(|e| SinkError::Io(e.to_string()))?;
        let mut writer = self.writer.lock().map_err(|_| SinkError::Closed)?;
        writeln!(writer, "{}", line).map_err(|e| SinkError::Io(e.to_string()))?;
        // JSONL is append-only; flush so a crash keeps every finished line
        writer.flush().map_err(|e| SinkError::Io(e.to_string()))
    }
}

impl Drop for JsonlEventSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use panel_application::ports::event_sink::{TerminatedEvent, UtteranceEvent};
    use panel_domain::{
        DiscussionPhase, PersonaId, SessionId, SessionStatus, UtteranceDraft,
    };
    use std::collections::BTreeSet;

    fn utterance_event() -> PanelEvent {
        let utterance = UtteranceDraft::new(
            PersonaId::new("priya"),
            "CAC is $180 now.",
            DiscussionPhase::Discovery,
            1200,
        )
        .finalize(1, 1200, BTreeSet::new(), false);
        PanelEvent::Utterance(UtteranceEvent::from_utterance(
            &SessionId::new("s-1"),
            &utterance,
            "Priya",
        ))
    }

    fn terminated_event() -> PanelEvent {
        PanelEvent::Terminated(TerminatedEvent {
            session_id: SessionId::new("s-1"),
            status: SessionStatus::Completed,
            utterance_count: 1,
            timestamp: Utc::now(),
        })
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_jsonl_sink_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.events.jsonl");
        let sink = JsonlEventSink::create(&path).unwrap();

        sink.emit(&utterance_event()).unwrap();
        sink.emit(&terminated_event()).unwrap();
        drop(sink);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line["session_id"], "s-1");
            assert!(line.get("timestamp").is_some());
        }

        assert_eq!(lines[0]["type"], "utterance");
        assert_eq!(lines[0]["speaker_id"], "priya");
        assert_eq!(lines[0]["sequence_number"], 1);
        assert_eq!(lines[0]["is_interruption"], false);

        assert_eq!(lines[1]["type"], "terminated");
        assert_eq!(lines[1]["status"], "completed");
    }

    #[test]
    fn test_jsonl_sink_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("nested").join("events.jsonl");
        let sink = JsonlEventSink::create(&path).unwrap();
        assert_eq!(sink.path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn test_jsonl_sink_append_keeps_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        JsonlEventSink::create(&path)
            .unwrap()
            .emit(&utterance_event())
            .unwrap();
        JsonlEventSink::append(&path)
            .unwrap()
            .emit(&terminated_event())
            .unwrap();
        assert_eq!(read_lines(&path).len(), 2);

        // create truncates
        JsonlEventSink::create(&path)
            .unwrap()
            .emit(&terminated_event())
            .unwrap();
        assert_eq!(read_lines(&path).len(), 1);
    }

    #[test]
    fn test_jsonl_sink_rejects_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            JsonlEventSink::create(dir.path()),
            Err(SinkError::Io(_))
        ));
    }
}
