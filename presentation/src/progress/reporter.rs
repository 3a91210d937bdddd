//! Progress reporting while a panel session runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use panel_application::{EventSink, PanelEvent, SinkError};
use panel_domain::{DiscussionPhase, PhasePolicy, SessionStatus};
use std::sync::Mutex;

/// Reports progress with one bar per discussion phase
pub struct ProgressReporter {
    multi: MultiProgress,
    policy: PhasePolicy,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new(policy: PhasePolicy) -> Self {
        Self {
            multi: MultiProgress::new(),
            policy,
            phase_bar: Mutex::new(None),
        }
    }

    /// Reporter that tracks positions without drawing anything
    pub fn hidden(policy: PhasePolicy) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            policy,
            phase_bar: Mutex::new(None),
        }
    }

    /// Position of the active bar, if any
    pub fn position(&self) -> Option<u64> {
        self.phase_bar
            .lock()
            .ok()
            .and_then(|bar| bar.as_ref().map(|pb| pb.position()))
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn phase_label(phase: DiscussionPhase) -> String {
        let index = DiscussionPhase::ALL
            .iter()
            .position(|p| *p == phase)
            .unwrap_or(0);
        format!("Phase {}: {}", index + 1, phase.display_name())
    }

    fn start_phase(&self, phase: DiscussionPhase) {
        let pb = match self.policy.limits(phase) {
            Some(limits) => {
                let pb = self.multi.add(ProgressBar::new(limits.max_utterances as u64));
                pb.set_style(Self::phase_style());
                pb
            }
            None => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb
            }
        };
        pb.set_prefix(Self::phase_label(phase));
        pb.set_message(phase.goal());

        if let Ok(mut slot) = self.phase_bar.lock() {
            if let Some(previous) = slot.replace(pb) {
                previous.finish_with_message(format!("{}", "done".green()));
            }
        }
    }

    fn finish(&self, message: String) {
        if let Ok(mut slot) = self.phase_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(message);
        }
    }
}

impl EventSink for ProgressReporter {
    fn emit(&self, event: &PanelEvent) -> Result<(), SinkError> {
        match event {
            PanelEvent::PhaseChanged(e) => self.start_phase(e.phase),
            PanelEvent::Utterance(e) => {
                if let Ok(slot) = self.phase_bar.lock()
                    && let Some(pb) = slot.as_ref()
                {
                    let speaker = if e.degraded {
                        format!("{} {}", "~".yellow(), e.speaker_name)
                    } else if e.is_interruption {
                        format!("{} {}", "!".red(), e.speaker_name)
                    } else {
                        format!("{} {}", "v".green(), e.speaker_name)
                    };
                    pb.set_message(speaker);
                    pb.inc(1);
                }
            }
            PanelEvent::Synthesis(_) => self.finish(format!("{}", "brief ready".green())),
            PanelEvent::Terminated(e) => match &e.status {
                SessionStatus::Completed => self.finish(format!("{}", "done".green())),
                status => self.finish(format!("{}", status.to_string().yellow())),
            },
        }
        Ok(())
    }
}

/// Simple text-based progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl EventSink for SimpleProgress {
    fn emit(&self, event: &PanelEvent) -> Result<(), SinkError> {
        match event {
            PanelEvent::PhaseChanged(e) => {
                eprintln!("{} {} ({})", "->".cyan(), e.display_name.bold(), e.goal);
            }
            PanelEvent::Utterance(e) => {
                let marker = if e.degraded { "~".yellow() } else { "v".green() };
                eprintln!("  {} #{} {}", marker, e.sequence_number, e.speaker_name);
            }
            PanelEvent::Synthesis(_) => eprintln!(),
            PanelEvent::Terminated(e) => {
                if !matches!(e.status, SessionStatus::Completed) {
                    eprintln!("{} session {}", "!".yellow(), e.status);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use panel_application::{PhaseChangedEvent, TerminatedEvent, UtteranceEvent};
    use panel_domain::{PersonaId, SessionId};

    fn phase_event(phase: DiscussionPhase) -> PanelEvent {
        PanelEvent::PhaseChanged(PhaseChangedEvent {
            session_id: SessionId::new("s"),
            from: None,
            phase,
            display_name: phase.display_name().to_string(),
            goal: phase.goal().to_string(),
            reason: None,
            timestamp_offset_ms: 0,
            timestamp: Utc::now(),
        })
    }

    fn utterance_event(seq: u64) -> PanelEvent {
        PanelEvent::Utterance(UtteranceEvent {
            session_id: SessionId::new("s"),
            sequence_number: seq,
            speaker_id: PersonaId::new("sarah"),
            speaker_name: "Sarah".to_string(),
            text: "Brand first.".to_string(),
            phase: DiscussionPhase::Discovery,
            is_interruption: false,
            interrupted_id: None,
            thinking_time_ms: 100,
            timestamp_offset_ms: 100 * seq,
            triggered_reactions: vec![],
            degraded: false,
            timestamp: Utc::now(),
        })
    }

    #[test]
    fn test_bar_tracks_utterances_per_phase() {
        let reporter = ProgressReporter::hidden(PhasePolicy::default());
        assert_eq!(reporter.position(), None);

        reporter.emit(&phase_event(DiscussionPhase::Discovery)).unwrap();
        reporter.emit(&utterance_event(1)).unwrap();
        reporter.emit(&utterance_event(2)).unwrap();
        assert_eq!(reporter.position(), Some(2));

        reporter.emit(&phase_event(DiscussionPhase::Analysis)).unwrap();
        assert_eq!(reporter.position(), Some(0));
    }

    #[test]
    fn test_termination_clears_bar() {
        let reporter = ProgressReporter::hidden(PhasePolicy::default());
        reporter.emit(&phase_event(DiscussionPhase::Discovery)).unwrap();
        reporter
            .emit(&PanelEvent::Terminated(TerminatedEvent {
                session_id: SessionId::new("s"),
                status: SessionStatus::Cancelled,
                utterance_count: 0,
                timestamp: Utc::now(),
            }))
            .unwrap();
        assert_eq!(reporter.position(), None);
    }

    #[test]
    fn test_phase_labels_are_numbered() {
        assert_eq!(
            ProgressReporter::phase_label(DiscussionPhase::Analysis),
            "Phase 2: Analysis & Insights"
        );
        assert_eq!(
            ProgressReporter::phase_label(DiscussionPhase::Synthesis),
            "Phase 4: Final Synthesis"
        );
    }
}
