//! Console output formatter for panel sessions

use colored::Colorize;
use panel_domain::synthesis::{Excerpt, PhaseTimeline};
use panel_domain::{
    ConversationSession, DiscussionPhase, OutputFormat, PersonaId, PersonaRegistry,
    RelationshipInsights, SessionStatus, SynthesisDocument, Utterance,
};

/// Formats panel sessions for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render a finished session in the requested format
    pub fn render(session: &ConversationSession, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(session),
            OutputFormat::Synthesis => Self::format_synthesis_only(session),
            OutputFormat::Json => Self::format_json(session),
        }
    }

    /// Transcript, relationships and synthesis
    pub fn format(session: &ConversationSession) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Persona Panel"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Topic:".cyan().bold(), session.topic));
        output.push_str(&format!(
            "{} {}\n",
            "Panel:".cyan().bold(),
            session
                .participants()
                .iter()
                .map(|p| p.display_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        output.push_str(&format!("{} {}\n", "Status:".cyan().bold(), Self::status(session.status())));

        output.push_str(&Self::format_transcript(session));

        if let Some(document) = session.synthesis() {
            output.push_str(&Self::format_document(document, session.participants()));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Transcript grouped by phase
    pub fn format_transcript(session: &ConversationSession) -> String {
        let mut output = String::new();
        let panel = session.participants();
        let mut phase: Option<DiscussionPhase> = None;

        for utterance in session.transcript().iter() {
            if phase != Some(utterance.phase) {
                phase = Some(utterance.phase);
                output.push_str(&Self::section_header(utterance.phase.display_name()));
            }
            output.push_str(&Self::format_utterance(utterance, panel));
        }

        if session.transcript().is_empty() {
            output.push_str(&format!("\n{}\n", "(no utterances)".dimmed()));
        }
        output
    }

    /// One transcript line
    pub fn format_utterance(utterance: &Utterance, panel: &PersonaRegistry) -> String {
        let speaker = Self::name(&utterance.speaker_id, panel);
        let mut label = format!("[{}] {}", utterance.sequence_number, speaker)
            .yellow()
            .bold()
            .to_string();
        if let Some(interrupted) = &utterance.interrupted_speaker_id {
            label.push_str(&format!(
                " {}",
                format!("(interrupts {})", Self::name(interrupted, panel)).red()
            ));
        }
        let text = if utterance.degraded {
            utterance.text.dimmed().italic().to_string()
        } else {
            utterance.text.clone()
        };
        format!("\n{}\n{}\n", label, text)
    }

    /// Only the synthesis document (concise output)
    pub fn format_synthesis_only(session: &ConversationSession) -> String {
        match session.synthesis() {
            Some(document) => Self::format_document(document, session.participants()),
            None => format!(
                "{} Session {} before synthesis ({} utterances).\n",
                "!".yellow().bold(),
                Self::status(session.status()),
                session.transcript().len()
            ),
        }
    }

    /// Session snapshot as pretty JSON
    pub fn format_json(session: &ConversationSession) -> String {
        serde_json::to_string_pretty(session).unwrap_or_else(|_| "{}".to_string())
    }

    /// The synthesis document
    pub fn format_document(document: &SynthesisDocument, panel: &PersonaRegistry) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", format!("=== {} ===", document.title).cyan().bold()));

        if !document.executive_summary.is_empty() {
            output.push_str(&format!("\n{}\n", "Executive Summary".bold()));
            for line in &document.executive_summary {
                output.push_str(&format!("  {}\n", line));
            }
        }

        Self::excerpts(&mut output, "Situation Analysis", &document.situation_analysis, panel);

        if !document.recommendations.is_empty() {
            output.push_str(&format!("\n{}\n", "Recommendations".green().bold()));
            for (owner, recs) in document.recommendations_by_owner() {
                output.push_str(&format!("  {}\n", owner.to_uppercase().bold()));
                for rec in recs {
                    output.push_str(&format!(
                        "    * {} ({})\n",
                        rec.text,
                        Self::name(&rec.speaker_id, panel)
                    ));
                }
            }
        }

        Self::excerpts(&mut output, "Risks", &document.risks, panel);

        if !document.conflicts.is_empty() {
            output.push_str(&format!("\n{}\n", "Points of Conflict".yellow().bold()));
            for note in &document.conflicts {
                let with = note
                    .counterparts
                    .iter()
                    .map(|id| Self::name(id, panel))
                    .collect::<Vec<_>>()
                    .join(", ");
                let kind = if note.interruption { "interrupted" } else { "challenged" };
                output.push_str(&format!(
                    "  * {} {} {}: {}\n",
                    Self::name(&note.speaker_id, panel),
                    kind,
                    with,
                    note.text
                ));
            }
        }

        Self::excerpts(&mut output, "Next Steps", &document.next_steps, panel);

        if !document.data_points.is_empty() {
            output.push_str(&format!("\n{}\n", "Data Points".bold()));
            for point in &document.data_points {
                output.push_str(&format!(
                    "  * {} [{}]\n",
                    point.sentence,
                    point.figures.join(", ").cyan()
                ));
            }
        }

        if !document.themes.is_empty() {
            output.push_str(&format!("\n{} {}\n", "Themes:".bold(), document.themes.join(", ")));
        }

        if !document.relationship_insights.is_empty() {
            output.push_str(&Self::format_insights(&document.relationship_insights, panel));
        }

        if !document.timeline.is_empty() {
            output.push_str(&format!("\n{}\n", "Timeline".bold()));
            for entry in &document.timeline {
                output.push_str(&Self::timeline_line(entry, panel));
            }
        }

        output.push_str(&format!(
            "\n{} utterances",
            document.total_utterances
        ));
        if document.degraded_utterances > 0 {
            output.push_str(&format!(
                ", {}",
                format!("{} degraded", document.degraded_utterances).yellow()
            ));
        }
        output.push('\n');
        output
    }

    pub fn format_insights(insights: &RelationshipInsights, panel: &PersonaRegistry) -> String {
        let mut output = format!("\n{}\n", "Relationship Dynamics".bold());
        let sections = [
            ("Strongest alliances", &insights.strongest_alliances, "agreements"),
            ("Biggest conflicts", &insights.biggest_conflicts, "disagreements"),
            ("Respect", &insights.respect_dynamics, "respect"),
        ];
        for (label, pairs, unit) in sections {
            if pairs.is_empty() {
                continue;
            }
            output.push_str(&format!("  {}\n", label));
            for pair in pairs {
                let value = if unit == "respect" {
                    format!("{:+}", pair.value)
                } else {
                    pair.value.to_string()
                };
                output.push_str(&format!(
                    "    {} & {}: {} {}\n",
                    Self::name(&pair.a, panel),
                    Self::name(&pair.b, panel),
                    value,
                    unit
                ));
            }
        }
        output
    }

    /// Roster listing for --list-personas
    pub fn format_personas(panel: &PersonaRegistry) -> String {
        let mut output = format!("{}\n", "Personas:".cyan().bold());
        for persona in panel.iter() {
            let t = &persona.traits;
            output.push_str(&format!(
                "  {:<10} {} - {} [{}]\n    assertiveness {:.1}, contrarianism {:.1}, creativity {:.1}, patience {:.1}\n",
                persona.id.as_str().bold(),
                persona.display_name,
                if persona.role.is_empty() { "-" } else { persona.role.as_str() },
                persona.domain_tags().join(", "),
                t.assertiveness,
                t.contrarianism,
                t.creativity,
                t.patience
            ));
        }
        output
    }

    fn excerpts(output: &mut String, title: &str, items: &[Excerpt], panel: &PersonaRegistry) {
        if items.is_empty() {
            return;
        }
        output.push_str(&format!("\n{}\n", title.bold()));
        for item in items {
            output.push_str(&format!(
                "  * {} ({})\n",
                item.text,
                Self::name(&item.speaker_id, panel)
            ));
        }
    }

    fn timeline_line(entry: &PhaseTimeline, panel: &PersonaRegistry) -> String {
        let range = match (entry.first_sequence, entry.last_sequence) {
            (Some(first), Some(last)) => format!("#{}-#{}", first, last),
            _ => "-".to_string(),
        };
        let speakers = entry
            .speakers
            .iter()
            .map(|id| Self::name(id, panel))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "  {:<28} {:>3} utterances {:<10} {} interruptions  {}\n",
            entry.phase.display_name(),
            entry.utterance_count,
            range,
            entry.interruptions,
            speakers
        )
    }

    fn name(id: &PersonaId, panel: &PersonaRegistry) -> String {
        panel
            .get(id)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn status(status: &SessionStatus) -> String {
        match status {
            SessionStatus::Completed => status.to_string().green().to_string(),
            SessionStatus::Running => status.to_string().cyan().to_string(),
            SessionStatus::Cancelled => status.to_string().yellow().to_string(),
            SessionStatus::Failed { .. } => status.to_string().red().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.cyan().bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("--- {} ---", title).cyan().bold())
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
