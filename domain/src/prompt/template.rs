//! Prompt templates for persona turns

use crate::conversation::{DiscussionPhase, Utterance};
use crate::persona::Persona;

/// Templates for generating prompts for one panel turn
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt establishing the persona
    pub fn persona_system(persona: &Persona) -> String {
        let mut prompt = format!("You are {}", persona.display_name);
        if !persona.role.is_empty() {
            prompt.push_str(&format!(", {}", persona.role));
        }
        prompt.push_str(", taking part in a live strategy discussion with colleagues.\n");

        if !persona.domain_tags().is_empty() {
            prompt.push_str(&format!(
                "Your expertise: {}.\n",
                persona.domain_tags().join(", ")
            ));
        }

        let t = &persona.traits;
        prompt.push_str(&format!(
            "Temperament: {} and {}; {} and {}.\n",
            scale(t.assertiveness, "reserved", "assertive"),
            scale(t.contrarianism, "agreeable", "contrarian"),
            scale(t.creativity, "pragmatic", "inventive"),
            scale(t.patience, "impatient", "patient"),
        ));
        prompt.push_str(
            "Speak in first person, 2-4 sentences, as in a real meeting. \
Refer to colleagues by name when you agree or disagree with them.",
        );
        prompt
    }

    /// User prompt for one turn.
    ///
    /// `relationships` is the rendered relationship summary; pass `None` for
    /// the simplified retry prompt.
    pub fn turn_prompt(
        topic: &str,
        phase: DiscussionPhase,
        context: &[Utterance],
        relationships: Option<&str>,
        interrupting: Option<&str>,
    ) -> String {
        let mut prompt = format!(
            "Topic: {}\nPhase: {} ({})\n",
            topic,
            phase.display_name(),
            phase.goal()
        );

        if context.is_empty() {
            prompt.push_str("\nYou are opening the discussion.\n");
        } else {
            prompt.push_str("\nRecent discussion:\n");
            for u in context {
                prompt.push_str(&format!("[{}] {}: {}\n", u.sequence_number, u.speaker_id, u.text));
            }
        }

        if let Some(summary) = relationships
            && !summary.trim().is_empty()
        {
            prompt.push_str(&format!("\nYour working relationships:\n{}\n", summary));
        }

        if let Some(name) = interrupting {
            prompt.push_str(&format!(
                "\nYou are cutting in while {} is still talking. Keep it short.\n",
                name
            ));
        }

        prompt.push_str("\nYour contribution:");
        prompt
    }
}

fn scale(value: f64, low: &'static str, high: &'static str) -> &'static str {
    if value >= 0.5 { high } else { low }
}
