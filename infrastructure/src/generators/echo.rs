//! Deterministic echo generator.
//!
//! Output depends only on the request, so a seeded session using this
//! generator produces the same transcript on every run. The lines carry
//! agreement, disagreement, figure and recommendation markers so the
//! relationship ledger and synthesis have something to work with.

use async_trait::async_trait;
use panel_application::ports::utterance_generator::{
    GenerationError, GenerationRequest, UtteranceGenerator,
};
use panel_domain::DiscussionPhase;

#[derive(Debug, Clone, Copy, Default)]
pub struct EchoGenerator;

impl EchoGenerator {
    pub fn new() -> Self {
        Self
    }

    fn compose(request: &GenerationRequest) -> String {
        let persona = &request.persona;
        let focus = persona.primary_domain().unwrap_or("overall");
        let topic = request.topic.as_str();

        let Some(last) = request.context.last() else {
            return format!(
                "{} here. Before we jump in, I want to look at \"{}\" from the {} angle.",
                persona.display_name, topic, focus
            );
        };
        let other = &last.speaker_id;

        if let Some(interrupted) = &request.interrupting {
            return format!(
                "Sorry {}, stop there. The {} side of this matters more right now.",
                interrupted.display_name, focus
            );
        }

        match request.phase {
            DiscussionPhase::Discovery => format!(
                "Building on {}, the {} question is what changed first.",
                other, focus
            ),
            DiscussionPhase::Analysis if request.sequence_number % 2 == 1 => format!(
                "I disagree with {}. The {} numbers moved 15% before anything else did.",
                other, focus
            ),
            DiscussionPhase::Analysis => format!(
                "Exactly, {}. The {} data points the same way.",
                other, focus
            ),
            DiscussionPhase::Recommendation => format!(
                "We should run a focused {} test next quarter with a $5K budget.",
                focus
            ),
            DiscussionPhase::Synthesis => format!("Summing up from the {} side.", focus),
        }
    }
}

#[async_trait]
impl UtteranceGenerator for EchoGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        Ok(Self::compose(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_domain::{
        KeywordTables, PersonaId, PersonaRegistry, SessionId, TextSignals, Topic, UtteranceDraft,
    };
    use std::collections::BTreeSet;

    fn request(phase: DiscussionPhase, sequence_number: u64, with_context: bool) -> GenerationRequest {
        let registry = PersonaRegistry::builtin();
        let persona = registry.get(&PersonaId::new("priya")).cloned().unwrap();
        let context = if with_context {
            vec![
                UtteranceDraft::new(PersonaId::new("marcus"), "Paid is fine.", phase, 900)
                    .finalize(sequence_number - 1, 900, BTreeSet::new(), false),
            ]
        } else {
            Vec::new()
        };
        GenerationRequest {
            session_id: SessionId::new("s"),
            persona,
            topic: Topic::parse("CAC doubled").unwrap(),
            phase,
            context,
            relationships: None,
            interrupting: None,
            sequence_number,
            attempt: 1,
        }
    }

    #[tokio::test]
    async fn test_echo_is_deterministic() {
        let generator = EchoGenerator::new();
        let req = request(DiscussionPhase::Analysis, 5, true);
        let a = generator.generate(&req).await.unwrap();
        let b = generator.generate(&req).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_echo_opening_mentions_topic() {
        let text = EchoGenerator::new()
            .generate(&request(DiscussionPhase::Discovery, 1, false))
            .await
            .unwrap();
        assert!(text.starts_with("Priya here."));
        assert!(text.contains("CAC doubled"));
    }

    #[tokio::test]
    async fn test_echo_lines_carry_markers() {
        let tables = KeywordTables::default();
        let panel = PersonaRegistry::builtin();
        let priya = PersonaId::new("priya");
        let generator = EchoGenerator::new();

        let challenge = generator
            .generate(&request(DiscussionPhase::Analysis, 3, true))
            .await
            .unwrap();
        let signals = TextSignals::scan(&challenge, &priya, &panel, &tables);
        assert!(signals.disagreement);
        assert_eq!(signals.mentions, vec![PersonaId::new("marcus")]);

        let support = generator
            .generate(&request(DiscussionPhase::Analysis, 4, true))
            .await
            .unwrap();
        assert!(TextSignals::scan(&support, &priya, &panel, &tables).agreement_with_reference());

        let plan = generator
            .generate(&request(DiscussionPhase::Recommendation, 6, true))
            .await
            .unwrap();
        assert!(tables.has_recommendation(&plan));
    }
}
