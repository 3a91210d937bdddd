//! Scripted persona lines.
//!
//! Each persona gets a short script per phase. Lines may use the
//! placeholders `{topic}` and `{last}` (the id of the previous speaker in
//! context, or "the team"). The built-in scripts cover the built-in
//! marketing roster; unknown personas fall back to a generic script.

use async_trait::async_trait;
use panel_application::ports::utterance_generator::{
    GenerationError, GenerationRequest, UtteranceGenerator,
};
use panel_domain::{DiscussionPhase, PersonaId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lines for one persona, per phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaScript {
    pub discovery: Vec<String>,
    pub analysis: Vec<String>,
    pub recommendation: Vec<String>,
}

impl PersonaScript {
    pub fn new<S: Into<String>>(
        discovery: impl IntoIterator<Item = S>,
        analysis: impl IntoIterator<Item = S>,
        recommendation: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            discovery: discovery.into_iter().map(Into::into).collect(),
            analysis: analysis.into_iter().map(Into::into).collect(),
            recommendation: recommendation.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self, phase: DiscussionPhase) -> &[String] {
        match phase {
            DiscussionPhase::Discovery => &self.discovery,
            DiscussionPhase::Analysis => &self.analysis,
            DiscussionPhase::Recommendation | DiscussionPhase::Synthesis => &self.recommendation,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.discovery.is_empty() && self.analysis.is_empty() && self.recommendation.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    scripts: BTreeMap<PersonaId, PersonaScript>,
    fallback: PersonaScript,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScriptedGenerator {
    /// Generator with no persona scripts; everyone uses the generic lines
    pub fn empty() -> Self {
        Self {
            scripts: BTreeMap::new(),
            fallback: generic_script(),
        }
    }

    /// Scripts for the built-in marketing roster
    pub fn builtin() -> Self {
        let mut generator = Self::empty();
        for (id, script) in builtin_scripts() {
            generator.scripts.insert(PersonaId::new(id), script);
        }
        generator
    }

    /// Add or replace the script of one persona
    pub fn with_script(mut self, persona: PersonaId, script: PersonaScript) -> Self {
        self.scripts.insert(persona, script);
        self
    }

    pub fn has_script(&self, persona: &PersonaId) -> bool {
        self.scripts.contains_key(persona)
    }

    fn line_for(&self, request: &GenerationRequest) -> Option<String> {
        let persona = &request.persona.id;
        let script = self
            .scripts
            .get(persona)
            .filter(|s| !s.lines(request.phase).is_empty())
            .unwrap_or(&self.fallback);
        let lines = script.lines(request.phase);
        if lines.is_empty() {
            return None;
        }

        // Walk forward through the script as the persona keeps talking
        let spoken = request
            .context
            .iter()
            .filter(|u| &u.speaker_id == persona && u.phase == request.phase)
            .count();
        let line = &lines[spoken % lines.len()];

        let last = request
            .context
            .iter()
            .rev()
            .find(|u| &u.speaker_id != persona)
            .map(|u| u.speaker_id.as_str())
            .unwrap_or("the team");
        Some(
            line.replace("{topic}", request.topic.as_str())
                .replace("{last}", last),
        )
    }
}

#[async_trait]
impl UtteranceGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.line_for(request).ok_or(GenerationError::EmptyResponse)
    }
}

fn generic_script() -> PersonaScript {
    PersonaScript::new(
        [
            "Before we decide anything on {topic}, I want to understand what changed first.",
            "Building on {last}, what do we actually know versus assume here?",
        ],
        [
            "I disagree with {last} on the cause. The data points somewhere else.",
            "Exactly, {last}. That matches what I have seen.",
        ],
        [
            "We should pick one experiment on {topic} and measure it for a month.",
            "I recommend we agree on a single owner for the next step.",
        ],
    )
}

fn builtin_scripts() -> Vec<(&'static str, PersonaScript)> {
    vec![
        (
            "sarah",
            PersonaScript::new(
                [
                    "From a brand strategy perspective, {topic} is a differentiation problem before it is a channel problem.",
                    "Building on {last}, what perception do we need to shift?",
                ],
                [
                    "Building on the team's insights, we can position ourselves as the intelligent choice for sophisticated buyers.",
                    "I disagree with {last}. Cutting spend without fixing the message just makes us cheaper and quieter.",
                ],
                [
                    "We should lead with Trust Through Transparency: clear fees, education first, technology that works for people.",
                ],
            ),
        ),
        (
            "marcus",
            PersonaScript::new(
                [
                    "Looking at {topic}, CPCs in our category run $15-40 on LinkedIn and $8-25 on Google.",
                    "Stop, {last}. What is the test budget and the primary conversion goal?",
                ],
                [
                    "I agree with Sarah's positioning. We can turn it into ad messaging that puts fees upfront.",
                    "That's wrong, {last}. Our paid channels are not the problem, conversion is.",
                ],
                [
                    "I recommend a $10K/month test split 50/30/20 across Google, LinkedIn and Meta, optimized toward a $150 CAC.",
                ],
            ),
        ),
        (
            "elena",
            PersonaScript::new(
                [
                    "For {topic}, content has to build trust and educate before anyone converts.",
                    "Building on {last}, which questions does our audience struggle with most?",
                ],
                [
                    "Building on Marcus's campaign plan, content should carry the landing pages and nurture sequences.",
                    "I disagree with {last}. Educational content lowers CAC over time, it is not a cost center.",
                ],
                [
                    "We should launch three pillar pages and a 5-part nurture series, aiming for 40% more organic traffic in 3 months.",
                ],
            ),
        ),
        (
            "david",
            PersonaScript::new(
                [
                    "From a UX perspective, {topic} means removing friction at every touchpoint. Onboarding drop-off is often 70%.",
                    "Building on {last}, which user action are we optimizing for?",
                ],
                [
                    "Exactly, {last}. Trust signals belong throughout the journey, not just on the homepage.",
                    "I disagree with {last}. More traffic into a leaky funnel only raises CAC.",
                ],
                [
                    "I recommend a 3-step onboarding with progress bars and save-and-return, which could lift conversion by 40%.",
                ],
            ),
        ),
        (
            "priya",
            PersonaScript::new(
                [
                    "Analyzing {topic}, benchmarks put CAC at $150-500 depending on product complexity.",
                    "Building on {last}, which conversion events can we track reliably today?",
                ],
                [
                    "I disagree with {last}. The numbers show CAC rose 40% before spend changed.",
                    "Exactly. With multi-touch attribution I project a 3-month payback if we hit the CAC target.",
                ],
                [
                    "We should track CAC by channel weekly. Success means CAC under $200 and LTV:CAC above 3:1.",
                ],
            ),
        ),
        (
            "alex",
            PersonaScript::new(
                [
                    "For {topic}, I see growth potential in product-led acquisition and referral loops.",
                    "Building on {last}, what value can users share that benefits both sides?",
                ],
                [
                    "Building on everyone's ideas, paid acquisition should feed the referral engine.",
                    "I disagree with {last}. Growth has to be built into the product, not bolted on.",
                ],
                [
                    "I propose a Give $25, Get $25 referral program targeting 25% of new users from referrals.",
                ],
            ),
        ),
    ]
}
