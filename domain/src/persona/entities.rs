//! Persona entities and value objects

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Stable identifier of a persona (Value Object)
///
/// Identifiers are lowercase ASCII-ish slugs such as `"marcus"`; they double
/// as a name that can be referenced in utterance text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(String);

impl PersonaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PersonaId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The four personality scalars that drive turn-taking.
///
/// Every value lies in `[0, 1]`:
/// - `assertiveness`: how readily the persona takes (or seizes) the floor
/// - `contrarianism`: appetite for challenging the previous speaker
/// - `creativity`: divergence of ideas, forwarded to text generation
/// - `patience`: deliberation pace; low patience means shorter thinking time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTraits {
    pub assertiveness: f64,
    pub contrarianism: f64,
    pub creativity: f64,
    pub patience: f64,
}

impl PersonalityTraits {
    pub fn new(assertiveness: f64, contrarianism: f64, creativity: f64, patience: f64) -> Self {
        Self {
            assertiveness,
            contrarianism,
            creativity,
            patience,
        }
    }

    /// Reject any scalar outside `[0, 1]` (NaN included).
    pub fn validate(&self, persona: &PersonaId) -> Result<(), DomainError> {
        let fields = [
            ("assertiveness", self.assertiveness),
            ("contrarianism", self.contrarianism),
            ("creativity", self.creativity),
            ("patience", self.patience),
        ];
        for (name, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::InvalidTrait {
                    persona: persona.to_string(),
                    name,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for PersonalityTraits {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.5, 0.5)
    }
}

/// A simulated discussion participant (Entity, immutable after load)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    pub display_name: String,
    /// Job title shown to the text generator, e.g. "Marketing Analytics Manager"
    #[serde(default)]
    pub role: String,
    /// Domain expertise tags in priority order; the first tag is primary.
    #[serde(default)]
    domain_tags: Vec<String>,
    pub traits: PersonalityTraits,
}

impl Persona {
    pub fn new(
        id: impl Into<PersonaId>,
        display_name: impl Into<String>,
        traits: PersonalityTraits,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role: String::new(),
            domain_tags: Vec::new(),
            traits,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the domain tags; duplicates (case-insensitive) are dropped while
    /// keeping the first occurrence's position.
    pub fn with_domain_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.into().trim().to_lowercase();
            if !tag.is_empty() && !deduped.contains(&tag) {
                deduped.push(tag);
            }
        }
        self.domain_tags = deduped;
        self
    }

    pub fn domain_tags(&self) -> &[String] {
        &self.domain_tags
    }

    /// The persona's primary domain tag, if any
    pub fn primary_domain(&self) -> Option<&str> {
        self.domain_tags.first().map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.domain_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.traits.validate(&self.id)
    }

    /// Names under which other personas may reference this one in text.
    pub fn reference_names(&self) -> [&str; 2] {
        [self.id.as_str(), self.display_name.as_str()]
    }
}
