//! Persona registry - the validated, read-only roster of a panel

use super::entities::{Persona, PersonaId, PersonalityTraits};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Immutable roster of personas, in declaration order.
///
/// Construction validates that the roster is non-empty, ids are unique and
/// every trait lies in `[0, 1]`. Once built, the registry is shared across
/// sessions by reference and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    pub fn new(personas: Vec<Persona>) -> Result<Self, DomainError> {
        if personas.is_empty() {
            return Err(DomainError::NoPersonas);
        }
        for (i, persona) in personas.iter().enumerate() {
            persona.validate()?;
            if personas[..i].iter().any(|p| p.id == persona.id) {
                return Err(DomainError::DuplicatePersona(persona.id.to_string()));
            }
        }
        Ok(Self { personas })
    }

    /// Restrict the roster to `ids`, keeping registry order.
    pub fn subset(&self, ids: &[PersonaId]) -> Result<Self, DomainError> {
        if let Some(missing) = ids.iter().find(|id| self.get(id).is_none()) {
            return Err(DomainError::UnknownPersona(missing.to_string()));
        }
        let personas = self
            .personas
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect();
        Self::new(personas)
    }

    pub fn get(&self, id: &PersonaId) -> Option<&Persona> {
        self.personas.iter().find(|p| &p.id == id)
    }

    /// Look up a persona by id or display name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| {
            p.id.as_str().eq_ignore_ascii_case(name) || p.display_name.eq_ignore_ascii_case(name)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    pub fn ids(&self) -> Vec<PersonaId> {
        self.personas.iter().map(|p| p.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// The built-in six-person marketing strategy team.
    pub fn builtin() -> Self {
        let personas = vec![
            Persona::new("sarah", "Sarah", PersonalityTraits::new(0.8, 0.4, 0.7, 0.6))
                .with_role("Brand Strategy Lead")
                .with_domain_tags(["brand", "strategy"]),
            Persona::new("marcus", "Marcus", PersonalityTraits::new(0.9, 0.8, 0.3, 0.2))
                .with_role("Digital Campaign Manager")
                .with_domain_tags(["campaigns", "budget"]),
            Persona::new("elena", "Elena", PersonalityTraits::new(0.7, 0.7, 0.9, 0.4))
                .with_role("Content Marketing Specialist")
                .with_domain_tags(["content", "creative"]),
            Persona::new("david", "David", PersonalityTraits::new(0.6, 0.6, 0.5, 0.8))
                .with_role("Customer Experience Designer")
                .with_domain_tags(["experience"]),
            Persona::new("priya", "Priya", PersonalityTraits::new(0.7, 0.9, 0.2, 0.5))
                .with_role("Marketing Analytics Manager")
                .with_domain_tags(["analytics"]),
            Persona::new("alex", "Alex", PersonalityTraits::new(0.8, 0.5, 1.0, 0.3))
                .with_role("Growth Marketing Lead")
                .with_domain_tags(["growth"]),
        ];
        Self { personas }
    }
}
