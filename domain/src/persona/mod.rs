//! Persona domain
//!
//! Static definitions of the simulated discussion participants. A persona is
//! created once from configuration and never mutated; sessions share the
//! roster through an `Arc<PersonaRegistry>`.

pub mod entities;
pub mod registry;

pub use entities::{Persona, PersonaId, PersonalityTraits};
pub use registry::PersonaRegistry;
