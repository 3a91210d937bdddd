//! Synthesis: distilling a finished transcript into a briefing document

mod document;
mod generator;

pub use document::{
    ConflictNote, DataPoint, Excerpt, PhaseTimeline, Recommendation, SynthesisDocument,
};
pub use generator::{SynthesisConfig, synthesize};
