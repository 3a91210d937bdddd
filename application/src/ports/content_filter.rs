//! Content filter port
//!
//! Generated text passes through a filter before it may enter the transcript.
//! Filtering is an external concern; the default lets everything through.

use panel_domain::Persona;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterVerdict {
    /// Accept the text, possibly rewritten
    Accept(String),
    /// Refuse the text; the turn is treated as a generation failure
    Reject(String),
}

pub trait ContentFilter: Send + Sync {
    fn filter(&self, speaker: &Persona, text: &str) -> FilterVerdict;
}

/// Accepts every text unchanged
pub struct PassthroughFilter;

impl ContentFilter for PassthroughFilter {
    fn filter(&self, _speaker: &Persona, text: &str) -> FilterVerdict {
        FilterVerdict::Accept(text.to_string())
    }
}
