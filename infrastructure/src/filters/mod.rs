//! Content filter adapters

mod phrase_redaction;

pub use phrase_redaction::{PhraseRedactionFilter, RedactionRule};
