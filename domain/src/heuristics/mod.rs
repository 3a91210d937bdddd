//! Shallow text heuristics
//!
//! Agreement, disagreement, recommendation and domain-routing detection is
//! keyword based. The keyword tables are configuration and are the tested
//! surface; nothing here attempts to understand meaning.

pub mod keywords;
pub mod signals;

pub use keywords::{KeywordTables, contains_any, contains_phrase};
pub use signals::TextSignals;
