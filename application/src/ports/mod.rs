//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod content_filter;
pub mod event_sink;
pub mod utterance_generator;
