//! Event logging: panel events written as JSON lines.
//!
//! Provides [`JsonlEventSink`], a JSONL file writer that implements
//! the [`EventSink`](panel_application::EventSink) port.

mod jsonl_sink;

pub use jsonl_sink::JsonlEventSink;
