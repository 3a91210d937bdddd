//! Output formatting for finished sessions

pub mod console;
