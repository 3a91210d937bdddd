//! Utterance generator adapters
//!
//! Implementations of the [`UtteranceGenerator`](panel_application::UtteranceGenerator)
//! port:
//!
//! - [`EchoGenerator`]: deterministic text derived from the request, for
//!   tests and offline demos
//! - [`ScriptedGenerator`]: per-persona, per-phase canned lines
//! - [`CommandGenerator`]: pipes the prompt to an external program and
//!   reads the reply from its stdout

mod command;
mod echo;
mod scripted;

pub use command::{CommandGenerator, CommandSetupError};
pub use echo::EchoGenerator;
pub use scripted::{PersonaScript, ScriptedGenerator};
