//! External command bridge.
//!
//! Runs a program once per turn, writes the request as a JSON document to
//! its stdin and takes the trimmed stdout as the utterance text. This is how
//! a language model CLI or any other text producer plugs into the panel.

use async_trait::async_trait;
use panel_application::ports::utterance_generator::{
    GenerationError, GenerationRequest, UtteranceGenerator,
};
use panel_domain::core::string::truncate;
use serde_json::json;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Upper bound on accepted utterance text (64 KB)
const MAX_OUTPUT_SIZE: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum CommandSetupError {
    #[error("generator command is empty")]
    EmptyCommand,

    #[error("generator program not found: {0}")]
    ProgramNotFound(String),
}

/// Generator backed by an external program.
///
/// The child is killed when the generation future is dropped, so the
/// pipeline's timeout and cancellation also stop the process.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: PathBuf,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandGenerator {
    /// Create a generator from `command` (program followed by its arguments).
    ///
    /// Fails if the program cannot be found on `PATH`.
    pub fn try_new(command: &[String]) -> Result<Self, CommandSetupError> {
        let (program, args) = command.split_first().ok_or(CommandSetupError::EmptyCommand)?;
        let program = which::which(program)
            .map_err(|_| CommandSetupError::ProgramNotFound(program.clone()))?;
        Ok(Self {
            program,
            args: args.to_vec(),
            working_dir: None,
        })
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn payload(request: &GenerationRequest) -> String {
        json!({
            "session_id": request.session_id,
            "persona": {
                "id": request.persona.id,
                "name": request.persona.display_name,
                "role": request.persona.role,
            },
            "phase": request.phase,
            "sequence_number": request.sequence_number,
            "attempt": request.attempt,
            "system": request.system_prompt(),
            "prompt": request.user_prompt(),
        })
        .to_string()
    }
}

#[async_trait]
impl UtteranceGenerator for CommandGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            GenerationError::Unavailable(format!(
                "failed to spawn {}: {}",
                self.program.display(),
                e
            ))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program that ignores stdin may close it early; that is not an error
            if let Err(e) = stdin.write_all(Self::payload(request).as_bytes()).await {
                debug!("generator closed stdin early: {}", e);
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| GenerationError::Failed(format!("failed to wait for generator: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenerationError::Failed(format!(
                "generator exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = stdout.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        debug!(
            persona = %request.persona.id,
            seq = request.sequence_number,
            bytes = text.len(),
            "generator replied"
        );
        Ok(truncate(text, MAX_OUTPUT_SIZE))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use panel_domain::{DiscussionPhase, PersonaId, PersonaRegistry, SessionId, Topic};

    fn request() -> GenerationRequest {
        let registry = PersonaRegistry::builtin();
        GenerationRequest {
            session_id: SessionId::new("s-1"),
            persona: registry.get(&PersonaId::new("elena")).cloned().unwrap(),
            topic: Topic::parse("Launch plan").unwrap(),
            phase: DiscussionPhase::Discovery,
            context: Vec::new(),
            relationships: None,
            interrupting: None,
            sequence_number: 1,
            attempt: 1,
        }
    }

    fn command(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(matches!(
            CommandGenerator::try_new(&[]),
            Err(CommandSetupError::EmptyCommand)
        ));
    }

    #[test]
    fn test_missing_program_rejected() {
        assert!(matches!(
            CommandGenerator::try_new(&command(&["definitely-not-a-real-program-xyz"])),
            Err(CommandSetupError::ProgramNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_request_is_piped_to_stdin() {
        let generator = CommandGenerator::try_new(&command(&["cat"])).unwrap();
        let text = generator.generate(&request()).await.unwrap();

        let payload: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(payload["persona"]["id"], "elena");
        assert_eq!(payload["phase"], "discovery");
        assert_eq!(payload["attempt"], 1);
        assert!(payload["prompt"].as_str().unwrap().contains("Launch plan"));
    }

    #[tokio::test]
    async fn test_stdout_is_trimmed() {
        let generator =
            CommandGenerator::try_new(&command(&["sh", "-c", "cat >/dev/null; echo '  Hello panel.  '"]))
                .unwrap();
        assert_eq!(generator.generate(&request()).await.unwrap(), "Hello panel.");
    }

    #[tokio::test]
    async fn test_failure_exit_is_error() {
        let generator =
            CommandGenerator::try_new(&command(&["sh", "-c", "echo boom >&2; exit 3"])).unwrap();
        match generator.generate(&request()).await {
            Err(GenerationError::Failed(message)) => assert!(message.contains("boom")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_silent_program_is_empty_response() {
        let generator = CommandGenerator::try_new(&command(&["true"])).unwrap();
        assert_eq!(
            generator.generate(&request()).await,
            Err(GenerationError::EmptyResponse)
        );
    }
}
