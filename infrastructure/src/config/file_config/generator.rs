//! Utterance generator selection from TOML (`[generator]` section)

use super::ConfigValidationError;
use crate::generators::{CommandGenerator, EchoGenerator, PersonaScript, ScriptedGenerator};
use panel_application::UtteranceGenerator;
use panel_domain::{ConfigIssue, ConfigIssueCode, PersonaId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Which generator adapter produces persona text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// Canned per-persona lines (default, works offline)
    #[default]
    Scripted,
    /// Deterministic text derived from the request
    Echo,
    /// External program fed the prompt on stdin
    Command,
}

impl GeneratorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorKind::Scripted => "scripted",
            GeneratorKind::Echo => "echo",
            GeneratorKind::Command => "command",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scripted" | "script" => Ok(Self::Scripted),
            "echo" => Ok(Self::Echo),
            "command" | "cmd" => Ok(Self::Command),
            other => Err(format!(
                "unknown generator '{}' (expected scripted, echo or command)",
                other
            )),
        }
    }
}

/// Raw generator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeneratorConfig {
    pub kind: GeneratorKind,
    /// Program and arguments for the command generator
    pub command: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Per-persona scripts for the scripted generator (`[generator.scripts.<id>]`)
    pub scripts: BTreeMap<String, PersonaScript>,
}

impl FileGeneratorConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.kind == GeneratorKind::Command && self.command.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidGenerator,
                "generator.command: required when generator.kind = \"command\"",
            ));
        }
        if self.kind != GeneratorKind::Command && !self.command.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidGenerator,
                format!(
                    "generator.command is ignored by the {} generator",
                    self.kind
                ),
            ));
        }
        for (id, script) in &self.scripts {
            if script.is_empty() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidGenerator,
                    format!("generator.scripts.{}: script has no lines", id),
                ));
            }
        }
        issues
    }

    /// Build the configured generator adapter
    pub fn build(&self) -> Result<Arc<dyn UtteranceGenerator>, ConfigValidationError> {
        match self.kind {
            GeneratorKind::Echo => Ok(Arc::new(EchoGenerator::new())),
            GeneratorKind::Scripted => {
                let generator = self
                    .scripts
                    .iter()
                    .fold(ScriptedGenerator::builtin(), |g, (id, script)| {
                        g.with_script(PersonaId::new(id.as_str()), script.clone())
                    });
                Ok(Arc::new(generator))
            }
            GeneratorKind::Command => {
                let mut generator = CommandGenerator::try_new(&self.command)
                    .map_err(|e| ConfigValidationError::Generator(e.to_string()))?;
                if let Some(dir) = &self.working_dir {
                    generator = generator.with_working_dir(dir);
                }
                Ok(Arc::new(generator))
            }
        }
    }
}
