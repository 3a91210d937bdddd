//! Structured configuration issues.
//!
//! Config loaders check a merged configuration and report every problem they
//! find instead of stopping at the first one. Errors make the configuration
//! unusable; warnings describe settings that work but probably surprise.

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// The persona roster is empty after filtering.
    EmptyPanel,
    /// Two personas share an id.
    DuplicatePersona,
    /// A persona filter names someone not on the roster.
    UnknownPersona,
    /// A personality trait lies outside [0, 1].
    TraitOutOfRange,
    /// A probability or scale lies outside its valid range.
    ProbabilityOutOfRange,
    /// A phase cap of zero skips that phase entirely.
    PhaseSkipped,
    /// An agreement/disagreement/recommendation table is empty.
    EmptyKeywordTable,
    /// A persona's domain tag has no routing keywords.
    UnroutedDomainTag,
    /// Generation timeout of zero fails every turn.
    ZeroTimeout,
    /// The context window holds no utterances.
    EmptyContextWindow,
    /// Generator kind is unknown or missing required settings.
    InvalidGenerator,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_severity() {
        let e = ConfigIssue::error(ConfigIssueCode::EmptyPanel, "no personas");
        assert!(e.is_error());
        assert_eq!(e.to_string(), "error: no personas");

        let w = ConfigIssue::warning(ConfigIssueCode::PhaseSkipped, "analysis cap is 0");
        assert!(!w.is_error());
        assert_eq!(w.to_string(), "warning: analysis cap is 0");
    }
}
