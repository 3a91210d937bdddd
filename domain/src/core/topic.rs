//! Topic value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// The subject a panel discusses (Value Object)
///
/// Always non-empty after trimming; surrounding whitespace is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic {
    content: String,
}

impl Topic {
    /// Create a topic, rejecting empty or whitespace-only input
    pub fn parse(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidTopic(
                "topic cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            content: trimmed.to_string(),
        })
    }

    /// Get the topic text
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_creation() {
        let topic = Topic::parse("  How do we cut CAC?  ").unwrap();
        assert_eq!(topic.as_str(), "How do we cut CAC?");
    }

    #[test]
    fn test_topic_rejects_empty() {
        assert!(Topic::parse("").is_err());
        assert!(Topic::parse("   ").is_err());
    }

    #[test]
    fn test_topic_serializes_as_string() {
        let topic = Topic::parse("Launch plan").unwrap();
        assert_eq!(serde_json::to_string(&topic).unwrap(), "\"Launch plan\"");
    }
}
