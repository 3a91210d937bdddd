//! Discussion phases

use serde::{Deserialize, Serialize};

/// Phase of a panel discussion.
///
/// Phases are strictly forward-progressing:
/// `Discovery -> Analysis -> Recommendation -> Synthesis`. Synthesis is
/// terminal; no turns are scheduled once it is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionPhase {
    /// Understanding the problem
    Discovery,
    /// Connecting data points and identifying patterns
    Analysis,
    /// Developing concrete action items
    Recommendation,
    /// Distilling the transcript into the final document
    Synthesis,
}

impl DiscussionPhase {
    /// All phases in order
    pub const ALL: [DiscussionPhase; 4] = [
        DiscussionPhase::Discovery,
        DiscussionPhase::Analysis,
        DiscussionPhase::Recommendation,
        DiscussionPhase::Synthesis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscussionPhase::Discovery => "discovery",
            DiscussionPhase::Analysis => "analysis",
            DiscussionPhase::Recommendation => "recommendation",
            DiscussionPhase::Synthesis => "synthesis",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DiscussionPhase::Discovery => "Discovery",
            DiscussionPhase::Analysis => "Analysis & Insights",
            DiscussionPhase::Recommendation => "Strategic Recommendations",
            DiscussionPhase::Synthesis => "Final Synthesis",
        }
    }

    /// One-line goal announced when the phase begins
    pub fn goal(&self) -> &'static str {
        match self {
            DiscussionPhase::Discovery => "Understanding the problem and its constraints",
            DiscussionPhase::Analysis => "Connecting data points and identifying patterns",
            DiscussionPhase::Recommendation => "Developing concrete action items",
            DiscussionPhase::Synthesis => "Creating the briefing document",
        }
    }

    /// The following phase, or `None` for the terminal phase
    pub fn next(&self) -> Option<DiscussionPhase> {
        match self {
            DiscussionPhase::Discovery => Some(DiscussionPhase::Analysis),
            DiscussionPhase::Analysis => Some(DiscussionPhase::Recommendation),
            DiscussionPhase::Recommendation => Some(DiscussionPhase::Synthesis),
            DiscussionPhase::Synthesis => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DiscussionPhase::Synthesis)
    }
}

impl std::fmt::Display for DiscussionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for DiscussionPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown phase '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_progress_forward_only() {
        let mut phase = DiscussionPhase::Discovery;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(next > phase);
            phase = next;
            seen.push(phase);
        }
        assert_eq!(seen, DiscussionPhase::ALL.to_vec());
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_phase_parse_round_trip() {
        for phase in DiscussionPhase::ALL {
            assert_eq!(phase.as_str().parse::<DiscussionPhase>(), Ok(phase));
        }
        assert!("debate".parse::<DiscussionPhase>().is_err());
    }

    #[test]
    fn test_phase_serde_snake_case() {
        let json = serde_json::to_string(&DiscussionPhase::Recommendation).unwrap();
        assert_eq!(json, "\"recommendation\"");
    }
}
