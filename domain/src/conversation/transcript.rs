//! Append-only transcript

use super::phase::DiscussionPhase;
use super::utterance::Utterance;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Ordered, append-only sequence of utterances.
///
/// Sequence numbers start at 1 and increase by exactly one per append.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    utterances: Vec<Utterance>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next appended utterance must carry
    pub fn next_sequence(&self) -> u64 {
        self.utterances.len() as u64 + 1
    }

    pub fn append(&mut self, utterance: Utterance) -> Result<(), DomainError> {
        let expected = self.next_sequence();
        if utterance.sequence_number != expected {
            return Err(DomainError::SequenceGap {
                expected,
                actual: utterance.sequence_number,
            });
        }
        self.utterances.push(utterance);
        Ok(())
    }

    pub fn last(&self) -> Option<&Utterance> {
        self.utterances.last()
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Utterance> {
        self.utterances.iter()
    }

    pub fn as_slice(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn in_phase(&self, phase: DiscussionPhase) -> impl Iterator<Item = &Utterance> {
        self.utterances.iter().filter(move |u| u.phase == phase)
    }

    /// Previous utterance before `sequence_number`
    pub fn before(&self, sequence_number: u64) -> Option<&Utterance> {
        let index = sequence_number.checked_sub(2)?;
        self.utterances.get(index as usize)
    }
}
