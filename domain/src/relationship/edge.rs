use crate::persona::PersonaId;
use serde::{Deserialize, Serialize};

pub const RESPECT_MIN: i8 = -10;
pub const RESPECT_MAX: i8 = 10;

/// Unordered pair of personas, stored with the smaller id first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    first: PersonaId,
    second: PersonaId,
}

impl PairKey {
    pub fn new(a: &PersonaId, b: &PersonaId) -> Self {
        if a <= b {
            Self {
                first: a.clone(),
                second: b.clone(),
            }
        } else {
            Self {
                first: b.clone(),
                second: a.clone(),
            }
        }
    }

    pub fn first(&self) -> &PersonaId {
        &self.first
    }

    pub fn second(&self) -> &PersonaId {
        &self.second
    }

    pub fn contains(&self, id: &PersonaId) -> bool {
        &self.first == id || &self.second == id
    }

    /// The member of the pair that is not `id`
    pub fn other(&self, id: &PersonaId) -> Option<&PersonaId> {
        if &self.first == id {
            Some(&self.second)
        } else if &self.second == id {
            Some(&self.first)
        } else {
            None
        }
    }
}

/// State of one pairwise relationship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub alliance_count: u32,
    pub conflict_count: u32,
    /// Always within [`RESPECT_MIN`, `RESPECT_MAX`]
    pub respect: i8,
}

impl RelationshipEdge {
    pub fn new(alliance_count: u32, conflict_count: u32, respect: i8) -> Self {
        Self {
            alliance_count,
            conflict_count,
            respect: respect.clamp(RESPECT_MIN, RESPECT_MAX),
        }
    }

    pub fn record_alliance(&mut self) {
        self.alliance_count = self.alliance_count.saturating_add(1);
        self.adjust_respect(1);
    }

    pub fn record_conflict(&mut self) {
        self.conflict_count = self.conflict_count.saturating_add(1);
        self.adjust_respect(-1);
    }

    pub fn adjust_respect(&mut self, delta: i8) {
        self.respect = self
            .respect
            .saturating_add(delta)
            .clamp(RESPECT_MIN, RESPECT_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_unordered() {
        let a = PersonaId::new("alex");
        let b = PersonaId::new("sarah");
        assert_eq!(PairKey::new(&a, &b), PairKey::new(&b, &a));
        let key = PairKey::new(&b, &a);
        assert_eq!(key.first(), &a);
        assert_eq!(key.other(&a), Some(&b));
        assert_eq!(key.other(&PersonaId::new("elena")), None);
    }

    #[test]
    fn test_respect_clamped() {
        let mut edge = RelationshipEdge::new(0, 0, 9);
        edge.record_alliance();
        edge.record_alliance();
        assert_eq!(edge.respect, RESPECT_MAX);
        assert_eq!(edge.alliance_count, 2);

        let mut edge = RelationshipEdge::new(0, 0, -10);
        edge.record_conflict();
        assert_eq!(edge.respect, RESPECT_MIN);
        assert_eq!(edge.conflict_count, 1);
    }

    #[test]
    fn test_new_clamps_seeded_respect() {
        assert_eq!(RelationshipEdge::new(0, 0, 42).respect, RESPECT_MAX);
        assert_eq!(RelationshipEdge::new(0, 0, -42).respect, RESPECT_MIN);
    }
}
