use super::edge::{PairKey, RelationshipEdge};
use crate::conversation::UtteranceDraft;
use crate::heuristics::{KeywordTables, TextSignals};
use crate::persona::{PersonaId, PersonaRegistry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of applying one utterance to the ledger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerUpdate {
    /// Personas whose edge with the speaker changed
    pub reactions: BTreeSet<PersonaId>,
    /// At least one respect decrement was applied
    pub lowered_respect: bool,
}

/// Session-scoped store of pairwise relationships.
///
/// Edges are created lazily on first update and never removed. This is the
/// only type that mutates edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LedgerEntry>", into = "Vec<LedgerEntry>")]
pub struct RelationshipLedger {
    edges: BTreeMap<PairKey, RelationshipEdge>,
}

/// Serialized form of a ledger row (JSON object keys must be strings)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerEntry {
    a: PersonaId,
    b: PersonaId,
    #[serde(flatten)]
    edge: RelationshipEdge,
}

impl From<Vec<LedgerEntry>> for RelationshipLedger {
    fn from(entries: Vec<LedgerEntry>) -> Self {
        let mut ledger = RelationshipLedger::new();
        for entry in entries {
            ledger.seed(&entry.a, &entry.b, entry.edge);
        }
        ledger
    }
}

impl From<RelationshipLedger> for Vec<LedgerEntry> {
    fn from(ledger: RelationshipLedger) -> Self {
        ledger
            .edges
            .into_iter()
            .map(|(key, edge)| LedgerEntry {
                a: key.first().clone(),
                b: key.second().clone(),
                edge,
            })
            .collect()
    }
}

impl RelationshipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current edge between `a` and `b`; the zero edge if never touched.
    pub fn edge(&self, a: &PersonaId, b: &PersonaId) -> RelationshipEdge {
        self.edges
            .get(&PairKey::new(a, b))
            .copied()
            .unwrap_or_default()
    }

    pub fn alliance_count(&self, a: &PersonaId, b: &PersonaId) -> u32 {
        self.edge(a, b).alliance_count
    }

    pub fn conflict_count(&self, a: &PersonaId, b: &PersonaId) -> u32 {
        self.edge(a, b).conflict_count
    }

    /// Overwrite an edge; respect is clamped. Self-pairs are ignored.
    pub fn seed(&mut self, a: &PersonaId, b: &PersonaId, edge: RelationshipEdge) {
        if a == b {
            return;
        }
        let edge = RelationshipEdge::new(edge.alliance_count, edge.conflict_count, edge.respect);
        self.edges.insert(PairKey::new(a, b), edge);
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &RelationshipEdge)> {
        self.edges.iter()
    }

    /// Update edges from one utterance.
    ///
    /// Markers target the personas named in the text; when nobody is named
    /// they target `previous_speaker`. An interruption always costs one
    /// respect point between interrupter and interrupted.
    pub fn apply(
        &mut self,
        draft: &UtteranceDraft,
        previous_speaker: Option<&PersonaId>,
        panel: &PersonaRegistry,
        tables: &KeywordTables,
    ) -> LedgerUpdate {
        let speaker = &draft.speaker_id;
        let signals = TextSignals::scan(&draft.text, speaker, panel, tables);
        let mut update = LedgerUpdate::default();

        let targets: Vec<PersonaId> = if signals.mentions.is_empty() {
            previous_speaker
                .filter(|prev| *prev != speaker)
                .cloned()
                .into_iter()
                .collect()
        } else {
            signals.mentions.clone()
        };

        for target in &targets {
            if signals.agreement {
                self.entry(speaker, target).record_alliance();
                update.reactions.insert(target.clone());
            }
            if signals.disagreement {
                self.entry(speaker, target).record_conflict();
                update.reactions.insert(target.clone());
                update.lowered_respect = true;
            }
        }

        if let Some(interrupted) = &draft.interrupted_speaker_id
            && interrupted != speaker
        {
            self.entry(speaker, interrupted).adjust_respect(-1);
            update.reactions.insert(interrupted.clone());
            update.lowered_respect = true;
        }

        update
    }

    fn entry(&mut self, a: &PersonaId, b: &PersonaId) -> &mut RelationshipEdge {
        self.edges.entry(PairKey::new(a, b)).or_default()
    }

    /// Relationships of one persona, for the generator prompt.
    pub fn summary_for(&self, persona: &PersonaId) -> RelationshipSummary {
        let entries = self
            .edges
            .iter()
            .filter_map(|(key, edge)| {
                key.other(persona).map(|other| RelationshipView {
                    other: other.clone(),
                    alliance_count: edge.alliance_count,
                    conflict_count: edge.conflict_count,
                    respect: edge.respect,
                })
            })
            .collect();
        RelationshipSummary {
            persona: persona.clone(),
            entries,
        }
    }

    /// Top alliances and conflicts plus every non-zero respect score.
    pub fn insights(&self, limit: usize) -> RelationshipInsights {
        let pair = |key: &PairKey, value: i64| PairInsight {
            a: key.first().clone(),
            b: key.second().clone(),
            value,
        };

        let mut alliances: Vec<PairInsight> = self
            .edges
            .iter()
            .filter(|(_, e)| e.alliance_count > 0)
            .map(|(k, e)| pair(k, i64::from(e.alliance_count)))
            .collect();
        alliances.sort_by(|x, y| y.value.cmp(&x.value));
        alliances.truncate(limit);

        let mut conflicts: Vec<PairInsight> = self
            .edges
            .iter()
            .filter(|(_, e)| e.conflict_count > 0)
            .map(|(k, e)| pair(k, i64::from(e.conflict_count)))
            .collect();
        conflicts.sort_by(|x, y| y.value.cmp(&x.value));
        conflicts.truncate(limit);

        let respect_dynamics = self
            .edges
            .iter()
            .filter(|(_, e)| e.respect != 0)
            .map(|(k, e)| pair(k, i64::from(e.respect)))
            .collect();

        RelationshipInsights {
            strongest_alliances: alliances,
            biggest_conflicts: conflicts,
            respect_dynamics,
        }
    }
}

/// One persona's view of a relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipView {
    pub other: PersonaId,
    pub alliance_count: u32,
    pub conflict_count: u32,
    pub respect: i8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipSummary {
    pub persona: PersonaId,
    pub entries: Vec<RelationshipView>,
}

impl RelationshipSummary {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn allies(&self) -> impl Iterator<Item = &PersonaId> {
        self.entries
            .iter()
            .filter(|e| e.alliance_count > e.conflict_count)
            .map(|e| &e.other)
    }

    pub fn rivals(&self) -> impl Iterator<Item = &PersonaId> {
        self.entries
            .iter()
            .filter(|e| e.conflict_count > e.alliance_count)
            .map(|e| &e.other)
    }

    /// Compact one-line-per-relationship description for prompts
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "- {}: {} agreements, {} disagreements, respect {:+}",
                    e.other, e.alliance_count, e.conflict_count, e.respect
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A pair and the value it was ranked by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairInsight {
    pub a: PersonaId,
    pub b: PersonaId,
    pub value: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipInsights {
    pub strongest_alliances: Vec<PairInsight>,
    pub biggest_conflicts: Vec<PairInsight>,
    pub respect_dynamics: Vec<PairInsight>,
}

impl RelationshipInsights {
    pub fn is_empty(&self) -> bool {
        self.strongest_alliances.is_empty()
            && self.biggest_conflicts.is_empty()
            && self.respect_dynamics.is_empty()
    }
}
