//! Relationship ledger
//!
//! Pairwise alliance/conflict counters and a bounded respect score, updated
//! only from utterance content and interruptions.

mod edge;
mod ledger;

pub use edge::{PairKey, RESPECT_MAX, RESPECT_MIN, RelationshipEdge};
pub use ledger::{
    LedgerUpdate, PairInsight, RelationshipInsights, RelationshipLedger, RelationshipSummary,
    RelationshipView,
};
