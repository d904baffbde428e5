//! Per-operation outcomes and conflict reporting.

use crate::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an operation was rejected by business rules.
///
/// The wire strings are part of the protocol; clients match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictReason {
    /// UPDATE addressed an entity that has never existed
    #[serde(rename = "Item not found")]
    NotFound,
    /// UPDATE addressed a tombstoned entity
    #[serde(rename = "Cannot update deleted item")]
    UpdateOnDeleted,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::NotFound => f.write_str("Item not found"),
            ConflictReason::UpdateOnDeleted => f.write_str("Cannot update deleted item"),
        }
    }
}

/// A business-rule rejection reported back to the client.
///
/// Conflicts are per-response advisory data. They are not stored, and a
/// duplicate resubmission of the conflicting operation is acknowledged
/// without reporting the conflict again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Entity the rejected operation targeted
    pub entity_id: EntityId,
    /// Why it was rejected
    pub reason: ConflictReason,
}

impl Conflict {
    /// Create a new conflict report.
    pub fn new(entity_id: impl Into<EntityId>, reason: ConflictReason) -> Self {
        Self {
            entity_id: entity_id.into(),
            reason,
        }
    }
}

/// Result of applying a single operation.
///
/// All three variants leave the operation recorded in the idempotency
/// ledger, so each is acknowledged to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operation's effect is durably in place, including idempotent
    /// no-ops such as deleting an already-deleted entity
    Applied,
    /// The operation id was already in the ledger; nothing was mutated
    Duplicate,
    /// A business rule rejected the operation; recorded so resubmissions
    /// do not retry it
    Conflicted(Conflict),
}
