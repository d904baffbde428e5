//! Reconciliation logic: the per-operation state machine and its executor.
//!
//! Every decision the engine makes lives in [`transition`], a pure function
//! over the entity's current state. Durable backends reuse it directly and
//! wrap it in their own transaction; [`Reconciler`] drives it against a
//! [`SyncStore`] for in-process use.
//!
//! # State machine
//!
//! An entity is in one of three states: absent, active, or tombstoned.
//!
//! | Operation | Absent              | Active              | Tombstoned |
//! |-----------|---------------------|---------------------|------------|
//! | CREATE    | create at version 1 | partial merge, v+1  | no-op      |
//! | UPDATE    | conflict: not found | partial merge, v+1  | conflict: deleted |
//! | DELETE    | no-op               | tombstone, v+1      | no-op      |
//!
//! Conflicts and no-ops still consume the operation: its id is recorded in
//! the idempotency ledger so a resubmission becomes a duplicate.

use crate::{
    error::Result, Conflict, ConflictReason, Entity, Error, OpKind, Operation, Outcome, SyncStore,
};

/// The effect an operation has on its target entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Persist this as the entity's new state
    Write(Entity),
    /// Record the operation as processed without touching entity state
    Noop,
    /// Business-rule rejection; recorded as processed and reported
    Conflict(Conflict),
}

/// Decide what a single operation does to the entity state it targets.
///
/// `current` is the stored entity, tombstone included, or `None` if the id
/// has never existed. Validation failures are errors: the operation must
/// not be recorded as processed, so the client can correct and resubmit
/// under the same id.
pub fn transition(current: Option<&Entity>, op: &Operation) -> Result<Transition> {
    match &op.kind {
        OpKind::Create => create_transition(current, op),
        OpKind::Update => update_transition(current, op),
        OpKind::Delete => Ok(delete_transition(current, op)),
        OpKind::Unknown(raw) => Err(Error::UnknownOpKind(raw.clone())),
    }
}

fn create_transition(current: Option<&Entity>, op: &Operation) -> Result<Transition> {
    // The state decides first; only the arms that write read the payload
    match current {
        None => {
            let payload = op.payload.as_ref().ok_or(Error::MissingPayload)?;
            let title = payload.title.clone().ok_or(Error::MissingField("title"))?;
            let description = payload
                .description
                .clone()
                .ok_or(Error::MissingField("description"))?;
            Ok(Transition::Write(Entity::new(
                op.entity_id.clone(),
                title,
                description,
                op.timestamp.clone(),
            )))
        }
        Some(existing) if existing.is_active() => {
            // Duplicate-id creates from other clients act as updates
            let payload = op.payload.as_ref().ok_or(Error::MissingPayload)?;
            let mut updated = existing.clone();
            updated.merge_payload(payload, &op.timestamp);
            Ok(Transition::Write(updated))
        }
        // Tombstones are never resurrected; the op is still consumed
        Some(_) => Ok(Transition::Noop),
    }
}

fn update_transition(current: Option<&Entity>, op: &Operation) -> Result<Transition> {
    match current {
        None => Ok(Transition::Conflict(Conflict::new(
            op.entity_id.clone(),
            ConflictReason::NotFound,
        ))),
        Some(existing) if existing.deleted => Ok(Transition::Conflict(Conflict::new(
            op.entity_id.clone(),
            ConflictReason::UpdateOnDeleted,
        ))),
        Some(existing) => {
            let payload = op.payload.as_ref().ok_or(Error::MissingPayload)?;
            let mut updated = existing.clone();
            updated.merge_payload(payload, &op.timestamp);
            Ok(Transition::Write(updated))
        }
    }
}

fn delete_transition(current: Option<&Entity>, op: &Operation) -> Transition {
    match current {
        Some(existing) if existing.is_active() => {
            let mut tombstoned = existing.clone();
            tombstoned.mark_deleted(&op.timestamp);
            Transition::Write(tombstoned)
        }
        // Deleting what is absent or already deleted never conflicts
        _ => Transition::Noop,
    }
}

/// Applies operations to a [`SyncStore`] with exactly-once semantics.
pub struct Reconciler<S> {
    store: S,
}

impl<S: SyncStore> Reconciler<S> {
    /// Create a reconciler over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply a single operation.
    ///
    /// The idempotency gate runs first: an already-recorded id returns
    /// [`Outcome::Duplicate`] without touching entity state and without
    /// re-reporting any conflict. Otherwise the transition is decided and
    /// committed atomically with the ledger entry.
    pub fn apply(&mut self, op: &Operation) -> Result<Outcome> {
        if self.store.contains(&op.op_id)? {
            return Ok(Outcome::Duplicate);
        }

        let current = self.store.get(&op.entity_id)?;
        match transition(current.as_ref(), op)? {
            Transition::Write(entity) => {
                self.store.commit(Some(entity), &op.op_id)?;
                Ok(Outcome::Applied)
            }
            Transition::Noop => {
                self.store.commit(None, &op.op_id)?;
                Ok(Outcome::Applied)
            }
            Transition::Conflict(conflict) => {
                self.store.commit(None, &op.op_id)?;
                Ok(Outcome::Conflicted(conflict))
            }
        }
    }
}
