//! Storage contracts and the in-memory reference store.
//!
//! The engine never talks to a database directly. It works against the
//! traits here, and each backend supplies the one primitive the engine
//! cannot build itself: an atomic commit of an entity write together with
//! its idempotency ledger entry.

use crate::{Entity, EntityId, OperationId, StoreError};
use std::collections::{HashMap, HashSet};

/// Keyed store of entity state, tombstones included.
pub trait EntityStore {
    /// Fetch an entity by id, whether live or tombstoned.
    fn get(&self, id: &str) -> Result<Option<Entity>, StoreError>;

    /// Create or replace an entity.
    fn upsert(&mut self, entity: Entity) -> Result<(), StoreError>;

    /// All live entities, ordered by id.
    fn list_active(&self) -> Result<Vec<Entity>, StoreError>;
}

/// The idempotency ledger of processed operation ids.
pub trait OperationLog {
    /// Whether an operation id has already been recorded.
    fn contains(&self, op_id: &str) -> Result<bool, StoreError>;

    /// Record an operation id. Fails if the id is already present, the
    /// same way a unique index would.
    fn record(&mut self, op_id: &str) -> Result<(), StoreError>;
}

/// Combined storage handle with an atomic per-operation commit.
///
/// `commit` must persist the optional entity write and the ledger entry as
/// a single unit: if it fails, neither survives, which keeps the failed
/// operation safe to resubmit.
pub trait SyncStore: EntityStore + OperationLog {
    fn commit(&mut self, write: Option<Entity>, op_id: &str) -> Result<(), StoreError>;
}

/// In-memory reference implementation of [`SyncStore`].
///
/// Single-threaded and non-durable. It exists to run the engine in tests
/// and embedded scenarios, and to document the contract durable backends
/// must match.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entities: HashMap<EntityId, Entity>,
    ledger: HashSet<OperationId>,
    fail_commits: u32,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` commits fail with a store error.
    ///
    /// Fault injection hook: failed commits must leave both the entity
    /// table and the ledger untouched, and callers exercise exactly that.
    pub fn fail_next_commits(&mut self, n: u32) {
        self.fail_commits = n;
    }

    /// Number of recorded operation ids.
    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }

    /// Total number of stored entities, tombstones included.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl EntityStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Option<Entity>, StoreError> {
        Ok(self.entities.get(id).cloned())
    }

    fn upsert(&mut self, entity: Entity) -> Result<(), StoreError> {
        self.entities.insert(entity.id.clone(), entity);
        Ok(())
    }

    fn list_active(&self) -> Result<Vec<Entity>, StoreError> {
        let mut active: Vec<Entity> = self
            .entities
            .values()
            .filter(|entity| entity.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(active)
    }
}

impl OperationLog for MemoryStore {
    fn contains(&self, op_id: &str) -> Result<bool, StoreError> {
        Ok(self.ledger.contains(op_id))
    }

    fn record(&mut self, op_id: &str) -> Result<(), StoreError> {
        if !self.ledger.insert(op_id.to_string()) {
            return Err(StoreError::new(format!(
                "operation already recorded: {op_id}"
            )));
        }
        Ok(())
    }
}

impl SyncStore for MemoryStore {
    fn commit(&mut self, write: Option<Entity>, op_id: &str) -> Result<(), StoreError> {
        if self.fail_commits > 0 {
            self.fail_commits -= 1;
            return Err(StoreError::new("injected commit failure"));
        }
        if self.ledger.contains(op_id) {
            return Err(StoreError::new(format!(
                "operation already recorded: {op_id}"
            )));
        }
        if let Some(entity) = write {
            self.entities.insert(entity.id.clone(), entity);
        }
        self.ledger.insert(op_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str) -> Entity {
        Entity::new(id, "title", "description", "t0")
    }

    #[test]
    fn upsert_and_get() {
        let mut store = MemoryStore::new();
        store.upsert(entity("task-1")).unwrap();

        let found = store.get("task-1").unwrap().unwrap();
        assert_eq!(found.id, "task-1");
        assert!(store.get("task-2").unwrap().is_none());
    }

    #[test]
    fn get_returns_tombstones() {
        let mut store = MemoryStore::new();
        let mut dead = entity("task-1");
        dead.mark_deleted("t1");
        store.upsert(dead).unwrap();

        let found = store.get("task-1").unwrap().unwrap();
        assert!(found.deleted);
    }

    #[test]
    fn list_active_excludes_tombstones_and_sorts() {
        let mut store = MemoryStore::new();
        store.upsert(entity("b")).unwrap();
        store.upsert(entity("a")).unwrap();
        let mut dead = entity("c");
        dead.mark_deleted("t1");
        store.upsert(dead).unwrap();

        let active = store.list_active().unwrap();
        let ids: Vec<&str> = active.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn ledger_records_once() {
        let mut store = MemoryStore::new();
        assert!(!store.contains("op-1").unwrap());

        store.record("op-1").unwrap();
        assert!(store.contains("op-1").unwrap());
        assert!(store.record("op-1").is_err());
        assert_eq!(store.ledger_len(), 1);
    }

    #[test]
    fn commit_writes_entity_and_ledger_together() {
        let mut store = MemoryStore::new();
        store.commit(Some(entity("task-1")), "op-1").unwrap();

        assert!(store.get("task-1").unwrap().is_some());
        assert!(store.contains("op-1").unwrap());
    }

    #[test]
    fn commit_without_write_records_ledger_only() {
        let mut store = MemoryStore::new();
        store.commit(None, "op-1").unwrap();

        assert_eq!(store.entity_count(), 0);
        assert!(store.contains("op-1").unwrap());
    }

    #[test]
    fn failed_commit_leaves_no_trace() {
        let mut store = MemoryStore::new();
        store.fail_next_commits(1);

        let err = store.commit(Some(entity("task-1")), "op-1");
        assert!(err.is_err());
        assert!(store.get("task-1").unwrap().is_none());
        assert!(!store.contains("op-1").unwrap());

        // Retry succeeds once the fault clears
        store.commit(Some(entity("task-1")), "op-1").unwrap();
        assert!(store.contains("op-1").unwrap());
    }

    #[test]
    fn commit_rejects_recorded_op() {
        let mut store = MemoryStore::new();
        store.commit(None, "op-1").unwrap();

        assert!(store.commit(Some(entity("task-1")), "op-1").is_err());
        assert!(store.get("task-1").unwrap().is_none());
    }
}
