//! # Mend Engine
//!
//! An idempotent reconciliation engine for offline-first sync.
//!
//! This crate provides the core logic for merging batches of client
//! operations into authoritative server state. It handles idempotent
//! replay, tombstone semantics, monotonic versioning, and conflict
//! reporting, independent of any transport or storage backend.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of databases, networks, or clocks
//! - **Idempotent**: replaying an already-applied operation never mutates state
//! - **Convergent**: clients that apply the returned snapshot agree with the server
//! - **Testable**: pure logic over a pluggable [`SyncStore`], no mocks needed
//!
//! ## Core Concepts
//!
//! ### Entities
//!
//! Server state is a set of entities keyed by id. Each entity carries a
//! version that increases by exactly one on every accepted mutation, and a
//! soft delete flag. Deleted entities remain as tombstones; they are never
//! resurrected and never physically removed.
//!
//! ### Operations
//!
//! Clients express intent as operations, not direct mutations. Every
//! operation carries a globally unique `opId` used for exactly-once
//! application: the id is recorded in an idempotency ledger the first time
//! the operation is processed, and replays are acknowledged without effect.
//!
//! ### Outcomes
//!
//! Applying an operation yields an explicit [`Outcome`]: `Applied`,
//! `Duplicate`, or `Conflicted` with a reason. Business-rule rejections are
//! ordinary outcomes, not errors; they are recorded in the ledger and
//! reported back so clients can stop retrying.
//!
//! ### Sessions
//!
//! A [`SyncSession`] processes one client batch in arrival order and
//! assembles the wire response: acknowledged operation ids, conflicts, and
//! the authoritative snapshot of live entities.
//!
//! ## Quick Start
//!
//! ```rust
//! use mend_engine::{MemoryStore, Operation, Payload, SyncRequest, SyncSession};
//!
//! let mut session = SyncSession::new(MemoryStore::new());
//!
//! let request = SyncRequest {
//!     client_id: "client-1".into(),
//!     operations: vec![Operation::create(
//!         "op-1",
//!         "entity-1",
//!         Payload::new().title("Groceries").description("Milk and eggs"),
//!         "2024-01-31T12:00:00Z",
//!     )],
//! };
//!
//! let response = session.sync(&request).unwrap();
//! assert_eq!(response.acknowledged_ops, vec!["op-1".to_string()]);
//! assert_eq!(response.server_state.len(), 1);
//! assert_eq!(response.server_state[0].version, 1);
//! ```
//!
//! ## Persistence
//!
//! The engine works against the [`SyncStore`] trait. [`MemoryStore`] is the
//! reference implementation; durable backends reuse the same decision rules
//! through [`reconcile::transition`] and supply their own atomic commit.

pub mod entity;
pub mod error;
pub mod operation;
pub mod outcome;
pub mod reconcile;
pub mod session;
pub mod store;

// Re-export main types at crate root
pub use entity::{Entity, EntityView};
pub use error::{Error, Result, StoreError};
pub use operation::{OpKind, Operation, Payload};
pub use outcome::{Conflict, ConflictReason, Outcome};
pub use reconcile::{transition, Reconciler, Transition};
pub use session::{SyncRequest, SyncResponse, SyncSession};
pub use store::{EntityStore, MemoryStore, OperationLog, SyncStore};

/// Type aliases for clarity
pub type EntityId = String;
pub type OperationId = String;
pub type ClientId = String;
pub type Version = u64;
