//! Sync sessions: batch orchestration and response assembly.
//!
//! A session processes one client batch in arrival order. Operation
//! failures are isolated: a validation error or store fault skips that
//! operation and the batch keeps going. Skipped operations are simply
//! absent from `acknowledgedOps`, which is the retry signal clients act on.

use crate::{
    error::Result, ClientId, Conflict, EntityView, Operation, OperationId, Outcome, Reconciler,
    SyncStore,
};
use serde::{Deserialize, Serialize};

/// One batch of operations uploaded by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Stable identifier of the submitting client
    pub client_id: ClientId,
    /// Operations in the order the client performed them
    pub operations: Vec<Operation>,
}

/// The authoritative reply to a sync request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    /// Ids of operations durably processed in this or any earlier call.
    /// Clients drop acknowledged operations from their outbound queue.
    pub acknowledged_ops: Vec<OperationId>,
    /// Full snapshot of live entities, deleted ones excluded
    pub server_state: Vec<EntityView>,
    /// Business-rule rejections from this call
    pub conflicts: Vec<Conflict>,
}

/// Processes sync batches against a [`SyncStore`].
pub struct SyncSession<S> {
    reconciler: Reconciler<S>,
}

impl<S: SyncStore> SyncSession<S> {
    /// Create a session over the given store.
    pub fn new(store: S) -> Self {
        Self {
            reconciler: Reconciler::new(store),
        }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        self.reconciler.store()
    }

    /// Process one batch and assemble the response.
    ///
    /// Conflicted operations are acknowledged alongside applied ones; the
    /// conflict entry tells the client why its change was rejected. The
    /// snapshot is read after the whole batch, so it reflects every
    /// accepted mutation including ones that later ops conflicted with.
    pub fn sync(&mut self, request: &SyncRequest) -> Result<SyncResponse> {
        let mut acknowledged_ops = Vec::with_capacity(request.operations.len());
        let mut conflicts = Vec::new();

        for op in &request.operations {
            match self.reconciler.apply(op) {
                Ok(Outcome::Applied) | Ok(Outcome::Duplicate) => {
                    acknowledged_ops.push(op.op_id.clone());
                }
                Ok(Outcome::Conflicted(conflict)) => {
                    acknowledged_ops.push(op.op_id.clone());
                    conflicts.push(conflict);
                }
                // Not acknowledged: the client corrects it or retries it
                Err(_) => {}
            }
        }

        let server_state = self
            .reconciler
            .store()
            .list_active()
            .map_err(crate::Error::from)?
            .iter()
            .map(EntityView::from)
            .collect();

        Ok(SyncResponse {
            acknowledged_ops,
            server_state,
            conflicts,
        })
    }
}
