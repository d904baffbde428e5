//! Sync handler - applies client batches with exactly-once semantics.

use crate::db;
use crate::error::Result;
use mend_engine::{
    transition, EntityView, Operation, Outcome, SyncRequest, SyncResponse, Transition,
};
use sqlx::PgPool;

/// A single operation's failure, isolated from the rest of the batch.
#[derive(Debug, thiserror::Error)]
enum OpError {
    /// Malformed operation; the client must correct it before resubmitting
    #[error(transparent)]
    Invalid(#[from] mend_engine::Error),

    /// Transient database fault; the client retries the operation verbatim
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

/// Process one sync batch.
///
/// Operations run in arrival order, each in its own short transaction, so
/// one failure never poisons the rest. Failed operations are left out of
/// `acknowledgedOps`, which is the signal clients act on. The snapshot is
/// read after the whole batch and reflects every accepted mutation.
pub async fn handle_sync(pool: &PgPool, request: SyncRequest) -> Result<SyncResponse> {
    let mut acknowledged_ops = Vec::with_capacity(request.operations.len());
    let mut conflicts = Vec::new();

    for op in &request.operations {
        match apply_operation(pool, op).await {
            Ok(Outcome::Applied) | Ok(Outcome::Duplicate) => {
                acknowledged_ops.push(op.op_id.clone());
            }
            Ok(Outcome::Conflicted(conflict)) => {
                tracing::debug!(
                    op_id = %op.op_id,
                    entity_id = %op.entity_id,
                    reason = %conflict.reason,
                    "operation conflicted"
                );
                acknowledged_ops.push(op.op_id.clone());
                conflicts.push(conflict);
            }
            Err(OpError::Invalid(e)) => {
                tracing::warn!(
                    op_id = %op.op_id,
                    kind = %op.kind,
                    error = %e,
                    "skipping invalid operation"
                );
            }
            Err(OpError::Store(e)) => {
                tracing::error!(
                    op_id = %op.op_id,
                    error = %e,
                    "operation failed, leaving it unacknowledged"
                );
            }
        }
    }

    let server_state: Vec<EntityView> = db::list_active_entities(pool)
        .await?
        .iter()
        .map(EntityView::from)
        .collect();

    tracing::info!(
        client_id = %request.client_id,
        operations = request.operations.len(),
        acknowledged = acknowledged_ops.len(),
        conflicts = conflicts.len(),
        "sync batch processed"
    );

    Ok(SyncResponse {
        acknowledged_ops,
        server_state,
        conflicts,
    })
}

/// Apply a single operation inside its own transaction.
///
/// Writers serialize on the target entity id before anything reads: a row
/// lock alone cannot cover an id that has no row yet, which would let two
/// first creates of one entity both write version 1. Behind the id lock,
/// the ledger check, the entity write, and the ledger insert commit as one
/// unit: the operation lands fully or not at all. Losing the ledger race
/// to a concurrent submission of the same id rolls back our write and
/// reports a duplicate.
async fn apply_operation(pool: &PgPool, op: &Operation) -> std::result::Result<Outcome, OpError> {
    let mut tx = pool.begin().await?;

    db::lock_entity(&mut tx, &op.entity_id).await?;

    if db::op_exists(&mut tx, &op.op_id).await? {
        return Ok(Outcome::Duplicate);
    }

    let current = db::get_entity_for_update(&mut tx, &op.entity_id).await?;

    if let (Some(base), Some(entity)) = (op.base_version, current.as_ref()) {
        if base != entity.version {
            tracing::debug!(
                op_id = %op.op_id,
                base_version = base,
                server_version = entity.version,
                "stale base version, last writer wins"
            );
        }
    }

    let decision = transition(current.as_ref(), op)?;
    if let Transition::Write(entity) = &decision {
        db::upsert_entity(&mut tx, entity).await?;
    }

    match db::record_op(&mut tx, &op.op_id).await {
        Ok(()) => {}
        Err(e) if db::is_unique_violation(&e) => return Ok(Outcome::Duplicate),
        Err(e) => return Err(OpError::Store(e)),
    }

    tx.commit().await?;

    Ok(match decision {
        Transition::Conflict(conflict) => Outcome::Conflicted(conflict),
        _ => Outcome::Applied,
    })
}
