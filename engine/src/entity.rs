//! Entity state tracked by the sync engine.

use crate::{EntityId, Payload, Version};
use serde::{Deserialize, Serialize};

/// A synced entity as the server stores it.
///
/// Deleted entities stay in the store as tombstones so that late updates
/// from offline clients can be rejected instead of recreating lost data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Unique identifier for this entity
    pub id: EntityId,
    /// Display title
    pub title: String,
    /// Longer free-form description
    pub description: String,
    /// Client-supplied wall-clock time of the last accepted mutation
    pub updated_at: String,
    /// Version number, incremented by exactly one on each accepted mutation
    pub version: Version,
    /// Soft delete flag (tombstone)
    pub deleted: bool,
}

impl Entity {
    /// Create a new active entity at version 1.
    pub fn new(
        id: impl Into<EntityId>,
        title: impl Into<String>,
        description: impl Into<String>,
        updated_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            updated_at: updated_at.into(),
            version: 1,
            deleted: false,
        }
    }

    /// Check if the entity is live (not tombstoned).
    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Apply a partial payload: fields present in the payload replace the
    /// stored values, absent fields keep theirs. Bumps the version.
    pub fn merge_payload(&mut self, payload: &Payload, timestamp: &str) {
        if let Some(title) = &payload.title {
            self.title = title.clone();
        }
        if let Some(description) = &payload.description {
            self.description = description.clone();
        }
        self.updated_at = timestamp.to_string();
        self.version += 1;
    }

    /// Mark the entity as deleted (tombstone). Bumps the version.
    pub fn mark_deleted(&mut self, timestamp: &str) {
        self.deleted = true;
        self.updated_at = timestamp.to_string();
        self.version += 1;
    }
}

/// The client-facing projection of an entity.
///
/// This is what `serverState` carries on the wire: tombstones are excluded
/// from snapshots, so the delete flag is not part of the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityView {
    /// Unique identifier for this entity
    pub id: EntityId,
    /// Display title
    pub title: String,
    /// Longer free-form description
    pub description: String,
    /// Client-supplied wall-clock time of the last accepted mutation
    pub updated_at: String,
    /// Current server version
    pub version: Version,
}

impl From<&Entity> for EntityView {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            title: entity.title.clone(),
            description: entity.description.clone(),
            updated_at: entity.updated_at.clone(),
            version: entity.version,
        }
    }
}
