//! Operation types for expressing client intent.
//!
//! Changes arrive as operations, not direct mutations. Each operation
//! carries a globally unique id so the engine can apply it exactly once
//! no matter how many times an unreliable client resubmits it.

use crate::{EntityId, OperationId, Version};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of mutation an operation requests.
///
/// Unrecognized type strings are preserved as [`OpKind::Unknown`] so a
/// single malformed operation can be rejected on its own instead of
/// failing the whole batch at the parsing stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Update,
    Delete,
    /// Any type string this engine does not understand
    Unknown(String),
}

impl OpKind {
    /// Wire representation of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            OpKind::Create => "CREATE",
            OpKind::Update => "UPDATE",
            OpKind::Delete => "DELETE",
            OpKind::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OpKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OpKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "CREATE" => OpKind::Create,
            "UPDATE" => OpKind::Update,
            "DELETE" => OpKind::Delete,
            _ => OpKind::Unknown(raw),
        })
    }
}

/// Field values carried by CREATE and UPDATE operations.
///
/// Fields left as `None` keep their stored values (partial merge).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Payload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title field.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description field.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A single client-originated operation against one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Globally unique idempotency key
    pub op_id: OperationId,
    /// Entity this operation targets
    pub entity_id: EntityId,
    /// Requested mutation kind
    #[serde(rename = "type")]
    pub kind: OpKind,
    /// Field values to apply; required for CREATE and UPDATE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    /// Client wall-clock time, recorded for display but never consulted
    /// for ordering
    pub timestamp: String,
    /// Version the client believed it was editing; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_version: Option<Version>,
}

impl Operation {
    /// Create a new CREATE operation.
    pub fn create(
        op_id: impl Into<OperationId>,
        entity_id: impl Into<EntityId>,
        payload: Payload,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            op_id: op_id.into(),
            entity_id: entity_id.into(),
            kind: OpKind::Create,
            payload: Some(payload),
            timestamp: timestamp.into(),
            base_version: None,
        }
    }

    /// Create a new UPDATE operation.
    pub fn update(
        op_id: impl Into<OperationId>,
        entity_id: impl Into<EntityId>,
        payload: Payload,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            op_id: op_id.into(),
            entity_id: entity_id.into(),
            kind: OpKind::Update,
            payload: Some(payload),
            timestamp: timestamp.into(),
            base_version: None,
        }
    }

    /// Create a new DELETE operation. Deletes carry no payload.
    pub fn delete(
        op_id: impl Into<OperationId>,
        entity_id: impl Into<EntityId>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            op_id: op_id.into(),
            entity_id: entity_id.into(),
            kind: OpKind::Delete,
            payload: None,
            timestamp: timestamp.into(),
            base_version: None,
        }
    }

    /// Set the version this operation was based on.
    pub fn with_base_version(mut self, version: Version) -> Self {
        self.base_version = Some(version);
        self
    }
}
