//! Integration tests for the sync protocol.
//!
//! These tests exercise the wire format and batch semantics the /sync
//! endpoint exposes, using the in-memory store. No database required.

use mend_engine::{
    Conflict, ConflictReason, MemoryStore, OpKind, Operation, Payload, SyncRequest, SyncSession,
};

/// Test helper to create a CREATE operation.
fn create_test_op(op_id: &str, entity_id: &str) -> Operation {
    Operation::create(
        op_id,
        entity_id,
        Payload::new().title("Test todo").description("Written offline"),
        "2024-01-31T12:00:00Z",
    )
}

#[cfg(test)]
mod protocol_tests {
    use super::*;

    #[test]
    fn test_operation_serialization() {
        let op = create_test_op("op-1", "todo-1");

        let json = serde_json::to_string(&op).unwrap();
        let parsed: Operation = serde_json::from_str(&json).unwrap();

        assert_eq!(op, parsed);
        assert!(json.contains("\"opId\":\"op-1\""));
        assert!(json.contains("\"entityId\":\"todo-1\""));
        assert!(json.contains("\"type\":\"CREATE\""));
    }

    #[test]
    fn test_sync_request_deserialization() {
        let json = r#"{
            "clientId": "device-123",
            "operations": [
                {
                    "opId": "op-1",
                    "entityId": "todo-1",
                    "type": "CREATE",
                    "payload": {"title": "Test", "description": "From the wire"},
                    "timestamp": "2024-01-31T12:00:00Z",
                    "baseVersion": null
                },
                {
                    "opId": "op-2",
                    "entityId": "todo-1",
                    "type": "DELETE",
                    "payload": null,
                    "timestamp": "2024-01-31T12:01:00Z"
                }
            ]
        }"#;

        let request: SyncRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.client_id, "device-123");
        assert_eq!(request.operations.len(), 2);
        assert_eq!(request.operations[0].kind, OpKind::Create);
        assert_eq!(request.operations[0].base_version, None);
        assert_eq!(request.operations[1].kind, OpKind::Delete);
        assert_eq!(request.operations[1].payload, None);
    }

    #[test]
    fn test_unknown_op_type_still_parses() {
        // Newer clients may send kinds this build does not know. Parsing
        // must succeed so the rest of the batch is still processed.
        let json = r#"{
            "clientId": "device-123",
            "operations": [
                {
                    "opId": "op-1",
                    "entityId": "todo-1",
                    "type": "ARCHIVE",
                    "payload": null,
                    "timestamp": "2024-01-31T12:00:00Z"
                }
            ]
        }"#;

        let request: SyncRequest = serde_json::from_str(json).unwrap();

        assert_eq!(
            request.operations[0].kind,
            OpKind::Unknown("ARCHIVE".to_string())
        );
    }

    #[test]
    fn test_delete_serializes_without_payload() {
        let op = Operation::delete("op-3", "todo-1", "2024-01-31T12:00:00Z");

        let json = serde_json::to_string(&op).unwrap();

        assert!(json.contains("\"type\":\"DELETE\""));
        assert!(!json.contains("\"payload\""));
    }

    #[test]
    fn test_sync_response_serialization() {
        let mut session = SyncSession::new(MemoryStore::new());
        let request = SyncRequest {
            client_id: "device-123".to_string(),
            operations: vec![
                create_test_op("op-1", "todo-1"),
                Operation::update("op-2", "ghost", Payload::new().title("x"), "t1"),
            ],
        };

        let response = session.sync(&request).unwrap();
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"acknowledgedOps\":[\"op-1\",\"op-2\"]"));
        assert!(json.contains("\"serverState\""));
        assert!(json.contains("\"entityId\":\"ghost\""));
        assert!(json.contains("\"reason\":\"Item not found\""));
        // Snapshots never expose the tombstone flag
        assert!(!json.contains("\"deleted\""));
    }

    #[test]
    fn test_conflict_reason_wire_strings() {
        let conflicts = vec![
            Conflict::new("todo-1", ConflictReason::NotFound),
            Conflict::new("todo-2", ConflictReason::UpdateOnDeleted),
        ];

        let json = serde_json::to_string(&conflicts).unwrap();

        assert!(json.contains("\"Item not found\""));
        assert!(json.contains("\"Cannot update deleted item\""));
    }

    #[test]
    fn test_replayed_request_acknowledges_identically() {
        let mut session = SyncSession::new(MemoryStore::new());
        let request = SyncRequest {
            client_id: "device-123".to_string(),
            operations: vec![
                create_test_op("op-1", "todo-1"),
                Operation::update("op-2", "todo-1", Payload::new().title("Renamed"), "t1"),
            ],
        };

        let first = session.sync(&request).unwrap();
        let replay = session.sync(&request).unwrap();

        assert_eq!(first.acknowledged_ops, replay.acknowledged_ops);
        assert_eq!(first.server_state, replay.server_state);
        assert_eq!(replay.server_state[0].version, 2);
    }

    #[test]
    fn test_full_sync_cycle_over_the_wire() {
        // Parse a request exactly as the handler receives it, process it,
        // and check the reply a client would read back.
        let json = r#"{
            "clientId": "device-123",
            "operations": [
                {
                    "opId": "op-1",
                    "entityId": "todo-1",
                    "type": "CREATE",
                    "payload": {"title": "Test", "description": "From the wire"},
                    "timestamp": "2024-01-31T12:00:00Z"
                },
                {
                    "opId": "op-2",
                    "entityId": "todo-1",
                    "type": "UPDATE",
                    "payload": {"title": "Renamed"},
                    "timestamp": "2024-01-31T12:05:00Z",
                    "baseVersion": 1
                }
            ]
        }"#;

        let request: SyncRequest = serde_json::from_str(json).unwrap();
        let mut session = SyncSession::new(MemoryStore::new());
        let response = session.sync(&request).unwrap();

        let reply = serde_json::to_value(&response).unwrap();
        assert_eq!(reply["acknowledgedOps"], serde_json::json!(["op-1", "op-2"]));
        assert_eq!(reply["serverState"][0]["title"], "Renamed");
        assert_eq!(reply["serverState"][0]["description"], "From the wire");
        assert_eq!(reply["serverState"][0]["version"], 2);
        assert_eq!(reply["conflicts"], serde_json::json!([]));
    }
}
