//! Inbound event shapes for the trigger adapters.
//!
//! Each adapter decodes one external event source into these types before
//! calling the engine.

use invoice_import_core::state::{SessionId, TransactionId};
use serde::{Deserialize, Serialize};

/// A client's request for an upload credential, as delivered by the
/// connection gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    /// The requesting session.
    pub session_id: SessionId,

    /// Opaque correlation id of the gateway invocation.
    pub request_context: String,
}

/// Batch of upload-completion records from the object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEvent {
    /// The completed uploads.
    pub records: Vec<UploadRecord>,
}

/// One completed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    /// The object key, which is the transaction id.
    pub key: TransactionId,

    /// Where the object lives (bucket or container name). Logged for
    /// traceability; the object store provider is already bound to it.
    pub location: String,
}

/// An inbound message on the client command channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCommand {
    /// Command verb; only `cancel` is recognized.
    pub command: String,

    /// The transaction the command refers to.
    pub transaction_id: TransactionId,
}

/// Command verbs on the client channel.
pub mod commands {
    /// Cancel a pending import.
    pub const CANCEL: &str = "cancel";
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn client_command_wire_shape() {
        let json = r#"{"command":"cancel","transactionId":"6e9b7f9e-30bb-4df4-9d52-ad633ec452f7"}"#;
        let command: ClientCommand = serde_json::from_str(json).expect("decodes");
        assert_eq!(command.command, commands::CANCEL);
    }

    #[test]
    fn upload_event_wire_shape() {
        let json = r#"{
            "records": [
                { "key": "6e9b7f9e-30bb-4df4-9d52-ad633ec452f7", "location": "invoice-uploads" }
            ]
        }"#;
        let event: UploadEvent = serde_json::from_str(json).expect("decodes");
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].location, "invoice-uploads");
    }
}
