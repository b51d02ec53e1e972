//! Client notifier trait.

use crate::error::Result;
use crate::state::{SessionId, TransactionId, TransactionStatus};
use serde::{Deserialize, Serialize};

/// Status message pushed to a client over its persistent session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    /// The transaction the status refers to.
    pub transaction_id: TransactionId,

    /// The status to report.
    pub status: TransactionStatus,
}

impl StatusMessage {
    /// Build a status message for one transaction.
    #[must_use]
    pub const fn new(transaction_id: TransactionId, status: TransactionStatus) -> Self {
        Self {
            transaction_id,
            status,
        }
    }
}

/// Delivery result of a best-effort gateway operation.
///
/// A vanished session is an expected outcome, not an error: transactions
/// outlive connections, so late notifications routinely find nobody home.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The gateway accepted the operation.
    Sent,

    /// The session is no longer connected.
    SessionGone,
}

/// Gateway-facing notifier for a specific client session.
///
/// All operations are best-effort: callers log failures and continue. The
/// at-most-one terminal notify+terminate guarantee per transaction is
/// enforced upstream by the store's conditional write, not here.
pub trait ClientNotifier: Send + Sync {
    /// Push a status message to `session`.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Delivery` only on transport failure; a missing
    /// session yields `Ok(Delivery::SessionGone)`.
    fn notify(
        &self,
        session: &SessionId,
        message: &StatusMessage,
    ) -> impl std::future::Future<Output = Result<Delivery>> + Send;

    /// Push a raw JSON payload to `session`.
    ///
    /// Used for the credential grant, whose shape is not a status message.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Delivery` only on transport failure.
    fn send_data(
        &self,
        session: &SessionId,
        data: String,
    ) -> impl std::future::Future<Output = Result<Delivery>> + Send;

    /// Close `session` after a terminal notification has been sent.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Delivery` only on transport failure; an
    /// already-closed session yields `Ok(Delivery::SessionGone)`.
    fn terminate(
        &self,
        session: &SessionId,
    ) -> impl std::future::Future<Output = Result<Delivery>> + Send;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn status_message_wire_shape() {
        let id = TransactionId::new();
        let message = StatusMessage::new(id, TransactionStatus::Received);
        let json = serde_json::to_value(&message).expect("serializes");

        assert_eq!(json["transactionId"], serde_json::json!(id.0.to_string()));
        assert_eq!(json["status"], "RECEIVED");
    }
}
