//! Error types for the invoice import lifecycle.

use crate::state::{TransactionId, TransactionStatus};
use thiserror::Error;

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Error taxonomy for the import lifecycle.
///
/// Only the infrastructure variants (`Store`, `ObjectStore`, `Payload`) may
/// fail a trigger adapter invocation; everything else is an in-band outcome
/// the engine converts into a client-visible status or swallows outright.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImportError {
    // ═══════════════════════════════════════════════════════════
    // Transaction Outcomes
    // ═══════════════════════════════════════════════════════════

    /// The referenced transaction has no record.
    ///
    /// Reported to the client as a `NOT_FOUND` status where a session is
    /// known; never retried by the engine.
    #[error("transaction {id} not found")]
    NotFound {
        /// The id with no record.
        id: TransactionId,
    },

    /// A record with this id already exists.
    ///
    /// Must not occur under correct id generation; handled defensively.
    #[error("transaction {id} already exists")]
    AlreadyExists {
        /// The colliding id.
        id: TransactionId,
    },

    /// A conditional transition lost a race: the stored status no longer
    /// matched the expected source state at write time.
    ///
    /// Swallowed by trigger adapters; the winning path owns notification.
    #[error("transaction {id}: expected status {expected}, found {actual}")]
    PreconditionFailed {
        /// The contested transaction.
        id: TransactionId,
        /// Status the caller expected to find.
        expected: TransactionStatus,
        /// Status actually stored at write time.
        actual: TransactionStatus,
    },

    /// Business-rule rejection of the uploaded document.
    #[error("invalid invoice: {reason}")]
    Validation {
        /// Human-readable rejection reason.
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Infrastructure
    // ═══════════════════════════════════════════════════════════

    /// The uploaded object could not be decoded as an invoice payload.
    #[error("undecodable payload: {reason}")]
    Payload {
        /// Decoder message.
        reason: String,
    },

    /// The transaction store failed or rejected malformed input.
    #[error("store error: {reason}")]
    Store {
        /// Underlying failure.
        reason: String,
    },

    /// The object store failed.
    #[error("object store error: {reason}")]
    ObjectStore {
        /// Underlying failure.
        reason: String,
    },

    /// A status message or termination could not reach the gateway.
    ///
    /// Logged, never escalated; a vanished session is not an error at all
    /// (see [`Delivery::SessionGone`](crate::providers::Delivery)).
    #[error("delivery error: {reason}")]
    Delivery {
        /// Underlying failure.
        reason: String,
    },

    /// The audit bus rejected an event.
    ///
    /// Fire-and-forget: logged by the engine, never propagated.
    #[error("audit emit failed: {reason}")]
    Audit {
        /// Underlying failure.
        reason: String,
    },
}

impl ImportError {
    /// Whether this error is an infrastructure fault that should fail the
    /// adapter invocation and trigger the host's own retry.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Store { .. } | Self::ObjectStore { .. } | Self::Payload { .. }
        )
    }

    /// Whether this error is a lost transition race.
    #[must_use]
    pub const fn is_race_loss(&self) -> bool {
        matches!(self, Self::PreconditionFailed { .. })
    }
}
