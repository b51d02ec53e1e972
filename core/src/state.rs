//! Invoice import state types.
//!
//! This module defines the central entities of the import pipeline: the
//! tracked transaction, its status state machine, the uploaded payload, and
//! the business record derived from a successful import. All types are
//! `Clone` to support the functional architecture pattern.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for an import transaction.
///
/// The same value keys the upload credential, the storage object, and the
/// transaction record, so every trigger source can correlate back to one
/// import attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub uuid::Uuid);

impl TransactionId {
    /// Generate a new random `TransactionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a client's persistent gateway connection.
///
/// Issued by the connection gateway, opaque to the engine. A transaction
/// remembers the session that created it; the binding is not re-validated
/// later, so a transaction survives connection churn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Wrap a gateway-issued connection id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw connection id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Status State Machine
// ═══════════════════════════════════════════════════════════════════════

/// Status of an import transaction.
///
/// Stored statuses only ever move forward along:
///
/// ```text
/// GENERATED → RECEIVED → {PROCESSED | NON_VALID_INVOICE_NUMBER}
/// GENERATED → {CANCELLED | TIMEOUT}
/// ```
///
/// `NotFound` is never stored; it is pushed to a client when a referenced
/// transaction has no record (late or duplicate triggers after cleanup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Upload credential issued, waiting for the object or a cancel.
    #[serde(rename = "GENERATED")]
    Generated,

    /// Upload completed, payload being validated.
    #[serde(rename = "RECEIVED")]
    Received,

    /// Payload validated and the invoice record persisted.
    #[serde(rename = "PROCESSED")]
    Processed,

    /// Payload rejected: invoice number below the minimum length.
    #[serde(rename = "NON_VALID_INVOICE_NUMBER")]
    NonValidInvoiceNumber,

    /// Client cancelled before the upload arrived.
    #[serde(rename = "CANCELLED")]
    Cancelled,

    /// Record reclaimed by the store's expiry mechanism while `Generated`.
    #[serde(rename = "TIMEOUT")]
    TimedOut,

    /// Notification-only value: no record exists for the referenced id.
    #[serde(rename = "NOT_FOUND")]
    NotFound,
}

impl TransactionStatus {
    /// Wire name of the status, as pushed to clients.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "GENERATED",
            Self::Received => "RECEIVED",
            Self::Processed => "PROCESSED",
            Self::NonValidInvoiceNumber => "NON_VALID_INVOICE_NUMBER",
            Self::Cancelled => "CANCELLED",
            Self::TimedOut => "TIMEOUT",
            Self::NotFound => "NOT_FOUND",
        }
    }

    /// Whether this status permits no further transition.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Processed | Self::NonValidInvoiceNumber | Self::Cancelled | Self::TimedOut
        )
    }

    /// Whether `next` is a valid forward edge from this status.
    ///
    /// `NotFound` participates in no edge in either direction.
    #[must_use]
    pub const fn can_advance_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Generated, Self::Received)
                | (Self::Generated, Self::Cancelled)
                | (Self::Generated, Self::TimedOut)
                | (Self::Received, Self::Processed)
                | (Self::Received, Self::NonValidInvoiceNumber)
        )
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Core Entities
// ═══════════════════════════════════════════════════════════════════════

/// One tracked import attempt, from credential issuance to terminal outcome.
///
/// Created by the credential trigger, mutated exclusively through the store's
/// conditional transition, and either left terminal for history or reclaimed
/// by TTL while still `Generated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTransaction {
    /// Transaction id; also the storage object key.
    pub id: TransactionId,

    /// Current status; the only mutable field after creation.
    pub status: TransactionStatus,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// When the record becomes eligible for TTL eviction.
    pub expires_at: DateTime<Utc>,

    /// The client session bound at creation time.
    pub session_id: SessionId,

    /// Opaque correlation id of the originating request, for tracing.
    pub request_context: String,
}

impl InvoiceTransaction {
    /// Create a freshly issued transaction in `Generated` state.
    #[must_use]
    pub fn issue(
        session_id: SessionId,
        request_context: String,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            status: TransactionStatus::Generated,
            created_at: now,
            expires_at: now + ttl,
            session_id,
            request_context,
        }
    }

    /// Whether the record is past its expiry window at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The uploaded document, JSON-decoded from the storage object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    /// Customer the invoice belongs to.
    pub customer_name: String,

    /// Document number; must meet the minimum length to be accepted.
    pub invoice_number: String,

    /// Invoice total.
    pub total_value: f64,

    /// Referenced product.
    pub product_id: String,

    /// Ordered quantity.
    pub quantity: u32,
}

/// The business record derived from a successfully imported payload.
///
/// Keyed by (customer, invoice number). Created once per successful
/// transaction, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Customer the invoice belongs to.
    pub customer_name: String,

    /// Document number.
    pub invoice_number: String,

    /// Invoice total.
    pub total_value: f64,

    /// Referenced product.
    pub product_id: String,

    /// Ordered quantity.
    pub quantity: u32,

    /// The import transaction that produced this record.
    pub transaction_id: TransactionId,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Build the business record from a validated payload.
    #[must_use]
    pub fn from_payload(
        payload: &InvoicePayload,
        transaction_id: TransactionId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_name: payload.customer_name.clone(),
            invoice_number: payload.invoice_number.clone(),
            total_value: payload.total_value,
            product_id: payload.product_id.clone(),
            quantity: payload.quantity,
            transaction_id,
            created_at: now,
        }
    }
}

/// Output of credential issuance, pushed back over the requesting session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialGrant {
    /// The new transaction's id; also the object key the client must use.
    pub transaction_id: TransactionId,

    /// Credentialed upload URL for the storage object.
    pub url: String,

    /// Seconds until the upload credential stops working.
    pub expires: i64,
}
