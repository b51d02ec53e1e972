//! Invoice event recorder trait.

use crate::error::Result;
use crate::state::TransactionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in a customer's invoice history.
///
/// Written when an invoice record lands in the table, consumed from the
/// change stream's insert notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceEvent {
    /// Customer the history entry belongs to.
    pub customer_name: String,

    /// Invoice number the entry refers to.
    pub invoice_number: String,

    /// Event type, e.g. `INVOICE_CREATED`.
    pub event_type: String,

    /// The import transaction behind the invoice.
    pub transaction_id: TransactionId,

    /// Referenced product.
    pub product_id: String,

    /// Ordered quantity.
    pub quantity: u32,

    /// Entry timestamp.
    pub created_at: DateTime<Utc>,

    /// When the entry becomes eligible for eviction.
    pub expires_at: DateTime<Utc>,
}

/// Append-only recorder of invoice history entries.
///
/// Failures are logged by the stream adapter and never fail the owning
/// change-stream invocation.
pub trait EventRecorder: Send + Sync {
    /// Append one history entry.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` on backend failure.
    fn record(&self, event: &InvoiceEvent) -> impl std::future::Future<Output = Result<()>> + Send;
}
