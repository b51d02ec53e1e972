//! Transaction store trait and change-stream types.

use crate::error::Result;
use crate::state::{Invoice, InvoiceTransaction, TransactionId, TransactionStatus};

/// A record flowing through the store's change stream.
///
/// The transaction and invoice tables share one stream, so consumers match
/// on the record kind before acting.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRecord {
    /// An import transaction record.
    Transaction(InvoiceTransaction),

    /// A derived invoice business record.
    Invoice(Invoice),
}

/// One change-stream notification.
///
/// The store emits exactly one change per insert and one per remove,
/// including TTL-driven eviction. Removals carry the record's last stored
/// image, which is how the expiry adapter learns the last-known status.
#[derive(Debug, Clone, PartialEq)]
pub enum TableChange {
    /// A record was inserted.
    Inserted(TableRecord),

    /// A record was removed, explicitly or by TTL.
    Removed(TableRecord),
}

/// Durable keyed store for in-flight import transactions.
///
/// # Implementation Notes
///
/// - `transition` is the **sole** mutation primitive; there is no
///   unconditional update path, so racing triggers cannot silently clobber
///   each other.
/// - Records past `expires_at` are eligible for automatic eviction, which
///   must surface on the change stream like any other removal.
pub trait TransactionStore: Send + Sync {
    /// Insert a new transaction record.
    ///
    /// # Errors
    ///
    /// - `ImportError::AlreadyExists` if the id collides
    /// - `ImportError::Store` on backend failure
    fn create(
        &self,
        txn: &InvoiceTransaction,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Fetch a transaction by id.
    ///
    /// # Errors
    ///
    /// - `ImportError::NotFound` if no record exists
    /// - `ImportError::Store` on backend failure
    fn get(
        &self,
        id: TransactionId,
    ) -> impl std::future::Future<Output = Result<InvoiceTransaction>> + Send;

    /// Atomically advance `id` from `expected` to `next`.
    ///
    /// The write applies only if the stored status equals `expected` at
    /// write time.
    ///
    /// # Errors
    ///
    /// - `ImportError::PreconditionFailed` if the stored status differs
    /// - `ImportError::NotFound` if the record vanished
    /// - `ImportError::Store` on backend failure
    fn transition(
        &self,
        id: TransactionId,
        expected: TransactionStatus,
        next: TransactionStatus,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
