//! Invoice repository trait.

use crate::error::Result;
use crate::state::Invoice;

/// Store of derived invoice business records.
///
/// Records are keyed by (customer, invoice number) and never mutated after
/// creation.
pub trait InvoiceRepository: Send + Sync {
    /// Persist a derived invoice record.
    ///
    /// Idempotent upsert on the (customer, number) key: a replayed
    /// completion must not produce a duplicate record.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` on backend failure.
    fn create(&self, invoice: &Invoice) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Look up an invoice by its (customer, number) key.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` on backend failure.
    fn get(
        &self,
        customer_name: &str,
        invoice_number: &str,
    ) -> impl std::future::Future<Output = Result<Option<Invoice>>> + Send;
}
