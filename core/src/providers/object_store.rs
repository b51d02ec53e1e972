//! Object store trait.

use crate::error::Result;
use crate::state::TransactionId;
use chrono::Duration;

/// Temporary storage for uploaded invoice documents.
///
/// Objects are keyed by transaction id, so the upload-completion callback
/// needs nothing beyond the object key to find its transaction.
pub trait ObjectStore: Send + Sync {
    /// Produce a credentialed PUT URL for `key`, valid for `expires_in`.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::ObjectStore` on backend failure.
    fn presign_put(
        &self,
        key: &TransactionId,
        expires_in: Duration,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Fetch the uploaded bytes for `key`.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::ObjectStore` if the object is missing or the
    /// backend fails.
    fn get(
        &self,
        key: &TransactionId,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// Delete the uploaded object for `key`. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::ObjectStore` on backend failure.
    fn delete(
        &self,
        key: &TransactionId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
