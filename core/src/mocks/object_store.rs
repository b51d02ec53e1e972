//! Mock object store for testing.

use crate::error::{ImportError, Result};
use crate::state::TransactionId;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    objects: HashMap<TransactionId, Vec<u8>>,
    presigned: Vec<TransactionId>,
    deleted: Vec<TransactionId>,
}

/// Mock object store.
///
/// In-memory key → bytes map. Presigned URLs are URL-shaped strings
/// carrying a random token; uploads are seeded through [`Self::put`].
#[derive(Debug, Clone, Default)]
pub struct MockObjectStore {
    inner: Arc<Mutex<Inner>>,
}

impl MockObjectStore {
    /// Create a new mock object store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an uploaded object, as if the client had used its credential.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn put(&self, key: TransactionId, bytes: Vec<u8>) -> Result<()> {
        self.lock()?.objects.insert(key, bytes);
        Ok(())
    }

    /// How many times `key` was deleted.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn delete_count(&self, key: TransactionId) -> Result<usize> {
        Ok(self.lock()?.deleted.iter().filter(|k| **k == key).count())
    }

    /// Keys a PUT credential was issued for, in issuance order.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn presigned_keys(&self) -> Result<Vec<TransactionId>> {
        Ok(self.lock()?.presigned.clone())
    }

    /// Whether an object for `key` is currently stored.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn contains(&self, key: TransactionId) -> Result<bool> {
        Ok(self.lock()?.objects.contains_key(&key))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| ImportError::ObjectStore {
            reason: "lock poisoned".to_string(),
        })
    }
}

impl crate::providers::ObjectStore for MockObjectStore {
    fn presign_put(
        &self,
        key: &TransactionId,
        expires_in: Duration,
    ) -> impl Future<Output = Result<String>> + Send {
        let inner = Arc::clone(&self.inner);
        let key = *key;

        async move {
            let mut inner = inner.lock().map_err(|_| ImportError::ObjectStore {
                reason: "lock poisoned".to_string(),
            })?;
            inner.presigned.push(key);

            let token = URL_SAFE_NO_PAD.encode(rand::random::<[u8; 24]>());
            Ok(format!(
                "https://uploads.example.test/{key}?token={token}&expires={}",
                expires_in.num_seconds()
            ))
        }
    }

    fn get(&self, key: &TransactionId) -> impl Future<Output = Result<Vec<u8>>> + Send {
        let inner = Arc::clone(&self.inner);
        let key = *key;

        async move {
            inner
                .lock()
                .map_err(|_| ImportError::ObjectStore {
                    reason: "lock poisoned".to_string(),
                })?
                .objects
                .get(&key)
                .cloned()
                .ok_or_else(|| ImportError::ObjectStore {
                    reason: format!("no object for key {key}"),
                })
        }
    }

    fn delete(&self, key: &TransactionId) -> impl Future<Output = Result<()>> + Send {
        let inner = Arc::clone(&self.inner);
        let key = *key;

        async move {
            let mut inner = inner.lock().map_err(|_| ImportError::ObjectStore {
                reason: "lock poisoned".to_string(),
            })?;
            inner.objects.remove(&key);
            inner.deleted.push(key);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::providers::ObjectStore as _;

    #[tokio::test]
    async fn presigned_url_is_bound_to_key() {
        let store = MockObjectStore::new();
        let key = TransactionId::new();

        let url = store
            .presign_put(&key, Duration::seconds(300))
            .await
            .expect("presign");

        assert!(url.contains(&key.to_string()));
        assert!(url.contains("expires=300"));
        assert_eq!(store.presigned_keys().expect("keys"), vec![key]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MockObjectStore::new();
        let key = TransactionId::new();
        store.put(key, b"{}".to_vec()).expect("put");

        store.delete(&key).await.expect("first delete");
        store.delete(&key).await.expect("second delete");

        assert!(!store.contains(key).expect("contains"));
        assert_eq!(store.delete_count(key).expect("count"), 2);
    }
}
