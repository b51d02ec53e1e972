//! In-memory transaction store with conditional writes, TTL eviction, and a
//! change stream.

use crate::error::{ImportError, Result};
use crate::providers::{
    EventRecorder, InvoiceEvent, InvoiceRepository, TableChange, TableRecord, TransactionStore,
};
use crate::state::{Invoice, InvoiceTransaction, TransactionId, TransactionStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

fn lock_poisoned() -> ImportError {
    ImportError::Store {
        reason: "lock poisoned".to_string(),
    }
}

/// In-memory transaction table.
///
/// Mutation goes through [`TransactionStore::transition`], a conditional
/// write checked under the table lock; there is no unconditional update
/// path. Every insert and remove (TTL eviction included) emits exactly one
/// [`TableChange`] into the change stream.
#[derive(Debug, Clone)]
pub struct MemoryTransactionStore {
    records: Arc<Mutex<HashMap<TransactionId, InvoiceTransaction>>>,
    applied: Arc<Mutex<Vec<(TransactionId, TransactionStatus)>>>,
    changes: mpsc::UnboundedSender<TableChange>,
    stream: Arc<Mutex<Option<mpsc::UnboundedReceiver<TableChange>>>>,
}

impl MemoryTransactionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, stream) = mpsc::unbounded_channel();
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            applied: Arc::new(Mutex::new(Vec::new())),
            changes,
            stream: Arc::new(Mutex::new(Some(stream))),
        }
    }

    /// Take the change-stream receiver.
    ///
    /// The stream has a single consumer (the stream trigger adapter);
    /// subsequent calls return `None`.
    #[must_use]
    pub fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<TableChange>> {
        self.stream.lock().ok()?.take()
    }

    /// Sender half of the change stream, for tables sharing it (the invoice
    /// table in the reference deployment).
    #[must_use]
    pub fn change_sender(&self) -> mpsc::UnboundedSender<TableChange> {
        self.changes.clone()
    }

    /// Remove every record past its expiry window at `now`, emitting one
    /// `Removed` change per record with its last stored image.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` if the table lock is poisoned.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> Result<Vec<InvoiceTransaction>> {
        let mut records = self.records.lock().map_err(|_| lock_poisoned())?;

        let expired: Vec<TransactionId> = records
            .iter()
            .filter(|(_, txn)| txn.is_expired(now))
            .map(|(id, _)| *id)
            .collect();

        let mut evicted = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(txn) = records.remove(&id) {
                let _ = self
                    .changes
                    .send(TableChange::Removed(TableRecord::Transaction(txn.clone())));
                evicted.push(txn);
            }
        }

        Ok(evicted)
    }

    /// Run [`Self::evict_expired`] on a timer.
    ///
    /// Tests drive eviction directly for determinism; long-lived deployments
    /// spawn the sweeper.
    pub fn spawn_ttl_sweeper(&self, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                match store.evict_expired(Utc::now()) {
                    Ok(evicted) if !evicted.is_empty() => {
                        tracing::debug!(count = evicted.len(), "evicted expired transactions");
                    }
                    Ok(_) => {}
                    Err(error) => {
                        tracing::error!(%error, "ttl sweep failed");
                        return;
                    }
                }
            }
        })
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` if the table lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.records.lock().map_err(|_| lock_poisoned())?.len())
    }

    /// Whether the table is empty.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` if the table lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Every transition applied so far, in application order.
    ///
    /// Test hook for asserting that stored status sequences follow the
    /// transition graph.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` if the log lock is poisoned.
    pub fn applied_transitions(&self) -> Result<Vec<(TransactionId, TransactionStatus)>> {
        Ok(self.applied.lock().map_err(|_| lock_poisoned())?.clone())
    }
}

impl Default for MemoryTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStore for MemoryTransactionStore {
    fn create(&self, txn: &InvoiceTransaction) -> impl Future<Output = Result<()>> + Send {
        let records = Arc::clone(&self.records);
        let changes = self.changes.clone();
        let txn = txn.clone();

        async move {
            let mut records = records.lock().map_err(|_| lock_poisoned())?;

            if records.contains_key(&txn.id) {
                return Err(ImportError::AlreadyExists { id: txn.id });
            }

            records.insert(txn.id, txn.clone());
            let _ = changes.send(TableChange::Inserted(TableRecord::Transaction(txn)));
            Ok(())
        }
    }

    fn get(&self, id: TransactionId) -> impl Future<Output = Result<InvoiceTransaction>> + Send {
        let records = Arc::clone(&self.records);

        async move {
            records
                .lock()
                .map_err(|_| lock_poisoned())?
                .get(&id)
                .cloned()
                .ok_or(ImportError::NotFound { id })
        }
    }

    fn transition(
        &self,
        id: TransactionId,
        expected: TransactionStatus,
        next: TransactionStatus,
    ) -> impl Future<Output = Result<()>> + Send {
        let records = Arc::clone(&self.records);
        let applied = Arc::clone(&self.applied);

        async move {
            let mut records = records.lock().map_err(|_| lock_poisoned())?;

            let txn = records
                .get_mut(&id)
                .ok_or(ImportError::NotFound { id })?;

            if txn.status != expected {
                return Err(ImportError::PreconditionFailed {
                    id,
                    expected,
                    actual: txn.status,
                });
            }

            txn.status = next;
            applied.lock().map_err(|_| lock_poisoned())?.push((id, next));
            Ok(())
        }
    }
}

/// In-memory invoice table, keyed by (customer, invoice number).
///
/// Create is an idempotent upsert: a replayed completion finds the key
/// already present and neither rewrites the record nor re-emits an insert
/// change.
#[derive(Debug, Clone)]
pub struct MemoryInvoiceRepository {
    records: Arc<Mutex<HashMap<(String, String), Invoice>>>,
    changes: Option<mpsc::UnboundedSender<TableChange>>,
}

impl MemoryInvoiceRepository {
    /// Create an empty repository without change notifications.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            changes: None,
        }
    }

    /// Create an empty repository sharing `changes` with the transaction
    /// table, so invoice inserts reach the same stream consumer.
    #[must_use]
    pub fn with_change_stream(changes: mpsc::UnboundedSender<TableChange>) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            changes: Some(changes),
        }
    }

    /// Number of stored invoices.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` if the table lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.records.lock().map_err(|_| lock_poisoned())?.len())
    }

    /// Whether the table is empty.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` if the table lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryInvoiceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceRepository for MemoryInvoiceRepository {
    fn create(&self, invoice: &Invoice) -> impl Future<Output = Result<()>> + Send {
        let records = Arc::clone(&self.records);
        let changes = self.changes.clone();
        let invoice = invoice.clone();

        async move {
            let key = (
                invoice.customer_name.clone(),
                invoice.invoice_number.clone(),
            );
            let mut records = records.lock().map_err(|_| lock_poisoned())?;

            if records.contains_key(&key) {
                return Ok(());
            }

            records.insert(key, invoice.clone());
            if let Some(changes) = changes {
                let _ = changes.send(TableChange::Inserted(TableRecord::Invoice(invoice)));
            }
            Ok(())
        }
    }

    fn get(
        &self,
        customer_name: &str,
        invoice_number: &str,
    ) -> impl Future<Output = Result<Option<Invoice>>> + Send {
        let records = Arc::clone(&self.records);
        let key = (customer_name.to_string(), invoice_number.to_string());

        async move {
            Ok(records
                .lock()
                .map_err(|_| lock_poisoned())?
                .get(&key)
                .cloned())
        }
    }
}

/// In-memory invoice history table.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventRecorder {
    events: Arc<Mutex<Vec<InvoiceEvent>>>,
}

impl MemoryEventRecorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries, in append order.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Store` if the table lock is poisoned.
    pub fn events(&self) -> Result<Vec<InvoiceEvent>> {
        Ok(self.events.lock().map_err(|_| lock_poisoned())?.clone())
    }
}

impl EventRecorder for MemoryEventRecorder {
    fn record(&self, event: &InvoiceEvent) -> impl Future<Output = Result<()>> + Send {
        let events = Arc::clone(&self.events);
        let event = event.clone();

        async move {
            events.lock().map_err(|_| lock_poisoned())?.push(event);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::state::SessionId;
    use chrono::Duration;
    use tokio_test::assert_ok;

    fn sample_txn(ttl_secs: i64) -> InvoiceTransaction {
        InvoiceTransaction::issue(
            SessionId::new("conn-1"),
            "req-1".to_string(),
            Utc::now(),
            Duration::seconds(ttl_secs),
        )
    }

    #[tokio::test]
    async fn create_rejects_duplicate_ids() {
        let store = MemoryTransactionStore::new();
        let txn = sample_txn(120);

        tokio_test::assert_ok!(store.create(&txn).await);
        assert_eq!(
            store.create(&txn).await,
            Err(ImportError::AlreadyExists { id: txn.id })
        );
    }

    #[tokio::test]
    async fn conditional_transition_guards_source_state() {
        let store = MemoryTransactionStore::new();
        let txn = sample_txn(120);
        store.create(&txn).await.expect("create");

        store
            .transition(
                txn.id,
                TransactionStatus::Generated,
                TransactionStatus::Received,
            )
            .await
            .expect("first transition applies");

        // A racing cancel now loses: the source state is gone.
        let lost = store
            .transition(
                txn.id,
                TransactionStatus::Generated,
                TransactionStatus::Cancelled,
            )
            .await;
        assert_eq!(
            lost,
            Err(ImportError::PreconditionFailed {
                id: txn.id,
                expected: TransactionStatus::Generated,
                actual: TransactionStatus::Received,
            })
        );

        let stored = store.get(txn.id).await.expect("get");
        assert_eq!(stored.status, TransactionStatus::Received);
    }

    #[tokio::test]
    async fn transition_on_missing_record_is_not_found() {
        let store = MemoryTransactionStore::new();
        let id = TransactionId::new();

        let result = store
            .transition(id, TransactionStatus::Generated, TransactionStatus::Cancelled)
            .await;
        assert_eq!(result, Err(ImportError::NotFound { id }));
    }

    #[tokio::test]
    async fn eviction_emits_removed_with_last_image() {
        let store = MemoryTransactionStore::new();
        let mut stream = store.subscribe().expect("first subscribe");

        let txn = sample_txn(1);
        store.create(&txn).await.expect("create");

        // Insert notification first.
        let inserted = stream.recv().await.expect("insert change");
        assert_eq!(
            inserted,
            TableChange::Inserted(TableRecord::Transaction(txn.clone()))
        );

        let evicted = store
            .evict_expired(Utc::now() + Duration::seconds(5))
            .expect("evict");
        assert_eq!(evicted.len(), 1);
        assert!(store.is_empty().expect("len"));

        let removed = stream.recv().await.expect("remove change");
        match removed {
            TableChange::Removed(TableRecord::Transaction(image)) => {
                assert_eq!(image.id, txn.id);
                assert_eq!(image.status, TransactionStatus::Generated);
            }
            other => unreachable!("unexpected change: {other:?}"),
        }
    }

    #[tokio::test]
    async fn eviction_skips_live_records() {
        let store = MemoryTransactionStore::new();
        let txn = sample_txn(120);
        store.create(&txn).await.expect("create");

        let evicted = store.evict_expired(Utc::now()).expect("evict");
        assert!(evicted.is_empty());
        assert_eq!(store.len().expect("len"), 1);
    }

    #[tokio::test]
    async fn subscribe_is_single_consumer() {
        let store = MemoryTransactionStore::new();
        assert!(store.subscribe().is_some());
        assert!(store.subscribe().is_none());
    }

    #[tokio::test]
    async fn invoice_create_is_idempotent() {
        let store = MemoryTransactionStore::new();
        let mut stream = store.subscribe().expect("subscribe");
        let repository = MemoryInvoiceRepository::with_change_stream(store.change_sender());

        let invoice = Invoice {
            customer_name: "acme".to_string(),
            invoice_number: "12345".to_string(),
            total_value: 10.0,
            product_id: "p-1".to_string(),
            quantity: 1,
            transaction_id: TransactionId::new(),
            created_at: Utc::now(),
        };

        repository.create(&invoice).await.expect("first create");
        repository.create(&invoice).await.expect("replayed create");

        assert_eq!(repository.len().expect("len"), 1);

        // Exactly one insert notification despite the replay.
        let first = stream.recv().await.expect("insert change");
        assert_eq!(first, TableChange::Inserted(TableRecord::Invoice(invoice)));
        assert!(stream.try_recv().is_err());
    }
}
