//! Change-stream trigger adapter.
//!
//! Consumes the record store's change stream. Transaction inserts are log
//! noise; invoice inserts feed the history table; transaction removals are
//! the expiry signal the engine reconciles.

use crate::lifecycle::LifecycleEngine;
use invoice_import_core::error::Result;
use invoice_import_core::providers::{
    AuditEmitter, ClientNotifier, EventRecorder, InvoiceRepository, ObjectStore, TableChange,
    TableRecord, TransactionStore,
};
use tokio::sync::mpsc::UnboundedReceiver;

/// Apply one change-stream record.
///
/// # Errors
///
/// Store infrastructure failures propagate; the stream delivery is
/// at-least-once, so the host may redeliver the record.
pub async fn handle_change<S, N, A, O, R, E>(
    engine: &LifecycleEngine<S, N, A, O, R, E>,
    change: TableChange,
) -> Result<()>
where
    S: TransactionStore + Clone,
    N: ClientNotifier + Clone,
    A: AuditEmitter + Clone,
    O: ObjectStore + Clone,
    R: InvoiceRepository + Clone,
    E: EventRecorder + Clone,
{
    match change {
        TableChange::Inserted(TableRecord::Transaction(txn)) => {
            tracing::debug!(transaction_id = %txn.id, "transaction record inserted");
            Ok(())
        }
        TableChange::Inserted(TableRecord::Invoice(invoice)) => {
            engine.record_invoice_created(&invoice).await;
            Ok(())
        }
        TableChange::Removed(TableRecord::Transaction(txn)) => {
            let outcome = engine.reclaim_expired(&txn).await?;
            tracing::info!(
                transaction_id = %txn.id,
                outcome = ?outcome,
                "transaction removal handled"
            );
            Ok(())
        }
        TableChange::Removed(TableRecord::Invoice(_)) => Ok(()),
    }
}

/// Drain the change stream until the store side closes.
///
/// Per-record failures are logged and the loop continues; the stream is
/// at-least-once and a failed record will come around again on redelivery.
pub async fn run<S, N, A, O, R, E>(
    engine: LifecycleEngine<S, N, A, O, R, E>,
    mut stream: UnboundedReceiver<TableChange>,
) where
    S: TransactionStore + Clone,
    N: ClientNotifier + Clone,
    A: AuditEmitter + Clone,
    O: ObjectStore + Clone,
    R: InvoiceRepository + Clone,
    E: EventRecorder + Clone,
{
    while let Some(change) = stream.recv().await {
        if let Err(error) = handle_change(&engine, change).await {
            tracing::error!(%error, "change-stream record failed");
        }
    }
    tracing::info!("change stream closed");
}
