//! Upload-completion trigger adapter.

use crate::events::UploadEvent;
use crate::lifecycle::LifecycleEngine;
use futures::future::join_all;
use invoice_import_core::error::Result;
use invoice_import_core::providers::{
    AuditEmitter, ClientNotifier, EventRecorder, InvoiceRepository, ObjectStore, TransactionStore,
};

/// Handle a batch of upload-completion records.
///
/// Records fan out concurrently; each resolves to an engine outcome that is
/// logged. A lost race or a late callback is success to the host. The first
/// infrastructure failure, if any, fails the invocation so the host can
/// retry the batch; replays are safe because late records resolve to status
/// echoes or `NotFound`.
///
/// # Errors
///
/// Store, object-store, and payload-decode failures propagate.
pub async fn handle_upload_event<S, N, A, O, R, E>(
    engine: &LifecycleEngine<S, N, A, O, R, E>,
    event: UploadEvent,
) -> Result<()>
where
    S: TransactionStore + Clone,
    N: ClientNotifier + Clone,
    A: AuditEmitter + Clone,
    O: ObjectStore + Clone,
    R: InvoiceRepository + Clone,
    E: EventRecorder + Clone,
{
    let results = join_all(
        event
            .records
            .iter()
            .map(|record| engine.complete_upload(record.key)),
    )
    .await;

    let mut first_failure = None;
    for (record, result) in event.records.iter().zip(results) {
        match result {
            Ok(outcome) => {
                tracing::info!(
                    transaction_id = %record.key,
                    location = %record.location,
                    outcome = ?outcome,
                    "upload completion handled"
                );
            }
            Err(error) => {
                tracing::error!(
                    transaction_id = %record.key,
                    location = %record.location,
                    %error,
                    "upload completion failed"
                );
                first_failure.get_or_insert(error);
            }
        }
    }

    match first_failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
