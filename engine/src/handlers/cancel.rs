//! Client-command trigger adapter.

use crate::events::{ClientCommand, commands};
use crate::lifecycle::LifecycleEngine;
use invoice_import_core::error::Result;
use invoice_import_core::providers::{
    AuditEmitter, ClientNotifier, EventRecorder, InvoiceRepository, ObjectStore, TransactionStore,
};
use invoice_import_core::state::SessionId;

/// Handle an inbound message on the client command channel.
///
/// Every cancel outcome (cancelled, silently rejected, not found) has
/// already produced its client notification inside the engine, so the
/// gateway always sees success; retrying could only duplicate
/// notifications.
///
/// # Errors
///
/// Store infrastructure failures propagate.
pub async fn handle_client_command<S, N, A, O, R, E>(
    engine: &LifecycleEngine<S, N, A, O, R, E>,
    session_id: SessionId,
    command: ClientCommand,
) -> Result<()>
where
    S: TransactionStore + Clone,
    N: ClientNotifier + Clone,
    A: AuditEmitter + Clone,
    O: ObjectStore + Clone,
    R: InvoiceRepository + Clone,
    E: EventRecorder + Clone,
{
    if command.command != commands::CANCEL {
        tracing::warn!(
            session_id = %session_id,
            command = %command.command,
            "unrecognized client command ignored"
        );
        return Ok(());
    }

    let outcome = engine.cancel(command.transaction_id, &session_id).await?;
    tracing::info!(
        transaction_id = %command.transaction_id,
        session_id = %session_id,
        outcome = ?outcome,
        "cancel command handled"
    );
    Ok(())
}
