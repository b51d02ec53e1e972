//! Credential-request trigger adapter.

use crate::events::CredentialRequest;
use crate::lifecycle::LifecycleEngine;
use invoice_import_core::error::{ImportError, Result};
use invoice_import_core::providers::{
    AuditEmitter, ClientNotifier, Delivery, EventRecorder, InvoiceRepository, ObjectStore,
    TransactionStore,
};

/// Handle a client's request for an upload credential.
///
/// Issues a new transaction and pushes the grant back over the requesting
/// session. A session that disappeared between request and response is
/// logged and tolerated; the transaction stays issued and will be reclaimed
/// by TTL if never used.
///
/// # Errors
///
/// Store and object-store infrastructure failures propagate to the host.
pub async fn handle_credential_request<S, N, A, O, R, E>(
    engine: &LifecycleEngine<S, N, A, O, R, E>,
    request: CredentialRequest,
) -> Result<()>
where
    S: TransactionStore + Clone,
    N: ClientNotifier + Clone,
    A: AuditEmitter + Clone,
    O: ObjectStore + Clone,
    R: InvoiceRepository + Clone,
    E: EventRecorder + Clone,
{
    tracing::info!(
        session_id = %request.session_id,
        request_context = %request.request_context,
        "credential requested"
    );

    let grant = engine
        .issue_credential(request.session_id.clone(), request.request_context)
        .await?;

    let data = serde_json::to_string(&grant).map_err(|error| ImportError::Delivery {
        reason: error.to_string(),
    })?;

    match engine
        .environment()
        .notifier
        .send_data(&request.session_id, data)
        .await
    {
        Ok(Delivery::Sent) => {}
        Ok(Delivery::SessionGone) => {
            tracing::info!(
                transaction_id = %grant.transaction_id,
                session_id = %request.session_id,
                "session gone before credential delivery; transaction left for TTL"
            );
        }
        Err(error) => {
            tracing::warn!(
                transaction_id = %grant.transaction_id,
                session_id = %request.session_id,
                %error,
                "credential delivery failed"
            );
        }
    }

    Ok(())
}
