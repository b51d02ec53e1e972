//! The transaction lifecycle engine.
//!
//! All status mutation funnels through here. Each operation reads the
//! current record, applies at most one conditional transition, and issues
//! the side effects that transition owns. Racing triggers are adjudicated
//! by the store's conditional write: the loser observes
//! `PreconditionFailed`, backs off, and leaves notification to the winner,
//! which is what bounds terminal notifications to one per transaction.

use crate::config::ImportConfig;
use crate::constants::{categories, error_details, event_types, sources};
use crate::environment::ImportEnvironment;
use chrono::Utc;
use invoice_import_core::error::{ImportError, Result};
use invoice_import_core::providers::{
    AuditEmitter, AuditEvent, ClientNotifier, Delivery, EventRecorder, InvoiceEvent,
    InvoiceRepository, ObjectStore, StatusMessage, TransactionStore,
};
use invoice_import_core::state::{
    CredentialGrant, Invoice, InvoicePayload, InvoiceTransaction, SessionId, TransactionId,
    TransactionStatus,
};

/// Outcome of an upload-completion trigger.
///
/// Every variant is a success from the invoking infrastructure's point of
/// view; retrying any of them would be futile or would replay storage side
/// effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Payload validated, invoice persisted, object deleted.
    Processed,

    /// Payload rejected: invoice number below the minimum length.
    Rejected,

    /// The transaction had already progressed; its current status was
    /// echoed to the bound session and nothing else happened.
    StatusEchoed(TransactionStatus),

    /// A concurrent cancel won the `GENERATED` record; the cancel path owns
    /// notification.
    LostRace,

    /// No record exists for the object key (late or duplicate callback
    /// after cleanup). Logged; there is no session to notify.
    NotFound,
}

/// Outcome of a client cancel command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The transaction was still `GENERATED` and is now `CANCELLED`.
    Cancelled,

    /// The transaction had already progressed; its current status was
    /// echoed instead of an explicit rejection.
    Rejected(TransactionStatus),

    /// No record exists for the id; `NOT_FOUND` was pushed to the caller.
    NotFound,
}

/// Outcome of one change-stream removal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryOutcome {
    /// A still-`GENERATED` record expired: audited and reported as
    /// `TIMEOUT` to the bound session.
    TimedOut,

    /// Normal cleanup of a terminal record, or a duplicate expiry signal.
    Ignored,
}

/// The invoice transaction lifecycle engine.
///
/// Holds the injected environment and configuration; trigger adapters call
/// one operation per external event.
#[derive(Clone)]
pub struct LifecycleEngine<S, N, A, O, R, E>
where
    S: TransactionStore + Clone,
    N: ClientNotifier + Clone,
    A: AuditEmitter + Clone,
    O: ObjectStore + Clone,
    R: InvoiceRepository + Clone,
    E: EventRecorder + Clone,
{
    env: ImportEnvironment<S, N, A, O, R, E>,
    config: ImportConfig,
}

impl<S, N, A, O, R, E> LifecycleEngine<S, N, A, O, R, E>
where
    S: TransactionStore + Clone,
    N: ClientNotifier + Clone,
    A: AuditEmitter + Clone,
    O: ObjectStore + Clone,
    R: InvoiceRepository + Clone,
    E: EventRecorder + Clone,
{
    /// Create an engine over `env` with `config`.
    #[must_use]
    pub const fn new(env: ImportEnvironment<S, N, A, O, R, E>, config: ImportConfig) -> Self {
        Self { env, config }
    }

    /// The injected environment.
    #[must_use]
    pub const fn environment(&self) -> &ImportEnvironment<S, N, A, O, R, E> {
        &self.env
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Issue a new import transaction for `session_id`.
    ///
    /// Generates the id, presigns the upload credential, and stores the
    /// record in `GENERATED` with its TTL window. No other side effects.
    ///
    /// # Errors
    ///
    /// Only store and object-store infrastructure failures propagate.
    pub async fn issue_credential(
        &self,
        session_id: SessionId,
        request_context: String,
    ) -> Result<CredentialGrant> {
        let txn = InvoiceTransaction::issue(
            session_id,
            request_context,
            Utc::now(),
            self.config.transaction_ttl,
        );

        let url = self
            .env
            .objects
            .presign_put(&txn.id, self.config.credential_expiry)
            .await?;
        self.env.transactions.create(&txn).await?;

        tracing::info!(
            transaction_id = %txn.id,
            session_id = %txn.session_id,
            request_context = %txn.request_context,
            "issued upload credential"
        );

        Ok(CredentialGrant {
            transaction_id: txn.id,
            url,
            expires: self.config.credential_expiry.num_seconds(),
        })
    }

    /// Apply an upload-completion signal for object `key`.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures propagate (store, object fetch, an
    /// undecodable payload). A lost race or a late callback is an `Ok`
    /// outcome; the invoking infrastructure must not retry those.
    pub async fn complete_upload(&self, key: TransactionId) -> Result<UploadOutcome> {
        let txn = match self.env.transactions.get(key).await {
            Ok(txn) => txn,
            Err(ImportError::NotFound { .. }) => {
                tracing::warn!(transaction_id = %key, "upload completion for unknown transaction");
                return Ok(UploadOutcome::NotFound);
            }
            Err(error) => return Err(error),
        };

        if txn.status != TransactionStatus::Generated {
            // Late or duplicate callback. Echo the real status, keep the
            // session open: the live import path owns termination.
            self.push_status(&txn.session_id, key, txn.status).await;
            return Ok(UploadOutcome::StatusEchoed(txn.status));
        }

        match self
            .env
            .transactions
            .transition(key, TransactionStatus::Generated, TransactionStatus::Received)
            .await
        {
            Ok(()) => {}
            Err(error) if error.is_race_loss() => {
                tracing::info!(
                    transaction_id = %key,
                    "upload lost the race for GENERATED; winner owns notification"
                );
                return Ok(UploadOutcome::LostRace);
            }
            Err(ImportError::NotFound { .. }) => {
                tracing::warn!(transaction_id = %key, "transaction evicted mid-upload");
                return Ok(UploadOutcome::NotFound);
            }
            Err(error) => return Err(error),
        }

        self.push_status(&txn.session_id, key, TransactionStatus::Received)
            .await;

        let bytes = self.env.objects.get(&key).await?;
        let payload: InvoicePayload =
            serde_json::from_slice(&bytes).map_err(|error| ImportError::Payload {
                reason: error.to_string(),
            })?;

        if payload.invoice_number.len() < self.config.min_invoice_number_len {
            return self.reject_upload(&txn, key, &payload).await;
        }

        let invoice = Invoice::from_payload(&payload, key, Utc::now());
        let (created, deleted, transitioned, ()) = tokio::join!(
            self.env.invoices.create(&invoice),
            self.env.objects.delete(&key),
            self.env.transactions.transition(
                key,
                TransactionStatus::Received,
                TransactionStatus::Processed,
            ),
            self.push_status(&txn.session_id, key, TransactionStatus::Processed),
        );
        created?;
        deleted?;
        transitioned?;

        // Terminate strictly last: the client must have had its terminal
        // notification before the session drops.
        self.close_session(&txn.session_id).await;

        tracing::info!(transaction_id = %key, "invoice processed");
        Ok(UploadOutcome::Processed)
    }

    async fn reject_upload(
        &self,
        txn: &InvoiceTransaction,
        key: TransactionId,
        payload: &InvoicePayload,
    ) -> Result<UploadOutcome> {
        let audit = AuditEvent::new(
            sources::INVOICE,
            categories::INVOICE,
            serde_json::json!({
                "errorDetail": error_details::FAIL_NO_INVOICE_NUMBER,
                "info": {
                    "invoiceKey": key,
                    "customerName": payload.customer_name,
                },
            }),
        );

        let (transitioned, (), ()) = tokio::join!(
            self.env.transactions.transition(
                key,
                TransactionStatus::Received,
                TransactionStatus::NonValidInvoiceNumber,
            ),
            self.emit_audit(&audit),
            self.push_status(&txn.session_id, key, TransactionStatus::NonValidInvoiceNumber),
        );
        transitioned?;

        self.close_session(&txn.session_id).await;

        tracing::warn!(
            transaction_id = %key,
            invoice_number_len = payload.invoice_number.len(),
            "invoice rejected: invoice number below minimum length"
        );
        Ok(UploadOutcome::Rejected)
    }

    /// Apply a client cancel command for `id`, notifying the commanding
    /// `session`.
    ///
    /// Cancellation of an already-progressing transaction is rejected
    /// silently: the client is told the real stored status instead of an
    /// error code.
    ///
    /// # Errors
    ///
    /// Only store infrastructure failures propagate.
    pub async fn cancel(&self, id: TransactionId, session: &SessionId) -> Result<CancelOutcome> {
        let txn = match self.env.transactions.get(id).await {
            Ok(txn) => txn,
            Err(ImportError::NotFound { .. }) => return Ok(self.cancel_not_found(id, session).await),
            Err(error) => return Err(error),
        };

        if txn.status == TransactionStatus::Generated {
            match self
                .env
                .transactions
                .transition(id, TransactionStatus::Generated, TransactionStatus::Cancelled)
                .await
            {
                Ok(()) => {
                    self.push_status(session, id, TransactionStatus::Cancelled).await;
                    self.close_session(session).await;
                    tracing::info!(transaction_id = %id, "import cancelled");
                    return Ok(CancelOutcome::Cancelled);
                }
                Err(error) if error.is_race_loss() => {
                    // The upload arrived first; fall through and echo
                    // whatever status it reached.
                }
                Err(ImportError::NotFound { .. }) => {
                    return Ok(self.cancel_not_found(id, session).await);
                }
                Err(error) => return Err(error),
            }
        }

        let status = match self.env.transactions.get(id).await {
            Ok(txn) => txn.status,
            Err(ImportError::NotFound { .. }) => return Ok(self.cancel_not_found(id, session).await),
            Err(error) => return Err(error),
        };

        self.push_status(session, id, status).await;
        self.close_session(session).await;
        tracing::info!(transaction_id = %id, status = %status, "cancel rejected; echoed current status");
        Ok(CancelOutcome::Rejected(status))
    }

    async fn cancel_not_found(&self, id: TransactionId, session: &SessionId) -> CancelOutcome {
        tracing::warn!(transaction_id = %id, "cancel for unknown transaction");
        self.push_status(session, id, TransactionStatus::NotFound).await;
        self.close_session(session).await;
        CancelOutcome::NotFound
    }

    /// Reconcile a change-stream removal: `record` is the evicted record's
    /// last stored image.
    ///
    /// Only a record removed while still `GENERATED` is an abandoned import;
    /// removal of a terminal record is routine cleanup. Duplicate expiry
    /// signals land in the `Ignored` arm, which keeps the at-least-once
    /// stream delivery harmless.
    ///
    /// # Errors
    ///
    /// None today; the signature leaves room for store-backed reconciliation.
    pub async fn reclaim_expired(&self, record: &InvoiceTransaction) -> Result<ExpiryOutcome> {
        if record.status != TransactionStatus::Generated {
            tracing::debug!(
                transaction_id = %record.id,
                status = %record.status,
                "terminal record evicted; nothing to reclaim"
            );
            return Ok(ExpiryOutcome::Ignored);
        }

        let audit = AuditEvent::new(
            sources::INVOICE,
            categories::INVOICE,
            serde_json::json!({
                "errorDetail": error_details::TIMEOUT,
                "transactionId": record.id,
            }),
        );

        let ((), ()) = tokio::join!(
            self.emit_audit(&audit),
            self.push_status(&record.session_id, record.id, TransactionStatus::TimedOut),
        );
        self.close_session(&record.session_id).await;

        tracing::warn!(transaction_id = %record.id, "import timed out while GENERATED");
        Ok(ExpiryOutcome::TimedOut)
    }

    /// Append an `INVOICE_CREATED` history entry for a freshly inserted
    /// invoice record. Recorder failures are logged, never propagated.
    pub async fn record_invoice_created(&self, invoice: &Invoice) {
        let now = Utc::now();
        let event = InvoiceEvent {
            customer_name: invoice.customer_name.clone(),
            invoice_number: invoice.invoice_number.clone(),
            event_type: event_types::INVOICE_CREATED.to_string(),
            transaction_id: invoice.transaction_id,
            product_id: invoice.product_id.clone(),
            quantity: invoice.quantity,
            created_at: now,
            expires_at: now + self.config.event_retention,
        };

        if let Err(error) = self.env.events.record(&event).await {
            tracing::warn!(
                transaction_id = %invoice.transaction_id,
                %error,
                "failed to record invoice history entry"
            );
        }
    }

    /// Push `status` to `session`, best-effort.
    async fn push_status(&self, session: &SessionId, id: TransactionId, status: TransactionStatus) {
        let message = StatusMessage::new(id, status);
        match self.env.notifier.notify(session, &message).await {
            Ok(Delivery::Sent) => {}
            Ok(Delivery::SessionGone) => {
                tracing::info!(
                    transaction_id = %id,
                    session_id = %session,
                    status = %status,
                    "session gone; status not delivered"
                );
            }
            Err(error) => {
                tracing::warn!(
                    transaction_id = %id,
                    session_id = %session,
                    status = %status,
                    %error,
                    "status delivery failed"
                );
            }
        }
    }

    /// Close `session`, best-effort.
    async fn close_session(&self, session: &SessionId) {
        match self.env.notifier.terminate(session).await {
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(session_id = %session, %error, "session termination failed");
            }
        }
    }

    /// Emit an audit event, best-effort.
    async fn emit_audit(&self, event: &AuditEvent) {
        if let Err(error) = self.env.audit.emit(event).await {
            tracing::warn!(%error, "audit emit failed");
        }
    }
}
