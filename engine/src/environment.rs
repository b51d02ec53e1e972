//! Import environment.
//!
//! This module defines the environment type for dependency injection into
//! the lifecycle engine and the trigger adapters.

use invoice_import_core::providers::{
    AuditEmitter, ClientNotifier, EventRecorder, InvoiceRepository, ObjectStore, TransactionStore,
};

/// Import environment.
///
/// Contains all external collaborators the lifecycle engine needs.
///
/// # Type Parameters
///
/// - `S`: Transaction store
/// - `N`: Client notifier (connection gateway)
/// - `A`: Audit emitter (external bus)
/// - `O`: Object store (uploaded documents)
/// - `R`: Invoice repository (derived business records)
/// - `E`: Event recorder (invoice history)
#[derive(Clone)]
pub struct ImportEnvironment<S, N, A, O, R, E>
where
    S: TransactionStore + Clone,
    N: ClientNotifier + Clone,
    A: AuditEmitter + Clone,
    O: ObjectStore + Clone,
    R: InvoiceRepository + Clone,
    E: EventRecorder + Clone,
{
    /// Transaction store (conditional writes, change stream).
    pub transactions: S,

    /// Client notifier, scoped to the connection gateway.
    pub notifier: N,

    /// Audit emitter, fire-and-forget.
    pub audit: A,

    /// Object store holding uploaded documents.
    pub objects: O,

    /// Invoice repository for derived business records.
    pub invoices: R,

    /// Invoice history recorder.
    pub events: E,
}

impl<S, N, A, O, R, E> ImportEnvironment<S, N, A, O, R, E>
where
    S: TransactionStore + Clone,
    N: ClientNotifier + Clone,
    A: AuditEmitter + Clone,
    O: ObjectStore + Clone,
    R: InvoiceRepository + Clone,
    E: EventRecorder + Clone,
{
    /// Create a new import environment.
    #[must_use]
    pub const fn new(
        transactions: S,
        notifier: N,
        audit: A,
        objects: O,
        invoices: R,
        events: E,
    ) -> Self {
        Self {
            transactions,
            notifier,
            audit,
            objects,
            invoices,
            events,
        }
    }
}
