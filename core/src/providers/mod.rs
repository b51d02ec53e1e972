//! Import lifecycle providers.
//!
//! This module defines traits for all external collaborators of the import
//! lifecycle: the durable transaction store, the connection gateway, the
//! audit bus, the object store, and the invoice tables. These traits enable
//! dependency injection and make the lifecycle logic testable.
//!
//! Providers are **interfaces**, not implementations. The engine depends on
//! these traits; deployments wire concrete backends and tests wire the
//! in-memory reference store and mocks.

pub mod audit;
pub mod event_recorder;
pub mod invoice_repository;
pub mod notifier;
pub mod object_store;
pub mod transaction_store;

// Re-export provider traits and their data models
pub use audit::{AuditEmitter, AuditEvent};
pub use event_recorder::{EventRecorder, InvoiceEvent};
pub use invoice_repository::InvoiceRepository;
pub use notifier::{ClientNotifier, Delivery, StatusMessage};
pub use object_store::ObjectStore;
pub use transaction_store::{TableChange, TableRecord, TransactionStore};
