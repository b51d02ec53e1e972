//! Audit emitter trait.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Structured error event published to the external audit bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Originating application, e.g. `app.invoice`.
    pub source: String,

    /// Event category on the bus, e.g. `invoice`.
    pub category: String,

    /// Free-form JSON detail; shape depends on the failure path.
    pub detail: serde_json::Value,
}

impl AuditEvent {
    /// Build an audit event.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        category: impl Into<String>,
        detail: serde_json::Value,
    ) -> Self {
        Self {
            source: source.into(),
            category: category.into(),
            detail,
        }
    }
}

/// Fire-and-forget publisher of audit events.
///
/// Used only on the designated failure paths (validation failure, timeout).
/// Emission failures are logged by the engine and never block or fail the
/// owning state transition.
pub trait AuditEmitter: Send + Sync {
    /// Publish one event to the bus. No acknowledgment is consumed.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Audit` on bus failure; callers log and continue.
    fn emit(&self, event: &AuditEvent) -> impl std::future::Future<Output = Result<()>> + Send;
}
