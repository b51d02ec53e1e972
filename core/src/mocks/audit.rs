//! Mock audit emitter for testing.

use crate::error::{ImportError, Result};
use crate::providers::{AuditEmitter, AuditEvent};
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    events: Vec<AuditEvent>,
    fail_next: bool,
}

/// Mock audit emitter.
///
/// Captures emitted events; `fail_next` exercises the fire-and-forget path.
#[derive(Debug, Clone, Default)]
pub struct MockAuditEmitter {
    inner: Arc<Mutex<Inner>>,
}

impl MockAuditEmitter {
    /// Create a new mock emitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `emit` fail.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn fail_next(&self) -> Result<()> {
        self.lock()?.fail_next = true;
        Ok(())
    }

    /// Events captured so far, in emission order.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn events(&self) -> Result<Vec<AuditEvent>> {
        Ok(self.lock()?.events.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| ImportError::Audit {
            reason: "lock poisoned".to_string(),
        })
    }
}

impl AuditEmitter for MockAuditEmitter {
    fn emit(&self, event: &AuditEvent) -> impl Future<Output = Result<()>> + Send {
        let inner = Arc::clone(&self.inner);
        let event = event.clone();

        async move {
            let mut inner = inner.lock().map_err(|_| ImportError::Audit {
                reason: "lock poisoned".to_string(),
            })?;

            if inner.fail_next {
                inner.fail_next = false;
                return Err(ImportError::Audit {
                    reason: "bus unavailable".to_string(),
                });
            }

            inner.events.push(event);
            Ok(())
        }
    }
}
