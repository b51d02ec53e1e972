//! Mock client notifier for testing.

use crate::error::{ImportError, Result};
use crate::providers::{ClientNotifier, Delivery, StatusMessage};
use crate::state::SessionId;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    gone: HashSet<SessionId>,
    notifications: Vec<(SessionId, StatusMessage)>,
    raw: Vec<(SessionId, String)>,
    terminated: Vec<SessionId>,
    fail_transport: bool,
}

/// Mock client notifier.
///
/// Records every delivered message per session. A terminated session is
/// treated as gone afterwards, so late deliveries observe `SessionGone`
/// the way they would against a real gateway.
#[derive(Debug, Clone, Default)]
pub struct MockClientNotifier {
    inner: Arc<Mutex<Inner>>,
}

impl MockClientNotifier {
    /// Create a new mock notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate connection churn: `session` is no longer reachable.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn mark_gone(&self, session: &SessionId) -> Result<()> {
        self.lock()?.gone.insert(session.clone());
        Ok(())
    }

    /// Make every subsequent operation fail at the transport layer.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn fail_transport(&self) -> Result<()> {
        self.lock()?.fail_transport = true;
        Ok(())
    }

    /// Status messages delivered to `session`, in order.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn sent_to(&self, session: &SessionId) -> Result<Vec<StatusMessage>> {
        Ok(self
            .lock()?
            .notifications
            .iter()
            .filter(|(s, _)| s == session)
            .map(|(_, m)| m.clone())
            .collect())
    }

    /// Raw payloads delivered to `session`, in order.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn raw_sent_to(&self, session: &SessionId) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .raw
            .iter()
            .filter(|(s, _)| s == session)
            .map(|(_, d)| d.clone())
            .collect())
    }

    /// How many times `session` was terminated while still live.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn terminations(&self, session: &SessionId) -> Result<usize> {
        Ok(self
            .lock()?
            .terminated
            .iter()
            .filter(|s| *s == session)
            .count())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| ImportError::Delivery {
            reason: "lock poisoned".to_string(),
        })
    }
}

impl ClientNotifier for MockClientNotifier {
    fn notify(
        &self,
        session: &SessionId,
        message: &StatusMessage,
    ) -> impl Future<Output = Result<Delivery>> + Send {
        let inner = Arc::clone(&self.inner);
        let session = session.clone();
        let message = message.clone();

        async move {
            let mut inner = inner.lock().map_err(|_| ImportError::Delivery {
                reason: "lock poisoned".to_string(),
            })?;

            if inner.fail_transport {
                return Err(ImportError::Delivery {
                    reason: "gateway unreachable".to_string(),
                });
            }
            if inner.gone.contains(&session) {
                return Ok(Delivery::SessionGone);
            }

            inner.notifications.push((session, message));
            Ok(Delivery::Sent)
        }
    }

    fn send_data(
        &self,
        session: &SessionId,
        data: String,
    ) -> impl Future<Output = Result<Delivery>> + Send {
        let inner = Arc::clone(&self.inner);
        let session = session.clone();

        async move {
            let mut inner = inner.lock().map_err(|_| ImportError::Delivery {
                reason: "lock poisoned".to_string(),
            })?;

            if inner.fail_transport {
                return Err(ImportError::Delivery {
                    reason: "gateway unreachable".to_string(),
                });
            }
            if inner.gone.contains(&session) {
                return Ok(Delivery::SessionGone);
            }

            inner.raw.push((session, data));
            Ok(Delivery::Sent)
        }
    }

    fn terminate(&self, session: &SessionId) -> impl Future<Output = Result<Delivery>> + Send {
        let inner = Arc::clone(&self.inner);
        let session = session.clone();

        async move {
            let mut inner = inner.lock().map_err(|_| ImportError::Delivery {
                reason: "lock poisoned".to_string(),
            })?;

            if inner.fail_transport {
                return Err(ImportError::Delivery {
                    reason: "gateway unreachable".to_string(),
                });
            }
            if inner.gone.contains(&session) {
                return Ok(Delivery::SessionGone);
            }

            inner.gone.insert(session.clone());
            inner.terminated.push(session);
            Ok(Delivery::Sent)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::state::{TransactionId, TransactionStatus};

    #[tokio::test]
    async fn terminated_session_is_gone() {
        let notifier = MockClientNotifier::new();
        let session = SessionId::new("conn-1");
        let message =
            StatusMessage::new(TransactionId::new(), TransactionStatus::Processed);

        assert_eq!(
            notifier.notify(&session, &message).await.expect("notify"),
            Delivery::Sent
        );
        assert_eq!(
            notifier.terminate(&session).await.expect("terminate"),
            Delivery::Sent
        );

        // Late delivery after termination: gone, not an error.
        assert_eq!(
            notifier.notify(&session, &message).await.expect("notify"),
            Delivery::SessionGone
        );
        assert_eq!(
            notifier.terminate(&session).await.expect("terminate"),
            Delivery::SessionGone
        );

        assert_eq!(notifier.sent_to(&session).expect("sent").len(), 1);
        assert_eq!(notifier.terminations(&session).expect("count"), 1);
    }
}
