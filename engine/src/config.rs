//! Import engine configuration.
//!
//! Configuration values are provided by the application, not hardcoded in
//! the engine. Defaults mirror the production deployment: a five-minute
//! upload credential over a two-minute transaction window.

use chrono::Duration;

/// Lifecycle engine configuration.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// How long the upload credential stays valid.
    ///
    /// Default: 5 minutes
    pub credential_expiry: Duration,

    /// Window before a still-`GENERATED` transaction becomes eligible for
    /// TTL eviction.
    ///
    /// Default: 2 minutes
    pub transaction_ttl: Duration,

    /// Minimum accepted invoice number length.
    ///
    /// Default: 5
    pub min_invoice_number_len: usize,

    /// Retention of invoice history entries.
    ///
    /// Default: 1 hour
    pub event_retention: Duration,
}

impl ImportConfig {
    /// Create a configuration with production defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            credential_expiry: Duration::seconds(300),
            transaction_ttl: Duration::seconds(120),
            min_invoice_number_len: 5,
            event_retention: Duration::hours(1),
        }
    }

    /// Set the upload credential expiry.
    #[must_use]
    pub const fn with_credential_expiry(mut self, expiry: Duration) -> Self {
        self.credential_expiry = expiry;
        self
    }

    /// Set the transaction TTL window.
    #[must_use]
    pub const fn with_transaction_ttl(mut self, ttl: Duration) -> Self {
        self.transaction_ttl = ttl;
        self
    }

    /// Set the minimum accepted invoice number length.
    #[must_use]
    pub const fn with_min_invoice_number_len(mut self, len: usize) -> Self {
        self.min_invoice_number_len = len;
        self
    }

    /// Set the invoice history retention window.
    #[must_use]
    pub const fn with_event_retention(mut self, retention: Duration) -> Self {
        self.event_retention = retention;
        self
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self::new()
    }
}
