//! # Invoice Import Core
//!
//! Domain types, provider traits, and reference stores for the invoice
//! import lifecycle.
//!
//! An import attempt is tracked as a transaction moving through a small
//! forward-only state machine:
//!
//! ```text
//! GENERATED → RECEIVED → {PROCESSED | NON_VALID_INVOICE_NUMBER}
//! GENERATED → {CANCELLED | TIMEOUT}
//! ```
//!
//! Three asynchronous trigger sources race over that machine (client
//! cancellation, storage upload completion, TTL expiry); the store's
//! conditional write is the only synchronization between them.
//!
//! This crate holds everything the lifecycle engine depends on:
//!
//! - [`state`]: the transaction, status, payload, and invoice types
//! - [`error`]: the error taxonomy shared across the workspace
//! - [`providers`]: traits for every external collaborator
//! - [`stores`]: in-memory reference implementations of the store-side
//!   providers, with conditional writes, TTL eviction, and a change stream
//! - [`mocks`]: deterministic test doubles for the gateway, audit bus, and
//!   object store (feature `test-utils`, on by default)

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod error;
pub mod providers;
pub mod state;
pub mod stores;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use error::{ImportError, Result};
pub use state::{
    CredentialGrant, Invoice, InvoicePayload, InvoiceTransaction, SessionId, TransactionId,
    TransactionStatus,
};
