//! # Invoice Import Engine
//!
//! The invoice transaction lifecycle engine and its trigger adapters.
//!
//! Four independent entry points translate external events into engine
//! calls:
//!
//! - [`handlers::credential`]: a client requests an upload credential
//! - [`handlers::upload`]: the object store signals upload completion
//! - [`handlers::cancel`]: a client commands cancellation
//! - [`handlers::stream`]: the record store's change stream (inserts and
//!   TTL-driven removals)
//!
//! The adapters may truly overlap on the same transaction; the engine
//! adjudicates every race through the store's conditional write and
//! guarantees the client at most one terminal notification per transaction.
//!
//! ```text
//! trigger event → adapter (decode, fan out) → LifecycleEngine → providers
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod constants;
pub mod environment;
pub mod events;
pub mod handlers;
pub mod lifecycle;

// Re-export main types for convenience
pub use config::ImportConfig;
pub use environment::ImportEnvironment;
pub use lifecycle::{CancelOutcome, ExpiryOutcome, LifecycleEngine, UploadOutcome};
