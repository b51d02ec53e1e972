//! Reference store implementations.
//!
//! In-process models of the record tables: a sorted key-value table with
//! conditional writes, TTL eviction, and a change stream. Deployments swap
//! in real backends behind the same provider traits.

pub mod memory;

pub use memory::{MemoryEventRecorder, MemoryInvoiceRepository, MemoryTransactionStore};
