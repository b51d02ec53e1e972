//! Trigger adapters.
//!
//! One adapter per external event source. Each decodes its event, calls the
//! lifecycle engine, logs the per-record outcome, and returns `Err` only on
//! infrastructure failure, which is the sole case where the invoking host
//! should retry. Transaction-logic outcomes (lost races, late callbacks,
//! missing records) are already resolved into client notifications by the
//! engine and must read as success here.

pub mod cancel;
pub mod credential;
pub mod stream;
pub mod upload;
