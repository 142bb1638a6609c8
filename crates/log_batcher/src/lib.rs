//! # Log Batcher
//!
//! Buffers component log records and flushes them as rate-limited batches on
//! the logs topic. Enqueueing never blocks the caller; a single worker task
//! owns the open batch and all flush decisions.

mod batcher;

pub use batcher::{DiscardedBatches, LogBatcher};
