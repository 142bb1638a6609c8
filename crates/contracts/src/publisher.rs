//! EventPublisher trait - host bus output interface
//!
//! Defines the abstract interface the dispatcher writes events through.

use crate::{BusEvent, ComponentError};

/// Event output trait
///
/// All publisher implementations must implement this trait. Each publisher
/// is owned by a single dispatcher worker task; retry policy belongs to the
/// implementation, the core never retries.
#[trait_variant::make(EventPublisher: Send)]
pub trait LocalEventPublisher {
    /// Publisher name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one event
    ///
    /// # Errors
    /// Returns delivery error (should include context)
    async fn publish(&mut self, event: &BusEvent) -> Result<(), ComponentError>;

    /// Flush buffered output (if any)
    async fn flush(&mut self) -> Result<(), ComponentError>;

    /// Close the publisher
    async fn close(&mut self) -> Result<(), ComponentError>;
}
