//! # Dispatcher
//!
//! Event fan-out from the component core to `EventPublisher` collaborators.
//!
//! Each publisher runs in its own worker task behind a bounded queue, so a
//! slow or hung publisher can never stall the metric timers: emission is a
//! non-blocking `try_send`, drops are counted and warned about.

mod dispatcher;
mod error;
mod handle;
mod metrics;
pub mod publishers;

pub use dispatcher::{spawn_publishers, DispatcherWorkers, EventDispatcher};
pub use error::DispatcherError;
pub use handle::PublisherHandle;
pub use metrics::{MetricsSnapshot, PublisherMetrics};
