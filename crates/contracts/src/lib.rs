//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Wall-clock timestamps are `chrono::DateTime<Utc>`, serialized as RFC3339
//! - Scheduling periods are plain seconds (`f64`) in configuration

mod blueprint;
mod command;
mod config;
mod descriptor;
mod error;
mod event;
mod log;
mod metric_id;
mod publisher;
mod source;
mod store;
mod telemetry;
mod topics;

pub use blueprint::*;
pub use command::*;
pub use config::*;
pub use descriptor::*;
pub use error::*;
pub use event::{BusEvent, EventSink};
pub use log::*;
pub use metric_id::MetricId;
pub use publisher::{EventPublisher, LocalEventPublisher};
pub use source::{LocalMetricSampler, MetricSampler};
pub use store::ConfigStore;
pub use telemetry::*;
pub use topics::TopicScheme;
