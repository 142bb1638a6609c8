//! # Component
//!
//! The fixture component itself: wires the sampler, telemetry engine, log
//! batcher and command router together over a host-provided event sink, and
//! maintains the retained state objects (metadata, status, state, cfg).

mod command;
mod component;
mod retained;

pub use command::CommandRouter;
pub use component::{ComponentHandle, FixtureComponent};
pub use retained::RetainedPublisher;
