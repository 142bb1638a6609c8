//! # Telemetry Engine
//!
//! The gating core: the per-tick publish decision (gate), the per-metric
//! state registry, and the scheduler that drives one repeating sampling task
//! per metric.

mod gate;
mod scheduler;
mod state;

pub use gate::{decide, percent_change, GateDecision, SuppressReason};
pub use scheduler::TelemetryScheduler;
pub use state::StateRegistry;
