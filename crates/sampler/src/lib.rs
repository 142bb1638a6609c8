//! # Sampler
//!
//! `MetricSampler` implementations: the sysinfo-backed system sampler and
//! the mock/scripted samplers used for testing and development without
//! touching the host system.

mod mock;
mod system;

pub use mock::{MockSampler, MockSamplerConfig, ScriptedSampler};
pub use system::SystemSampler;
