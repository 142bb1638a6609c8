//! Concrete `EventPublisher` implementations

mod file;
mod log;
mod memory;

pub use file::FilePublisher;
pub use log::LogPublisher;
pub use memory::{CapturedEvents, MemoryPublisher};
