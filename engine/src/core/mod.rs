//! Host side plumbing around the ECS: the frame clock, the frame loop and log sinks.

pub mod log;
pub mod runner;
pub mod time;

pub use runner::{Runner, Tick};
pub use time::Time;
