//! Ember is a small entity/component/system runtime and the frame loop that drives it.
//!
//! The [`ecs`] module holds the runtime itself: entity lifecycle, typed component storage,
//! capability-mask routing of entities into systems and the deferred destruction pipeline.
//! The [`core`] module holds the pieces around it: the frame [`Runner`](core::Runner), its
//! fixed-step clock and log plumbing. [`config`] loads the limits and rates both use.

// Allows `#[derive(Component)]` to expand to `::ember_engine::...` paths inside this crate.
extern crate self as ember_engine;

pub mod config;
pub mod core;
pub mod ecs;

pub use config::{Config, ConfigError};
pub use ember_macros::Component;
