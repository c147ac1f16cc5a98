//! Benchmark utilities for Ember.
//!
//! - **Microbenchmarks**: entity churn, attach/detach routing and system dispatch
//! - **Particles**: a seeded spawn/move/expire workload driven through the frame runner
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench -p ember_bench
//!
//! # Run specific benchmark group
//! cargo bench -p ember_bench -- churn
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod components;
pub mod particles;
