//! Workshop Benchmark Harness Library
//!
//! This library provides modular components for building, verifying and
//! benchmarking a reference and an accelerated implementation of the same
//! workload.

pub mod bench;
pub mod build;
pub mod core;
pub mod error;
pub mod stats;
pub mod workload;
pub mod workshop_config;

pub use crate::core::run_workshop;
pub use crate::error::{Result, WorkshopError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
