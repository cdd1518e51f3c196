//! # sqlab Core
//!
//! Core data structures and utilities for the sqlab SQL sandbox evaluator.
//! This crate provides the data model for registered schemas, questions, and
//! captured query results, the result comparator, the seed-script statement
//! splitter, and the shared configuration and error types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod compare;
pub mod config;
pub mod error;
pub mod models;
pub mod script;

/// Re-export common types for ease of use
pub use compare::{fingerprint, results_match};
pub use config::{SandboxConfig, ServerConnConfig};
pub use error::{CoreError, Result};
pub use models::{ExecutionResult, Question, ResultRow, ResultSet, SchemaRecord};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
