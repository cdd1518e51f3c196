//! Data models for the sandbox evaluator
//!
//! This module provides the data structures for registered schemas,
//! questions, and captured query results.

pub mod question;
pub mod result;
pub mod schema;

pub use question::Question;
pub use result::{ExecutionResult, ResultRow, ResultSet};
pub use schema::SchemaRecord;
