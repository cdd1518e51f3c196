//! Error types for the sandbox evaluator
//!
//! This module provides a consolidated error type shared by the sandbox,
//! server, and admin crates. Student SQL failures are deliberately absent:
//! they are captured as values inside [`crate::models::ExecutionResult`] and
//! never travel through this type.

use std::io;
use thiserror::Error;

/// Result type for the sandbox evaluator
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error type for the sandbox evaluator
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown question id
    #[error("Question not found: {0}")]
    QuestionNotFound(i64),

    /// Unknown or inactive schema
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    /// Schema name already registered
    #[error("Duplicate schema name: {0}")]
    DuplicateSchemaName(String),

    /// Invalid schema name (rejected before it reaches DDL)
    #[error("Invalid schema name: {0}")]
    InvalidSchemaName(String),

    /// Creating the isolated database failed
    #[error("Database creation failed: {0}")]
    DatabaseCreationFailed(String),

    /// A seed-script statement failed during provisioning
    #[error("Seed script failed at statement {statement_index}: {message}")]
    SeedScriptFailed {
        /// Zero-based index of the failing statement
        statement_index: usize,
        /// Database error text for the failing statement
        message: String,
    },

    /// The instructor-authored expected-result query failed
    #[error("Expected-result query failed for question {question_id}: {message}")]
    ExpectedQueryFailed {
        /// Question whose reference query failed
        question_id: i64,
        /// Database error text for the reference query
        message: String,
    },

    /// Rejected submission input
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Registry error
    #[error("Registry error: {0}")]
    Registry(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Whether the error is a reference error (unknown question or schema),
    /// surfaced to callers as a 404-equivalent and never retried.
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            CoreError::QuestionNotFound(_) | CoreError::SchemaNotFound(_)
        )
    }
}

/// Convert a string error to a Connection error
pub fn to_connection_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::Connection(err.to_string())
}

/// Convert a string error to a Registry error
pub fn to_registry_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::Registry(err.to_string())
}

/// Convert a string error to a Config error
pub fn to_config_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::Config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::QuestionNotFound(42);
        assert_eq!(err.to_string(), "Question not found: 42");

        let err = CoreError::DuplicateSchemaName("sales_db".to_string());
        assert_eq!(err.to_string(), "Duplicate schema name: sales_db");

        let err = CoreError::SeedScriptFailed {
            statement_index: 2,
            message: "relation \"orders\" already exists".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Seed script failed at statement 2: relation \"orders\" already exists"
        );
    }

    #[test]
    fn test_reference_error_classification() {
        assert!(CoreError::QuestionNotFound(1).is_reference_error());
        assert!(CoreError::SchemaNotFound("geo_db".to_string()).is_reference_error());
        assert!(!CoreError::Connection("refused".to_string()).is_reference_error());
        assert!(!CoreError::ExpectedQueryFailed {
            question_id: 1,
            message: "syntax error".to_string(),
        }
        .is_reference_error());
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: CoreError = io_err.into();
        match err {
            CoreError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }

        let err = to_connection_error("connection refused");
        match err {
            CoreError::Connection(msg) => assert_eq!(msg, "connection refused"),
            _ => panic!("Expected Connection variant"),
        }
    }
}
