//! Exercise questions
//!
//! Questions are authored by instructional staff outside this system and are
//! read-only here: the evaluator only ever resolves a question to its schema
//! and runs its expected-result query as the correctness oracle.

use serde::{Deserialize, Serialize};

/// An exercise question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Numeric question id
    pub id: i64,

    /// Question title
    pub title: String,

    /// Question description
    pub description: Option<String>,

    /// Student-facing prompt
    pub prompt: Option<String>,

    /// Trusted, instructor-authored SQL whose output is the correctness
    /// oracle. Never serialized into student-facing payloads.
    #[serde(skip_serializing, default)]
    pub expected_query: String,

    /// Owning schema record id
    pub schema_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_query_is_never_serialized() {
        let question = Question {
            id: 1,
            title: "Order totals".to_string(),
            description: None,
            prompt: Some("List the amount of every order.".to_string()),
            expected_query: "SELECT amount FROM orders ORDER BY id".to_string(),
            schema_id: 3,
        };

        let json = serde_json::to_string(&question).unwrap();
        assert!(!json.contains("expected_query"));
        assert!(!json.contains("SELECT amount"));
        assert!(json.contains("Order totals"));
    }
}
