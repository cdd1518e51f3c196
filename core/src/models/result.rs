//! Captured query results
//!
//! This module provides the normalized in-memory representation of a result
//! set: an ordered list of rows, each an ordered list of column name / value
//! pairs in the database's native order. Values are carried in the text wire
//! format, with NULL kept distinct from the empty string.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One captured result row: ordered column name / value pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    /// Column name / value pairs in the database's native column order
    pub fields: Vec<(String, Option<String>)>,
}

impl ResultRow {
    /// Create a row from ordered column name / value pairs
    pub fn new(fields: Vec<(String, Option<String>)>) -> Self {
        ResultRow { fields }
    }

    /// Get a value by column name (first match in native order)
    pub fn get(&self, column: &str) -> Option<&Option<String>> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

// Rows serialize as JSON objects keyed by column name so response payloads
// read naturally, while the in-memory form stays ordered for comparison.
impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// An ordered captured result set. Serializes transparently as a JSON array
/// of row objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    /// Captured rows in the database's native row order
    pub rows: Vec<ResultRow>,
}

impl ResultSet {
    /// Create an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of captured rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Outcome of executing one untrusted SQL statement.
///
/// SQL failures are values here, never propagated faults: the evaluator
/// shows students their own query's error text and moves on.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Captured rows (empty on failure or for non-row-returning statements)
    pub rows: ResultSet,

    /// Row count: captured rows for row-returning statements, the command
    /// tag's count otherwise
    pub row_count: u64,

    /// Database error text, verbatim, when execution failed
    pub error: Option<String>,

    /// Whether execution was cut off by the statement timeout
    pub timed_out: bool,

    /// Execution time in milliseconds
    pub elapsed_ms: u64,
}

impl ExecutionResult {
    /// Create a successful result
    pub fn success(rows: ResultSet, row_count: u64, elapsed_ms: u64) -> Self {
        ExecutionResult {
            rows,
            row_count,
            error: None,
            timed_out: false,
            elapsed_ms,
        }
    }

    /// Create a failed result carrying the database error text verbatim
    pub fn failure(error: String, elapsed_ms: u64) -> Self {
        ExecutionResult {
            rows: ResultSet::new(),
            row_count: 0,
            error: Some(error),
            timed_out: false,
            elapsed_ms,
        }
    }

    /// Create a timeout result
    pub fn timeout(timeout_ms: u64) -> Self {
        ExecutionResult {
            rows: ResultSet::new(),
            row_count: 0,
            error: Some(format!(
                "query execution exceeded the {} ms statement timeout",
                timeout_ms
            )),
            timed_out: true,
            elapsed_ms: timeout_ms,
        }
    }

    /// Whether execution succeeded
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Option<&str>)]) -> ResultRow {
        ResultRow::new(
            pairs
                .iter()
                .map(|(name, value)| (name.to_string(), value.map(str::to_string)))
                .collect(),
        )
    }

    #[test]
    fn test_row_serializes_as_object() {
        let row = row(&[("id", Some("1")), ("amount", Some("100")), ("note", None)]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":"1","amount":"100","note":null}"#);
    }

    #[test]
    fn test_result_set_serializes_as_array() {
        let set = ResultSet {
            rows: vec![row(&[("id", Some("1"))]), row(&[("id", Some("2"))])],
        };
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[{"id":"1"},{"id":"2"}]"#);
    }

    #[test]
    fn test_row_get_by_column_name() {
        let row = row(&[("id", Some("1")), ("amount", None)]);
        assert_eq!(row.get("id"), Some(&Some("1".to_string())));
        assert_eq!(row.get("amount"), Some(&None));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_null_is_distinct_from_empty_string() {
        let with_null = row(&[("note", None)]);
        let with_empty = row(&[("note", Some(""))]);
        assert_ne!(with_null, with_empty);
    }

    #[test]
    fn test_execution_result_success() {
        let set = ResultSet {
            rows: vec![row(&[("amount", Some("100"))]), row(&[("amount", Some("200"))])],
        };
        let result = ExecutionResult::success(set, 2, 5);
        assert!(result.succeeded());
        assert_eq!(result.row_count, 2);
        assert!(!result.timed_out);
    }

    #[test]
    fn test_execution_result_failure_carries_error_verbatim() {
        let result = ExecutionResult::failure(
            "relation \"nonexistent_table\" does not exist".to_string(),
            3,
        );
        assert!(!result.succeeded());
        assert_eq!(result.rows.row_count(), 0);
        assert_eq!(
            result.error.as_deref(),
            Some("relation \"nonexistent_table\" does not exist")
        );
    }

    #[test]
    fn test_execution_result_timeout() {
        let result = ExecutionResult::timeout(2000);
        assert!(!result.succeeded());
        assert!(result.timed_out);
        assert!(result.error.as_deref().unwrap().contains("2000 ms"));
    }
}
