//! Schema registry records
//!
//! A schema is a named, logically isolated exercise environment. Each record
//! maps the schema name to one physically separate database on the sandbox
//! server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered exercise schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaRecord {
    /// Numeric registry id
    pub id: i64,

    /// Unique, human-readable schema name
    pub schema_name: String,

    /// Name of the backing isolated database. Matches `schema_name` in the
    /// base design but is stored separately; it is written once at
    /// registration and has no update path.
    pub database_name: String,

    /// Free-text description
    pub description: Option<String>,

    /// Whether the schema is visible to the connection broker. Deactivated
    /// schemas are never physically deleted in-band.
    pub is_active: bool,

    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl SchemaRecord {
    /// Validate a candidate schema name before it is spliced into DDL.
    ///
    /// Identifier positions cannot be parameterized, so names are restricted
    /// to lowercase ASCII letters, digits, and underscores, starting with a
    /// letter, at most 63 bytes (the PostgreSQL identifier limit).
    pub fn validate_name(name: &str) -> bool {
        if name.is_empty() || name.len() > 63 {
            return false;
        }
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }
}
