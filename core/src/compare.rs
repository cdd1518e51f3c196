//! Result comparison
//!
//! This module decides whether a student's captured result set matches the
//! instructor's expected result set. Comparison is structural over the
//! normalized in-memory representation, not over a serialized form, so the
//! verdict cannot be skewed by formatting differences in a serializer.
//!
//! Row order is significant: a result set and its permutation do not match.
//! Column names, column order, and values (with NULL distinct from the empty
//! string) must all agree. Equality is all-or-nothing; there is no partial
//! credit.

use sha2::{Digest, Sha256};

use crate::models::{ResultRow, ResultSet};

/// Compare two captured result sets structurally.
///
/// Returns `true` only when both sets have the same number of rows and every
/// row pair agrees on column count, column names, column order, and values.
pub fn results_match(actual: &ResultSet, expected: &ResultSet) -> bool {
    if actual.rows.len() != expected.rows.len() {
        return false;
    }
    actual
        .rows
        .iter()
        .zip(expected.rows.iter())
        .all(|(a, e)| rows_match(a, e))
}

fn rows_match(actual: &ResultRow, expected: &ResultRow) -> bool {
    if actual.fields.len() != expected.fields.len() {
        return false;
    }
    actual
        .fields
        .iter()
        .zip(expected.fields.iter())
        .all(|((a_name, a_value), (e_name, e_value))| a_name == e_name && a_value == e_value)
}

/// Compute a hex SHA-256 fingerprint of a result set over a length-prefixed
/// canonical encoding.
///
/// Used for debug logging only; the correctness verdict always comes from
/// [`results_match`].
pub fn fingerprint(set: &ResultSet) -> String {
    let mut hasher = Sha256::new();
    hasher.update((set.rows.len() as u64).to_be_bytes());
    for row in &set.rows {
        hasher.update((row.fields.len() as u64).to_be_bytes());
        for (name, value) in &row.fields {
            hasher.update((name.len() as u64).to_be_bytes());
            hasher.update(name.as_bytes());
            match value {
                Some(v) => {
                    hasher.update([1u8]);
                    hasher.update((v.len() as u64).to_be_bytes());
                    hasher.update(v.as_bytes());
                }
                None => hasher.update([0u8]),
            }
        }
    }
    hex::encode(hasher.finalize())
}
