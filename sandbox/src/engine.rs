//! Query execution engine
//!
//! Executes one untrusted SQL statement against a broker-provided lease and
//! captures the full result set. SQL failures never propagate past this
//! boundary: every outcome, including syntax errors, missing tables, and
//! timeouts, comes back as an [`ExecutionResult`] value. The statement runs
//! exactly as supplied, with no rewriting, parameterization, or filtering.
//!
//! Runaway statements are stopped by the backend: every lease carries a
//! server-side `statement_timeout`, so a long cross join is canceled at the
//! source rather than streamed to this process. The client-side timer is a
//! backstop for a backend that stops responding, and `max_result_rows` is a
//! response-size limit on what a submission may hand back for grading.

use std::time::{Duration, Instant};

use log::{debug, warn};
use tokio::time::timeout;
use tokio_postgres::error::SqlState;
use tokio_postgres::SimpleQueryMessage;

use sqlab_core::config::SandboxConfig;
use sqlab_core::models::{ExecutionResult, ResultRow, ResultSet};

use crate::broker::SandboxLease;
use crate::connect::sql_error_text;

/// Executor for untrusted single-statement SQL
#[derive(Clone)]
pub struct QueryEngine {
    /// Evaluator configuration (statement timeout, row cap)
    config: SandboxConfig,
}

impl QueryEngine {
    /// Create an engine
    pub fn new(config: SandboxConfig) -> Self {
        QueryEngine { config }
    }

    /// Execute one SQL statement and capture its result.
    ///
    /// Rows come back in the database's native row and column order, values
    /// in text form with NULL kept distinct from the empty string. A
    /// statement canceled by the server's `statement_timeout` reports as a
    /// timeout; if the client-side backstop fires instead, the lease's
    /// physical connection is killed so the backend stops working on the
    /// statement.
    pub async fn execute(&self, lease: &SandboxLease, sql: &str) -> ExecutionResult {
        let started = Instant::now();
        let statement_timeout = self.config.statement_timeout;
        // Grace period so the server-side cancellation normally arrives first
        let backstop = statement_timeout + Duration::from_secs(1);

        let run = lease.client().simple_query(sql);
        let messages = match timeout(backstop, run).await {
            Err(_) => {
                warn!(
                    "session {}: no response within the {} ms backstop, killing connection",
                    lease.session_id(),
                    backstop.as_millis()
                );
                lease.abort();
                return ExecutionResult::timeout(statement_timeout.as_millis() as u64);
            }
            Ok(Err(e)) => {
                if e.code() == Some(&SqlState::QUERY_CANCELED) {
                    warn!(
                        "session {}: statement canceled by the server-side {} ms timeout",
                        lease.session_id(),
                        statement_timeout.as_millis()
                    );
                    return ExecutionResult::timeout(statement_timeout.as_millis() as u64);
                }
                let elapsed = started.elapsed().as_millis() as u64;
                let text = sql_error_text(&e);
                debug!(
                    "session {}: statement failed after {} ms: {}",
                    lease.session_id(),
                    elapsed,
                    text
                );
                return ExecutionResult::failure(text, elapsed);
            }
            Ok(Ok(messages)) => messages,
        };

        let mut rows = Vec::new();
        let mut tag_count: Option<u64> = None;

        for message in messages {
            match message {
                SimpleQueryMessage::Row(row) => {
                    if rows.len() >= self.config.max_result_rows {
                        let elapsed = started.elapsed().as_millis() as u64;
                        return ExecutionResult::failure(
                            format!(
                                "result set exceeds the {} row capture limit",
                                self.config.max_result_rows
                            ),
                            elapsed,
                        );
                    }
                    let mut fields = Vec::with_capacity(row.len());
                    for (index, column) in row.columns().iter().enumerate() {
                        fields.push((
                            column.name().to_string(),
                            row.get(index).map(str::to_string),
                        ));
                    }
                    rows.push(ResultRow::new(fields));
                }
                SimpleQueryMessage::CommandComplete(count) => {
                    tag_count = Some(count);
                }
                _ => {}
            }
        }

        let elapsed = started.elapsed().as_millis() as u64;
        let row_count = if rows.is_empty() {
            tag_count.unwrap_or(0)
        } else {
            rows.len() as u64
        };

        debug!(
            "session {}: statement returned {} rows in {} ms",
            lease.session_id(),
            rows.len(),
            elapsed
        );

        ExecutionResult::success(ResultSet { rows }, row_count, elapsed)
    }
}
