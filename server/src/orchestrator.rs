//! Submission orchestration
//!
//! The request-facing coordinator: validates the submission, drives the
//! broker → engine → comparator pipeline, and assembles the outcome. The
//! pipeline is linear with one early exit: when the student's query fails,
//! the instructor's expected query is never run and the student sees their
//! own error.

use tracing::{debug, error, info};

use sqlab_core::compare::{fingerprint, results_match};
use sqlab_core::error::{CoreError, Result};
use sqlab_core::models::ResultSet;
use sqlab_sandbox::{ConnectionBroker, QueryEngine};

/// Outcome of one graded submission
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// The student's query failed; the error text is theirs, verbatim
    StudentError {
        /// Database error text from the student's statement
        error: String,
    },

    /// Both queries ran; the verdict and both result sets
    Graded {
        /// Whether the student's result matched the expected result
        is_correct: bool,
        /// The student's captured rows
        student_results: ResultSet,
        /// The instructor's captured rows
        expected_results: ResultSet,
        /// Row count of the student's statement
        rows_affected: u64,
    },
}

/// Coordinator for the submit pipeline
#[derive(Clone)]
pub struct SubmissionOrchestrator {
    /// Connection broker (question resolution + leases)
    broker: ConnectionBroker,

    /// Untrusted-query executor
    engine: QueryEngine,
}

impl SubmissionOrchestrator {
    /// Create an orchestrator
    pub fn new(broker: ConnectionBroker, engine: QueryEngine) -> Self {
        SubmissionOrchestrator { broker, engine }
    }

    /// Grade one submission.
    ///
    /// Reference errors (unknown question, missing/inactive schema) and
    /// infrastructure failures come back as `Err`; student SQL failures come
    /// back as `Ok(StudentError)`. A failing expected-result query is an
    /// `ExpectedQueryFailed` fault, never presented as the student's
    /// mistake.
    pub async fn submit(&self, question_id: i64, student_query: &str) -> Result<SubmissionOutcome> {
        let student_query = student_query.trim();
        if student_query.is_empty() {
            return Err(CoreError::InvalidSubmission(
                "query must not be empty".to_string(),
            ));
        }

        let (question, schema) = self.broker.resolve_question(question_id).await?;

        // Student query first, on its own connection
        let lease = self.broker.lease_for_schema(&schema).await?;
        let student = self.engine.execute(&lease, student_query).await;
        drop(lease);

        if !student.succeeded() {
            let error = student.error.unwrap_or_default();
            info!(
                question_id,
                timed_out = student.timed_out,
                "student query failed: {}",
                error
            );
            return Ok(SubmissionOutcome::StudentError { error });
        }

        // Expected query on a fresh connection
        let lease = self.broker.lease_for_schema(&schema).await?;
        let expected = self.engine.execute(&lease, &question.expected_query).await;
        drop(lease);

        if !expected.succeeded() {
            let message = expected.error.unwrap_or_default();
            error!(
                question_id,
                "expected-result query failed, needs instructor attention: {}", message
            );
            return Err(CoreError::ExpectedQueryFailed {
                question_id,
                message,
            });
        }

        let is_correct = results_match(&student.rows, &expected.rows);
        debug!(
            question_id,
            is_correct,
            student_fingerprint = %fingerprint(&student.rows),
            expected_fingerprint = %fingerprint(&expected.rows),
            "graded submission"
        );

        Ok(SubmissionOutcome::Graded {
            is_correct,
            student_results: student.rows,
            expected_results: expected.rows,
            rows_affected: student.row_count,
        })
    }
}
