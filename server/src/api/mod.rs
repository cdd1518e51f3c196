//! HTTP API for the sandbox evaluator
//!
//! Request-facing surface consumed by the learning-management frontend. The
//! response shapes are a fixed contract: student-query failures are normal
//! 200 responses carrying the student's own error text and no `is_correct`
//! key; reference errors are 404s; infrastructure and instructor-query
//! faults are 500s.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use sqlab_core::error::CoreError;
use sqlab_core::models::ResultSet;
use sqlab_sandbox::QuestionStore;

use crate::orchestrator::{SubmissionOrchestrator, SubmissionOutcome};

/// Shared application state
pub struct AppState {
    /// Submission pipeline
    pub orchestrator: SubmissionOrchestrator,

    /// Question lookup for the read-only question endpoint
    pub questions: QuestionStore,
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/submissions", post(submit))
        .route("/questions/:id", get(get_question))
        .with_state(state)
}

/// Submission request body
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Question being answered
    pub question_id: i64,

    /// The student's SQL
    pub query: String,
}

/// Response when the student's query executed on both sides
#[derive(Debug, Serialize)]
pub struct GradedResponse {
    /// Always true for this shape
    pub success: bool,

    /// Correctness verdict
    pub is_correct: bool,

    /// The student's captured rows
    pub student_results: ResultSet,

    /// The instructor's captured rows
    pub expected_results: ResultSet,

    /// Row count of the student's statement
    pub rows_affected: u64,
}

/// Response when the student's query failed. Carries no `is_correct` key.
#[derive(Debug, Serialize)]
pub struct StudentErrorResponse {
    /// Always false for this shape
    pub success: bool,

    /// The student's database error text, verbatim
    pub error: String,

    /// Fixed human-readable message
    pub message: String,
}

/// Error envelope for reference errors and faults
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always false for this shape
    pub success: bool,

    /// Human-readable message
    pub message: String,

    /// Error detail, present on 500s only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Question payload for the read-only lookup endpoint
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    /// Always true for this shape
    pub success: bool,

    /// The question, without its expected-result query
    pub question: QuestionBody,
}

/// Student-visible question fields
#[derive(Debug, Serialize)]
pub struct QuestionBody {
    /// Question id
    pub id: i64,

    /// Question title
    pub title: String,

    /// Question description
    pub description: Option<String>,

    /// Owning schema name
    pub schema_name: String,
}

/// Grade a submission
async fn submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> Response {
    match state
        .orchestrator
        .submit(request.question_id, &request.query)
        .await
    {
        Ok(SubmissionOutcome::Graded {
            is_correct,
            student_results,
            expected_results,
            rows_affected,
        }) => Json(GradedResponse {
            success: true,
            is_correct,
            student_results,
            expected_results,
            rows_affected,
        })
        .into_response(),

        Ok(SubmissionOutcome::StudentError { error }) => Json(StudentErrorResponse {
            success: false,
            error,
            message: "Error executing student query.".to_string(),
        })
        .into_response(),

        Err(e) => error_response(e),
    }
}

/// Look up a question by id
async fn get_question(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match state.questions.resolve(id).await {
        Ok((question, schema)) => Json(QuestionResponse {
            success: true,
            question: QuestionBody {
                id: question.id,
                title: question.title,
                description: question.description,
                schema_name: schema.schema_name,
            },
        })
        .into_response(),

        Err(e) => error_response(e),
    }
}

/// Map an error to the external response contract
fn error_response(err: CoreError) -> Response {
    if err.is_reference_error() {
        let body = ErrorResponse {
            success: false,
            message: "Question not found".to_string(),
            error: None,
        };
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    }

    if let CoreError::InvalidSubmission(message) = &err {
        let body = ErrorResponse {
            success: false,
            message: message.clone(),
            error: None,
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    // Infrastructure and instructor-query faults; detail is for operators,
    // the expected query's text is never part of it
    error!("request failed: {}", err);
    let body = ErrorResponse {
        success: false,
        message: "Internal server error".to_string(),
        error: Some(err.to_string()),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlab_core::models::ResultRow;

    fn rows() -> ResultSet {
        ResultSet {
            rows: vec![
                ResultRow::new(vec![("amount".to_string(), Some("100".to_string()))]),
                ResultRow::new(vec![("amount".to_string(), Some("200".to_string()))]),
            ],
        }
    }

    #[test]
    fn test_graded_response_shape() {
        let response = GradedResponse {
            success: true,
            is_correct: true,
            student_results: rows(),
            expected_results: rows(),
            rows_affected: 2,
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&response).unwrap()).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["is_correct"], true);
        assert_eq!(json["rows_affected"], 2);
        assert_eq!(json["student_results"][0]["amount"], "100");
        assert_eq!(json["expected_results"][1]["amount"], "200");
    }

    #[test]
    fn test_student_error_response_has_no_is_correct_key() {
        let response = StudentErrorResponse {
            success: false,
            error: "relation \"nonexistent_table\" does not exist".to_string(),
            message: "Error executing student query.".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&response).unwrap()).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Error executing student query.");
        assert_eq!(
            json["error"],
            "relation \"nonexistent_table\" does not exist"
        );
        assert!(json.get("is_correct").is_none());
    }

    #[test]
    fn test_not_found_envelope_omits_error_detail() {
        let response = ErrorResponse {
            success: false,
            message: "Question not found".to_string(),
            error: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"success":false,"message":"Question not found"}"#);
    }

    #[test]
    fn test_question_response_shape() {
        let response = QuestionResponse {
            success: true,
            question: QuestionBody {
                id: 7,
                title: "Order totals".to_string(),
                description: None,
                schema_name: "sales_db".to_string(),
            },
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&response).unwrap()).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["question"]["id"], 7);
        assert_eq!(json["question"]["schema_name"], "sales_db");
        assert!(json["question"].get("expected_query").is_none());
    }
}
