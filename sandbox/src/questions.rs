//! Question store
//!
//! Read-only access to questions from the control database. Questions are
//! authored elsewhere; the evaluator only resolves them and reads their
//! expected-result query.

use deadpool_postgres::Pool;
use tokio_postgres::Row;

use sqlab_core::error::{CoreError, Result};
use sqlab_core::models::{Question, SchemaRecord};

/// Read-only question lookup over the control database
#[derive(Clone)]
pub struct QuestionStore {
    /// Control-database pool
    pool: Pool,
}

impl QuestionStore {
    /// Create a question store over the control-database pool
    pub fn new(pool: Pool) -> Self {
        QuestionStore { pool }
    }

    /// Look up a question by id
    pub async fn lookup(&self, id: i64) -> Result<Question> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT id, title, description, prompt, expected_query, schema_id \
                 FROM questions WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(|e| CoreError::Registry(e.to_string()))?;

        match row {
            Some(row) => Ok(question_from_row(&row)),
            None => Err(CoreError::QuestionNotFound(id)),
        }
    }

    /// Resolve a question together with its owning active schema.
    ///
    /// Fails with `QuestionNotFound` for an unknown question and with
    /// `SchemaNotFound` when the owning schema is missing or inactive.
    pub async fn resolve(&self, id: i64) -> Result<(Question, SchemaRecord)> {
        let question = self.lookup(id).await?;

        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT id, schema_name, database_name, description, is_active, created_at \
                 FROM schema_registry WHERE id = $1 AND is_active",
                &[&question.schema_id],
            )
            .await
            .map_err(|e| CoreError::Registry(e.to_string()))?;

        match row {
            Some(row) => {
                let schema = SchemaRecord {
                    id: row.get("id"),
                    schema_name: row.get("schema_name"),
                    database_name: row.get("database_name"),
                    description: row.get("description"),
                    is_active: row.get("is_active"),
                    created_at: row.get("created_at"),
                };
                Ok((question, schema))
            }
            None => Err(CoreError::SchemaNotFound(format!(
                "id {}",
                question.schema_id
            ))),
        }
    }

    async fn client(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| CoreError::Connection(e.to_string()))
    }
}

fn question_from_row(row: &Row) -> Question {
    Question {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        prompt: row.get("prompt"),
        expected_query: row.get("expected_query"),
        schema_id: row.get("schema_id"),
    }
}
