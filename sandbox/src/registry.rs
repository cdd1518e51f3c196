//! Schema registry
//!
//! Durable record mapping a schema name to its physically isolated database.
//! Records are created by the provisioner, read by the connection broker, and
//! deactivated (never deleted in-band) by operators. Request-path code never
//! mutates them.

use deadpool_postgres::Pool;
use log::info;
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;

use sqlab_core::error::{CoreError, Result};
use sqlab_core::models::SchemaRecord;

/// DDL for the control tables, applied idempotently
const REGISTRY_DDL: &str = "
CREATE TABLE IF NOT EXISTS schema_registry (
    id            BIGSERIAL PRIMARY KEY,
    schema_name   TEXT NOT NULL UNIQUE,
    database_name TEXT NOT NULL UNIQUE,
    description   TEXT,
    is_active     BOOLEAN NOT NULL DEFAULT TRUE,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS questions (
    id             BIGSERIAL PRIMARY KEY,
    title          TEXT NOT NULL,
    description    TEXT,
    prompt         TEXT,
    expected_query TEXT NOT NULL,
    schema_id      BIGINT NOT NULL REFERENCES schema_registry (id)
);
";

/// Schema registry over the control database
#[derive(Clone)]
pub struct SchemaRegistry {
    /// Control-database pool
    pool: Pool,
}

impl SchemaRegistry {
    /// Create a registry over the control-database pool
    pub fn new(pool: Pool) -> Self {
        SchemaRegistry { pool }
    }

    /// Apply the control-table DDL. Idempotent; run by operational tooling
    /// and at server startup.
    pub async fn ensure_registry_tables(&self) -> Result<()> {
        let client = self.client().await?;
        client
            .batch_execute(REGISTRY_DDL)
            .await
            .map_err(|e| CoreError::Registry(e.to_string()))?;
        Ok(())
    }

    /// Register a new schema.
    ///
    /// The backing database name is recorded 1:1 with the schema name and is
    /// never updated afterwards; repointing a live schema is unsupported.
    pub async fn register(&self, name: &str, description: Option<&str>) -> Result<SchemaRecord> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO schema_registry (schema_name, database_name, description) \
                 VALUES ($1, $1, $2) \
                 RETURNING id, schema_name, database_name, description, is_active, created_at",
                &[&name, &description],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    CoreError::DuplicateSchemaName(name.to_string())
                } else {
                    CoreError::Registry(e.to_string())
                }
            })?;

        let record = record_from_row(&row);
        info!(
            "registered schema {} (id {}) backed by database {}",
            record.schema_name, record.id, record.database_name
        );
        Ok(record)
    }

    /// Look up an active schema by registry id.
    ///
    /// Inactive schemas are invisible here; the connection broker must not
    /// see them.
    pub async fn lookup(&self, id: i64) -> Result<SchemaRecord> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT id, schema_name, database_name, description, is_active, created_at \
                 FROM schema_registry WHERE id = $1 AND is_active",
                &[&id],
            )
            .await
            .map_err(|e| CoreError::Registry(e.to_string()))?;

        match row {
            Some(row) => Ok(record_from_row(&row)),
            None => Err(CoreError::SchemaNotFound(format!("id {}", id))),
        }
    }

    /// Look up an active schema by name
    pub async fn lookup_by_name(&self, name: &str) -> Result<SchemaRecord> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT id, schema_name, database_name, description, is_active, created_at \
                 FROM schema_registry WHERE schema_name = $1 AND is_active",
                &[&name],
            )
            .await
            .map_err(|e| CoreError::Registry(e.to_string()))?;

        match row {
            Some(row) => Ok(record_from_row(&row)),
            None => Err(CoreError::SchemaNotFound(name.to_string())),
        }
    }

    /// Deactivate a schema, hiding it from the broker. The record and its
    /// backing database stay in place.
    pub async fn deactivate(&self, id: i64) -> Result<()> {
        let client = self.client().await?;
        let updated = client
            .execute(
                "UPDATE schema_registry SET is_active = FALSE WHERE id = $1 AND is_active",
                &[&id],
            )
            .await
            .map_err(|e| CoreError::Registry(e.to_string()))?;

        if updated == 0 {
            return Err(CoreError::SchemaNotFound(format!("id {}", id)));
        }
        info!("deactivated schema id {}", id);
        Ok(())
    }

    /// List all schema records, active and inactive, for operational tooling
    pub async fn list(&self) -> Result<Vec<SchemaRecord>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT id, schema_name, database_name, description, is_active, created_at \
                 FROM schema_registry ORDER BY id",
                &[],
            )
            .await
            .map_err(|e| CoreError::Registry(e.to_string()))?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn client(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| CoreError::Connection(e.to_string()))
    }
}

fn record_from_row(row: &Row) -> SchemaRecord {
    SchemaRecord {
        id: row.get("id"),
        schema_name: row.get("schema_name"),
        database_name: row.get("database_name"),
        description: row.get("description"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}
