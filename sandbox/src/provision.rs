//! Schema provisioner
//!
//! One-shot administrative operation that creates a new isolated database,
//! registers it in the schema registry, and optionally seeds it from a SQL
//! script. Runs out of band, never on the request path.
//!
//! The provisioner always works from an explicit [`ServerConnConfig`]; it
//! opens its own administrative connection to the maintenance database to
//! issue `CREATE DATABASE` and never touches process-wide connection state.

use log::{info, warn};
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use sqlab_core::config::SandboxConfig;
use sqlab_core::error::{CoreError, Result};
use sqlab_core::models::SchemaRecord;
use sqlab_core::script::split_statements;

use crate::connect::{open_connection, sql_error_text};
use crate::registry::SchemaRegistry;

/// Provisioner for new exercise schemas
pub struct SchemaProvisioner {
    /// Evaluator configuration (server coordinates, maintenance database)
    config: SandboxConfig,

    /// Registry recording the new schema
    registry: SchemaRegistry,
}

impl SchemaProvisioner {
    /// Create a provisioner
    pub fn new(config: SandboxConfig, registry: SchemaRegistry) -> Self {
        SchemaProvisioner { config, registry }
    }

    /// Provision a new schema: create its isolated database, register it,
    /// and apply the seed script if one is supplied.
    ///
    /// When registration fails after the database was created, the physical
    /// database is left in place and named in a warning so an operator can
    /// drop it.
    pub async fn provision(
        &self,
        name: &str,
        description: Option<&str>,
        seed_script: Option<&str>,
    ) -> Result<SchemaRecord> {
        if !SchemaRecord::validate_name(name) {
            return Err(CoreError::InvalidSchemaName(name.to_string()));
        }

        self.create_database(name).await?;

        let record = match self.registry.register(name, description).await {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "registration of schema {} failed; database {} was created and is orphaned",
                    name, name
                );
                return Err(e);
            }
        };

        if let Some(script) = seed_script {
            self.apply_seed_script(&record, script).await?;
        }

        info!("provisioned schema {} (id {})", record.schema_name, record.id);
        Ok(record)
    }

    /// Create the isolated database via an administrative connection to the
    /// maintenance database
    async fn create_database(&self, name: &str) -> Result<()> {
        let session = format!("sqlab-admin-{}", Uuid::new_v4());
        let (client, driver) = open_connection(
            &self.config.server,
            &self.config.maintenance_database,
            &session,
            self.config.connect_timeout,
            None,
        )
        .await
        .map_err(|e| CoreError::DatabaseCreationFailed(e.to_string()))?;

        // Name is validated; identifier positions cannot be parameterized
        let result = client
            .batch_execute(&format!("CREATE DATABASE \"{}\"", name))
            .await;
        driver.abort();

        result.map_err(|e| {
            if e.code() == Some(&SqlState::DUPLICATE_DATABASE) {
                CoreError::DatabaseCreationFailed(format!("database {} already exists", name))
            } else {
                CoreError::DatabaseCreationFailed(sql_error_text(&e))
            }
        })?;

        info!("created isolated database {}", name);
        Ok(())
    }

    /// Split the seed script and run each statement in order against the new
    /// database, stopping at the first failure. The throwaway connection is
    /// released on every path.
    async fn apply_seed_script(&self, record: &SchemaRecord, script: &str) -> Result<()> {
        let session = format!("sqlab-seed-{}", Uuid::new_v4());
        let (client, driver) = open_connection(
            &self.config.server,
            &record.database_name,
            &session,
            self.config.connect_timeout,
            None,
        )
        .await?;

        let statements = split_statements(script);
        let mut outcome = Ok(());

        for (index, statement) in statements.iter().enumerate() {
            if let Err(e) = client.batch_execute(statement).await {
                outcome = Err(CoreError::SeedScriptFailed {
                    statement_index: index,
                    message: sql_error_text(&e),
                });
                break;
            }
        }
        driver.abort();

        match &outcome {
            Ok(()) => info!(
                "seeded database {} with {} statements",
                record.database_name,
                statements.len()
            ),
            Err(e) => warn!("seeding database {} failed: {}", record.database_name, e),
        }
        outcome
    }
}
