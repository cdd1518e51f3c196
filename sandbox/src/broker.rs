//! Connection broker
//!
//! Maps a question to a live connection scoped to the question's isolated
//! database, and guarantees the connection is torn down after use on every
//! exit path. Every lease is a fresh physical connection with a per-call
//! UUID session id; connections are never pooled, cached, or shared between
//! requests, so concurrent submissions against the same schema cannot
//! collide on connection state.

use std::time::Instant;

use log::debug;
use tokio::task::JoinHandle;
use tokio_postgres::Client;
use uuid::Uuid;

use sqlab_core::config::SandboxConfig;
use sqlab_core::error::Result;
use sqlab_core::models::{Question, SchemaRecord};

use crate::connect::open_connection;
use crate::questions::QuestionStore;

/// One short-lived sandbox connection.
///
/// Owns the tokio-postgres client and its driver task. Dropping the lease
/// aborts the driver, which closes the physical connection; this holds on
/// early returns and panics, so no lease outlives its call.
pub struct SandboxLease {
    /// Per-call session id, also the connection's `application_name`
    session_id: Uuid,

    /// Schema this lease is scoped to
    schema_name: String,

    /// Backing database the connection points at
    database_name: String,

    /// The live client
    client: Client,

    /// Driver task owning the socket
    driver: JoinHandle<()>,

    /// When the lease was opened
    opened_at: Instant,
}

impl SandboxLease {
    /// The live client. Valid only for the lifetime of the lease.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Per-call session id
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Name of the schema this lease is scoped to
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Kill the physical connection immediately. Used by the engine when a
    /// statement overruns its timeout and the backend must not keep running
    /// it.
    pub fn abort(&self) {
        self.driver.abort();
    }

    /// Close the lease on the orderly path
    pub fn close(self) {
        // Teardown happens in Drop
    }
}

impl Drop for SandboxLease {
    fn drop(&mut self) {
        self.driver.abort();
        debug!(
            "closed sandbox session {} to {} after {} ms",
            self.session_id,
            self.database_name,
            self.opened_at.elapsed().as_millis()
        );
    }
}

/// Broker handing out fresh, scoped sandbox connections
#[derive(Clone)]
pub struct ConnectionBroker {
    /// Evaluator configuration (server coordinates, timeouts)
    config: SandboxConfig,

    /// Question resolution
    questions: QuestionStore,
}

impl ConnectionBroker {
    /// Create a broker
    pub fn new(config: SandboxConfig, questions: QuestionStore) -> Self {
        ConnectionBroker { config, questions }
    }

    /// Resolve a question to its owning active schema
    pub async fn resolve_question(&self, question_id: i64) -> Result<(Question, SchemaRecord)> {
        self.questions.resolve(question_id).await
    }

    /// Open a fresh lease scoped to the given question's schema
    pub async fn lease_for_question(&self, question_id: i64) -> Result<SandboxLease> {
        let (_, schema) = self.resolve_question(question_id).await?;
        self.lease_for_schema(&schema).await
    }

    /// Open a fresh lease scoped to a resolved schema record
    pub async fn lease_for_schema(&self, schema: &SchemaRecord) -> Result<SandboxLease> {
        let session_id = Uuid::new_v4();
        let application_name = format!("sqlab-{}", session_id);

        let (client, driver) = open_connection(
            &self.config.server,
            &schema.database_name,
            &application_name,
            self.config.connect_timeout,
            Some(self.config.statement_timeout),
        )
        .await?;

        debug!(
            "opened sandbox session {} to {} for schema {}",
            session_id, schema.database_name, schema.schema_name
        );

        Ok(SandboxLease {
            session_id,
            schema_name: schema.schema_name.clone(),
            database_name: schema.database_name.clone(),
            client,
            driver,
            opened_at: Instant::now(),
        })
    }
}
