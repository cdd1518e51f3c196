//! Connection plumbing
//!
//! This module builds per-call tokio-postgres configurations from an explicit
//! [`ServerConnConfig`] and opens connections with a bounded connect time.
//! The control database gets a deadpool pool; sandbox databases never do.

use std::time::Duration;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use log::debug;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_postgres::{Client, NoTls};

use sqlab_core::config::{SandboxConfig, ServerConnConfig};
use sqlab_core::error::{CoreError, Result};

/// Build a tokio-postgres config for one connection.
///
/// `dbname` selects the target database; `application_name` makes the
/// caller's session id visible in `pg_stat_activity`. When a
/// `statement_timeout` is given it is installed server-side through the
/// startup options, so the backend cancels overrunning statements itself
/// instead of streaming their output to the client.
pub fn pg_config(
    server: &ServerConnConfig,
    dbname: &str,
    application_name: &str,
    statement_timeout: Option<Duration>,
) -> tokio_postgres::Config {
    let mut config = tokio_postgres::Config::new();
    config
        .host(&server.host)
        .port(server.port)
        .user(&server.user)
        .dbname(dbname)
        .application_name(application_name);
    if !server.password.is_empty() {
        config.password(&server.password);
    }
    if let Some(limit) = statement_timeout {
        config.options(&format!("-c statement_timeout={}", limit.as_millis()));
    }
    config
}

/// Open one fresh connection and spawn its driver task.
///
/// The returned handle owns the socket driver; aborting it tears the
/// physical connection down.
pub async fn open_connection(
    server: &ServerConnConfig,
    dbname: &str,
    application_name: &str,
    connect_timeout: Duration,
    statement_timeout: Option<Duration>,
) -> Result<(Client, JoinHandle<()>)> {
    let config = pg_config(server, dbname, application_name, statement_timeout);

    let connect = config.connect(NoTls);
    let (client, connection) = timeout(connect_timeout, connect)
        .await
        .map_err(|_| {
            CoreError::Connection(format!(
                "connecting to database {} timed out after {} ms",
                dbname,
                connect_timeout.as_millis()
            ))
        })?
        .map_err(|e| CoreError::Connection(e.to_string()))?;

    let driver_dbname = dbname.to_string();
    let driver = tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!("connection driver for {} ended: {}", driver_dbname, e);
        }
    });

    Ok((client, driver))
}

/// Build the control-database pool used by the registry and question store
pub fn control_pool(config: &SandboxConfig) -> Result<Pool> {
    let pg = pg_config(
        &config.server,
        &config.control_database,
        "sqlab-control",
        None,
    );
    let manager = Manager::from_config(
        pg,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(config.control_pool_size)
        .build()
        .map_err(|e| CoreError::Connection(e.to_string()))
}

/// Extract the server's error text from a tokio-postgres error.
///
/// Prefers the bare database message (what psql would print) over the
/// client wrapper's "db error:" prefix, so students see the text the server
/// produced.
pub fn sql_error_text(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => db.message().to_string(),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pg_config_carries_explicit_coordinates() {
        let server = ServerConnConfig {
            host: "db.internal".to_string(),
            port: 5433,
            user: "sandbox".to_string(),
            password: "secret".to_string(),
        };
        let config = pg_config(&server, "sales_db", "sqlab-test", None);

        assert_eq!(config.get_dbname(), Some("sales_db"));
        assert_eq!(config.get_user(), Some("sandbox"));
        assert_eq!(config.get_ports(), &[5433]);
        assert_eq!(config.get_application_name(), Some("sqlab-test"));
        assert_eq!(config.get_options(), None);
    }

    #[test]
    fn test_pg_config_installs_server_side_statement_timeout() {
        let server = ServerConnConfig::default();
        let config = pg_config(
            &server,
            "sales_db",
            "sqlab-test",
            Some(Duration::from_secs(2)),
        );

        assert_eq!(config.get_options(), Some("-c statement_timeout=2000"));
    }

    #[test]
    fn test_control_pool_respects_configured_size() {
        let mut config = SandboxConfig::for_testing();
        config.control_pool_size = 3;
        let pool = control_pool(&config).unwrap();
        assert_eq!(pool.status().max_size, 3);
    }

    #[tokio::test]
    async fn test_open_connection_reports_unreachable_server() {
        // Reserved TEST-NET address, nothing listens there
        let server = ServerConnConfig {
            host: "192.0.2.1".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
        };
        let err = open_connection(
            &server,
            "none",
            "sqlab-test",
            Duration::from_millis(200),
            None,
        )
        .await
        .unwrap_err();
        match err {
            CoreError::Connection(_) => {}
            other => panic!("Expected Connection error, got {:?}", other),
        }
    }
}
