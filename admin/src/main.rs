use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use sqlab_core::config::SandboxConfig;
use sqlab_sandbox::{control_pool, SchemaProvisioner, SchemaRegistry};

#[derive(Parser, Debug)]
#[clap(author, version, about = "sqlab schema provisioning tool")]
struct Args {
    /// Config file path (JSON); SQLAB_* environment variables override it
    #[clap(short, long, env = "SQLAB_CONFIG")]
    config: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new isolated database, register it, and optionally seed it
    Provision {
        /// Schema name (lowercase letters, digits, underscores)
        #[clap(long)]
        name: String,

        /// Free-text description
        #[clap(long)]
        description: Option<String>,

        /// Path to a SQL seed script applied to the new database
        #[clap(long)]
        seed: Option<PathBuf>,
    },

    /// Hide a schema from the connection broker; nothing is deleted
    Deactivate {
        /// Registry id of the schema
        #[clap(long)]
        id: i64,
    },

    /// List all registered schemas
    List,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => SandboxConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path))?,
        None => SandboxConfig::default(),
    };
    config.apply_env()?;

    let pool = control_pool(&config)?;
    let registry = SchemaRegistry::new(pool);
    registry
        .ensure_registry_tables()
        .await
        .context("preparing control tables")?;

    match args.command {
        Command::Provision {
            name,
            description,
            seed,
        } => {
            let seed_script = match &seed {
                Some(path) => Some(
                    std::fs::read_to_string(path)
                        .with_context(|| format!("reading seed script {}", path.display()))?,
                ),
                None => None,
            };

            let provisioner = SchemaProvisioner::new(config, registry);
            let record = provisioner
                .provision(&name, description.as_deref(), seed_script.as_deref())
                .await?;

            info!(
                "schema {} registered with id {} (database {})",
                record.schema_name, record.id, record.database_name
            );
            println!("provisioned schema {} (id {})", record.schema_name, record.id);
        }

        Command::Deactivate { id } => {
            registry.deactivate(id).await?;
            println!("deactivated schema id {}", id);
        }

        Command::List => {
            let records = registry.list().await?;
            if records.is_empty() {
                println!("no schemas registered");
            }
            for record in records {
                println!(
                    "{:>6}  {:<32}  {}  {}",
                    record.id,
                    record.schema_name,
                    if record.is_active { "active  " } else { "inactive" },
                    record.description.as_deref().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}
