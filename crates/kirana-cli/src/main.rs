mod ingest;
mod template;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "kirana-cli")]
#[command(about = "Kirana catalog bulk-ingestion command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a blank bulk-upload template workbook
    Template {
        /// Template type: general, grocery, medical or restaurant
        #[arg(long = "type", default_value = "general")]
        kind: String,
        /// Output path (defaults to `<type>-template.xlsx`)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Ingest a spreadsheet into a store's catalog
    Ingest {
        /// Spreadsheet to ingest (xlsx, xls, xlsm, xlsb, ods or csv)
        file: PathBuf,
        #[arg(long)]
        store_id: i64,
        #[arg(long)]
        vendor_id: i64,
        /// Overrides the store's own type
        #[arg(long)]
        store_type: Option<String>,
        /// Normalize and report without touching the database
        #[arg(long)]
        dry_run: bool,
        /// YAML file overriding the built-in normalization profiles
        #[arg(long, env = "KIRANA_STORE_PROFILES_PATH")]
        profiles: Option<PathBuf>,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Template { kind, out } => template::run_template(&kind, out)?,
        Commands::Ingest {
            file,
            store_id,
            vendor_id,
            store_type,
            dry_run,
            profiles,
        } => {
            let args = ingest::IngestArgs {
                file,
                store_id,
                vendor_id,
                store_type,
                profiles,
            };
            if dry_run {
                ingest::run_ingest_dry_run(&args).await?;
            } else {
                ingest::run_ingest(&args).await?;
            }
        }
        Commands::Migrate => {
            let pool = connect().await?;
            let applied = kirana_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }

    Ok(())
}

/// Connects using the environment-driven application config.
async fn connect() -> anyhow::Result<sqlx::PgPool> {
    let config = kirana_core::load_app_config()?;
    let pool_config = kirana_db::PoolConfig::from_app_config(&config);
    let pool = kirana_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}
