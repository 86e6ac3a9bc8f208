//! # Serali Admin CLI
//!
//! Inspects and replaces the stored brand settings without the web page.
//!
//! ## Usage
//! ```bash
//! # Print the effective settings document
//! serali-admin show
//!
//! # Validate a JSON document and save it
//! serali-admin import ./brand.json
//!
//! # Write the effective settings to a file
//! serali-admin export ./brand.json
//!
//! # Use another database or config file
//! serali-admin --db ./data/settings.db --config ./admin.toml show
//! ```
//!
//! `import` goes through the same validation and save path as the settings
//! page: a document that enables home delivery without an active zone is
//! rejected and nothing is written.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serali_admin::config::DEFAULT_LOG_FILTER;
use serali_admin::{init_tracing, AdminConfig, EditorSession};
use serali_core::PartialBrandConfig;
use serali_db::Database;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "serali-admin", about = "Serali brand settings editor")]
struct Cli {
    /// Path to admin.toml (defaults to the platform config dir).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// SQLite settings database, overriding the config file.
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the effective settings document as JSON.
    Show,
    /// Validate a JSON settings document and save it.
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Write the effective settings document to a file.
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = init_tracing(DEFAULT_LOG_FILTER);

    let mut config = AdminConfig::load(cli.config).context("loading admin config")?;
    if let Some(db) = cli.db {
        config.database.path = Some(db);
    }
    logging.apply(&config.logging.filter);

    let db_config = config.db_config()?;
    info!(path = ?db_config.database_path, "Opening settings database");
    let db = Database::new(db_config).await?;
    let repo = db.brand_config();

    let session = EditorSession::load(Arc::new(repo.clone()), config.editor_settings()).await;

    match cli.command {
        Command::Show => {
            println!("{}", serde_json::to_string_pretty(&session.document())?);
            match repo.fetch_meta().await? {
                Some(meta) => eprintln!("revision {} (updated {})", meta.revision, meta.updated_at),
                None => eprintln!("nothing saved yet, showing defaults"),
            }
        }
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let value: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", file.display()))?;
            let decoded = PartialBrandConfig::from_value(&value)
                .with_context(|| format!("{} is not a JSON object", file.display()))?;
            for key in &decoded.skipped {
                eprintln!("warning: ignoring {key}, wrong type");
            }

            session.import_document(decoded.document)?;
            let warnings = session.submit().await?;
            for warning in &warnings {
                eprintln!("warning: {warning}");
            }
            if let Some(meta) = repo.fetch_meta().await? {
                println!("saved revision {}", meta.revision);
            }
        }
        Command::Export { file } => {
            let json = serde_json::to_string_pretty(&session.document())?;
            std::fs::write(&file, json).with_context(|| format!("writing {}", file.display()))?;
            println!("exported to {}", file.display());
        }
    }

    db.close().await;
    Ok(())
}
