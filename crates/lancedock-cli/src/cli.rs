//! CLI definition and command dispatch for lancedock.
//!
//! This module defines the command-line interface using `clap` and provides
//! the `run()` function that dispatches commands.
//!
//! ## Configuration Precedence
//!
//! 1. CLI flags (`--config`, `--verbose`)
//! 2. Environment variables (`LANCEDOCK_CONFIG`, `LANCEDOCK_VERBOSE`)
//! 3. Config file (`~/.lancedock/config.yaml`)
//! 4. Built-in defaults

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::runtime::Runtime;

use lancedock_core::constants::DEFAULT_DB_URI;
use lancedock_core::{
    reconstruct_document, registrations, ColumnNames, PluginConfig, TableResolver,
};
use lancedock_db::table::{VectorTable, ID_COLUMN};

use crate::ui::table::{self, DocumentRow, TableRow};
use crate::ui::{ColorMode, MessageType, Style};

// ============================================================================
// CLI Definition
// ============================================================================

/// Version string including git commit hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Default number of rows printed by `show`.
const DEFAULT_SHOW_LIMIT: usize = 10;

/// lancedock – inspect LanceDB tables used for retrieval and indexing
#[derive(Parser, Debug)]
#[command(name = "lancedock")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "LANCEDOCK_VERBOSE")]
    pub verbose: bool,

    /// Path to configuration file (default: ~/.lancedock/config.yaml)
    #[arg(long, global = true, env = "LANCEDOCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Color output mode: always, never, or auto
    #[arg(long, global = true, env = "LANCEDOCK_COLOR", default_value = "auto")]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the tables in a database
    #[command(after_help = r#"EXAMPLES:
    # List tables in the default database
    lancedock tables

    # List tables under a specific path
    lancedock tables --uri /var/lib/lancedock
"#)]
    Tables {
        /// Database URI
        #[arg(long, default_value = DEFAULT_DB_URI)]
        uri: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the number of rows in a table
    Count {
        /// Database URI
        #[arg(long, default_value = DEFAULT_DB_URI)]
        uri: String,

        /// Table name
        #[arg(long)]
        table: String,
    },

    /// Show the first rows of a table as documents
    #[command(after_help = r#"EXAMPLES:
    # Show the first 10 rows
    lancedock show --table docs

    # Custom column names, as JSON
    lancedock show --table docs --text-column body --metadata-column meta --json
"#)]
    Show {
        /// Database URI
        #[arg(long, default_value = DEFAULT_DB_URI)]
        uri: String,

        /// Table name
        #[arg(long)]
        table: String,

        /// Maximum number of rows
        #[arg(long, default_value_t = DEFAULT_SHOW_LIMIT)]
        limit: usize,

        /// Text column name
        #[arg(long, default_value = lancedock_core::constants::DEFAULT_TEXT_COLUMN)]
        text_column: String,

        /// Metadata column name
        #[arg(long, default_value = lancedock_core::constants::DEFAULT_METADATA_COLUMN)]
        metadata_column: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List the retrievers and indexers the configuration registers
    #[command(after_help = r#"EXAMPLES:
    # Use ~/.lancedock/config.yaml
    lancedock registrations

    # Use another configuration file
    lancedock --config ./lancedock.yaml registrations --json
"#)]
    Registrations {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Entry Point
// ============================================================================

/// Parse arguments, run the command, and map the outcome to an exit code.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Always show warnings; debug only with --verbose
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!(
        "lancedock_core={},lancedock_db={},lancedock_cli={}",
        log_level, log_level, log_level
    );

    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let style = Style::new(cli.color);

    let result = match Runtime::new() {
        Ok(runtime) => runtime.block_on(dispatch(&style, cli.config, cli.command)),
        Err(e) => Err(anyhow::Error::new(e).context("Failed to start async runtime")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let causes: Vec<String> = e.chain().skip(1).map(|c| c.to_string()).collect();
            eprintln!("{}", style.error_with_context(&e.to_string(), &causes, None));
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(style: &Style, config: Option<PathBuf>, command: Command) -> Result<()> {
    match command {
        Command::Tables { uri, json } => handle_tables(style, &uri, json).await,
        Command::Count { uri, table } => handle_count(&uri, &table).await,
        Command::Show {
            uri,
            table,
            limit,
            text_column,
            metadata_column,
            json,
        } => {
            let columns = ColumnNames {
                text: text_column,
                metadata: metadata_column,
                ..ColumnNames::default()
            };
            handle_show(style, &uri, &table, limit, &columns, json).await
        }
        Command::Registrations { json } => handle_registrations(style, config, json),
    }
}

// ============================================================================
// Command handlers
// ============================================================================

async fn handle_tables(style: &Style, uri: &str, json: bool) -> Result<()> {
    let db = TableResolver::default()
        .connect(uri)
        .await
        .with_context(|| format!("Failed to open database at '{}'", uri))?;

    let mut rows = Vec::new();
    for name in db.table_names().await? {
        let table = db.open_table(&name).await?;
        rows.push(TableRow {
            rows: table.count_rows().await?,
            name,
        });
    }

    if json {
        let tables: Vec<_> = rows
            .iter()
            .map(|row| json!({"name": row.name, "rows": row.rows}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&tables)?);
    } else if rows.is_empty() {
        println!(
            "{}",
            style.message(MessageType::Info, &format!("No tables found at '{}'.", uri))
        );
    } else {
        println!("{}", style.section("TABLES"));
        println!();
        println!("{}", table::render_tables_table(&rows));
    }
    Ok(())
}

async fn handle_count(uri: &str, table_name: &str) -> Result<()> {
    let table = open_existing(uri, table_name).await?;
    println!("{}", table.count_rows().await?);
    Ok(())
}

async fn handle_show(
    style: &Style,
    uri: &str,
    table_name: &str,
    limit: usize,
    columns: &ColumnNames,
    json: bool,
) -> Result<()> {
    let table = open_existing(uri, table_name).await?;

    let mut select = vec![ID_COLUMN.to_string()];
    select.extend(columns.projection());
    let hits = table.scan(limit, &select).await?;

    let rows: Vec<DocumentRow> = hits
        .iter()
        .map(|hit| {
            let document = reconstruct_document(hit, columns);
            DocumentRow {
                id: hit.get(ID_COLUMN).unwrap_or_default().to_string(),
                text: document.text().unwrap_or_default(),
                metadata: serde_json::Value::Object(document.metadata).to_string(),
            }
        })
        .collect();

    if json {
        let documents = rows
            .iter()
            .map(|row| {
                let metadata: serde_json::Value = serde_json::from_str(&row.metadata)?;
                Ok(json!({"id": row.id, "text": row.text, "metadata": metadata}))
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&documents)?);
    } else if rows.is_empty() {
        println!(
            "{}",
            style.message(MessageType::Info, &format!("Table '{}' is empty.", table_name))
        );
    } else {
        println!("{}", table::render_rows_table(&rows));
    }
    Ok(())
}

fn handle_registrations(style: &Style, config_path: Option<PathBuf>, json: bool) -> Result<()> {
    let config = match &config_path {
        Some(path) => PluginConfig::from_path(path),
        None => PluginConfig::load_default(),
    }
    .context("Failed to load plugin configuration")?;

    let listed = registrations(&config.tables);

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
    } else if listed.is_empty() {
        println!(
            "{}",
            style.message(
                MessageType::Info,
                "No tables configured. Add entries under `tables:` in the config file."
            )
        );
    } else {
        println!("{}", style.section("REGISTRATIONS"));
        println!();
        println!("{}", table::render_registrations_table(&listed));
    }
    Ok(())
}

/// Open a table that must exist.
async fn open_existing(uri: &str, table_name: &str) -> Result<Arc<dyn VectorTable>> {
    let resolved = TableResolver::default()
        .resolve(uri, table_name)
        .await
        .with_context(|| format!("Failed to open database at '{}'", uri))?;

    match resolved.handle {
        Some(table) => Ok(table),
        None => bail!("Table '{}' not found at '{}'", table_name, uri),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_show_defaults() {
        let cli = Cli::try_parse_from(["lancedock", "show", "--table", "docs"]).unwrap();
        match cli.command {
            Command::Show {
                uri,
                limit,
                text_column,
                json,
                ..
            } => {
                assert_eq!(uri, ".db");
                assert_eq!(limit, 10);
                assert_eq!(text_column, "text");
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_count_requires_table() {
        assert!(Cli::try_parse_from(["lancedock", "count"]).is_err());
    }
}
