//! Chemlink CLI - Command-line interface for the chemical safety data store

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use chemlink::config::{self, ChemlinkConfig};
use chemlink::server::{self, AppState};
use chemlink::storage::Store;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "chemlink")]
#[command(version)]
#[command(about = "Chemical safety data store - SDS records and exposure limits linked by CAS number")]
#[command(long_about = r#"
Chemlink keeps two chemical-safety datasets side by side:
  • Safety data sheets (physical properties, hazards, first aid, storage)
  • Occupational exposure limits (MAC, PC-TWA, PC-STEL, health effects)
and links them by CAS registry number.

Example usage:
  chemlink init
  chemlink import-limits gbz2.1.json
  chemlink import-sds sds.json
  chemlink search benzene
  chemlink lookup 71-43-2
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    /// Safety data sheets
    Chemicals,
    /// Occupational exposure limits
    Limits,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and write a config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Import an exposure-limit workbook (JSON export of the spreadsheet reader)
    ImportLimits {
        /// Workbook JSON file
        path: PathBuf,

        /// Source name recorded on the import batch (defaults to the file name)
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Import structured safety-data-sheet records from a JSON array
    ImportSds {
        /// Records JSON file
        path: PathBuf,

        /// Source name recorded on the import batch (defaults to the file name)
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Keyword search over names and identifiers
    Search {
        /// Keyword (empty matches everything)
        #[arg(default_value = "")]
        keyword: String,

        #[arg(long, value_enum, default_value = "chemicals")]
        dataset: Dataset,
    },

    /// Multi-criteria search over safety data sheets (all criteria must match)
    Find {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        cas: Option<String>,
        #[arg(long)]
        un_number: Option<String>,
        #[arg(long)]
        formula: Option<String>,
        /// Matched against hazard category, health and environmental hazards
        #[arg(long)]
        hazard: Option<String>,
        #[arg(long)]
        physical_state: Option<String>,
    },

    /// List records page by page
    List {
        #[arg(long, value_enum, default_value = "chemicals")]
        dataset: Dataset,

        /// One-based page number
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Records per page (defaults to the config value)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Show one record
    Show {
        id: i64,

        #[arg(long, value_enum, default_value = "chemicals")]
        dataset: Dataset,
    },

    /// Delete one record
    Delete {
        id: i64,

        #[arg(long, value_enum, default_value = "chemicals")]
        dataset: Dataset,
    },

    /// Link safety data sheets to exposure limits by CAS number
    Link {
        /// List every linked and unlinked record
        #[arg(long)]
        details: bool,
    },

    /// Combined view and completeness report for one CAS number
    Lookup {
        cas: String,
    },

    /// Show statistics about both datasets
    Stats,

    /// Remove records and import history
    Clear {
        /// Dataset to clear (both when omitted)
        #[arg(long, value_enum)]
        dataset: Option<Dataset>,
    },

    /// Serve the query API over HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(&self) -> bool {
        *self == OutputMode::Human
    }
}

pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        let envelope = serde_json::json!({
            "command": command,
            "ok": true,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let settings = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let database = settings.resolve_database(cli.database.clone(), &std::env::current_dir()?);

    config::ensure_db_dir(&database)?;
    let ctx = commands::Context {
        chemicals: Store::open(&database),
        limits: Store::open(&database),
        database: database.clone(),
        output_mode,
    };

    match cli.command {
        Commands::Init { force } => {
            let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
            let config = ChemlinkConfig {
                database: Some(database.to_string_lossy().to_string()),
                ..settings
            };
            commands::run_init(&ctx, &config_path, &config, force).await
        }
        Commands::ImportLimits { path, source } => commands::run_import_limits(&ctx, &path, source).await,
        Commands::ImportSds { path, source } => commands::run_import_sds(&ctx, &path, source).await,
        Commands::Search { keyword, dataset } => commands::run_search(&ctx, &keyword, dataset).await,
        Commands::Find { name, cas, un_number, formula, hazard, physical_state } => {
            let criteria = chemlink::query::SearchCriteria {
                name,
                cas,
                un_number,
                formula,
                hazard_keyword: hazard,
                physical_state,
            };
            commands::run_find(&ctx, &criteria).await
        }
        Commands::List { dataset, page, page_size } => {
            commands::run_list(&ctx, dataset, page, settings.resolve_page_size(page_size)).await
        }
        Commands::Show { id, dataset } => commands::run_show(&ctx, id, dataset).await,
        Commands::Delete { id, dataset } => commands::run_delete(&ctx, id, dataset).await,
        Commands::Link { details } => commands::run_link(&ctx, details).await,
        Commands::Lookup { cas } => commands::run_lookup(&ctx, &cas).await,
        Commands::Stats => commands::run_stats(&ctx).await,
        Commands::Clear { dataset } => commands::run_clear(&ctx, dataset).await,
        Commands::Serve { port } => {
            let state = AppState {
                chemicals: ctx.chemicals,
                limits: ctx.limits,
                page_size: settings.resolve_page_size(None),
            };
            server::start_server(settings.resolve_port(port), state).await
        }
    }
}
