//! Lakeview CLI - Serve and browse data-lake table metadata
//!
//! Usage:
//!   lakeview serve [--port <port>] [--store <memory|sqlite>] [--strict]
//!   lakeview show <path> [--format <format>] [--tab <tab>]
//!   lakeview detect <path> [--format <format>]
//!   lakeview sources <list|add|remove>
//!   lakeview recent
//!   lakeview tables [--format <format>]
//!
//! Examples:
//!   lakeview serve --store sqlite --db ./catalog.db
//!   lakeview show s3://analytics-bucket/customer_data/ --tab schema
//!   lakeview sources add --name Orders --path s3://warehouse/orders/ --user-id 1

use clap::{Parser, Subcommand, ValueEnum};
use lakeview::config::{Settings, StoreBackend};
use lakeview::metadata::{resolve_format_with_reason, UnknownPathPolicy};
use lakeview::model::TableFormat;
use std::path::PathBuf;
use std::process::ExitCode;

#[cfg(feature = "client")]
use lakeview::client::MetadataClient;
#[cfg(feature = "client")]
use lakeview::model::NewDataSource;
#[cfg(feature = "client")]
use lakeview::viewer::{self, format_bytes, format_large_number, time_ago, Tab};

#[derive(Parser)]
#[command(name = "lakeview")]
#[command(about = "Lakeview - Metadata viewer for Parquet, Iceberg, Delta Lake and Hudi tables")]
#[command(version)]
struct Cli {
    /// Path to a lakeview.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Metadata API base URL (overrides client.base_url)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the metadata API server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,

        /// Catalog store backend
        #[arg(long)]
        store: Option<StoreArg>,

        /// SQLite database path (implies --store sqlite)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Answer unknown table paths with 404 instead of the default table
        #[arg(long)]
        strict: bool,

        /// Do not seed demo bookmarks and recent tables
        #[arg(long)]
        no_seed: bool,
    },

    /// Show the metadata of a table
    #[cfg(feature = "client")]
    Show {
        /// Table location, e.g. s3://analytics-bucket/customer_data/
        path: String,

        /// Table format (detected from the path if not specified)
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// Tab to render, or "all"
        #[arg(short, long, default_value = "overview")]
        tab: String,

        /// Record the view in this user's recent tables
        #[arg(short, long)]
        user_id: Option<i64>,
    },

    /// Resolve the format of a table path without contacting the server
    Detect {
        path: String,

        /// Format hint
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Manage saved data sources
    #[cfg(feature = "client")]
    Sources {
        #[command(subcommand)]
        action: SourcesAction,
    },

    /// List recently viewed tables
    #[cfg(feature = "client")]
    Recent {
        #[arg(short, long)]
        user_id: Option<i64>,
    },

    /// List the tables the server can describe
    #[cfg(feature = "client")]
    Tables {
        /// Only list tables of this format
        #[arg(short, long)]
        format: Option<FormatArg>,
    },
}

#[cfg(feature = "client")]
#[derive(Subcommand)]
enum SourcesAction {
    /// List saved data sources
    List {
        #[arg(short, long)]
        user_id: Option<i64>,
    },

    /// Save a data source
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        path: String,

        /// Storage kind (s3, gcs, abfs, ...)
        #[arg(short = 't', long = "type", default_value = "s3")]
        source_type: String,

        #[arg(short, long)]
        user_id: Option<i64>,
    },

    /// Delete a data source by id
    Remove { id: i64 },
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreArg {
    Memory,
    Sqlite,
}

impl From<StoreArg> for StoreBackend {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Memory => StoreBackend::Memory,
            StoreArg::Sqlite => StoreBackend::Sqlite,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Parquet,
    Iceberg,
    Delta,
    Hudi,
}

impl From<FormatArg> for TableFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Parquet => TableFormat::Parquet,
            FormatArg::Iceberg => TableFormat::Iceberg,
            FormatArg::Delta => TableFormat::Delta,
            FormatArg::Hudi => TableFormat::Hudi,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut settings = match Settings::load_from(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(server) = cli.server {
        settings.client.base_url = server;
    }

    match cli.command {
        Commands::Serve {
            host,
            port,
            store,
            db,
            strict,
            no_seed,
        } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(store) = store {
                settings.store.backend = store.into();
            }
            if let Some(db) = db {
                settings.store.backend = StoreBackend::Sqlite;
                settings.store.path = Some(db.display().to_string());
            }
            if strict {
                settings.metadata.unknown_path = UnknownPathPolicy::Strict;
            }
            if no_seed {
                settings.store.seed_demo = false;
            }
            cmd_serve(settings).await
        }
        #[cfg(feature = "client")]
        Commands::Show {
            path,
            format,
            tab,
            user_id,
        } => cmd_show(&settings, &path, format.map(Into::into), &tab, user_id).await,
        Commands::Detect { path, format } => cmd_detect(&path, format.as_deref()),
        #[cfg(feature = "client")]
        Commands::Sources { action } => cmd_sources(&settings, action).await,
        #[cfg(feature = "client")]
        Commands::Recent { user_id } => cmd_recent(&settings, user_id).await,
        #[cfg(feature = "client")]
        Commands::Tables { format } => cmd_tables(&settings, format.map(Into::into)).await,
    }
}

async fn cmd_serve(settings: Settings) -> ExitCode {
    match lakeview::api::serve(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_detect(path: &str, hint: Option<&str>) -> ExitCode {
    let (format, reason) = resolve_format_with_reason(path, hint);
    println!("{} ({:?})", format, reason);
    ExitCode::SUCCESS
}

#[cfg(feature = "client")]
fn connect(settings: &Settings) -> Option<MetadataClient> {
    match MetadataClient::from_settings(&settings.client) {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Error creating client: {}", e);
            None
        }
    }
}

#[cfg(feature = "client")]
async fn cmd_show(
    settings: &Settings,
    path: &str,
    format: Option<TableFormat>,
    tab: &str,
    user_id: Option<i64>,
) -> ExitCode {
    let tabs: Vec<Tab> = if tab.eq_ignore_ascii_case("all") {
        Tab::ALL.to_vec()
    } else {
        match tab.parse::<Tab>() {
            Ok(tab) => vec![tab],
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    };

    let Some(client) = connect(settings) else {
        return ExitCode::FAILURE;
    };

    let fetch = viewer::load(&client, path, format, user_id).await;
    let now = chrono::Utc::now();

    for (i, tab) in tabs.iter().enumerate() {
        if tabs.len() > 1 {
            if i > 0 {
                println!();
            }
            println!("== {} ==", tab.title());
        }
        println!("{}", viewer::render(*tab, &fetch, now));
    }

    match viewer::tab_state(Tab::Overview, &fetch) {
        viewer::TabState::Error => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

#[cfg(feature = "client")]
async fn cmd_sources(settings: &Settings, action: SourcesAction) -> ExitCode {
    let Some(client) = connect(settings) else {
        return ExitCode::FAILURE;
    };

    match action {
        SourcesAction::List { user_id } => match client.data_sources(user_id).await {
            Ok(sources) => {
                if sources.is_empty() {
                    println!("No data sources saved.");
                    return ExitCode::SUCCESS;
                }
                let rows: Vec<Vec<String>> = sources
                    .iter()
                    .map(|s| {
                        vec![
                            s.id.to_string(),
                            s.name.clone(),
                            s.source_type.clone(),
                            s.path.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    viewer::render_table(&["ID", "NAME", "TYPE", "PATH"], &rows)
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to load data sources: {}", e);
                ExitCode::FAILURE
            }
        },
        SourcesAction::Add {
            name,
            path,
            source_type,
            user_id,
        } => {
            let mut source = NewDataSource::new(name, path).with_type(source_type);
            source.user_id = user_id;
            match client.create_data_source(&source).await {
                Ok(created) => {
                    println!("Saved data source {} ({})", created.id, created.name);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Failed to save data source: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        SourcesAction::Remove { id } => match client.delete_data_source(id).await {
            Ok(true) => {
                println!("Deleted data source {}", id);
                ExitCode::SUCCESS
            }
            Ok(false) => {
                eprintln!("Data source {} not found", id);
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("Failed to delete data source: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

#[cfg(feature = "client")]
async fn cmd_recent(settings: &Settings, user_id: Option<i64>) -> ExitCode {
    let Some(client) = connect(settings) else {
        return ExitCode::FAILURE;
    };

    match client.recent_tables(user_id).await {
        Ok(tables) => {
            if tables.is_empty() {
                println!("No recently viewed tables.");
                return ExitCode::SUCCESS;
            }
            let now = chrono::Utc::now();
            let rows: Vec<Vec<String>> = tables
                .iter()
                .map(|t| {
                    vec![
                        t.name.clone(),
                        t.format.to_string(),
                        time_ago(t.last_viewed, now),
                        t.path.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                viewer::render_table(&["NAME", "FORMAT", "VIEWED", "PATH"], &rows)
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to load recent tables: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "client")]
async fn cmd_tables(settings: &Settings, format: Option<TableFormat>) -> ExitCode {
    let Some(client) = connect(settings) else {
        return ExitCode::FAILURE;
    };

    match client.tables(format).await {
        Ok(tables) => {
            if tables.is_empty() {
                println!("No tables found.");
                return ExitCode::SUCCESS;
            }
            let now = chrono::Utc::now();
            let rows: Vec<Vec<String>> = tables
                .iter()
                .map(|t| {
                    vec![
                        t.name.clone(),
                        t.format.to_string(),
                        format_bytes(t.size),
                        t.row_count.map(format_large_number).unwrap_or_default(),
                        time_ago(t.last_modified, now),
                        t.location.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                viewer::render_table(
                    &["NAME", "FORMAT", "SIZE", "ROWS", "MODIFIED", "LOCATION"],
                    &rows
                )
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to load tables: {}", e);
            ExitCode::FAILURE
        }
    }
}
