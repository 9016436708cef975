//! canonicalize CLI
//!
//! Entry point for the `canonicalize` command-line tool.

use canonicalize::config::{ConfigError, Settings, DEFAULT_SETTINGS_FILE};
use canonicalize::{check_output_dir, export_csv, run_batch};
use clap::Parser;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "canonicalize")]
#[command(about = "Resolve canonical fields of merged YAML records", version)]
struct Cli {
    /// Directory of merged YAML records to update in place
    output_dir: Option<PathBuf>,

    /// Settings file (default: ./canonicalize.toml when present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Directory holding _default.yaml and per-record priority overrides
    #[arg(long, short = 'p')]
    priorities: Option<PathBuf>,

    /// Also process records in subdirectories
    #[arg(long, short = 'r')]
    recursive: bool,

    /// Stop at the first record that fails
    #[arg(long)]
    fail_fast: bool,

    /// Print the batch summary as JSON
    #[arg(long)]
    json: bool,

    /// After updating, export the canonical blocks to this CSV file
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dir = match check_output_dir(cli.output_dir.as_deref()) {
        Ok(dir) => dir.to_path_buf(),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    };
    tracing::debug!(sources = ?settings.sources, "settings loaded");

    let summary = match run_batch(&dir, &settings) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "batch failed");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if cli.json {
        match summary.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing summary: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", summary.to_human());
    }

    if let Some(ref out) = cli.csv {
        match export_csv(&dir, &settings, out) {
            Ok(table) => {
                tracing::info!(
                    path = %out.display(),
                    rows = table.rows.len(),
                    skipped = table.skipped,
                    "canonical blocks exported"
                );
                if !cli.json {
                    println!("Exported {} records to {}", table.rows.len(), out.display());
                }
            }
            Err(e) => {
                eprintln!("Error exporting CSV: {}", e);
                process::exit(1);
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "canonicalize=debug"
    } else {
        "canonicalize=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let settings_path = cli.config.clone().or_else(|| {
        let default = Path::new(DEFAULT_SETTINGS_FILE);
        default.exists().then(|| default.to_path_buf())
    });

    Settings::build(settings_path.as_deref(), cli_overrides(cli))
}

/// Settings layer for flags that were actually given
fn cli_overrides(cli: &Cli) -> Option<Value> {
    let mut layer = Map::new();

    if let Some(ref dir) = cli.priorities {
        layer.insert("priorities".to_string(), json!({ "dir": dir }));
    }
    if cli.recursive {
        layer.insert("discovery".to_string(), json!({ "recursive": true }));
    }
    if cli.fail_fast {
        layer.insert("batch".to_string(), json!({ "fail_fast": true }));
    }

    if layer.is_empty() {
        None
    } else {
        Some(Value::Object(layer))
    }
}
