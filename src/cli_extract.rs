//! Extracts a snapshot from a legacy database file on disk and prints it as JSON.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use legacy_favorites_extractor::legacy_store::{extract_snapshot, ExtractError};
use legacy_favorites_extractor::server::{ErrorResponse, ExtractionResponse};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "cli-extract")]
#[command(about = "Extract favorites and offline downloads from a legacy database")]
struct CliArgs {
    /// Path to the legacy database file.
    #[arg(value_name = "FILE", value_parser = parse_path)]
    pub path: PathBuf,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn run(args: &CliArgs) -> Result<bool> {
    let result = if args.path.is_file() {
        extract_snapshot(&args.path)
    } else {
        error!("No database file at {:?}", args.path);
        Err(ExtractError::MissingInput)
    };

    match result {
        Ok(report) => {
            for warning in &report.warnings {
                warn!("{}", warning);
            }
            let response = ExtractionResponse::from(report.snapshot);
            println!("{}", to_json(&response, args.pretty)?);
            Ok(true)
        }
        Err(e) => {
            error!("Extraction failed: {}", e);
            println!("{}", to_json(&ErrorResponse::from(&e), args.pretty)?);
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout only carries the JSON document
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
