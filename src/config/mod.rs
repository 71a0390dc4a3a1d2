mod file_config;

pub use file_config::FileConfig;

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub temp_dir: Option<PathBuf>,
    pub max_upload_mb: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            logging_level: RequestsLoggingLevel::default(),
            temp_dir: None,
            max_upload_mb: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub temp_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!("Invalid logging_level in config file: {}", s),
            },
            None => cli.logging_level.clone(),
        };

        let temp_dir = file
            .temp_dir
            .map(PathBuf::from)
            .or_else(|| cli.temp_dir.clone());
        if let Some(dir) = &temp_dir {
            if !dir.exists() {
                bail!("Temp directory does not exist: {:?}", dir);
            }
            if !dir.is_dir() {
                bail!("temp_dir is not a directory: {:?}", dir);
            }
        }

        let max_upload_mb = file.max_upload_mb.unwrap_or(cli.max_upload_mb);
        if max_upload_mb == 0 {
            bail!("max_upload_mb must be greater than 0");
        }
        let max_upload_bytes = usize::try_from(max_upload_mb.saturating_mul(BYTES_PER_MB))
            .unwrap_or(usize::MAX);

        Ok(Self {
            port,
            logging_level,
            temp_dir,
            max_upload_bytes,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            temp_dir: self.temp_dir.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
