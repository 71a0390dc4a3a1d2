use std::path::PathBuf;

use super::RequestsLoggingLevel;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Where uploads are staged; the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn upload_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3000,
            temp_dir: None,
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}
