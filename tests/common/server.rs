//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own upload directory.

use super::constants::*;
use legacy_favorites_extractor::legacy_store::LegacyDbExtractor;
use legacy_favorites_extractor::server::state::GuardedExtractor;
use legacy_favorites_extractor::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated upload directory
///
/// When dropped, the server gracefully shuts down and the upload directory is removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    upload_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server backed by the real legacy database extractor
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(LegacyDbExtractor), 100).await
    }

    /// Spawns a server with the given extractor and upload size limit
    ///
    /// # Panics
    ///
    /// Panics if port binding fails or the server doesn't become ready within timeout.
    pub async fn spawn_with(extractor: GuardedExtractor, max_upload_mb: usize) -> Self {
        let upload_dir = TempDir::new().expect("Failed to create upload dir");

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            temp_dir: Some(upload_dir.path().to_path_buf()),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        };

        let app = make_app(config, extractor);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            upload_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Directory where the server stages uploads
    pub fn upload_dir(&self) -> &Path {
        self.upload_dir.path()
    }

    /// Waits for the server to become ready by polling the /health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
