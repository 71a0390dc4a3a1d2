use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;
use crate::legacy_store::SnapshotExtractor;

pub type GuardedExtractor = Arc<dyn SnapshotExtractor>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub extractor: GuardedExtractor,
}

impl ServerState {
    pub fn new(config: ServerConfig, extractor: GuardedExtractor) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            extractor,
        }
    }
}

impl FromRef<ServerState> for GuardedExtractor {
    fn from_ref(input: &ServerState) -> Self {
        input.extractor.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
