pub mod actions;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod normalize;
pub mod scraper;
pub mod validate;

use std::sync::Arc;
use config::Config;
use error::{AppError, Result};
use scraper::Extractor;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Client for provider calls, bounded by `Config::upstream_timeout`.
    pub http: reqwest::Client,
    pub extractor: Arc<Extractor>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            extractor: Arc::new(Extractor::from_config(&config)),
            config: Arc::new(config),
            http,
        })
    }
}
