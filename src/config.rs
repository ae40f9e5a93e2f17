use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_TITLE_FALLBACK: &str = "Title not found";
pub const DEFAULT_CONTENT_FALLBACK: &str = "Content not found";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Chat-completion credential. Checked per request, not at startup.
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub openrouter_model: String,
    pub huggingface_api_key: Option<String>,
    pub huggingface_base_url: String,
    pub huggingface_model: String,
    /// Sent to the text provider as `HTTP-Referer`.
    pub app_url: String,
    pub output_language: String,
    pub title_fallback: String,
    pub content_fallback: String,
    pub upstream_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            openrouter_api_key: None,
            openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
            openrouter_model: "deepseek/deepseek-r1-distill-qwen-32b".to_string(),
            huggingface_api_key: None,
            huggingface_base_url: "https://router.huggingface.co/hf-inference/models".to_string(),
            huggingface_model: "stabilityai/stable-diffusion-xl-base-1.0".to_string(),
            app_url: "http://localhost:3000".to_string(),
            output_language: "Russian".to_string(),
            title_fallback: DEFAULT_TITLE_FALLBACK.to_string(),
            content_fallback: DEFAULT_CONTENT_FALLBACK.to_string(),
            upstream_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(90),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let defaults = Config::default();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            openrouter_api_key: optional_var("OPENROUTER_API_KEY"),
            openrouter_base_url: optional_var("OPENROUTER_BASE_URL").unwrap_or(defaults.openrouter_base_url),
            openrouter_model: optional_var("OPENROUTER_MODEL").unwrap_or(defaults.openrouter_model),
            huggingface_api_key: optional_var("HUGGINGFACE_API_KEY"),
            huggingface_base_url: optional_var("HUGGINGFACE_BASE_URL").unwrap_or(defaults.huggingface_base_url),
            huggingface_model: optional_var("HUGGINGFACE_MODEL").unwrap_or(defaults.huggingface_model),
            app_url: optional_var("APP_URL").unwrap_or(defaults.app_url),
            output_language: optional_var("OUTPUT_LANGUAGE").unwrap_or(defaults.output_language),
            title_fallback: optional_var("TITLE_FALLBACK").unwrap_or(defaults.title_fallback),
            content_fallback: optional_var("CONTENT_FALLBACK").unwrap_or(defaults.content_fallback),
            upstream_timeout: seconds_var("UPSTREAM_TIMEOUT_SECS")?.unwrap_or(defaults.upstream_timeout),
            request_timeout: seconds_var("REQUEST_TIMEOUT_SECS")?.unwrap_or(defaults.request_timeout),
        })
    }
}

/// Unset and blank variables are both treated as absent.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn seconds_var(name: &str) -> Result<Option<Duration>> {
    optional_var(name)
        .map(|v| {
            v.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", name, e)))
        })
        .transpose()
}
