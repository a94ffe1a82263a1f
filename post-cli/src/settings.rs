use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use post_client::{DEFAULT_BASE_URL, TransportConfig};

const DEFAULT_TOKEN_FILE: &str = ".post_token";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub token_file: PathBuf,
    pub http_timeout_secs: u64,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("POSTS_API_URL")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let token_file = lookup("POSTS_TOKEN_FILE")
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string());
        let http_timeout_secs = parse_u64(&lookup, "POSTS_HTTP_TIMEOUT_SECS", 15)?;
        let log_level = lookup("LOG_LEVEL")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| "warn".to_string());

        Ok(Self {
            api_url: normalize_server(api_url),
            token_file: PathBuf::from(token_file),
            http_timeout_secs,
            log_level,
        })
    }

    /// `--server` важнее переменной окружения.
    pub fn with_server(mut self, server: Option<String>) -> Self {
        if let Some(server) = server {
            self.api_url = normalize_server(server);
        }
        self
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            base_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
            ..TransportConfig::default()
        }
    }
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    let value = lookup(key)
        .unwrap_or_else(|| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
