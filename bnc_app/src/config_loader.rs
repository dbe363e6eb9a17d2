use std::path::Path;
use std::time::Duration;

use bnc_http::GatewayConfig;
use bnc_http::HttpClientConfig;
use bnc_http::binance::BINANCE_BASE_URL;
use config::Config;
use config::ConfigError;
use config::File;
use serde::Deserialize;

/// Client settings as read from a config file; every field is optional
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfigFile {
    pub base_url: String,
    pub symbol: String,
    pub weight_limit: u32,
    pub window_secs: u64,
    pub edge_cooldown_secs: u64,
    pub transport_backoff_secs: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Calls per logical operation, including the first
    pub max_attempts: u32,
    /// Repeat the snapshot at this interval until Ctrl+C; run once when unset
    pub poll_interval_ms: Option<u64>,
}

impl Default for ClientConfigFile {
    fn default() -> Self {
        let gateway = GatewayConfig::default();
        let http = HttpClientConfig::default();

        Self {
            base_url: BINANCE_BASE_URL.to_string(),
            symbol: "ETHUSDT".to_string(),
            weight_limit: gateway.weight_limit,
            window_secs: gateway.window.as_secs(),
            edge_cooldown_secs: gateway.edge_cooldown.as_secs(),
            transport_backoff_secs: gateway.transport_backoff.as_secs(),
            connect_timeout_ms: http.connect_timeout.as_millis() as u64,
            request_timeout_ms: http.request_timeout.as_millis() as u64,
            max_attempts: 3,
            poll_interval_ms: None,
        }
    }
}

impl ClientConfigFile {
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            weight_limit: self.weight_limit,
            window: Duration::from_secs(self.window_secs),
            edge_cooldown: Duration::from_secs(self.edge_cooldown_secs),
            transport_backoff: Duration::from_secs(self.transport_backoff_secs),
        }
    }

    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            ..HttpClientConfig::default()
        }
    }
}

pub fn load_client_config<P: AsRef<Path>>(path: P) -> Result<ClientConfigFile, ConfigError> {
    let config = Config::builder().add_source(File::from(path.as_ref())).build()?;

    config.try_deserialize()
}

/// Load client config with fallback to default
pub fn load_client_config_or_default(path: &str) -> ClientConfigFile {
    match load_client_config(path) {
        Ok(config) => {
            tracing::info!("Loaded client config from {path}");
            config
        }
        Err(err) => {
            tracing::warn!("Failed to load client config from {}: {}. Using defaults.", path, err);
            ClientConfigFile::default()
        }
    }
}
