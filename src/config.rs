use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

/// Default Hayward OmniLogic cloud API endpoint.
pub const DEFAULT_API_URL: &str =
    "https://www.haywardomnilogic.com/HAAPI/HomeAutomation/API.ashx";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub omnilogic: OmniLogicConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OmniLogicConfig {
    #[serde(default = "default_api_url")]
    pub url: String,
    pub username: String,
    pub password: SecretString,
    /// Deadline applied uniformly to every outbound API call.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    5
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9190
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("OMNILOGIC_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
