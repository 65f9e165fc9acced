use config::{Config as ConfigLoader, ConfigError, Environment, File};
use parley_llm::{AzureConfig, DEFAULT_API_VERSION};
use parley_persist::ModelDeployment;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub models: Vec<ModelDeployment>,
    #[serde(default)]
    pub weather: WeatherConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub azure_openai_endpoint: String,
    #[serde(default)]
    pub azure_openai_api_key: String,
    #[serde(default)]
    pub mongodb_uri: Option<String>,
    #[serde(default)]
    pub weather_api_key: Option<String>,
    /// bearer token -> username
    #[serde(skip)]
    pub auth_tokens: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Where `/` and `/app/` redirect to
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

fn default_request_timeout() -> u64 {
    120
}

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_database() -> String {
    "parley".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Sent as max_tokens when set
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default = "default_units")]
    pub units: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
            units: default_units(),
        }
    }
}

fn default_weather_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. PARLEY_-prefixed environment variables, `__` between sections
    ///    (e.g. PARLEY_SERVER__PORT=9000)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("PARLEY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: Config = config.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.azure_openai_endpoint = std::env::var("AZURE_OPENAI_ENDPOINT").map_err(|_| {
            ConfigError::Message("AZURE_OPENAI_ENDPOINT environment variable is required".to_string())
        })?;
        cfg.azure_openai_api_key = std::env::var("AZURE_OPENAI_API_KEY").map_err(|_| {
            ConfigError::Message("AZURE_OPENAI_API_KEY environment variable is required".to_string())
        })?;
        cfg.mongodb_uri = std::env::var("MONGODB_URI").ok();
        cfg.weather_api_key = std::env::var("WEATHER_API_KEY").ok().filter(|k| !k.is_empty());
        cfg.auth_tokens = parse_auth_tokens(&std::env::var("AUTH_TOKENS").unwrap_or_default())?;

        if cfg.storage.backend == StorageBackend::Mongodb && cfg.mongodb_uri.is_none() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required for the mongodb backend".to_string(),
            ));
        }
        if cfg.auth_tokens.is_empty() {
            tracing::warn!("AUTH_TOKENS is empty; every /api request will be rejected");
        }

        Ok(cfg)
    }

    pub fn azure(&self) -> AzureConfig {
        AzureConfig::new(&self.azure_openai_api_key, &self.azure_openai_endpoint)
            .with_api_version(&self.llm.api_version)
    }
}

/// Parse `user:token,user:token` into a token -> user map
pub fn parse_auth_tokens(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut tokens = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (user, token) = entry
            .split_once(':')
            .map(|(u, t)| (u.trim(), t.trim()))
            .filter(|(u, t)| !u.is_empty() && !t.is_empty())
            .ok_or_else(|| {
                ConfigError::Message(format!("AUTH_TOKENS entry must be user:token, got '{entry}'"))
            })?;
        tokens.insert(token.to_string(), user.to_string());
    }
    Ok(tokens)
}
