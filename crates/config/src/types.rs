use serde::Deserialize;
use std::{collections::HashMap, env};

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| default_host()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| "SERVER_PORT must be a valid port number")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "json", "compact" or "pretty"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Per-module level overrides, e.g. `api: debug`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            modules: HashMap::new(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_name")]
    pub database: String,
    #[serde(default = "default_db_user")]
    pub username: String,
    #[serde(default = "default_db_password")]
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl DatabaseConfig {
    /// Create a connection URL for this database configuration
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            host: env::var("DB_HOST").unwrap_or_else(|_| default_db_host()),
            port: env::var("DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_db_port),
            database: env::var("DB_NAME").unwrap_or_else(|_| default_db_name()),
            username: env::var("DB_USER").unwrap_or_else(|_| default_db_user()),
            password: env::var("DB_PASSWORD").unwrap_or_else(|_| default_db_password()),
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_max_connections),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Ceilings for the trailing-window rate limiters
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Messages a user may send per conversation per window
    #[serde(default = "default_messages_per_window")]
    pub messages_per_window: i64,
    /// Conversations a user may create per window
    #[serde(default = "default_conversations_per_window")]
    pub conversations_per_window: i64,
    /// Conversations a user may delete per window
    #[serde(default = "default_deletions_per_window")]
    pub deletions_per_window: i64,
    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            messages_per_window: default_messages_per_window(),
            conversations_per_window: default_conversations_per_window(),
            deletions_per_window: default_deletions_per_window(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "openhub".to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_password() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> usize {
    20
}

fn default_messages_per_window() -> i64 {
    100
}

fn default_conversations_per_window() -> i64 {
    10
}

fn default_deletions_per_window() -> i64 {
    10
}

fn default_window_secs() -> u64 {
    3600
}
