use std::collections::HashMap;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::validation::InputValidator;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

/// Knobs for ranking and the store round-trip bound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    /// Pool size fetched per requested result
    pub candidate_pool_multiplier: usize,
    pub store_timeout_ms: u64,
    pub minimum_age: u8,
}

impl MatchingConfig {
    /// Bound applied to every store round-trip
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            candidate_pool_multiplier: 2,
            store_timeout_ms: 5000,
            minimum_age: 18,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/nikah_match.db".to_string(),
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            matching: MatchingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        // Start with default values
        for (key, value) in Self::default().default_entries() {
            builder = builder.set_default(key, value)?;
        }

        let config = builder
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("NIKAH_MATCH").separator("__"))
            .build()
            .map_err(|e| MatchError::InvalidConfig(format!("Failed to load configuration: {e}")))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| MatchError::InvalidConfig(format!("Failed to deserialize configuration: {e}")))?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return Err(MatchError::InvalidConfig("max_connections must be greater than 0".into()));
        }
        if self.database.connection_timeout_secs == 0 {
            return Err(MatchError::InvalidConfig("connection_timeout_secs must be greater than 0".into()));
        }
        if !self.database.url.starts_with("sqlite:") {
            return Err(MatchError::InvalidConfig(format!(
                "database url must start with sqlite: (got {})",
                self.database.url
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(MatchError::InvalidConfig(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                self.logging.level
            )));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(MatchError::InvalidConfig(format!(
                "Invalid log format: {}. Must be one of: {valid_formats:?}",
                self.logging.format
            )));
        }

        let matching = &self.matching;
        if matching.default_limit == 0 || matching.max_limit == 0 {
            return Err(MatchError::InvalidConfig("result limits must be greater than 0".into()));
        }
        if matching.default_limit > matching.max_limit {
            return Err(MatchError::InvalidConfig(format!(
                "default_limit {} exceeds max_limit {}",
                matching.default_limit, matching.max_limit
            )));
        }
        if matching.candidate_pool_multiplier == 0 {
            return Err(MatchError::InvalidConfig("candidate_pool_multiplier must be greater than 0".into()));
        }
        if matching.store_timeout_ms == 0 {
            return Err(MatchError::InvalidConfig("store_timeout_ms must be greater than 0".into()));
        }
        if matching.minimum_age < 18 {
            return Err(MatchError::InvalidConfig("minimum_age must be at least 18".into()));
        }

        Ok(())
    }

    /// Get database URL from environment or config
    #[must_use]
    pub fn get_database_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| self.database.url.clone())
    }

    /// Settle the database URL: an explicit override wins, then `DATABASE_URL`,
    /// then the configured value. The result is validated before it is stored.
    pub fn resolve_database_url(&mut self, override_url: Option<String>) -> Result<&str> {
        let url = override_url.unwrap_or_else(|| self.get_database_url());
        InputValidator::validate_database_url(&url)?;
        self.database.url = url;
        Ok(&self.database.url)
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }

    /// Flatten the configuration into dotted key/value defaults
    fn default_entries(self) -> HashMap<String, config::Value> {
        let mut map = HashMap::new();

        map.insert("database.url".to_string(), config::Value::from(self.database.url));
        map.insert("database.max_connections".to_string(), config::Value::from(i64::from(self.database.max_connections)));
        map.insert(
            "database.connection_timeout_secs".to_string(),
            config::Value::from(i64::try_from(self.database.connection_timeout_secs).unwrap_or(i64::MAX)),
        );

        map.insert("logging.level".to_string(), config::Value::from(self.logging.level));
        if let Some(file_path) = self.logging.file_path {
            map.insert("logging.file_path".to_string(), config::Value::from(file_path));
        }
        map.insert("logging.format".to_string(), config::Value::from(self.logging.format));

        let matching = self.matching;
        map.insert(
            "matching.default_limit".to_string(),
            config::Value::from(i64::try_from(matching.default_limit).unwrap_or(i64::MAX)),
        );
        map.insert(
            "matching.max_limit".to_string(),
            config::Value::from(i64::try_from(matching.max_limit).unwrap_or(i64::MAX)),
        );
        map.insert(
            "matching.candidate_pool_multiplier".to_string(),
            config::Value::from(i64::try_from(matching.candidate_pool_multiplier).unwrap_or(i64::MAX)),
        );
        map.insert(
            "matching.store_timeout_ms".to_string(),
            config::Value::from(i64::try_from(matching.store_timeout_ms).unwrap_or(i64::MAX)),
        );
        map.insert("matching.minimum_age".to_string(), config::Value::from(i64::from(matching.minimum_age)));

        map
    }
}
