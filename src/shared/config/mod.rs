//! Application configuration module
//!
//! Provides the server configuration and its environment loader.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `SERVER_PORT` | `5000` | listen port |
//! | `DATABASE_URL` | unset | PostgreSQL URL; unset selects the in-memory store |
//! | `DB_CONNECT_TIMEOUT_SECS` | `10` | how long startup waits for the database |
//! | `JWT_SECRET` | dev secret | HS256 signing key |
//! | `BCRYPT_COST` | `12` | password hashing cost |

use thiserror::Error;

const DEV_JWT_SECRET: &str = "coursetree-dev-secret-change-in-production";

/// Largest page a listing endpoint will return
pub const MAX_PAGE_SIZE: u64 = 100;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds to
    pub server_port: u16,
    /// PostgreSQL connection string, if any
    pub database_url: Option<String>,
    /// Seconds to wait for a database connection before giving up
    pub db_connect_timeout_secs: u64,
    /// Secret used to sign and verify bearer tokens
    pub jwt_secret: String,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Upper bound for `limit` on paginated listings
    pub max_page_size: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 5000,
            database_url: None,
            db_connect_timeout_secs: 10,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            bcrypt_cost: 12,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        if let Ok(port) = std::env::var("SERVER_PORT") {
            let port = port
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT", port))?;
            builder = builder.server_port(port);
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                builder = builder.database_url(url);
            }
        }

        if let Ok(secs) = std::env::var("DB_CONNECT_TIMEOUT_SECS") {
            let secs = secs
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue("DB_CONNECT_TIMEOUT_SECS", secs))?;
            builder = builder.db_connect_timeout_secs(secs);
        }

        match std::env::var("JWT_SECRET") {
            Ok(secret) => builder = builder.jwt_secret(secret),
            Err(_) => tracing::warn!("JWT_SECRET not set, using the development secret"),
        }

        if let Ok(cost) = std::env::var("BCRYPT_COST") {
            let cost = cost
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidValue("BCRYPT_COST", cost))?;
            builder = builder.bcrypt_cost(cost);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_port == 0 {
            return Err(ConfigError::InvalidValue("SERVER_PORT", "0".to_string()));
        }
        if self.db_connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("DB_CONNECT_TIMEOUT_SECS", "0".to_string()));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue("BCRYPT_COST", self.bcrypt_cost.to_string()));
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::InvalidValue("max_page_size", "0".to_string()));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_port: Option<u16>,
    database_url: Option<String>,
    db_connect_timeout_secs: Option<u64>,
    jwt_secret: Option<String>,
    bcrypt_cost: Option<u32>,
    max_page_size: Option<u64>,
}

impl AppConfigBuilder {
    pub fn server_port(mut self, port: u16) -> Self {
        self.server_port = Some(port);
        self
    }

    pub fn database_url(mut self, url: String) -> Self {
        self.database_url = Some(url);
        self
    }

    pub fn db_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.db_connect_timeout_secs = Some(secs);
        self
    }

    pub fn jwt_secret(mut self, secret: String) -> Self {
        self.jwt_secret = Some(secret);
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = Some(cost);
        self
    }

    pub fn max_page_size(mut self, size: u64) -> Self {
        self.max_page_size = Some(size);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            server_port: self.server_port.unwrap_or(defaults.server_port),
            database_url: self.database_url,
            db_connect_timeout_secs: self.db_connect_timeout_secs.unwrap_or(defaults.db_connect_timeout_secs),
            jwt_secret: self.jwt_secret.unwrap_or(defaults.jwt_secret),
            bcrypt_cost: self.bcrypt_cost.unwrap_or(defaults.bcrypt_cost),
            max_page_size: self.max_page_size.unwrap_or(defaults.max_page_size),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AppConfig::builder().build().unwrap();
        assert_eq!(config.server_port, 5000);
        assert!(config.database_url.is_none());
        assert_eq!(config.max_page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_builder_overrides() {
        let config = AppConfig::builder()
            .server_port(8080)
            .database_url("postgres://localhost/courses".into())
            .jwt_secret("s3cret".into())
            .bcrypt_cost(4)
            .build()
            .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/courses"));
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn test_rejects_empty_secret() {
        let result = AppConfig::builder().jwt_secret(String::new()).build();
        assert!(matches!(result, Err(ConfigError::MissingValue("JWT_SECRET"))));
    }

    #[test]
    fn test_rejects_bad_bcrypt_cost() {
        let result = AppConfig::builder().bcrypt_cost(2).build();
        assert!(matches!(result, Err(ConfigError::InvalidValue("BCRYPT_COST", _))));
    }

    #[test]
    fn test_rejects_port_zero() {
        assert!(AppConfig::builder().server_port(0).build().is_err());
    }

    #[test]
    fn test_rejects_zero_connect_timeout() {
        let result = AppConfig::builder().db_connect_timeout_secs(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidValue("DB_CONNECT_TIMEOUT_SECS", _))));
    }
}
