//! Configuration management for the Restaurant POS admin backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with RPOS_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::alerts::AlertThresholds;
use shared::types::DashboardSettings;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Action nonce configuration
    pub nonce: NonceConfig,

    /// Fryer oil alert tiers
    pub fryer: FryerAlertConfig,

    /// Admin dashboard polling and display settings
    pub dashboard: DashboardConfig,

    /// Bootstrap administrator, created when no users exist
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NonceConfig {
    /// HMAC key for action nonces
    pub secret: String,

    /// A nonce stays valid for between half and all of this many seconds
    pub lifespan_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FryerAlertConfig {
    pub low_usage_percent: u32,
    pub medium_usage_percent: u32,
    pub high_usage_percent: u32,
    pub low_hours: u32,
    pub medium_hours: u32,
    pub high_hours: u32,
}

impl FryerAlertConfig {
    pub fn thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            low_usage_percent: Decimal::from(self.low_usage_percent),
            medium_usage_percent: Decimal::from(self.medium_usage_percent),
            high_usage_percent: Decimal::from(self.high_usage_percent),
            low_hours: Decimal::from(self.low_hours),
            medium_hours: Decimal::from(self.medium_hours),
            high_hours: Decimal::from(self.high_hours),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Kitchen display polling interval
    pub kitchen_refresh_seconds: u32,

    /// Fryer dashboard polling interval
    pub fryer_refresh_seconds: u32,

    /// Open orders older than this are flagged late
    pub late_order_minutes: i64,

    /// Stock below this is shown as low
    pub low_stock_threshold: u32,
}

impl DashboardConfig {
    pub fn settings(&self) -> DashboardSettings {
        DashboardSettings {
            kitchen_refresh_seconds: self.kitchen_refresh_seconds,
            fryer_refresh_seconds: self.fryer_refresh_seconds,
            late_order_minutes: self.late_order_minutes,
            low_stock_threshold: Decimal::from(self.low_stock_threshold),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("RPOS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 604800)?
            .set_default("nonce.lifespan_seconds", 86400)?
            .set_default("fryer.low_usage_percent", 60)?
            .set_default("fryer.medium_usage_percent", 80)?
            .set_default("fryer.high_usage_percent", 100)?
            .set_default("fryer.low_hours", 48)?
            .set_default("fryer.medium_hours", 72)?
            .set_default("fryer.high_hours", 96)?
            .set_default("dashboard.kitchen_refresh_seconds", 30)?
            .set_default("dashboard.fryer_refresh_seconds", 60)?
            .set_default("dashboard.late_order_minutes", 15)?
            .set_default("dashboard.low_stock_threshold", 10)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (RPOS_ prefix)
            .add_source(
                Environment::with_prefix("RPOS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.fryer
            .thresholds()
            .validate()
            .map_err(|e| ConfigError::Message(format!("fryer: {}", e)))?;

        if self.nonce.lifespan_seconds < 2 {
            return Err(ConfigError::Message(
                "nonce.lifespan_seconds must be at least 2".to_string(),
            ));
        }
        if self.dashboard.kitchen_refresh_seconds == 0 || self.dashboard.fryer_refresh_seconds == 0 {
            return Err(ConfigError::Message(
                "dashboard refresh intervals must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
