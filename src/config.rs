use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::order::{FlatRate, NoCharges, PricingPolicy, WritePolicy};
use crate::utils::RetryConfig;

// ============================================================================
// Configuration
// ============================================================================
//
// Loaded from an optional TOML file; every field has a default so an empty
// file (or no file) gives a working setup against a local API.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub api: ApiConfig,
    pub retry: RetrySettings,
    pub pricing: PricingSettings,
    pub write_policy: WritePolicy,
    /// Operator timezone for local editor values and "today" filters
    pub timezone_offset_minutes: i32,
    /// Used when RUST_LOG is not set
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            initial_delay_ms: defaults.initial_delay.as_millis() as u64,
            max_delay_ms: defaults.max_delay.as_millis() as u64,
        }
    }
}

/// Zero tax and shipping unless configured
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub tax_rate: Decimal,
    pub shipping_fee: Decimal,
}

impl AdminConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must start with http:// or https://, got {url}"
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be positive".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        if self.pricing.tax_rate.is_sign_negative() || self.pricing.shipping_fee.is_sign_negative() {
            return Err(ConfigError::Invalid("pricing values cannot be negative".into()));
        }
        self.timezone()?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.retry.max_attempts,
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            ..RetryConfig::default()
        }
    }

    pub fn pricing_policy(&self) -> Arc<dyn PricingPolicy> {
        if self.pricing.tax_rate.is_zero() && self.pricing.shipping_fee.is_zero() {
            Arc::new(NoCharges)
        } else {
            Arc::new(FlatRate {
                tax_rate: self.pricing.tax_rate,
                shipping_fee: self.pricing.shipping_fee,
            })
        }
    }

    pub fn timezone(&self) -> Result<FixedOffset, ConfigError> {
        self.timezone_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "timezone_offset_minutes out of range: {}",
                    self.timezone_offset_minutes
                ))
            })
    }
}

impl std::str::FromStr for AdminConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: AdminConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
