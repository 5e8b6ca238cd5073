//! Configuration loading
//!
//! One JSON document configures every component:
//! - `registry`: backing strategy, TTL, timeout, per-exchange case rules
//! - `margin`: broker multiplier and per-product rate overrides
//! - `risk`: account risk limits
//! - `classification`: product risk tiers and sectors
//!
//! Every section is optional and falls back to its defaults.

use std::path::Path;

use contango_margin::MarginConfig;
use contango_registry::RegistryConfig;
use contango_risk_manager::{ClassificationTable, RiskLimits};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContangoConfig {
    pub registry: RegistryConfig,
    pub margin: MarginConfig,
    pub risk: RiskLimits,
    pub classification: ClassificationTable,
}

impl ContangoConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The configuration shipped with the crate
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json(include_str!("contango.json"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.ttl_secs == 0 {
            return Err(ConfigError::Invalid("registry ttl_secs must be positive".to_string()));
        }
        if self.registry.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "registry timeout_secs must be positive".to_string(),
            ));
        }
        if self.registry.vendor_tag.trim().is_empty() {
            return Err(ConfigError::Invalid("registry vendor_tag is empty".to_string()));
        }

        self.margin
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.risk
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.classification
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.margin.broker_margin_multiplier != self.risk.broker_margin_multiplier {
            warn!(
                "[BOOTSTRAP] margin.broker_margin_multiplier {} differs from risk.broker_margin_multiplier {}; the risk limit is used",
                self.margin.broker_margin_multiplier, self.risk.broker_margin_multiplier
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contango_core::{Exchange, SymbolCase};
    use contango_registry::Backing;
    use contango_risk_manager::RiskTier;
    use rust_decimal_macros::dec;

    #[test]
    fn test_embedded_matches_defaults() {
        let embedded = ContangoConfig::embedded().unwrap();
        assert_eq!(embedded, ContangoConfig::default());
        assert!(embedded.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(ContangoConfig::from_json("{}").unwrap(), ContangoConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = ContangoConfig::from_json(
            r#"{
                "registry": {"backing": "live_source", "ttl_secs": 60},
                "margin": {"rate_overrides": {"CU": "0.1"}},
                "risk": {"max_lots_per_product": 20},
                "classification": {"tiers": {"CU": "high"}}
            }"#,
        )
        .unwrap();

        assert_eq!(config.registry.backing, Backing::LiveSource);
        assert_eq!(config.registry.ttl_secs, 60);
        assert_eq!(config.registry.case_rule(Exchange::Dce), SymbolCase::Lower);
        assert_eq!(config.margin.rate_overrides["CU"], dec!(0.1));
        assert_eq!(config.risk.max_lots_per_product, 20);
        assert_eq!(config.risk.margin_call_ratio, dec!(1.2));
        assert_eq!(config.classification.tier("CU"), RiskTier::High);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = ContangoConfig::default();
        config.registry.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ContangoConfig::default();
        config.risk.force_liquidation_ratio = dec!(1.5);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ContangoConfig::default();
        config.margin.rate_overrides.insert("CU".to_string(), dec!(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_and_io_errors() {
        assert!(matches!(
            ContangoConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ContangoConfig::from_file("/nonexistent/contango.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
