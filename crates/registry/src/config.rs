//! Registry configuration

use std::collections::BTreeMap;
use std::time::Duration;

use contango_core::{Exchange, SymbolCase};
use serde::{Deserialize, Serialize};

/// Default time-to-live of a loaded snapshot (4 hours)
pub const DEFAULT_TTL_SECS: u64 = 4 * 60 * 60;

/// Default bound on one refresh call
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Vendor tag used in continuous-contract codes
pub const DEFAULT_VENDOR_TAG: &str = "KQ";

/// Where refreshed reference data comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backing {
    /// Built-in reference table only
    #[default]
    StaticTable,
    /// Static table refreshed from a market data source
    LiveSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub backing: Backing,
    pub ttl_secs: u64,
    pub timeout_secs: u64,
    pub vendor_tag: String,
    /// Starting per-exchange symbol case; a live refresh replaces these
    pub case_rules: BTreeMap<Exchange, SymbolCase>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            backing: Backing::default(),
            ttl_secs: DEFAULT_TTL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            vendor_tag: DEFAULT_VENDOR_TAG.to_string(),
            case_rules: Exchange::ALL
                .iter()
                .map(|exchange| (*exchange, exchange.default_symbol_case()))
                .collect(),
        }
    }
}

impl RegistryConfig {
    pub fn live() -> Self {
        Self {
            backing: Backing::LiveSource,
            ..Default::default()
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured case for an exchange, falling back to the exchange default
    pub fn case_rule(&self, exchange: Exchange) -> SymbolCase {
        self.case_rules
            .get(&exchange)
            .copied()
            .unwrap_or_else(|| exchange.default_symbol_case())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.backing, Backing::StaticTable);
        assert_eq!(config.ttl(), Duration::from_secs(14400));
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.vendor_tag, "KQ");
        assert_eq!(config.case_rule(Exchange::Shfe), SymbolCase::Lower);
        assert_eq!(config.case_rule(Exchange::Czce), SymbolCase::Upper);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{"backing": "live_source", "case_rules": {"GFEX": "lower"}}"#)
                .unwrap();
        assert_eq!(config.backing, Backing::LiveSource);
        assert_eq!(config.ttl_secs, DEFAULT_TTL_SECS);
        assert_eq!(config.case_rule(Exchange::Gfex), SymbolCase::Lower);
        // Map replaced wholesale; missing exchanges fall back to their default
        assert_eq!(config.case_rule(Exchange::Cffex), SymbolCase::Upper);
    }
}
