//! Risk Parameters
//!
//! Limits applied by the risk manager and the static classification tables
//! that place each product in a risk tier and a sector. Both are plain data
//! so they can be overridden from configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use contango_core::values::{deserialize_product_map, normalize_product};
use contango_core::{Lots, Product, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};

/// Share of balance above which committed margin draws a warning
pub const MARGIN_USAGE_WARNING: Rate = dec!(0.8);

/// Margin ratio at or below which a portfolio is flagged Medium
pub const LOW_MARGIN_RATIO: Decimal = dec!(1.5);

/// Fraction of the daily loss limit at which a portfolio is flagged High
pub const DAILY_LOSS_WARNING_FRACTION: Rate = dec!(0.8);

/// Account-wide risk limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLimits {
    /// Max share of portfolio value in one product
    pub max_position_concentration: Rate,
    /// Max share of portfolio value in one sector
    pub max_sector_concentration: Rate,
    pub max_leverage: Decimal,
    /// Loss as a share of balance that triggers the daily loss limit
    pub max_daily_loss_rate: Rate,
    /// Equity / margin at or below which a margin call is due
    pub margin_call_ratio: Decimal,
    /// Equity / margin at or below which positions are force-liquidated
    pub force_liquidation_ratio: Decimal,
    pub max_lots_per_product: Lots,
    /// Surcharge over the exchange base rate
    pub broker_margin_multiplier: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_position_concentration: dec!(0.30),
            max_sector_concentration: dec!(0.50),
            max_leverage: dec!(10),
            max_daily_loss_rate: dec!(0.05),
            margin_call_ratio: dec!(1.2),
            force_liquidation_ratio: dec!(1.0),
            max_lots_per_product: 100,
            broker_margin_multiplier: dec!(1.2),
        }
    }
}

impl RiskLimits {
    pub fn validate(&self) -> Result<()> {
        for (name, share) in [
            ("max_position_concentration", self.max_position_concentration),
            ("max_sector_concentration", self.max_sector_concentration),
            ("max_daily_loss_rate", self.max_daily_loss_rate),
        ] {
            if share <= Decimal::ZERO || share > Decimal::ONE {
                return Err(RiskError::InvalidInput(format!(
                    "{} must be in (0, 1], got {}",
                    name, share
                )));
            }
        }
        for (name, value) in [
            ("max_leverage", self.max_leverage),
            ("force_liquidation_ratio", self.force_liquidation_ratio),
            ("broker_margin_multiplier", self.broker_margin_multiplier),
        ] {
            if value <= Decimal::ZERO {
                return Err(RiskError::InvalidInput(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.force_liquidation_ratio > self.margin_call_ratio {
            return Err(RiskError::InvalidInput(format!(
                "force_liquidation_ratio {} exceeds margin_call_ratio {}",
                self.force_liquidation_ratio, self.margin_call_ratio
            )));
        }
        if self.max_lots_per_product == 0 {
            return Err(RiskError::InvalidInput(
                "max_lots_per_product must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    pub fn default_profile(&self) -> TierProfile {
        match self {
            RiskTier::Low => TierProfile::new(dec!(20), dec!(1.0)),
            RiskTier::Medium => TierProfile::new(dec!(10), dec!(1.2)),
            RiskTier::High => TierProfile::new(dec!(5), dec!(1.5)),
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "low"),
            RiskTier::Medium => write!(f, "medium"),
            RiskTier::High => write!(f, "high"),
        }
    }
}

/// Limits attached to a risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProfile {
    pub max_leverage: Decimal,
    pub margin_multiplier: Decimal,
}

impl TierProfile {
    pub fn new(max_leverage: Decimal, margin_multiplier: Decimal) -> Self {
        Self {
            max_leverage,
            margin_multiplier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Financial,
    PreciousMetals,
    BaseMetals,
    FerrousMetals,
    EnergyChemical,
    Agricultural,
    Industrial,
    Other,
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sector::Financial => "financial",
            Sector::PreciousMetals => "precious_metals",
            Sector::BaseMetals => "base_metals",
            Sector::FerrousMetals => "ferrous_metals",
            Sector::EnergyChemical => "energy_chemical",
            Sector::Agricultural => "agricultural",
            Sector::Industrial => "industrial",
            Sector::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Product -> tier and product -> sector tables
///
/// Lookups never fail: unlisted products fall back to [`RiskTier::Medium`]
/// and [`Sector::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationTable {
    #[serde(deserialize_with = "deserialize_product_map")]
    pub tiers: BTreeMap<Product, RiskTier>,
    #[serde(deserialize_with = "deserialize_product_map")]
    pub sectors: BTreeMap<Product, Sector>,
    pub tier_profiles: BTreeMap<RiskTier, TierProfile>,
}

const LOW_TIER: &[&str] = &["T", "TF", "TS"];
const MEDIUM_TIER: &[&str] = &["IF", "IH", "IC", "IM", "CU", "AL", "ZN", "AU", "AG", "RB", "HC"];
const HIGH_TIER: &[&str] = &["AP", "CJ", "SC", "NI", "LC", "SI"];

const SECTORS: &[(Sector, &[&str])] = &[
    (Sector::Financial, &["IF", "IH", "IC", "IM", "T", "TF", "TS"]),
    (Sector::PreciousMetals, &["AU", "AG"]),
    (Sector::BaseMetals, &["CU", "AL", "ZN", "PB", "NI", "SN", "BC"]),
    (Sector::FerrousMetals, &["RB", "HC", "SS", "I", "J", "JM"]),
    (
        Sector::EnergyChemical,
        &["SC", "FU", "LU", "BU", "RU", "L", "V", "PP", "TA", "MA", "ZC", "UR", "SA", "PF"],
    ),
    (
        Sector::Agricultural,
        &["C", "CS", "A", "B", "M", "Y", "P", "CF", "SR", "OI", "RM", "AP", "CJ", "JD"],
    ),
    (Sector::Industrial, &["FG", "SI", "LC"]),
];

impl Default for ClassificationTable {
    fn default() -> Self {
        let mut tiers = BTreeMap::new();
        for (tier, products) in [
            (RiskTier::Low, LOW_TIER),
            (RiskTier::Medium, MEDIUM_TIER),
            (RiskTier::High, HIGH_TIER),
        ] {
            for product in products {
                tiers.insert(product.to_string(), tier);
            }
        }

        let sectors = SECTORS
            .iter()
            .flat_map(|(sector, products)| products.iter().map(move |p| (p.to_string(), *sector)))
            .collect();

        let tier_profiles = RiskTier::ALL
            .iter()
            .map(|tier| (*tier, tier.default_profile()))
            .collect();

        Self {
            tiers,
            sectors,
            tier_profiles,
        }
    }
}

impl ClassificationTable {
    pub fn tier(&self, product: &str) -> RiskTier {
        self.tiers
            .get(&normalize_product(product))
            .copied()
            .unwrap_or(RiskTier::Medium)
    }

    pub fn sector(&self, product: &str) -> Sector {
        self.sectors
            .get(&normalize_product(product))
            .copied()
            .unwrap_or(Sector::Other)
    }

    pub fn profile(&self, tier: RiskTier) -> TierProfile {
        self.tier_profiles
            .get(&tier)
            .copied()
            .unwrap_or_else(|| tier.default_profile())
    }

    pub fn validate(&self) -> Result<()> {
        let mut keys = self.tiers.keys().chain(self.sectors.keys());
        if let Some(product) = keys.find(|p| **p != normalize_product(p)) {
            return Err(RiskError::InvalidInput(format!(
                "classification key {:?} is not an uppercase product symbol",
                product
            )));
        }
        for (tier, profile) in &self.tier_profiles {
            if profile.max_leverage <= Decimal::ZERO || profile.margin_multiplier <= Decimal::ZERO {
                return Err(RiskError::InvalidInput(format!(
                    "{} tier profile must have positive leverage and multiplier",
                    tier
                )));
            }
        }
        Ok(())
    }
}

/// Caller's appetite for risk when sizing a new position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskTolerance {
    /// Share of balance that may be committed as margin
    pub fn budget_fraction(&self) -> Rate {
        match self {
            RiskTolerance::Low => dec!(0.10),
            RiskTolerance::Medium => dec!(0.20),
            RiskTolerance::High => dec!(0.30),
        }
    }

    pub fn max_leverage(&self) -> Decimal {
        match self {
            RiskTolerance::Low => dec!(3),
            RiskTolerance::Medium => dec!(5),
            RiskTolerance::High => dec!(8),
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTolerance::Low => write!(f, "low"),
            RiskTolerance::Medium => write!(f, "medium"),
            RiskTolerance::High => write!(f, "high"),
        }
    }
}

impl FromStr for RiskTolerance {
    type Err = RiskError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTolerance::Low),
            "medium" => Ok(RiskTolerance::Medium),
            "high" => Ok(RiskTolerance::High),
            other => Err(RiskError::InvalidInput(format!("unknown risk tolerance: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = RiskLimits::default();
        assert_eq!(limits.max_position_concentration, dec!(0.3));
        assert_eq!(limits.max_lots_per_product, 100);
        assert_eq!(limits.broker_margin_multiplier, dec!(1.2));
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_limits_reject_inverted_ratios() {
        let limits = RiskLimits {
            force_liquidation_ratio: dec!(1.3),
            ..Default::default()
        };
        assert!(matches!(limits.validate(), Err(RiskError::InvalidInput(_))));

        let limits = RiskLimits {
            max_sector_concentration: dec!(0),
            ..Default::default()
        };
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_classification_defaults() {
        let table = ClassificationTable::default();
        assert_eq!(table.tier("T"), RiskTier::Low);
        assert_eq!(table.tier("cu"), RiskTier::Medium);
        assert_eq!(table.tier("AP"), RiskTier::High);
        assert_eq!(table.sector("AP"), Sector::Agricultural);
        assert_eq!(table.sector("rb"), Sector::FerrousMetals);
        assert_eq!(table.sector("LC"), Sector::Industrial);
    }

    #[test]
    fn test_unclassified_product_falls_back() {
        let table = ClassificationTable::default();
        assert_eq!(table.tier("ZZ"), RiskTier::Medium);
        assert_eq!(table.sector("ZZ"), Sector::Other);
    }

    #[test]
    fn test_tier_profiles() {
        let table = ClassificationTable::default();
        assert_eq!(table.profile(RiskTier::Low).max_leverage, dec!(20));
        assert_eq!(table.profile(RiskTier::High).margin_multiplier, dec!(1.5));

        let sparse = ClassificationTable {
            tier_profiles: BTreeMap::new(),
            ..Default::default()
        };
        assert_eq!(sparse.profile(RiskTier::Medium).max_leverage, dec!(10));
    }

    #[test]
    fn test_tolerance() {
        assert_eq!(RiskTolerance::default(), RiskTolerance::Medium);
        assert_eq!(RiskTolerance::Medium.budget_fraction(), dec!(0.2));
        assert_eq!(RiskTolerance::High.max_leverage(), dec!(8));
        assert_eq!("LOW".parse::<RiskTolerance>().unwrap(), RiskTolerance::Low);
        assert!("reckless".parse::<RiskTolerance>().is_err());
    }

    #[test]
    fn test_classification_from_json() {
        let table: ClassificationTable =
            serde_json::from_str(r#"{"tiers": {"CU": "high"}, "sectors": {"CU": "precious_metals"}}"#)
                .unwrap();
        assert_eq!(table.tier("CU"), RiskTier::High);
        assert_eq!(table.sector("CU"), Sector::PreciousMetals);
        // Profiles keep their defaults
        assert_eq!(table.profile(RiskTier::High).max_leverage, dec!(5));
    }

    #[test]
    fn test_classification_keys_normalized() {
        let table: ClassificationTable =
            serde_json::from_str(r#"{"tiers": {"cu": "high"}, "sectors": {"sc": "other"}}"#).unwrap();
        assert_eq!(table.tier("CU"), RiskTier::High);
        assert_eq!(table.sector("SC"), Sector::Other);
        assert!(table.validate().is_ok());

        let mut table = ClassificationTable::default();
        table.tiers.insert("ni".to_string(), RiskTier::Low);
        assert!(table.validate().is_err());
    }
}
