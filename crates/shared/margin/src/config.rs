use std::collections::BTreeMap;

use contango_core::values::{deserialize_product_map, normalize_product};
use contango_core::{Product, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{MarginError, Result};

/// Default surcharge brokers apply over the exchange base rate
pub const DEFAULT_BROKER_MARGIN_MULTIPLIER: Decimal = dec!(1.2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginConfig {
    /// Applied over every base rate (1.2 = broker charges 120% of exchange margin)
    pub broker_margin_multiplier: Decimal,
    /// Per-product base rates replacing the registry's
    #[serde(deserialize_with = "deserialize_product_map")]
    pub rate_overrides: BTreeMap<Product, Rate>,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            broker_margin_multiplier: DEFAULT_BROKER_MARGIN_MULTIPLIER,
            rate_overrides: BTreeMap::new(),
        }
    }
}

impl MarginConfig {
    pub fn validate(&self) -> Result<()> {
        if self.broker_margin_multiplier <= Decimal::ZERO {
            return Err(MarginError::InvalidInput(format!(
                "broker margin multiplier must be positive, got {}",
                self.broker_margin_multiplier
            )));
        }
        for (product, rate) in &self.rate_overrides {
            if *product != normalize_product(product) {
                return Err(MarginError::InvalidInput(format!(
                    "margin rate override key {:?} is not an uppercase product symbol",
                    product
                )));
            }
            if *rate <= Decimal::ZERO || *rate > Decimal::ONE {
                return Err(MarginError::InvalidInput(format!(
                    "margin rate override for {} must be in (0, 1], got {}",
                    product, rate
                )));
            }
        }
        Ok(())
    }
}
