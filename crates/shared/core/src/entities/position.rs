use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Lots, Price, Product, normalize_product};

/// Position side - long (bought) or short (sold)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    /// Long position - profit when price rises
    Long,
    /// Short position - profit when price falls
    Short,
}

impl PositionSide {
    /// +1 for long, -1 for short
    pub fn sign(&self) -> Decimal {
        match self {
            PositionSide::Long => Decimal::ONE,
            PositionSide::Short => Decimal::NEGATIVE_ONE,
        }
    }
}

/// An open futures position as supplied by the caller.
///
/// Positions are request data; nothing in this workspace stores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Product symbol ("CU")
    pub product: Product,
    /// Average entry price
    pub entry_price: Price,
    /// Open lots
    pub volume: Lots,
    pub side: PositionSide,
}

impl Position {
    pub fn new(product: &str, entry_price: Price, volume: Lots, side: PositionSide) -> Self {
        Self {
            product: normalize_product(product),
            entry_price,
            volume,
            side,
        }
    }

    pub fn long(product: &str, entry_price: Price, volume: Lots) -> Self {
        Self::new(product, entry_price, volume, PositionSide::Long)
    }

    pub fn short(product: &str, entry_price: Price, volume: Lots) -> Self {
        Self::new(product, entry_price, volume, PositionSide::Short)
    }

    /// Price move in the position's favour per unit
    pub fn price_gain(&self, current_price: Price) -> Decimal {
        (current_price - self.entry_price) * self.side.sign()
    }
}
