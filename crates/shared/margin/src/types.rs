//! Result records
//!
//! Plain data handed to downstream consumers; derived once and never mutated.

use contango_core::{Lots, PositionSide, Price, Product, Rate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Margin requirement of one position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginResult {
    pub product: Product,
    pub price: Price,
    pub volume: Lots,
    pub side: PositionSide,
    pub multiplier: u32,
    /// Effective rate: base rate times broker multiplier
    pub margin_rate: Rate,
    /// price * volume * multiplier
    pub position_value: Decimal,
    /// position_value * margin_rate
    pub margin_required: Decimal,
    /// 1 / margin_rate
    pub leverage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioMargin {
    pub positions: Vec<MarginResult>,
    pub total_value: Decimal,
    pub total_margin_required: Decimal,
    /// total_margin_required / total_value, zero for an empty book
    pub weighted_average_rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableMargin {
    pub balance: Decimal,
    pub used_margin: Decimal,
    /// Never negative
    pub available_margin: Decimal,
    pub usage_rate: Rate,
}

/// Mark-to-market of one position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionPnl {
    pub product: Product,
    pub side: PositionSide,
    pub volume: Lots,
    pub entry_price: Price,
    /// Entry price when no current price was supplied
    pub current_price: Price,
    pub multiplier: u32,
    pub pnl: Decimal,
    /// pnl / (entry_price * volume * multiplier)
    pub pnl_rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnrealizedPnl {
    pub positions: Vec<PositionPnl>,
    pub total: Decimal,
    pub winners: usize,
    pub losers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicEquity {
    pub balance: Decimal,
    pub unrealized_pnl: Decimal,
    /// balance + unrealized_pnl
    pub dynamic_equity: Decimal,
    /// unrealized_pnl / balance
    pub equity_change_rate: Rate,
    pub positions: Vec<PositionPnl>,
}

/// Margin parameters of a product with a worked one-lot example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginSummary {
    pub product: Product,
    pub base_rate: Rate,
    pub broker_multiplier: Decimal,
    pub effective_rate: Rate,
    pub multiplier: u32,
    pub leverage: Decimal,
    pub example_price: Price,
    pub example_position_value: Decimal,
    pub example_margin: Decimal,
}
