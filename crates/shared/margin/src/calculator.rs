use std::collections::HashMap;
use std::sync::Arc;

use contango_core::{
    ContractDescriptor, Lots, Position, PositionSide, Price, Product, Rate, values::normalize_product,
};
use contango_ports::ContractLookup;
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::MarginConfig;
use crate::error::{MarginError, Result};
use crate::types::{
    AvailableMargin, DynamicEquity, MarginResult, MarginSummary, PortfolioMargin, PositionPnl,
    UnrealizedPnl,
};

/// Price used for the worked example in [`MarginCalculator::margin_summary`]
const SUMMARY_EXAMPLE_PRICE: Decimal = dec!(1000);

/// Current prices keyed by uppercase product symbol
pub type PriceMap = HashMap<Product, Price>;

/// Futures margin calculator
///
/// Stateless apart from its configuration: every method is a pure function
/// of the descriptors it looks up and the caller's inputs, so one instance
/// can be shared across threads.
#[derive(Clone)]
pub struct MarginCalculator {
    config: MarginConfig,
    contracts: Arc<dyn ContractLookup>,
}

impl MarginCalculator {
    pub fn new(config: MarginConfig, contracts: Arc<dyn ContractLookup>) -> Self {
        Self { config, contracts }
    }

    /// Calculator with the default 1.2 broker multiplier
    pub fn with_defaults(contracts: Arc<dyn ContractLookup>) -> Self {
        Self::new(MarginConfig::default(), contracts)
    }

    pub fn with_broker_multiplier(mut self, multiplier: Decimal) -> Self {
        info!("[MARGIN] Broker margin multiplier set to {}", multiplier);
        self.config.broker_margin_multiplier = multiplier;
        self
    }

    pub fn with_rate_override(mut self, product: &str, rate: Rate) -> Self {
        let product = normalize_product(product);
        info!("[MARGIN] {} base margin rate overridden to {}", product, rate);
        self.config.rate_overrides.insert(product, rate);
        self
    }

    pub fn config(&self) -> &MarginConfig {
        &self.config
    }

    pub fn broker_multiplier(&self) -> Decimal {
        self.config.broker_margin_multiplier
    }

    pub fn descriptor(&self, product: &str) -> Result<ContractDescriptor> {
        self.contracts
            .descriptor(product)
            .ok_or_else(|| MarginError::UnknownProduct(normalize_product(product)))
    }

    /// Exchange base rate, or the configured override
    pub fn base_margin_rate(&self, descriptor: &ContractDescriptor) -> Rate {
        self.config
            .rate_overrides
            .get(&descriptor.product)
            .copied()
            .unwrap_or(descriptor.base_margin_rate)
    }

    /// base rate * broker multiplier
    pub fn effective_margin_rate(&self, descriptor: &ContractDescriptor) -> Rate {
        self.base_margin_rate(descriptor) * self.config.broker_margin_multiplier
    }

    /// Margin for one position of a resolved contract
    pub fn position_margin(
        &self,
        descriptor: &ContractDescriptor,
        price: Price,
        volume: Lots,
        side: PositionSide,
    ) -> Result<MarginResult> {
        validate_price(price, &descriptor.product)?;
        validate_volume(volume, &descriptor.product)?;

        let margin_rate = self.effective_margin_rate(descriptor);
        if margin_rate <= Decimal::ZERO {
            return Err(MarginError::InvalidInput(format!(
                "{} has non-positive margin rate {}",
                descriptor.product, margin_rate
            )));
        }

        let position_value = descriptor
            .notional_value(price, volume)
            .ok_or_else(|| overflow(&descriptor.product, "position value"))?;
        let margin_required = position_value
            .checked_mul(margin_rate)
            .ok_or_else(|| overflow(&descriptor.product, "required margin"))?;
        let leverage = Decimal::ONE / margin_rate;

        debug!(
            "[MARGIN] {} {} lots @ {}: value={}, margin={}, rate={}",
            descriptor.product, volume, price, position_value, margin_required, margin_rate
        );

        Ok(MarginResult {
            product: descriptor.product.clone(),
            price,
            volume,
            side,
            multiplier: descriptor.multiplier,
            margin_rate,
            position_value,
            margin_required,
            leverage,
        })
    }

    /// Margin for one position, looking the product up first
    pub fn position_margin_for(
        &self,
        product: &str,
        price: Price,
        volume: Lots,
        side: PositionSide,
    ) -> Result<MarginResult> {
        let descriptor = self.descriptor(product)?;
        self.position_margin(&descriptor, price, volume, side)
    }

    /// Margin of a held position at its entry price
    pub fn margin_for_position(&self, position: &Position) -> Result<MarginResult> {
        self.position_margin_for(
            &position.product,
            position.entry_price,
            position.volume,
            position.side,
        )
    }

    /// Sum of per-position margins; order of `positions` does not matter
    pub fn portfolio_margin(&self, positions: &[Position]) -> Result<PortfolioMargin> {
        let results = positions
            .iter()
            .map(|p| self.margin_for_position(p))
            .collect::<Result<Vec<_>>>()?;

        let total_value = checked_sum(results.iter().map(|r| r.position_value), "portfolio value")?;
        let total_margin_required =
            checked_sum(results.iter().map(|r| r.margin_required), "portfolio margin")?;
        let weighted_average_rate = if total_value > Decimal::ZERO {
            total_margin_required / total_value
        } else {
            Decimal::ZERO
        };

        debug!(
            "[MARGIN] Portfolio of {}: value={}, margin={}",
            results.len(),
            total_value,
            total_margin_required
        );

        Ok(PortfolioMargin {
            positions: results,
            total_value,
            total_margin_required,
            weighted_average_rate,
        })
    }

    pub fn available_margin(&self, balance: Decimal, positions: &[Position]) -> Result<AvailableMargin> {
        validate_balance(balance)?;
        let used_margin = self.portfolio_margin(positions)?.total_margin_required;
        let usage_rate = if balance > Decimal::ZERO {
            used_margin
                .checked_div(balance)
                .ok_or_else(|| overflow("account", "margin usage rate"))?
        } else {
            Decimal::ZERO
        };

        Ok(AvailableMargin {
            balance,
            used_margin,
            available_margin: (balance - used_margin).max(Decimal::ZERO),
            usage_rate,
        })
    }

    /// Mark positions to `current_prices`; a product without a price is
    /// marked at its entry price
    pub fn unrealized_pnl(&self, positions: &[Position], current_prices: &PriceMap) -> Result<UnrealizedPnl> {
        let mut marked = Vec::with_capacity(positions.len());
        for position in positions {
            marked.push(self.position_pnl(position, current_prices)?);
        }

        let total = checked_sum(marked.iter().map(|p| p.pnl), "unrealized P&L")?;
        let winners = marked.iter().filter(|p| p.pnl > Decimal::ZERO).count();
        let losers = marked.iter().filter(|p| p.pnl < Decimal::ZERO).count();

        Ok(UnrealizedPnl {
            positions: marked,
            total,
            winners,
            losers,
        })
    }

    pub fn dynamic_equity(
        &self,
        balance: Decimal,
        positions: &[Position],
        current_prices: &PriceMap,
    ) -> Result<DynamicEquity> {
        validate_balance(balance)?;
        let pnl = self.unrealized_pnl(positions, current_prices)?;
        let equity_change_rate = if balance > Decimal::ZERO {
            pnl.total
                .checked_div(balance)
                .ok_or_else(|| overflow("account", "equity change rate"))?
        } else {
            Decimal::ZERO
        };
        let dynamic_equity = balance
            .checked_add(pnl.total)
            .ok_or_else(|| overflow("account", "dynamic equity"))?;

        Ok(DynamicEquity {
            balance,
            unrealized_pnl: pnl.total,
            dynamic_equity,
            equity_change_rate,
            positions: pnl.positions,
        })
    }

    pub fn margin_summary(&self, product: &str) -> Result<MarginSummary> {
        let descriptor = self.descriptor(product)?;
        let example = self.position_margin(&descriptor, SUMMARY_EXAMPLE_PRICE, 1, PositionSide::Long)?;

        Ok(MarginSummary {
            product: descriptor.product.clone(),
            base_rate: self.base_margin_rate(&descriptor),
            broker_multiplier: self.config.broker_margin_multiplier,
            effective_rate: example.margin_rate,
            multiplier: descriptor.multiplier,
            leverage: example.leverage,
            example_price: SUMMARY_EXAMPLE_PRICE,
            example_position_value: example.position_value,
            example_margin: example.margin_required,
        })
    }

    fn position_pnl(&self, position: &Position, current_prices: &PriceMap) -> Result<PositionPnl> {
        let descriptor = self.descriptor(&position.product)?;
        validate_price(position.entry_price, &position.product)?;
        validate_volume(position.volume, &position.product)?;

        let current_price = match current_prices.get(&descriptor.product) {
            Some(price) => {
                validate_price(*price, &position.product)?;
                *price
            }
            None => position.entry_price,
        };

        let units = Decimal::from(position.volume) * Decimal::from(descriptor.multiplier);
        let pnl = position
            .price_gain(current_price)
            .checked_mul(units)
            .ok_or_else(|| overflow(&descriptor.product, "unrealized P&L"))?;
        let pnl_rate = position
            .entry_price
            .checked_mul(units)
            .and_then(|cost| pnl.checked_div(cost))
            .ok_or_else(|| overflow(&descriptor.product, "P&L rate"))?;

        Ok(PositionPnl {
            product: descriptor.product,
            side: position.side,
            volume: position.volume,
            entry_price: position.entry_price,
            current_price,
            multiplier: descriptor.multiplier,
            pnl,
            pnl_rate,
        })
    }
}

fn overflow(subject: &str, quantity: &str) -> MarginError {
    MarginError::InvalidInput(format!("{} {} overflows", subject, quantity))
}

fn checked_sum(mut values: impl Iterator<Item = Decimal>, quantity: &str) -> Result<Decimal> {
    values
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
        .ok_or_else(|| overflow("portfolio", quantity))
}

fn validate_price(price: Price, product: &str) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(MarginError::InvalidInput(format!(
            "{} price must be positive, got {}",
            product, price
        )));
    }
    Ok(())
}

fn validate_volume(volume: Lots, product: &str) -> Result<()> {
    if volume == 0 {
        return Err(MarginError::InvalidInput(format!("{} volume must be positive", product)));
    }
    Ok(())
}

fn validate_balance(balance: Decimal) -> Result<()> {
    if balance < Decimal::ZERO {
        return Err(MarginError::InvalidInput(format!(
            "balance must not be negative, got {}",
            balance
        )));
    }
    Ok(())
}
