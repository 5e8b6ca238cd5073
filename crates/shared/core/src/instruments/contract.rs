use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{Category, Exchange};
use crate::values::{Lots, Price, Product, Rate};

/// Reference data for one futures product (e.g., CU on SHFE)
///
/// Descriptors are immutable once the registry has loaded them; other
/// components only ever see shared references or clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDescriptor {
    /// Canonical uppercase product symbol ("CU")
    pub product: Product,
    /// Human-readable name ("SHFE Copper")
    pub name: String,
    pub exchange: Exchange,
    pub category: Category,
    /// Fully-qualified code of the product
    ///
    /// The registry stores the index contract code ("KQ.i@SHFE.cu");
    /// [`ContractDescriptor::new`] starts from the bare exchange-qualified
    /// symbol ("SHFE.cu") until one is assigned.
    pub canonical_code: String,
    /// Units per lot
    pub multiplier: u32,
    /// Exchange margin rate before any broker surcharge
    pub base_margin_rate: Rate,
    /// Minimum price increment
    pub tick_size: Price,
    /// Trading unit as published ("5 t/lot")
    pub trading_unit: String,
    /// Listed delivery months rule ("1-12")
    pub delivery_months: String,
}

impl ContractDescriptor {
    /// Create a descriptor with neutral defaults for the descriptive fields
    ///
    /// The canonical code defaults to `EXCHANGE.symbol` in the exchange's
    /// default case; see [`ContractDescriptor::with_canonical_code`].
    pub fn new(
        product: impl Into<Product>,
        exchange: Exchange,
        category: Category,
        multiplier: u32,
        base_margin_rate: Rate,
    ) -> Self {
        let product = product.into().to_uppercase();
        let canonical_code = format!(
            "{}.{}",
            exchange.code(),
            exchange.default_symbol_case().apply(&product)
        );
        Self {
            name: product.clone(),
            product,
            exchange,
            category,
            canonical_code,
            multiplier,
            base_margin_rate,
            tick_size: dec!(1),
            trading_unit: String::new(),
            delivery_months: String::new(),
        }
    }

    /// Builder pattern for customization
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_canonical_code(mut self, code: impl Into<String>) -> Self {
        self.canonical_code = code.into();
        self
    }

    pub fn with_tick_size(mut self, tick: Price) -> Self {
        self.tick_size = tick;
        self
    }

    pub fn with_trading_unit(mut self, unit: impl Into<String>) -> Self {
        self.trading_unit = unit.into();
        self
    }

    pub fn with_delivery_months(mut self, months: impl Into<String>) -> Self {
        self.delivery_months = months.into();
        self
    }

    /// `multiplier > 0` and `0 < base_margin_rate <= 1`
    pub fn is_valid(&self) -> bool {
        self.multiplier > 0 && self.base_margin_rate > Decimal::ZERO && self.base_margin_rate <= Decimal::ONE
    }

    /// Calculate notional value: price * lots * multiplier
    ///
    /// `None` when the product does not fit in a `Decimal`.
    pub fn notional_value(&self, price: Price, volume: Lots) -> Option<Decimal> {
        let units = Decimal::from(volume).checked_mul(Decimal::from(self.multiplier))?;
        price.checked_mul(units)
    }
}

impl std::fmt::Display for ContractDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.product, self.canonical_code)
    }
}
