use async_trait::async_trait;
use contango_core::{Exchange, Price, Rate};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Instrument families a source can list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    /// Continuous index proxies (KQ.i@...)
    Index,
    /// Main-continuous proxies (KQ.m@...)
    Main,
    /// Dated delivery months
    Future,
}

/// Filter for [`MarketDataSource::list_instruments`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentQuery {
    pub class: InstrumentClass,
    pub exchange: Option<Exchange>,
    pub product: Option<String>,
    pub include_expired: bool,
}

impl InstrumentQuery {
    pub fn new(class: InstrumentClass) -> Self {
        Self {
            class,
            exchange: None,
            product: None,
            include_expired: false,
        }
    }

    pub fn on_exchange(mut self, exchange: Exchange) -> Self {
        self.exchange = Some(exchange);
        self
    }

    pub fn for_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn including_expired(mut self) -> Self {
        self.include_expired = true;
        self
    }
}

/// Static attributes of one listed instrument
///
/// Every field is optional: sources report what they have and the registry
/// decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticInfo {
    pub name: Option<String>,
    pub upper_limit: Option<Price>,
    pub lower_limit: Option<Price>,
    pub pre_settlement: Option<Price>,
    pub pre_close: Option<Price>,
    pub delivery_year: Option<u32>,
    pub delivery_month: Option<u32>,
    /// Units per lot
    pub volume_multiple: Option<u32>,
    pub price_tick: Option<Price>,
    /// Exchange margin rate as a fraction
    pub margin_rate: Option<Rate>,
}

/// Port for the live market data source
///
/// The registry and the resolver are the only consumers. Implementations
/// must be cheap to share (`Arc<dyn MarketDataSource>`).
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// List instrument codes matching the query (e.g., "KQ.i@SHFE.cu")
    async fn list_instruments(&self, query: &InstrumentQuery) -> Result<Vec<String>, SourceError>;

    /// Static attributes for one code, `None` when the source does not know it
    async fn lookup_static_info(&self, code: &str) -> Result<Option<StaticInfo>, SourceError>;

    /// Source name for logging
    fn name(&self) -> &str {
        "MarketDataSource"
    }
}
