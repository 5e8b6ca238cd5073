//! Backing strategies for registry refreshes

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use contango_core::{Category, ContractDescriptor, Exchange, SymbolCase, VendorCode};
use contango_ports::{InstrumentClass, InstrumentQuery, MarketDataSource, StaticInfo};
use log::{debug, info, warn};

use crate::error::{RegistryError, Result};
use crate::snapshot::Snapshot;
use crate::table::static_table;

/// Produces the next snapshot from the current one
#[async_trait]
pub trait ReferenceLoader: Send + Sync {
    async fn load(&self, previous: &Snapshot) -> Result<Snapshot>;

    fn name(&self) -> &str;
}

/// Reloads the built-in table
pub struct StaticTableLoader {
    vendor_tag: String,
    case_rules: Vec<(Exchange, SymbolCase)>,
}

impl StaticTableLoader {
    pub fn new(
        vendor_tag: impl Into<String>,
        case_rules: impl IntoIterator<Item = (Exchange, SymbolCase)>,
    ) -> Self {
        Self {
            vendor_tag: vendor_tag.into(),
            case_rules: case_rules.into_iter().collect(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_table(static_table(), &self.vendor_tag, self.case_rules.iter().copied())
    }
}

#[async_trait]
impl ReferenceLoader for StaticTableLoader {
    async fn load(&self, _previous: &Snapshot) -> Result<Snapshot> {
        Ok(self.snapshot())
    }

    fn name(&self) -> &str {
        "static-table"
    }
}

/// Rebuilds the snapshot from what a market data source lists
///
/// Known products keep their table attributes and adopt the code the source
/// lists them under. Products the table lacks are admitted only when the
/// source reports a lot multiplier and a margin rate for them.
pub struct LiveSourceLoader {
    source: Arc<dyn MarketDataSource>,
}

impl LiveSourceLoader {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    async fn discover(&self, code: &str, vendor: &VendorCode<'_>, exchange: Exchange) -> Option<ContractDescriptor> {
        let info = match self.source.lookup_static_info(code).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                warn!("[REGISTRY] {} listed but has no static info, skipping", code);
                return None;
            }
            Err(e) => {
                warn!("[REGISTRY] static info for {} failed: {}, skipping", code, e);
                return None;
            }
        };
        descriptor_from_info(vendor.symbol, exchange, code, &info)
    }
}

#[async_trait]
impl ReferenceLoader for LiveSourceLoader {
    async fn load(&self, previous: &Snapshot) -> Result<Snapshot> {
        let query = InstrumentQuery::new(InstrumentClass::Index);
        let codes = self
            .source
            .list_instruments(&query)
            .await
            .map_err(|e| RegistryError::DataUnavailable(format!("{}: {}", self.source.name(), e)))?;

        if codes.is_empty() {
            return Err(RegistryError::DataUnavailable(format!(
                "{} listed no index instruments",
                self.source.name()
            )));
        }

        let mut next = Snapshot::new();
        let mut observed = CaseObservations::default();
        let mut discovered = 0usize;

        for code in &codes {
            let Some(vendor) = VendorCode::parse(code) else {
                warn!("[REGISTRY] Unparseable instrument code from source: {}", code);
                continue;
            };
            let Ok(exchange) = vendor.exchange.parse::<Exchange>() else {
                warn!("[REGISTRY] Unknown exchange in {}, skipping", code);
                continue;
            };
            observed.record(exchange, vendor.symbol);

            let product = vendor.symbol.to_ascii_uppercase();
            let descriptor = match previous.descriptor(&product) {
                Some(known) if known.exchange != exchange => {
                    warn!(
                        "[REGISTRY] {} listed on {} but known on {}, keeping known listing",
                        product, exchange, known.exchange
                    );
                    continue;
                }
                Some(known) => known.clone().with_canonical_code(code.as_str()),
                None => match self.discover(code, &vendor, exchange).await {
                    Some(descriptor) => {
                        discovered += 1;
                        descriptor
                    }
                    None => continue,
                },
            };
            next.insert(descriptor, vendor.symbol);
        }

        for exchange in Exchange::ALL {
            match observed.rule(exchange) {
                Observed::Consistent(case) => next.set_case_rule(exchange, case),
                Observed::Conflicting => {
                    warn!("[REGISTRY] {} lists products in mixed case, dropping its case rule", exchange);
                    next.clear_case_rule(exchange);
                }
                Observed::Unseen => {
                    if let Some(case) = previous.case_rule(exchange) {
                        next.set_case_rule(exchange, case);
                    }
                }
            }
        }

        info!(
            "[REGISTRY] {} listed {} index instruments ({} new products)",
            self.source.name(),
            codes.len(),
            discovered
        );
        Ok(next)
    }

    fn name(&self) -> &str {
        self.source.name()
    }
}

fn descriptor_from_info(
    symbol: &str,
    exchange: Exchange,
    code: &str,
    info: &StaticInfo,
) -> Option<ContractDescriptor> {
    let (Some(multiplier), Some(rate)) = (info.volume_multiple, info.margin_rate) else {
        warn!("[REGISTRY] {} has no multiplier or margin rate, skipping", code);
        return None;
    };

    let product = symbol.to_ascii_uppercase();
    let mut descriptor = ContractDescriptor::new(product.as_str(), exchange, Category::Other, multiplier, rate)
        .with_canonical_code(code);
    if let Some(name) = &info.name {
        descriptor = descriptor.with_name(name.as_str());
    }
    if let Some(tick) = info.price_tick {
        descriptor = descriptor.with_tick_size(tick);
    }

    if !descriptor.is_valid() {
        warn!("[REGISTRY] {} reports out-of-range attributes, skipping", code);
        return None;
    }
    debug!("[REGISTRY] Discovered {} on {}", product, exchange);
    Some(descriptor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Observed {
    Unseen,
    Consistent(SymbolCase),
    Conflicting,
}

#[derive(Default)]
struct CaseObservations {
    seen: HashMap<Exchange, Observed>,
}

impl CaseObservations {
    fn record(&mut self, exchange: Exchange, symbol: &str) {
        let Some(case) = SymbolCase::detect(symbol) else {
            self.seen.insert(exchange, Observed::Conflicting);
            return;
        };
        let entry = self.seen.entry(exchange).or_insert(Observed::Consistent(case));
        if *entry != Observed::Consistent(case) {
            *entry = Observed::Conflicting;
        }
    }

    fn rule(&self, exchange: Exchange) -> Observed {
        self.seen.get(&exchange).copied().unwrap_or(Observed::Unseen)
    }
}
