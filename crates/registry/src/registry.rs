use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use contango_core::{Category, ContractDescriptor, Exchange, Product, SymbolCase};
use contango_ports::{ContractLookup, MarketDataSource};
use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;

use crate::config::{Backing, RegistryConfig};
use crate::error::{RegistryError, Result};
use crate::loader::{LiveSourceLoader, ReferenceLoader, StaticTableLoader};
use crate::snapshot::Snapshot;

/// What a call to [`ContractRegistry::refresh`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    /// A new snapshot was loaded (by this call or by the refresh it joined)
    Refreshed,
    /// Snapshot within its TTL; nothing loaded
    Fresh,
    /// Another refresh is running; the current snapshot is still served
    InFlight,
    /// An unforced refresh failed; the previous snapshot remains authoritative
    Stale,
}

/// Contract reference data with a guarded, single-flight refresh
///
/// Lookups read an `Arc<Snapshot>` and never wait on a refresh. A refresh is
/// the only suspend point: it runs the configured loader under a timeout and
/// swaps the snapshot in only on success.
pub struct ContractRegistry {
    config: RegistryConfig,
    loader: Box<dyn ReferenceLoader>,
    snapshot: RwLock<Arc<Snapshot>>,
    refresh_lock: tokio::sync::Mutex<()>,
    /// Completed refresh attempts, successful or not
    generation: AtomicU64,
    last_outcome: Mutex<Option<Result<()>>>,
    last_refreshed: RwLock<Option<Instant>>,
    /// Wall-clock time of the last successful refresh, for reporting
    refreshed_at: RwLock<Option<DateTime<Utc>>>,
}

impl ContractRegistry {
    /// Registry seeded with the built-in table, refreshed by `loader`
    pub fn new(config: RegistryConfig, loader: Box<dyn ReferenceLoader>) -> Self {
        let seed = StaticTableLoader::new(config.vendor_tag.clone(), config.case_rules.clone()).snapshot();
        info!(
            "[REGISTRY] Seeded {} products, refresh via {}",
            seed.len(),
            loader.name()
        );
        Self {
            config,
            loader,
            snapshot: RwLock::new(Arc::new(seed)),
            refresh_lock: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
            last_outcome: Mutex::new(None),
            last_refreshed: RwLock::new(None),
            refreshed_at: RwLock::new(None),
        }
    }

    pub fn with_static_table(config: RegistryConfig) -> Self {
        let loader = StaticTableLoader::new(config.vendor_tag.clone(), config.case_rules.clone());
        Self::new(config, Box::new(loader))
    }

    pub fn with_live_source(config: RegistryConfig, source: Arc<dyn MarketDataSource>) -> Self {
        Self::new(config, Box::new(LiveSourceLoader::new(source)))
    }

    /// Pick the backing strategy named by the configuration
    pub fn from_config(
        config: RegistryConfig,
        source: Option<Arc<dyn MarketDataSource>>,
    ) -> Result<Self> {
        match (config.backing, source) {
            (Backing::StaticTable, source) => {
                if source.is_some() {
                    warn!("[REGISTRY] Static-table backing configured, ignoring market data source");
                }
                Ok(Self::with_static_table(config))
            }
            (Backing::LiveSource, Some(source)) => Ok(Self::with_live_source(config, source)),
            (Backing::LiveSource, None) => Err(RegistryError::MissingSource),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Current snapshot; cheap to clone and safe to hold across refreshes
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().clone()
    }

    pub fn lookup(&self, product: &str) -> Result<ContractDescriptor> {
        self.snapshot()
            .descriptor(product)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(product.trim().to_string()))
    }

    /// Product whose canonical code is `code`
    pub fn reverse_lookup(&self, code: &str) -> Result<Product> {
        self.snapshot()
            .product_for_code(code)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(code.trim().to_string()))
    }

    pub fn products(&self) -> Vec<Product> {
        self.snapshot().products()
    }

    pub fn by_exchange(&self, exchange: Exchange) -> Vec<ContractDescriptor> {
        self.snapshot().by_exchange(exchange)
    }

    pub fn by_category(&self, category: Category) -> Vec<ContractDescriptor> {
        self.snapshot().by_category(category)
    }

    pub fn search(&self, keyword: &str) -> Vec<ContractDescriptor> {
        self.snapshot().search(keyword)
    }

    /// Known symbol case for an exchange; `None` means try both
    pub fn case_rule(&self, exchange: Exchange) -> Option<SymbolCase> {
        self.snapshot().case_rule(exchange)
    }

    pub fn last_refreshed(&self) -> Option<Instant> {
        *self.last_refreshed.read()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        *self.refreshed_at.read()
    }

    /// True when no refresh has succeeded within the TTL
    pub fn is_stale(&self) -> bool {
        match self.last_refreshed() {
            Some(at) => at.elapsed() >= self.config.ttl(),
            None => true,
        }
    }

    /// Refresh the snapshot from the configured backing.
    ///
    /// Unforced calls are rate-limited by the TTL, return `InFlight` when
    /// another refresh is running, and report failures as `Stale`. Forced
    /// calls always end with a completed refresh: they join a running one
    /// and share its outcome, and surface `DataUnavailable` on failure.
    pub async fn refresh(&self, force: bool) -> Result<RefreshStatus> {
        if !force && !self.is_stale() {
            return Ok(RefreshStatus::Fresh);
        }

        let observed = self.generation.load(Ordering::Acquire);
        let _guard = match self.refresh_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) if !force => {
                debug!("[REGISTRY] Refresh already in flight, serving current snapshot");
                return Ok(RefreshStatus::InFlight);
            }
            Err(_) => {
                let guard = self.refresh_lock.lock().await;
                if self.generation.load(Ordering::Acquire) != observed {
                    debug!("[REGISTRY] Joined in-flight refresh");
                    let outcome = self.last_outcome.lock().clone().unwrap_or(Ok(()));
                    return outcome.map(|_| RefreshStatus::Refreshed);
                }
                guard
            }
        };

        // A refresh may have completed between the staleness check and the lock
        if !force && !self.is_stale() {
            return Ok(RefreshStatus::Fresh);
        }

        let outcome = self.load_and_swap().await;
        *self.last_outcome.lock() = Some(outcome.clone());
        self.generation.fetch_add(1, Ordering::AcqRel);

        match outcome {
            Ok(()) => Ok(RefreshStatus::Refreshed),
            Err(e) if force => Err(e),
            Err(_) => Ok(RefreshStatus::Stale),
        }
    }

    async fn load_and_swap(&self) -> Result<()> {
        let previous = self.snapshot();
        let timeout = self.config.timeout();

        let mut next = match tokio::time::timeout(timeout, self.loader.load(&previous)).await {
            Ok(Ok(next)) => next,
            Ok(Err(e)) => {
                error!("[REGISTRY] Refresh via {} failed: {}", self.loader.name(), e);
                return Err(e);
            }
            Err(_) => {
                error!(
                    "[REGISTRY] Refresh via {} timed out after {:?}",
                    self.loader.name(),
                    timeout
                );
                return Err(RegistryError::DataUnavailable(format!(
                    "refresh timed out after {}s",
                    self.config.timeout_secs
                )));
            }
        };

        let carried = next.retain_missing_from(&previous);
        if carried > 0 {
            warn!(
                "[REGISTRY] {} products missing from {}, keeping previous entries",
                carried,
                self.loader.name()
            );
        }

        let count = next.len();
        *self.snapshot.write() = Arc::new(next);
        *self.last_refreshed.write() = Some(Instant::now());
        *self.refreshed_at.write() = Some(Utc::now());
        info!("[REGISTRY] Refreshed {} products via {}", count, self.loader.name());
        Ok(())
    }
}

impl ContractLookup for ContractRegistry {
    fn descriptor(&self, product: &str) -> Option<ContractDescriptor> {
        self.snapshot().descriptor(product).cloned()
    }
}
