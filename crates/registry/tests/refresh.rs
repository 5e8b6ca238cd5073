//! Registry refresh behaviour against a scripted market data source
//!
//! Covers:
//! 1. Live listings adopted over the built-in table
//! 2. Per-exchange case rules inferred from listed symbols
//! 3. Stale-but-available snapshot on failure and timeout
//! 4. Single-flight refresh under concurrent callers
//! 5. TTL rate limiting

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use contango_core::{Category, Exchange, SymbolCase};
use contango_ports::{InstrumentQuery, MarketDataSource, SourceError, StaticInfo};
use contango_registry::{ContractRegistry, RefreshStatus, RegistryConfig, RegistryError};
use parking_lot::Mutex;
use rust_decimal_macros::dec;

/// In-memory source whose listing can be swapped between refreshes
struct ScriptedSource {
    listing: Mutex<Result<Vec<String>, SourceError>>,
    infos: HashMap<String, StaticInfo>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(codes: &[&str]) -> Self {
        Self {
            listing: Mutex::new(Ok(codes.iter().map(|c| c.to_string()).collect())),
            infos: HashMap::new(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn with_info(mut self, code: &str, info: StaticInfo) -> Self {
        self.infos.insert(code.to_string(), info);
        self
    }

    fn fail_with(&self, error: SourceError) {
        *self.listing.lock() = Err(error);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    async fn list_instruments(&self, _query: &InstrumentQuery) -> Result<Vec<String>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.listing.lock().clone()
    }

    async fn lookup_static_info(&self, code: &str) -> Result<Option<StaticInfo>, SourceError> {
        Ok(self.infos.get(code).cloned())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn live_registry(source: Arc<ScriptedSource>) -> ContractRegistry {
    let _ = env_logger::try_init();
    ContractRegistry::with_live_source(RegistryConfig::live(), source)
}

fn polysilicon() -> StaticInfo {
    StaticInfo {
        name: Some("Polysilicon".to_string()),
        volume_multiple: Some(3),
        margin_rate: Some(dec!(0.09)),
        price_tick: Some(dec!(5)),
        ..StaticInfo::default()
    }
}

#[tokio::test]
async fn test_live_listing_adopted_over_table() {
    let source = Arc::new(
        ScriptedSource::new(&["KQ.i@SHFE.cu", "KQ.i@CZCE.CF", "KQ.i@GFEX.ps", "KQ.i@GFEX.xx"])
            .with_info("KQ.i@GFEX.ps", polysilicon()),
    );
    let registry = live_registry(source.clone());

    assert_eq!(registry.refresh(true).await.unwrap(), RefreshStatus::Refreshed);

    // Known product keeps table attributes
    let cu = registry.lookup("CU").unwrap();
    assert_eq!(cu.multiplier, 5);
    assert_eq!(cu.category, Category::BaseMetals);

    // New product admitted from static info
    let ps = registry.lookup("PS").unwrap();
    assert_eq!(ps.exchange, Exchange::Gfex);
    assert_eq!(ps.category, Category::Other);
    assert_eq!(ps.multiplier, 3);
    assert_eq!(registry.reverse_lookup("KQ.i@GFEX.ps").unwrap(), "PS");

    // No static info: skipped, not invented
    assert!(matches!(registry.lookup("XX"), Err(RegistryError::NotFound(_))));

    // Products the source did not list stay resolvable
    assert_eq!(registry.lookup("AL").unwrap().exchange, Exchange::Shfe);
    assert!(registry.last_refreshed().is_some());
    assert!(registry.refreshed_at().is_some());
}

#[tokio::test]
async fn test_case_rules_inferred_from_listing() {
    let source = Arc::new(ScriptedSource::new(&[
        "KQ.i@SHFE.cu",
        "KQ.i@GFEX.si",
        "KQ.i@CZCE.CF",
        "KQ.i@CZCE.ta",
    ]));
    let registry = live_registry(source);
    registry.refresh(true).await.unwrap();

    assert_eq!(registry.case_rule(Exchange::Shfe), Some(SymbolCase::Lower));
    // Overrides the configured upper-case default
    assert_eq!(registry.case_rule(Exchange::Gfex), Some(SymbolCase::Lower));
    assert_eq!(registry.lookup("SI").unwrap().canonical_code, "KQ.i@GFEX.si");
    // Mixed casing drops the rule
    assert_eq!(registry.case_rule(Exchange::Czce), None);
    // Unlisted exchanges keep their previous rule
    assert_eq!(registry.case_rule(Exchange::Cffex), Some(SymbolCase::Upper));

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.listing(Exchange::Czce, "ta").unwrap().product, "TA");
    assert_eq!(snapshot.listing(Exchange::Czce, "CF").unwrap().product, "CF");
}

#[tokio::test]
async fn test_carried_products_follow_new_case_rule() {
    let source = Arc::new(ScriptedSource::new(&["KQ.i@GFEX.si"]));
    let registry = live_registry(source);
    assert_eq!(registry.lookup("LC").unwrap().canonical_code, "KQ.i@GFEX.LC");

    registry.refresh(true).await.unwrap();
    assert_eq!(registry.case_rule(Exchange::Gfex), Some(SymbolCase::Lower));

    // Unlisted LC is re-listed under the learned rule
    let lc = registry.lookup("LC").unwrap();
    assert_eq!(lc.canonical_code, "KQ.i@GFEX.lc");
    assert_eq!(registry.reverse_lookup("KQ.i@GFEX.lc").unwrap(), "LC");
    assert_eq!(registry.snapshot().listing(Exchange::Gfex, "lc").unwrap().product, "LC");
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let source = Arc::new(ScriptedSource::new(&["KQ.i@GFEX.ps"]).with_info("KQ.i@GFEX.ps", polysilicon()));
    let registry = live_registry(source.clone());
    registry.refresh(true).await.unwrap();

    source.fail_with(SourceError::Connection("reset by peer".to_string()));

    let result = registry.refresh(true).await;
    assert!(matches!(result, Err(RegistryError::DataUnavailable(_))));

    // Previous snapshot still serves lookups, including live-discovered products
    assert_eq!(registry.lookup("PS").unwrap().multiplier, 3);
    assert_eq!(registry.lookup("CU").unwrap().multiplier, 5);
}

#[tokio::test]
async fn test_unforced_failure_reports_stale() {
    let source = Arc::new(ScriptedSource::new(&[]));
    source.fail_with(SourceError::Request("quota exceeded".to_string()));
    let registry = live_registry(source);

    assert_eq!(registry.refresh(false).await.unwrap(), RefreshStatus::Stale);
    assert!(registry.is_stale());
    assert!(registry.lookup("CU").is_ok());
}

#[tokio::test]
async fn test_empty_listing_is_unavailable() {
    let source = Arc::new(ScriptedSource::new(&[]));
    let registry = live_registry(source);

    let result = registry.refresh(true).await;
    assert!(matches!(result, Err(RegistryError::DataUnavailable(_))));
    assert!(registry.last_refreshed().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_times_out() {
    let source = Arc::new(ScriptedSource::new(&["KQ.i@SHFE.cu"]).with_delay(Duration::from_secs(60)));
    let registry = live_registry(source);

    match registry.refresh(true).await {
        Err(RegistryError::DataUnavailable(msg)) => assert!(msg.contains("timed out")),
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(registry.lookup("CU").is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_forced_refreshes_share_one_call() {
    let source = Arc::new(ScriptedSource::new(&["KQ.i@SHFE.cu"]).with_delay(Duration::from_secs(1)));
    let registry = live_registry(source.clone());

    let (first, second) = tokio::join!(registry.refresh(true), registry.refresh(true));

    assert_eq!(first.unwrap(), RefreshStatus::Refreshed);
    assert_eq!(second.unwrap(), RefreshStatus::Refreshed);
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_joined_refresh_shares_failure() {
    let source = Arc::new(ScriptedSource::new(&[]).with_delay(Duration::from_secs(1)));
    source.fail_with(SourceError::Timeout);
    let registry = live_registry(source.clone());

    let (first, second) = tokio::join!(registry.refresh(true), registry.refresh(true));

    assert!(matches!(first, Err(RegistryError::DataUnavailable(_))));
    assert_eq!(first, second);
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unforced_caller_does_not_wait() {
    let source = Arc::new(ScriptedSource::new(&["KQ.i@SHFE.cu"]).with_delay(Duration::from_secs(1)));
    let registry = live_registry(source.clone());

    let (forced, unforced) = tokio::join!(registry.refresh(true), async {
        tokio::task::yield_now().await;
        registry.refresh(false).await
    });

    assert_eq!(forced.unwrap(), RefreshStatus::Refreshed);
    assert_eq!(unforced.unwrap(), RefreshStatus::InFlight);
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ttl_rate_limits_unforced_refresh() {
    let source = Arc::new(ScriptedSource::new(&["KQ.i@SHFE.cu"]));
    let registry = live_registry(source.clone());

    assert_eq!(registry.refresh(false).await.unwrap(), RefreshStatus::Refreshed);
    assert_eq!(registry.refresh(false).await.unwrap(), RefreshStatus::Fresh);
    assert_eq!(source.calls(), 1);

    tokio::time::advance(registry.config().ttl()).await;
    assert!(registry.is_stale());
    assert_eq!(registry.refresh(false).await.unwrap(), RefreshStatus::Refreshed);
    assert_eq!(source.calls(), 2);
}
