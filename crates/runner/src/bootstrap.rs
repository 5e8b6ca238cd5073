//! Bootstrap - explicit construction of the service graph
//!
//! Builds, in dependency order:
//! - The contract registry with the configured backing strategy
//! - The resolver over that registry
//! - The margin calculator reading contracts from the registry
//! - The risk manager over the calculator
//!
//! The caller owns the resulting [`Services`] and passes it by reference;
//! nothing here is process-global.

use std::path::Path;
use std::sync::Arc;

use contango_margin::{MarginCalculator, MarginConfig};
use contango_ports::{ContractLookup, MarketDataSource};
use contango_registry::{Backing, ContractRegistry, RefreshStatus, RegistryError};
use contango_resolver::ContractResolver;
use contango_risk_manager::FuturesRiskManager;
use log::{info, warn};
use thiserror::Error;

use crate::config::{ConfigError, ContangoConfig};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// The wired components
pub struct Services {
    pub config: ContangoConfig,
    pub registry: Arc<ContractRegistry>,
    pub resolver: ContractResolver,
    pub calculator: MarginCalculator,
    pub risk: FuturesRiskManager,
}

impl Services {
    /// Validate `config` and wire every component
    ///
    /// `source` is required when the registry is configured for a live
    /// source and ignored otherwise. No data is loaded here; see
    /// [`Services::start`].
    pub fn build(
        config: ContangoConfig,
        source: Option<Arc<dyn MarketDataSource>>,
    ) -> Result<Self, BootstrapError> {
        config.validate()?;

        let registry = Arc::new(ContractRegistry::from_config(config.registry.clone(), source)?);
        let resolver = ContractResolver::new(registry.clone());

        let margin_config = MarginConfig {
            broker_margin_multiplier: config.risk.broker_margin_multiplier,
            ..config.margin.clone()
        };
        let contracts: Arc<dyn ContractLookup> = registry.clone();
        let calculator = MarginCalculator::new(margin_config, contracts);
        let risk = FuturesRiskManager::new(
            calculator.clone(),
            config.risk.clone(),
            config.classification.clone(),
        );

        info!(
            "[BOOTSTRAP] Services ready: {:?} backing, {} products, broker multiplier {}",
            config.registry.backing,
            registry.products().len(),
            calculator.broker_multiplier()
        );

        Ok(Self {
            config,
            registry,
            resolver,
            calculator,
            risk,
        })
    }

    /// Build, then run the first refresh for a live-backed registry
    ///
    /// A failed first refresh is not fatal: the registry keeps serving the
    /// built-in table and the next caller past the TTL retries.
    pub async fn start(
        config: ContangoConfig,
        source: Option<Arc<dyn MarketDataSource>>,
    ) -> Result<Self, BootstrapError> {
        let services = Self::build(config, source)?;

        if services.config.registry.backing == Backing::LiveSource {
            match services.registry.refresh(false).await {
                Ok(RefreshStatus::Stale) => {
                    warn!("[BOOTSTRAP] Initial refresh failed, serving built-in contract table");
                }
                Ok(status) => {
                    info!(
                        "[BOOTSTRAP] Initial refresh {:?}: {} products",
                        status,
                        services.registry.products().len()
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(services)
    }

    /// Load `path`, then [`Services::start`]
    pub async fn from_file(
        path: impl AsRef<Path>,
        source: Option<Arc<dyn MarketDataSource>>,
    ) -> Result<Self, BootstrapError> {
        let config = ContangoConfig::from_file(path)?;
        Self::start(config, source).await
    }
}
