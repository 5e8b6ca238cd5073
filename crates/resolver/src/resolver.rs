use std::sync::Arc;

use contango_core::{
    ContractClass, ContractDescriptor, DeliveryMonth, Exchange, ExchangeCode, LegacyCode, Product,
    VendorCode, VendorMarker, instruments::flip_case,
};
use contango_registry::{ContractRegistry, Snapshot};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result, ValidationErrorKind};

/// Code dialects the resolver reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `KQ.i@SHFE.cu`, `KQ.m@SHFE.cu`; continuous classes only
    Vendor,
    /// `CU99`, `CU888`, `CU2403`
    Legacy,
    /// `SHFE.cu99`, `SHFE.cu2403`
    ExchangePrefixed,
}

/// Product and class a code refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedContract {
    pub product: Product,
    pub class: ContractClass,
}

impl ResolvedContract {
    pub fn new(product: impl Into<Product>, class: ContractClass) -> Self {
        Self {
            product: product.into(),
            class,
        }
    }
}

/// Outcome of [`ContractResolver::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub error_kind: Option<ValidationErrorKind>,
    pub message: Option<String>,
    pub descriptor: Option<ContractDescriptor>,
    pub class: Option<ContractClass>,
}

/// Parses loosely formatted contract codes and renders canonical ones
///
/// Every call works against one registry snapshot, so a concurrent refresh
/// cannot change the answer halfway through a resolution.
pub struct ContractResolver {
    registry: Arc<ContractRegistry>,
}

impl ContractResolver {
    pub fn new(registry: Arc<ContractRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ContractRegistry> {
        &self.registry
    }

    /// Resolve a code in any supported dialect.
    ///
    /// Dialects are tried in order: vendor (`@`), legacy (no separator),
    /// exchange-prefixed (`.`). A bare product code is incomplete and is
    /// rejected as `UnrecognizedFormat`.
    pub fn parse(&self, code: &str) -> Result<ResolvedContract> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ResolveError::UnrecognizedFormat(String::new()));
        }
        let snapshot = self.registry.snapshot();

        let resolved = if code.contains('@') {
            parse_vendor(&snapshot, code)
        } else if !code.contains('.') {
            parse_legacy(&snapshot, code)
        } else {
            parse_exchange_prefixed(&snapshot, code)
        }?;

        debug!("[RESOLVER] {} -> {} ({})", code, resolved.product, resolved.class);
        Ok(resolved)
    }

    /// Resolve and return the registry descriptor alongside the class
    pub fn resolve(&self, code: &str) -> Result<(ContractDescriptor, ContractClass)> {
        let resolved = self.parse(code)?;
        let descriptor = self
            .registry
            .lookup(&resolved.product)
            .map_err(|_| ResolveError::UnsupportedProduct(resolved.product.clone()))?;
        Ok((descriptor, resolved.class))
    }

    /// Canonical code: vendor form for continuous classes, exchange-prefixed
    /// form for dated months
    pub fn canonicalize(&self, product: &str, class: &ContractClass) -> Result<String> {
        let dialect = match class {
            ContractClass::Index | ContractClass::Main => Dialect::Vendor,
            ContractClass::Specific(_) => Dialect::ExchangePrefixed,
        };
        self.format_code(product, class, dialect)
    }

    /// Render a code in a specific dialect with the product's exchange and case
    pub fn format_code(&self, product: &str, class: &ContractClass, dialect: Dialect) -> Result<String> {
        let snapshot = self.registry.snapshot();
        let descriptor = snapshot
            .descriptor(product)
            .ok_or_else(|| ResolveError::UnsupportedProduct(product.trim().to_ascii_uppercase()))?;
        let symbol = listed_symbol(&snapshot, descriptor);

        match dialect {
            Dialect::Vendor => {
                let marker = VendorMarker::for_class(class).ok_or_else(|| {
                    ResolveError::UnrecognizedFormat(format!(
                        "{} {} has no vendor form",
                        descriptor.product, class
                    ))
                })?;
                Ok(VendorCode::render(
                    &self.registry.config().vendor_tag,
                    marker,
                    descriptor.exchange,
                    &symbol,
                ))
            }
            Dialect::Legacy => Ok(LegacyCode::render(&descriptor.product, class)),
            Dialect::ExchangePrefixed => Ok(ExchangeCode::render(descriptor.exchange, &symbol, class)),
        }
    }

    /// Dated code for caller-supplied month digits, kept verbatim
    ///
    /// The month need not be listed anywhere yet; only its shape is checked.
    pub fn build_specific_month_code(&self, product: &str, month_digits: &str) -> Result<String> {
        let month = DeliveryMonth::parse(month_digits.trim()).ok_or_else(|| {
            ResolveError::UnrecognizedFormat(format!("{}{}", product.trim(), month_digits.trim()))
        })?;
        self.canonicalize(product, &ContractClass::Specific(month))
    }

    /// Outbound form of any accepted input
    pub fn normalize(&self, code: &str) -> Result<String> {
        let resolved = self.parse(code)?;
        self.canonicalize(&resolved.product, &resolved.class)
    }

    /// Validate user input, classifying the failure instead of erroring
    pub fn validate(&self, code: &str) -> Validation {
        if code.trim().is_empty() {
            return Validation {
                valid: false,
                error_kind: Some(ValidationErrorKind::EmptyInput),
                message: Some("Contract code is empty".to_string()),
                descriptor: None,
                class: None,
            };
        }

        match self.resolve(code) {
            Ok((descriptor, class)) => Validation {
                valid: true,
                error_kind: None,
                message: None,
                descriptor: Some(descriptor),
                class: Some(class),
            },
            Err(e) => {
                debug!("[RESOLVER] Rejected {:?}: {}", code, e);
                Validation {
                    valid: false,
                    error_kind: Some(ValidationErrorKind::from(&e)),
                    message: Some(e.to_string()),
                    descriptor: None,
                    class: None,
                }
            }
        }
    }
}

fn parse_vendor(snapshot: &Snapshot, code: &str) -> Result<ResolvedContract> {
    let vendor = VendorCode::parse(code).ok_or_else(|| ResolveError::UnrecognizedFormat(code.to_string()))?;
    let unsupported = || ResolveError::UnsupportedProduct(vendor.symbol.to_ascii_uppercase());

    let exchange: Exchange = vendor.exchange.parse().map_err(|_| unsupported())?;
    let descriptor = match snapshot.case_rule(exchange) {
        Some(case) => snapshot.listing(exchange, &case.apply(vendor.symbol)),
        None => snapshot
            .listing(exchange, vendor.symbol)
            .or_else(|| snapshot.listing(exchange, &flip_case(vendor.symbol))),
    }
    .ok_or_else(unsupported)?;

    Ok(ResolvedContract::new(descriptor.product.clone(), vendor.marker.class()))
}

fn parse_legacy(snapshot: &Snapshot, code: &str) -> Result<ResolvedContract> {
    let legacy = LegacyCode::parse(code).ok_or_else(|| ResolveError::UnrecognizedFormat(code.to_string()))?;
    let descriptor = snapshot
        .descriptor(legacy.symbol)
        .ok_or_else(|| ResolveError::UnsupportedProduct(legacy.symbol.to_ascii_uppercase()))?;
    Ok(ResolvedContract::new(descriptor.product.clone(), legacy.class))
}

fn parse_exchange_prefixed(snapshot: &Snapshot, code: &str) -> Result<ResolvedContract> {
    let prefixed = ExchangeCode::parse(code).ok_or_else(|| ResolveError::UnrecognizedFormat(code.to_string()))?;
    let requested: Exchange = prefixed
        .exchange
        .parse()
        .map_err(|_| ResolveError::UnrecognizedFormat(code.to_string()))?;

    let product = prefixed.legacy.symbol.to_ascii_uppercase();
    let descriptor = snapshot
        .descriptor(&product)
        .ok_or_else(|| ResolveError::UnsupportedProduct(product.clone()))?;
    if descriptor.exchange != requested {
        return Err(ResolveError::ExchangeMismatch {
            product,
            listed: descriptor.exchange,
            requested,
        });
    }
    Ok(ResolvedContract::new(product, prefixed.legacy.class))
}

/// Symbol as the product's exchange lists it
fn listed_symbol(snapshot: &Snapshot, descriptor: &ContractDescriptor) -> String {
    if let Some(case) = snapshot.case_rule(descriptor.exchange) {
        return case.apply(&descriptor.product);
    }
    match VendorCode::parse(&descriptor.canonical_code) {
        Some(code) => code.symbol.to_string(),
        None => descriptor.exchange.default_symbol_case().apply(&descriptor.product),
    }
}
