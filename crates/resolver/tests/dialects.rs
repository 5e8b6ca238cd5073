//! Resolver dialect matrix and round-trip properties
//!
//! Runs against the built-in table and against a registry refreshed from a
//! scripted source whose listing leaves one exchange without a case rule.

use std::sync::Arc;

use async_trait::async_trait;
use contango_core::{ContractClass, Exchange};
use contango_ports::{InstrumentQuery, MarketDataSource, SourceError, StaticInfo};
use contango_registry::{ContractRegistry, RegistryConfig, static_table};
use contango_resolver::{ContractResolver, Dialect, ResolveError, ResolvedContract};
use proptest::prelude::*;

fn static_resolver() -> ContractResolver {
    let _ = env_logger::try_init();
    ContractResolver::new(Arc::new(ContractRegistry::with_static_table(RegistryConfig::default())))
}

#[test]
fn test_dialect_matrix() {
    let resolver = static_resolver();
    let cases = [
        ("KQ.i@SHFE.cu", "CU", ContractClass::Index),
        ("KQ.m@SHFE.cu", "CU", ContractClass::Main),
        ("KQ.i@CZCE.CF", "CF", ContractClass::Index),
        ("KQ.i@DCE.a", "A", ContractClass::Index),
        ("KQ.m@GFEX.SI", "SI", ContractClass::Main),
        ("KQ.i@CFFEX.IF", "IF", ContractClass::Index),
        ("CU99", "CU", ContractClass::Index),
        ("CU888", "CU", ContractClass::Main),
        ("IF99", "IF", ContractClass::Index),
        ("SHFE.CU99", "CU", ContractClass::Index),
        ("SHFE.cu99", "CU", ContractClass::Index),
        ("CZCE.CF99", "CF", ContractClass::Index),
        ("DCE.A99", "A", ContractClass::Index),
    ];

    for (code, product, class) in cases {
        assert_eq!(
            resolver.parse(code).unwrap(),
            ResolvedContract::new(product, class),
            "resolving {}",
            code
        );
    }

    for (code, digits) in [("CU2403", "2403"), ("IF2403", "2403"), ("SHFE.CU2403", "2403"), ("CZCE.TA601", "601")] {
        assert_eq!(
            resolver.parse(code).unwrap().class,
            ContractClass::specific(digits).unwrap(),
            "resolving {}",
            code
        );
    }
}

#[test]
fn test_bare_product_is_incomplete() {
    let resolver = static_resolver();
    assert!(matches!(resolver.parse("CU"), Err(ResolveError::UnrecognizedFormat(_))));
    assert!(matches!(resolver.parse("SHFE.CU"), Err(ResolveError::UnrecognizedFormat(_))));
    assert!(matches!(resolver.parse("KQ.i@SHFE"), Err(ResolveError::UnrecognizedFormat(_))));
}

/// Source listing CZCE in mixed case so the resolver has no rule for it
struct MixedCaseSource;

#[async_trait]
impl MarketDataSource for MixedCaseSource {
    async fn list_instruments(&self, _query: &InstrumentQuery) -> Result<Vec<String>, SourceError> {
        Ok(vec![
            "KQ.i@SHFE.cu".to_string(),
            "KQ.i@CZCE.CF".to_string(),
            "KQ.i@CZCE.ta".to_string(),
        ])
    }

    async fn lookup_static_info(&self, _code: &str) -> Result<Option<StaticInfo>, SourceError> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_unknown_case_rule_tries_both_cases() {
    let _ = env_logger::try_init();
    let registry = Arc::new(ContractRegistry::with_live_source(
        RegistryConfig::live(),
        Arc::new(MixedCaseSource),
    ));
    registry.refresh(true).await.unwrap();
    assert_eq!(registry.case_rule(Exchange::Czce), None);

    let resolver = ContractResolver::new(registry);
    assert_eq!(resolver.parse("KQ.i@CZCE.cf").unwrap().product, "CF");
    assert_eq!(resolver.parse("KQ.m@CZCE.ta").unwrap().product, "TA");
    assert_eq!(resolver.parse("KQ.m@CZCE.TA").unwrap().product, "TA");

    // Canonical codes follow what the source listed
    assert_eq!(resolver.canonicalize("TA", &ContractClass::Index).unwrap(), "KQ.i@CZCE.ta");
    assert_eq!(resolver.canonicalize("CF", &ContractClass::Main).unwrap(), "KQ.m@CZCE.CF");
}

fn table_products() -> Vec<String> {
    static_table().into_iter().map(|d| d.product).collect()
}

fn any_class() -> impl Strategy<Value = ContractClass> {
    prop_oneof![
        Just(ContractClass::Index),
        Just(ContractClass::Main),
        (10u32..100, 1u32..=12).prop_map(|(year, month)| {
            ContractClass::specific(&format!("{:02}{:02}", year, month)).unwrap()
        }),
        (0u32..10, 1u32..=12).prop_map(|(year, month)| {
            ContractClass::specific(&format!("{}{:02}", year, month)).unwrap()
        }),
    ]
}

proptest! {
    #[test]
    fn prop_canonical_round_trip(product in prop::sample::select(table_products()), class in any_class()) {
        let resolver = static_resolver();
        let code = resolver.canonicalize(&product, &class).unwrap();
        prop_assert_eq!(resolver.parse(&code).unwrap(), ResolvedContract::new(product, class));
    }

    #[test]
    fn prop_every_dialect_round_trips(product in prop::sample::select(table_products()), class in any_class()) {
        let resolver = static_resolver();
        for dialect in [Dialect::Vendor, Dialect::Legacy, Dialect::ExchangePrefixed] {
            let Ok(code) = resolver.format_code(&product, &class, dialect) else {
                // Dated months have no vendor form
                prop_assert!(dialect == Dialect::Vendor && !class.is_continuous());
                continue;
            };
            prop_assert_eq!(
                resolver.parse(&code).unwrap(),
                ResolvedContract::new(product.clone(), class.clone())
            );
        }
    }

    #[test]
    fn prop_normalize_is_idempotent(product in prop::sample::select(table_products()), class in any_class()) {
        let resolver = static_resolver();
        let legacy = resolver.format_code(&product, &class, Dialect::Legacy).unwrap();
        let once = resolver.normalize(&legacy).unwrap();
        prop_assert_eq!(resolver.normalize(&once).unwrap(), once);
    }
}

/// Source listing a single GFEX product in lower case
struct LowerGfexSource;

#[async_trait]
impl MarketDataSource for LowerGfexSource {
    async fn list_instruments(&self, _query: &InstrumentQuery) -> Result<Vec<String>, SourceError> {
        Ok(vec!["KQ.i@GFEX.si".to_string()])
    }

    async fn lookup_static_info(&self, _code: &str) -> Result<Option<StaticInfo>, SourceError> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_unlisted_product_resolves_after_case_rule_change() {
    let _ = env_logger::try_init();
    let registry = Arc::new(ContractRegistry::with_live_source(
        RegistryConfig::live(),
        Arc::new(LowerGfexSource),
    ));
    let resolver = ContractResolver::new(registry.clone());
    assert_eq!(resolver.parse("KQ.i@GFEX.LC").unwrap(), ResolvedContract::new("LC", ContractClass::Index));

    registry.refresh(true).await.unwrap();

    assert_eq!(resolver.parse("KQ.i@GFEX.LC").unwrap(), ResolvedContract::new("LC", ContractClass::Index));
    assert_eq!(resolver.parse("KQ.i@GFEX.lc").unwrap().product, "LC");
    let code = resolver.canonicalize("LC", &ContractClass::Index).unwrap();
    assert_eq!(code, "KQ.i@GFEX.lc");
    assert_eq!(resolver.parse(&code).unwrap(), ResolvedContract::new("LC", ContractClass::Index));
}
