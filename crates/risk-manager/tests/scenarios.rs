//! Risk scenarios against the built-in contract table

use std::sync::Arc;

use contango_core::Position;
use contango_margin::{MarginCalculator, PriceMap};
use contango_ports::ContractLookup;
use contango_registry::{ContractRegistry, RegistryConfig};
use contango_risk_manager::{
    FuturesRiskManager, RISK_TOO_HIGH, RiskError, RiskTier, RiskTolerance, Sector, Severity,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn manager() -> FuturesRiskManager {
    let _ = env_logger::try_init();
    let registry: Arc<dyn ContractLookup> =
        Arc::new(ContractRegistry::with_static_table(RegistryConfig::default()));
    FuturesRiskManager::with_default_tables(MarginCalculator::with_defaults(registry))
}

#[test]
fn test_copper_reference_scenario() {
    let manager = manager();
    let assessment = manager
        .check_position_risk(&Position::long("cu", dec!(70000), 1), dec!(1000000), &[])
        .unwrap();

    assert_eq!(assessment.product, "CU");
    assert_eq!(assessment.position_value, dec!(350000));
    assert_eq!(assessment.margin_required, dec!(33600));
    assert_eq!(assessment.leverage.round_dp(2), dec!(10.42));
}

#[test]
fn test_medium_tolerance_cannot_afford_copper() {
    let suggestion = manager()
        .suggest_position_size("CU", dec!(70000), dec!(100000), RiskTolerance::Medium)
        .unwrap();

    assert_eq!(suggestion.lots, 0);
    assert_eq!(suggestion.rationale, RISK_TOO_HIGH);
    assert_eq!(suggestion.tolerance, RiskTolerance::Medium);
}

#[test]
fn test_diversified_book_is_low_risk() {
    let manager = manager();
    let positions = vec![
        Position::long("CU", dec!(70000), 2),
        Position::short("AU", dec!(480), 1),
        Position::long("M", dec!(3000), 10),
    ];
    let mut prices = PriceMap::new();
    prices.insert("CU".to_string(), dec!(71000));
    prices.insert("AU".to_string(), dec!(470));
    prices.insert("M".to_string(), dec!(2900));

    let assessment = manager
        .check_portfolio_risk(dec!(500000), &positions, &prices)
        .unwrap();

    // CU +10000, AU short +10000, M -10000
    assert_eq!(assessment.unrealized_pnl, dec!(10000));
    assert_eq!(assessment.dynamic_equity, dec!(510000));
    // 67200 + 34560 + 18000
    assert_eq!(assessment.total_margin_required, dec!(119760));
    assert_eq!(assessment.total_portfolio_value, dec!(1480000));
    assert_eq!(assessment.overall_severity, Severity::Low);
    assert!(assessment.errors.is_empty());
    assert!(assessment.warnings.is_empty());

    assert_eq!(assessment.sector_distribution.len(), 3);
    assert_eq!(
        assessment.sector_distribution[&Sector::BaseMetals].share,
        dec!(700000) / dec!(1480000)
    );
    assert_eq!(assessment.tier_distribution[&RiskTier::Medium].count, 3);
    let shares: Decimal = assessment.sector_distribution.values().map(|d| d.share).sum();
    assert!((shares - Decimal::ONE).abs() < dec!(0.0000000001));
}

#[test]
fn test_assessment_serializes_for_consumers() {
    let manager = manager();
    let assessment = manager
        .check_position_risk(&Position::long("SC", dec!(550), 200), dec!(100000), &[])
        .unwrap();

    assert_eq!(assessment.tier, RiskTier::High);
    assert_eq!(assessment.overall_severity, Severity::High);

    let json = serde_json::to_value(&assessment).unwrap();
    assert_eq!(json["overall_severity"], "high");
    assert_eq!(json["sector"], "energy_chemical");
    assert_eq!(json["findings"][0]["check"], "margin_sufficiency");
}

#[test]
fn test_unknown_product_surfaces_from_every_entry_point() {
    let manager = manager();
    let unknown = Position::long("ZZ", dec!(100), 1);

    assert_eq!(
        manager.check_position_risk(&unknown, dec!(1000), &[]),
        Err(RiskError::UnknownProduct("ZZ".to_string()))
    );
    assert_eq!(
        manager
            .check_portfolio_risk(dec!(1000), &[unknown], &PriceMap::new())
            .map(|a| a.overall_severity),
        Err(RiskError::UnknownProduct("ZZ".to_string()))
    );
    assert!(matches!(
        manager.suggest_position_size("zz", dec!(100), dec!(1000), RiskTolerance::High),
        Err(RiskError::UnknownProduct(_))
    ));
}
