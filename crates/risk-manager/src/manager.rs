//! Futures Risk Manager
//!
//! Stateless checks over caller-supplied positions:
//! - Per-position checks before opening (margin, leverage, concentration, lot cap)
//! - Whole-book checks (margin ratio, daily loss, sector concentration)
//! - Position sizing for a given risk tolerance

use std::collections::BTreeMap;

use chrono::Utc;
use contango_core::{Position, PositionSide, Price};
use contango_margin::{MarginCalculator, MarginResult, PriceMap};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use crate::assessment::{
    Distribution, Findings, PortfolioChecks, PortfolioRiskAssessment, PositionChecks,
    RiskAssessment, RiskCheckType, Severity, Suggestion,
};
use crate::error::{Result, RiskError};
use crate::parameters::{
    ClassificationTable, DAILY_LOSS_WARNING_FRACTION, LOW_MARGIN_RATIO, MARGIN_USAGE_WARNING,
    RiskLimits, RiskTier, RiskTolerance, Sector,
};

pub const RISK_TOO_HIGH: &str = "risk too high at current price";

pub struct FuturesRiskManager {
    calculator: MarginCalculator,
    limits: RiskLimits,
    classification: ClassificationTable,
}

impl FuturesRiskManager {
    /// The calculator's broker multiplier is replaced by the one in `limits`
    pub fn new(calculator: MarginCalculator, limits: RiskLimits, classification: ClassificationTable) -> Self {
        let calculator = sync_broker_multiplier(calculator, &limits);
        Self {
            calculator,
            limits,
            classification,
        }
    }

    pub fn with_default_tables(calculator: MarginCalculator) -> Self {
        Self::new(calculator, RiskLimits::default(), ClassificationTable::default())
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    pub fn set_limits(&mut self, limits: RiskLimits) {
        info!("[RISK] Risk limits updated: {:?}", limits);
        self.calculator = sync_broker_multiplier(self.calculator.clone(), &limits);
        self.limits = limits;
    }

    pub fn classification(&self) -> &ClassificationTable {
        &self.classification
    }

    pub fn calculator(&self) -> &MarginCalculator {
        &self.calculator
    }

    pub fn tier(&self, product: &str) -> RiskTier {
        self.classification.tier(product)
    }

    pub fn sector(&self, product: &str) -> Sector {
        self.classification.sector(product)
    }

    /// Check a candidate position against the balance and the existing book
    ///
    /// All five checks always run; breaches come back as findings.
    pub fn check_position_risk(
        &self,
        candidate: &Position,
        balance: Decimal,
        existing: &[Position],
    ) -> Result<RiskAssessment> {
        validate_balance(balance)?;
        let margin = self.calculator.margin_for_position(candidate)?;
        let tier = self.tier(&candidate.product);
        let sector = self.sector(&candidate.product);
        let max_leverage = self.classification.profile(tier).max_leverage;

        let mut total_value = margin.position_value;
        let mut sector_value = margin.position_value;
        for position in existing {
            let value = self.calculator.margin_for_position(position)?.position_value;
            total_value = total_value
                .checked_add(value)
                .ok_or_else(|| overflow("portfolio value"))?;
            if self.sector(&position.product) == sector {
                sector_value = sector_value
                    .checked_add(value)
                    .ok_or_else(|| overflow("sector value"))?;
            }
        }
        let position_concentration = share(margin.position_value, total_value);
        let sector_concentration = share(sector_value, total_value);

        let mut findings = Findings::default();

        let margin_sufficient = margin.margin_required <= balance;
        if !margin_sufficient {
            findings.error(
                RiskCheckType::MarginSufficiency,
                Severity::High,
                format!(
                    "margin required {} exceeds balance {}",
                    margin.margin_required.round_dp(2),
                    balance
                ),
                margin.margin_required,
                balance,
            );
        } else if margin.margin_required > balance * MARGIN_USAGE_WARNING {
            findings.warning(
                RiskCheckType::MarginSufficiency,
                Severity::Medium,
                format!(
                    "margin required {} uses over {}% of balance",
                    margin.margin_required.round_dp(2),
                    percent(MARGIN_USAGE_WARNING)
                ),
                margin.margin_required,
                balance * MARGIN_USAGE_WARNING,
            );
        }

        let leverage_within_limit = margin.leverage <= max_leverage;
        if !leverage_within_limit {
            findings.error(
                RiskCheckType::Leverage,
                Severity::High,
                format!(
                    "leverage {}x exceeds {} tier limit {}x",
                    margin.leverage.round_dp(1),
                    tier,
                    max_leverage
                ),
                margin.leverage,
                max_leverage,
            );
        }

        let position_concentration_ok = position_concentration <= self.limits.max_position_concentration;
        if !position_concentration_ok {
            findings.warning(
                RiskCheckType::PositionConcentration,
                Severity::Medium,
                format!(
                    "{} concentration {}% exceeds {}%",
                    margin.product,
                    percent(position_concentration),
                    percent(self.limits.max_position_concentration)
                ),
                position_concentration,
                self.limits.max_position_concentration,
            );
        }

        let sector_concentration_ok = sector_concentration <= self.limits.max_sector_concentration;
        if !sector_concentration_ok {
            findings.warning(
                RiskCheckType::SectorConcentration,
                Severity::Medium,
                format!(
                    "{} sector concentration {}% exceeds {}%",
                    sector,
                    percent(sector_concentration),
                    percent(self.limits.max_sector_concentration)
                ),
                sector_concentration,
                self.limits.max_sector_concentration,
            );
        }

        let position_size_ok = candidate.volume <= self.limits.max_lots_per_product;
        if !position_size_ok {
            findings.error(
                RiskCheckType::LotLimit,
                Severity::High,
                format!(
                    "{} lots exceeds limit of {}",
                    candidate.volume, self.limits.max_lots_per_product
                ),
                candidate.volume,
                self.limits.max_lots_per_product,
            );
        }

        info!(
            "[RISK] {} {} lots: {} risk ({} errors, {} warnings)",
            margin.product,
            candidate.volume,
            findings.severity,
            findings.errors.len(),
            findings.warnings.len()
        );

        Ok(RiskAssessment {
            product: margin.product,
            price: margin.price,
            volume: margin.volume,
            side: margin.side,
            position_value: margin.position_value,
            margin_required: margin.margin_required,
            leverage: margin.leverage,
            tier,
            sector,
            position_concentration,
            sector_concentration,
            overall_severity: findings.severity,
            errors: findings.errors,
            warnings: findings.warnings,
            findings: findings.findings,
            checks: PositionChecks {
                margin_sufficient,
                leverage_within_limit,
                position_concentration_ok,
                sector_concentration_ok,
                position_size_ok,
            },
        })
    }

    /// Whole-book margin ratio, daily loss and sector concentration
    pub fn check_portfolio_risk(
        &self,
        balance: Decimal,
        positions: &[Position],
        current_prices: &PriceMap,
    ) -> Result<PortfolioRiskAssessment> {
        validate_balance(balance)?;
        let equity = self.calculator.dynamic_equity(balance, positions, current_prices)?;
        let portfolio = self.calculator.portfolio_margin(positions)?;
        let total_margin_required = portfolio.total_margin_required;
        let total_portfolio_value = portfolio.total_value;

        let margin_ratio = if total_margin_required > Decimal::ZERO {
            equity
                .dynamic_equity
                .checked_div(total_margin_required)
                .unwrap_or(if equity.dynamic_equity.is_sign_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                })
        } else {
            Decimal::MAX
        };

        let (sector_distribution, tier_distribution) =
            self.distributions(&portfolio.positions, total_portfolio_value);

        let mut findings = Findings::default();

        if margin_ratio <= self.limits.force_liquidation_ratio {
            findings.error(
                RiskCheckType::MarginRatio,
                Severity::Critical,
                format!(
                    "margin ratio {} at or below force liquidation ratio {}",
                    margin_ratio.round_dp(4),
                    self.limits.force_liquidation_ratio
                ),
                margin_ratio,
                self.limits.force_liquidation_ratio,
            );
        } else if margin_ratio <= self.limits.margin_call_ratio {
            findings.warning(
                RiskCheckType::MarginRatio,
                Severity::High,
                format!(
                    "margin ratio {} at or below margin call ratio {}",
                    margin_ratio.round_dp(4),
                    self.limits.margin_call_ratio
                ),
                margin_ratio,
                self.limits.margin_call_ratio,
            );
        } else if margin_ratio <= LOW_MARGIN_RATIO {
            findings.warning(
                RiskCheckType::MarginRatio,
                Severity::Medium,
                format!("margin ratio {} is low", margin_ratio.round_dp(4)),
                margin_ratio,
                LOW_MARGIN_RATIO,
            );
        }

        let daily_limit = -self.limits.max_daily_loss_rate;
        let daily_warning = daily_limit * DAILY_LOSS_WARNING_FRACTION;
        if equity.equity_change_rate <= daily_limit {
            findings.error(
                RiskCheckType::DailyLoss,
                Severity::Critical,
                format!(
                    "daily loss {}% exceeds limit {}%",
                    percent(-equity.equity_change_rate),
                    percent(self.limits.max_daily_loss_rate)
                ),
                equity.equity_change_rate,
                daily_limit,
            );
        } else if equity.equity_change_rate <= daily_warning {
            findings.warning(
                RiskCheckType::DailyLoss,
                Severity::High,
                format!(
                    "daily loss {}% approaching limit {}%",
                    percent(-equity.equity_change_rate),
                    percent(self.limits.max_daily_loss_rate)
                ),
                equity.equity_change_rate,
                daily_warning,
            );
        }

        let mut concentration_ok = true;
        for (sector, bucket) in &sector_distribution {
            if bucket.share > self.limits.max_sector_concentration {
                concentration_ok = false;
                findings.warning(
                    RiskCheckType::SectorConcentration,
                    Severity::Medium,
                    format!(
                        "{} sector concentration {}% exceeds {}%",
                        sector,
                        percent(bucket.share),
                        percent(self.limits.max_sector_concentration)
                    ),
                    bucket.share,
                    self.limits.max_sector_concentration,
                );
            }
        }

        if findings.severity >= Severity::High {
            warn!(
                "[RISK] Portfolio of {} positions at {} risk: {:?}",
                positions.len(),
                findings.severity,
                findings.errors.iter().chain(&findings.warnings).collect::<Vec<_>>()
            );
        } else {
            info!(
                "[RISK] Portfolio of {} positions: margin ratio {}, {} risk",
                positions.len(),
                margin_ratio.round_dp(4),
                findings.severity
            );
        }

        Ok(PortfolioRiskAssessment {
            balance,
            dynamic_equity: equity.dynamic_equity,
            unrealized_pnl: equity.unrealized_pnl,
            total_margin_required,
            margin_ratio,
            equity_change_rate: equity.equity_change_rate,
            total_positions: positions.len(),
            total_portfolio_value,
            sector_distribution,
            tier_distribution,
            overall_severity: findings.severity,
            errors: findings.errors,
            warnings: findings.warnings,
            findings: findings.findings,
            checks: PortfolioChecks {
                margin_sufficient: margin_ratio > self.limits.margin_call_ratio,
                daily_loss_within_limit: equity.equity_change_rate > daily_limit,
                concentration_ok,
            },
            calculated_at: Utc::now(),
        })
    }

    /// Largest lot count that fits the tolerance's margin budget and the
    /// tolerance and tier leverage caps
    ///
    /// Returns a zero-lot suggestion rather than an error when no lot fits.
    pub fn suggest_position_size(
        &self,
        product: &str,
        price: Price,
        balance: Decimal,
        tolerance: RiskTolerance,
    ) -> Result<Suggestion> {
        validate_balance(balance)?;
        let one_lot = self
            .calculator
            .position_margin_for(product, price, 1, PositionSide::Long)?;
        let margin_per_lot = one_lot.margin_required;
        let leverage = one_lot.leverage;

        let budget = balance * tolerance.budget_fraction();
        let mut lots = budget.checked_div(margin_per_lot).map_or(u32::MAX, floor_lots);
        debug!(
            "[RISK] {} budget {} at {} per lot: {} lots before caps",
            one_lot.product, budget, margin_per_lot, lots
        );

        let tolerance_cap = tolerance.max_leverage();
        if leverage > tolerance_cap {
            lots = lots.min(floor_lots(Decimal::from(lots) * tolerance_cap / leverage));
        }

        let tier = self.tier(&one_lot.product);
        let tier_cap = self.classification.profile(tier).max_leverage;
        if leverage > tier_cap {
            lots = lots.min(floor_lots(Decimal::from(lots) * tier_cap / leverage));
        }

        let suggestion = if lots == 0 {
            Suggestion {
                product: one_lot.product,
                price,
                lots: 0,
                margin_required: Decimal::ZERO,
                position_value: Decimal::ZERO,
                leverage: Decimal::ZERO,
                margin_usage_rate: Decimal::ZERO,
                tolerance,
                rationale: RISK_TOO_HIGH.to_string(),
            }
        } else {
            let margin_required = margin_per_lot
                .checked_mul(Decimal::from(lots))
                .ok_or_else(|| overflow("suggested margin"))?;
            let position_value = one_lot
                .position_value
                .checked_mul(Decimal::from(lots))
                .ok_or_else(|| overflow("suggested position value"))?;
            Suggestion {
                product: one_lot.product,
                price,
                lots,
                margin_required,
                position_value,
                leverage: position_value / margin_required,
                margin_usage_rate: margin_required / balance,
                tolerance,
                rationale: format!("{} lots within {} risk tolerance", lots, tolerance),
            }
        };

        info!(
            "[RISK] Suggest {} lots of {} (margin {})",
            suggestion.lots, suggestion.product, suggestion.margin_required
        );
        Ok(suggestion)
    }

    fn distributions(
        &self,
        margins: &[MarginResult],
        total_value: Decimal,
    ) -> (BTreeMap<Sector, Distribution>, BTreeMap<RiskTier, Distribution>) {
        let mut sectors: BTreeMap<Sector, Distribution> = BTreeMap::new();
        let mut tiers: BTreeMap<RiskTier, Distribution> = BTreeMap::new();

        for margin in margins {
            let sector = sectors.entry(self.sector(&margin.product)).or_default();
            sector.value += margin.position_value;
            sector.count += 1;

            let tier = tiers.entry(self.tier(&margin.product)).or_default();
            tier.value += margin.position_value;
            tier.count += 1;
        }

        for bucket in sectors.values_mut().chain(tiers.values_mut()) {
            bucket.share = share(bucket.value, total_value);
        }

        (sectors, tiers)
    }
}

fn sync_broker_multiplier(calculator: MarginCalculator, limits: &RiskLimits) -> MarginCalculator {
    if calculator.broker_multiplier() == limits.broker_margin_multiplier {
        return calculator;
    }
    warn!(
        "[RISK] Calculator broker multiplier {} replaced by risk limit {}",
        calculator.broker_multiplier(),
        limits.broker_margin_multiplier
    );
    calculator.with_broker_multiplier(limits.broker_margin_multiplier)
}

fn validate_balance(balance: Decimal) -> Result<()> {
    if balance < Decimal::ZERO {
        return Err(RiskError::InvalidInput(format!(
            "balance must not be negative, got {}",
            balance
        )));
    }
    Ok(())
}

fn overflow(quantity: &str) -> RiskError {
    RiskError::InvalidInput(format!("{} overflows", quantity))
}

fn share(part: Decimal, total: Decimal) -> Decimal {
    if total > Decimal::ZERO {
        part / total
    } else {
        Decimal::ZERO
    }
}

fn percent(rate: Decimal) -> Decimal {
    (rate * dec!(100)).round_dp(1)
}

fn floor_lots(value: Decimal) -> u32 {
    if value <= Decimal::ZERO {
        return 0;
    }
    value.floor().to_u32().unwrap_or(u32::MAX)
}
