//! Risk assessments
//!
//! Limit breaches are reported here as findings, never as errors, so a
//! caller always gets the full picture even when several checks fail.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use contango_core::{Lots, PositionSide, Price, Product, Rate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::parameters::{RiskTier, RiskTolerance, Sector};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCheckType {
    MarginSufficiency,
    Leverage,
    PositionConcentration,
    SectorConcentration,
    LotLimit,
    MarginRatio,
    DailyLoss,
}

/// Whether a finding blocks the position or only advises against it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    Error,
    Warning,
}

/// One triggered check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub check: RiskCheckType,
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    pub requested_value: String,
    pub limit_value: String,
}

/// Accumulates findings while checks run
#[derive(Debug, Default)]
pub(crate) struct Findings {
    pub severity: Severity,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub findings: Vec<RiskFinding>,
}

impl Findings {
    pub fn error(
        &mut self,
        check: RiskCheckType,
        severity: Severity,
        message: String,
        requested: impl ToString,
        limit: impl ToString,
    ) {
        self.errors.push(message.clone());
        self.record(check, FindingKind::Error, severity, message, requested, limit);
    }

    pub fn warning(
        &mut self,
        check: RiskCheckType,
        severity: Severity,
        message: String,
        requested: impl ToString,
        limit: impl ToString,
    ) {
        self.warnings.push(message.clone());
        self.record(check, FindingKind::Warning, severity, message, requested, limit);
    }

    fn record(
        &mut self,
        check: RiskCheckType,
        kind: FindingKind,
        severity: Severity,
        message: String,
        requested: impl ToString,
        limit: impl ToString,
    ) {
        self.severity = self.severity.max(severity);
        self.findings.push(RiskFinding {
            check,
            kind,
            severity,
            message,
            requested_value: requested.to_string(),
            limit_value: limit.to_string(),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChecks {
    pub margin_sufficient: bool,
    pub leverage_within_limit: bool,
    pub position_concentration_ok: bool,
    pub sector_concentration_ok: bool,
    pub position_size_ok: bool,
}

/// Outcome of checking one candidate position against the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub product: Product,
    pub price: Price,
    pub volume: Lots,
    pub side: PositionSide,
    pub position_value: Decimal,
    pub margin_required: Decimal,
    pub leverage: Decimal,
    pub tier: RiskTier,
    pub sector: Sector,
    /// Candidate value / book value including the candidate
    pub position_concentration: Rate,
    /// Candidate sector value / book value including the candidate
    pub sector_concentration: Rate,
    pub overall_severity: Severity,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub findings: Vec<RiskFinding>,
    pub checks: PositionChecks,
}

impl RiskAssessment {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Value, count and share of the book in one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Distribution {
    pub value: Decimal,
    pub count: usize,
    pub share: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioChecks {
    pub margin_sufficient: bool,
    pub daily_loss_within_limit: bool,
    pub concentration_ok: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioRiskAssessment {
    pub balance: Decimal,
    pub dynamic_equity: Decimal,
    pub unrealized_pnl: Decimal,
    pub total_margin_required: Decimal,
    /// dynamic_equity / total_margin_required, `Decimal::MAX` for a book
    /// that requires no margin
    pub margin_ratio: Decimal,
    pub equity_change_rate: Rate,
    pub total_positions: usize,
    pub total_portfolio_value: Decimal,
    pub sector_distribution: BTreeMap<Sector, Distribution>,
    pub tier_distribution: BTreeMap<RiskTier, Distribution>,
    pub overall_severity: Severity,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub findings: Vec<RiskFinding>,
    pub checks: PortfolioChecks,
    pub calculated_at: DateTime<Utc>,
}

/// Recommended size for a new position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub product: Product,
    pub price: Price,
    pub lots: Lots,
    pub margin_required: Decimal,
    pub position_value: Decimal,
    pub leverage: Decimal,
    pub margin_usage_rate: Rate,
    pub tolerance: RiskTolerance,
    pub rationale: String,
}
