//! Contango Risk Manager
//!
//! Risk checks for futures books built on the margin calculator:
//!
//! - **Classification**: product -> risk tier (leverage cap) and sector
//! - **Position checks**: margin sufficiency, leverage, product and sector
//!   concentration, lot cap
//! - **Portfolio checks**: margin ratio against margin-call and liquidation
//!   lines, daily loss, sector concentration
//! - **Sizing**: lots that fit a risk tolerance's budget and leverage caps
//!
//! ```text
//!   Position ──► MarginCalculator ──► MarginResult
//!                                         │
//!        RiskLimits + ClassificationTable ┤
//!                                         ▼
//!                              FuturesRiskManager
//!                                         │
//!                   RiskAssessment / PortfolioRiskAssessment / Suggestion
//! ```
//!
//! Nothing here holds state between calls; the manager can be shared
//! behind an `Arc` and called from any thread.

pub mod assessment;
pub mod error;
pub mod manager;
pub mod parameters;

pub use assessment::{
    Distribution, FindingKind, PortfolioChecks, PortfolioRiskAssessment, PositionChecks,
    RiskAssessment, RiskCheckType, RiskFinding, Severity, Suggestion,
};
pub use error::{Result, RiskError};
pub use manager::{FuturesRiskManager, RISK_TOO_HIGH};
pub use parameters::{ClassificationTable, RiskLimits, RiskTier, RiskTolerance, Sector, TierProfile};
