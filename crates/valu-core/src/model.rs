//! Entities of §3: `FinancialData`, `WACCResult`, `GrowthPlan`,
//! `ValuationResult`, `ScenarioBundle`, and the tagged-sum enums referenced
//! throughout the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Failure;

/// Unified snapshot of a company as seen by one or more providers.
///
/// Invariant: `ocf.len() == capex.len()`, both most-recent-first, aligned by
/// fiscal year. The canonical FCF rule (`ocf - |capex|`) is the only
/// accepted computation downstream; any "free cash flow" field a provider
/// publishes natively is never read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialData {
    pub ticker: String,
    /// One name for a single-source snapshot, several for a `merge` result.
    pub providers: Vec<String>,
    pub as_of: DateTime<Utc>,
    pub current_price: f64,
    pub shares_outstanding: f64,
    /// Operating cash flow, most-recent-first.
    pub ocf: Vec<f64>,
    /// Capital expenditure, most-recent-first, same length as `ocf`.
    pub capex: Vec<f64>,
    pub cash: f64,
    pub total_debt: f64,
    pub book_value: f64,
    pub revenue: f64,
    pub ebitda: f64,
    pub net_income: f64,
    pub eps_diluted: f64,
    /// Annual dividends per share, most-recent-first.
    pub dividends_per_share: Vec<f64>,
    pub beta: f64,
    pub sector: String,
    pub country: String,
    pub data_completeness: f64,
    pub confidence: f64,
}

impl FinancialData {
    /// Market capitalization implied by price and shares outstanding.
    #[must_use]
    pub fn market_cap(&self) -> f64 {
        self.current_price * self.shares_outstanding
    }

    /// Book value per share.
    #[must_use]
    pub fn book_value_per_share(&self) -> f64 {
        self.book_value / self.shares_outstanding
    }

    /// Current debt-to-equity ratio by market value of equity.
    #[must_use]
    pub fn current_debt_to_equity(&self) -> f64 {
        self.total_debt / self.market_cap()
    }

    /// Validates the series-alignment invariant required before any
    /// downstream computation may run.
    pub fn validate(&self) -> Result<(), Failure> {
        if self.ocf.len() != self.capex.len() {
            return Err(Failure::validation_failed(
                "ocf/capex",
                "OCF and CAPEX series must have equal length and fiscal-year alignment",
            ));
        }
        if self.shares_outstanding <= 0.0 {
            return Err(Failure::validation_failed(
                "shares_outstanding",
                "shares outstanding must be > 0",
            ));
        }
        Ok(())
    }
}

/// The capital-structure and discount-rate parameters fed to the WACC engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccInputs {
    pub risk_free_rate: f64,
    pub risk_free_source: String,
    pub market_risk_premium: f64,
    pub raw_beta: f64,
    pub current_debt_to_equity: f64,
    pub target_debt_to_equity: Option<f64>,
    pub tax_rate: f64,
    pub cost_of_debt: f64,
    pub country_premium: f64,
    pub sector: String,
    pub gross_debt: f64,
    pub market_cap: f64,
    pub cash: f64,
    pub total_debt: f64,
    pub apply_blume: bool,
}

/// Output of the WACC engine (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccResult {
    pub risk_free_rate: f64,
    pub risk_free_source: String,
    pub market_risk_premium: f64,
    pub raw_beta: f64,
    pub blume_beta: f64,
    pub unlevered_beta: Option<f64>,
    pub relevered_beta: Option<f64>,
    pub effective_beta: f64,
    pub current_debt_to_equity: f64,
    pub target_debt_to_equity: Option<f64>,
    pub tax_rate: f64,
    pub cost_of_debt: f64,
    pub after_tax_cost_of_debt: f64,
    pub cost_of_equity: f64,
    pub equity_weight: f64,
    pub debt_weight: f64,
    pub country_premium: f64,
    pub sector_floor_applied: bool,
    pub industry_override_applied: bool,
    pub wacc: f64,
}

/// How the explicit-horizon growth rates were derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthMethod {
    Historical,
    Regression,
    Manual,
    SectorDefault,
}

/// Volatility classification of the historical FCF growth series (§4.4 table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityProfile {
    Aggressive,
    ModerateOptimistic,
    Moderate,
    Conservative,
    VeryConservative,
}

/// A derived growth projection: explicit-horizon rates plus a terminal rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthPlan {
    pub base_fcf: f64,
    /// Per-year growth rates for the explicit horizon, length = horizon.
    pub per_year_growth: Vec<f64>,
    pub terminal_growth: f64,
    /// Terminal growth before the spread guard was (possibly) applied.
    pub terminal_growth_pre_guard: f64,
    pub method: GrowthMethod,
    pub volatility: Option<VolatilityProfile>,
    pub spread_adjusted: bool,
}

/// Which valuation family produced a `ValuationResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationMethod {
    Dcf,
    DdmGordon,
    DdmTwoStage,
    DdmHModel,
    Rim,
    RelativeMultiples,
    BankHybrid,
}

/// Recommendation band derived from weighted upside (§4.6 table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    /// Classify an upside fraction (e.g. `0.30` for +30%) into a band.
    #[must_use]
    pub fn from_upside(upside: f64) -> Self {
        if upside >= 0.30 {
            Self::StrongBuy
        } else if upside >= 0.10 {
            Self::Buy
        } else if upside > -0.10 {
            Self::Hold
        } else if upside > -0.30 {
            Self::Sell
        } else {
            Self::StrongSell
        }
    }

    /// The confidence the recommendation table assigns to this band.
    #[must_use]
    pub fn confidence(self) -> Confidence {
        match self {
            Self::StrongBuy | Self::StrongSell => Confidence::High,
            Self::Buy | Self::Hold | Self::Sell => Confidence::Medium,
        }
    }
}

/// Confidence level attached to a recommendation or scenario bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Output of a single valuation model run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationResult {
    pub method: ValuationMethod,
    pub enterprise_value: f64,
    pub equity_value: f64,
    pub fair_value_per_share: f64,
    pub pv_fcf: Vec<f64>,
    pub pv_terminal_value: f64,
    pub upside_pct: f64,
    pub recommendation: Recommendation,
    pub warnings: Vec<String>,
}

/// Three-scenario bundle (§4.6) plus the probability-weighted aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioBundle {
    pub pessimistic: ValuationResult,
    pub base: ValuationResult,
    pub optimistic: ValuationResult,
    /// (pessimistic, base, optimistic), non-negative, summing to 1.
    pub weights: (f64, f64, f64),
    pub weighted_fair_value: f64,
    pub risk_reward_ratio: f64,
    pub recommendation: Recommendation,
    pub confidence: Confidence,
    /// False if `pessimistic <= base <= optimistic` was violated.
    pub consistent: bool,
}

/// The three data-aggregation strategies of §4.2, mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregatorStrategy {
    FirstAvailable,
    BestQuality,
    Merge,
}

/// Selectable DDM formulations (§4.5.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DdmVariant {
    Gordon,
    TwoStage,
    HModel,
}

/// Selectable bank valuation method, including the hybrid composite (§4.5.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankMethod {
    Rim,
    PbRoe,
    Ddm,
    Hybrid,
}

/// The three named scenarios of §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioType {
    Pessimistic,
    Base,
    Optimistic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_bands_match_table() {
        assert_eq!(Recommendation::from_upside(0.35), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_upside(0.15), Recommendation::Buy);
        assert_eq!(Recommendation::from_upside(0.0), Recommendation::Hold);
        assert_eq!(Recommendation::from_upside(-0.15), Recommendation::Sell);
        assert_eq!(Recommendation::from_upside(-0.35), Recommendation::StrongSell);
    }

    #[test]
    fn financial_data_rejects_misaligned_series() {
        let mut fd = sample();
        fd.capex.pop();
        assert!(fd.validate().is_err());
    }

    #[test]
    fn financial_data_rejects_zero_shares() {
        let mut fd = sample();
        fd.shares_outstanding = 0.0;
        assert!(fd.validate().is_err());
    }

    fn sample() -> FinancialData {
        FinancialData {
            ticker: "TEST".into(),
            providers: vec!["yahoo".into()],
            as_of: Utc::now(),
            current_price: 100.0,
            shares_outstanding: 1_000.0,
            ocf: vec![10.0, 9.0],
            capex: vec![2.0, 2.0],
            cash: 5.0,
            total_debt: 20.0,
            book_value: 50.0,
            revenue: 80.0,
            ebitda: 30.0,
            net_income: 15.0,
            eps_diluted: 1.5,
            dividends_per_share: vec![0.5, 0.45],
            beta: 1.1,
            sector: "Technology".into(),
            country: "USA".into(),
            data_completeness: 0.9,
            confidence: 0.9,
        }
    }
}
