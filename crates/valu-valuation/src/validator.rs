//! Cross-cutting input/output validation (§4.7): runs before any valuation
//! model and after, independent of which model produced the result.

use valu_core::{Failure, FinancialData};

use crate::growth::MIN_WACC_GROWTH_SPREAD;

/// Epsilon for WACC-minus-growth spread comparisons, absorbing floating
/// point noise at the boundary of the 4pp guard.
pub const SPREAD_EPSILON: f64 = 1e-6;

/// Validate a `FinancialData` snapshot before any model runs (§4.7 pre-checks).
pub fn validate_inputs(data: &FinancialData) -> Result<(), Failure> {
    data.validate()?;
    if data.current_price <= 0.0 {
        return Err(Failure::validation_failed(
            "current_price",
            "current price must be > 0",
        ));
    }
    if data.data_completeness < 0.0 || data.data_completeness > 1.0 {
        return Err(Failure::validation_failed(
            "data_completeness",
            "data completeness must be within [0, 1]",
        ));
    }
    if data.shares_outstanding <= 1000.0 {
        return Err(Failure::validation_failed(
            "shares_outstanding",
            "share count must exceed 1000 (this is a count, not a count in billions)",
        ));
    }
    if data.cash < 0.0 {
        return Err(Failure::validation_failed("cash", "cash must be >= 0"));
    }
    if data.total_debt < 0.0 {
        return Err(Failure::validation_failed(
            "total_debt",
            "total debt must be >= 0",
        ));
    }
    if !data.revenue.is_finite() {
        return Err(Failure::validation_failed(
            "revenue",
            "revenue must be finite",
        ));
    }
    if !data.ebitda.is_finite() {
        return Err(Failure::validation_failed("ebitda", "ebitda must be finite"));
    }
    Ok(())
}

/// Validate the derived model inputs (base FCF, WACC, terminal growth) once
/// the FCF/WACC/growth stages have run, before any valuation model consumes
/// them (§4.7 pre-checks that depend on derived rather than raw values).
pub fn validate_model_inputs(base_fcf: f64, wacc: f64, terminal_growth: f64) -> Result<(), Failure> {
    if !base_fcf.is_finite() || base_fcf == 0.0 {
        return Err(Failure::validation_failed(
            "base_fcf",
            "base FCF must be finite and non-zero",
        ));
    }
    if !(wacc > 0.0 && wacc < 0.5) {
        return Err(Failure::validation_failed(
            "wacc",
            "WACC must be within (0, 50%)",
        ));
    }
    if terminal_growth >= wacc {
        return Err(Failure::validation_failed(
            "terminal_growth",
            "terminal growth must be below WACC",
        ));
    }
    if terminal_growth < -0.05 {
        return Err(Failure::validation_failed(
            "terminal_growth",
            "terminal growth must not be below -5%",
        ));
    }
    Ok(())
}

/// Validate that a WACC/terminal-growth pair satisfies the spread guard
/// before it is used to build a terminal value, and that the resulting
/// fair value per share clears the order-of-magnitude guard (§4.7 post-checks).
pub fn validate_output(
    wacc: f64,
    terminal_growth: f64,
    fair_value_per_share: f64,
    current_price: f64,
) -> Result<(), Failure> {
    if wacc - terminal_growth < MIN_WACC_GROWTH_SPREAD - SPREAD_EPSILON {
        return Err(Failure::numerical_degenerate(format!(
            "WACC - terminal growth spread ({:.4}) is below the required {:.2}pp minimum",
            wacc - terminal_growth,
            MIN_WACC_GROWTH_SPREAD * 100.0
        )));
    }
    if current_price > 0.0 && (fair_value_per_share <= 0.0 || fair_value_per_share >= 10.0 * current_price) {
        return Err(Failure::validation_failed(
            "fair_value_per_share",
            format!(
                "fair value per share ({fair_value_per_share:.2}) is outside the plausible \
                 (0, 10x current price={current_price:.2}) range"
            ),
        ));
    }
    Ok(())
}
