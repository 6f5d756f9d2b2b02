//! Two-stage Discounted Cash Flow valuation (§4.5.1).

use valu_core::{GrowthPlan, Recommendation, ValuationMethod, ValuationResult};

/// Inputs to a two-stage DCF run.
#[derive(Debug, Clone)]
pub struct DcfInput<'a> {
    pub growth: &'a GrowthPlan,
    pub wacc: f64,
    pub net_debt: f64,
    pub shares_outstanding: f64,
    pub current_price: f64,
}

/// Run the two-stage DCF: explicit-horizon FCF projected at the per-year
/// growth rates, a Gordon-growth terminal value off the final explicit-year
/// FCF, both discounted at WACC.
#[must_use]
pub fn dcf_valuation(input: &DcfInput<'_>) -> ValuationResult {
    let mut warnings = Vec::new();
    let growth = input.growth;

    let mut fcf = growth.base_fcf;
    let mut pv_fcf = Vec::with_capacity(growth.per_year_growth.len());
    for (year_index, rate) in growth.per_year_growth.iter().enumerate() {
        fcf *= 1.0 + rate;
        let discount = (1.0 + input.wacc).powi(year_index as i32 + 1);
        pv_fcf.push(fcf / discount);
    }

    let horizon = growth.per_year_growth.len();
    let spread = input.wacc - growth.terminal_growth;
    let terminal_value = if spread > 0.0 {
        fcf * (1.0 + growth.terminal_growth) / spread
    } else {
        warnings.push("WACC - terminal growth spread is non-positive; terminal value undefined, floored to zero".into());
        0.0
    };
    let pv_terminal_value = terminal_value / (1.0 + input.wacc).powi(horizon as i32);

    if growth.spread_adjusted {
        warnings.push("terminal growth was capped by the WACC - g >= 4pp spread guard".into());
    }

    let enterprise_value = pv_fcf.iter().sum::<f64>() + pv_terminal_value;
    let equity_value = enterprise_value - input.net_debt;
    let fair_value_per_share = if input.shares_outstanding > 0.0 {
        equity_value / input.shares_outstanding
    } else {
        0.0
    };

    let upside_pct = if input.current_price > 0.0 {
        (fair_value_per_share - input.current_price) / input.current_price
    } else {
        0.0
    };
    let recommendation = Recommendation::from_upside(upside_pct);

    ValuationResult {
        method: ValuationMethod::Dcf,
        enterprise_value,
        equity_value,
        fair_value_per_share,
        pv_fcf,
        pv_terminal_value,
        upside_pct,
        recommendation,
        warnings,
    }
}
