//! Residual Income Model (§4.5.3): values equity as book value plus the
//! present value of income earned above the cost of equity, fading to a
//! Gordon-growth terminal residual income.

use valu_core::{Recommendation, ValuationMethod, ValuationResult};

/// Inputs to an RIM run, all per-share.
#[derive(Debug, Clone, Copy)]
pub struct RimInput {
    pub book_value_per_share: f64,
    pub roe: f64,
    pub cost_of_equity: f64,
    pub book_value_growth: f64,
    pub horizon_years: u32,
    pub terminal_growth: f64,
    pub shares_outstanding: f64,
    pub current_price: f64,
}

/// Run the residual income model. `pv_fcf` in the returned `ValuationResult`
/// holds the discounted per-year residual income terms, not free cash flow.
#[must_use]
pub fn rim_valuation(input: &RimInput) -> ValuationResult {
    let mut warnings = Vec::new();
    let mut bv = input.book_value_per_share;
    let mut pv_residual_income = Vec::with_capacity(input.horizon_years as usize);

    for year in 1..=input.horizon_years {
        let residual_income = (input.roe - input.cost_of_equity) * bv;
        let discount = (1.0 + input.cost_of_equity).powi(year as i32);
        pv_residual_income.push(residual_income / discount);
        bv *= 1.0 + input.book_value_growth;
    }

    let terminal_residual_income = (input.roe - input.cost_of_equity) * bv;
    let spread = input.cost_of_equity - input.terminal_growth;
    let pv_terminal_value = if spread > 0.0 {
        let terminal_value =
            terminal_residual_income * (1.0 + input.terminal_growth) / spread;
        terminal_value / (1.0 + input.cost_of_equity).powi(input.horizon_years as i32)
    } else {
        warnings.push("cost of equity - terminal growth spread is non-positive; terminal residual income floored to zero".into());
        0.0
    };

    let fair_value_per_share =
        input.book_value_per_share + pv_residual_income.iter().sum::<f64>() + pv_terminal_value;
    let equity_value = fair_value_per_share * input.shares_outstanding;

    let upside_pct = if input.current_price > 0.0 {
        (fair_value_per_share - input.current_price) / input.current_price
    } else {
        0.0
    };
    let recommendation = Recommendation::from_upside(upside_pct);

    ValuationResult {
        method: ValuationMethod::Rim,
        enterprise_value: equity_value,
        equity_value,
        fair_value_per_share,
        pv_fcf: pv_residual_income,
        pv_terminal_value,
        upside_pct,
        recommendation,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roe_above_cost_of_equity_adds_positive_premium() {
        let input = RimInput {
            book_value_per_share: 20.0,
            roe: 0.18,
            cost_of_equity: 0.10,
            book_value_growth: 0.05,
            horizon_years: 5,
            terminal_growth: 0.03,
            shares_outstanding: 100.0,
            current_price: 22.0,
        };
        let result = rim_valuation(&input);
        assert!(result.fair_value_per_share > input.book_value_per_share);
    }

    #[test]
    fn roe_at_cost_of_equity_collapses_to_book_value() {
        let input = RimInput {
            book_value_per_share: 20.0,
            roe: 0.10,
            cost_of_equity: 0.10,
            book_value_growth: 0.05,
            horizon_years: 5,
            terminal_growth: 0.03,
            shares_outstanding: 100.0,
            current_price: 20.0,
        };
        let result = rim_valuation(&input);
        assert!((result.fair_value_per_share - 20.0).abs() < 1e-9);
    }
}
