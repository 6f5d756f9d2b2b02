//! Dividend Discount Models (§4.5.2): Gordon-growth, two-stage, and H-model
//! formulations, plus the inverse Gordon solve for implied growth.

/// Parameters for the two-stage dividend model.
#[derive(Debug, Clone, Copy)]
pub struct DdmInput {
    pub d0: f64,
    pub cost_of_equity: f64,
    pub high_growth: f64,
    pub high_growth_years: u32,
    pub terminal_growth: f64,
}

/// Single-stage Gordon growth model: `P = D0 * (1+g) / (r - g)`.
#[must_use]
pub fn gordon(d0: f64, cost_of_equity: f64, terminal_growth: f64) -> f64 {
    let spread = cost_of_equity - terminal_growth;
    if spread <= 0.0 {
        return f64::NAN;
    }
    d0 * (1.0 + terminal_growth) / spread
}

/// Two-stage dividend model: `high_growth_years` of dividends growing at
/// `high_growth`, then a Gordon-growth terminal value at `terminal_growth`.
#[must_use]
pub fn two_stage(input: &DdmInput) -> f64 {
    let mut dividend = input.d0;
    let mut pv_dividends = 0.0;
    for year in 1..=input.high_growth_years {
        dividend *= 1.0 + input.high_growth;
        pv_dividends += dividend / (1.0 + input.cost_of_equity).powi(year as i32);
    }
    let terminal_value = gordon(dividend, input.cost_of_equity, input.terminal_growth);
    let pv_terminal = terminal_value / (1.0 + input.cost_of_equity).powi(input.high_growth_years as i32);
    pv_dividends + pv_terminal
}

/// H-model: approximates a linearly declining growth rate from
/// `short_growth` to `long_growth` over `half_life_years`, avoiding the
/// year-by-year loop of the full two-stage model.
#[must_use]
pub fn h_model(d0: f64, cost_of_equity: f64, short_growth: f64, long_growth: f64, half_life_years: f64) -> f64 {
    let spread = cost_of_equity - long_growth;
    if spread <= 0.0 {
        return f64::NAN;
    }
    let stable_component = d0 * (1.0 + long_growth) / spread;
    let transition_component = d0 * half_life_years * (short_growth - long_growth) / spread;
    stable_component + transition_component
}

/// Inverse Gordon solve: the constant growth rate the market is implicitly
/// pricing in, given the current price and current dividend.
#[must_use]
pub fn implied_growth(price: f64, d0: f64, cost_of_equity: f64) -> f64 {
    (price * cost_of_equity - d0) / (price + d0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gordon_sanity_check() {
        // D0=5, r=0.10, g=0.05 -> P = 5*1.05/0.05 = 105.00
        let price = gordon(5.0, 0.10, 0.05);
        assert_relative_eq!(price, 105.0, epsilon = 1e-9);
    }

    #[test]
    fn two_stage_collapses_to_gordon_with_matching_growth() {
        let input = DdmInput {
            d0: 5.0,
            cost_of_equity: 0.10,
            high_growth: 0.05,
            high_growth_years: 3,
            terminal_growth: 0.05,
        };
        let two_stage_price = two_stage(&input);
        let gordon_price = gordon(5.0, 0.10, 0.05);
        assert_relative_eq!(two_stage_price, gordon_price, epsilon = 1e-6);
    }

    #[test]
    fn implied_growth_round_trips_through_gordon() {
        let price = gordon(5.0, 0.10, 0.05);
        let g = implied_growth(price, 5.0, 0.10);
        assert_relative_eq!(g, 0.05, epsilon = 1e-6);
    }

    #[test]
    fn non_positive_spread_yields_nan() {
        assert!(gordon(5.0, 0.04, 0.05).is_nan());
        assert!(h_model(5.0, 0.04, 0.10, 0.05, 5.0).is_nan());
    }
}
