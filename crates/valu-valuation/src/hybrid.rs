//! Bank Hybrid composite (§4.5.5): a weighted blend of RIM, P/B x ROE, and
//! DDM fair values, used in place of a single model for financial-services
//! companies where FCF-based models are unreliable.

use valu_core::{Recommendation, ValuationMethod, ValuationResult};

/// Default weights: RIM, P/B x ROE, DDM.
pub const DEFAULT_WEIGHTS: (f64, f64, f64) = (0.50, 0.30, 0.20);

/// `V_PB_ROE = [(ROE - g) / (r_e - g)] * BV_per_share`, the P/B-times-ROE
/// leg of the hybrid composite.
#[must_use]
pub fn pb_roe_value(roe: f64, terminal_growth: f64, cost_of_equity: f64, book_value_per_share: f64) -> f64 {
    let spread = cost_of_equity - terminal_growth;
    if spread <= 0.0 {
        return f64::NAN;
    }
    ((roe - terminal_growth) / spread) * book_value_per_share
}

/// Combine three per-share fair-value estimates into the hybrid composite.
///
/// The DDM leg's cost of equity is expected to already reflect the
/// financial-services industry-WACC redirect when applicable -- that
/// substitution happens where the DDM input is built, not here.
///
/// A component whose value is non-finite (e.g. a Gordon/P-B-ROE leg with a
/// non-positive spread) is dropped and its weight is redistributed
/// proportionally among the surviving components, per §4.5.5. If every
/// component fails, the result is a zero fair value with a warning attached.
#[must_use]
pub fn bank_hybrid(
    rim_value: f64,
    pb_roe_value: f64,
    ddm_value: f64,
    weights: (f64, f64, f64),
    shares_outstanding: f64,
    current_price: f64,
) -> ValuationResult {
    let (w_rim, w_pb_roe, w_ddm) = weights;
    let legs = [
        (rim_value, w_rim),
        (pb_roe_value, w_pb_roe),
        (ddm_value, w_ddm),
    ];
    let surviving_weight: f64 = legs
        .iter()
        .filter(|(value, _)| value.is_finite())
        .map(|(_, weight)| weight)
        .sum();

    let mut warnings = Vec::new();
    let fair_value_per_share = if surviving_weight > 0.0 {
        legs.iter()
            .filter(|(value, _)| value.is_finite())
            .map(|(value, weight)| value * weight)
            .sum::<f64>()
            / surviving_weight
    } else {
        warnings.push("all bank hybrid components failed; fair value is zero".to_string());
        0.0
    };
    if surviving_weight < w_rim + w_pb_roe + w_ddm {
        warnings.push("one or more bank hybrid components failed; weights were redistributed".to_string());
    }

    let equity_value = fair_value_per_share * shares_outstanding;
    let upside_pct = if current_price > 0.0 {
        (fair_value_per_share - current_price) / current_price
    } else {
        0.0
    };

    ValuationResult {
        method: ValuationMethod::BankHybrid,
        enterprise_value: equity_value,
        equity_value,
        fair_value_per_share,
        pv_fcf: vec![rim_value, pb_roe_value, ddm_value],
        pv_terminal_value: 0.0,
        upside_pct,
        recommendation: Recommendation::from_upside(upside_pct),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn weighted_average_matches_spec_bank_hybrid_example() {
        // RIM=144, PB*ROE=216, DDM=74 -> 0.5*144 + 0.3*216 + 0.2*74 = 72 + 64.8 + 14.8 = 151.6
        let result = bank_hybrid(144.0, 216.0, 74.0, DEFAULT_WEIGHTS, 100.0, 130.0);
        assert_relative_eq!(result.fair_value_per_share, 151.6, epsilon = 1e-9);
    }

    #[test]
    fn pb_roe_matches_spec_formula() {
        // ROE=16.44%, r_e=10.76%, g=3%, BV=124.96 -> (0.1644-0.03)/(0.1076-0.03)*124.96 ~= 216
        let value = pb_roe_value(0.1644, 0.03, 0.1076, 124.96);
        assert!((value - 216.0).abs() < 2.0);
    }

    #[test]
    fn zero_total_weight_yields_zero_fair_value() {
        let result = bank_hybrid(160.0, 150.0, 140.0, (0.0, 0.0, 0.0), 100.0, 130.0);
        assert_eq!(result.fair_value_per_share, 0.0);
    }

    #[test]
    fn failed_component_weight_is_redistributed_among_survivors() {
        // DDM leg failed (NaN); RIM and PB*ROE split the full weight 0.5/0.3
        // proportionally: 0.5/0.8 and 0.3/0.8.
        let result = bank_hybrid(144.0, 216.0, f64::NAN, DEFAULT_WEIGHTS, 100.0, 130.0);
        let expected = (144.0 * 0.5 + 216.0 * 0.3) / 0.8;
        assert_relative_eq!(result.fair_value_per_share, expected, epsilon = 1e-9);
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn every_component_failing_yields_zero_with_warning() {
        let result = bank_hybrid(f64::NAN, f64::NAN, f64::NAN, DEFAULT_WEIGHTS, 100.0, 130.0);
        assert_eq!(result.fair_value_per_share, 0.0);
        assert!(!result.warnings.is_empty());
    }
}
