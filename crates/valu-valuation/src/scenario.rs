//! Scenario generation and sensitivity analysis (§4.6): pessimistic/base/
//! optimistic valuations with monotonicity enforcement and probability
//! weighting, plus a 2-D WACC x terminal-growth sensitivity grid.

use valu_core::{Confidence, Recommendation, ScenarioBundle, ValuationResult};

/// WACC deltas, terminal-growth deltas, explicit-growth multipliers, and
/// probability weights for the three named scenarios (pessimistic, base,
/// optimistic). Defaults match §4.6: pessimistic scales growth by 0.6 and
/// adds 2pp to WACC / subtracts 1pp from terminal growth; optimistic scales
/// growth by 1.4 and subtracts 1pp from WACC / adds 0.5pp to terminal
/// growth.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioConfig {
    pub wacc_delta: (f64, f64, f64),
    pub terminal_growth_delta: (f64, f64, f64),
    pub growth_multiplier: (f64, f64, f64),
    pub weights: (f64, f64, f64),
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            wacc_delta: (0.02, 0.0, -0.01),
            terminal_growth_delta: (-0.01, 0.0, 0.005),
            growth_multiplier: (0.6, 1.0, 1.4),
            weights: (0.25, 0.50, 0.25),
        }
    }
}

/// Generate the three-scenario bundle by calling `compute` with a perturbed
/// `(wacc, growth_multiplier, terminal_growth)` triple for each scenario.
/// Enforces `pessimistic <= base <= optimistic` on the fair-value-per-share
/// ordering, clamping violations rather than merely reporting them.
pub fn generate_scenarios<F>(
    base_wacc: f64,
    base_terminal_growth: f64,
    current_price: f64,
    config: &ScenarioConfig,
    mut compute: F,
) -> ScenarioBundle
where
    F: FnMut(f64, f64, f64) -> ValuationResult,
{
    let mut pessimistic = compute(
        base_wacc + config.wacc_delta.0,
        config.growth_multiplier.0,
        base_terminal_growth + config.terminal_growth_delta.0,
    );
    let base = compute(
        base_wacc + config.wacc_delta.1,
        config.growth_multiplier.1,
        base_terminal_growth + config.terminal_growth_delta.1,
    );
    let mut optimistic = compute(
        base_wacc + config.wacc_delta.2,
        config.growth_multiplier.2,
        base_terminal_growth + config.terminal_growth_delta.2,
    );

    let mut consistent = true;
    if pessimistic.fair_value_per_share > base.fair_value_per_share {
        consistent = false;
        pessimistic.fair_value_per_share = base.fair_value_per_share;
    }
    if optimistic.fair_value_per_share < base.fair_value_per_share {
        consistent = false;
        optimistic.fair_value_per_share = base.fair_value_per_share;
    }

    let (w_pess, w_base, w_opt) = config.weights;
    let weighted_fair_value = pessimistic.fair_value_per_share * w_pess
        + base.fair_value_per_share * w_base
        + optimistic.fair_value_per_share * w_opt;

    let downside = base.fair_value_per_share - pessimistic.fair_value_per_share;
    let upside = optimistic.fair_value_per_share - base.fair_value_per_share;
    let risk_reward_ratio = if downside.abs() > f64::EPSILON {
        upside / downside
    } else {
        f64::INFINITY
    };

    let weighted_upside = if current_price > 0.0 {
        (weighted_fair_value - current_price) / current_price
    } else {
        0.0
    };
    let recommendation = Recommendation::from_upside(weighted_upside);
    let confidence = if consistent {
        recommendation.confidence()
    } else {
        Confidence::Low
    };

    ScenarioBundle {
        pessimistic,
        base,
        optimistic,
        weights: config.weights,
        weighted_fair_value,
        risk_reward_ratio,
        recommendation,
        confidence,
        consistent,
    }
}

/// Upside values outside this range are clipped before being handed to a
/// caller-side color scale, so a single outlier cell can't wash out the
/// rest of the grid. The absolute fair value is unaffected; only the
/// colour-mapped upside is clipped.
pub const SENSITIVITY_CLIP: f64 = 0.30;

/// Build a WACC x terminal-growth sensitivity grid of upside percentages.
/// Cells where `wacc <= growth` (an undefined spread) are `None`.
pub fn sensitivity_matrix<F>(
    wacc_values: &[f64],
    growth_values: &[f64],
    current_price: f64,
    mut fair_value_per_share: F,
) -> Vec<Vec<Option<f64>>>
where
    F: FnMut(f64, f64) -> f64,
{
    wacc_values
        .iter()
        .map(|&wacc| {
            growth_values
                .iter()
                .map(|&growth| {
                    if wacc <= growth || current_price <= 0.0 {
                        None
                    } else {
                        let value = fair_value_per_share(wacc, growth);
                        let upside = (value - current_price) / current_price;
                        Some(upside.clamp(-SENSITIVITY_CLIP, SENSITIVITY_CLIP))
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use valu_core::ValuationMethod;

    fn stub_result(fair_value: f64) -> ValuationResult {
        ValuationResult {
            method: ValuationMethod::Dcf,
            enterprise_value: fair_value * 10.0,
            equity_value: fair_value * 10.0,
            fair_value_per_share: fair_value,
            pv_fcf: vec![],
            pv_terminal_value: 0.0,
            upside_pct: 0.0,
            recommendation: Recommendation::Hold,
            warnings: vec![],
        }
    }

    #[test]
    fn monotonicity_is_enforced_when_violated() {
        let config = ScenarioConfig::default();
        // Deliberately inconsistent: pessimistic computed above base.
        let bundle = generate_scenarios(0.10, 0.03, 100.0, &config, |wacc, _mult, _g| {
            if wacc > 0.10 {
                stub_result(200.0) // pessimistic scenario's wacc is higher
            } else if wacc < 0.10 {
                stub_result(50.0)
            } else {
                stub_result(100.0)
            }
        });
        assert!(!bundle.consistent);
        assert!(bundle.pessimistic.fair_value_per_share <= bundle.base.fair_value_per_share);
        assert!(bundle.optimistic.fair_value_per_share >= bundle.base.fair_value_per_share);
    }

    #[test]
    fn weighted_value_matches_scenario_example() {
        let config = ScenarioConfig::default();
        let bundle = generate_scenarios(0.10, 0.03, 120.0, &config, |wacc, _mult, _g| {
            if wacc > 0.10 {
                stub_result(90.0)
            } else if wacc < 0.10 {
                stub_result(110.0)
            } else {
                stub_result(100.0)
            }
        });
        // 0.25*90 + 0.50*100 + 0.25*110 = 22.5 + 50 + 27.5 = 100
        assert!((bundle.weighted_fair_value - 100.0).abs() < 1e-9);
        // upside = (100-120)/120 = -0.1667, within the Sell band.
        assert_eq!(bundle.recommendation, Recommendation::Sell);
    }

    #[test]
    fn spec_scenario_example_lands_near_strong_sell() {
        // Base FV 100, pessimistic ~80, optimistic ~130, price 150.
        let config = ScenarioConfig::default();
        let bundle = generate_scenarios(0.10, 0.03, 150.0, &config, |wacc, mult, _g| {
            if wacc > 0.10 {
                stub_result(80.0 * mult / 0.6)
            } else if wacc < 0.10 {
                stub_result(130.0 * mult / 1.4)
            } else {
                stub_result(100.0)
            }
        });
        assert!((bundle.weighted_fair_value - 103.0).abs() < 2.0);
        assert_eq!(bundle.recommendation, Recommendation::StrongSell);
    }

    #[test]
    fn sensitivity_matrix_nulls_out_undefined_spread() {
        let waccs = vec![0.04, 0.08];
        let growths = vec![0.03, 0.06];
        let matrix = sensitivity_matrix(&waccs, &growths, 100.0, |wacc, growth| {
            100.0 * (1.0 + wacc - growth)
        });
        assert!(matrix[0][1].is_none()); // wacc=0.04 <= growth=0.06
        assert!(matrix[1][0].is_some());
    }

    #[test]
    fn sensitivity_matrix_clips_extreme_upside() {
        let waccs = vec![0.20];
        let growths = vec![0.01];
        let matrix = sensitivity_matrix(&waccs, &growths, 10.0, |_wacc, _growth| 1000.0);
        assert_eq!(matrix[0][0], Some(SENSITIVITY_CLIP));
    }
}
