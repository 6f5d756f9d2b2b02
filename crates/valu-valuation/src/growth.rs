//! The Growth Projector (§4.4): classifies historical FCF volatility into a
//! tiered growth profile, derives explicit-horizon and terminal growth
//! rates, and enforces the `WACC - g >= 4pp` spread guard. Runs after WACC
//! is known, per the two-pass design resolving the WACC/growth cycle (§9).

use valu_core::{GrowthMethod, GrowthPlan, VolatilityProfile};

/// Minimum acceptable spread between WACC and terminal growth.
pub const MIN_WACC_GROWTH_SPREAD: f64 = 0.04;

/// Base GDP-growth proxy the terminal rate starts from (§4.4), before any
/// ROE/margin/revenue premia are applied.
const TERMINAL_GROWTH_BASE: f64 = 0.025;

/// Per-volatility-tier explicit growth bands: (years 1-2, years 3-4, year 5
/// and beyond), taken from the midpoint of each range in the §4.4 table.
fn tier_bands(volatility: VolatilityProfile) -> (f64, f64, f64) {
    match volatility {
        VolatilityProfile::Aggressive => (0.21, 0.13, 0.07),
        VolatilityProfile::ModerateOptimistic => (0.17, 0.11, 0.06),
        VolatilityProfile::Moderate => (0.14, 0.09, 0.05),
        VolatilityProfile::Conservative => (0.11, 0.07, 0.04),
        VolatilityProfile::VeryConservative => (0.07, 0.045, 0.03),
    }
}

/// Expand a tier's (years 1-2, years 3-4, year 5+) bands into a per-year
/// vector of the requested horizon length.
fn banded_per_year_growth(volatility: VolatilityProfile, horizon_years: usize) -> Vec<f64> {
    let (years_1_2, years_3_4, year_5_plus) = tier_bands(volatility);
    (1..=horizon_years)
        .map(|year| match year {
            1 | 2 => years_1_2,
            3 | 4 => years_3_4,
            _ => year_5_plus,
        })
        .collect()
}

/// Classify a historical FCF series by coefficient of variation of its
/// year-over-year growth rates.
#[must_use]
pub fn classify_volatility(historical_fcf: &[f64]) -> Option<VolatilityProfile> {
    if historical_fcf.len() < 2 {
        return None;
    }
    let rates: Vec<f64> = historical_fcf
        .windows(2)
        .filter_map(|w| {
            let (newer, older) = (w[0], w[1]);
            if older.abs() > f64::EPSILON {
                Some((newer - older) / older.abs())
            } else {
                None
            }
        })
        .collect();
    if rates.is_empty() {
        return None;
    }
    let mean = rates.iter().sum::<f64>() / rates.len() as f64;
    let variance = rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / rates.len() as f64;
    let stdev = variance.sqrt();
    let cv = if mean.abs() > f64::EPSILON {
        (stdev / mean.abs()).abs()
    } else {
        f64::INFINITY
    };

    Some(if cv < 0.15 && mean > 0.10 {
        VolatilityProfile::Aggressive
    } else if cv < 0.30 && mean > 0.05 {
        VolatilityProfile::ModerateOptimistic
    } else if cv < 0.50 {
        VolatilityProfile::Moderate
    } else if cv < 1.0 {
        VolatilityProfile::Conservative
    } else {
        VolatilityProfile::VeryConservative
    })
}

/// Additional drivers that can lift the terminal-growth premium (§4.4).
#[derive(Debug, Clone, Copy, Default)]
pub struct GrowthDrivers {
    pub roe: Option<f64>,
    pub net_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
}

/// Conservative clamp bounds on the terminal growth rate, applied before the
/// WACC spread guard (§4.4).
const TERMINAL_GROWTH_MIN: f64 = 0.015;
const TERMINAL_GROWTH_MAX: f64 = 0.035;

fn terminal_premium(drivers: GrowthDrivers) -> f64 {
    let mut premium = 0.0;
    if let Some(roe) = drivers.roe {
        if roe > 0.15 {
            premium += 0.0025;
        } else if roe < 0.10 {
            premium -= 0.0025;
        }
    }
    if let Some(margin) = drivers.net_margin {
        if margin > 0.20 {
            premium += 0.0025;
        } else if margin > 0.10 {
            premium += 0.00125;
        } else if margin < 0.05 {
            premium -= 0.0025;
        }
    }
    if let Some(rev_growth) = drivers.revenue_growth {
        if rev_growth > 0.15 {
            premium += 0.0025;
        } else if rev_growth > 0.05 {
            premium += 0.00125;
        }
    }
    premium
}

/// Derive a full growth plan: explicit-horizon rates plus a guarded terminal
/// rate, given the company's historical FCF, its growth drivers, and the
/// WACC already computed for the same company.
#[must_use]
pub fn derive_growth_plan(
    base_fcf: f64,
    historical_fcf: &[f64],
    horizon_years: usize,
    drivers: GrowthDrivers,
    wacc: f64,
    manual_override: Option<f64>,
) -> GrowthPlan {
    let (volatility, method, per_year_growth) = match manual_override {
        Some(rate) => (None, GrowthMethod::Manual, vec![rate; horizon_years]),
        None => match classify_volatility(historical_fcf) {
            Some(profile) => (
                Some(profile),
                GrowthMethod::Historical,
                banded_per_year_growth(profile, horizon_years),
            ),
            None => (None, GrowthMethod::SectorDefault, vec![0.04; horizon_years]),
        },
    };

    let clamped_terminal = (TERMINAL_GROWTH_BASE + terminal_premium(drivers))
        .clamp(TERMINAL_GROWTH_MIN, TERMINAL_GROWTH_MAX);
    let terminal_growth_pre_guard = clamped_terminal;

    let max_allowed = wacc - MIN_WACC_GROWTH_SPREAD;
    let (terminal_growth, spread_adjusted) = if clamped_terminal > max_allowed {
        (max_allowed.max(TERMINAL_GROWTH_MIN), true)
    } else {
        (clamped_terminal, false)
    };

    GrowthPlan {
        base_fcf,
        per_year_growth,
        terminal_growth,
        terminal_growth_pre_guard,
        method,
        volatility,
        spread_adjusted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_high_growth_classifies_aggressive() {
        let series = vec![161.0, 140.0, 122.0, 106.0, 92.0];
        assert_eq!(classify_volatility(&series), Some(VolatilityProfile::Aggressive));
    }

    #[test]
    fn erratic_series_classifies_very_conservative() {
        let series = vec![50.0, -30.0, 80.0, -10.0, 40.0];
        let profile = classify_volatility(&series);
        assert!(matches!(
            profile,
            Some(VolatilityProfile::VeryConservative) | Some(VolatilityProfile::Conservative)
        ));
    }

    #[test]
    fn spread_guard_caps_terminal_growth() {
        let drivers = GrowthDrivers {
            roe: Some(0.30),
            net_margin: Some(0.20),
            revenue_growth: Some(0.15),
        };
        // Base 2.5% + ROE premium 0.25% + margin premium 0.125% (margin==20%
        // doesn't clear the >20% band) + revenue premium 0.125% = 3.0% pre-guard.
        let series = vec![161.0, 140.0, 122.0, 106.0, 92.0];
        let wacc = 0.06; // max allowed g = 0.02
        let plan = derive_growth_plan(100.0, &series, 5, drivers, wacc, None);
        assert!((plan.terminal_growth_pre_guard - 0.030).abs() < 1e-9);
        assert!(plan.spread_adjusted);
        assert!((plan.terminal_growth - 0.02).abs() < 1e-9);
    }

    #[test]
    fn explicit_horizon_rates_follow_the_banded_table() {
        // Aggressive: mean >=15%, low vol.
        let series = vec![161.0, 140.0, 122.0, 106.0, 92.0];
        let plan = derive_growth_plan(100.0, &series, 5, GrowthDrivers::default(), 0.20, None);
        assert_eq!(plan.per_year_growth, vec![0.21, 0.21, 0.13, 0.13, 0.07]);
    }

    #[test]
    fn terminal_growth_premia_follow_the_roe_margin_revenue_table() {
        let high = GrowthDrivers {
            roe: Some(0.20),
            net_margin: Some(0.25),
            revenue_growth: Some(0.20),
        };
        // 2.5% base + 0.25% (ROE>15%) + 0.25% (margin>20%) + 0.25% (rev>15%) = 3.25%.
        let plan_high = derive_growth_plan(100.0, &[], 5, high, 0.30, None);
        assert!((plan_high.terminal_growth_pre_guard - 0.0325).abs() < 1e-9);

        let low = GrowthDrivers {
            roe: Some(0.05),
            net_margin: Some(0.02),
            revenue_growth: Some(0.0),
        };
        // 2.5% base - 0.25% (ROE<10%) - 0.25% (margin<5%) + 0% = 2.0%.
        let plan_low = derive_growth_plan(100.0, &[], 5, low, 0.30, None);
        assert!((plan_low.terminal_growth_pre_guard - 0.020).abs() < 1e-9);
    }

    #[test]
    fn terminal_growth_stays_within_the_conservative_band() {
        // The three premia can add at most 0.75pp, so the strongest possible
        // combination (3.25%) sits inside [1.5%, 3.5%] without hitting the
        // clamp; the clamp itself is exercised directly below.
        let extreme = GrowthDrivers {
            roe: Some(0.50),
            net_margin: Some(0.50),
            revenue_growth: Some(0.50),
        };
        let plan = derive_growth_plan(100.0, &[], 5, extreme, 0.30, None);
        assert!((plan.terminal_growth_pre_guard - 0.0325).abs() < 1e-9);
        assert!(plan.terminal_growth_pre_guard >= TERMINAL_GROWTH_MIN);
        assert!(plan.terminal_growth_pre_guard <= TERMINAL_GROWTH_MAX);
    }

    #[test]
    fn terminal_growth_base_plus_premium_is_clamped_at_the_boundaries() {
        assert_eq!((TERMINAL_GROWTH_BASE + 0.5).clamp(TERMINAL_GROWTH_MIN, TERMINAL_GROWTH_MAX), TERMINAL_GROWTH_MAX);
        assert_eq!((TERMINAL_GROWTH_BASE - 0.5).clamp(TERMINAL_GROWTH_MIN, TERMINAL_GROWTH_MAX), TERMINAL_GROWTH_MIN);
    }

    #[test]
    fn manual_override_skips_classification() {
        let plan = derive_growth_plan(100.0, &[], 5, GrowthDrivers::default(), 0.10, Some(0.08));
        assert_eq!(plan.method, GrowthMethod::Manual);
        assert_eq!(plan.per_year_growth, vec![0.08; 5]);
    }

    #[test]
    fn insufficient_history_falls_back_to_sector_default() {
        let plan = derive_growth_plan(100.0, &[50.0], 3, GrowthDrivers::default(), 0.10, None);
        assert_eq!(plan.method, GrowthMethod::SectorDefault);
    }
}
