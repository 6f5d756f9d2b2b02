//! The top-level orchestration layer: wires the Data Aggregator, FCF
//! computer, WACC engine, growth engine, valuation models, and scenario
//! engine behind the three caller-API entry points (spec §6).

pub mod config;
pub mod overrides;

pub use config::Config;
pub use overrides::Overrides;

use tracing::{info, warn};
use valu_core::{
    tables, BankMethod, DdmVariant, Failure, FinancialData, GrowthPlan, Recommendation,
    ScenarioBundle, ValuationMethod, ValuationResult, WaccResult,
};
use valu_providers::Aggregator;
use valu_valuation::growth::{GrowthDrivers, MIN_WACC_GROWTH_SPREAD};
use valu_valuation::hybrid::{pb_roe_value, DEFAULT_WEIGHTS};
use valu_valuation::{
    compute_fcf_series, dcf_valuation, derive_growth_plan, gordon, rim_valuation, two_stage,
    validate_inputs, validate_model_inputs, validate_output, DcfInput, DdmInput, RimInput,
};

/// Either a single fair-value run or a full pessimistic/base/optimistic
/// scenario envelope, matching `value_equity`'s `ValuationResult |
/// ScenarioBundle` return shape from spec §6.
#[derive(Debug, Clone)]
pub enum ValuationOutcome {
    Single(ValuationResult),
    Scenario(ScenarioBundle),
}

/// Estimate cost of debt from interest-bearing debt when available,
/// otherwise a flat sector-agnostic spread over the risk-free rate --
/// `FinancialData` carries no interest-expense field, so this is the
/// closest available proxy.
fn estimate_cost_of_debt(risk_free_rate: f64) -> f64 {
    risk_free_rate + 0.02
}

/// Build `WaccInputs` from a snapshot and the caller's overrides, then run
/// the WACC engine (spec §6 entry point 2). When
/// `Overrides::use_dynamic_risk_free_rate` is set, the risk-free rate comes
/// from the Treasury-yield probe at `config.treasury_maturity_years`
/// instead of `config.default_risk_free_rate`.
pub async fn compute_wacc(data: &FinancialData, overrides: &Overrides, config: &Config) -> WaccResult {
    let industry = tables::industry_row(&data.sector);
    let country_premium = tables::country_risk_premium(&overrides.country_code);
    let (risk_free_rate, risk_free_source) = if overrides.use_dynamic_risk_free_rate {
        config.treasury.rate(config.treasury_maturity_years).await
    } else {
        (config.default_risk_free_rate, "static_default".to_string())
    };

    let inputs = valu_core::WaccInputs {
        risk_free_rate,
        risk_free_source,
        market_risk_premium: config.default_market_risk_premium,
        raw_beta: data.beta,
        current_debt_to_equity: data.current_debt_to_equity(),
        target_debt_to_equity: overrides.apply_hamada_target_de,
        tax_rate: industry.tax_rate,
        cost_of_debt: estimate_cost_of_debt(risk_free_rate),
        country_premium,
        sector: data.sector.clone(),
        gross_debt: data.total_debt,
        market_cap: data.market_cap(),
        cash: data.cash,
        total_debt: data.total_debt,
        apply_blume: overrides.apply_blume,
    };

    let mut result = valu_valuation::compute_wacc(&inputs);
    if let Some(wacc) = overrides.wacc_override {
        result.wacc = wacc;
    }
    result
}

/// Build the growth plan for a snapshot given its already-computed FCF
/// series and WACC, honoring any caller overrides.
fn build_growth_plan(
    data: &FinancialData,
    fcf_series: &[f64],
    wacc: f64,
    overrides: &Overrides,
) -> GrowthPlan {
    let base_fcf = overrides
        .fcf_base_override
        .unwrap_or_else(|| fcf_series.first().copied().unwrap_or(0.0));
    let drivers = GrowthDrivers {
        roe: if data.book_value > 0.0 {
            Some(data.net_income / data.book_value)
        } else {
            None
        },
        net_margin: if data.revenue > 0.0 {
            Some(data.net_income / data.revenue)
        } else {
            None
        },
        revenue_growth: None,
    };

    let mut plan = derive_growth_plan(
        base_fcf,
        fcf_series,
        overrides.horizon_years,
        drivers,
        wacc,
        None,
    );

    if let Some(rates) = &overrides.projection_growth_overrides {
        plan.per_year_growth = rates.clone();
        plan.method = valu_core::GrowthMethod::Manual;
    }

    if let Some(g) = overrides.terminal_growth_override {
        plan.terminal_growth_pre_guard = g;
        let max_allowed = wacc - MIN_WACC_GROWTH_SPREAD;
        if g > max_allowed {
            plan.terminal_growth = max_allowed.max(0.0);
            plan.spread_adjusted = true;
        } else {
            plan.terminal_growth = g;
            plan.spread_adjusted = false;
        }
    }

    plan
}

fn net_debt_for(data: &FinancialData, _use_net_debt: bool) -> f64 {
    data.total_debt - data.cash
}

/// Run a single fair-value model given a snapshot, its WACC, and its growth
/// plan. Dispatches to the Bank Hybrid family for Financial Services,
/// otherwise always runs the DCF.
fn run_single_model(
    data: &FinancialData,
    wacc: &WaccResult,
    growth: &GrowthPlan,
    overrides: &Overrides,
) -> ValuationResult {
    let shares = overrides.shares_override.unwrap_or(data.shares_outstanding);
    let net_debt = net_debt_for(data, overrides.use_net_debt);

    if data.sector.eq_ignore_ascii_case("Financial Services") {
        return run_bank_valuation(data, wacc, growth, overrides, shares);
    }

    let input = DcfInput {
        growth,
        wacc: wacc.wacc,
        net_debt,
        shares_outstanding: shares,
        current_price: data.current_price,
    };
    dcf_valuation(&input)
}

fn run_bank_valuation(
    data: &FinancialData,
    wacc: &WaccResult,
    growth: &GrowthPlan,
    overrides: &Overrides,
    shares: f64,
) -> ValuationResult {
    let book_value_per_share = data.book_value_per_share();
    let roe = if data.book_value > 0.0 {
        data.net_income / data.book_value
    } else {
        0.0
    };
    let rim_input = RimInput {
        book_value_per_share,
        roe,
        cost_of_equity: wacc.cost_of_equity,
        book_value_growth: 0.03,
        horizon_years: overrides.horizon_years as u32,
        terminal_growth: growth.terminal_growth,
        shares_outstanding: shares,
        current_price: data.current_price,
    };
    let rim_result = rim_valuation(&rim_input);

    let pb_roe = pb_roe_value(roe, growth.terminal_growth, wacc.cost_of_equity, book_value_per_share);

    let dividend = data.dividends_per_share.first().copied().unwrap_or(0.0);
    let ddm_growth = growth.terminal_growth.min(overrides.ddm_growth_cap);
    let ddm_value = gordon(dividend, wacc.cost_of_equity, ddm_growth);

    match overrides.bank_method {
        BankMethod::Rim => rim_result,
        BankMethod::PbRoe => {
            let upside = if data.current_price > 0.0 {
                (pb_roe - data.current_price) / data.current_price
            } else {
                0.0
            };
            ValuationResult {
                method: ValuationMethod::RelativeMultiples,
                enterprise_value: pb_roe * shares,
                equity_value: pb_roe * shares,
                fair_value_per_share: pb_roe,
                pv_fcf: vec![],
                pv_terminal_value: 0.0,
                upside_pct: upside,
                recommendation: Recommendation::from_upside(upside),
                warnings: vec![],
            }
        }
        BankMethod::Ddm => {
            let upside = if data.current_price > 0.0 {
                (ddm_value - data.current_price) / data.current_price
            } else {
                0.0
            };
            ValuationResult {
                method: ValuationMethod::DdmGordon,
                enterprise_value: ddm_value * shares,
                equity_value: ddm_value * shares,
                fair_value_per_share: ddm_value,
                pv_fcf: vec![],
                pv_terminal_value: 0.0,
                upside_pct: upside,
                recommendation: Recommendation::from_upside(upside),
                warnings: vec![],
            }
        }
        BankMethod::Hybrid => valu_valuation::bank_hybrid(
            rim_result.fair_value_per_share,
            pb_roe,
            ddm_value,
            DEFAULT_WEIGHTS,
            shares,
            data.current_price,
        ),
    }
}

/// End-to-end valuation: fetch, derive, value (spec §6 entry point 1).
pub async fn value_equity(
    ticker: &str,
    aggregator: &Aggregator,
    overrides: &Overrides,
    config: &Config,
    as_scenario: bool,
) -> Result<ValuationOutcome, Failure> {
    info!(ticker, "starting value_equity");
    let (data, _quality_score) = aggregator
        .fetch(ticker, overrides.horizon_years as u32, overrides.strategy)
        .await
        .map_err(|err| Failure::data_unavailable(err.to_string()))?;

    validate_inputs(&data)?;

    let fcf_series = compute_fcf_series(&data)?;
    let wacc = compute_wacc(&data, overrides, config).await;
    let growth = build_growth_plan(&data, &fcf_series, wacc.wacc, overrides);

    if let Err(err) = validate_model_inputs(growth.base_fcf, wacc.wacc, growth.terminal_growth) {
        warn!(ticker, "pre-model validation failed: {err}");
        return Err(err);
    }

    if !as_scenario {
        let result = run_single_model(&data, &wacc, &growth, overrides);
        if let Err(err) = validate_output(
            wacc.wacc,
            growth.terminal_growth,
            result.fair_value_per_share,
            data.current_price,
        ) {
            warn!(ticker, "post-guard validation failed: {err}");
            return Err(err);
        }
        return Ok(ValuationOutcome::Single(result));
    }

    let shares = overrides.shares_override.unwrap_or(data.shares_outstanding);
    let net_debt = net_debt_for(&data, overrides.use_net_debt);
    let scenario_config = valu_valuation::ScenarioConfig::default();
    let bundle = valu_valuation::generate_scenarios(
        wacc.wacc,
        growth.terminal_growth,
        data.current_price,
        &scenario_config,
        |scenario_wacc, growth_multiplier, scenario_terminal_growth| {
            let scaled_growth = GrowthPlan {
                base_fcf: growth.base_fcf,
                per_year_growth: growth
                    .per_year_growth
                    .iter()
                    .map(|r| r * growth_multiplier)
                    .collect(),
                terminal_growth: scenario_terminal_growth,
                terminal_growth_pre_guard: scenario_terminal_growth,
                method: growth.method,
                volatility: growth.volatility,
                spread_adjusted: growth.spread_adjusted,
            };
            let input = DcfInput {
                growth: &scaled_growth,
                wacc: scenario_wacc,
                net_debt,
                shares_outstanding: shares,
                current_price: data.current_price,
            };
            dcf_valuation(&input)
        },
    );

    if let Err(err) = validate_output(
        wacc.wacc,
        growth.terminal_growth,
        bundle.base.fair_value_per_share,
        data.current_price,
    ) {
        warn!(ticker, "post-guard validation failed: {err}");
        return Err(err);
    }

    Ok(ValuationOutcome::Scenario(bundle))
}

/// Standalone 2-D WACC x terminal-growth sensitivity grid (spec §6 entry
/// point 3), run against the same single-model dispatch `value_equity`
/// would use.
pub async fn sensitivity(
    data: &FinancialData,
    wacc_grid: &[f64],
    growth_grid: &[f64],
    overrides: &Overrides,
    config: &Config,
) -> Result<Vec<Vec<Option<f64>>>, Failure> {
    validate_inputs(data)?;
    let fcf_series = compute_fcf_series(data)?;
    let base_wacc = compute_wacc(data, overrides, config).await;
    let base_growth = build_growth_plan(data, &fcf_series, base_wacc.wacc, overrides);

    let shares = overrides.shares_override.unwrap_or(data.shares_outstanding);
    let net_debt = net_debt_for(data, overrides.use_net_debt);

    let matrix = valu_valuation::sensitivity_matrix(
        wacc_grid,
        growth_grid,
        data.current_price,
        |wacc, growth| {
            let plan = GrowthPlan {
                base_fcf: base_growth.base_fcf,
                per_year_growth: base_growth.per_year_growth.clone(),
                terminal_growth: growth,
                terminal_growth_pre_guard: growth,
                method: base_growth.method,
                volatility: base_growth.volatility,
                spread_adjusted: false,
            };
            let input = DcfInput {
                growth: &plan,
                wacc,
                net_debt,
                shares_outstanding: shares,
                current_price: data.current_price,
            };
            dcf_valuation(&input).fair_value_per_share
        },
    );

    Ok(matrix)
}

/// DDM variant dispatch used by callers exercising the DDM family directly
/// rather than through `value_equity`'s DCF default.
pub fn value_via_ddm(
    data: &FinancialData,
    wacc: &WaccResult,
    growth: &GrowthPlan,
    overrides: &Overrides,
) -> f64 {
    let dividend = data.dividends_per_share.first().copied().unwrap_or(0.0);
    match overrides.ddm_variant {
        DdmVariant::Gordon => {
            let g = growth.terminal_growth.min(overrides.ddm_growth_cap).max(0.01);
            gordon(dividend, wacc.cost_of_equity, g)
        }
        DdmVariant::TwoStage => two_stage(&DdmInput {
            d0: dividend,
            cost_of_equity: wacc.cost_of_equity,
            high_growth: growth.per_year_growth.first().copied().unwrap_or(0.0),
            high_growth_years: growth.per_year_growth.len() as u32,
            terminal_growth: growth.terminal_growth,
        }),
        DdmVariant::HModel => valu_valuation::h_model(
            dividend,
            wacc.cost_of_equity,
            growth.per_year_growth.first().copied().unwrap_or(0.0),
            growth.terminal_growth,
            (growth.per_year_growth.len() as f64) / 2.0,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use valu_core::AggregatorStrategy;

    fn sample_data() -> FinancialData {
        FinancialData {
            ticker: "TEST".into(),
            providers: vec!["yahoo".into()],
            as_of: Utc::now(),
            current_price: 80.0,
            shares_outstanding: 16.0e9,
            ocf: vec![120.0e9, 110.0e9, 100.0e9],
            capex: vec![-20.0e9, -18.0e9, -15.0e9],
            cash: 50.0e9,
            total_debt: 100.0e9,
            book_value: 400.0e9,
            revenue: 300.0e9,
            ebitda: 90.0e9,
            net_income: 50.0e9,
            eps_diluted: 3.1,
            dividends_per_share: vec![1.0, 0.9],
            beta: 1.1,
            sector: "Technology".into(),
            country: "USA".into(),
            data_completeness: 0.9,
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn compute_wacc_respects_override() {
        let overrides = Overrides {
            wacc_override: Some(0.12),
            ..Overrides::default()
        };
        let result = compute_wacc(&sample_data(), &overrides, &Config::default()).await;
        assert_eq!(result.wacc, 0.12);
    }

    #[tokio::test]
    async fn compute_wacc_static_mode_ignores_treasury_probe() {
        let overrides = Overrides {
            use_dynamic_risk_free_rate: false,
            ..Overrides::default()
        };
        let config = Config::default();
        let result = compute_wacc(&sample_data(), &overrides, &config).await;
        assert_eq!(result.risk_free_rate, config.default_risk_free_rate);
        assert_eq!(result.risk_free_source, "static_default");
    }

    #[tokio::test]
    async fn compute_wacc_dynamic_mode_reads_treasury_source() {
        // No network in the test sandbox: the probe falls back to the static
        // default value but must still report it came through the dynamic path.
        let overrides = Overrides {
            use_dynamic_risk_free_rate: true,
            ..Overrides::default()
        };
        let config = Config::default();
        let result = compute_wacc(&sample_data(), &overrides, &config).await;
        assert!(result.risk_free_rate.is_finite());
    }

    #[tokio::test]
    async fn sensitivity_grid_has_correct_shape_and_nulls_on_invalid_spread() {
        let data = sample_data();
        let overrides = Overrides::default();
        let config = Config::default();
        let wacc_grid = vec![0.06, 0.08, 0.10];
        let growth_grid = vec![0.02, 0.08, 0.12];
        let matrix = sensitivity(&data, &wacc_grid, &growth_grid, &overrides, &config)
            .await
            .unwrap();
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix[0].len(), 3);
        // wacc=0.06 <= growth=0.08 and growth=0.12 must both be null.
        assert!(matrix[0][1].is_none());
        assert!(matrix[0][2].is_none());
        assert!(matrix[2][0].is_some());
    }

    #[tokio::test]
    async fn value_equity_fails_fast_when_every_adapter_fails() {
        use valu_providers::{Aggregator, DataSourceError, ProviderAdapter};

        struct AlwaysFails;
        #[async_trait::async_trait]
        impl ProviderAdapter for AlwaysFails {
            fn name(&self) -> &'static str {
                "always_fails"
            }
            fn priority(&self) -> u8 {
                1
            }
            fn confidence(&self) -> f64 {
                0.5
            }
            async fn fetch(&self, ticker: &str, _years: u32) -> Result<FinancialData, DataSourceError> {
                Err(DataSourceError::NotFound(ticker.to_string()))
            }
        }

        let aggregator = Aggregator::new(vec![Box::new(AlwaysFails)]);
        let overrides = Overrides {
            strategy: AggregatorStrategy::FirstAvailable,
            ..Overrides::default()
        };
        let result = value_equity("TEST", &aggregator, &overrides, &Config::default(), false).await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind, valu_core::FailureKind::DataUnavailable);
    }
}
