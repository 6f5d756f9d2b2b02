//! The caller-supplied `overrides` record (spec §6): every knob a
//! `value_equity` caller may set to deviate from the engine's defaults.

use valu_core::{AggregatorStrategy, BankMethod, DdmVariant};

#[derive(Debug, Clone)]
pub struct Overrides {
    pub wacc_override: Option<f64>,
    pub terminal_growth_override: Option<f64>,
    pub projection_growth_overrides: Option<Vec<f64>>,
    pub shares_override: Option<f64>,
    pub fcf_base_override: Option<f64>,
    pub apply_blume: bool,
    pub apply_hamada_target_de: Option<f64>,
    pub use_dynamic_risk_free_rate: bool,
    pub country_code: String,
    pub use_net_debt: bool,
    pub strategy: AggregatorStrategy,
    pub ddm_variant: DdmVariant,
    pub bank_method: BankMethod,
    /// Gordon-model growth ceiling (spec §9 open question 1); defaults to 5%.
    pub ddm_growth_cap: f64,
    pub horizon_years: usize,
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            wacc_override: None,
            terminal_growth_override: None,
            projection_growth_overrides: None,
            shares_override: None,
            fcf_base_override: None,
            apply_blume: true,
            apply_hamada_target_de: None,
            use_dynamic_risk_free_rate: false,
            country_code: "USA".to_string(),
            use_net_debt: false,
            strategy: AggregatorStrategy::FirstAvailable,
            ddm_variant: DdmVariant::Gordon,
            bank_method: BankMethod::Hybrid,
            ddm_growth_cap: 0.05,
            horizon_years: 5,
        }
    }
}
