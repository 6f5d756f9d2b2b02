//! The analytical core: FCF derivation, WACC, growth projection, the four
//! valuation model families, scenario/sensitivity analysis, and the
//! cross-cutting validator (spec §4.3-§4.7).

pub mod dcf;
pub mod ddm;
pub mod fcf;
pub mod growth;
pub mod hybrid;
pub mod multiples;
pub mod rim;
pub mod scenario;
pub mod validator;
pub mod wacc;

pub use dcf::{dcf_valuation, DcfInput};
pub use ddm::{gordon, h_model, implied_growth, two_stage, DdmInput};
pub use fcf::compute_fcf_series;
pub use growth::{derive_growth_plan, GrowthDrivers};
pub use hybrid::{bank_hybrid, pb_roe_value};
pub use multiples::{ev_to_ebitda, implied_price_from_multiple, pb_ratio, pe_ratio};
pub use rim::{rim_valuation, RimInput};
pub use scenario::{generate_scenarios, sensitivity_matrix, ScenarioConfig};
pub use validator::{validate_inputs, validate_model_inputs, validate_output};
pub use wacc::compute_wacc;
