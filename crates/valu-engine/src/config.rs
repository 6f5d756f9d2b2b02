//! Process configuration, loaded from the environment the way
//! `apps/api::config::Config::from_env` does.

use std::env;
use std::time::Duration;

use valu_providers::TreasuryProbe;

#[derive(Clone)]
pub struct Config {
    pub alpha_vantage_api_key: Option<String>,
    pub fmp_api_key: Option<String>,
    pub default_risk_free_rate: f64,
    pub default_market_risk_premium: f64,
    pub aggregator_fan_out: usize,
    pub adapter_timeout: Duration,
    pub request_deadline: Duration,
    /// Maturity (years) the dynamic risk-free-rate path probes, when
    /// `Overrides::use_dynamic_risk_free_rate` is set (§4.3).
    pub treasury_maturity_years: u32,
    /// Shared, TTL-cached Treasury-yield probe backing the dynamic
    /// risk-free-rate path.
    pub treasury: TreasuryProbe,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("alpha_vantage_api_key", &self.alpha_vantage_api_key.is_some())
            .field("fmp_api_key", &self.fmp_api_key.is_some())
            .field("default_risk_free_rate", &self.default_risk_free_rate)
            .field("default_market_risk_premium", &self.default_market_risk_premium)
            .field("aggregator_fan_out", &self.aggregator_fan_out)
            .field("adapter_timeout", &self.adapter_timeout)
            .field("request_deadline", &self.request_deadline)
            .field("treasury_maturity_years", &self.treasury_maturity_years)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            alpha_vantage_api_key: env::var("ALPHA_VANTAGE_API_KEY").ok(),
            fmp_api_key: env::var("FMP_API_KEY").ok(),
            default_risk_free_rate: env::var("DEFAULT_RISK_FREE_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(valu_core::tables::DEFAULT_RISK_FREE_RATE),
            default_market_risk_premium: env::var("DEFAULT_MARKET_RISK_PREMIUM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(valu_core::tables::DEFAULT_MARKET_RISK_PREMIUM),
            aggregator_fan_out: env::var("AGGREGATOR_FAN_OUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
            adapter_timeout: Duration::from_secs(
                env::var("ADAPTER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            ),
            request_deadline: Duration::from_secs(
                env::var("REQUEST_DEADLINE_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            treasury_maturity_years: env::var("TREASURY_MATURITY_YEARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            treasury: TreasuryProbe::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            fmp_api_key: None,
            default_risk_free_rate: valu_core::tables::DEFAULT_RISK_FREE_RATE,
            default_market_risk_premium: valu_core::tables::DEFAULT_MARKET_RISK_PREMIUM,
            aggregator_fan_out: 4,
            adapter_timeout: Duration::from_secs(5),
            request_deadline: Duration::from_secs(30),
            treasury_maturity_years: 10,
            treasury: TreasuryProbe::new(),
        }
    }
}
