//! Alpha Vantage REST adapter. Alpha Vantage returns its fundamental
//! endpoints already ordered most-recent-first, so (like Yahoo) no
//! reversal is required at the boundary.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use valu_core::FinancialData;

use crate::adapter::ProviderAdapter;
use crate::error::DataSourceError;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage adapter, covering `OVERVIEW`, `CASH_FLOW`,
/// `BALANCE_SHEET`, and `INCOME_STATEMENT`.
#[derive(Debug, Clone)]
pub struct AlphaVantageAdapter {
    client: Client,
    api_key: String,
}

impl AlphaVantageAdapter {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build Alpha Vantage HTTP client");
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self, DataSourceError> {
        let api_key = std::env::var("ALPHA_VANTAGE_API_KEY")
            .map_err(|_| DataSourceError::Configuration("ALPHA_VANTAGE_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    async fn call(&self, function: &str, symbol: &str) -> Result<Value, DataSourceError> {
        debug!("alpha_vantage: {} for {}", function, symbol);
        let url = format!(
            "{BASE_URL}?function={function}&symbol={symbol}&apikey={}",
            self.api_key
        );
        let response = self.client.get(&url).send().await?;
        if response.status() == 429 {
            return Err(DataSourceError::RateLimit);
        }
        let value: Value = response.json().await?;
        if value.get("Note").is_some() {
            return Err(DataSourceError::RateLimit);
        }
        if value.get("Error Message").is_some() {
            return Err(DataSourceError::NotFound(symbol.to_string()));
        }
        Ok(value)
    }
}

fn num(v: &Value, field: &str) -> Option<f64> {
    v.get(field)
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<f64>().ok())
}

fn annual_series(reports: &Value, field: &str, years: usize) -> Vec<f64> {
    reports
        .get("annualReports")
        .and_then(Value::as_array)
        .map(|rows| rows.iter().take(years).filter_map(|r| num(r, field)).collect())
        .unwrap_or_default()
}

#[async_trait]
impl ProviderAdapter for AlphaVantageAdapter {
    fn name(&self) -> &'static str {
        "alpha_vantage"
    }

    fn priority(&self) -> u8 {
        2
    }

    fn confidence(&self) -> f64 {
        0.65
    }

    async fn fetch(&self, ticker: &str, years: u32) -> Result<FinancialData, DataSourceError> {
        let years = years.max(1) as usize;
        let overview = self.call("OVERVIEW", ticker).await?;
        let cash_flow = self.call("CASH_FLOW", ticker).await?;
        let balance_sheet = self.call("BALANCE_SHEET", ticker).await?;
        let income_statement = self.call("INCOME_STATEMENT", ticker).await?;

        let mut ocf = annual_series(&cash_flow, "operatingCashflow", years);
        let mut capex = annual_series(&cash_flow, "capitalExpenditures", years);
        let n = ocf.len().min(capex.len());
        ocf.truncate(n);
        capex.truncate(n);

        let revenue = annual_series(&income_statement, "totalRevenue", years)
            .first()
            .copied()
            .unwrap_or(0.0);
        let net_income = annual_series(&income_statement, "netIncome", years)
            .first()
            .copied()
            .unwrap_or(0.0);
        let ebitda = annual_series(&income_statement, "ebitda", years)
            .first()
            .copied()
            .unwrap_or(0.0);

        let cash = annual_series(&balance_sheet, "cashAndCashEquivalentsAtCarryingValue", years)
            .first()
            .copied()
            .unwrap_or(0.0);
        let long_term_debt = annual_series(&balance_sheet, "longTermDebt", years)
            .first()
            .copied()
            .unwrap_or(0.0);
        let short_term_debt = annual_series(&balance_sheet, "shortTermDebt", years)
            .first()
            .copied()
            .unwrap_or(0.0);
        let book_value = annual_series(&balance_sheet, "totalShareholderEquity", years)
            .first()
            .copied()
            .unwrap_or(0.0);

        Ok(FinancialData {
            ticker: ticker.to_string(),
            providers: vec![self.name().to_string()],
            as_of: Utc::now(),
            current_price: num(&overview, "AnalystTargetPrice").unwrap_or(0.0),
            shares_outstanding: num(&overview, "SharesOutstanding").unwrap_or(0.0),
            ocf,
            capex,
            cash,
            total_debt: long_term_debt + short_term_debt,
            book_value,
            revenue,
            ebitda,
            net_income,
            eps_diluted: num(&overview, "DilutedEPSTTM").unwrap_or(0.0),
            dividends_per_share: num(&overview, "DividendPerShare")
                .map(|d| vec![d])
                .unwrap_or_default(),
            beta: num(&overview, "Beta").unwrap_or(1.0),
            sector: overview
                .get("Sector")
                .and_then(Value::as_str)
                .unwrap_or("Default")
                .to_string(),
            country: overview
                .get("Country")
                .and_then(Value::as_str)
                .unwrap_or("USA")
                .to_string(),
            data_completeness: 0.0,
            confidence: 0.0,
        })
    }
}
