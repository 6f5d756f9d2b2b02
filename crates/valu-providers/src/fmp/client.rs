//! Financial Modeling Prep adapter.
//!
//! Unlike Yahoo and Alpha Vantage, the `stable` FMP endpoints used here
//! return statements oldest-first; per §4.1 the adapter reverses the
//! series before handing it to the aggregator so the most-recent-first
//! convention holds uniformly at the aggregator boundary.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use valu_core::FinancialData;

use crate::adapter::ProviderAdapter;
use crate::error::DataSourceError;

const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

#[derive(Debug, Deserialize)]
struct IncomeStatement {
    #[serde(default)]
    revenue: f64,
    #[serde(default)]
    net_income: f64,
    #[serde(default)]
    ebitda: f64,
    #[serde(default, rename = "epsDiluted")]
    eps_diluted: f64,
}

#[derive(Debug, Deserialize)]
struct BalanceSheet {
    #[serde(default, rename = "cashAndCashEquivalents")]
    cash: f64,
    #[serde(default, rename = "totalDebt")]
    total_debt: f64,
    #[serde(default, rename = "totalStockholdersEquity")]
    book_value: f64,
}

#[derive(Debug, Deserialize)]
struct CashFlowStatement {
    #[serde(default, rename = "operatingCashFlow")]
    operating_cash_flow: f64,
    #[serde(default, rename = "capitalExpenditure")]
    capital_expenditure: f64,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    price: f64,
    #[serde(default, rename = "sharesOutstanding")]
    shares_outstanding: f64,
    #[serde(default)]
    beta: f64,
    #[serde(default)]
    sector: String,
    #[serde(default)]
    country: String,
    #[serde(default, rename = "lastDiv")]
    last_dividend: f64,
}

/// Financial Modeling Prep adapter.
#[derive(Debug, Clone)]
pub struct FmpAdapter {
    client: Client,
    api_key: String,
}

impl FmpAdapter {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self, DataSourceError> {
        let api_key = std::env::var("FMP_API_KEY")
            .map_err(|_| DataSourceError::Configuration("FMP_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.contains('?') {
            format!("{FMP_BASE_URL}/{endpoint}&apikey={}", self.api_key)
        } else {
            format!("{FMP_BASE_URL}/{endpoint}?apikey={}", self.api_key)
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<T, DataSourceError> {
        let url = self.url(endpoint);
        let response = self.client.get(&url).send().await?;
        if response.status() == 429 {
            return Err(DataSourceError::RateLimit);
        }
        if !response.status().is_success() {
            return Err(DataSourceError::SchemaMismatch(format!(
                "HTTP {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ProviderAdapter for FmpAdapter {
    fn name(&self) -> &'static str {
        "fmp"
    }

    fn priority(&self) -> u8 {
        3
    }

    fn confidence(&self) -> f64 {
        0.70
    }

    async fn fetch(&self, ticker: &str, years: u32) -> Result<FinancialData, DataSourceError> {
        let limit = years.max(1);
        let symbol = ticker.to_uppercase();

        let income: Vec<IncomeStatement> = self
            .get(&format!(
                "income-statement?symbol={symbol}&period=annual&limit={limit}"
            ))
            .await?;
        let balance: Vec<BalanceSheet> = self
            .get(&format!(
                "balance-sheet-statement?symbol={symbol}&period=annual&limit={limit}"
            ))
            .await?;
        let mut cash_flow: Vec<CashFlowStatement> = self
            .get(&format!(
                "cash-flow-statement?symbol={symbol}&period=annual&limit={limit}"
            ))
            .await?;
        let profile: Vec<Profile> = self
            .get(&format!("profile?symbol={symbol}"))
            .await?;

        // FMP's `stable` statement endpoints return oldest-first; reverse to
        // the engine's most-recent-first convention.
        cash_flow.reverse();

        if income.is_empty() || cash_flow.is_empty() {
            return Err(DataSourceError::NotFound(ticker.to_string()));
        }

        let ocf: Vec<f64> = cash_flow.iter().map(|c| c.operating_cash_flow).collect();
        let capex: Vec<f64> = cash_flow.iter().map(|c| c.capital_expenditure).collect();

        let profile = profile.into_iter().next().unwrap_or(Profile {
            price: 0.0,
            shares_outstanding: 0.0,
            beta: 1.0,
            sector: "Default".to_string(),
            country: "USA".to_string(),
            last_dividend: 0.0,
        });
        let latest_income = income.first();
        let latest_balance = balance.first();

        Ok(FinancialData {
            ticker: ticker.to_string(),
            providers: vec![self.name().to_string()],
            as_of: Utc::now(),
            current_price: profile.price,
            shares_outstanding: profile.shares_outstanding,
            ocf,
            capex,
            cash: latest_balance.map(|b| b.cash).unwrap_or(0.0),
            total_debt: latest_balance.map(|b| b.total_debt).unwrap_or(0.0),
            book_value: latest_balance.map(|b| b.book_value).unwrap_or(0.0),
            revenue: latest_income.map(|i| i.revenue).unwrap_or(0.0),
            ebitda: latest_income.map(|i| i.ebitda).unwrap_or(0.0),
            net_income: latest_income.map(|i| i.net_income).unwrap_or(0.0),
            eps_diluted: latest_income.map(|i| i.eps_diluted).unwrap_or(0.0),
            dividends_per_share: if profile.last_dividend > 0.0 {
                vec![profile.last_dividend]
            } else {
                Vec::new()
            },
            beta: if profile.beta > 0.0 { profile.beta } else { 1.0 },
            sector: if profile.sector.is_empty() {
                "Default".to_string()
            } else {
                profile.sector
            },
            country: if profile.country.is_empty() {
                "USA".to_string()
            } else {
                profile.country
            },
            data_completeness: 0.0,
            confidence: 0.0,
        })
    }
}
