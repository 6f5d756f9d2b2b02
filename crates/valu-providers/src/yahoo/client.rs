//! Yahoo Finance adapter: the §4.1 "Yahoo-style source" whose OCF/CAPEX
//! series is already ordered most-recent-first, so no reversal is needed
//! at the aggregator boundary.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use valu_core::FinancialData;

use super::models::{raw_f64, series_f64, str_field, QuoteSummaryEnvelope};
use crate::adapter::ProviderAdapter;
use crate::error::DataSourceError;

const QUOTE_SUMMARY_API: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const MODULES: &str = "incomeStatementHistory,balanceSheetHistory,cashflowStatementHistory,\
    summaryDetail,defaultKeyStatistics,assetProfile,financialData,price";

/// Yahoo Finance `quoteSummary` adapter.
#[derive(Debug, Clone)]
pub struct YahooAdapter {
    client: Client,
}

impl YahooAdapter {
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; valu-engine/1.0)")
            .build()
            .expect("failed to build Yahoo HTTP client");
        Self { client }
    }
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn priority(&self) -> u8 {
        1
    }

    fn confidence(&self) -> f64 {
        0.75
    }

    async fn fetch(&self, ticker: &str, years: u32) -> Result<FinancialData, DataSourceError> {
        debug!("yahoo: fetching quoteSummary for {}", ticker);
        let url = format!("{QUOTE_SUMMARY_API}/{ticker}?modules={MODULES}");
        let response = self.client.get(&url).send().await?;

        if response.status() == 429 {
            warn!("yahoo: rate limited");
            return Err(DataSourceError::RateLimit);
        }
        if response.status() == 404 {
            return Err(DataSourceError::NotFound(ticker.to_string()));
        }

        let envelope: QuoteSummaryEnvelope = response.json().await?;
        if let Some(err) = envelope.quote_summary.error {
            return Err(DataSourceError::SchemaMismatch(err.to_string()));
        }
        let result = envelope
            .quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| DataSourceError::NotFound(ticker.to_string()))?;

        let take_years = years.max(1) as usize;
        let mut ocf = series_f64(
            &result,
            "cashflowStatementHistory.cashflowStatements",
            "totalCashFromOperatingActivities",
        );
        let mut capex = series_f64(
            &result,
            "cashflowStatementHistory.cashflowStatements",
            "capitalExpenditures",
        );
        let n = ocf.len().min(capex.len()).min(take_years);
        ocf.truncate(n);
        capex.truncate(n);

        let revenue = series_f64(
            &result,
            "incomeStatementHistory.incomeStatementHistory",
            "totalRevenue",
        )
        .first()
        .copied()
        .unwrap_or(0.0);
        let net_income = series_f64(
            &result,
            "incomeStatementHistory.incomeStatementHistory",
            "netIncome",
        )
        .first()
        .copied()
        .unwrap_or(0.0);

        let dividends_per_share = raw_f64(&result, "summaryDetail.trailingAnnualDividendRate")
            .map(|d| vec![d])
            .unwrap_or_default();

        Ok(FinancialData {
            ticker: ticker.to_string(),
            providers: vec![self.name().to_string()],
            as_of: Utc::now(),
            current_price: raw_f64(&result, "price.regularMarketPrice").unwrap_or(0.0),
            shares_outstanding: raw_f64(&result, "defaultKeyStatistics.sharesOutstanding")
                .unwrap_or(0.0),
            ocf,
            capex,
            cash: raw_f64(&result, "financialData.totalCash").unwrap_or(0.0),
            total_debt: raw_f64(&result, "financialData.totalDebt").unwrap_or(0.0),
            book_value: raw_f64(
                &result,
                "balanceSheetHistory.balanceSheetStatements.0.totalStockholderEquity",
            )
            .unwrap_or(0.0),
            revenue,
            ebitda: raw_f64(&result, "financialData.ebitda").unwrap_or(0.0),
            net_income,
            eps_diluted: raw_f64(&result, "defaultKeyStatistics.trailingEps").unwrap_or(0.0),
            dividends_per_share,
            beta: raw_f64(&result, "defaultKeyStatistics.beta").unwrap_or(1.0),
            sector: str_field(&result, "assetProfile.sector")
                .unwrap_or("Default")
                .to_string(),
            country: str_field(&result, "assetProfile.country")
                .unwrap_or("USA")
                .to_string(),
            data_completeness: 0.0,
            confidence: 0.0,
        })
    }
}
