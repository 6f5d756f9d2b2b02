//! The common adapter interface (§4.1): every provider exposes one
//! operation, fetch a financial snapshot for a ticker, plus a static
//! priority and confidence the aggregator uses for scoring.

use async_trait::async_trait;
use valu_core::FinancialData;

use crate::error::DataSourceError;

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Human-readable source name, recorded in `FinancialData::providers`.
    fn name(&self) -> &'static str;

    /// Lower priority value wins in `first_available` ordering.
    fn priority(&self) -> u8;

    /// Static confidence in [0, 1] used by `best_quality`/`merge` scoring.
    fn confidence(&self) -> f64;

    /// Fetch a financial snapshot for `ticker` covering the last `years`
    /// fiscal years.
    async fn fetch(&self, ticker: &str, years: u32) -> Result<FinancialData, DataSourceError>;
}
