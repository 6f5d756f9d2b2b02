//! The Data Aggregator (§4.2): combines provider adapters under a caller
//! strategy and emits a single best `FinancialData` plus a quality score.

use std::time::Duration;
use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::warn;
use valu_core::{AggregatorStrategy, FinancialData};

use crate::adapter::ProviderAdapter;
use crate::error::DataSourceError;

/// Maximum concurrent adapter calls for `best_quality`/`merge` (§4.2 recommended <= 4).
pub const DEFAULT_FAN_OUT: usize = 4;
/// Per-adapter timeout (§4.2 recommended 5s).
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(5);

/// Fields whose non-null, range-sane presence counts toward
/// `data_completeness` (§4.2 "designated required set").
const REQUIRED_FIELD_COUNT: f64 = 8.0;

fn score_completeness(fd: &FinancialData) -> f64 {
    let mut present = 0.0;
    if fd.shares_outstanding > 0.0 {
        present += 1.0;
    }
    if fd.current_price > 0.0 {
        present += 1.0;
    }
    if !fd.ocf.is_empty() {
        present += 1.0;
    }
    if fd.ocf.len() == fd.capex.len() && !fd.capex.is_empty() {
        present += 1.0;
    }
    if fd.revenue > 0.0 {
        present += 1.0;
    }
    if fd.book_value > 0.0 {
        present += 1.0;
    }
    if fd.beta > 0.0 {
        present += 1.0;
    }
    if !fd.sector.is_empty() {
        present += 1.0;
    }
    present / REQUIRED_FIELD_COUNT
}

fn quality_score(data_completeness: f64, provider_confidence: f64) -> f64 {
    data_completeness * 0.6 + provider_confidence * 0.4
}

/// Combines provider adapters under one of the three §4.2 strategies.
pub struct Aggregator {
    adapters: Vec<Box<dyn ProviderAdapter>>,
    fan_out: usize,
    adapter_timeout: Duration,
}

impl Aggregator {
    #[must_use]
    pub fn new(adapters: Vec<Box<dyn ProviderAdapter>>) -> Self {
        Self {
            adapters,
            fan_out: DEFAULT_FAN_OUT,
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    #[must_use]
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    /// Obtain the best snapshot for `ticker` using `strategy`.
    pub async fn fetch(
        &self,
        ticker: &str,
        years: u32,
        strategy: AggregatorStrategy,
    ) -> Result<(FinancialData, f64), DataSourceError> {
        match strategy {
            AggregatorStrategy::FirstAvailable => self.fetch_first_available(ticker, years).await,
            AggregatorStrategy::BestQuality => self.fetch_best_quality(ticker, years).await,
            AggregatorStrategy::Merge => self.fetch_merge(ticker, years).await,
        }
    }

    async fn fetch_first_available(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<(FinancialData, f64), DataSourceError> {
        let mut ordered: Vec<&Box<dyn ProviderAdapter>> = self.adapters.iter().collect();
        ordered.sort_by_key(|a| a.priority());

        let mut last_err = DataSourceError::NotFound(ticker.to_string());
        for adapter in ordered {
            match adapter.fetch(ticker, years).await {
                Ok(mut fd) => {
                    let completeness = score_completeness(&fd);
                    fd.data_completeness = completeness;
                    fd.confidence = adapter.confidence();
                    let score = quality_score(completeness, adapter.confidence());
                    return Ok((fd, score));
                }
                Err(err) => {
                    warn!("{}: first_available skip ({err})", adapter.name());
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    /// Fan out to every adapter concurrently under a bounded fan-out and
    /// per-adapter timeout, returning every successful `(FinancialData,
    /// score)` pair along with the provider's name.
    async fn fan_out_scored(
        &self,
        ticker: &str,
        years: u32,
    ) -> Vec<(String, FinancialData, f64)> {
        let semaphore = Semaphore::new(self.fan_out);

        let tasks = self.adapters.iter().map(|adapter| {
            let ticker = ticker.to_string();
            let adapter_timeout = self.adapter_timeout;
            let semaphore = &semaphore;
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore not closed");
                let name = adapter.name();
                match timeout(adapter_timeout, adapter.fetch(&ticker, years)).await {
                    Ok(Ok(mut fd)) => {
                        let completeness = score_completeness(&fd);
                        fd.data_completeness = completeness;
                        fd.confidence = adapter.confidence();
                        let score = quality_score(completeness, adapter.confidence());
                        Some((name.to_string(), fd, score))
                    }
                    Ok(Err(err)) => {
                        warn!("{name}: fetch failed ({err})");
                        None
                    }
                    Err(_) => {
                        warn!("{name}: timed out after {adapter_timeout:?}");
                        None
                    }
                }
            }
        });

        join_all(tasks).await.into_iter().flatten().collect()
    }

    async fn fetch_best_quality(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<(FinancialData, f64), DataSourceError> {
        let results = self.fan_out_scored(ticker, years).await;
        results
            .into_iter()
            .max_by(|(_, _, a), (_, _, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, fd, score)| (fd, score))
            .ok_or_else(|| DataSourceError::NotFound(ticker.to_string()))
    }

    async fn fetch_merge(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<(FinancialData, f64), DataSourceError> {
        let mut results = self.fan_out_scored(ticker, years).await;
        if results.is_empty() {
            return Err(DataSourceError::NotFound(ticker.to_string()));
        }
        // Highest score first: each field takes the value from the
        // highest-scoring source that has it.
        results.sort_by(|(_, _, a), (_, _, b)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let mut merged = results[0].1.clone();
        let mut contributors = vec![results[0].0.clone()];
        let best_score = results[0].2;

        for (name, fd, _) in &results[1..] {
            let mut contributed = false;
            if merged.shares_outstanding <= 0.0 && fd.shares_outstanding > 0.0 {
                merged.shares_outstanding = fd.shares_outstanding;
                contributed = true;
            }
            if merged.current_price <= 0.0 && fd.current_price > 0.0 {
                merged.current_price = fd.current_price;
                contributed = true;
            }
            if merged.ocf.is_empty() && !fd.ocf.is_empty() {
                merged.ocf = fd.ocf.clone();
                merged.capex = fd.capex.clone();
                contributed = true;
            }
            if merged.cash <= 0.0 && fd.cash > 0.0 {
                merged.cash = fd.cash;
                contributed = true;
            }
            if merged.total_debt <= 0.0 && fd.total_debt > 0.0 {
                merged.total_debt = fd.total_debt;
                contributed = true;
            }
            if merged.book_value <= 0.0 && fd.book_value > 0.0 {
                merged.book_value = fd.book_value;
                contributed = true;
            }
            if merged.revenue <= 0.0 && fd.revenue > 0.0 {
                merged.revenue = fd.revenue;
                contributed = true;
            }
            if merged.ebitda <= 0.0 && fd.ebitda > 0.0 {
                merged.ebitda = fd.ebitda;
                contributed = true;
            }
            if merged.net_income == 0.0 && fd.net_income != 0.0 {
                merged.net_income = fd.net_income;
                contributed = true;
            }
            if merged.eps_diluted == 0.0 && fd.eps_diluted != 0.0 {
                merged.eps_diluted = fd.eps_diluted;
                contributed = true;
            }
            if merged.dividends_per_share.is_empty() && !fd.dividends_per_share.is_empty() {
                merged.dividends_per_share = fd.dividends_per_share.clone();
                contributed = true;
            }
            if merged.beta <= 0.0 && fd.beta > 0.0 {
                merged.beta = fd.beta;
                contributed = true;
            }
            if (merged.sector.is_empty() || merged.sector == "Default")
                && !fd.sector.is_empty()
                && fd.sector != "Default"
            {
                merged.sector = fd.sector.clone();
                contributed = true;
            }
            if contributed {
                contributors.push(name.clone());
            }
        }

        merged.providers = contributors;
        merged.data_completeness = score_completeness(&merged);
        let merged_score = best_score.max(quality_score(merged.data_completeness, merged.confidence));
        Ok((merged, merged_score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;

    struct FakeAdapter {
        name: &'static str,
        priority: u8,
        confidence: f64,
        outcome: Result<FinancialData, &'static str>,
    }

    fn sample_fd(providers: &str) -> FinancialData {
        FinancialData {
            ticker: "TEST".into(),
            providers: vec![providers.into()],
            as_of: Utc::now(),
            current_price: 100.0,
            shares_outstanding: 10.0,
            ocf: vec![10.0, 9.0],
            capex: vec![2.0, 2.0],
            cash: 5.0,
            total_debt: 20.0,
            book_value: 50.0,
            revenue: 80.0,
            ebitda: 30.0,
            net_income: 15.0,
            eps_diluted: 1.5,
            dividends_per_share: vec![0.5],
            beta: 1.1,
            sector: "Technology".into(),
            country: "USA".into(),
            data_completeness: 0.0,
            confidence: 0.0,
        }
    }

    #[async_trait]
    impl ProviderAdapter for FakeAdapter {
        fn name(&self) -> &'static str {
            self.name
        }
        fn priority(&self) -> u8 {
            self.priority
        }
        fn confidence(&self) -> f64 {
            self.confidence
        }
        async fn fetch(&self, _ticker: &str, _years: u32) -> Result<FinancialData, DataSourceError> {
            self.outcome
                .clone()
                .map_err(|e| DataSourceError::NotFound(e.to_string()))
        }
    }

    impl Clone for FakeAdapter {
        fn clone(&self) -> Self {
            Self {
                name: self.name,
                priority: self.priority,
                confidence: self.confidence,
                outcome: self.outcome.clone(),
            }
        }
    }

    #[tokio::test]
    async fn first_available_returns_first_success_in_priority_order() {
        let aggregator = Aggregator::new(vec![
            Box::new(FakeAdapter {
                name: "a",
                priority: 2,
                confidence: 0.5,
                outcome: Err("down"),
            }),
            Box::new(FakeAdapter {
                name: "b",
                priority: 1,
                confidence: 0.9,
                outcome: Ok(sample_fd("b")),
            }),
        ]);
        let (fd, _) = aggregator
            .fetch("TEST", 5, AggregatorStrategy::FirstAvailable)
            .await
            .unwrap();
        assert_eq!(fd.providers, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn best_quality_picks_the_max_scoring_source() {
        let aggregator = Aggregator::new(vec![
            Box::new(FakeAdapter {
                name: "low",
                priority: 1,
                confidence: 0.2,
                outcome: Ok(sample_fd("low")),
            }),
            Box::new(FakeAdapter {
                name: "high",
                priority: 2,
                confidence: 0.95,
                outcome: Ok(sample_fd("high")),
            }),
        ]);
        let (fd, _) = aggregator
            .fetch("TEST", 5, AggregatorStrategy::BestQuality)
            .await
            .unwrap();
        assert_eq!(fd.providers, vec!["high".to_string()]);
    }

    #[tokio::test]
    async fn every_adapter_failing_returns_error() {
        let aggregator = Aggregator::new(vec![Box::new(FakeAdapter {
            name: "a",
            priority: 1,
            confidence: 0.5,
            outcome: Err("down"),
        })]);
        let result = aggregator
            .fetch("TEST", 5, AggregatorStrategy::FirstAvailable)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn merge_combines_contributing_sources() {
        let mut partial = sample_fd("partial");
        partial.ocf = Vec::new();
        partial.capex = Vec::new();
        let mut full = sample_fd("full");
        full.confidence = 0.0;

        let aggregator = Aggregator::new(vec![
            Box::new(FakeAdapter {
                name: "partial",
                priority: 1,
                confidence: 0.9,
                outcome: Ok(partial),
            }),
            Box::new(FakeAdapter {
                name: "full",
                priority: 2,
                confidence: 0.5,
                outcome: Ok(full),
            }),
        ]);
        let (fd, _) = aggregator
            .fetch("TEST", 5, AggregatorStrategy::Merge)
            .await
            .unwrap();
        assert!(!fd.ocf.is_empty());
        assert!(fd.providers.len() >= 1);
    }
}
