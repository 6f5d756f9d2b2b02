//! Provider adapters and the Data Aggregator (spec §4.1, §4.2).
//!
//! Each adapter normalizes one upstream source into the canonical
//! `valu_core::FinancialData` envelope; the `Aggregator` combines them
//! under a caller-selected strategy.

pub mod adapter;
pub mod aggregator;
pub mod alpha_vantage;
pub mod error;
pub mod fmp;
pub mod treasury;
pub mod yahoo;

pub use adapter::ProviderAdapter;
pub use aggregator::Aggregator;
pub use alpha_vantage::AlphaVantageAdapter;
pub use error::DataSourceError;
pub use fmp::FmpAdapter;
pub use treasury::TreasuryProbe;
pub use yahoo::YahooAdapter;
