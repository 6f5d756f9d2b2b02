//! Alpha Vantage provider adapter.

mod client;

pub use client::AlphaVantageAdapter;
