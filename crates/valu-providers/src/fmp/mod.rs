//! Financial Modeling Prep provider adapter.

mod client;

pub use client::FmpAdapter;
