//! Yahoo Finance provider adapter.

mod client;
mod models;

pub use client::YahooAdapter;
