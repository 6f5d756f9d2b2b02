//! Shared data model, error taxonomy, and static reference tables for the
//! equity valuation engine.
//!
//! This crate has no I/O and no async dependency: it is the vocabulary that
//! `valu-providers`, `valu-valuation`, and `valu-engine` all speak.

pub mod error;
pub mod model;
pub mod tables;

pub use error::{Failure, FailureKind};
pub use model::*;
