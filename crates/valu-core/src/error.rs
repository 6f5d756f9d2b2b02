//! The cross-cutting `Failure` taxonomy (spec §7).
//!
//! Every component surfaces errors as this single tagged-sum type so they
//! cross crate and process boundaries uniformly instead of as ad hoc
//! exceptional control flow.

use thiserror::Error;

/// The five kinds of failure the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No provider returned usable data for the ticker. Fatal for the request.
    DataUnavailable,
    /// An input violated a precondition (e.g. `WACC <= g`). Fatal; names the offending field.
    ValidationFailed,
    /// A computation would divide by a near-zero denominator or overflow.
    /// Fatal for that cell/scenario; sensitivity matrices report it as a null cell instead.
    NumericalDegenerate,
    /// Non-fatal: an input was clamped or redirected (growth cap, spread guard,
    /// sector floor, financial-services redirect).
    PolicyAdjustment,
    /// Non-fatal at the aggregator level; fatal only if every adapter fails.
    ProviderError,
}

impl FailureKind {
    /// Whether this kind aborts the request that produced it.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::DataUnavailable | Self::ValidationFailed | Self::NumericalDegenerate
        )
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::DataUnavailable => "DATA_UNAVAILABLE",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::NumericalDegenerate => "NUMERICAL_DEGENERATE",
            Self::PolicyAdjustment => "POLICY_ADJUSTMENT",
            Self::ProviderError => "PROVIDER_ERROR",
        };
        f.write_str(s)
    }
}

/// A structured failure: kind, message, the offending field (if any), and
/// whatever non-fatal warnings had already accumulated when it was raised.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub field: Option<String>,
    pub warnings: Vec<String>,
}

impl Failure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    #[must_use]
    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self::new(FailureKind::DataUnavailable, message)
    }

    #[must_use]
    pub fn validation_failed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FailureKind::ValidationFailed, message).with_field(field)
    }

    #[must_use]
    pub fn numerical_degenerate(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NumericalDegenerate, message)
    }

    #[must_use]
    pub fn policy_adjustment(message: impl Into<String>) -> Self {
        Self::new(FailureKind::PolicyAdjustment, message)
    }

    #[must_use]
    pub fn provider_error(message: impl Into<String>) -> Self {
        Self::new(FailureKind::ProviderError, message)
    }
}

pub type Result<T> = std::result::Result<T, Failure>;
