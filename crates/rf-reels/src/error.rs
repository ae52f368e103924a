//! Error types for machine and reel construction

use thiserror::Error;

/// Construction-time error types
///
/// Per-frame paths (`update`) are deliberately infallible: unexpected numeric
/// state is handled by a defensive reset, never by propagation. A redundant
/// `spin()` while a cycle is running is not an error either — it is dropped
/// silently as an admission policy.
#[derive(Error, Debug)]
pub enum ReelError {
    /// A required visual handle could not be resolved
    #[error("appearance \"{name}\" is not registered in the asset catalog")]
    MissingAsset { name: String },

    /// Rejected configuration value
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The symbol alphabet has no entries to sample from
    #[error("symbol set contains no appearances")]
    EmptySymbolSet,
}

impl ReelError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Result type for construction-time operations
pub type ReelResult<T> = Result<T, ReelError>;
