//! Error types surfaced by the core crate.

use thiserror::Error;

/// Failures that callers are expected to match on.
///
/// Per-line parsing never fails; unrecognised text is simply not an event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FishwatchError {
    /// A locale name or code outside the supported set.
    #[error("unsupported locale '{0}'")]
    UnsupportedLocale(String),
    /// Configuration values that cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
