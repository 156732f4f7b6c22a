//! Error taxonomy for digit analysis.
//!
//! Construction-time errors abort the insertion of a single pattern; query-time
//! errors are scoped to the lookup (or the translation chain) that raised them.
//! Running into the translation depth bound is not an error and never shows up
//! here.

/// Errors raised while parsing dial strings or applying translation rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialPlanError {
    /// Malformed wildcard syntax in a pattern or query string.
    #[error("invalid pattern '{pattern}' at offset {offset}: {reason}")]
    InvalidPattern { pattern: String, offset: usize, reason: &'static str },
    /// A rule discards pre-dot digits but its own pattern has no `.`.
    #[error("discarding pre-dot digits requires '.' in pattern '{pattern}'")]
    MissingSeparator { pattern: String },
    /// A feature the engine deliberately does not model.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(&'static str),
    /// The trie ran out of `u32` ids for its nodes or patterns.
    #[error("dial plan too large: out of {0}")]
    CapacityExceeded(&'static str),
}

impl DialPlanError {
    pub(crate) fn invalid(pattern: &str, offset: usize, reason: &'static str) -> Self {
        Self::InvalidPattern { pattern: pattern.to_string(), offset, reason }
    }
}
