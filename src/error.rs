//! Error handling types and utilities.

/// A specialized Result type for the edges of the crate (config and fixture loading, the binary).
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods where files are read.
pub type Result<T> = anyhow::Result<T>;

/// Hard failures of a ranking call.
///
/// Ambiguous locations and empty result sets are not errors; they come back as a
/// degraded [`SearchOutcome`](crate::SearchOutcome) with a suggestion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankingError {
    /// Malformed search parameters, candidate data or configuration.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl RankingError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidInput { field, .. } => field,
        }
    }
}
