/// Failure reported by an external [`crate::PagedSource`].
///
/// These are recovered locally: the store keeps its previous state, records the error and
/// allows a retry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceError {
    /// Network or database failure.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the request (validation, rules).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The addressed item does not exist.
    #[error("item not found: {0}")]
    NotFound(String),
}

impl SourceError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
