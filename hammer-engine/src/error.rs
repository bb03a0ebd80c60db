use hammer_core::models::BidRejection;
use thiserror::Error;

/// Failure of a read-side engine operation (`join`, snapshot).
#[derive(Debug, Error)]
pub enum EngineError<E: std::error::Error + 'static> {
    /// The auction id is not known to the store
    #[error("unknown auction")]
    NotFound,
    /// The store failed while loading the auction
    #[error("store error: {0}")]
    Store(#[source] E),
}

/// Failure of a bid submission.
#[derive(Debug, Error)]
pub enum SubmitError<E: std::error::Error + 'static> {
    /// The auction id is not known to the store
    #[error("unknown auction")]
    NotFound,
    /// The bid was evaluated and rejected; delivered to the submitter only
    #[error(transparent)]
    Rejected(#[from] BidRejection),
    /// The store failed while loading the auction
    #[error("store error: {0}")]
    Store(#[source] E),
}

impl<E: std::error::Error + 'static> From<EngineError<E>> for SubmitError<E> {
    fn from(value: EngineError<E>) -> Self {
        match value {
            EngineError::NotFound => Self::NotFound,
            EngineError::Store(e) => Self::Store(e),
        }
    }
}
