use taskfund_core::error::CoreError;

/// Failure of a repository write that checks a domain rule under a row lock.
///
/// The rule is evaluated inside the write's transaction, so the repository
/// reports either the rejected rule or the database failure.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// A domain rule rejected the write; nothing was committed.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
