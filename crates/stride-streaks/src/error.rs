use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StreakError {
    /// The user id did not resolve to a record.
    #[error("user {0} not found")]
    NotFound(Uuid),

    /// The conditional write kept losing to concurrent updates of the same
    /// record.
    #[error("user {user_id}: streak update lost {attempts} consecutive races")]
    ConcurrentModification { user_id: Uuid, attempts: u32 },

    /// The record store failed or is unreachable. Propagated unchanged; the
    /// caller decides whether the surrounding operation retries.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
