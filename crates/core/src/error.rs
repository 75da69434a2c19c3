use std::time::Duration;

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller exhausted its request quota for the current window.
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// A third-party dependency is unavailable (circuit open or failing).
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}
