//! Error types for the Kinesis listener

use thiserror::Error;

/// Main error type for listener operations
///
/// Every variant is fatal: the construction or listen call that hit it
/// returns it to the caller and nothing is retried internally.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Failed to describe stream: {0}")]
    DescribeFailed(String),

    #[error("Stream {0} has no shards")]
    NoShards(String),

    #[error("Failed to get initial iterator for shard {shard_id}: {message}")]
    IteratorRequestFailed { shard_id: String, message: String },

    #[error("Position store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Failed to get records for shard {shard_id}: {message}")]
    FetchFailed { shard_id: String, message: String },

    #[error("Shard {0} is closed, no next iterator was returned")]
    ShardClosed(String),

    #[error("No stored iterator for shard {0}")]
    MissingPosition(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ListenerError {
    /// The shard this error is attributed to, if any
    pub fn shard_id(&self) -> Option<&str> {
        match self {
            ListenerError::IteratorRequestFailed { shard_id, .. }
            | ListenerError::FetchFailed { shard_id, .. } => Some(shard_id),
            ListenerError::ShardClosed(shard_id) | ListenerError::MissingPosition(shard_id) => {
                Some(shard_id)
            }
            _ => None,
        }
    }

    /// Whether the error came out of the per-tick record fetch
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ListenerError::FetchFailed { .. } | ListenerError::ShardClosed(_)
        )
    }
}

/// Result type for listener operations
pub type Result<T> = std::result::Result<T, ListenerError>;
