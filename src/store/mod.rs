//! Iterator storage implementations for the listener

use async_trait::async_trait;

#[cfg(feature = "dynamodb-store")]
pub mod dynamodb;
pub mod memory;

/// Durable mapping from (stream, shard) to the iterator to use for the next
/// GetRecords call on that shard.
///
/// Implementations must be safe for concurrent use. Several processes may
/// share one store as long as each shard is polled by only one of them;
/// enforcing that is up to the deployment, not the store.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Retrieve the stored iterator for a shard.
    ///
    /// Returns `Ok(None)` if nothing has been stored yet. Errors are reserved
    /// for genuine storage faults.
    async fn get_position(&self, stream: &str, shard_id: &str) -> anyhow::Result<Option<String>>;

    /// Store the iterator for a shard, replacing any previous value.
    async fn set_position(&self, stream: &str, shard_id: &str, iterator: &str)
        -> anyhow::Result<()>;
}

#[async_trait]
impl<S: PositionStore + ?Sized> PositionStore for std::sync::Arc<S> {
    async fn get_position(&self, stream: &str, shard_id: &str) -> anyhow::Result<Option<String>> {
        (**self).get_position(stream, shard_id).await
    }

    async fn set_position(
        &self,
        stream: &str,
        shard_id: &str,
        iterator: &str,
    ) -> anyhow::Result<()> {
        (**self).set_position(stream, shard_id, iterator).await
    }
}

#[cfg(feature = "dynamodb-store")]
pub use dynamodb::DynamoDbPositionStore;
pub use memory::InMemoryPositionStore;
