use crate::store::PositionStore;
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

/// In-memory implementation of iterator storage
///
/// Positions live only as long as the process, so this store cannot be shared
/// between processes or survive a restart.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPositionStore {
    positions: Arc<RwLock<HashMap<(String, String), String>>>,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        debug!("Initializing in-memory position store");
        Self::default()
    }

    /// Snapshot of every stored iterator, keyed by (stream, shard).
    pub async fn positions(&self) -> HashMap<(String, String), String> {
        self.positions.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.positions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.positions.read().await.is_empty()
    }
}

#[async_trait]
impl PositionStore for InMemoryPositionStore {
    #[instrument(skip(self))]
    async fn get_position(&self, stream: &str, shard_id: &str) -> anyhow::Result<Option<String>> {
        let position = self
            .positions
            .read()
            .await
            .get(&(stream.to_string(), shard_id.to_string()))
            .cloned();

        trace!(position = ?position, "Retrieved position from memory");

        Ok(position)
    }

    #[instrument(skip(self))]
    async fn set_position(
        &self,
        stream: &str,
        shard_id: &str,
        iterator: &str,
    ) -> anyhow::Result<()> {
        self.positions.write().await.insert(
            (stream.to_string(), shard_id.to_string()),
            iterator.to_string(),
        );

        trace!("Position saved to memory");

        Ok(())
    }
}
