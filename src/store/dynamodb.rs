use crate::store::PositionStore;
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client as DynamoClient};
use tracing::{debug, instrument, trace};

const STREAM_KEY: &str = "stream_name";
const SHARD_KEY: &str = "shard_id";
const ITERATOR_ATTRIBUTE: &str = "shard_iterator";

/// Iterator storage backed by a DynamoDB table
///
/// The table needs a string partition key `stream_name` and a string sort key
/// `shard_id`. Each item holds the current iterator in `shard_iterator`.
/// Unlike [`InMemoryPositionStore`](super::InMemoryPositionStore) it can be
/// shared by several processes that each poll a disjoint set of shards.
#[derive(Debug, Clone)]
pub struct DynamoDbPositionStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoDbPositionStore {
    pub fn builder() -> DynamoDbPositionStoreBuilder {
        DynamoDbPositionStoreBuilder::new()
    }

    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl PositionStore for DynamoDbPositionStore {
    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn get_position(&self, stream: &str, shard_id: &str) -> anyhow::Result<Option<String>> {
        trace!("Getting position from DynamoDB");

        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(STREAM_KEY, AttributeValue::S(stream.to_string()))
            .key(SHARD_KEY, AttributeValue::S(shard_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .context("Failed to get position from DynamoDB")?;

        let position = response
            .item
            .and_then(|item| item.get(ITERATOR_ATTRIBUTE).cloned())
            .and_then(|attr| attr.as_s().ok().map(|s| s.to_string()));

        debug!(found = position.is_some(), "Retrieved position from DynamoDB");

        Ok(position)
    }

    #[instrument(skip(self, iterator), fields(table = %self.table_name))]
    async fn set_position(
        &self,
        stream: &str,
        shard_id: &str,
        iterator: &str,
    ) -> anyhow::Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .item(STREAM_KEY, AttributeValue::S(stream.to_string()))
            .item(SHARD_KEY, AttributeValue::S(shard_id.to_string()))
            .item(ITERATOR_ATTRIBUTE, AttributeValue::S(iterator.to_string()))
            .send()
            .await
            .context("Failed to save position to DynamoDB")?;

        trace!("Position saved to DynamoDB");

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DynamoDbPositionStoreBuilder {
    client: Option<DynamoClient>,
    table_name: Option<String>,
}

impl DynamoDbPositionStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, client: DynamoClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn build(self) -> anyhow::Result<DynamoDbPositionStore> {
        Ok(DynamoDbPositionStore {
            client: self
                .client
                .ok_or_else(|| anyhow::anyhow!("DynamoDB client is required"))?,
            table_name: self
                .table_name
                .filter(|name| !name.is_empty())
                .ok_or_else(|| anyhow::anyhow!("Table name is required"))?,
        })
    }
}
