//! The Kinesis calls the listener depends on

use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kinesis::{
    types::{Record, ShardIteratorType},
    Client,
};
use aws_smithy_types_convert::date_time::DateTimeExt;
use chrono::{DateTime, Utc};
use tracing::trace;

use crate::shard::Shard;

#[async_trait]
pub trait KinesisClientTrait: Send + Sync {
    /// List every shard of the stream.
    async fn describe_stream(&self, stream_name: &str) -> Result<Vec<Shard>>;

    async fn get_shard_iterator(
        &self,
        stream_name: &str,
        shard_id: &str,
        iterator_type: ShardIteratorType,
        sequence_number: Option<&str>,
        timestamp: Option<&DateTime<Utc>>,
    ) -> Result<String>;

    /// Fetch up to `limit` records starting at `iterator`. A `None` next
    /// iterator means the shard has been closed.
    async fn get_records(&self, iterator: &str, limit: i32)
        -> Result<(Vec<Record>, Option<String>)>;
}

/// Build a Kinesis client from the default AWS configuration chain,
/// optionally pointed at a custom endpoint (e.g. a local emulator).
pub async fn kinesis_client(endpoint: Option<&str>) -> Client {
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let mut builder = aws_sdk_kinesis::config::Builder::from(&sdk_config);

    if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
        builder = builder.endpoint_url(endpoint);
    }

    Client::from_conf(builder.build())
}

#[async_trait]
impl KinesisClientTrait for Client {
    async fn describe_stream(&self, stream_name: &str) -> Result<Vec<Shard>> {
        let mut shards = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            // The service rejects a stream name alongside a pagination token.
            let request = match next_token.take() {
                Some(token) => self.list_shards().next_token(token),
                None => self.list_shards().stream_name(stream_name),
            };
            let response = request.send().await?;

            let page = response.shards.unwrap_or_default();
            trace!(stream = %stream_name, count = page.len(), "Listed page of shards");
            shards.extend(page.iter().map(Shard::from));

            match response.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(shards)
    }

    async fn get_shard_iterator(
        &self,
        stream_name: &str,
        shard_id: &str,
        iterator_type: ShardIteratorType,
        sequence_number: Option<&str>,
        timestamp: Option<&DateTime<Utc>>,
    ) -> Result<String> {
        let mut req = self
            .get_shard_iterator()
            .stream_name(stream_name)
            .shard_id(shard_id)
            .shard_iterator_type(iterator_type);

        if let Some(seq) = sequence_number {
            req = req.starting_sequence_number(seq);
        }

        if let Some(ts) = timestamp {
            req = req.timestamp(aws_smithy_types::DateTime::from_chrono_utc(*ts));
        }

        let response = req.send().await?;
        response
            .shard_iterator
            .ok_or_else(|| anyhow::anyhow!("no iterator returned for shard {}", shard_id))
    }

    async fn get_records(
        &self,
        iterator: &str,
        limit: i32,
    ) -> Result<(Vec<Record>, Option<String>)> {
        let response = self
            .get_records()
            .shard_iterator(iterator)
            .limit(limit)
            .send()
            .await?;

        Ok((
            response.records().to_vec(),
            response.next_shard_iterator().map(String::from),
        ))
    }
}
