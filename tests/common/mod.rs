// tests/common/mod.rs
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_kinesis::types::{Record, ShardIteratorType};
use chrono::{DateTime, Utc};
use kcl_listener::{KinesisClientTrait, RecordHandler, Shard, StreamConfig};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::sync::Mutex;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("kcl_listener=debug".parse().unwrap()),
            )
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn create_record(sequence_number: &str) -> Record {
    Record::builder()
        .sequence_number(sequence_number)
        .data(aws_smithy_types::Blob::new(sequence_number.as_bytes().to_vec()))
        .partition_key("test-partition-key")
        .build()
        .expect("Failed to build test record")
}

pub fn create_records(prefix: &str, count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| create_record(&format!("{}-{}", prefix, i)))
        .collect()
}

pub fn create_test_config(interval: Duration) -> StreamConfig {
    StreamConfig {
        interval,
        initial_position: kcl_listener::InitialPosition::Latest,
        limit: 100,
    }
}

type RecordsResponse = Result<(Vec<Record>, Option<String>)>;

/// A stand-in for the Kinesis service: fixed shards, one queued iterator per
/// shard and GetRecords answers keyed by the iterator they are requested with.
#[derive(Debug, Default, Clone)]
pub struct ScriptedKinesis {
    shards: Vec<Shard>,
    iterators: Arc<Mutex<HashMap<String, VecDeque<String>>>>,
    records: Arc<Mutex<HashMap<String, RecordsResponse>>>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl ScriptedKinesis {
    pub fn new(shard_ids: &[&str]) -> Self {
        Self {
            shards: shard_ids.iter().map(|id| Shard::new(*id, "0")).collect(),
            ..Default::default()
        }
    }

    pub async fn iterator(&self, shard_id: &str, iterator: &str) -> &Self {
        self.iterators
            .lock()
            .await
            .entry(shard_id.to_string())
            .or_default()
            .push_back(iterator.to_string());
        self
    }

    pub async fn records(&self, iterator: &str, response: RecordsResponse) -> &Self {
        self.records
            .lock()
            .await
            .insert(iterator.to_string(), response);
        self
    }

    pub async fn fetched(&self) -> Vec<String> {
        self.fetched.lock().await.clone()
    }
}

#[async_trait]
impl KinesisClientTrait for ScriptedKinesis {
    async fn describe_stream(&self, _stream_name: &str) -> Result<Vec<Shard>> {
        Ok(self.shards.clone())
    }

    async fn get_shard_iterator(
        &self,
        _stream_name: &str,
        shard_id: &str,
        _iterator_type: ShardIteratorType,
        _sequence_number: Option<&str>,
        _timestamp: Option<&DateTime<Utc>>,
    ) -> Result<String> {
        self.iterators
            .lock()
            .await
            .get_mut(shard_id)
            .and_then(|queue| queue.pop_front())
            .ok_or_else(|| anyhow::anyhow!("no iterator scripted for {}", shard_id))
    }

    async fn get_records(
        &self,
        iterator: &str,
        _limit: i32,
    ) -> Result<(Vec<Record>, Option<String>)> {
        self.fetched.lock().await.push(iterator.to_string());
        self.records
            .lock()
            .await
            .remove(iterator)
            .unwrap_or_else(|| Ok((vec![], Some(iterator.to_string()))))
    }
}

/// Collects every batch handed to it
#[derive(Debug, Default, Clone)]
pub struct CollectingHandler {
    batches: Arc<Mutex<Vec<(String, Vec<Record>)>>>,
}

impl CollectingHandler {
    pub async fn batches(&self) -> Vec<(String, Vec<Record>)> {
        self.batches.lock().await.clone()
    }

    pub async fn wait_for_batches(&self, expected: usize, timeout: Duration) -> Result<()> {
        let start = std::time::Instant::now();
        while self.batches.lock().await.len() < expected {
            if start.elapsed() > timeout {
                anyhow::bail!("Timeout waiting for {} batches", expected);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordHandler for CollectingHandler {
    async fn handle_records(&self, shard_id: &str, records: Vec<Record>) -> Result<()> {
        self.batches
            .lock()
            .await
            .push((shard_id.to_string(), records));
        Ok(())
    }
}
