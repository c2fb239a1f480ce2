//! Stream handle and polling loop
//!
//! A [`KinesisStream`] is created once per stream: construction describes the
//! stream and fixes its shard set. Listening then:
//!
//! - seeds a fresh iterator from the configured [`InitialPosition`] for every
//!   shard, replacing anything stored by an earlier run
//! - on every tick, for each shard in turn, reads the stored iterator, fetches
//!   records with it, hands the batch to the [`RecordHandler`] on a detached
//!   task and stores the next iterator
//!
//! Any error stops the whole loop and is returned to the caller. Iterators
//! expire shortly after they are issued, so a restarted handle does not reuse
//! stored ones: it seeds again. Restart with a sequence-number position to
//! continue at a known record.
//!
//! [`InitialPosition`]: crate::config::InitialPosition

use std::sync::Arc;

use aws_sdk_kinesis::types::Record;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::{
    client::{kinesis_client, KinesisClientTrait},
    config::StreamConfig,
    error::{ListenerError, Result},
    handler::RecordHandler,
    shard::Shard,
    store::PositionStore,
};

/// A handle on one Kinesis stream
///
/// # Examples
///
/// ```rust,no_run
/// use aws_sdk_kinesis::types::Record;
/// use kcl_listener::{InMemoryPositionStore, KinesisStream, ListenerError, StreamConfig};
///
/// async fn run() -> Result<(), ListenerError> {
///     let stream = KinesisStream::connect(
///         Some("http://localhost:4566"),
///         "orders",
///         InMemoryPositionStore::new(),
///         StreamConfig::default(),
///     )
///     .await?;
///
///     stream
///         .listen(|records: Vec<Record>| async move {
///             println!("got {} records", records.len());
///             Ok::<(), anyhow::Error>(())
///         })
///         .await
/// }
/// ```
pub struct KinesisStream<C, S>
where
    C: KinesisClientTrait,
    S: PositionStore,
{
    stream_name: String,
    shards: Vec<Shard>,
    config: StreamConfig,
    client: C,
    store: S,
}

impl<S> KinesisStream<aws_sdk_kinesis::Client, S>
where
    S: PositionStore,
{
    /// Build an AWS client for `endpoint` (or the default endpoint when
    /// `None`) and create a handle on `stream_name` with it.
    pub async fn connect(
        endpoint: Option<&str>,
        stream_name: impl Into<String>,
        store: S,
        config: StreamConfig,
    ) -> Result<Self> {
        let client = kinesis_client(endpoint).await;
        Self::new(client, stream_name, store, config).await
    }
}

impl<C, S> KinesisStream<C, S>
where
    C: KinesisClientTrait,
    S: PositionStore,
{
    /// Describe `stream_name` and build a handle over its shards.
    ///
    /// Fails with [`ListenerError::DescribeFailed`] if the service call fails
    /// and with [`ListenerError::NoShards`] if the stream has no shards.
    pub async fn new(
        client: C,
        stream_name: impl Into<String>,
        store: S,
        config: StreamConfig,
    ) -> Result<Self> {
        let stream_name = stream_name.into();
        config.validate()?;

        let shards = client.describe_stream(&stream_name).await.map_err(|e| {
            error!(stream = %stream_name, error = %e, "Failed to describe stream");
            ListenerError::DescribeFailed(format!("{:#}", e))
        })?;

        if shards.is_empty() {
            error!(stream = %stream_name, "Stream has no shards");
            return Err(ListenerError::NoShards(stream_name));
        }

        info!(
            stream = %stream_name,
            shards = shards.len(),
            "Discovered shards"
        );

        Ok(Self {
            stream_name,
            shards,
            config,
            client,
            store,
        })
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// The shards discovered at construction, in polling order
    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Poll the stream until an error occurs.
    ///
    /// Seeds every shard first, then ticks every
    /// [`StreamConfig::interval`]. The first tick fires one interval after the
    /// call. A tick that overruns the interval delays the following ones; missed
    /// ticks are never replayed.
    ///
    /// There is no way to stop this loop other than an error; see
    /// [`KinesisStream::listen_with_shutdown`] for a stoppable variant.
    pub async fn listen<H: RecordHandler>(&self, handler: H) -> Result<()> {
        // Keep the sender alive for the whole call so the loop never sees shutdown.
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        self.listen_with_shutdown(handler, shutdown_rx).await
    }

    /// Like [`KinesisStream::listen`], but also returns `Ok(())` once
    /// `shutdown` becomes `true`. Shutdown is only observed between ticks. A
    /// dropped sender is treated as never shutting down.
    pub async fn listen_with_shutdown<H: RecordHandler>(
        &self,
        handler: H,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let interval = self.config.interval;
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if *shutdown.borrow() {
            info!(stream = %self.stream_name, "Shutdown requested before listening started");
            return Ok(());
        }

        self.seed_positions().await?;

        let handler = Arc::new(handler);
        let mut shutdown_open = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once(&handler).await {
                        error!(stream = %self.stream_name, error = %e, "Stopped listening");
                        return Err(e);
                    }
                }
                changed = shutdown.changed(), if shutdown_open => {
                    match changed {
                        Ok(()) if *shutdown.borrow() => {
                            info!(stream = %self.stream_name, "Shutdown signal received");
                            return Ok(());
                        }
                        Ok(()) => {}
                        Err(_) => shutdown_open = false,
                    }
                }
            }
        }
    }

    /// Request a starting iterator for every shard from the configured initial
    /// position and store it, replacing any stored iterator.
    ///
    /// Stops at the first failure. Shards seeded before it keep their new
    /// iterator.
    pub async fn seed_positions(&self) -> Result<()> {
        let position = &self.config.initial_position;
        info!(
            stream = %self.stream_name,
            position = %position,
            "Getting initial shard iterators for all shards"
        );

        for shard in &self.shards {
            let iterator = self
                .client
                .get_shard_iterator(
                    &self.stream_name,
                    &shard.id,
                    position.iterator_type(),
                    position.sequence_number(),
                    position.timestamp(),
                )
                .await
                .map_err(|e| ListenerError::IteratorRequestFailed {
                    shard_id: shard.id.clone(),
                    message: format!("{:#}", e),
                })?;

            self.store
                .set_position(&self.stream_name, &shard.id, &iterator)
                .await
                .map_err(store_unavailable)?;

            debug!(
                shard_id = %shard.id,
                iterator = %iterator,
                "Seeded shard iterator"
            );
        }

        Ok(())
    }

    /// Run one tick: poll every shard once, in order.
    ///
    /// The first failing shard aborts the tick; shards after it are not polled.
    pub async fn poll_once<H: RecordHandler>(&self, handler: &Arc<H>) -> Result<()> {
        info!(stream = %self.stream_name, "tick");

        for shard in &self.shards {
            self.poll_shard(shard, handler).await?;
        }

        Ok(())
    }

    async fn poll_shard<H: RecordHandler>(&self, shard: &Shard, handler: &Arc<H>) -> Result<()> {
        let iterator = self
            .store
            .get_position(&self.stream_name, &shard.id)
            .await
            .map_err(store_unavailable)?
            .filter(|iterator| !iterator.is_empty())
            .ok_or_else(|| ListenerError::MissingPosition(shard.id.clone()))?;

        debug!(
            shard_id = %shard.id,
            iterator = %iterator,
            "Getting records for shard"
        );

        let (records, next_iterator) = self
            .client
            .get_records(&iterator, self.config.limit)
            .await
            .map_err(|e| ListenerError::FetchFailed {
                shard_id: shard.id.clone(),
                message: format!("{:#}", e),
            })?;

        debug!(
            shard_id = %shard.id,
            count = records.len(),
            "Passing records to handler"
        );
        dispatch(handler, &shard.id, records);

        let next_iterator = next_iterator
            .filter(|next| !next.is_empty())
            .ok_or_else(|| ListenerError::ShardClosed(shard.id.clone()))?;

        // Written even for an empty batch: every GetRecords call hands out a
        // fresh iterator.
        self.store
            .set_position(&self.stream_name, &shard.id, &next_iterator)
            .await
            .map_err(store_unavailable)
    }
}

/// Hand a batch to the handler on a detached task.
fn dispatch<H: RecordHandler>(handler: &Arc<H>, shard_id: &str, records: Vec<Record>) {
    let handler = Arc::clone(handler);
    let shard_id = shard_id.to_string();

    tokio::spawn(async move {
        if let Err(e) = handler.handle_records(&shard_id, records).await {
            warn!(shard_id = %shard_id, error = %e, "Record handler failed");
        }
    });
}

fn store_unavailable(err: anyhow::Error) -> ListenerError {
    ListenerError::StoreUnavailable(format!("{:#}", err))
}
