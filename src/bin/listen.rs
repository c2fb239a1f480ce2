//! Print the sequence number of every record arriving on a Kinesis stream.
//!
//! Configured through the environment:
//!
//! - `AWS_KINESIS_STREAM`: stream to read (required)
//! - `AWS_KINESIS_ENDPOINT`: custom endpoint, e.g. a local emulator
//! - `KCL_INTERVAL_MS`: poll interval in milliseconds (default 1000)
//! - `KCL_LIMIT`: maximum records per request (default 1000)
//! - `KCL_ITERATOR_TYPE`: starting position, e.g. `LATEST` or `AT_SEQUENCE_NUMBER:<seq>`

use std::time::Duration;

use anyhow::Context;
use aws_sdk_kinesis::types::Record;
use kcl_listener::{InMemoryPositionStore, InitialPosition, KinesisStream, StreamConfig};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn config_from_env() -> anyhow::Result<StreamConfig> {
    let mut config = StreamConfig::default();

    if let Ok(interval) = std::env::var("KCL_INTERVAL_MS") {
        let millis: u64 = interval.parse().context("KCL_INTERVAL_MS must be an integer")?;
        config.interval = Duration::from_millis(millis);
    }
    if let Ok(limit) = std::env::var("KCL_LIMIT") {
        config.limit = limit.parse().context("KCL_LIMIT must be an integer")?;
    }
    if let Ok(position) = std::env::var("KCL_ITERATOR_TYPE") {
        config.initial_position = position.parse::<InitialPosition>()?;
    }

    Ok(config)
}

async fn print_records(records: Vec<Record>) -> anyhow::Result<()> {
    for record in &records {
        println!("{}", record.sequence_number());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let stream_name =
        std::env::var("AWS_KINESIS_STREAM").context("AWS_KINESIS_STREAM is not set")?;
    let endpoint = std::env::var("AWS_KINESIS_ENDPOINT").ok();
    let config = config_from_env()?;

    let stream = KinesisStream::connect(
        endpoint.as_deref(),
        stream_name,
        InMemoryPositionStore::new(),
        config,
    )
    .await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping after the current tick");
            let _ = shutdown_tx.send(true);
        }
    });

    stream.listen_with_shutdown(print_records, shutdown_rx).await?;
    Ok(())
}
