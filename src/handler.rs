use std::future::Future;

use async_trait::async_trait;
use aws_sdk_kinesis::types::Record;

/// Receives each batch of records read from a shard
///
/// Every batch is delivered on its own spawned task and the listener never
/// waits for it, so calls may run concurrently and complete out of order,
/// even for the same shard. An implementation that needs ordering or
/// throttling has to provide it itself.
///
/// # Examples
///
/// ```rust
/// use aws_sdk_kinesis::types::Record;
/// use kcl_listener::RecordHandler;
///
/// struct PrintHandler;
///
/// #[async_trait::async_trait]
/// impl RecordHandler for PrintHandler {
///     async fn handle_records(&self, shard_id: &str, records: Vec<Record>) -> anyhow::Result<()> {
///         for record in &records {
///             println!("{} {}", shard_id, record.sequence_number());
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait RecordHandler: Send + Sync + 'static {
    /// Handle the records one GetRecords call returned for `shard_id`. The
    /// batch may be empty. An error is logged and otherwise ignored.
    async fn handle_records(&self, shard_id: &str, records: Vec<Record>) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> RecordHandler for F
where
    F: Fn(Vec<Record>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle_records(&self, _shard_id: &str, records: Vec<Record>) -> anyhow::Result<()> {
        (self)(records).await
    }
}
