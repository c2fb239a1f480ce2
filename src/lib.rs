//! KCL Listener - a minimal polling consumer for AWS Kinesis streams
//!
//! This crate discovers the shards of a stream, seeds a starting iterator for
//! each one, then polls every shard on a fixed interval. Records are passed to
//! a user-supplied handler and the next iterator of every shard is persisted in
//! a pluggable [`PositionStore`], which several processes owning disjoint
//! shards can share.

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod shard;
pub mod store;
pub mod stream;

// Make test utilities available for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test;
#[cfg(test)]
mod tests;

pub use config::{InitialPosition, StreamConfig};
pub use error::{ListenerError, Result};
pub use shard::Shard;
pub use stream::KinesisStream;

// Re-export main traits
pub use crate::client::KinesisClientTrait;
pub use crate::handler::RecordHandler;
pub use crate::store::PositionStore;

// Re-export implementations
pub use crate::store::memory::InMemoryPositionStore;

#[cfg(feature = "dynamodb-store")]
pub use crate::store::dynamodb::DynamoDbPositionStore;
