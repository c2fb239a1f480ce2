use std::sync::Once;
use std::time::Duration;

use crate::config::{InitialPosition, StreamConfig};
use crate::shard::Shard;
use crate::test::mocks::MockKinesisClient;
use crate::test::TestUtils;

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

pub fn create_test_config() -> StreamConfig {
    StreamConfig {
        interval: Duration::from_millis(10),
        initial_position: InitialPosition::Latest,
        limit: 100,
    }
}

pub fn test_shards(count: usize) -> Vec<Shard> {
    (0..count)
        .map(|i| TestUtils::create_test_shard(&format!("shard-{}", i)))
        .collect()
}

/// A client describing `count` shards whose seeded iterators are `it-<n>a`.
pub async fn client_with_shards(count: usize) -> MockKinesisClient {
    let client = MockKinesisClient::new();
    client.mock_describe_stream(Ok(test_shards(count))).await;
    for i in 0..count {
        client.mock_get_iterator(Ok(format!("it-{}a", i))).await;
    }
    client
}
