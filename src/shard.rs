use serde::{Deserialize, Serialize};

/// A shard of a Kinesis stream, as reported when the stream was described
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    /// Identifier of the shard, unique within its stream
    pub id: String,
    /// Lowest sequence number ever assigned on the shard. Informational only,
    /// reading always starts from the stored iterator.
    pub start_at: String,
}

impl Shard {
    pub fn new(id: impl Into<String>, start_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start_at: start_at.into(),
        }
    }
}

impl From<&aws_sdk_kinesis::types::Shard> for Shard {
    fn from(shard: &aws_sdk_kinesis::types::Shard) -> Self {
        let start_at = shard
            .sequence_number_range()
            .map(|range| range.starting_sequence_number().to_string())
            .unwrap_or_default();

        Self {
            id: shard.shard_id().to_string(),
            start_at,
        }
    }
}
