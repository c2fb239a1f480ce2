//! Run configuration for a listen session

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use aws_sdk_kinesis::types::ShardIteratorType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ListenerError, Result};

/// Upper bound the service accepts for `Limit` on a GetRecords request
pub const MAX_RECORDS_PER_REQUEST: i32 = 10_000;

/// Specifies where to start reading from in each shard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InitialPosition {
    /// Start just after the most recent record
    Latest,
    /// Start from the oldest available record
    TrimHorizon,
    /// Start at a specific sequence number
    AtSequenceNumber(String),
    /// Start right after a specific sequence number
    AfterSequenceNumber(String),
    /// Start from the first record at or after a timestamp
    AtTimestamp(DateTime<Utc>),
}

impl InitialPosition {
    pub fn iterator_type(&self) -> ShardIteratorType {
        match self {
            InitialPosition::Latest => ShardIteratorType::Latest,
            InitialPosition::TrimHorizon => ShardIteratorType::TrimHorizon,
            InitialPosition::AtSequenceNumber(_) => ShardIteratorType::AtSequenceNumber,
            InitialPosition::AfterSequenceNumber(_) => ShardIteratorType::AfterSequenceNumber,
            InitialPosition::AtTimestamp(_) => ShardIteratorType::AtTimestamp,
        }
    }

    pub fn sequence_number(&self) -> Option<&str> {
        match self {
            InitialPosition::AtSequenceNumber(seq) | InitialPosition::AfterSequenceNumber(seq) => {
                Some(seq)
            }
            _ => None,
        }
    }

    pub fn timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            InitialPosition::AtTimestamp(ts) => Some(ts),
            _ => None,
        }
    }
}

impl fmt::Display for InitialPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialPosition::Latest => write!(f, "LATEST"),
            InitialPosition::TrimHorizon => write!(f, "TRIM_HORIZON"),
            InitialPosition::AtSequenceNumber(seq) => write!(f, "AT_SEQUENCE_NUMBER:{}", seq),
            InitialPosition::AfterSequenceNumber(seq) => {
                write!(f, "AFTER_SEQUENCE_NUMBER:{}", seq)
            }
            InitialPosition::AtTimestamp(ts) => write!(f, "AT_TIMESTAMP:{}", ts.to_rfc3339()),
        }
    }
}

impl FromStr for InitialPosition {
    type Err = ListenerError;

    /// Parses `LATEST`, `TRIM_HORIZON`, `AT_SEQUENCE_NUMBER:<seq>`,
    /// `AFTER_SEQUENCE_NUMBER:<seq>` or `AT_TIMESTAMP:<rfc3339>`.
    fn from_str(s: &str) -> Result<Self> {
        let (kind, param) = match s.split_once(':') {
            Some((kind, param)) => (kind, Some(param)),
            None => (s, None),
        };

        let position = match (kind.trim().to_ascii_uppercase().as_str(), param) {
            ("LATEST", None) => InitialPosition::Latest,
            ("TRIM_HORIZON", None) => InitialPosition::TrimHorizon,
            ("AT_SEQUENCE_NUMBER", Some(seq)) => InitialPosition::AtSequenceNumber(seq.to_string()),
            ("AFTER_SEQUENCE_NUMBER", Some(seq)) => {
                InitialPosition::AfterSequenceNumber(seq.to_string())
            }
            ("AT_TIMESTAMP", Some(ts)) => {
                let ts = DateTime::parse_from_rfc3339(ts).map_err(|e| {
                    ListenerError::ConfigError(format!("invalid timestamp {:?}: {}", ts, e))
                })?;
                InitialPosition::AtTimestamp(ts.with_timezone(&Utc))
            }
            _ => {
                return Err(ListenerError::ConfigError(format!(
                    "unrecognized iterator type {:?}",
                    s
                )))
            }
        };

        Ok(position)
    }
}

/// Configuration for polling a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Time between the start of consecutive ticks. Every tick issues one
    /// GetRecords call per shard, so keep the service's per-shard read limit
    /// in mind, multiplied by the number of processes polling the stream.
    pub interval: Duration,
    /// Where each shard's iterator starts when listening begins
    pub initial_position: InitialPosition,
    /// Maximum number of records returned by one GetRecords call
    pub limit: i32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            initial_position: InitialPosition::Latest,
            limit: 1000,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(ListenerError::ConfigError(
                "interval must be greater than zero".to_string(),
            ));
        }

        if !(1..=MAX_RECORDS_PER_REQUEST).contains(&self.limit) {
            return Err(ListenerError::ConfigError(format!(
                "limit must be between 1 and {}, got {}",
                MAX_RECORDS_PER_REQUEST, self.limit
            )));
        }

        if let Some("") = self.initial_position.sequence_number() {
            return Err(ListenerError::ConfigError(
                "sequence number must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
