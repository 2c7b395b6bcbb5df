use thiserror::Error;

use crate::metadata::{BrokerId, PartitionId};
use crate::source::ConnectionError;

/// Names the view whose backing key could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupContext {
    /// The owning cluster view has been dropped.
    Cluster,
    Broker(BrokerId),
    Topic(String),
    Partition { topic: String, partition: PartitionId },
}

impl std::fmt::Display for LookupContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const MISSING: &str = "not present in current cluster metadata";
        match self {
            Self::Cluster => write!(f, "Cluster view has been dropped"),
            Self::Broker(id) => write!(f, "Cannot resolve broker {id}: {MISSING}"),
            Self::Topic(name) => write!(f, "Cannot resolve topic '{name}': {MISSING}"),
            Self::Partition { topic, partition } => write!(
                f,
                "Cannot resolve partition {partition} of topic '{topic}': {MISSING}"
            ),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Auto-creation was requested but the topic never showed up with partitions.
    ///
    /// This does not mean the topic is confirmed absent: the cluster may have
    /// auto-creation disabled, or it may still be propagating the new topic.
    #[error("Topic '{0}' not found after requesting its creation")]
    TopicNotFound(String),

    #[error("{0}")]
    Lookup(LookupContext),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("Invalid configuration for '{key}': {reason}")]
    Config { key: String, reason: String },
}

impl Error {
    pub(crate) fn config(key: &str, reason: impl Into<String>) -> Self {
        Self::Config {
            key: key.to_owned(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
