//! The capability that talks to the cluster.
//!
//! Implementations own the wire protocol. The cluster view only ever asks for a full metadata
//! snapshot, or asks for a single topic to be looked up, which is what triggers server-side
//! auto-creation on clusters that allow it.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConnectionConfig;
use crate::metadata::MetadataSnapshot;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConnectionError {
    #[error("No seed brokers configured")]
    NoSeedBrokers,

    #[error("None of the brokers [{brokers}] could be reached")]
    Unreachable { brokers: String },

    #[error("Metadata request failed")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ConnectionError {
    pub fn request<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Request(err.into())
    }
}

#[async_trait]
pub trait MetadataSource: std::fmt::Debug + Send + Sync {
    /// Request metadata for all brokers and topics in the cluster.
    async fn fetch_metadata(
        &self,
        config: &ConnectionConfig,
    ) -> Result<MetadataSnapshot, ConnectionError>;

    /// Open a handle for `topic` and request its metadata.
    ///
    /// If the topic does not exist and the cluster allows auto-creation, this creates it. The
    /// new topic is not guaranteed to be visible, or to have partitions, when this returns.
    async fn request_topic(
        &self,
        config: &ConnectionConfig,
        topic: &str,
    ) -> Result<(), ConnectionError>;
}
