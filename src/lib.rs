//! Identity-stable cluster metadata cache for Apache Kafka clients.
//!
//! A [`ClusterView`] mirrors the brokers, topics and partitions of a cluster as a graph of
//! lightweight view objects. Views only store their key and read everything else from the most
//! recent metadata, so a reference taken once stays valid and current across refreshes for as
//! long as its key exists in the cluster.
//!
//! The wire protocol is not part of this crate: metadata comes from a [`MetadataSource`].
//!
//! # Example
//! ```rust,ignore
//! let cluster = ClusterView::new(vec!["localhost:9092".to_owned()], source).await?;
//!
//! let topic = cluster.topics().get_or_create("events").await?;
//! for (id, partition) in topic.partitions() {
//!     println!("{id}: leader {}", partition.leader()?);
//! }
//!
//! cluster.update().await?;
//! ```
#![deny(rustdoc::broken_intra_doc_links, rust_2018_idioms)]
#![warn(
    clippy::clone_on_ref_ptr,
    clippy::explicit_iter_loop,
    clippy::future_not_send,
    clippy::todo,
    clippy::use_self,
    unreachable_pub
)]

pub mod broker;
pub mod cluster;
pub mod config;
pub mod error;
pub mod metadata;
pub mod source;
pub mod topic;

#[cfg(test)]
mod test_utils;

pub use broker::Broker;
pub use cluster::{topic_dict::TopicDict, ClusterView, ClusterViewBuilder};
pub use config::ConnectionConfig;
pub use error::{Error, LookupContext, Result};
pub use metadata::{BrokerId, MetadataSnapshot, PartitionId};
pub use source::{ConnectionError, MetadataSource};
pub use topic::{Partition, Topic};
