//! Cluster-wide metadata as returned by a single metadata request.
//!
//! A [`MetadataSnapshot`] is built once per fetch and never mutated afterwards. The cluster view
//! keeps exactly one current snapshot and swaps it wholesale on every refresh.

use std::collections::BTreeMap;

pub type BrokerId = i32;
pub type PartitionId = i32;

/// Metadata for a certain broker.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MetadataBroker {
    /// The broker ID
    pub node_id: BrokerId,

    /// The broker hostname
    pub host: String,

    /// The broker port
    pub port: i32,

    /// The rack of the broker, or null if it has not been assigned to a rack.
    pub rack: Option<String>,
}

/// Metadata for a certain topic.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MetadataTopic {
    /// The topic name
    pub name: String,

    /// True if the topic is internal
    pub is_internal: Option<bool>,

    /// Each partition in the topic
    pub partitions: Vec<MetadataPartition>,
}

/// Metadata for a certain partition.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MetadataPartition {
    /// The partition index
    pub partition_index: PartitionId,

    /// The ID of the leader broker, `-1` if there is none
    pub leader_id: BrokerId,

    /// The set of all nodes that host this partition, in preference order
    pub replica_nodes: Vec<BrokerId>,

    /// The set of all nodes that are in sync with the leader for this partition
    pub isr_nodes: Vec<BrokerId>,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct TopicMetadata {
    pub is_internal: bool,
    pub partitions: BTreeMap<PartitionId, MetadataPartition>,
}

/// Point-in-time description of the cluster topology, indexed by key.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct MetadataSnapshot {
    brokers: BTreeMap<BrokerId, MetadataBroker>,
    topics: BTreeMap<String, TopicMetadata>,
    controller_id: Option<BrokerId>,
    cluster_id: Option<String>,
}

impl MetadataSnapshot {
    /// Index the brokers and topics of a metadata response.
    ///
    /// Later entries win if a response repeats a broker id, topic name or partition index.
    pub fn new(
        brokers: impl IntoIterator<Item = MetadataBroker>,
        topics: impl IntoIterator<Item = MetadataTopic>,
    ) -> Self {
        let brokers = brokers.into_iter().map(|b| (b.node_id, b)).collect();
        let topics = topics
            .into_iter()
            .map(|t| {
                let meta = TopicMetadata {
                    is_internal: t.is_internal.unwrap_or_default(),
                    partitions: t
                        .partitions
                        .into_iter()
                        .map(|p| (p.partition_index, p))
                        .collect(),
                };
                (t.name, meta)
            })
            .collect();

        Self {
            brokers,
            topics,
            controller_id: None,
            cluster_id: None,
        }
    }

    pub fn with_controller_id(mut self, controller_id: BrokerId) -> Self {
        self.controller_id = Some(controller_id);
        self
    }

    pub fn with_cluster_id(mut self, cluster_id: impl Into<String>) -> Self {
        self.cluster_id = Some(cluster_id.into());
        self
    }

    pub fn brokers(&self) -> &BTreeMap<BrokerId, MetadataBroker> {
        &self.brokers
    }

    pub fn topics(&self) -> &BTreeMap<String, TopicMetadata> {
        &self.topics
    }

    pub fn broker(&self, id: BrokerId) -> Option<&MetadataBroker> {
        self.brokers.get(&id)
    }

    pub fn topic(&self, name: &str) -> Option<&TopicMetadata> {
        self.topics.get(name)
    }

    pub fn partition(&self, topic: &str, partition: PartitionId) -> Option<&MetadataPartition> {
        self.topic(topic)?.partitions.get(&partition)
    }

    /// The ID of the controller broker, if the source reported one.
    pub fn controller_id(&self) -> Option<BrokerId> {
        self.controller_id
    }

    pub fn cluster_id(&self) -> Option<&str> {
        self.cluster_id.as_deref()
    }
}
