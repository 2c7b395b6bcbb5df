use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::broker::{self, Broker};
use crate::cluster::ClusterState;
use crate::error::{Error, LookupContext, Result};
use crate::metadata::{BrokerId, MetadataPartition, PartitionId};

pub struct Topic {
    /// The name of this topic.
    name: String,

    cluster: Weak<ClusterState>,

    /// Partition views, kept in sync with the cluster metadata on every refresh.
    pub(crate) partitions: RwLock<BTreeMap<PartitionId, Arc<Partition>>>,
}

impl Topic {
    pub(crate) fn new(cluster: Weak<ClusterState>, name: String) -> Self {
        Self {
            name,
            cluster,
            partitions: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current partition views, keyed by partition index.
    pub fn partitions(&self) -> BTreeMap<PartitionId, Arc<Partition>> {
        self.partitions.read().clone()
    }

    pub fn partition(&self, id: PartitionId) -> Option<Arc<Partition>> {
        self.partitions.read().get(&id).cloned()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.read().len()
    }

    pub fn is_internal(&self) -> Result<bool> {
        let cluster = self.cluster()?;
        let snapshot = cluster.snapshot();
        snapshot
            .topic(&self.name)
            .map(|t| t.is_internal)
            .ok_or_else(|| Error::Lookup(LookupContext::Topic(self.name.clone())))
    }

    /// Latest offset of every partition.
    pub async fn latest_offsets(&self) -> Result<BTreeMap<PartitionId, i64>> {
        Err(Error::NotImplemented("Topic::latest_offsets"))
    }

    /// Earliest offset of every partition.
    pub async fn earliest_offsets(&self) -> Result<BTreeMap<PartitionId, i64>> {
        Err(Error::NotImplemented("Topic::earliest_offsets"))
    }

    fn cluster(&self) -> Result<Arc<ClusterState>> {
        self.cluster
            .upgrade()
            .ok_or(Error::Lookup(LookupContext::Cluster))
    }
}

impl Debug for Topic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("partitions", &self.partitions.read().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

pub struct Partition {
    id: PartitionId,
    topic_name: String,
    topic: Weak<Topic>,
}

impl Partition {
    pub(crate) fn new(topic: &Arc<Topic>, id: PartitionId) -> Self {
        Self {
            id,
            topic_name: topic.name.clone(),
            topic: Arc::downgrade(topic),
        }
    }

    pub fn id(&self) -> PartitionId {
        self.id
    }

    /// The owning topic, as long as some handle to it is still alive.
    pub fn topic(&self) -> Result<Arc<Topic>> {
        self.topic
            .upgrade()
            .ok_or_else(|| Error::Lookup(LookupContext::Topic(self.topic_name.clone())))
    }

    /// The broker currently leading this partition.
    pub fn leader(&self) -> Result<Arc<Broker>> {
        let (cluster, meta) = self.meta()?;
        broker::resolve(&cluster, meta.leader_id)
    }

    /// All brokers hosting this partition, in the order the cluster reports them.
    pub fn replicas(&self) -> Result<Vec<Arc<Broker>>> {
        self.resolve(|p| &p.replica_nodes)
    }

    /// In-sync replicas, in the order the cluster reports them.
    pub fn isr(&self) -> Result<Vec<Arc<Broker>>> {
        self.resolve(|p| &p.isr_nodes)
    }

    pub async fn latest_offset(&self) -> Result<i64> {
        Err(Error::NotImplemented("Partition::latest_offset"))
    }

    pub async fn earliest_offset(&self) -> Result<i64> {
        Err(Error::NotImplemented("Partition::earliest_offset"))
    }

    fn resolve(
        &self,
        ids: impl FnOnce(&MetadataPartition) -> &Vec<BrokerId>,
    ) -> Result<Vec<Arc<Broker>>> {
        let (cluster, meta) = self.meta()?;
        broker::resolve_all(&cluster, ids(&meta))
    }

    /// Points into the current snapshot's entry for this partition.
    fn meta(&self) -> Result<(Arc<ClusterState>, MetadataPartition)> {
        let topic = self.topic()?;
        let cluster = topic.cluster()?;
        let snapshot = cluster.snapshot();
        let meta = snapshot
            .partition(topic.name(), self.id)
            .cloned()
            .ok_or_else(|| {
                Error::Lookup(LookupContext::Partition {
                    topic: topic.name().to_owned(),
                    partition: self.id,
                })
            })?;
        Ok((cluster, meta))
    }
}

impl Debug for Partition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partition")
            .field("topic", &self.topic_name)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
