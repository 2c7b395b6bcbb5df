use std::fmt::{Debug, Display, Formatter};
use std::sync::{Arc, Weak};

use crate::cluster::ClusterState;
use crate::error::{Error, LookupContext, Result};
use crate::metadata::{BrokerId, MetadataBroker};

/// A broker in the cluster.
///
/// Only the ID is stored. Every other attribute is read from the cluster's current metadata,
/// so a handle obtained before a refresh reports the refreshed values.
pub struct Broker {
    /// broker ID from the topology metadata
    id: BrokerId,
    cluster: Weak<ClusterState>,
}

impl Broker {
    pub(crate) fn new(cluster: Weak<ClusterState>, id: BrokerId) -> Self {
        Self { id, cluster }
    }

    pub fn id(&self) -> BrokerId {
        self.id
    }

    pub fn host(&self) -> Result<String> {
        self.with_meta(|b| b.host.clone())
    }

    pub fn port(&self) -> Result<i32> {
        self.with_meta(|b| b.port)
    }

    pub fn rack(&self) -> Result<Option<String>> {
        self.with_meta(|b| b.rack.clone())
    }

    /// `host:port`, resolved in one read so both halves come from the same snapshot.
    pub fn address(&self) -> Result<String> {
        self.with_meta(|b| format!("{}:{}", b.host, b.port))
    }

    fn with_meta<T>(&self, f: impl FnOnce(&MetadataBroker) -> T) -> Result<T> {
        let cluster = self
            .cluster
            .upgrade()
            .ok_or(Error::Lookup(LookupContext::Cluster))?;
        let snapshot = cluster.snapshot();
        snapshot
            .broker(self.id)
            .map(f)
            .ok_or(Error::Lookup(LookupContext::Broker(self.id)))
    }
}

impl Debug for Broker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Display for Broker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.address() {
            Ok(addr) => write!(f, "{} ({})", self.id, addr),
            Err(_) => write!(f, "{} (unknown)", self.id),
        }
    }
}

pub(crate) fn resolve(cluster: &Arc<ClusterState>, id: BrokerId) -> Result<Arc<Broker>> {
    cluster
        .brokers
        .read()
        .get(&id)
        .cloned()
        .ok_or(Error::Lookup(LookupContext::Broker(id)))
}

/// Resolve broker IDs through the cluster's broker map, keeping their order.
pub(crate) fn resolve_all(
    cluster: &Arc<ClusterState>,
    ids: &[BrokerId],
) -> Result<Vec<Arc<Broker>>> {
    let brokers = cluster.brokers.read();
    ids.iter()
        .map(|id| {
            brokers
                .get(id)
                .map(Arc::clone)
                .ok_or(Error::Lookup(LookupContext::Broker(*id)))
        })
        .collect()
}
