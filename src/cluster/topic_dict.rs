use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

use super::ClusterState;
use crate::config::FastRefresh;
use crate::error::{Error, LookupContext, Result};
use crate::topic::Topic;

/// Topic views keyed by name, able to create topics that are not there yet.
///
/// All accessors except [`get_or_create`](Self::get_or_create) are local lookups.
pub struct TopicDict {
    cluster: Weak<ClusterState>,
    topics: RwLock<BTreeMap<String, Arc<Topic>>>,
}

impl TopicDict {
    pub(super) fn new(cluster: Weak<ClusterState>) -> Self {
        Self {
            cluster,
            topics: RwLock::new(BTreeMap::new()),
        }
    }

    pub(super) fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<Topic>>> {
        self.topics.write()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Topic>> {
        self.topics.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.topics.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.topics.read().keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<Arc<Topic>> {
        self.topics.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.topics.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.read().is_empty()
    }

    /// Return the topic, asking the cluster to create it first if it is unknown.
    ///
    /// Creation relies on the cluster auto-creating topics that are looked up by name. After
    /// the lookup this refreshes the cluster metadata up to `topic.metadata.refresh.fast.cnt`
    /// times, sleeping `topic.metadata.refresh.fast.interval.ms` before each refresh, until the
    /// topic is visible with at least one partition. New topics tend to show up in the metadata
    /// one refresh before their partitions do.
    ///
    /// Fails with [`Error::TopicNotFound`] when the polls run out. That happens both when
    /// auto-creation is disabled and when the cluster is just slow, and the two cases cannot be
    /// told apart here. Connection errors from any refresh are returned immediately.
    pub async fn get_or_create(&self, name: &str) -> Result<Arc<Topic>> {
        if let Some(topic) = self.get(name) {
            return Ok(topic);
        }

        let cluster = self
            .cluster
            .upgrade()
            .ok_or(Error::Lookup(LookupContext::Cluster))?;

        info!(topic = name, "Trying to create topic");
        cluster.source.request_topic(&cluster.config, name).await?;

        let FastRefresh { count, interval } = cluster.fast_refresh;
        for attempt in 1..=count {
            tokio::time::sleep(interval).await;
            cluster.update().await?;

            match self.get(name) {
                Some(topic) if topic.partition_count() > 0 => {
                    info!(topic = name, attempt, "Topic is ready");
                    return Ok(topic);
                }
                seen => {
                    debug!(
                        topic = name,
                        attempt,
                        visible = seen.is_some(),
                        "Topic not ready yet",
                    );
                }
            }
        }

        warn!(
            topic = name,
            attempts = count,
            "Topic did not appear, auto-creation may be disabled on the cluster",
        );
        Err(Error::TopicNotFound(name.to_owned()))
    }
}

impl std::fmt::Debug for TopicDict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.topics.read().keys()).finish()
    }
}
