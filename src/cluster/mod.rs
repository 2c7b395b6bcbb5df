//! The cluster-wide topology view.
//!
//! A [`ClusterView`] keeps one view object per broker, topic and partition. Refreshes add and
//! remove views as the cluster changes but never replace a surviving one, so handles obtained
//! earlier keep working and keep reporting current metadata.
//!
//! # Concurrency
//! The current [`MetadataSnapshot`] sits behind an [`Arc`] that a refresh swaps in one step.
//! Refreshes are serialized. While a refresh applies its diff it holds the broker and topic maps
//! exclusively, so readers see either the old or the new state of the maps, never a mix.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tracing::debug;

use crate::broker::Broker;
use crate::config::{
    ConnectionConfig, FastRefresh, FAST_REFRESH_COUNT, FAST_REFRESH_INTERVAL_MS,
};
use crate::error::Result;
use crate::metadata::{BrokerId, MetadataSnapshot};
use crate::source::MetadataSource;
use crate::topic::{Partition, Topic};

mod refresh;
pub mod topic_dict;

use refresh::{refresh_no_clobber, Changes};
use topic_dict::TopicDict;

/// Builder for [`ClusterView`].
pub struct ClusterViewBuilder {
    config: ConnectionConfig,
}

impl ClusterViewBuilder {
    /// Create a new [`ClusterViewBuilder`] with the list of seed brokers
    pub fn new(seed_hosts: Vec<String>) -> Self {
        Self {
            config: ConnectionConfig::new(&seed_hosts),
        }
    }

    /// Set a raw configuration property.
    ///
    /// Properties this crate does not interpret are passed on to the [`MetadataSource`].
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.set(key, value);
        self
    }

    /// Number of refreshes [`TopicDict::get_or_create`] runs before giving up.
    pub fn fast_refresh_count(self, count: usize) -> Self {
        self.set(FAST_REFRESH_COUNT, count.to_string())
    }

    /// Pause before each refresh in [`TopicDict::get_or_create`].
    pub fn fast_refresh_interval(self, interval: Duration) -> Self {
        self.set(
            FAST_REFRESH_INTERVAL_MS,
            (interval.as_secs_f64() * 1e3).to_string(),
        )
    }

    /// Build [`ClusterView`], fetching the initial metadata before returning.
    pub async fn build(self, source: Arc<dyn MetadataSource>) -> Result<ClusterView> {
        let fast_refresh = self.config.validate()?;

        let state = Arc::new_cyclic(|weak: &Weak<ClusterState>| ClusterState {
            config: self.config,
            fast_refresh,
            source,
            snapshot: RwLock::new(Arc::new(MetadataSnapshot::default())),
            brokers: RwLock::new(BTreeMap::new()),
            topics: TopicDict::new(Weak::clone(weak)),
            refresh: tokio::sync::Mutex::new(()),
        });
        state.update().await?;

        Ok(ClusterView { state })
    }
}

impl std::fmt::Debug for ClusterViewBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterViewBuilder").finish_non_exhaustive()
    }
}

/// Locally synchronized view of the cluster's brokers, topics and partitions.
///
/// Must be constructed using [`ClusterViewBuilder`] or [`ClusterView::new`]. Clones share the
/// same state.
#[derive(Debug, Clone)]
pub struct ClusterView {
    state: Arc<ClusterState>,
}

impl ClusterView {
    /// Build a view with default settings.
    pub async fn new(seed_hosts: Vec<String>, source: Arc<dyn MetadataSource>) -> Result<Self> {
        ClusterViewBuilder::new(seed_hosts).build(source).await
    }

    /// Fetch fresh metadata and merge it into the view.
    ///
    /// On error nothing changes: the previous snapshot and all views stay as they were.
    pub async fn update(&self) -> Result<()> {
        self.state.update().await
    }

    /// Broker views keyed by broker ID.
    pub fn brokers(&self) -> BTreeMap<BrokerId, Arc<Broker>> {
        self.state.brokers.read().clone()
    }

    pub fn broker(&self, id: BrokerId) -> Option<Arc<Broker>> {
        self.state.brokers.read().get(&id).cloned()
    }

    pub fn topics(&self) -> &TopicDict {
        &self.state.topics
    }

    /// The controller broker, if the latest metadata named one that is also a known broker.
    pub fn controller(&self) -> Option<Arc<Broker>> {
        let id = self.state.snapshot().controller_id()?;
        self.broker(id)
    }

    pub fn cluster_id(&self) -> Option<String> {
        self.state.snapshot().cluster_id().map(ToOwned::to_owned)
    }

    /// The metadata snapshot all views currently read from.
    pub fn snapshot(&self) -> Arc<MetadataSnapshot> {
        self.state.snapshot()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.state.config
    }

    pub fn fast_refresh(&self) -> FastRefresh {
        self.state.fast_refresh
    }
}

/// State shared between the [`ClusterView`] handles and referenced weakly by every view.
pub(crate) struct ClusterState {
    config: ConnectionConfig,
    fast_refresh: FastRefresh,
    source: Arc<dyn MetadataSource>,

    snapshot: RwLock<Arc<MetadataSnapshot>>,
    pub(crate) brokers: RwLock<BTreeMap<BrokerId, Arc<Broker>>>,
    pub(crate) topics: TopicDict,

    /// Held across fetch and apply so diff passes never interleave.
    refresh: tokio::sync::Mutex<()>,
}

impl ClusterState {
    pub(crate) fn snapshot(&self) -> Arc<MetadataSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    pub(crate) async fn update(self: &Arc<Self>) -> Result<()> {
        let _guard = self.refresh.lock().await;

        let snapshot = self.source.fetch_metadata(&self.config).await?;
        self.apply(Arc::new(snapshot));

        Ok(())
    }

    fn apply(self: &Arc<Self>, snapshot: Arc<MetadataSnapshot>) {
        let mut brokers = self.brokers.write();
        let mut topics = self.topics.write();
        *self.snapshot.write() = Arc::clone(&snapshot);

        let cluster = Arc::downgrade(self);
        let mut changes = refresh_no_clobber("broker", &mut *brokers, snapshot.brokers(), |id| {
            Broker::new(Weak::clone(&cluster), *id)
        });
        changes += refresh_no_clobber("topic", &mut *topics, snapshot.topics(), |name| {
            Topic::new(Weak::clone(&cluster), name.clone())
        });

        for (name, topic) in &*topics {
            // every tracked topic is in the snapshot after the pass above
            let Some(meta) = snapshot.topic(name) else {
                continue;
            };
            let scope = format!("topic '{name}' partition");
            let mut partitions = topic.partitions.write();
            changes += refresh_no_clobber(&scope, &mut *partitions, &meta.partitions, |id| {
                Partition::new(topic, *id)
            });
        }

        let Changes { added, removed } = changes;
        debug!(
            brokers = brokers.len(),
            topics = topics.len(),
            added,
            removed,
            "Cluster metadata refreshed",
        );
    }
}

impl std::fmt::Debug for ClusterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterState")
            .field("config", &self.config)
            .field("fast_refresh", &self.fast_refresh)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
