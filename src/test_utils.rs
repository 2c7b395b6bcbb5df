use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::cluster::{ClusterView, ClusterViewBuilder};
use crate::config::ConnectionConfig;
use crate::metadata::{
    BrokerId, MetadataBroker, MetadataPartition, MetadataSnapshot, MetadataTopic, PartitionId,
};
use crate::source::{ConnectionError, MetadataSource};

/// Serves queued snapshots in order, then keeps repeating the last one.
#[derive(Debug, Default)]
pub(crate) struct ScriptedSource {
    script: Mutex<VecDeque<Option<MetadataSnapshot>>>,
    last: Mutex<Option<MetadataSnapshot>>,
    fetches: AtomicUsize,
    requested: Mutex<Vec<String>>,
    fail_requests: AtomicBool,
}

impl ScriptedSource {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push(&self, snapshot: MetadataSnapshot) -> &Self {
        self.script.lock().push_back(Some(snapshot));
        self
    }

    /// Queue a fetch that fails with a connection error.
    pub(crate) fn push_failure(&self) -> &Self {
        self.script.lock().push_back(None);
        self
    }

    /// Make every following `request_topic` fail with a connection error.
    pub(crate) fn fail_requests(&self) -> &Self {
        self.fail_requests.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl MetadataSource for ScriptedSource {
    async fn fetch_metadata(
        &self,
        _config: &ConnectionConfig,
    ) -> Result<MetadataSnapshot, ConnectionError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().pop_front();
        let mut last = self.last.lock();
        match next {
            Some(Some(snapshot)) => {
                *last = Some(snapshot.clone());
                Ok(snapshot)
            }
            Some(None) => Err(ConnectionError::Unreachable {
                brokers: "scripted".to_string(),
            }),
            None => last.clone().ok_or(ConnectionError::NoSeedBrokers),
        }
    }

    async fn request_topic(
        &self,
        _config: &ConnectionConfig,
        topic: &str,
    ) -> Result<(), ConnectionError> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(ConnectionError::Unreachable {
                brokers: "scripted".to_string(),
            });
        }
        self.requested.lock().push(topic.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct SnapshotBuilder {
    brokers: Vec<MetadataBroker>,
    topics: Vec<MetadataTopic>,
}

impl SnapshotBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn broker(mut self, id: BrokerId, host: &str, port: i32) -> Self {
        self.brokers.push(MetadataBroker {
            node_id: id,
            host: host.to_string(),
            port,
            rack: None,
        });
        self
    }

    /// A topic without partitions, as seen right after auto-creation.
    pub(crate) fn topic(mut self, name: &str) -> Self {
        self.topic_entry(name);
        self
    }

    pub(crate) fn partition(
        mut self,
        topic: &str,
        id: PartitionId,
        leader: BrokerId,
        replicas: &[BrokerId],
        isr: &[BrokerId],
    ) -> Self {
        self.topic_entry(topic).partitions.push(MetadataPartition {
            partition_index: id,
            leader_id: leader,
            replica_nodes: replicas.to_vec(),
            isr_nodes: isr.to_vec(),
        });
        self
    }

    pub(crate) fn build(self) -> MetadataSnapshot {
        MetadataSnapshot::new(self.brokers, self.topics)
    }

    fn topic_entry(&mut self, name: &str) -> &mut MetadataTopic {
        let idx = match self.topics.iter().position(|t| t.name == name) {
            Some(idx) => idx,
            None => {
                self.topics.push(MetadataTopic {
                    name: name.to_string(),
                    is_internal: None,
                    partitions: vec![],
                });
                self.topics.len() - 1
            }
        };
        &mut self.topics[idx]
    }
}

/// Builds a cluster over `source` that polls without sleeping.
pub(crate) async fn cluster(source: &Arc<ScriptedSource>, fast_refresh_count: usize) -> ClusterView {
    ClusterViewBuilder::new(vec!["seed:9092".to_string()])
        .fast_refresh_count(fast_refresh_count)
        .fast_refresh_interval(std::time::Duration::ZERO)
        .build(Arc::clone(source) as Arc<dyn MetadataSource>)
        .await
        .unwrap()
}
