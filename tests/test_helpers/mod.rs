use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use kafka_topology::metadata::{MetadataBroker, MetadataPartition, MetadataTopic};
use kafka_topology::{ConnectionConfig, ConnectionError, MetadataSnapshot, MetadataSource};

static LOG_SETUP: Once = Once::new();

/// Enables debug logging if the `RUST_LOG` environment variable is
/// set. Does nothing if `RUST_LOG` is not set.
pub fn maybe_start_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        start_logging()
    }
}

/// Start logging.
pub fn start_logging() {
    use tracing_subscriber::filter::EnvFilter;

    // `init` also routes `log` records into tracing
    LOG_SETUP.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    })
}

/// A cluster that answers from a list of canned metadata responses.
///
/// Each fetch consumes the next response; once the list runs out the last
/// response is served again. `None` entries simulate an unreachable cluster.
#[derive(Debug, Default)]
pub struct MockCluster {
    responses: Mutex<VecDeque<Option<MetadataSnapshot>>>,
    current: Mutex<Option<MetadataSnapshot>>,
    fetches: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MockCluster {
    pub fn new(responses: impl IntoIterator<Item = Option<MetadataSnapshot>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Default::default()
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataSource for MockCluster {
    async fn fetch_metadata(
        &self,
        config: &ConnectionConfig,
    ) -> Result<MetadataSnapshot, ConnectionError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let next = self.responses.lock().unwrap().pop_front();
        let mut current = self.current.lock().unwrap();
        match next {
            Some(Some(snapshot)) => {
                *current = Some(snapshot.clone());
                Ok(snapshot)
            }
            Some(None) => Err(ConnectionError::Unreachable {
                brokers: config.seed_brokers().join(","),
            }),
            None => current.clone().ok_or_else(|| {
                ConnectionError::request("no metadata response configured".to_string())
            }),
        }
    }

    async fn request_topic(
        &self,
        _config: &ConnectionConfig,
        topic: &str,
    ) -> Result<(), ConnectionError> {
        self.requested.lock().unwrap().push(topic.to_string());
        Ok(())
    }
}

pub fn broker(id: i32, host: &str, port: i32) -> MetadataBroker {
    MetadataBroker {
        node_id: id,
        host: host.to_string(),
        port,
        rack: None,
    }
}

pub fn topic(name: &str, partitions: Vec<MetadataPartition>) -> MetadataTopic {
    MetadataTopic {
        name: name.to_string(),
        is_internal: Some(false),
        partitions,
    }
}

pub fn partition(id: i32, leader: i32, replicas: &[i32], isr: &[i32]) -> MetadataPartition {
    MetadataPartition {
        partition_index: id,
        leader_id: leader,
        replica_nodes: replicas.to_vec(),
        isr_nodes: isr.to_vec(),
    }
}
