//! Client configuration properties.
//!
//! Properties use librdkafka names. Only the keys below are interpreted here; everything else is
//! handed to the [`MetadataSource`](crate::MetadataSource) untouched.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{Error, Result};

/// Comma-separated list of seed brokers.
pub const METADATA_BROKER_LIST: &str = "metadata.broker.list";

/// How many fast refreshes to run while waiting for a new topic.
pub const FAST_REFRESH_COUNT: &str = "topic.metadata.refresh.fast.cnt";

/// Pause before each fast refresh, in (possibly fractional) milliseconds.
pub const FAST_REFRESH_INTERVAL_MS: &str = "topic.metadata.refresh.fast.interval.ms";

/// DEFAULT_FAST_REFRESH_COUNT matches the librdkafka default for
/// `topic.metadata.refresh.fast.cnt`.
pub const DEFAULT_FAST_REFRESH_COUNT: usize = 10;

/// DEFAULT_FAST_REFRESH_INTERVAL_MS matches the librdkafka default for
/// `topic.metadata.refresh.fast.interval.ms`.
pub const DEFAULT_FAST_REFRESH_INTERVAL_MS: f64 = 250.0;

/// Key/value properties passed to every [`MetadataSource`](crate::MetadataSource) call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    properties: BTreeMap<String, String>,
}

impl ConnectionConfig {
    pub fn new(seed_hosts: &[String]) -> Self {
        let mut config = Self::default();
        config.set(METADATA_BROKER_LIST, seed_hosts.join(","));
        config
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Seed brokers from `metadata.broker.list`, with blanks dropped.
    pub fn seed_brokers(&self) -> Vec<String> {
        self.get(METADATA_BROKER_LIST)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<FastRefresh> {
        if self.seed_brokers().is_empty() {
            return Err(Error::config(METADATA_BROKER_LIST, "at least one seed broker is required"));
        }
        FastRefresh::from_config(self)
    }
}

/// Bounds for the poll loop that waits for an auto-created topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastRefresh {
    pub count: usize,
    pub interval: Duration,
}

impl Default for FastRefresh {
    fn default() -> Self {
        Self {
            count: DEFAULT_FAST_REFRESH_COUNT,
            interval: Duration::from_secs_f64(DEFAULT_FAST_REFRESH_INTERVAL_MS * 1e-3),
        }
    }
}

impl FastRefresh {
    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let mut fast = Self::default();

        if let Some(raw) = config.get(FAST_REFRESH_COUNT) {
            fast.count = raw
                .trim()
                .parse()
                .map_err(|e| Error::config(FAST_REFRESH_COUNT, format!("'{raw}': {e}")))?;
        }

        if let Some(raw) = config.get(FAST_REFRESH_INTERVAL_MS) {
            let ms: f64 = raw
                .trim()
                .parse()
                .map_err(|e| Error::config(FAST_REFRESH_INTERVAL_MS, format!("'{raw}': {e}")))?;
            if !ms.is_finite() || ms < 0.0 {
                return Err(Error::config(
                    FAST_REFRESH_INTERVAL_MS,
                    format!("'{raw}' is not a non-negative number of milliseconds"),
                ));
            }
            fast.interval = Duration::from_secs_f64(ms * 1e-3);
        }

        Ok(fast)
    }

    /// Upper bound on how long a creation poll can sleep in total.
    pub fn max_wait(&self) -> Duration {
        self.interval
            .saturating_mul(u32::try_from(self.count).unwrap_or(u32::MAX))
    }
}
