//! Manager Configuration
//!
//! Operation timeout, resolver fan-out and asset staging location.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{ManagerError, ManagerResult};

/// Record manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Upper bound on one whole operation, in milliseconds (default: none)
    #[serde(default)]
    pub operation_timeout_ms: Option<u64>,

    /// Reference fetches in flight per list resolution (default: 16)
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Asset staging directory (default: system temp dir)
    #[serde(default)]
    pub asset_dir: Option<PathBuf>,
}

fn default_max_concurrent_fetches() -> usize {
    16
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: None,
            max_concurrent_fetches: default_max_concurrent_fetches(),
            asset_dir: None,
        }
    }
}

impl ManagerConfig {
    /// Parse from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> ManagerResult<Self> {
        serde_json::from_str(json).map_err(|e| ManagerError::Config(e.to_string()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit;
        self
    }

    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = Some(dir.into());
        self
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_ms.map(Duration::from_millis)
    }

    /// Fan-out limit; zero is treated as one
    pub fn fetch_limit(&self) -> usize {
        self.max_concurrent_fetches.max(1)
    }
}
