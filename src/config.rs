//! Configuration for loading and rendering reports

use std::time::Duration;

/// Where report documents live relative to the source root
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the report index
    pub index_path: String,
    /// Directory holding per-timestamp snapshots for a lazy index
    pub snapshot_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_path: "reports.json".to_string(),
            snapshot_dir: "reports".to_string(),
        }
    }
}

impl StoreConfig {
    /// Relative path of the snapshot document for `key`
    pub fn snapshot_path(&self, key: &str) -> String {
        let dir = self.snapshot_dir.trim_end_matches('/');
        if dir.is_empty() {
            format!("{}.json", key)
        } else {
            format!("{}/{}.json", dir, key)
        }
    }
}

/// Report source location
#[derive(Debug, Clone, Default)]
pub struct SourceConfig {
    /// Base URL or directory
    pub location: String,
    /// Per-request timeout; none by default
    pub timeout: Option<Duration>,
}

/// Static dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Title for the dashboard
    pub title: String,
    /// Path to output directory
    pub output_dir: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Hello, World! Footprint".to_string(),
            output_dir: "docs".to_string(),
        }
    }
}
