//! Data structures for published benchmark reports

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Reserved selection key for the newest snapshot
pub const LATEST: &str = "latest";

/// Target architecture of a measured binary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    /// Every known architecture, in series order
    pub const ALL: [Arch; 2] = [Arch::Amd64, Arch::Arm64];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of measurement stored in a snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    BinarySize,
    MemoryUsage,
}

impl MetricKind {
    /// Every known metric, in rendering order
    pub const ALL: [MetricKind; 2] = [MetricKind::BinarySize, MetricKind::MemoryUsage];

    /// Key used in the snapshot JSON
    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::BinarySize => "binary_size",
            MetricKind::MemoryUsage => "memory_usage",
        }
    }

    /// Y axis title for charts of this metric
    pub fn axis_label(&self) -> &'static str {
        match self {
            MetricKind::BinarySize => "Binary Size (KB)",
            MetricKind::MemoryUsage => "Resident Set Size (KB)",
        }
    }

    /// Chart container this metric is drawn into
    pub fn chart_target(&self) -> &'static str {
        match self {
            MetricKind::BinarySize => "binary-size-chart",
            MetricKind::MemoryUsage => "memory-usage-chart",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single measurement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    /// Language identifier (e.g. "rust", "c (musl)")
    pub language: String,
    /// Architecture the binary was built for
    pub arch: Arch,
    /// Toolchain version, display only
    #[serde(default)]
    pub version: String,
    /// Measured value in KB; `None` when the run produced no data point
    #[serde(default)]
    pub value: Option<f64>,
}

/// One timestamped report with a sample list per metric
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_size: Option<Vec<Sample>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<Vec<Sample>>,
}

impl Snapshot {
    /// Samples recorded for a metric, if the snapshot carries it
    pub fn metric(&self, kind: MetricKind) -> Option<&[Sample]> {
        match kind {
            MetricKind::BinarySize => self.binary_size.as_deref(),
            MetricKind::MemoryUsage => self.memory_usage.as_deref(),
        }
    }
}

/// Index of published snapshots
///
/// A JSON object maps every timestamp to its full snapshot; a JSON array lists
/// timestamp keys whose snapshots live in separate files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ReportIndex {
    Lazy(Vec<String>),
    Eager(BTreeMap<String, Snapshot>),
}

impl ReportIndex {
    /// Concrete timestamp keys, newest first, without the `latest` alias
    pub fn timestamps(&self) -> Vec<String> {
        let mut keys: Vec<String> = match self {
            ReportIndex::Lazy(keys) => keys.iter().filter(|k| *k != LATEST).cloned().collect(),
            ReportIndex::Eager(map) => map.keys().filter(|k| *k != LATEST).cloned().collect(),
        };
        keys.sort();
        keys.dedup();
        keys.reverse();
        keys
    }
}

/// Snapshots of an eager index, shared once loaded
pub(crate) type EagerSnapshots = BTreeMap<String, Arc<Snapshot>>;

/// An entry of the timestamp selector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectorOption {
    /// Key passed to `resolve`
    pub value: String,
    /// Human readable label
    pub label: String,
}

impl SelectorOption {
    pub fn latest() -> Self {
        Self {
            value: LATEST.to_string(),
            label: "Latest".to_string(),
        }
    }

    pub fn for_timestamp(key: &str) -> Self {
        Self {
            value: key.to_string(),
            label: timestamp_label(key),
        }
    }
}

/// Build the selector list: `latest` first, then the given keys in order
pub fn selector_options(timestamps: &[String]) -> Vec<SelectorOption> {
    std::iter::once(SelectorOption::latest())
        .chain(timestamps.iter().map(|ts| SelectorOption::for_timestamp(ts)))
        .collect()
}

/// Format a timestamp key for display, falling back to the key itself
pub fn timestamp_label(key: &str) -> String {
    if key == LATEST {
        return "Latest".to_string();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(key) {
        return dt
            .with_timezone(&chrono::Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string();
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(key, fmt) {
            return dt.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") {
        return date.format("%b %-d, %Y").to_string();
    }

    key.to_string()
}
