//! footprint - binary size and memory usage dashboard for "Hello, World!" reports
//!
//! Loads published benchmark reports (per-language, per-architecture binary size
//! and memory usage), caches them by timestamp and projects each metric into a
//! bar chart input that any charting backend can render.
//!
//! # Features
//!
//! - Eager (single document) and lazy (per-timestamp file) report indexes
//! - Reports over HTTP(S) or from a local directory
//! - Smallest-footprint-first category ordering with explicit gaps
//! - Chart updates in place, with stale selections discarded
//! - Static Chart.js dashboard generation
//!
//! # Example
//!
//! ```no_run
//! use footprint::{chart::ChartJsRenderer, config::StoreConfig, session::Session};
//! use footprint::{source::AnySource, store::ReportStore};
//!
//! # async fn run() -> footprint::Result<()> {
//! let source = AnySource::from_location("https://example.com/footprint/", None)?;
//! let session = Session::new(ReportStore::new(source, StoreConfig::default()), ChartJsRenderer::default());
//!
//! session.load().await;
//! session.select("2024-06-01T00:00:00Z").await;
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod html;
pub mod projector;
pub mod report;
pub mod session;
pub mod source;
pub mod store;

pub use error::{Error, Result};
pub use projector::{project, ChartSpec};
pub use report::{Arch, MetricKind, Sample, Snapshot};
