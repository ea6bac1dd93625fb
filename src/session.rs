//! Dashboard session: the load sequence and timestamp selection handling
//!
//! Every selection takes a token from a monotonically increasing counter. A
//! response is applied only if no newer selection started while it was in
//! flight; otherwise it is dropped as stale. Failures are logged and turned
//! into outcomes, leaving the charts on their previous data.

use crate::chart::{ChartBoard, ChartRenderer};
use crate::projector::project;
use crate::report::{MetricKind, SelectorOption, Snapshot, LATEST};
use crate::source::ReportSource;
use crate::store::ReportStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// Result of handling one selection
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// Charts now show `key`
    Applied {
        key: String,
        rendered: Vec<MetricKind>,
        skipped: Vec<MetricKind>,
    },
    /// A newer selection started before this one finished
    Stale { key: String, token: u64 },
    /// The snapshot could not be resolved; charts are unchanged
    Failed { key: String, error: String },
}

/// Result of the initial load sequence
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded {
        options: Vec<SelectorOption>,
        selection: SelectionOutcome,
    },
    /// The index could not be loaded; the selector stays empty
    IndexFailed { error: String },
}

pub struct Session<S, R: ChartRenderer> {
    store: ReportStore<S>,
    board: Mutex<ChartBoard<R>>,
    generation: AtomicU64,
    current: Mutex<Option<String>>,
}

impl<S: ReportSource, R: ChartRenderer> Session<S, R> {
    pub fn new(store: ReportStore<S>, renderer: R) -> Self {
        Self {
            store,
            board: Mutex::new(ChartBoard::new(renderer)),
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &ReportStore<S> {
        &self.store
    }

    /// Live charts
    pub fn board(&self) -> MutexGuard<'_, ChartBoard<R>> {
        lock(&self.board)
    }

    /// Key of the snapshot currently on display
    pub fn current_selection(&self) -> Option<String> {
        lock(&self.current).clone()
    }

    /// Load the index, then render the default `latest` selection
    pub async fn load(&self) -> LoadOutcome {
        let options = match self.store.initialize().await {
            Ok(options) => options,
            Err(e) => {
                error!("Error loading reports: {}", e);
                return LoadOutcome::IndexFailed {
                    error: e.to_string(),
                };
            }
        };

        let selection = self.select(LATEST).await;
        LoadOutcome::Loaded { options, selection }
    }

    /// Handle a selection change to `key`
    pub async fn select(&self, key: &str) -> SelectionOutcome {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Selection {} -> {}", token, key);

        let resolved = self.store.resolve(key).await;

        if self.generation.load(Ordering::SeqCst) != token {
            warn!("Discarding stale response for {} (request {})", key, token);
            return SelectionOutcome::Stale {
                key: key.to_string(),
                token,
            };
        }

        match resolved {
            Ok(snapshot) => self.apply(key, &snapshot),
            Err(e) => {
                if e.is_fetch_failure() {
                    error!("Could not fetch snapshot {}: {}", key, e);
                } else {
                    error!("No data for timestamp {}: {}", key, e);
                }
                SelectionOutcome::Failed {
                    key: key.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    fn apply(&self, key: &str, snapshot: &Arc<Snapshot>) -> SelectionOutcome {
        let mut rendered = Vec::new();
        let mut skipped = Vec::new();

        {
            let mut board = lock(&self.board);
            for metric in MetricKind::ALL {
                match snapshot.metric(metric) {
                    Some(samples) => {
                        let spec = project(samples, metric);
                        board.render(metric.chart_target(), &spec);
                        rendered.push(metric);
                    }
                    None => {
                        error!("No data for metric: {}", metric);
                        skipped.push(metric);
                    }
                }
            }
        }

        *lock(&self.current) = Some(key.to_string());
        info!("Rendered snapshot {}", key);

        SelectionOutcome::Applied {
            key: key.to_string(),
            rendered,
            skipped,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
