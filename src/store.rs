//! Report store: loads the snapshot index and memoizes fetched snapshots

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::report::{selector_options, EagerSnapshots, ReportIndex, SelectorOption, Snapshot, LATEST};
use crate::source::ReportSource;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::{debug, info, warn};

/// Which index layout the source published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexShape {
    /// Every snapshot inline in the index document
    Eager,
    /// Timestamp keys only; snapshots fetched per key
    Lazy,
}

enum LoadedIndex {
    Eager(EagerSnapshots),
    Lazy(BTreeSet<String>),
}

#[derive(Default)]
struct IndexState {
    loaded: Option<LoadedIndex>,
    options: Vec<SelectorOption>,
}

/// Loads the report index from a [`ReportSource`] and resolves timestamp keys to snapshots.
///
/// Lazily fetched snapshots are cached under the literal key used to select them for
/// the lifetime of the store. `latest` is its own cache entry and is never mapped to
/// the newest concrete timestamp. The cache is only reachable through [`resolve`].
///
/// Locks are never held across an await, so overlapping `resolve` calls are fine.
///
/// [`resolve`]: ReportStore::resolve
pub struct ReportStore<S> {
    source: S,
    config: StoreConfig,
    index: Mutex<IndexState>,
    cache: Mutex<HashMap<String, Arc<Snapshot>>>,
}

impl<S: ReportSource> ReportStore<S> {
    pub fn new(source: S, config: StoreConfig) -> Self {
        Self {
            source,
            config,
            index: Mutex::new(IndexState::default()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the report index and populate the selector options.
    ///
    /// Any previously loaded index is dropped first, so a failure leaves the selector empty.
    pub async fn initialize(&self) -> Result<Vec<SelectorOption>> {
        *lock(&self.index) = IndexState::default();

        info!(
            "Loading report index {} from {}",
            self.config.index_path,
            self.source.describe()
        );
        let bytes = self.source.fetch(&self.config.index_path).await?;
        let index = match serde_json::from_slice::<ReportIndex>(&bytes)? {
            ReportIndex::Lazy(keys) => ReportIndex::Lazy(
                keys.into_iter()
                    .filter(|key| match validate_key(key) {
                        Ok(()) => true,
                        Err(e) => {
                            warn!("Dropping index entry: {}", e);
                            false
                        }
                    })
                    .collect(),
            ),
            eager => eager,
        };

        let timestamps = index.timestamps();
        let options = selector_options(&timestamps);

        let loaded = match index {
            ReportIndex::Eager(map) => {
                info!("Loaded eager index with {} snapshots", map.len());
                LoadedIndex::Eager(map.into_iter().map(|(k, v)| (k, Arc::new(v))).collect())
            }
            ReportIndex::Lazy(keys) => {
                info!("Loaded lazy index with {} timestamps", timestamps.len());
                LoadedIndex::Lazy(keys.into_iter().collect())
            }
        };

        lock(&self.cache).clear();
        let mut state = lock(&self.index);
        state.loaded = Some(loaded);
        state.options = options.clone();

        Ok(options)
    }

    /// Selector options from the last successful `initialize`
    pub fn options(&self) -> Vec<SelectorOption> {
        lock(&self.index).options.clone()
    }

    /// Layout of the loaded index
    pub fn shape(&self) -> Option<IndexShape> {
        lock(&self.index).loaded.as_ref().map(|loaded| match loaded {
            LoadedIndex::Eager(_) => IndexShape::Eager,
            LoadedIndex::Lazy(_) => IndexShape::Lazy,
        })
    }

    /// Keys currently held in the snapshot cache, sorted
    pub fn cached_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = lock(&self.cache).keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Return the snapshot for `key`, fetching it on first use
    pub async fn resolve(&self, key: &str) -> Result<Arc<Snapshot>> {
        {
            let state = lock(&self.index);
            match state.loaded.as_ref() {
                None => return Err(Error::NotInitialized),
                Some(LoadedIndex::Eager(map)) => return lookup_eager(map, key),
                Some(LoadedIndex::Lazy(keys)) => {
                    if key != LATEST && !keys.contains(key) {
                        return Err(Error::UnknownTimestamp(key.to_string()));
                    }
                }
            }
        }

        if let Some(hit) = lock(&self.cache).get(key) {
            debug!("Snapshot {} served from cache", key);
            return Ok(Arc::clone(hit));
        }

        validate_key(key)?;
        let path = self.config.snapshot_path(key);
        debug!("Fetching snapshot {} from {}", key, path);

        let bytes = self.source.fetch(&path).await?;
        let snapshot = Arc::new(serde_json::from_slice::<Snapshot>(&bytes)?);

        lock(&self.cache).insert(key.to_string(), Arc::clone(&snapshot));
        info!("Cached snapshot {}", key);

        Ok(snapshot)
    }
}

fn lookup_eager(map: &EagerSnapshots, key: &str) -> Result<Arc<Snapshot>> {
    if let Some(snapshot) = map.get(key) {
        return Ok(Arc::clone(snapshot));
    }

    // Without an explicit entry, `latest` aliases the greatest timestamp
    if key == LATEST {
        if let Some((newest, snapshot)) = map.iter().rev().find(|(k, _)| *k != LATEST) {
            debug!("Resolved latest to {}", newest);
            return Ok(Arc::clone(snapshot));
        }
    }

    Err(Error::UnknownTimestamp(key.to_string()))
}

/// Keys end up in a fetched path, so only plain timestamp characters are allowed
pub fn validate_key(key: &str) -> Result<()> {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    let re = KEY_RE.get_or_init(|| Regex::new(r"^[0-9A-Za-z._:+\-]+$").expect("valid key regex"));

    if !re.is_match(key) || key.contains("..") {
        return Err(Error::InvalidTimestamp(key.to_string()));
    }
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
