//! Memoized dataset loading.
//!
//! A loaded [`Dataset`] is reused only while the source file is unchanged:
//! the cache key is the canonical path plus the file's modification time.
//! Callers can also drop the entry explicitly with [`DatasetCache::invalidate`]
//! or force a fresh read with [`DatasetCache::reload`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::error::DataLoadError;
use crate::io::ingest::{Dataset, load_dataset};

#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceKey {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl SourceKey {
    fn for_path(path: &Path) -> Result<Self, DataLoadError> {
        let io_err = |source| DataLoadError::from_io(path, source);
        let canonical = path.canonicalize().map_err(io_err)?;
        let modified = std::fs::metadata(&canonical).map_err(io_err)?.modified().ok();
        Ok(Self {
            path: canonical,
            modified,
        })
    }
}

/// Single-entry cache for the session dataset.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(SourceKey, Arc<Dataset>)>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset if `path` is unchanged, otherwise load it.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>, DataLoadError> {
        let key = SourceKey::for_path(path)?;
        if let Some((cached_key, dataset)) = &self.entry {
            if *cached_key == key {
                debug!(path = %path.display(), "Dataset cache hit");
                return Ok(Arc::clone(dataset));
            }
        }
        self.load_into_cache(path, key)
    }

    /// Drop the cached entry and load `path` again.
    pub fn reload(&mut self, path: &Path) -> Result<Arc<Dataset>, DataLoadError> {
        self.invalidate();
        let key = SourceKey::for_path(path)?;
        self.load_into_cache(path, key)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_cached(&self) -> bool {
        self.entry.is_some()
    }

    /// Number of loads performed (cache misses).
    pub fn load_count(&self) -> usize {
        self.loads
    }

    fn load_into_cache(&mut self, path: &Path, key: SourceKey) -> Result<Arc<Dataset>, DataLoadError> {
        // A failed load leaves no stale entry behind.
        self.entry = None;
        let dataset = Arc::new(load_dataset(path)?);
        self.loads += 1;
        self.entry = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }
}
