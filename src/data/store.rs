use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::config::{ANALYSIS, table_filename};
use crate::data::wide_table::WideTable;
use crate::domain::{Category, SnapshotBatch};

/// Store-level failures. Per-record problems never reach this level; they
/// are counted in the batch diagnostics instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No table has ever been written for the category. Distinct from a
    /// table that exists but has no rows.
    #[error("no table has been written for category '{0}'")]
    NoData(Category),

    /// Nothing to merge and nothing already on disk.
    #[error("empty batch and no existing table for category '{0}'")]
    EmptyBatch(Category),

    /// The atomic replace never committed; the prior table remains
    /// authoritative.
    #[error("failed to persist table for category '{category}'")]
    Persistence {
        category: Category,
        #[source]
        source: anyhow::Error,
    },

    #[error("table for category '{category}' is unreadable")]
    Corrupt {
        category: Category,
        #[source]
        source: anyhow::Error,
    },
}

/// Where the per-category table bytes live. Injected so tests run against
/// an in-memory map and production against the data directory.
pub trait StorageBackend: Send + Sync {
    /// `Ok(None)` when the named table has never been written.
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the named table atomically: a reader must see either the
    /// fully-old or the fully-new bytes, never a partial write.
    fn replace(&self, name: &str, bytes: &[u8]) -> Result<()>;
}

/// Filesystem backend. Replacement goes through a temp file in the
/// destination directory followed by a rename, so a crash mid-write leaves
/// the prior file intact.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)
            .context(format!("Failed to read table file: {}", path.display()))?;
        Ok(Some(bytes))
    }

    fn replace(&self, name: &str, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.root).context(format!(
            "Failed to create data directory: {}",
            self.root.display()
        ))?;
        let path = self.path_for(name);
        let tmp = tempfile::NamedTempFile::new_in(&self.root)
            .context("Failed to create temp file for atomic replace")?;
        std::fs::write(tmp.path(), bytes)
            .context(format!("Failed to write temp file: {:?}", tmp.path()))?;
        tmp.persist(&path)
            .context(format!("Failed to replace table file: {}", path.display()))?;
        Ok(())
    }
}

/// In-memory backend for tests and dry runs.
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.tables.lock().unwrap().get(name).cloned())
    }

    fn replace(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.tables
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Owns the per-category wide tables. Merging is not safe for concurrent
/// writers against the same category; the scheduler guarantees
/// non-overlapping collection runs. Loads are pure reads over whatever
/// snapshot the backend returns.
pub struct WideSeriesStore<B: StorageBackend> {
    backend: B,
}

impl WideSeriesStore<FsBackend> {
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        Self::new(FsBackend::new(data_dir.as_ref()))
    }
}

impl<B: StorageBackend> WideSeriesStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Load the current table for a category. `NoData` when nothing was
    /// ever written — callers must treat that differently from an existing
    /// empty table.
    pub fn load(&self, category: Category) -> Result<WideTable, StoreError> {
        let name = table_filename(category);
        let bytes = self
            .backend
            .read(&name)
            .map_err(|source| StoreError::Corrupt { category, source })?
            .ok_or(StoreError::NoData(category))?;
        WideTable::from_csv_bytes(&bytes)
            .map_err(|source| StoreError::Corrupt { category, source })
    }

    /// Merge one batch under `label` and persist the result atomically.
    ///
    /// An empty batch is a no-op returning the existing table, or
    /// `EmptyBatch` when there is no existing table either. On a
    /// persistence failure nothing is committed and the prior table stays
    /// authoritative.
    pub fn merge(
        &self,
        category: Category,
        batch: &SnapshotBatch,
        label: &str,
    ) -> Result<WideTable, StoreError> {
        let existing = match self.load(category) {
            Ok(table) => Some(table),
            Err(StoreError::NoData(_)) => None,
            Err(e) => return Err(e),
        };

        if batch.is_empty() {
            return existing.ok_or(StoreError::EmptyBatch(category));
        }

        let mut merged = existing.unwrap_or_default();
        merged.merge_batch(batch, label);

        let bytes = merged
            .to_csv_bytes()
            .map_err(|source| StoreError::Persistence { category, source })?;
        self.backend
            .replace(&table_filename(category), &bytes)
            .map_err(|source| StoreError::Persistence { category, source })?;

        log::info!(
            "Merged {} quotes into '{}' under label '{}' ({} items x {} columns)",
            batch.len(),
            category,
            label,
            merged.num_items(),
            merged.column_labels().len()
        );
        Ok(merged)
    }
}

/// Short-lived read-through cache for the query layer, mirroring the
/// dashboard's cached loads. Injected collaborator, never a process-wide
/// singleton.
pub struct TableCache {
    ttl: Duration,
    entries: Mutex<HashMap<Category, (Instant, Arc<WideTable>)>>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(ANALYSIS.cache.ttl_secs))
    }

    /// Serve from cache within the TTL, otherwise load through the store
    /// and refresh the entry. `NoData` is not cached.
    pub fn get_or_load<B: StorageBackend>(
        &self,
        store: &WideSeriesStore<B>,
        category: Category,
    ) -> Result<Arc<WideTable>, StoreError> {
        {
            let entries = self.entries.lock().unwrap();
            if let Some((loaded_at, table)) = entries.get(&category) {
                if loaded_at.elapsed() < self.ttl {
                    return Ok(Arc::clone(table));
                }
            }
        }

        let table = Arc::new(store.load(category)?);
        self.entries
            .lock()
            .unwrap()
            .insert(category, (Instant::now(), Arc::clone(&table)));
        Ok(table)
    }
}
