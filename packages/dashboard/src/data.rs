//! Dataset loading for the dashboard.
//!
//! [`DataLoader`] resolves a dataset id to its definition, applies the
//! caller's overrides, picks network or snapshot mode, and memoizes the
//! result twice: in memory for the life of the process and, for complete
//! network loads, on disk so the next run can skip the network.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crime_dash_analytics::derive::{Derivation, derive_calendar_fields};
use crime_dash_cache::{CacheKey, FileCache, MemoCache};
use crime_dash_incident_models::IncidentTable;
use crime_dash_source::PageSource;
use crime_dash_source::dataset_def::{DatasetDefinition, LoadOverrides};
use crime_dash_source::loader::{DatasetLoad, LoadMode, load_dataset};
use crime_dash_source::progress::ProgressCallback;
use crime_dash_source::registry::find_dataset;
use crime_dash_source::socrata::SocrataCsvSource;
use serde::Serialize;

use crate::DashboardError;
use crate::report::DatasetCoverage;

/// How datasets are loaded.
#[derive(Debug, Clone, Default)]
pub struct DataOptions {
    /// Read `<dataset_id>.csv` from here instead of the network.
    pub snapshot_dir: Option<PathBuf>,
    pub overrides: LoadOverrides,
    /// On-disk cache location. `None` disables the disk cache.
    pub cache_dir: Option<PathBuf>,
    /// Age after which cached loads are refetched. `None` never expires.
    pub cache_ttl: Option<Duration>,
}

/// A dataset after loading and calendar derivation.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: String,
    pub table: IncidentTable,
    /// Years skipped by a year-partitioned load.
    pub failed_years: Vec<i32>,
    /// Rows whose timestamp could not be parsed.
    pub unparsed_timestamps: usize,
}

impl LoadedDataset {
    fn derive(dataset: &str, table: IncidentTable, failed_years: Vec<i32>) -> Self {
        let Derivation { table, warnings } = derive_calendar_fields(table);
        Self {
            dataset: dataset.to_string(),
            table,
            failed_years,
            unparsed_timestamps: warnings.len(),
        }
    }

    #[must_use]
    pub fn coverage(&self) -> DatasetCoverage {
        DatasetCoverage {
            dataset: self.dataset.clone(),
            rows: self.table.len(),
            failed_years: self.failed_years.clone(),
            unparsed_timestamps: self.unparsed_timestamps,
        }
    }
}

/// Everything that determines a load's result: the resolved definition,
/// overrides already applied, and the snapshot path in snapshot mode.
#[derive(Serialize)]
struct LoadKey<'a> {
    definition: &'a DatasetDefinition,
    snapshot: Option<&'a Path>,
}

fn load_key(def: &DatasetDefinition, mode: &LoadMode) -> Result<CacheKey, DashboardError> {
    let snapshot = match mode {
        LoadMode::Snapshot(path) => Some(path.as_path()),
        LoadMode::Network => None,
    };
    Ok(CacheKey::derive(
        "load_dataset",
        &LoadKey {
            definition: def,
            snapshot,
        },
    )?)
}

/// Loads datasets, reusing earlier results where possible.
pub struct DataLoader {
    options: DataOptions,
    file_cache: Option<FileCache>,
    memo: MemoCache<Arc<LoadedDataset>>,
}

impl DataLoader {
    #[must_use]
    pub fn new(options: DataOptions) -> Self {
        let file_cache = options
            .cache_dir
            .as_ref()
            .map(|dir| FileCache::new(dir.clone(), options.cache_ttl));
        let memo = MemoCache::new(options.cache_ttl);
        Self {
            options,
            file_cache,
            memo,
        }
    }

    /// The embedded definition for `dataset_id` with overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownDataset`] if no dataset has that id.
    pub fn definition(&self, dataset_id: &str) -> Result<DatasetDefinition, DashboardError> {
        find_dataset(dataset_id)
            .map(|def| def.with_overrides(&self.options.overrides))
            .ok_or_else(|| DashboardError::UnknownDataset {
                id: dataset_id.to_string(),
            })
    }

    /// Snapshot mode when a snapshot directory is configured.
    #[must_use]
    pub fn mode_for(&self, def: &DatasetDefinition) -> LoadMode {
        self.options
            .snapshot_dir
            .as_ref()
            .map_or(LoadMode::Network, |dir| {
                LoadMode::Snapshot(dir.join(def.snapshot_file_name()))
            })
    }

    /// Loads the raw table, bypassing both caches.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the dataset is unknown or the load
    /// fails.
    pub async fn fetch_raw(
        &self,
        dataset_id: &str,
        source: &dyn PageSource,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<DatasetLoad, DashboardError> {
        let def = self.definition(dataset_id)?;
        Ok(load_dataset(&def, &self.mode_for(&def), source, progress).await?)
    }

    /// Loads and derives a dataset from its Socrata endpoint (or snapshot).
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the dataset is unknown, the HTTP client
    /// cannot be built, or the load fails.
    pub async fn load(
        &mut self,
        dataset_id: &str,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Arc<LoadedDataset>, DashboardError> {
        let def = self.definition(dataset_id)?;
        let source = SocrataCsvSource::new(&def.api_url)?;
        self.load_with(dataset_id, &source, progress).await
    }

    /// Like [`Self::load`] with an explicit page source.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the dataset is unknown or the load
    /// fails. Failed loads are not cached.
    pub async fn load_with(
        &mut self,
        dataset_id: &str,
        source: &dyn PageSource,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Arc<LoadedDataset>, DashboardError> {
        let def = self.definition(dataset_id)?;
        let mode = self.mode_for(&def);
        let key = load_key(&def, &mode)?;

        let file_cache = self.file_cache.as_ref();
        self.memo
            .get_or_try_load(key.clone(), || async {
                load_uncached(&def, &mode, &key, file_cache, source, progress)
                    .await
                    .map(Arc::new)
            })
            .await
    }
}

async fn load_uncached(
    def: &DatasetDefinition,
    mode: &LoadMode,
    key: &CacheKey,
    file_cache: Option<&FileCache>,
    source: &dyn PageSource,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedDataset, DashboardError> {
    let cache = file_cache.filter(|_| *mode == LoadMode::Network);

    if let Some(cache) = cache {
        match cache.get(key, &def.columns) {
            Ok(Some(table)) => {
                log::info!("[{}] Using cached load ({} rows)", def.id, table.len());
                progress.finish(format!("[{}] cached {} rows", def.id, table.len()));
                return Ok(LoadedDataset::derive(&def.id, table, Vec::new()));
            }
            Ok(None) => {}
            Err(e) => log::warn!("[{}] Ignoring unreadable cache entry: {e}", def.id),
        }
    }

    let load = load_dataset(def, mode, source, progress).await?;

    if load.failed_years.is_empty() {
        if let Some(cache) = cache
            && let Err(e) = cache.put(key, &load.table)
        {
            log::warn!("[{}] Failed to cache load: {e}", def.id);
        }
    } else {
        log::warn!(
            "[{}] {} year(s) failed to load and were skipped: {:?}",
            def.id,
            load.failed_years.len(),
            load.failed_years
        );
    }

    Ok(LoadedDataset::derive(&def.id, load.table, load.failed_years))
}
