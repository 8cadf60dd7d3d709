use std::path::{Path, PathBuf};
use std::time::Duration;

use crime_dash_incident_models::{IncidentColumn, IncidentTable};
use crime_dash_source::snapshot::{read_snapshot, write_snapshot};

use crate::{CacheError, CacheKey};

/// On-disk table cache. Each entry is `<dir>/<key>.csv`.
///
/// Freshness is judged from the file's modification time, so entries
/// survive restarts and expire by wall-clock age.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    ttl: Option<Duration>,
}

impl FileCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, ttl: Option<Duration>) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{key}.csv"))
    }

    fn is_fresh(&self, path: &Path) -> Result<bool, CacheError> {
        let Some(ttl) = self.ttl else {
            return Ok(true);
        };
        let modified = std::fs::metadata(path)?.modified()?;
        // A modification time in the future counts as brand new.
        let age = modified.elapsed().unwrap_or(Duration::ZERO);
        Ok(age < ttl)
    }

    /// Returns the cached table for `key`, or `None` if there is no entry or
    /// it has expired.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if an existing entry cannot be read or lacks a
    /// column in `required`.
    pub fn get(
        &self,
        key: &CacheKey,
        required: &[IncidentColumn],
    ) -> Result<Option<IncidentTable>, CacheError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }
        if !self.is_fresh(&path)? {
            log::info!("Cache entry {} expired", path.display());
            return Ok(None);
        }
        Ok(Some(read_snapshot(&path, required)?))
    }

    /// Stores `table` under `key`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the file cannot be written.
    pub fn put(&self, key: &CacheKey, table: &IncidentTable) -> Result<(), CacheError> {
        let path = self.path_for(key);
        write_snapshot(&path, table)?;
        log::info!("Cached {} rows at {}", table.len(), path.display());
        Ok(())
    }

    /// Removes the entry for `key`. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the file exists but cannot be removed.
    pub fn invalidate(&self, key: &CacheKey) -> Result<bool, CacheError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crime_dash_incident_models::IncidentRecord;

    use super::*;

    fn temp_cache(name: &str, ttl: Option<Duration>) -> FileCache {
        let dir = std::env::temp_dir().join(format!("crime_dash_cache_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        FileCache::new(dir, ttl)
    }

    fn sample_table() -> IncidentTable {
        let mut table = IncidentTable::new(vec![IncidentColumn::Id, IncidentColumn::Year]);
        table.rows.push(IncidentRecord {
            id: Some("1".to_string()),
            year: Some(2019),
            ..IncidentRecord::default()
        });
        table
    }

    #[test]
    fn miss_then_hit() {
        let cache = temp_cache("hit", None);
        let key = CacheKey::derive("load", "chicago_recent").unwrap();

        assert!(cache.get(&key, &[]).unwrap().is_none());

        cache.put(&key, &sample_table()).unwrap();
        let table = cache.get(&key, &[IncidentColumn::Year]).unwrap().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].year, Some(2019));

        std::fs::remove_dir_all(cache.dir()).unwrap();
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache = temp_cache("expired", Some(Duration::ZERO));
        let key = CacheKey::derive("load", "chicago_recent").unwrap();

        cache.put(&key, &sample_table()).unwrap();
        assert!(cache.get(&key, &[]).unwrap().is_none());

        std::fs::remove_dir_all(cache.dir()).unwrap();
    }

    #[test]
    fn invalidate_removes_file() {
        let cache = temp_cache("invalidate", None);
        let key = CacheKey::derive("load", "chicago_recent").unwrap();

        cache.put(&key, &sample_table()).unwrap();
        assert!(cache.invalidate(&key).unwrap());
        assert!(!cache.invalidate(&key).unwrap());
        assert!(cache.get(&key, &[]).unwrap().is_none());

        std::fs::remove_dir_all(cache.dir()).unwrap();
    }
}
