#![allow(clippy::module_name_repetitions)]
//! Canonical locations under the data directory.
//!
//! The data directory defaults to `data/` at the workspace root and can be
//! moved with the `CRIME_DASH_DATA_DIR` environment variable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable that overrides [`data_dir`].
pub const DATA_DIR_ENV: &str = "CRIME_DASH_DATA_DIR";

/// Returns the workspace root directory, resolved at compile time from
/// `CARGO_MANIFEST_DIR`.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the data directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    resolve_data_dir(std::env::var_os(DATA_DIR_ENV))
}

fn resolve_data_dir(env_value: Option<OsString>) -> PathBuf {
    env_value
        .filter(|value| !value.is_empty())
        .map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the `cache/` directory for the on-disk load cache.
#[must_use]
pub fn cache_dir() -> PathBuf {
    data_dir().join("cache")
}

/// Returns the `snapshots/` directory.
#[must_use]
pub fn snapshots_dir() -> PathBuf {
    data_dir().join("snapshots")
}

/// Returns the default snapshot path for a dataset.
#[must_use]
pub fn snapshot_path(dataset_id: &str) -> PathBuf {
    snapshots_dir().join(format!("{dataset_id}.csv"))
}

/// Returns the default report path.
#[must_use]
pub fn report_path() -> PathBuf {
    data_dir().join("report.json")
}
