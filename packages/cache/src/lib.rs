#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Memoization for expensive loads.
//!
//! Results are keyed by a [`CacheKey`] derived from a function name and its
//! serialized arguments, so repeated calls with identical arguments reuse
//! the previous result. Two stores are provided:
//!
//! * [`MemoCache`] keeps values in memory for the life of the process.
//! * [`FileCache`] persists incident tables as CSV files under a directory,
//!   so a later run can skip the network entirely.
//!
//! Both honor an optional time-to-live; `None` means entries never expire.
//! Failed loads are never cached.

mod file;
mod key;
mod memo;

pub use file::FileCache;
pub use key::CacheKey;
pub use memo::MemoCache;

use crime_dash_source::SourceError;
use thiserror::Error;

/// Errors from cache key derivation or the on-disk store.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The arguments could not be serialized into a key.
    #[error("Failed to serialize cache key arguments: {0}")]
    Key(#[from] serde_json::Error),

    /// Filesystem error while inspecting or removing a cache entry.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading or writing a cached table failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}
