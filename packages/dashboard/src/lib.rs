#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Chicago crime dashboard.
//!
//! Loads the configured datasets (through the in-process and on-disk
//! caches), derives calendar fields, aggregates them, and turns the
//! aggregates into serializable chart payloads. Rendering is left to
//! whatever consumes the JSON.

pub mod charts;
pub mod data;
pub mod definition;
pub mod interactive;
pub mod paths;
pub mod pipeline;
pub mod report;

use crime_dash_analytics::AnalyticsError;
use crime_dash_cache::CacheError;
use crime_dash_source::SourceError;
use thiserror::Error;

/// Errors from assembling the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Loading a dataset failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A table could not be aggregated.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// Cache key derivation or cache storage failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The dashboard TOML does not match the schema.
    #[error("Dashboard config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The dashboard definition parsed but is inconsistent.
    #[error("Invalid dashboard definition: {message}")]
    InvalidDefinition { message: String },

    /// No embedded dataset has this id.
    #[error("Unknown dataset: {id}")]
    UnknownDataset { id: String },

    /// An era number outside the configured list.
    #[error("Unknown era {number}: expected 1-{count}")]
    UnknownEra { number: usize, count: usize },

    /// The report could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
