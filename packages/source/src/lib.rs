#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Paginated open-data client, bulk loader, and local snapshots.
//!
//! The [`PageSource`] trait is the seam between the [`loader`] and the
//! network: [`socrata::SocrataCsvSource`] issues real `SoQL` requests, while
//! tests drive the loader with scripted pages. Datasets are described by
//! embedded TOML definitions (see [`registry`]).

pub mod dataset_def;
pub mod loader;
pub mod parsing;
pub mod progress;
pub mod registry;
pub mod retry;
pub mod snapshot;
pub mod socrata;

use async_trait::async_trait;
use crime_dash_incident_models::{IncidentColumn, IncidentTable};
use crime_dash_source_models::SoqlQuery;

/// Errors that can occur while fetching or loading incident data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or transport failure, non-success status, or a response body
    /// that could not be decoded.
    #[error("Source unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },

    /// Expected columns were absent from a page or snapshot.
    #[error("Schema mismatch in {origin}: missing column(s) {}", join_columns(.missing))]
    SchemaMismatch {
        /// Where the data came from (URL or file path).
        origin: String,
        /// The required columns that were not present.
        missing: Vec<IncidentColumn>,
    },

    /// The request itself was malformed (e.g. an empty column selection).
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// Description of what is wrong with the query.
        message: String,
    },

    /// I/O error (snapshot read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding or encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Dataset definition could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl SourceError {
    /// Whether this error means the remote source could not be reached or
    /// answered badly, as opposed to a schema or configuration problem.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        Self::Unavailable {
            message: e.to_string(),
        }
    }
}

fn join_columns(columns: &[IncidentColumn]) -> String {
    columns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Something that can answer a single page request.
///
/// Implementations return at most `query.limit` rows with the selected
/// columns, or [`SourceError::Unavailable`] when the request fails.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches one page.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails or the response does not
    /// contain the selected columns.
    async fn fetch_page(&self, query: &SoqlQuery) -> Result<IncidentTable, SourceError>;
}
