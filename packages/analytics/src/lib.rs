#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Calendar field derivation and grouped counts over incident tables.
//!
//! [`derive`] parses each record's timestamp into calendar fields;
//! [`aggregate`] and [`heatmap`] reduce a derived table into the shapes the
//! dashboard charts consume. Nothing here performs I/O, and malformed input
//! degrades to excluded rows rather than errors, except where a table's
//! schema cannot support the requested view at all.

pub mod aggregate;
pub mod derive;
pub mod heatmap;

use crime_dash_incident_models::IncidentColumn;
use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The table lacks columns the requested view needs.
    #[error("Schema mismatch: missing column(s) {missing:?}")]
    SchemaMismatch {
        /// The required columns that were not present.
        missing: Vec<IncidentColumn>,
    },
}
