#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `SoQL` query types for paginated open-data requests.
//!
//! A [`SoqlQuery`] describes exactly one page request against a Socrata
//! `resource` endpoint: which columns to select, an optional filter, the
//! sort column, and the `$limit`/`$offset` window.

use chrono::NaiveDateTime;
use crime_dash_incident_models::IncidentColumn;
use serde::{Deserialize, Serialize};

/// Timestamp format used inside `$where` date literals.
pub const SOQL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A `$where` filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WhereClause {
    /// `<column> between '<start>' and '<end>'` (inclusive on both ends).
    Between {
        /// Timestamp column to filter on.
        column: IncidentColumn,
        /// Range start.
        start: NaiveDateTime,
        /// Range end.
        end: NaiveDateTime,
    },
    /// `<column>=<year>`.
    YearEquals {
        /// Integer year column to filter on.
        column: IncidentColumn,
        /// The year to match.
        year: i32,
    },
    /// A free-form `SoQL` fragment passed through verbatim.
    Raw {
        /// The fragment.
        fragment: String,
    },
}

impl std::fmt::Display for WhereClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Between { column, start, end } => write!(
                f,
                "{column} between '{}' and '{}'",
                start.format(SOQL_DATETIME_FORMAT),
                end.format(SOQL_DATETIME_FORMAT)
            ),
            Self::YearEquals { column, year } => write!(f, "{column}={year}"),
            Self::Raw { fragment } => f.write_str(fragment),
        }
    }
}

/// One page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoqlQuery {
    /// Columns to select. Must not be empty.
    pub select: Vec<IncidentColumn>,
    /// Optional row filter.
    pub where_clause: Option<WhereClause>,
    /// Sort column (ascending).
    pub order: Option<IncidentColumn>,
    /// Maximum rows to return. The server may silently cap this.
    pub limit: u64,
    /// Number of rows to skip.
    pub offset: u64,
}

impl SoqlQuery {
    /// Creates a query selecting `select` with the given row limit, no
    /// filter, no ordering, and offset zero.
    #[must_use]
    pub const fn new(select: Vec<IncidentColumn>, limit: u64) -> Self {
        Self {
            select,
            where_clause: None,
            order: None,
            limit,
            offset: 0,
        }
    }

    /// Sets the `$where` filter.
    #[must_use]
    pub fn with_where(mut self, clause: WhereClause) -> Self {
        self.where_clause = Some(clause);
        self
    }

    /// Sets the `$order` column.
    #[must_use]
    pub const fn with_order(mut self, column: IncidentColumn) -> Self {
        self.order = Some(column);
        self
    }

    /// Sets the `$offset`.
    #[must_use]
    pub const fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// The comma-joined `$select` value.
    #[must_use]
    pub fn select_value(&self) -> String {
        self.select
            .iter()
            .map(|column| -> &str { column.as_ref() })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Renders the query as `(name, value)` parameter pairs, ready to be
    /// URL-encoded by the HTTP client.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("$select", self.select_value())];

        if let Some(clause) = &self.where_clause {
            params.push(("$where", clause.to_string()));
        }
        if let Some(order) = self.order {
            params.push(("$order", order.to_string()));
        }

        params.push(("$limit", self.limit.to_string()));
        params.push(("$offset", self.offset.to_string()));
        params
    }
}
