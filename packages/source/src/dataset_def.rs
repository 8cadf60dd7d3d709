//! Config-driven dataset definitions.
//!
//! A [`DatasetDefinition`] captures everything the loader needs to know
//! about one dataset: where it lives, which columns to select, and how to
//! paginate through it. Definitions are TOML files embedded at compile time
//! (see [`crate::registry`]).

use chrono::NaiveDateTime;
use crime_dash_incident_models::IncidentColumn;
use crime_dash_source_models::{SoqlQuery, WhereClause};
use serde::{Deserialize, Serialize};

use crate::SourceError;
use crate::loader::PageDelay;

/// A complete dataset definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g. `"chicago_recent"`). Also the snapshot file
    /// stem.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Socrata CSV resource URL.
    pub api_url: String,
    /// Columns to select. These are also the columns a snapshot must carry.
    pub columns: Vec<IncidentColumn>,
    /// How to paginate through the dataset.
    pub pagination: PaginationConfig,
}

/// Pagination strategy for a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationConfig {
    /// Sequential `$offset` pages over a date range.
    Offset(OffsetPagination),
    /// One request per calendar year.
    YearPartitioned(YearPartition),
}

/// Offset pagination over a bounded date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetPagination {
    /// Timestamp column used for the range filter and ordering.
    pub date_column: IncidentColumn,
    /// Inclusive range start.
    pub start: NaiveDateTime,
    /// Inclusive range end.
    pub end: NaiveDateTime,
    /// Rows requested per page; the offset advances by this much.
    pub page_size: u64,
    /// Hard ceiling on the number of page requests.
    pub max_pages: u32,
    /// Pause between pages in milliseconds.
    #[serde(default)]
    pub delay_ms: u64,
}

impl OffsetPagination {
    /// The first page's query. Later pages differ only in `$offset`.
    #[must_use]
    pub fn base_query(&self, select: &[IncidentColumn]) -> SoqlQuery {
        SoqlQuery::new(select.to_vec(), self.page_size)
            .with_where(WhereClause::Between {
                column: self.date_column,
                start: self.start,
                end: self.end,
            })
            .with_order(self.date_column)
    }

    /// The delay to apply between pages.
    #[must_use]
    pub const fn delay(&self) -> PageDelay {
        PageDelay::from_millis(self.delay_ms)
    }
}

/// Year-partitioned pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearPartition {
    /// Integer year column used for the equality filter.
    pub year_column: IncidentColumn,
    /// Optional sort column.
    #[serde(default)]
    pub order_column: Option<IncidentColumn>,
    /// First year (inclusive).
    pub first_year: i32,
    /// Last year (inclusive).
    pub last_year: i32,
    /// Row ceiling for each per-year request.
    pub rows_per_year: u64,
    /// Pause between years in milliseconds.
    #[serde(default)]
    pub delay_ms: u64,
}

impl YearPartition {
    /// The query for a single year.
    #[must_use]
    pub fn query_for_year(&self, select: &[IncidentColumn], year: i32) -> SoqlQuery {
        let query = SoqlQuery::new(select.to_vec(), self.rows_per_year).with_where(
            WhereClause::YearEquals {
                column: self.year_column,
                year,
            },
        );
        match self.order_column {
            Some(column) => query.with_order(column),
            None => query,
        }
    }

    /// The years this partition covers, in order.
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.first_year..=self.last_year
    }

    /// The delay to apply between years.
    #[must_use]
    pub const fn delay(&self) -> PageDelay {
        PageDelay::from_millis(self.delay_ms)
    }
}

/// Caller-supplied adjustments to a dataset's pagination settings.
///
/// `page_size` applies to offset pagination and to the per-year row ceiling;
/// `max_pages` only applies to offset pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadOverrides {
    /// Replacement page size / per-year row ceiling.
    pub page_size: Option<u64>,
    /// Replacement page-count ceiling.
    pub max_pages: Option<u32>,
    /// Replacement inter-page delay in milliseconds.
    pub delay_ms: Option<u64>,
}

impl DatasetDefinition {
    /// Returns a copy of this definition with `overrides` applied.
    #[must_use]
    pub fn with_overrides(&self, overrides: &LoadOverrides) -> Self {
        let mut def = self.clone();
        match &mut def.pagination {
            PaginationConfig::Offset(offset) => {
                if let Some(size) = overrides.page_size {
                    offset.page_size = size;
                }
                if let Some(max) = overrides.max_pages {
                    offset.max_pages = max;
                }
                if let Some(ms) = overrides.delay_ms {
                    offset.delay_ms = ms;
                }
            }
            PaginationConfig::YearPartitioned(years) => {
                if let Some(size) = overrides.page_size {
                    years.rows_per_year = size;
                }
                if let Some(ms) = overrides.delay_ms {
                    years.delay_ms = ms;
                }
            }
        }
        def
    }

    /// File name this dataset's snapshot is stored under.
    #[must_use]
    pub fn snapshot_file_name(&self) -> String {
        format!("{}.csv", self.id)
    }
}

/// Parses a dataset definition from TOML and checks it for obvious
/// mistakes.
///
/// # Errors
///
/// * [`SourceError::Config`] if the TOML does not match the schema.
/// * [`SourceError::InvalidQuery`] if the definition selects no columns,
///   uses a zero page size or page ceiling, or has an inverted range.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, SourceError> {
    let def: DatasetDefinition = toml::from_str(toml_str)?;

    let invalid = |message: String| SourceError::InvalidQuery { message };

    if def.columns.is_empty() {
        return Err(invalid(format!("{}: no columns selected", def.id)));
    }

    match &def.pagination {
        PaginationConfig::Offset(offset) => {
            if offset.page_size == 0 || offset.max_pages == 0 {
                return Err(invalid(format!(
                    "{}: page_size and max_pages must be positive",
                    def.id
                )));
            }
            if offset.start > offset.end {
                return Err(invalid(format!("{}: start is after end", def.id)));
            }
        }
        PaginationConfig::YearPartitioned(years) => {
            if years.rows_per_year == 0 {
                return Err(invalid(format!("{}: rows_per_year must be positive", def.id)));
            }
            if years.first_year > years.last_year {
                return Err(invalid(format!(
                    "{}: first_year is after last_year",
                    def.id
                )));
            }
        }
    }

    Ok(def)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recent_dataset() {
        let def = parse_dataset_toml(include_str!("../datasets/chicago_recent.toml")).unwrap();
        assert_eq!(def.id, "chicago_recent");
        assert_eq!(def.columns.len(), 19);

        let PaginationConfig::Offset(offset) = &def.pagination else {
            panic!("expected offset pagination");
        };
        assert_eq!(offset.page_size, 50_000);
        assert_eq!(offset.max_pages, 1000);
        assert_eq!(offset.delay_ms, 300);

        let query = offset.base_query(&def.columns);
        assert_eq!(
            query.where_clause.unwrap().to_string(),
            "date between '2016-01-01T00:00:00' and '2025-12-31T23:59:59'"
        );
        assert_eq!(query.order, Some(IncidentColumn::Date));
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn parses_historical_dataset() {
        let def =
            parse_dataset_toml(include_str!("../datasets/chicago_historical.toml")).unwrap();
        let PaginationConfig::YearPartitioned(years) = &def.pagination else {
            panic!("expected year partitions");
        };
        assert_eq!(years.years().count(), 24);

        let query = years.query_for_year(&def.columns, 2001);
        assert_eq!(query.select_value(), "date,year,latitude,longitude");
        assert_eq!(query.where_clause.unwrap().to_string(), "year=2001");
        assert_eq!(query.limit, 15_000);
    }

    #[test]
    fn applies_overrides() {
        let def = parse_dataset_toml(include_str!("../datasets/chicago_recent.toml")).unwrap();
        let adjusted = def.with_overrides(&LoadOverrides {
            page_size: Some(10),
            max_pages: Some(2),
            delay_ms: Some(0),
        });
        let PaginationConfig::Offset(offset) = &adjusted.pagination else {
            panic!("expected offset pagination");
        };
        assert_eq!(offset.page_size, 10);
        assert_eq!(offset.max_pages, 2);
        assert_eq!(offset.delay(), PageDelay::None);
    }

    #[test]
    fn rejects_unknown_column() {
        let toml_str = r#"
            id = "bad"
            name = "Bad"
            api_url = "https://example.invalid/resource/x.csv"
            columns = ["date", "not_a_column"]

            [pagination]
            type = "year_partitioned"
            year_column = "year"
            first_year = 2001
            last_year = 2002
            rows_per_year = 10
        "#;
        assert!(matches!(
            parse_dataset_toml(toml_str),
            Err(SourceError::Config(_))
        ));
    }

    #[test]
    fn rejects_inverted_year_range() {
        let toml_str = r#"
            id = "bad"
            name = "Bad"
            api_url = "https://example.invalid/resource/x.csv"
            columns = ["date"]

            [pagination]
            type = "year_partitioned"
            year_column = "year"
            first_year = 2010
            last_year = 2002
            rows_per_year = 10
        "#;
        assert!(matches!(
            parse_dataset_toml(toml_str),
            Err(SourceError::InvalidQuery { .. })
        ));
    }
}
