//! Bulk loading: drives a [`PageSource`] across pages and concatenates the
//! results into one [`IncidentTable`].
//!
//! Two strategies are supported:
//!
//! * [`load_offset_paginated`] advances `$offset` by the page size until a
//!   page comes back empty or the page ceiling is reached. Any failed page
//!   aborts the load, since offset continuity is lost.
//! * [`load_year_partitioned`] issues exactly one request per year. A year
//!   whose request fails is logged and skipped.
//!
//! Either strategy can be bypassed with [`LoadMode::Snapshot`], which reads
//! the same table shape from a local file. Requests are strictly sequential:
//! at most one is ever in flight.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crime_dash_incident_models::{IncidentColumn, IncidentTable};

use crate::dataset_def::{DatasetDefinition, OffsetPagination, PaginationConfig, YearPartition};
use crate::progress::ProgressCallback;
use crate::snapshot::read_snapshot;
use crate::{PageSource, SourceError};

/// Pause applied between consecutive page requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageDelay {
    /// No pause.
    #[default]
    None,
    /// A fixed pause.
    Fixed(Duration),
}

impl PageDelay {
    /// `0` maps to [`PageDelay::None`].
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::None
        } else {
            Self::Fixed(Duration::from_millis(ms))
        }
    }

    /// Waits for the configured delay. Yields to the runtime rather than
    /// blocking the thread.
    pub async fn pause(self) {
        if let Self::Fixed(delay) = self {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Where to load a dataset from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMode {
    /// Fetch from the remote source.
    Network,
    /// Read a pre-materialized snapshot file instead.
    Snapshot(PathBuf),
}

/// Result of a year-partitioned load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearPartitionedLoad {
    /// Rows from every year that succeeded, in year order.
    pub table: IncidentTable,
    /// Years whose request failed and were skipped.
    pub failed_years: Vec<i32>,
}

/// Result of [`load_dataset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetLoad {
    /// The loaded rows.
    pub table: IncidentTable,
    /// Years skipped by a year-partitioned network load. Always empty for
    /// offset pagination and snapshots.
    pub failed_years: Vec<i32>,
}

/// Loads a date range page by page.
///
/// Starting at offset 0, requests `page_size` rows ordered by the date
/// column, advancing the offset by `page_size` after each non-empty page.
/// Stops at the first empty page or after `max_pages` requests, whichever
/// comes first.
///
/// # Errors
///
/// Returns the first [`SourceError`] from any page. No partial table is
/// returned.
pub async fn load_offset_paginated(
    source: &dyn PageSource,
    select: &[IncidentColumn],
    config: &OffsetPagination,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<IncidentTable, SourceError> {
    let base = config.base_query(select);
    let delay = config.delay();
    let mut table = IncidentTable::new(select.to_vec());
    let mut offset: u64 = 0;

    for page in 1..=config.max_pages {
        let query = base.clone().with_offset(offset);
        let rows = source.fetch_page(&query).await?;

        if rows.is_empty() {
            log::info!("Stop: page {page} is empty. Done.");
            progress.finish(format!("loaded {} rows", table.len()));
            return Ok(table);
        }

        let count = rows.len();
        table.append(rows);
        offset += config.page_size;

        log::info!("Page {page}: rows={count}, next_offset={offset}");
        progress.inc(count as u64);

        if page < config.max_pages {
            delay.pause().await;
        }
    }

    log::warn!(
        "Reached the page ceiling ({}) before an empty page; stopping with {} rows",
        config.max_pages,
        table.len()
    );
    progress.finish(format!("loaded {} rows (page ceiling reached)", table.len()));

    Ok(table)
}

/// Loads one page per year in the configured range.
///
/// Each year is requested exactly once, in order. A year whose request
/// fails with [`SourceError::Unavailable`] is logged, recorded in
/// [`YearPartitionedLoad::failed_years`], and skipped. An empty year is
/// simply an empty page and does not stop later years.
///
/// # Errors
///
/// Returns any error other than [`SourceError::Unavailable`] (for example
/// a [`SourceError::SchemaMismatch`]), which aborts the load.
pub async fn load_year_partitioned(
    source: &dyn PageSource,
    select: &[IncidentColumn],
    config: &YearPartition,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<YearPartitionedLoad, SourceError> {
    let delay = config.delay();
    let mut load = YearPartitionedLoad {
        table: IncidentTable::new(select.to_vec()),
        failed_years: Vec::new(),
    };

    let year_count = u64::try_from(config.years().count()).unwrap_or(u64::MAX);
    progress.set_total(year_count);

    for year in config.years() {
        log::info!("Fetching data for {year}...");
        let query = config.query_for_year(select, year);

        match source.fetch_page(&query).await {
            Ok(rows) => {
                log::debug!("{year}: {} rows", rows.len());
                load.table.append(rows);
            }
            Err(e) if e.is_unavailable() => {
                log::warn!("Error fetching {year}: {e}");
                load.failed_years.push(year);
            }
            Err(e) => return Err(e),
        }

        progress.inc(1);

        if year < config.last_year {
            delay.pause().await;
        }
    }

    if !load.failed_years.is_empty() {
        log::warn!(
            "Skipped {} year(s): {:?}",
            load.failed_years.len(),
            load.failed_years
        );
    }
    progress.finish(format!("loaded {} rows", load.table.len()));

    Ok(load)
}

/// Loads a dataset according to its pagination strategy, or from a
/// snapshot.
///
/// # Errors
///
/// Returns [`SourceError`] if the network load fails (see the strategy
/// functions) or the snapshot cannot be read or lacks required columns.
pub async fn load_dataset(
    def: &DatasetDefinition,
    mode: &LoadMode,
    source: &dyn PageSource,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<DatasetLoad, SourceError> {
    match mode {
        LoadMode::Snapshot(path) => {
            log::info!("[{}] Reading snapshot {}", def.id, path.display());
            let table = read_snapshot(path, &def.columns)?;
            progress.finish(format!("[{}] read {} rows", def.id, table.len()));
            Ok(DatasetLoad {
                table,
                failed_years: Vec::new(),
            })
        }
        LoadMode::Network => match &def.pagination {
            PaginationConfig::Offset(config) => {
                log::info!("[{}] Loading by offset from {}", def.id, def.api_url);
                let table = load_offset_paginated(source, &def.columns, config, progress).await?;
                Ok(DatasetLoad {
                    table,
                    failed_years: Vec::new(),
                })
            }
            PaginationConfig::YearPartitioned(config) => {
                log::info!("[{}] Loading by year from {}", def.id, def.api_url);
                let load = load_year_partitioned(source, &def.columns, config, progress).await?;
                Ok(DatasetLoad {
                    table: load.table,
                    failed_years: load.failed_years,
                })
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use crime_dash_incident_models::IncidentRecord;
    use crime_dash_source_models::SoqlQuery;

    use super::*;
    use crate::progress::null_progress;

    const SELECT: [IncidentColumn; 2] = [IncidentColumn::Id, IncidentColumn::Date];

    /// Answers page requests from a script, recording every query.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<IncidentTable, SourceError>>>,
        /// Rows per page once the script runs out; `None` means empty pages.
        endless_rows: Option<usize>,
        queries: Mutex<Vec<SoqlQuery>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<IncidentTable, SourceError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                endless_rows: None,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn endless(rows: usize) -> Self {
            Self {
                endless_rows: Some(rows),
                ..Self::new(Vec::new())
            }
        }

        fn queries(&self) -> Vec<SoqlQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch_page(&self, query: &SoqlQuery) -> Result<IncidentTable, SourceError> {
            self.queries.lock().unwrap().push(query.clone());
            let next = self.responses.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(page(query.offset, self.endless_rows.unwrap_or(0))))
        }
    }

    /// A page of `rows` records whose ids count up from `first_id`.
    fn page(first_id: u64, rows: usize) -> IncidentTable {
        let mut table = IncidentTable::new(SELECT.to_vec());
        for i in 0..rows as u64 {
            table.rows.push(IncidentRecord {
                id: Some((first_id + i).to_string()),
                date: Some("2020-06-01T12:00:00.000".to_string()),
                ..IncidentRecord::default()
            });
        }
        table
    }

    fn unavailable() -> SourceError {
        SourceError::Unavailable {
            message: "connection reset".to_string(),
        }
    }

    fn offset_config(page_size: u64, max_pages: u32) -> OffsetPagination {
        OffsetPagination {
            date_column: IncidentColumn::Date,
            start: NaiveDate::from_ymd_opt(2016, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 12, 31)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
            page_size,
            max_pages,
            delay_ms: 0,
        }
    }

    fn year_config(first_year: i32, last_year: i32) -> YearPartition {
        YearPartition {
            year_column: IncidentColumn::Year,
            order_column: Some(IncidentColumn::Date),
            first_year,
            last_year,
            rows_per_year: 100,
            delay_ms: 0,
        }
    }

    fn ids(table: &IncidentTable) -> Vec<String> {
        table.iter().filter_map(|r| r.id.clone()).collect()
    }

    #[tokio::test]
    async fn offset_pagination_concatenates_until_empty_page() {
        let source = ScriptedSource::new(vec![
            Ok(page(0, 3)),
            Ok(page(3, 3)),
            Ok(page(6, 1)),
            Ok(page(0, 0)),
        ]);

        let table = load_offset_paginated(&source, &SELECT, &offset_config(3, 100), &null_progress())
            .await
            .unwrap();

        assert_eq!(ids(&table), ["0", "1", "2", "3", "4", "5", "6"]);

        let offsets: Vec<u64> = source.queries().iter().map(|q| q.offset).collect();
        assert_eq!(offsets, [0, 3, 6, 9]);
    }

    #[tokio::test]
    async fn offset_pagination_orders_and_filters_by_date() {
        let source = ScriptedSource::new(vec![Ok(page(0, 0))]);

        load_offset_paginated(&source, &SELECT, &offset_config(50, 10), &null_progress())
            .await
            .unwrap();

        let queries = source.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].order, Some(IncidentColumn::Date));
        assert_eq!(queries[0].limit, 50);
        assert_eq!(
            queries[0].where_clause.as_ref().unwrap().to_string(),
            "date between '2016-01-01T00:00:00' and '2025-12-31T23:59:59'"
        );
    }

    #[tokio::test]
    async fn offset_pagination_respects_page_ceiling() {
        let source = ScriptedSource::endless(2);

        let table = load_offset_paginated(&source, &SELECT, &offset_config(2, 5), &null_progress())
            .await
            .unwrap();

        assert_eq!(source.queries().len(), 5);
        assert_eq!(table.len(), 10);
    }

    #[tokio::test]
    async fn offset_pagination_aborts_on_failed_page() {
        let source = ScriptedSource::new(vec![Ok(page(0, 2)), Err(unavailable()), Ok(page(4, 2))]);

        let result =
            load_offset_paginated(&source, &SELECT, &offset_config(2, 10), &null_progress()).await;

        assert!(matches!(result, Err(SourceError::Unavailable { .. })));
        assert_eq!(source.queries().len(), 2, "no requests after the failure");
    }

    #[tokio::test]
    async fn empty_first_page_is_an_empty_table() {
        let source = ScriptedSource::new(Vec::new());

        let table = load_offset_paginated(&source, &SELECT, &offset_config(10, 10), &null_progress())
            .await
            .unwrap();

        assert!(table.is_empty());
        assert_eq!(table.columns, SELECT.to_vec());
    }

    #[tokio::test]
    async fn year_pagination_requests_every_year_despite_failures() {
        let source = ScriptedSource::new(vec![
            Ok(page(100, 2)),
            Err(unavailable()),
            Ok(page(0, 0)),
            Ok(page(200, 1)),
        ]);

        let load = load_year_partitioned(&source, &SELECT, &year_config(2001, 2004), &null_progress())
            .await
            .unwrap();

        let years: Vec<String> = source
            .queries()
            .iter()
            .map(|q| q.where_clause.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(years, ["year=2001", "year=2002", "year=2003", "year=2004"]);
        assert_eq!(load.failed_years, [2002]);
        assert_eq!(ids(&load.table), ["100", "101", "200"]);
    }

    #[tokio::test]
    async fn year_pagination_aborts_on_schema_mismatch() {
        let source = ScriptedSource::new(vec![
            Ok(page(0, 1)),
            Err(SourceError::SchemaMismatch {
                origin: "test".to_string(),
                missing: vec![IncidentColumn::Latitude],
            }),
        ]);

        let result =
            load_year_partitioned(&source, &SELECT, &year_config(2001, 2005), &null_progress())
                .await;

        assert!(matches!(result, Err(SourceError::SchemaMismatch { .. })));
        assert_eq!(source.queries().len(), 2);
    }

    #[tokio::test]
    async fn year_pagination_tolerates_every_year_failing() {
        let source = ScriptedSource::new(vec![Err(unavailable()), Err(unavailable())]);

        let load = load_year_partitioned(&source, &SELECT, &year_config(2001, 2002), &null_progress())
            .await
            .unwrap();

        assert!(load.table.is_empty());
        assert_eq!(load.failed_years, [2001, 2002]);
    }

    #[tokio::test]
    async fn snapshot_mode_skips_the_network() {
        let dir = std::env::temp_dir().join("crime_dash_loader_snapshot_mode");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("recent.csv");
        std::fs::write(&path, "id,date\n7,2020-06-01T12:00:00.000\n").unwrap();

        let def = DatasetDefinition {
            id: "recent".to_string(),
            name: "Recent".to_string(),
            api_url: "https://example.invalid/resource/x.csv".to_string(),
            columns: SELECT.to_vec(),
            pagination: PaginationConfig::Offset(offset_config(10, 10)),
        };
        let source = ScriptedSource::new(Vec::new());

        let load = load_dataset(&def, &LoadMode::Snapshot(path), &source, &null_progress())
            .await
            .unwrap();

        assert_eq!(ids(&load.table), ["7"]);
        assert!(source.queries().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test(start_paused = true)]
    async fn offset_delay_runs_between_pages_only() {
        let source = ScriptedSource::new(vec![
            Ok(page(0, 2)),
            Ok(page(2, 2)),
            Ok(page(4, 1)),
            Ok(page(0, 0)),
        ]);
        let config = OffsetPagination {
            delay_ms: 300,
            ..offset_config(2, 10)
        };

        let started = tokio::time::Instant::now();
        load_offset_paginated(&source, &SELECT, &config, &null_progress())
            .await
            .unwrap();

        assert_eq!(source.queries().len(), 4);
        assert_eq!(started.elapsed(), Duration::from_millis(900));
    }

    #[tokio::test(start_paused = true)]
    async fn offset_delay_skips_the_page_at_the_ceiling() {
        let source = ScriptedSource::endless(2);
        let config = OffsetPagination {
            delay_ms: 300,
            ..offset_config(2, 5)
        };

        let started = tokio::time::Instant::now();
        load_offset_paginated(&source, &SELECT, &config, &null_progress())
            .await
            .unwrap();

        assert_eq!(source.queries().len(), 5);
        assert_eq!(started.elapsed(), Duration::from_millis(4 * 300));
    }

    #[tokio::test(start_paused = true)]
    async fn year_delay_runs_between_years_only() {
        let source = ScriptedSource::new(vec![
            Ok(page(0, 1)),
            Err(unavailable()),
            Ok(page(0, 0)),
            Ok(page(1, 1)),
        ]);
        let config = YearPartition {
            delay_ms: 250,
            ..year_config(2001, 2004)
        };

        let started = tokio::time::Instant::now();
        load_year_partitioned(&source, &SELECT, &config, &null_progress())
            .await
            .unwrap();

        assert_eq!(source.queries().len(), 4);
        assert_eq!(started.elapsed(), Duration::from_millis(3 * 250));
    }

    #[test]
    fn zero_delay_is_none() {
        assert_eq!(PageDelay::from_millis(0), PageDelay::None);
        assert_eq!(
            PageDelay::from_millis(300),
            PageDelay::Fixed(Duration::from_millis(300))
        );
    }
}
