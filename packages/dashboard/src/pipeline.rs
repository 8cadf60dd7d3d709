//! Load-then-build steps shared by the subcommands and the interactive
//! prompt. Each step draws its own progress bars on the given
//! [`MultiProgress`].

use std::path::Path;
use std::sync::Arc;

use crime_dash_analytics_models::Era;
use crime_dash_cli_utils::{IndicatifProgress, MultiProgress};
use crime_dash_source::snapshot::write_snapshot;
use crime_dash_source::socrata::SocrataCsvSource;

use crate::DashboardError;
use crate::data::{DataLoader, LoadedDataset};
use crate::definition::DashboardDefinition;
use crate::report::{DashboardReport, build_report};

/// Loads one dataset with a row counter.
///
/// # Errors
///
/// Returns [`DashboardError`] if the load fails.
pub async fn load(
    loader: &mut DataLoader,
    multi: &MultiProgress,
    dataset_id: &str,
) -> Result<Arc<LoadedDataset>, DashboardError> {
    let progress = IndicatifProgress::dataset_bar(multi, dataset_id);
    loader.load(dataset_id, &progress).await
}

/// Loads both datasets and builds the report for `eras`.
///
/// Both loads finish before any chart is built, so a failed load never
/// produces a partial report.
///
/// # Errors
///
/// Returns [`DashboardError`] if either load fails or the historical table
/// cannot feed a heatmap.
pub async fn full_report(
    loader: &mut DataLoader,
    multi: &MultiProgress,
    def: &DashboardDefinition,
    eras: &[&Era],
) -> Result<DashboardReport, DashboardError> {
    let steps = IndicatifProgress::datasets_bar(multi, 2);

    let recent = load(loader, multi, &def.recent_dataset).await?;
    steps.inc(1);
    let historical = load(loader, multi, &def.historical_dataset).await?;
    steps.inc(1);
    steps.finish("Datasets loaded".to_string());

    build_report(def, &recent, &historical, eras)
}

/// Downloads a dataset (or copies a snapshot) to `output` without
/// deriving anything. Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DashboardError`] if the load or the write fails.
pub async fn snapshot(
    loader: &DataLoader,
    multi: &MultiProgress,
    dataset_id: &str,
    output: &Path,
) -> Result<usize, DashboardError> {
    let def = loader.definition(dataset_id)?;
    let source = SocrataCsvSource::new(&def.api_url)?;
    let progress = IndicatifProgress::dataset_bar(multi, dataset_id);

    let load = loader.fetch_raw(dataset_id, &source, &progress).await?;
    if !load.failed_years.is_empty() {
        log::warn!(
            "Snapshot of {dataset_id} is missing {} year(s): {:?}",
            load.failed_years.len(),
            load.failed_years
        );
    }

    write_snapshot(output, &load.table)?;
    log::info!("Wrote {} rows to {}", load.table.len(), output.display());

    Ok(load.table.len())
}
