//! Report assembly.
//!
//! Each section builder takes the (already derived) table it needs and the
//! dashboard definition, and returns a chart payload. [`build_report`]
//! combines them into the full dashboard.

use std::io::Write;
use std::path::Path;

use crime_dash_analytics::aggregate::{count_by_hour, count_by_weekday, district_trends};
use crime_dash_analytics::heatmap::heatmap_points;
use crime_dash_analytics_models::Era;
use crime_dash_incident_models::IncidentTable;
use serde::Serialize;

use crate::DashboardError;
use crate::charts::{
    BarChart, HeatmapChart, LineChart, district_trend_chart, heatmap_chart, hourly_bar_chart,
    weekday_bar_chart,
};
use crate::data::LoadedDataset;
use crate::definition::DashboardDefinition;

/// How much of a dataset made it into the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetCoverage {
    pub dataset: String,
    pub rows: usize,
    pub failed_years: Vec<i32>,
    pub unparsed_timestamps: usize,
}

/// The complete dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub title: String,
    pub coverage: Vec<DatasetCoverage>,
    pub hourly: BarChart,
    pub weekday: BarChart,
    pub district_trends: LineChart,
    /// One heatmap per compared era, in the order requested.
    pub heatmaps: Vec<HeatmapChart>,
}

#[must_use]
pub fn hourly_section(table: &IncidentTable) -> BarChart {
    hourly_bar_chart(&count_by_hour(table))
}

#[must_use]
pub fn weekday_section(def: &DashboardDefinition, table: &IncidentTable) -> BarChart {
    weekday_bar_chart(&count_by_weekday(table), def.weekday_range_padding)
}

#[must_use]
pub fn trends_section(def: &DashboardDefinition, table: &IncidentTable) -> LineChart {
    district_trend_chart(&district_trends(table, &def.districts), &def.annotations)
}

/// Heatmap of `table` restricted to `era`.
///
/// # Errors
///
/// Returns [`DashboardError::Analytics`] if the table lacks coordinate or
/// year columns.
pub fn heatmap_section(
    def: &DashboardDefinition,
    table: &IncidentTable,
    era: &Era,
) -> Result<HeatmapChart, DashboardError> {
    let points = heatmap_points(table, era)?;
    log::info!("{era}: {} heatmap points", points.len());
    Ok(heatmap_chart(era, points, &def.map, def.heatmap))
}

/// Builds the full report from the recent and historical datasets.
///
/// # Errors
///
/// Returns [`DashboardError::Analytics`] if the historical table cannot
/// feed a heatmap.
pub fn build_report(
    def: &DashboardDefinition,
    recent: &LoadedDataset,
    historical: &LoadedDataset,
    eras: &[&Era],
) -> Result<DashboardReport, DashboardError> {
    let heatmaps = eras
        .iter()
        .map(|era| heatmap_section(def, &historical.table, era))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DashboardReport {
        title: def.title.clone(),
        coverage: vec![recent.coverage(), historical.coverage()],
        hourly: hourly_section(&recent.table),
        weekday: weekday_section(def, &recent.table),
        district_trends: trends_section(def, &recent.table),
        heatmaps,
    })
}

/// Writes `value` as pretty JSON to `output`, or to stdout when `None`.
///
/// # Errors
///
/// Returns [`DashboardError`] if encoding or writing fails.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), DashboardError> {
    let json = serde_json::to_string_pretty(value)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }

    Ok(())
}
