//! Heatmap input: incident coordinates filtered to an era.

use crime_dash_analytics_models::{Era, HeatmapPoint};
use crime_dash_incident_models::{IncidentColumn, IncidentTable};

use crate::AnalyticsError;

/// Returns the `(latitude, longitude, year)` of every incident whose year
/// falls within `era`.
///
/// The year is the source's `year` column, falling back to the derived
/// calendar year when the cell is empty. Rows without coordinates or any
/// year are excluded.
///
/// # Errors
///
/// Returns [`AnalyticsError::SchemaMismatch`] if the table has no
/// `latitude` or `longitude` column, or neither a `year` nor a `date`
/// column. An empty map is never returned in place of a schema error.
pub fn heatmap_points(table: &IncidentTable, era: &Era) -> Result<Vec<HeatmapPoint>, AnalyticsError> {
    let mut missing = table.missing_columns(&[IncidentColumn::Latitude, IncidentColumn::Longitude]);
    if !table.has_column(IncidentColumn::Year) && !table.has_column(IncidentColumn::Date) {
        missing.push(IncidentColumn::Year);
    }
    if !missing.is_empty() {
        return Err(AnalyticsError::SchemaMismatch { missing });
    }

    let points: Vec<HeatmapPoint> = table
        .iter()
        .filter_map(|record| {
            let year = record.year.or_else(|| record.calendar.map(|c| c.year))?;
            Some(HeatmapPoint {
                latitude: record.latitude?,
                longitude: record.longitude?,
                year,
            })
        })
        .filter(|point| era.contains(point.year))
        .collect();

    log::debug!("{} heatmap points for {era}", points.len());

    Ok(points)
}

#[cfg(test)]
mod tests {
    use crime_dash_incident_models::IncidentRecord;

    use super::*;
    use crate::derive::derive_calendar_fields;

    fn era(start_year: i32, end_year: i32) -> Era {
        Era {
            name: "Test".to_string(),
            start_year,
            end_year,
        }
    }

    fn historical(rows: &[(Option<i32>, Option<f64>, Option<f64>)]) -> IncidentTable {
        let mut table = IncidentTable::new(vec![
            IncidentColumn::Date,
            IncidentColumn::Year,
            IncidentColumn::Latitude,
            IncidentColumn::Longitude,
        ]);
        for (year, latitude, longitude) in rows {
            table.rows.push(IncidentRecord {
                date: year.map(|y| format!("{y}-06-01T12:00:00")),
                year: *year,
                latitude: *latitude,
                longitude: *longitude,
                ..IncidentRecord::default()
            });
        }
        table
    }

    #[test]
    fn filters_to_inclusive_era() {
        let table = historical(&[
            (Some(2000), Some(41.9), Some(-87.6)),
            (Some(2001), Some(41.8), Some(-87.7)),
            (Some(2006), Some(41.7), Some(-87.5)),
            (Some(2007), Some(41.6), Some(-87.4)),
        ]);

        let points = heatmap_points(&table, &era(2001, 2006)).unwrap();
        let years: Vec<i32> = points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2001, 2006]);
    }

    #[test]
    fn skips_rows_without_coordinates() {
        let table = historical(&[
            (Some(2019), None, Some(-87.6)),
            (Some(2019), Some(41.8), Some(-87.7)),
        ]);
        assert_eq!(heatmap_points(&table, &era(2019, 2024)).unwrap().len(), 1);
    }

    #[test]
    fn falls_back_to_derived_year() {
        let mut table = historical(&[(Some(2010), Some(41.8), Some(-87.7))]);
        table.rows[0].year = None;
        let table = derive_calendar_fields(table).table;

        let points = heatmap_points(&table, &era(2007, 2012)).unwrap();
        assert_eq!(points[0].year, 2010);
    }

    #[test]
    fn missing_latitude_column_is_schema_mismatch() {
        let mut table = historical(&[(Some(2019), Some(41.8), Some(-87.7))]);
        table.columns.retain(|c| *c != IncidentColumn::Latitude);

        let err = heatmap_points(&table, &era(2019, 2024)).unwrap_err();
        let AnalyticsError::SchemaMismatch { missing } = err;
        assert_eq!(missing, vec![IncidentColumn::Latitude]);
    }
}
