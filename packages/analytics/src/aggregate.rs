//! Grouped incident counts.
//!
//! Every function here recomputes from the full table it is given and only
//! looks at derived calendar fields, so input row order never affects the
//! result. Records without calendar fields (see
//! [`crate::derive::derive_calendar_fields`]) are excluded.

use std::collections::BTreeMap;

use crime_dash_analytics_models::{
    DistrictOfInterest, DistrictTrend, DistrictTrendRow, HourlyCounts, WeekdayCounts,
};
use crime_dash_incident_models::IncidentTable;

/// Counts incidents per hour of day. All 24 hours are always present.
#[must_use]
pub fn count_by_hour(table: &IncidentTable) -> HourlyCounts {
    let mut counts = HourlyCounts::default();
    for calendar in table.iter().filter_map(|r| r.calendar.as_ref()) {
        counts.increment(calendar.hour);
    }
    counts
}

/// Counts incidents per weekday. All 7 weekdays are always present, in
/// Monday-first order.
#[must_use]
pub fn count_by_weekday(table: &IncidentTable) -> WeekdayCounts {
    let mut counts = WeekdayCounts::default();
    for calendar in table.iter().filter_map(|r| r.calendar.as_ref()) {
        counts.increment(calendar.weekday);
    }
    counts
}

/// Counts incidents per (year, district) for the given districts.
///
/// Records in other districts, without a district, or without calendar
/// fields are excluded. Only combinations that occur in the data produce a
/// row.
#[must_use]
pub fn district_trends(table: &IncidentTable, districts: &[DistrictOfInterest]) -> DistrictTrend {
    let mut grouped: BTreeMap<(i32, u16), u64> = BTreeMap::new();

    for record in table {
        let (Some(calendar), Some(district)) = (record.calendar.as_ref(), record.district) else {
            continue;
        };
        if districts.iter().any(|d| d.district == district) {
            *grouped.entry((calendar.year, district)).or_default() += 1;
        }
    }

    let rows = grouped
        .into_iter()
        .filter_map(|((year, district), incidents)| {
            districts
                .iter()
                .find(|d| d.district == district)
                .map(|d| DistrictTrendRow {
                    year,
                    district,
                    label: d.label.clone(),
                    incidents,
                })
        })
        .collect();

    let colors = districts
        .iter()
        .map(|d| (d.label.clone(), d.color.clone()))
        .collect();

    DistrictTrend { rows, colors }
}

#[cfg(test)]
mod tests {
    use crime_dash_incident_models::{IncidentColumn, IncidentRecord, Weekday};

    use super::*;
    use crate::derive::derive_calendar_fields;

    fn derived(rows: &[(&str, Option<u16>)]) -> IncidentTable {
        let mut table = IncidentTable::new(vec![IncidentColumn::Date, IncidentColumn::District]);
        for (date, district) in rows {
            table.rows.push(IncidentRecord {
                date: Some((*date).to_string()),
                district: *district,
                ..IncidentRecord::default()
            });
        }
        derive_calendar_fields(table).table
    }

    fn districts() -> Vec<DistrictOfInterest> {
        vec![
            DistrictOfInterest {
                district: 1,
                label: "Central (Downtown)".to_string(),
                color: "red".to_string(),
            },
            DistrictOfInterest {
                district: 11,
                label: "West Side (Harrison)".to_string(),
                color: "blue".to_string(),
            },
            DistrictOfInterest {
                district: 16,
                label: "Northwest (Safe Zone)".to_string(),
                color: "green".to_string(),
            },
        ]
    }

    #[test]
    fn monday_monday_wednesday_example() {
        // 2024-01-15 was a Monday, 2024-01-17 a Wednesday.
        let table = derived(&[
            ("2024-01-15T08:00:00", None),
            ("2024-01-15T08:00:00", None),
            ("2024-01-17T23:00:00", None),
        ]);

        let hourly = count_by_hour(&table);
        for (hour, count) in hourly.iter() {
            let expected = match hour {
                8 => 2,
                23 => 1,
                _ => 0,
            };
            assert_eq!(count, expected, "hour {hour}");
        }

        let weekday = count_by_weekday(&table);
        for (day, count) in weekday.iter() {
            let expected = match day {
                Weekday::Monday => 2,
                Weekday::Wednesday => 1,
                _ => 0,
            };
            assert_eq!(count, expected, "{day}");
        }
    }

    #[test]
    fn totals_match_rows_with_calendar_fields() {
        let table = derived(&[
            ("2019-05-05T10:00:00", None),
            ("not a date", None),
            ("2021-12-25T00:30:00", None),
        ]);

        assert_eq!(count_by_hour(&table).total(), 2);
        assert_eq!(count_by_weekday(&table).total(), 2);
    }

    #[test]
    fn empty_table_yields_full_zero_domains() {
        let table = IncidentTable::default();
        let hourly = count_by_hour(&table);
        let weekday = count_by_weekday(&table);

        assert_eq!(hourly.iter().count(), 24);
        assert_eq!(hourly.total(), 0);
        assert_eq!(weekday.iter().count(), 7);
        assert_eq!(weekday.total(), 0);
    }

    #[test]
    fn row_order_does_not_matter() {
        let rows = [
            ("2019-05-05T10:00:00", Some(1)),
            ("2020-01-01T03:00:00", Some(11)),
            ("2019-07-04T22:00:00", Some(1)),
        ];
        let mut reversed = rows;
        reversed.reverse();

        let forward = derived(&rows);
        let backward = derived(&reversed);

        assert_eq!(count_by_hour(&forward), count_by_hour(&backward));
        assert_eq!(count_by_weekday(&forward), count_by_weekday(&backward));
        assert_eq!(
            district_trends(&forward, &districts()),
            district_trends(&backward, &districts())
        );
    }

    #[test]
    fn district_trends_keep_only_districts_of_interest() {
        let table = derived(&[
            ("2019-05-05T10:00:00", Some(1)),
            ("2019-06-05T10:00:00", Some(1)),
            ("2019-06-05T10:00:00", Some(11)),
            ("2019-06-05T10:00:00", Some(7)),
            ("2020-06-05T10:00:00", Some(16)),
            ("2020-06-05T10:00:00", None),
            ("bad", Some(1)),
        ]);

        let trend = district_trends(&table, &districts());

        let rows: Vec<(i32, u16, &str, u64)> = trend
            .rows
            .iter()
            .map(|r| (r.year, r.district, r.label.as_str(), r.incidents))
            .collect();
        assert_eq!(
            rows,
            vec![
                (2019, 1, "Central (Downtown)", 2),
                (2019, 11, "West Side (Harrison)", 1),
                (2020, 16, "Northwest (Safe Zone)", 1),
            ]
        );
        assert_eq!(trend.color("West Side (Harrison)"), Some("blue"));
        assert_eq!(trend.colors.len(), 3);
    }
}
