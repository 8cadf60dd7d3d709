//! Calendar field derivation.
//!
//! Parses each record's raw `date` text and attaches
//! [`CalendarFields`](crime_dash_incident_models::CalendarFields). Records
//! whose timestamp is missing or unparseable keep `calendar = None`, stay in
//! the table, and are reported as [`ParseWarning`]s.

use chrono::NaiveDateTime;
use crime_dash_incident_models::{CalendarFields, IncidentTable};

/// Timestamp layouts accepted from the source, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

/// Parses a source timestamp. Returns `None` for anything unrecognized.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// A record whose timestamp could not be parsed. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// Index of the record in the table.
    pub row: usize,
    /// The raw timestamp text, or `None` if the cell was empty.
    pub value: Option<String>,
}

/// A table with calendar fields attached, plus the rows that could not be
/// derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derivation {
    /// The derived table.
    pub table: IncidentTable,
    /// One entry per record left without calendar fields.
    pub warnings: Vec<ParseWarning>,
}

/// Attaches calendar fields to every record that does not have them yet.
///
/// Records that already carry calendar fields are left untouched, so
/// deriving an already-derived table is a no-op.
#[must_use]
pub fn derive_calendar_fields(mut table: IncidentTable) -> Derivation {
    let mut warnings = Vec::new();

    for (row, record) in table.rows.iter_mut().enumerate() {
        if record.calendar.is_some() {
            continue;
        }

        record.calendar = record
            .date
            .as_deref()
            .and_then(parse_timestamp)
            .map(CalendarFields::from_datetime);

        if record.calendar.is_none() {
            warnings.push(ParseWarning {
                row,
                value: record.date.clone(),
            });
        }
    }

    if !warnings.is_empty() {
        log::warn!(
            "{} of {} rows have a missing or unparseable timestamp and are excluded from calendar aggregates (first: {:?})",
            warnings.len(),
            table.len(),
            warnings[0].value
        );
    }

    Derivation { table, warnings }
}

#[cfg(test)]
mod tests {
    use crime_dash_incident_models::{IncidentColumn, IncidentRecord, Weekday};

    use super::*;

    fn table(dates: &[Option<&str>]) -> IncidentTable {
        let mut table = IncidentTable::new(vec![IncidentColumn::Date]);
        for date in dates {
            table.rows.push(IncidentRecord {
                date: date.map(ToString::to_string),
                ..IncidentRecord::default()
            });
        }
        table
    }

    #[test]
    fn parses_source_layouts() {
        for s in [
            "2024-01-15T14:30:00.000",
            "2024-01-15T14:30:00",
            "2024-01-15 14:30:00",
            "01/15/2024 02:30:00 PM",
        ] {
            let dt = parse_timestamp(s).unwrap_or_else(|| panic!("failed to parse {s}"));
            assert_eq!(dt.to_string(), "2024-01-15 14:30:00", "{s}");
        }
    }

    #[test]
    fn rejects_invalid_timestamp() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("2024-02-30T00:00:00").is_none());
    }

    #[test]
    fn derives_calendar_fields() {
        // 2024-01-17 was a Wednesday.
        let derivation = derive_calendar_fields(table(&[Some("2024-01-17T23:10:00.000")]));
        let calendar = derivation.table.rows[0].calendar.unwrap();

        assert_eq!(calendar.year, 2024);
        assert_eq!(calendar.month, 1);
        assert_eq!(calendar.hour, 23);
        assert_eq!(calendar.weekday, Weekday::Wednesday);
        assert!(derivation.warnings.is_empty());
    }

    #[test]
    fn unparseable_rows_are_kept_and_reported() {
        let derivation = derive_calendar_fields(table(&[
            Some("2024-01-17T23:10:00"),
            Some("garbage"),
            None,
        ]));

        assert_eq!(derivation.table.len(), 3);
        assert!(derivation.table.rows[1].calendar.is_none());
        assert_eq!(
            derivation.warnings,
            vec![
                ParseWarning {
                    row: 1,
                    value: Some("garbage".to_string()),
                },
                ParseWarning { row: 2, value: None },
            ]
        );
    }

    #[test]
    fn deriving_twice_is_a_no_op() {
        let once = derive_calendar_fields(table(&[
            Some("2020-03-01T01:00:00"),
            Some("bad"),
        ]));
        let twice = derive_calendar_fields(once.table.clone());

        assert_eq!(twice.table, once.table);
        assert_eq!(twice.warnings, once.warnings);
    }
}
