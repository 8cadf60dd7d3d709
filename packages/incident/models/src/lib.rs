#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record, incident table, and calendar field types.
//!
//! An [`IncidentRecord`] is one crime report as published by the open-data
//! portal. Records are collected into an [`IncidentTable`], which also
//! remembers which [`IncidentColumn`]s were actually present in the source
//! so that downstream consumers can detect schema mismatches instead of
//! silently reading empty values.

use chrono::{Datelike as _, NaiveDateTime, Timelike as _};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Day of the week, restricted to the fixed Monday-first domain used by
/// every weekday aggregate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum Weekday {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl Weekday {
    /// All weekdays in canonical order.
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Zero-based position in the canonical order (Monday = 0).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Converts from [`chrono::Weekday`].
    #[must_use]
    pub const fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        Self::from_chrono(value)
    }
}

/// Calendar fields derived from an incident's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarFields {
    /// The parsed timestamp (local time as published, no timezone).
    pub date: NaiveDateTime,
    /// Calendar year.
    pub year: i32,
    /// Month of year (1-12).
    pub month: u32,
    /// Hour of day (0-23).
    pub hour: u32,
    /// Day of week.
    pub weekday: Weekday,
}

impl CalendarFields {
    /// Derives every calendar field from a timestamp.
    #[must_use]
    pub fn from_datetime(date: NaiveDateTime) -> Self {
        Self {
            date,
            year: date.year(),
            month: date.month(),
            hour: date.hour(),
            weekday: Weekday::from_chrono(date.weekday()),
        }
    }
}

/// A column the open-data portal publishes for each incident.
///
/// The string form matches the portal's field name exactly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncidentColumn {
    /// Unique row identifier
    Id,
    /// Police case number
    CaseNumber,
    /// When the incident occurred
    Date,
    /// Partially redacted block address
    Block,
    /// Illinois Uniform Crime Reporting code
    Iucr,
    /// Primary offense classification
    PrimaryType,
    /// Secondary offense description
    Description,
    /// Type of location
    LocationDescription,
    /// Whether an arrest was made
    Arrest,
    /// Whether the incident was domestic-related
    Domestic,
    /// Police beat
    Beat,
    /// Police district
    District,
    /// City council ward
    Ward,
    /// Community area number
    CommunityArea,
    /// FBI offense code
    FbiCode,
    /// Year as published by the source
    Year,
    /// Latitude (WGS84)
    Latitude,
    /// Longitude (WGS84)
    Longitude,
    /// Combined location text
    Location,
}

impl IncidentColumn {
    /// Every column, in the order the portal lists them.
    pub const ALL: [Self; 19] = [
        Self::Id,
        Self::CaseNumber,
        Self::Date,
        Self::Block,
        Self::Iucr,
        Self::PrimaryType,
        Self::Description,
        Self::LocationDescription,
        Self::Arrest,
        Self::Domestic,
        Self::Beat,
        Self::District,
        Self::Ward,
        Self::CommunityArea,
        Self::FbiCode,
        Self::Year,
        Self::Latitude,
        Self::Longitude,
        Self::Location,
    ];
}

/// One crime report.
///
/// Every source attribute is optional: a page only carries the columns that
/// were selected, and cells that cannot be coerced to their type are kept as
/// `None` rather than failing the load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Unique row identifier.
    pub id: Option<String>,
    /// Police case number.
    pub case_number: Option<String>,
    /// Raw timestamp text as published.
    pub date: Option<String>,
    /// Block address.
    pub block: Option<String>,
    /// IUCR code.
    pub iucr: Option<String>,
    /// Primary offense classification (e.g. "THEFT").
    pub primary_type: Option<String>,
    /// Secondary offense description.
    pub description: Option<String>,
    /// Type of location (e.g. "STREET").
    pub location_description: Option<String>,
    /// Whether an arrest was made.
    pub arrest: Option<bool>,
    /// Whether the incident was domestic-related.
    pub domestic: Option<bool>,
    /// Police beat.
    pub beat: Option<u32>,
    /// Police district.
    pub district: Option<u16>,
    /// City council ward.
    pub ward: Option<u16>,
    /// Community area number.
    pub community_area: Option<u16>,
    /// FBI offense code.
    pub fbi_code: Option<String>,
    /// Year as published by the source.
    pub year: Option<i32>,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Combined location text.
    pub location: Option<String>,
    /// Calendar fields derived from [`Self::date`]. `None` until derived, or
    /// when the timestamp is missing or unparseable.
    pub calendar: Option<CalendarFields>,
}

impl IncidentRecord {
    /// Stores a raw cell value into the field for `column`, coercing it to
    /// the field's type.
    ///
    /// Empty cells and cells that fail to coerce become `None`.
    pub fn set_cell(&mut self, column: IncidentColumn, raw: &str) {
        let raw = raw.trim();
        let text = (!raw.is_empty()).then(|| raw.to_string());

        match column {
            IncidentColumn::Id => self.id = text,
            IncidentColumn::CaseNumber => self.case_number = text,
            IncidentColumn::Date => self.date = text,
            IncidentColumn::Block => self.block = text,
            IncidentColumn::Iucr => self.iucr = text,
            IncidentColumn::PrimaryType => self.primary_type = text,
            IncidentColumn::Description => self.description = text,
            IncidentColumn::LocationDescription => self.location_description = text,
            IncidentColumn::Arrest => self.arrest = parse_bool(raw),
            IncidentColumn::Domestic => self.domestic = parse_bool(raw),
            IncidentColumn::Beat => self.beat = parse_integer(raw),
            IncidentColumn::District => self.district = parse_integer(raw),
            IncidentColumn::Ward => self.ward = parse_integer(raw),
            IncidentColumn::CommunityArea => self.community_area = parse_integer(raw),
            IncidentColumn::FbiCode => self.fbi_code = text,
            IncidentColumn::Year => self.year = parse_integer(raw),
            IncidentColumn::Latitude => self.latitude = parse_float(raw),
            IncidentColumn::Longitude => self.longitude = parse_float(raw),
            IncidentColumn::Location => self.location = text,
        }
    }

    /// Renders the field for `column` back to its textual cell form.
    ///
    /// `None` renders as an empty string.
    #[must_use]
    pub fn cell(&self, column: IncidentColumn) -> String {
        fn text(value: Option<&String>) -> String {
            value.cloned().unwrap_or_default()
        }
        fn display<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        match column {
            IncidentColumn::Id => text(self.id.as_ref()),
            IncidentColumn::CaseNumber => text(self.case_number.as_ref()),
            IncidentColumn::Date => text(self.date.as_ref()),
            IncidentColumn::Block => text(self.block.as_ref()),
            IncidentColumn::Iucr => text(self.iucr.as_ref()),
            IncidentColumn::PrimaryType => text(self.primary_type.as_ref()),
            IncidentColumn::Description => text(self.description.as_ref()),
            IncidentColumn::LocationDescription => text(self.location_description.as_ref()),
            IncidentColumn::Arrest => display(self.arrest),
            IncidentColumn::Domestic => display(self.domestic),
            IncidentColumn::Beat => display(self.beat),
            IncidentColumn::District => display(self.district),
            IncidentColumn::Ward => display(self.ward),
            IncidentColumn::CommunityArea => display(self.community_area),
            IncidentColumn::FbiCode => text(self.fbi_code.as_ref()),
            IncidentColumn::Year => display(self.year),
            IncidentColumn::Latitude => display(self.latitude),
            IncidentColumn::Longitude => display(self.longitude),
            IncidentColumn::Location => text(self.location.as_ref()),
        }
    }
}

/// Parses `true`/`false` in any case. Anything else is `None`.
fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parses an integer cell. The portal's CSV export sometimes renders whole
/// numbers as `11.0`, so a float with no fractional part is also accepted.
fn parse_integer<T>(raw: &str) -> Option<T>
where
    T: std::str::FromStr + TryFrom<i64>,
{
    if let Ok(value) = raw.parse::<T>() {
        return Some(value);
    }
    let float = raw.parse::<f64>().ok()?;
    if float.fract() != 0.0 || !float.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    T::try_from(float as i64).ok()
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// An ordered collection of incident records plus the columns the source
/// actually provided.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentTable {
    /// Columns present in the source data, in source order.
    pub columns: Vec<IncidentColumn>,
    /// Records in fetch order.
    pub rows: Vec<IncidentRecord>,
}

impl IncidentTable {
    /// Creates an empty table with the given schema.
    #[must_use]
    pub const fn new(columns: Vec<IncidentColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of records.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether `column` is part of this table's schema.
    #[must_use]
    pub fn has_column(&self, column: IncidentColumn) -> bool {
        self.columns.contains(&column)
    }

    /// Returns the subset of `required` that this table's schema lacks.
    #[must_use]
    pub fn missing_columns(&self, required: &[IncidentColumn]) -> Vec<IncidentColumn> {
        required
            .iter()
            .copied()
            .filter(|c| !self.has_column(*c))
            .collect()
    }

    /// Appends another table's rows after this table's rows.
    ///
    /// Columns new to this table are added to the schema. No deduplication
    /// is performed.
    pub fn append(&mut self, other: Self) {
        for column in other.columns {
            if !self.columns.contains(&column) {
                self.columns.push(column);
            }
        }
        self.rows.extend(other.rows);
    }

    /// Iterates over records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, IncidentRecord> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a IncidentTable {
    type Item = &'a IncidentRecord;
    type IntoIter = std::slice::Iter<'a, IncidentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
