#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate result types for the crime dashboard charts.
//!
//! Hourly and weekday counts always carry their full domain (24 hours, 7
//! weekdays) so chart axes stay stable; absent categories count as zero.

use std::collections::BTreeMap;

use crime_dash_incident_models::Weekday;
use serde::{Deserialize, Serialize};

/// Number of hours in a day.
pub const HOURS_PER_DAY: usize = 24;

/// Incident counts for each hour of the day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyCounts {
    /// `counts[h]` is the number of incidents in hour `h`.
    pub counts: [u64; HOURS_PER_DAY],
}

impl HourlyCounts {
    /// Adds one incident to `hour`. Hours outside 0-23 are ignored.
    pub fn increment(&mut self, hour: u32) {
        if let Some(slot) = self.counts.get_mut(hour as usize) {
            *slot += 1;
        }
    }

    /// Count for `hour`, or zero for hours outside 0-23.
    #[must_use]
    pub fn get(&self, hour: u32) -> u64 {
        self.counts.get(hour as usize).copied().unwrap_or(0)
    }

    /// `(hour, count)` pairs for all 24 hours in order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        (0u32..).zip(self.counts.iter().copied())
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Incident counts for each weekday, Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayCounts {
    /// `counts[d.index()]` is the number of incidents on weekday `d`.
    pub counts: [u64; 7],
}

impl WeekdayCounts {
    /// Adds one incident to `weekday`.
    pub const fn increment(&mut self, weekday: Weekday) {
        self.counts[weekday.index()] += 1;
    }

    /// Count for `weekday`.
    #[must_use]
    pub const fn get(&self, weekday: Weekday) -> u64 {
        self.counts[weekday.index()]
    }

    /// `(weekday, count)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, u64)> + '_ {
        Weekday::ALL.into_iter().zip(self.counts.iter().copied())
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Smallest count.
    #[must_use]
    pub fn min(&self) -> u64 {
        self.counts.iter().copied().min().unwrap_or(0)
    }

    /// Largest count.
    #[must_use]
    pub fn max(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// A police district highlighted in the comparative trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictOfInterest {
    /// District number as published by the source.
    pub district: u16,
    /// Human-readable label (e.g. "Central (Downtown)").
    pub label: String,
    /// Display color (any CSS color).
    pub color: String,
}

/// Incident count for one (year, district) combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictTrendRow {
    /// Calendar year.
    pub year: i32,
    /// District number.
    pub district: u16,
    /// Label from the matching [`DistrictOfInterest`].
    pub label: String,
    /// Number of incidents.
    pub incidents: u64,
}

/// Yearly incident counts for the districts of interest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictTrend {
    /// Rows sorted by year, then district.
    pub rows: Vec<DistrictTrendRow>,
    /// Display color per label.
    pub colors: BTreeMap<String, String>,
}

impl DistrictTrend {
    /// Labels that have at least one row, in first-appearance order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !labels.contains(&row.label.as_str()) {
                labels.push(&row.label);
            }
        }
        labels
    }

    /// `(year, incidents)` points for one label, in year order.
    #[must_use]
    pub fn series(&self, label: &str) -> Vec<(i32, u64)> {
        self.rows
            .iter()
            .filter(|r| r.label == label)
            .map(|r| (r.year, r.incidents))
            .collect()
    }

    /// The color configured for `label`.
    #[must_use]
    pub fn color(&self, label: &str) -> Option<&str> {
        self.colors.get(label).map(String::as_str)
    }
}

/// A named, inclusive range of years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Era {
    /// Display name (e.g. "Post-Recession").
    pub name: String,
    /// First year (inclusive).
    #[serde(alias = "start_year")]
    pub start_year: i32,
    /// Last year (inclusive).
    #[serde(alias = "end_year")]
    pub end_year: i32,
}

impl Era {
    /// Whether `year` falls within this era.
    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        self.start_year <= year && year <= self.end_year
    }
}

impl std::fmt::Display for Era {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}-{})", self.name, self.start_year, self.end_year)
    }
}

/// One incident location for heatmap rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapPoint {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Year of the incident.
    pub year: i32,
}
