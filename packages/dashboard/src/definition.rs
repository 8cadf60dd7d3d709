//! The dashboard definition: which datasets feed it, the districts and
//! eras it compares, and how the charts are dressed.
//!
//! Like the dataset definitions, it is a TOML file embedded at compile time.

use crime_dash_analytics_models::{DistrictOfInterest, Era};
use serde::Deserialize;

use crate::DashboardError;
use crate::charts::{AnnotationBand, HeatmapStyle, MapView};

const CHICAGO_TOML: &str = include_str!("../dashboards/chicago.toml");

/// A complete dashboard definition.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardDefinition {
    pub id: String,
    pub title: String,
    /// Dataset behind the hourly, weekday, and district charts.
    pub recent_dataset: String,
    /// Dataset behind the heatmaps.
    pub historical_dataset: String,
    /// Era numbers (1-based) compared when the caller picks none.
    pub default_eras: [usize; 2],
    /// Fraction of the weekday count spread added to each end of the y-axis.
    pub weekday_range_padding: f64,
    pub districts: Vec<DistrictOfInterest>,
    pub eras: Vec<Era>,
    /// Shaded year ranges on the district trend chart.
    #[serde(default)]
    pub annotations: Vec<AnnotationBand>,
    pub map: MapView,
    pub heatmap: HeatmapStyle,
}

impl DashboardDefinition {
    /// Looks up an era by its 1-based number.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownEra`] if `number` is zero or past
    /// the last era.
    pub fn era(&self, number: usize) -> Result<&Era, DashboardError> {
        number
            .checked_sub(1)
            .and_then(|index| self.eras.get(index))
            .ok_or(DashboardError::UnknownEra {
                number,
                count: self.eras.len(),
            })
    }

    /// The two eras to compare, falling back to the configured defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownEra`] for an out-of-range number.
    pub fn era_pair(
        &self,
        first: Option<usize>,
        second: Option<usize>,
    ) -> Result<[&Era; 2], DashboardError> {
        let [default_first, default_second] = self.default_eras;
        Ok([
            self.era(first.unwrap_or(default_first))?,
            self.era(second.unwrap_or(default_second))?,
        ])
    }
}

/// Parses a dashboard definition from TOML and checks it for consistency.
///
/// # Errors
///
/// * [`DashboardError::Config`] if the TOML does not match the schema.
/// * [`DashboardError::InvalidDefinition`] if an era is inverted, a default
///   era does not exist, or the weekday padding is negative.
pub fn parse_dashboard_toml(toml_str: &str) -> Result<DashboardDefinition, DashboardError> {
    let def: DashboardDefinition = toml::from_str(toml_str)?;

    let invalid = |message: String| DashboardError::InvalidDefinition { message };

    if let Some(era) = def.eras.iter().find(|e| e.start_year > e.end_year) {
        return Err(invalid(format!("era '{}' starts after it ends", era.name)));
    }
    for number in def.default_eras {
        if def.era(number).is_err() {
            return Err(invalid(format!(
                "default era {number} is not one of the {} configured eras",
                def.eras.len()
            )));
        }
    }
    if def.weekday_range_padding < 0.0 {
        return Err(invalid("weekday_range_padding must not be negative".to_string()));
    }

    Ok(def)
}

/// The embedded Chicago dashboard.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed. This is a compile-time
/// invariant, so it indicates a build error.
#[must_use]
pub fn chicago() -> DashboardDefinition {
    parse_dashboard_toml(CHICAGO_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse chicago.toml: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chicago_definition_parses() {
        let def = chicago();
        assert_eq!(def.recent_dataset, "chicago_recent");
        assert_eq!(def.historical_dataset, "chicago_historical");

        let labels: Vec<&str> = def.districts.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Central (Downtown)", "West Side (Harrison)", "Northwest (Safe Zone)"]
        );
        assert_eq!(def.districts[1].district, 11);
        assert_eq!(def.districts[2].color, "green");

        assert_eq!(def.annotations.len(), 1);
        assert_eq!(def.annotations[0].label, "COVID-19 Affected Era");
        assert_eq!((def.annotations[0].start_year, def.annotations[0].end_year), (2020, 2022));
    }

    #[test]
    fn eras_cover_2001_through_2024() {
        let def = chicago();
        let spans: Vec<(&str, i32, i32)> = def
            .eras
            .iter()
            .map(|e| (e.name.as_str(), e.start_year, e.end_year))
            .collect();
        assert_eq!(
            spans,
            [
                ("Early 2000s", 2001, 2006),
                ("Post-Recession", 2007, 2012),
                ("Recent Past", 2013, 2018),
                ("Modern Era", 2019, 2024),
            ]
        );
    }

    #[test]
    fn default_pair_is_first_and_fourth() {
        let def = chicago();
        let [first, second] = def.era_pair(None, None).unwrap();
        assert_eq!(first.name, "Early 2000s");
        assert_eq!(second.name, "Modern Era");

        let [first, _] = def.era_pair(Some(2), None).unwrap();
        assert_eq!(first.name, "Post-Recession");
    }

    #[test]
    fn era_numbers_are_one_based() {
        let def = chicago();
        assert!(matches!(
            def.era(0),
            Err(DashboardError::UnknownEra { number: 0, count: 4 })
        ));
        assert!(def.era(5).is_err());
        assert_eq!(def.era(4).unwrap().name, "Modern Era");
    }

    #[test]
    fn rejects_missing_default_era() {
        let toml_str = CHICAGO_TOML.replace("default_eras = [1, 4]", "default_eras = [1, 9]");
        assert!(matches!(
            parse_dashboard_toml(&toml_str),
            Err(DashboardError::InvalidDefinition { .. })
        ));
    }
}
