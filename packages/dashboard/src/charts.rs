//! Chart payloads.
//!
//! Each builder turns an aggregate into a self-describing, serializable
//! chart: titles, axis labels, data, and any styling the dashboard
//! prescribes. Nothing here renders.

use crime_dash_analytics_models::{DistrictTrend, Era, HeatmapPoint, HourlyCounts, WeekdayCounts};
use serde::{Deserialize, Serialize};

/// An explicit y-axis range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

/// A single-series bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    /// Category labels in display order.
    pub categories: Vec<String>,
    /// One value per category; absent categories are zero.
    pub values: Vec<u64>,
    /// `None` lets the renderer pick the range.
    pub y_range: Option<AxisRange>,
    /// Bar width as a share of the category slot.
    pub bar_width: Option<f64>,
    /// Rotation of the category labels in degrees.
    pub x_tick_angle: Option<i32>,
    /// d3-style format for y tick labels (`","` groups thousands).
    pub y_tick_format: Option<String>,
}

/// Incidents by hour of day, all 24 hours in order.
#[must_use]
pub fn hourly_bar_chart(counts: &HourlyCounts) -> BarChart {
    let (categories, values) = counts
        .iter()
        .map(|(hour, count)| (hour.to_string(), count))
        .unzip();

    BarChart {
        title: "Number of Crimes by Hour of Day".to_string(),
        x_title: "Hour of Day".to_string(),
        y_title: "Number of Crimes".to_string(),
        categories,
        values,
        y_range: None,
        bar_width: None,
        x_tick_angle: None,
        y_tick_format: None,
    }
}

/// Incidents by weekday, Monday first, with the y-axis padded by
/// `padding * (max - min)` on both ends so differences between days stay
/// visible.
#[must_use]
pub fn weekday_bar_chart(counts: &WeekdayCounts, padding: f64) -> BarChart {
    let (categories, values) = counts
        .iter()
        .map(|(weekday, count)| (weekday.to_string(), count))
        .unzip();

    BarChart {
        title: "Number of Crimes by Weekday".to_string(),
        x_title: "Weekday".to_string(),
        y_title: "Number of Crimes".to_string(),
        categories,
        values,
        y_range: padded_range(counts.min(), counts.max(), padding),
        bar_width: Some(0.75),
        x_tick_angle: Some(45),
        y_tick_format: Some(",".to_string()),
    }
}

/// `[min - pad, max + pad]` with `pad = padding * (max - min)`.
///
/// Returns `None` when every value is equal, since the padded range would
/// be empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn padded_range(min: u64, max: u64, padding: f64) -> Option<AxisRange> {
    if max <= min {
        return None;
    }
    let (min, max) = (min as f64, max as f64);
    let pad = (max - min) * padding;
    Some(AxisRange {
        min: min - pad,
        max: max + pad,
    })
}

/// A shaded span of years on a line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AnnotationBand {
    pub label: String,
    pub start_year: i32,
    pub end_year: i32,
    pub fill_color: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub x: i32,
    pub y: u64,
}

/// One line of a line chart, drawn with markers at each point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    pub name: String,
    pub color: Option<String>,
    pub line_width: u32,
    pub marker_size: u32,
    pub points: Vec<SeriesPoint>,
}

/// A multi-series line chart with optional shaded bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub legend_title: String,
    pub series: Vec<LineSeries>,
    pub bands: Vec<AnnotationBand>,
}

/// Yearly incidents per district of interest, one line per district.
#[must_use]
pub fn district_trend_chart(trend: &DistrictTrend, bands: &[AnnotationBand]) -> LineChart {
    let series = trend
        .labels()
        .into_iter()
        .map(|label| LineSeries {
            name: label.to_string(),
            color: trend.color(label).map(str::to_string),
            line_width: 3,
            marker_size: 6,
            points: trend
                .series(label)
                .into_iter()
                .map(|(x, y)| SeriesPoint { x, y })
                .collect(),
        })
        .collect();

    let years = trend.rows.first().zip(trend.rows.last());
    let title = "Diverging Destinies: Crime Trends by District Type";
    let title = match years {
        Some((first, last)) => format!("{title} ({}-{})", first.year, last.year),
        None => title.to_string(),
    };

    LineChart {
        title,
        x_title: "Year".to_string(),
        y_title: "Total Annual Incidents".to_string(),
        legend_title: "District Archetype".to_string(),
        series,
        bands: bands.to_vec(),
    }
}

/// Initial map camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    #[serde(default)]
    pub pitch: f64,
    pub map_style: String,
}

/// Heatmap layer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct HeatmapStyle {
    pub radius_pixels: u32,
    pub intensity: f64,
    pub threshold: f64,
    pub opacity: f64,
}

/// Incident locations for one era, ready to drop onto a map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapChart {
    pub title: String,
    pub era: Era,
    pub view: MapView,
    pub style: HeatmapStyle,
    pub points: Vec<HeatmapPoint>,
}

#[must_use]
pub fn heatmap_chart(
    era: &Era,
    points: Vec<HeatmapPoint>,
    view: &MapView,
    style: HeatmapStyle,
) -> HeatmapChart {
    HeatmapChart {
        title: format!("Evolution of Crime Hotspots: {era}"),
        era: era.clone(),
        view: view.clone(),
        style,
        points,
    }
}
