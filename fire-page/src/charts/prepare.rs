//! Turns a server-built ApexCharts configuration into what the bridge needs:
//! the raw config plus the series points used by the tooltip and the
//! full-range zoom bounds restored on double-click.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

/// One data point as emitted by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeriesPoint {
    /// Timestamp in ms or an ISO date/datetime string
    pub x: Value,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub age: f64,
    #[serde(default)]
    pub time_from_now: Option<f64>,
    #[serde(default)]
    pub time_from_now_text: Option<String>,
}

impl SeriesPoint {
    pub fn x_millis(&self) -> Option<f64> {
        x_millis(&self.x)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedChart {
    pub config: Value,
    /// The value axis has labels and should get the currency formatter
    pub currency_axis: bool,
    /// The config has a tooltip section and should get the custom renderer
    pub custom_tooltip: bool,
    pub series: Vec<Series>,
    /// Min/max x of the first series
    pub zoom_range: Option<(f64, f64)>,
}

impl PreparedChart {
    /// Underlying point for a hovered series/index pair.
    pub fn point(&self, series_index: usize, point_index: usize) -> Option<&SeriesPoint> {
        self.series.get(series_index)?.data.get(point_index)
    }
}

/// Milliseconds since the epoch for a point's `x`.
///
/// Date-only and naive datetime strings are taken as UTC.
pub fn x_millis(x: &Value) -> Option<f64> {
    match x {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                return Some(t.timestamp_millis() as f64);
            }
            if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(t.and_utc().timestamp_millis() as f64);
            }
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
            Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis() as f64)
        }
        _ => None,
    }
}

/// Min/max x over the first series, if it has any parseable points.
pub fn full_range(series: &[Series]) -> Option<(f64, f64)> {
    series
        .first()?
        .data
        .iter()
        .filter_map(SeriesPoint::x_millis)
        .fold(None, |range, x| match range {
            None => Some((x, x)),
            Some((lo, hi)) => Some((f64::min(lo, x), f64::max(hi, x))),
        })
}

fn has_axis_labels(yaxis: Option<&Value>) -> bool {
    match yaxis {
        Some(Value::Object(axis)) => axis.get("labels").is_some_and(Value::is_object),
        Some(Value::Array(axes)) => axes
            .iter()
            .any(|axis| axis.get("labels").is_some_and(Value::is_object)),
        _ => false,
    }
}

pub fn prepare_config(config: Value) -> PreparedChart {
    let series = config
        .get("series")
        .cloned()
        .and_then(|s| serde_json::from_value::<Vec<Series>>(s).ok())
        .unwrap_or_default();
    PreparedChart {
        currency_axis: has_axis_labels(config.get("yaxis")),
        custom_tooltip: config.get("tooltip").is_some_and(Value::is_object),
        zoom_range: full_range(&series),
        series,
        config,
    }
}
