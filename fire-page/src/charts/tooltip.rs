//! Custom tooltip markup, styled with ApexCharts' own tooltip classes.

use chrono::DateTime;
use fire_utils::currency::format_currency;
use fire_utils::dates::format_time_from_now;
use fire_utils::rounding::to_fixed;

use super::prepare::{PreparedChart, SeriesPoint};

/// One series' value at the hovered index.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipEntry {
    pub name: String,
    pub color: String,
    /// `None` when the series has no value at this index
    pub value: Option<f64>,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_day(timestamp_ms: f64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms as i64)
        .map(|t| t.format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}

/// Title line (date, age, time from now) followed by one line per series
/// that has a value at the hovered index.
pub fn tooltip_html(timestamp_ms: f64, point: &SeriesPoint, entries: &[TooltipEntry]) -> String {
    let when = match (&point.time_from_now_text, point.time_from_now) {
        (Some(text), _) => text.clone(),
        (None, Some(years)) => format_time_from_now(years),
        (None, None) => String::new(),
    };
    let mut html = format!(
        r#"<div class="apexcharts-tooltip-title" style="font-family: inherit; font-size: 12px;">{} (Age: {}, {})</div>"#,
        format_day(timestamp_ms),
        to_fixed(point.age, 1),
        escape(&when),
    );
    for entry in entries {
        let Some(value) = entry.value else {
            continue;
        };
        html.push_str(&format!(
            r#"<div class="apexcharts-tooltip-series-group apexcharts-active" style="order: 1; display: flex;"><span class="apexcharts-tooltip-marker" style="background-color: {};"></span><div class="apexcharts-tooltip-text" style="font-family: inherit; font-size: 12px;"><div class="apexcharts-tooltip-y-group"><span class="apexcharts-tooltip-text-y-label">{}: </span><span class="apexcharts-tooltip-text-y-value">{}</span></div></div></div>"#,
            escape(&entry.color),
            escape(&entry.name),
            format_currency(value),
        ));
    }
    html
}

/// What the chart library reports about the hovered position, already
/// lifted out of its callback argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hover {
    pub series_index: usize,
    pub point_index: usize,
    /// x of the hovered point as the library parsed it
    pub timestamp_ms: Option<f64>,
    pub names: Vec<String>,
    pub colors: Vec<String>,
    /// Each series' value at `point_index`
    pub values: Vec<Option<f64>>,
}

/// Tooltip for `hover`, or `None` when it points outside the stored series.
pub fn hover_tooltip(prepared: &PreparedChart, hover: &Hover) -> Option<String> {
    let point = prepared.point(hover.series_index, hover.point_index)?;
    let timestamp = hover.timestamp_ms.or_else(|| point.x_millis())?;
    let entries: Vec<TooltipEntry> = hover
        .values
        .iter()
        .enumerate()
        .map(|(i, value)| TooltipEntry {
            name: hover.names.get(i).cloned().unwrap_or_default(),
            color: hover.colors.get(i).cloned().unwrap_or_default(),
            value: *value,
        })
        .collect();
    Some(tooltip_html(timestamp, point, &entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::prepare_config;
    use serde_json::json;

    fn point(text: Option<&str>) -> SeriesPoint {
        SeriesPoint {
            x: json!("2030-01-01"),
            y: Some(1.0),
            age: 39.3,
            time_from_now: Some(3.2),
            time_from_now_text: text.map(str::to_string),
        }
    }

    #[test]
    fn title_and_entries() {
        let entries = vec![
            TooltipEntry {
                name: "Net Worth".to_string(),
                color: "#008FFB".to_string(),
                value: Some(2_300_000.0),
            },
            TooltipEntry {
                name: "Saved".to_string(),
                color: "#00E396".to_string(),
                value: None,
            },
            TooltipEntry {
                name: "Profits".to_string(),
                color: "#FEB019".to_string(),
                value: Some(25_000.0),
            },
        ];
        // 2030-01-01T00:00:00Z
        let html = tooltip_html(1_893_456_000_000.0, &point(Some("3.2 yr from now")), &entries);

        assert!(html.starts_with(r#"<div class="apexcharts-tooltip-title""#));
        assert!(html.contains("1/1/2030 (Age: 39.3, 3.2 yr from now)"));
        assert_eq!(html.matches("apexcharts-tooltip-series-group").count(), 2);
        assert!(html.contains("background-color: #008FFB;"));
        assert!(html.contains("Net Worth: </span><span class=\"apexcharts-tooltip-text-y-value\">$2.3M"));
        assert!(html.contains("$25k"));
        assert!(!html.contains("Saved"));
    }

    #[test]
    fn falls_back_to_numeric_offset() {
        let html = tooltip_html(0.0, &point(None), &[]);
        assert!(html.contains("1/1/1970 (Age: 39.3, 3.2 yr from now)"));
    }

    #[test]
    fn escapes_series_names() {
        let entries = vec![TooltipEntry {
            name: "<b>Net</b>".to_string(),
            color: "red".to_string(),
            value: Some(1.0),
        }];
        let html = tooltip_html(0.0, &point(Some("now")), &entries);
        assert!(html.contains("&lt;b&gt;Net&lt;/b&gt;"));
    }

    #[test]
    fn rounds_half_ages_up() {
        let mut p = point(Some("now"));
        p.age = 40.25;
        assert!(tooltip_html(0.0, &p, &[]).contains("(Age: 40.3, now)"));
    }

    fn chart() -> PreparedChart {
        prepare_config(json!({
            "tooltip": {},
            "series": [
                {"name": "Net Worth", "data": [
                    {"x": "2026-11-01", "y": 50000.0, "age": 36.8, "time_from_now_text": "now"},
                    {"x": "2027-01-01", "y": 61000.0, "age": 37.0, "time_from_now_text": "0.2 yr from now"}
                ]},
                {"name": "Saved", "data": [
                    {"x": "2026-11-01", "y": 100.0, "age": 36.8}
                ]}
            ]
        }))
    }

    fn hover(point_index: usize) -> Hover {
        Hover {
            series_index: 0,
            point_index,
            timestamp_ms: None,
            names: vec!["Net Worth".to_string(), "Saved".to_string()],
            colors: vec!["#008FFB".to_string(), "#00E396".to_string()],
            values: vec![Some(61_000.0), None],
        }
    }

    #[test]
    fn hover_uses_the_stored_point() {
        let html = hover_tooltip(&chart(), &hover(1)).unwrap();
        assert!(html.contains("1/1/2027 (Age: 37.0, 0.2 yr from now)"));
        assert!(html.contains("Net Worth: </span><span class=\"apexcharts-tooltip-text-y-value\">$61k"));
        assert_eq!(html.matches("apexcharts-tooltip-series-group").count(), 1);
        assert!(!html.contains("Saved"));
    }

    #[test]
    fn hover_prefers_the_library_timestamp() {
        let mut h = hover(0);
        // 2030-01-01T00:00:00Z
        h.timestamp_ms = Some(1_893_456_000_000.0);
        let html = hover_tooltip(&chart(), &h).unwrap();
        assert!(html.contains("1/1/2030 (Age: 36.8, now)"));
    }

    #[test]
    fn hover_outside_the_series_has_no_tooltip() {
        assert!(hover_tooltip(&chart(), &hover(5)).is_none());
        let mut h = hover(0);
        h.series_index = 2;
        assert!(hover_tooltip(&chart(), &h).is_none());
    }

    #[test]
    fn hover_tolerates_missing_names_and_colors() {
        let mut h = hover(1);
        h.names.clear();
        h.colors.clear();
        let html = hover_tooltip(&chart(), &h).unwrap();
        assert!(html.contains("background-color: ;"));
        assert!(html.contains("$61k"));
    }
}
