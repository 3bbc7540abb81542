//! Shared utility functions for the FIRE planner crates.

/// Fixed-decimal rendering that agrees with the browser's `toFixed`
pub mod rounding {
    /// Render `value` with `digits` decimals, rounding an exact half away
    /// from zero.
    ///
    /// `format!("{:.1}", 1.25)` gives `"1.2"` (ties to even) where the page's
    /// JavaScript shows `"1.3"`. Values that only look like ties in decimal,
    /// such as `1.45` (stored just below), still round down.
    pub fn to_fixed(value: f64, digits: usize) -> String {
        let scale = 10f64.powi(digits as i32);
        let scaled = value * scale;
        let exact = value.mul_add(scale, -scaled) == 0.0;
        if exact && scaled.is_finite() && scaled.abs().fract() == 0.5 {
            let away = scaled.signum() * (scaled.abs() + 0.5);
            return format!("{:.*}", digits, away / scale);
        }
        format!("{:.*}", digits, value)
    }

}

/// Date/years-from-now conversion
pub mod dates {
    use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

    use crate::rounding::to_fixed;

    pub const DAYS_PER_YEAR: f64 = 365.25;
    /// Milliseconds in one (Julian) year.
    pub const MS_PER_YEAR: f64 = DAYS_PER_YEAR * 24.0 * 60.0 * 60.0 * 1000.0;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format (the value of a date input)
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Parse the contents of a years field. Returns `None` for anything that
    /// is not a finite number.
    pub fn parse_years(s: &str) -> Option<f64> {
        s.trim().parse::<f64>().ok().filter(|y| y.is_finite())
    }

    /// Years between `now` and the start (UTC midnight) of `date`.
    ///
    /// Dates in the past yield `0.0`, never a negative offset.
    pub fn date_to_years(date: &NaiveDate, now: &DateTime<Utc>) -> f64 {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let ms = (start - *now).num_milliseconds() as f64;
        (ms / MS_PER_YEAR).max(0.0)
    }

    /// Calendar date `years` from `now`. The time of day is dropped.
    ///
    /// Returns `None` for non-finite input or offsets outside chrono's range.
    pub fn years_to_date(years: f64, now: &DateTime<Utc>) -> Option<NaiveDate> {
        let ms = (years * MS_PER_YEAR).round();
        if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
            return None;
        }
        let delta = TimeDelta::try_milliseconds(ms as i64)?;
        now.checked_add_signed(delta).map(|t| t.date_naive())
    }

    /// One-decimal rendering used by the years field.
    pub fn format_years(years: f64) -> String {
        to_fixed(years, 1)
    }

    /// Human label for a years-from-now offset ("now", "2.5 yr from now").
    pub fn format_time_from_now(years: f64) -> String {
        if years < 0.1 {
            "now".to_string()
        } else {
            format!("{} yr from now", to_fixed(years, 1))
        }
    }

}

/// Compact currency labels for chart axes and tooltips
pub mod currency {
    use crate::rounding::to_fixed;

    /// Tiered compact dollar formatting.
    ///
    /// - below 1,000: whole dollars (`$999`)
    /// - below 100,000: thousands with one decimal (`$1.5k`)
    /// - below 1,000,000: whole thousands (`$250k`)
    /// - below 10,000,000: millions with one decimal (`$2.3M`)
    /// - otherwise whole millions (`$15M`)
    ///
    /// A trailing `.0` in the one-decimal tiers is dropped, so `25000` reads `$25k`.
    pub fn format_currency(value: f64) -> String {
        if value < 1_000.0 {
            format!("${}", to_fixed(value, 0))
        } else if value < 100_000.0 {
            format!("${}k", one_decimal(value / 1_000.0))
        } else if value < 1_000_000.0 {
            format!("${}k", to_fixed(value / 1_000.0, 0))
        } else if value < 10_000_000.0 {
            format!("${}M", one_decimal(value / 1_000_000.0))
        } else {
            format!("${}M", to_fixed(value / 1_000_000.0, 0))
        }
    }

    fn one_decimal(value: f64) -> String {
        let s = to_fixed(value, 1);
        match s.strip_suffix(".0") {
            Some(whole) => whole.to_string(),
            None => s,
        }
    }

}
