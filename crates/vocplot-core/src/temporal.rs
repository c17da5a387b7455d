use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use polars::prelude::*;
use tracing::warn;
use vocplot_parser::schema::{RAW_DATE, RAW_TIME};

use crate::error::Result;
use crate::frame::{date_series, date_to_days, datetime_series, filter_rows, naive_to_micros, str_values};

pub const TIMESTAMP: &str = "timestamp";
pub const DATE: &str = "date";
pub const HOUR: &str = "hour";
pub const MONTH: &str = "month";
pub const DAY_OF_WEEK: &str = "day_of_week";

const STAGE: &str = "temporal feature extraction";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalFeatures {
    pub hour: u32,
    pub month: u32,
    /// Monday = 0 through Sunday = 6.
    pub day_of_week: u32,
}

impl From<NaiveDateTime> for TemporalFeatures {
    fn from(value: NaiveDateTime) -> Self {
        Self {
            hour: value.hour(),
            month: value.month(),
            day_of_week: value.weekday().num_days_from_monday(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemporalExtraction {
    pub dataframe: DataFrame,
    /// Rows dropped because their date/time could not be parsed.
    pub excluded_rows: usize,
}

fn is_compact_date(raw: &str) -> bool {
    raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a `YYYYMMDD` token as a calendar date.
pub fn parse_calendar_date(raw_date: &str) -> Option<NaiveDate> {
    let trimmed = raw_date.trim();
    if !is_compact_date(trimmed) {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y%m%d").ok()
}

/// Combines a `YYYYMMDD` date token with an `HH:MM` time token.
pub fn parse_timestamp(raw_date: &str, raw_time: &str) -> Option<NaiveDateTime> {
    let date = raw_date.trim();
    if !is_compact_date(date) {
        return None;
    }
    let combined = format!("{date} {}", raw_time.trim());
    NaiveDateTime::parse_from_str(&combined, "%Y%m%d %H:%M").ok()
}

/// Appends `timestamp`, `date`, `hour`, `month` and `day_of_week` columns, dropping every row
/// whose date or time does not parse.
pub fn extract_temporal_features(observations: &DataFrame) -> Result<TemporalExtraction> {
    let raw_dates = str_values(observations, RAW_DATE, STAGE)?;
    let raw_times = str_values(observations, RAW_TIME, STAGE)?;

    let len = observations.height();
    let mut keep = Vec::with_capacity(len);
    let mut timestamps = Vec::with_capacity(len);
    let mut dates = Vec::with_capacity(len);
    let mut hours = Vec::with_capacity(len);
    let mut months = Vec::with_capacity(len);
    let mut weekdays = Vec::with_capacity(len);

    for (raw_date, raw_time) in raw_dates.iter().zip(raw_times.iter()) {
        let parsed = match (raw_date.as_deref(), raw_time.as_deref()) {
            (Some(date), Some(time)) => {
                parse_timestamp(date, time).zip(parse_calendar_date(date))
            }
            _ => None,
        };

        let Some((timestamp, date)) = parsed else {
            keep.push(false);
            continue;
        };

        let features = TemporalFeatures::from(timestamp);
        keep.push(true);
        timestamps.push(naive_to_micros(timestamp));
        dates.push(date_to_days(date));
        hours.push(features.hour as i32);
        months.push(features.month as i32);
        weekdays.push(features.day_of_week as i32);
    }

    let excluded_rows = len - timestamps.len();
    if excluded_rows > 0 {
        warn!(
            excluded_rows,
            "rows with invalid dates will be excluded from analysis"
        );
    }

    let mut output = filter_rows(observations, &keep)?;
    output.hstack_mut(&[
        datetime_series(TIMESTAMP, timestamps)?.into(),
        date_series(DATE, dates)?.into(),
        Series::new(HOUR.into(), hours).into(),
        Series::new(MONTH.into(), months).into(),
        Series::new(DAY_OF_WEEK.into(), weekdays).into(),
    ])?;

    Ok(TemporalExtraction {
        dataframe: output,
        excluded_rows,
    })
}
