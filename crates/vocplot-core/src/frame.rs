//! Column accessors shared by the transformation stages.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::error::{AnalysisError, Result};

/// Days between 0001-01-01 and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub(crate) fn require<'a>(
    df: &'a DataFrame,
    column: &'static str,
    stage: &'static str,
) -> Result<&'a Column> {
    df.column(column)
        .map_err(|_| AnalysisError::MissingColumn { column, stage })
}

pub(crate) fn str_values(
    df: &DataFrame,
    column: &'static str,
    stage: &'static str,
) -> Result<Vec<Option<String>>> {
    let values = require(df, column, stage)?.str()?;
    Ok(values
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

pub(crate) fn f64_values(
    df: &DataFrame,
    column: &'static str,
    stage: &'static str,
) -> Result<Vec<Option<f64>>> {
    let values = require(df, column, stage)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

pub(crate) fn i32_values(
    df: &DataFrame,
    column: &'static str,
    stage: &'static str,
) -> Result<Vec<Option<i32>>> {
    let values = require(df, column, stage)?.cast(&DataType::Int32)?;
    Ok(values.i32()?.into_iter().collect())
}

/// Reads a Datetime(µs) column as raw microseconds.
pub(crate) fn timestamp_micros(
    df: &DataFrame,
    column: &'static str,
    stage: &'static str,
) -> Result<Vec<Option<i64>>> {
    let values = require(df, column, stage)?.cast(&DataType::Int64)?;
    Ok(values.i64()?.into_iter().collect())
}

/// Reads a Date column as days since the Unix epoch.
pub(crate) fn date_days(
    df: &DataFrame,
    column: &'static str,
    stage: &'static str,
) -> Result<Vec<Option<i32>>> {
    let values = require(df, column, stage)?.cast(&DataType::Int32)?;
    Ok(values.i32()?.into_iter().collect())
}

pub(crate) fn naive_to_micros(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_micros()
}

pub(crate) fn micros_to_naive(micros: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.naive_utc())
        .ok_or(AnalysisError::InvalidTimestamp(micros))
}

pub(crate) fn date_to_days(value: NaiveDate) -> i32 {
    value.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

pub(crate) fn datetime_series(name: &'static str, micros: Vec<i64>) -> Result<Series> {
    Ok(Series::new(name.into(), micros).cast(&DataType::Datetime(TimeUnit::Microseconds, None))?)
}

pub(crate) fn date_series(name: &'static str, days: Vec<i32>) -> Result<Series> {
    Ok(Series::new(name.into(), days).cast(&DataType::Date)?)
}

/// Keeps the rows whose flag is set.
pub(crate) fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask: BooleanChunked = keep.iter().copied().collect();
    Ok(df.filter(&mask)?)
}
