use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::*;

use vocplot_core::normalize::{apply_global_cap, NORMALIZED_VALUE};
use vocplot_core::temporal::{
    extract_temporal_features, parse_calendar_date, parse_timestamp, DATE, DAY_OF_WEEK, HOUR,
    MONTH, TIMESTAMP,
};
use vocplot_parser::parse_observations;

const HEADER: &str = "Site ID,Site name,Parameter Cd,Compound_Name,Date,Time,Value";

fn observations(rows: &[&str]) -> Result<DataFrame> {
    let mut csv = String::from(HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    Ok(parse_observations(&csv)?.df)
}

fn i32_at(df: &DataFrame, column: &str, row: usize) -> Result<Option<i32>> {
    Ok(df.column(column)?.i32()?.get(row))
}

#[test]
fn single_benzene_row_derives_calendar_fields() -> Result<()> {
    let df = observations(&["1,A,45201,Benzene,20230101,08:00,1.5"])?;

    let extraction = extract_temporal_features(&df)?;
    assert_eq!(extraction.excluded_rows, 0);

    let derived = extraction.dataframe;
    assert_eq!(derived.height(), 1);
    assert_eq!(i32_at(&derived, HOUR, 0)?, Some(8));
    assert_eq!(i32_at(&derived, MONTH, 0)?, Some(1));
    // 2023-01-01 was a Sunday
    assert_eq!(i32_at(&derived, DAY_OF_WEEK, 0)?, Some(6));

    let expected_micros = NaiveDate::from_ymd_opt(2023, 1, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp_micros();
    let micros = derived
        .column(TIMESTAMP)?
        .cast(&DataType::Int64)?
        .i64()?
        .get(0);
    assert_eq!(micros, Some(expected_micros));

    let days = derived.column(DATE)?.cast(&DataType::Int32)?.i32()?.get(0);
    assert_eq!(days, Some(19_358));

    let capped = apply_global_cap(&derived, 15.0)?;
    assert_eq!(capped.column(NORMALIZED_VALUE)?.f64()?.get(0), Some(1.5));
    Ok(())
}

#[test]
fn impossible_date_is_dropped_and_counted() -> Result<()> {
    let df = observations(&[
        "1,A,45201,Benzene,20230101,08:00,1.5",
        "1,A,45201,Benzene,20230230,09:00,0.7",
        "1,A,45201,Benzene,20230102,10:00,0.9",
    ])?;

    let extraction = extract_temporal_features(&df)?;
    assert_eq!(extraction.excluded_rows, 1);
    assert_eq!(extraction.dataframe.height(), 2);

    let hours: Vec<Option<i32>> = extraction.dataframe.column(HOUR)?.i32()?.into_iter().collect();
    assert_eq!(hours, vec![Some(8), Some(10)]);
    Ok(())
}

#[test]
fn malformed_time_and_date_tokens_are_excluded() -> Result<()> {
    let df = observations(&[
        "1,A,45201,Benzene,20230101,25:00,1.0",
        "1,A,45201,Benzene,2023-01-01,08:00,1.0",
        "1,A,45201,Benzene,20230101,,1.0",
        "1,A,45201,Benzene,20231231,23:59,1.0",
    ])?;

    let extraction = extract_temporal_features(&df)?;
    assert_eq!(extraction.excluded_rows, 3);
    assert_eq!(i32_at(&extraction.dataframe, MONTH, 0)?, Some(12));
    Ok(())
}

#[test]
fn token_parsers_reject_partial_input() {
    assert!(parse_calendar_date("20230230").is_none());
    assert!(parse_calendar_date("2023011").is_none());
    assert_eq!(
        parse_calendar_date(" 20231020 "),
        NaiveDate::from_ymd_opt(2023, 10, 20)
    );
    assert!(parse_timestamp("20231020", "8am").is_none());
    assert!(parse_timestamp("20231020", "23:59").is_some());
}
