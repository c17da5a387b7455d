use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::frame::{filter_rows, micros_to_naive, timestamp_micros};
use crate::temporal::TIMESTAMP;

/// Named inclusive date range. Both bounds are calendar dates, so `end` covers that whole day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDefinition {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

impl PeriodDefinition {
    pub fn new(
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            label: label.into(),
        }
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        self.start <= date && date <= self.end
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AnalysisError::Config("period name must not be empty".into()));
        }
        // The name becomes a directory under `period_analysis/`.
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(AnalysisError::Config(format!(
                "period name '{}' may only contain ASCII letters, digits, '-' and '_'",
                self.name
            )));
        }
        if self.start > self.end {
            return Err(AnalysisError::Config(format!(
                "period '{}' starts on {} after it ends on {}",
                self.name, self.start, self.end
            )));
        }
        Ok(())
    }
}

/// Only used in `const` items, so an impossible date fails the build.
const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid default period date"),
    }
}

const OCT_2023: (NaiveDate, NaiveDate) = (ymd(2023, 10, 8), ymd(2023, 10, 20));
const FEB_MAR_2023: (NaiveDate, NaiveDate) = (ymd(2023, 2, 20), ymd(2023, 3, 15));

pub fn default_periods() -> Vec<PeriodDefinition> {
    vec![
        PeriodDefinition::new("Oct_2023", OCT_2023.0, OCT_2023.1, "October 8-20, 2023"),
        PeriodDefinition::new(
            "Feb_Mar_2023",
            FEB_MAR_2023.0,
            FEB_MAR_2023.1,
            "February 20 - March 15, 2023",
        ),
    ]
}

/// Rows whose timestamp falls inside `period`. An empty frame is a normal result.
pub fn filter_period(df: &DataFrame, period: &PeriodDefinition) -> Result<DataFrame> {
    let timestamps = timestamp_micros(df, TIMESTAMP, "period filtering")?;
    let mut keep = Vec::with_capacity(timestamps.len());
    for micros in timestamps {
        let inside = match micros {
            Some(micros) => period.contains(micros_to_naive(micros)?),
            None => false,
        };
        keep.push(inside);
    }
    filter_rows(df, &keep)
}
