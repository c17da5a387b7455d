use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

use super::{grouped_means, mean_cells, CorrelationMatrix};
use crate::error::Result;
use crate::frame::{date_days, days_to_date, require};
use crate::temporal::DATE;

/// Daily mean per compound, laid out compound × day for heatmaps.
///
/// `days` runs contiguously from the first to the last observed date; days without
/// observations for a compound hold `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMatrix {
    pub compounds: Vec<String>,
    pub days: Vec<NaiveDate>,
    /// `values[compound][day]`
    pub values: Vec<Vec<Option<f64>>>,
}

impl DailyMatrix {
    pub fn get(&self, compound: &str, day: NaiveDate) -> Option<f64> {
        let row = self.compounds.iter().position(|c| c == compound)?;
        let col = self.days.iter().position(|d| *d == day)?;
        self.values[row][col]
    }

    pub fn is_empty(&self) -> bool {
        self.compounds.is_empty() || self.days.is_empty()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.values.iter().flatten().flatten().copied().reduce(f64::max)
    }

    /// Correlation between compounds using days as observations.
    pub fn correlation(&self) -> CorrelationMatrix {
        CorrelationMatrix::from_columns(self.compounds.clone(), &self.values)
    }
}

pub fn daily_means(df: &DataFrame, value_column: &'static str) -> Result<DailyMatrix> {
    let stage = "daily resampling";
    // The day range spans every dated row, with or without a usable value.
    let all_days = require(df, DATE, stage)?.cast(&DataType::Int32)?;
    let all_days = all_days.i32()?;
    let day_range: Vec<i32> = match (all_days.min(), all_days.max()) {
        (Some(first), Some(last)) => (first..=last).collect(),
        _ => Vec::new(),
    };

    let means = grouped_means(df, DATE, value_column, stage)?;
    let days = date_days(&means, DATE, stage)?;

    let mut compounds: BTreeSet<String> = BTreeSet::new();
    let mut cells: BTreeMap<(String, i32), f64> = BTreeMap::new();
    for (day, compound, mean) in mean_cells(&means, days, stage)? {
        compounds.insert(compound.clone());
        cells.insert((compound, day), mean);
    }

    let compounds: Vec<String> = compounds.into_iter().collect();
    let values = compounds
        .iter()
        .map(|compound| {
            day_range
                .iter()
                .map(|day| cells.get(&(compound.clone(), *day)).copied())
                .collect()
        })
        .collect();

    Ok(DailyMatrix {
        compounds,
        days: day_range.into_iter().filter_map(days_to_date).collect(),
        values,
    })
}
