use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use polars::prelude::DataFrame;
use serde::Serialize;

use super::{grouped_means, mean_cells};
use crate::error::Result;
use crate::frame::i32_values;
use crate::temporal::{DAY_OF_WEEK, HOUR, MONTH};

/// Temporal cycle an aggregate table is bucketed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cycle {
    Hour,
    DayOfWeek,
    Month,
}

impl Cycle {
    pub fn column(&self) -> &'static str {
        match self {
            Cycle::Hour => HOUR,
            Cycle::DayOfWeek => DAY_OF_WEEK,
            Cycle::Month => MONTH,
        }
    }

    /// Inclusive bucket range.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            Cycle::Hour => (0, 23),
            Cycle::DayOfWeek => (0, 6),
            Cycle::Month => (1, 12),
        }
    }

    pub fn contains(&self, bucket: u32) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&bucket)
    }

    pub fn axis_label(&self) -> &'static str {
        match self {
            Cycle::Hour => "Hour of Day",
            Cycle::DayOfWeek => "Day of Week",
            Cycle::Month => "Month",
        }
    }

    pub fn bucket_label(&self, bucket: u32) -> String {
        const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        const MONTHS: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        match self {
            Cycle::Hour => bucket.to_string(),
            Cycle::DayOfWeek => DAYS
                .get(bucket as usize)
                .map_or_else(|| bucket.to_string(), |d| d.to_string()),
            Cycle::Month => bucket
                .checked_sub(1)
                .and_then(|idx| MONTHS.get(idx as usize))
                .map_or_else(|| bucket.to_string(), |m| m.to_string()),
        }
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cycle::Hour => "hour",
            Cycle::DayOfWeek => "day_of_week",
            Cycle::Month => "month",
        })
    }
}

/// Mean value per (bucket, compound). Pairs without observations are absent, never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleTable {
    pub cycle: Cycle,
    /// Compounds with at least one mean, sorted by name.
    pub compounds: Vec<String>,
    pub rows: BTreeMap<u32, BTreeMap<String, f64>>,
}

impl CycleTable {
    pub fn get(&self, bucket: u32, compound: &str) -> Option<f64> {
        self.rows.get(&bucket)?.get(compound).copied()
    }

    pub fn buckets(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    /// (bucket, mean) points for one compound, in bucket order.
    pub fn series(&self, compound: &str) -> Vec<(u32, f64)> {
        self.rows
            .iter()
            .filter_map(|(bucket, means)| means.get(compound).map(|mean| (*bucket, *mean)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.rows
            .values()
            .flat_map(|means| means.values().copied())
            .reduce(f64::max)
    }
}

pub fn cycle_means(df: &DataFrame, cycle: Cycle, value_column: &'static str) -> Result<CycleTable> {
    let stage = "cycle aggregation";
    let means = grouped_means(df, cycle.column(), value_column, stage)?;
    let buckets = i32_values(&means, cycle.column(), stage)?;

    let mut compounds: BTreeSet<String> = BTreeSet::new();
    let mut rows: BTreeMap<u32, BTreeMap<String, f64>> = BTreeMap::new();
    for (bucket, compound, mean) in mean_cells(&means, buckets, stage)? {
        let Ok(bucket) = u32::try_from(bucket) else {
            continue;
        };
        compounds.insert(compound.clone());
        rows.entry(bucket).or_default().insert(compound, mean);
    }

    Ok(CycleTable {
        cycle,
        compounds: compounds.into_iter().collect(),
        rows,
    })
}
