use std::collections::HashMap;

use polars::prelude::*;
use serde::Serialize;

use super::{valued_rows, AGG_VALUE};
use crate::error::Result;
use crate::frame::{require, str_values};
use vocplot_parser::schema::COMPOUND_NAME;

const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Box-plot statistics for one compound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub compound: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl DistributionSummary {
    /// `None` when there is nothing to summarise.
    pub fn from_values(compound: impl Into<String>, mut values: Vec<f64>) -> Option<Self> {
        values.retain(|v| !v.is_nan());
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let q1 = quantile(&values, 0.25)?;
        let median = quantile(&values, 0.5)?;
        let q3 = quantile(&values, 0.75)?;
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR_FACTOR * iqr;
        let high_fence = q3 + WHISKER_IQR_FACTOR * iqr;

        let lower_whisker = values
            .iter()
            .copied()
            .find(|v| *v >= low_fence)
            .unwrap_or(q1);
        let upper_whisker = values
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= high_fence)
            .unwrap_or(q3);
        let outliers = values
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            compound: compound.into(),
            count: values.len(),
            min: values[0],
            q1,
            median,
            q3,
            max: values[values.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// Linear-interpolated quantile of an ascending slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Summaries for `compounds`, in the given order; compounds without values are omitted.
pub fn distributions(
    df: &DataFrame,
    value_column: &'static str,
    compounds: &[String],
) -> Result<Vec<DistributionSummary>> {
    let stage = "distribution summary";
    let grouped = valued_rows(df, value_column, &[], stage)?
        .group_by([col(COMPOUND_NAME)])
        .agg([col(AGG_VALUE)])
        .collect()?;

    let names = str_values(&grouped, COMPOUND_NAME, stage)?;
    let lists = require(&grouped, AGG_VALUE, stage)?.list()?;
    let mut by_compound: HashMap<String, Vec<f64>> = HashMap::new();
    for (name, values) in names.into_iter().zip(lists.into_iter()) {
        let (Some(name), Some(values)) = (name, values) else {
            continue;
        };
        by_compound.insert(name, values.f64()?.into_no_null_iter().collect());
    }

    Ok(compounds
        .iter()
        .filter_map(|compound| {
            let values = by_compound.remove(compound)?;
            DistributionSummary::from_values(compound.clone(), values)
        })
        .collect())
}
