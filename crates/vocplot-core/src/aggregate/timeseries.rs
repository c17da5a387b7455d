use std::collections::HashMap;

use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;
use vocplot_parser::schema::COMPOUND_NAME;

use super::{valued_rows, AGG_VALUE};
use crate::error::Result;
use crate::frame::{micros_to_naive, require, str_values};
use crate::temporal::TIMESTAMP;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundSeries {
    pub compound: String,
    /// Sorted by timestamp.
    pub points: Vec<(NaiveDateTime, f64)>,
}

/// Raw (timestamp, value) points for each of `compounds`, in the given order.
pub fn compound_timeseries(
    df: &DataFrame,
    value_column: &'static str,
    compounds: &[String],
) -> Result<Vec<CompoundSeries>> {
    let stage = "time series";
    let grouped = valued_rows(df, value_column, &[TIMESTAMP], stage)?
        .sort([TIMESTAMP], SortMultipleOptions::default().with_maintain_order(true))
        .group_by_stable([col(COMPOUND_NAME)])
        .agg([col(TIMESTAMP), col(AGG_VALUE)])
        .collect()?;

    let names = str_values(&grouped, COMPOUND_NAME, stage)?;
    let stamps = require(&grouped, TIMESTAMP, stage)?.list()?;
    let values = require(&grouped, AGG_VALUE, stage)?.list()?;

    let mut by_compound: HashMap<String, Vec<(NaiveDateTime, f64)>> = HashMap::new();
    for ((name, stamps), values) in names
        .into_iter()
        .zip(stamps.into_iter())
        .zip(values.into_iter())
    {
        let (Some(name), Some(stamps), Some(values)) = (name, stamps, values) else {
            continue;
        };
        let stamps = stamps.cast(&DataType::Int64)?;
        let points = stamps
            .i64()?
            .into_no_null_iter()
            .zip(values.f64()?.into_no_null_iter())
            .map(|(micros, value)| Ok((micros_to_naive(micros)?, value)))
            .collect::<Result<Vec<_>>>()?;
        by_compound.insert(name, points);
    }

    Ok(compounds
        .iter()
        .filter_map(|compound| {
            let points = by_compound.remove(compound)?;
            Some(CompoundSeries {
                compound: compound.clone(),
                points,
            })
        })
        .collect())
}
