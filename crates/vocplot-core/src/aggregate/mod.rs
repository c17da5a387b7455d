//! Chart-ready aggregates derived from one partition's observations.
//!
//! Every aggregate takes the name of the value column to summarise (`normalized_value` for
//! µg/m³ views, `scaled_value` for tier-adjusted views) and ignores null or NaN values.

mod correlation;
mod cycles;
mod daily;
mod distribution;
mod timeseries;

pub use correlation::{compound_correlation, pearson, CorrelationMatrix, TimestampPivot};
pub use cycles::{cycle_means, Cycle, CycleTable};
pub use daily::{daily_means, DailyMatrix};
pub use distribution::{distributions, quantile, DistributionSummary};
pub use timeseries::{compound_timeseries, CompoundSeries};

use polars::prelude::*;
use vocplot_parser::schema::COMPOUND_NAME;

use crate::error::Result;
use crate::frame::{f64_values, require, str_values};

/// Value column after casting to f64, as it appears in the intermediate frames below.
pub(crate) const AGG_VALUE: &str = "agg_value";

/// Rows that have a compound, a non-NaN value and every `keys` column set. Output columns are
/// `compound_name`, [`AGG_VALUE`] and `keys`.
pub(crate) fn valued_rows(
    df: &DataFrame,
    value_column: &'static str,
    keys: &[&'static str],
    stage: &'static str,
) -> Result<LazyFrame> {
    require(df, COMPOUND_NAME, stage)?;
    require(df, value_column, stage)?;
    let mut columns = vec![
        col(COMPOUND_NAME),
        col(value_column).cast(DataType::Float64).alias(AGG_VALUE),
    ];
    let mut predicate = col(COMPOUND_NAME)
        .is_not_null()
        .and(col(AGG_VALUE).is_not_null())
        .and(col(AGG_VALUE).is_not_nan());
    for key in keys {
        require(df, *key, stage)?;
        columns.push(col(*key));
        predicate = predicate.and(col(*key).is_not_null());
    }

    Ok(df.clone().lazy().select(columns).filter(predicate))
}

/// Mean value per (`key`, compound) pair that has at least one usable observation.
pub(crate) fn grouped_means(
    df: &DataFrame,
    key: &'static str,
    value_column: &'static str,
    stage: &'static str,
) -> Result<DataFrame> {
    Ok(valued_rows(df, value_column, &[key], stage)?
        .group_by([col(key), col(COMPOUND_NAME)])
        .agg([col(AGG_VALUE).mean()])
        .collect()?)
}

/// Zips the key column already read from a [`grouped_means`] frame with its compounds and means.
pub(crate) fn mean_cells<K>(
    means: &DataFrame,
    keys: Vec<Option<K>>,
    stage: &'static str,
) -> Result<Vec<(K, String, f64)>> {
    let compounds = str_values(means, COMPOUND_NAME, stage)?;
    let values = f64_values(means, AGG_VALUE, stage)?;
    Ok(keys
        .into_iter()
        .zip(compounds)
        .zip(values)
        .filter_map(|((key, compound), mean)| Some((key?, compound?, mean?)))
        .collect())
}
