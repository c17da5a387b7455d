use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use polars::prelude::DataFrame;
use serde::Serialize;

use super::{grouped_means, mean_cells};
use crate::error::Result;
use crate::frame::{micros_to_naive, timestamp_micros};
use crate::temporal::TIMESTAMP;

/// Square compound × compound matrix. `None` marks an undefined coefficient (fewer than two
/// complete pairs, or a zero-variance column).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Pairwise-complete Pearson correlation between the given columns.
    pub fn from_columns(labels: Vec<String>, columns: &[Vec<Option<f64>>]) -> Self {
        let n = labels.len().min(columns.len());
        let mut values = vec![vec![None; n]; n];

        for i in 0..n {
            values[i][i] = has_variance(&columns[i]).then_some(1.0);
            for j in (i + 1)..n {
                let r = pearson(&columns[i], &columns[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self {
            labels: labels.into_iter().take(n).collect(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied().flatten()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn between(&self, a: &str, b: &str) -> Option<f64> {
        self.get(self.index_of(a)?, self.index_of(b)?)
    }
}

fn finite_values(column: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    column.iter().flatten().copied().filter(|v| v.is_finite())
}

fn has_variance(column: &[Option<f64>]) -> bool {
    let mut values = finite_values(column);
    let Some(first) = values.next() else {
        return false;
    };
    values.any(|v| v != first)
}

/// Pearson coefficient over the rows where both inputs are present.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// One row per distinct timestamp, one column per compound; duplicate observations are
/// averaged.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampPivot {
    pub timestamps: Vec<NaiveDateTime>,
    pub compounds: Vec<String>,
    /// Column-major: `columns[compound][row]`.
    pub columns: Vec<Vec<Option<f64>>>,
}

impl TimestampPivot {
    pub fn build(df: &DataFrame, value_column: &'static str) -> Result<Self> {
        let stage = "timestamp pivot";
        let means = grouped_means(df, TIMESTAMP, value_column, stage)?;
        let keys = timestamp_micros(&means, TIMESTAMP, stage)?;

        let mut cells: BTreeMap<i64, BTreeMap<String, f64>> = BTreeMap::new();
        let mut compounds: BTreeSet<String> = BTreeSet::new();
        for (micros, compound, mean) in mean_cells(&means, keys, stage)? {
            compounds.insert(compound.clone());
            cells.entry(micros).or_default().insert(compound, mean);
        }

        let compounds: Vec<String> = compounds.into_iter().collect();
        let mut columns = vec![Vec::with_capacity(cells.len()); compounds.len()];
        let mut index = Vec::with_capacity(cells.len());

        for (micros, per_compound) in &cells {
            index.push(micros_to_naive(*micros)?);
            for (column, compound) in columns.iter_mut().zip(&compounds) {
                column.push(per_compound.get(compound).copied());
            }
        }

        Ok(Self {
            timestamps: index,
            compounds,
            columns,
        })
    }

    pub fn correlation(&self) -> CorrelationMatrix {
        CorrelationMatrix::from_columns(self.compounds.clone(), &self.columns)
    }
}

/// Compound-vs-compound correlation over the timestamp pivot.
pub fn compound_correlation(df: &DataFrame, value_column: &'static str) -> Result<CorrelationMatrix> {
    Ok(TimestampPivot::build(df, value_column)?.correlation())
}
