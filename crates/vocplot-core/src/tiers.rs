use std::collections::HashMap;
use std::fmt;

use polars::prelude::*;
use serde::Serialize;
use vocplot_parser::schema::COMPOUND_NAME;

use crate::error::Result;
use crate::frame::{f64_values, filter_rows, str_values};
use crate::normalize::NORMALIZED_VALUE;

/// Compounds whose partition maximum is strictly below this are low-tier (µg/m³).
pub const DEFAULT_LOW_TIER_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    High,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Low, Tier::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::High => "high",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tier::Low => "Low Concentration",
            Tier::High => "High Concentration",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Low/high split of the compounds observed in one partition, each list in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierAssignment {
    pub low: Vec<String>,
    pub high: Vec<String>,
}

impl TierAssignment {
    pub fn compounds(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Low => &self.low,
            Tier::High => &self.high,
        }
    }

    pub fn tier_of(&self, compound: &str) -> Option<Tier> {
        if self.low.iter().any(|name| name == compound) {
            Some(Tier::Low)
        } else if self.high.iter().any(|name| name == compound) {
            Some(Tier::High)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty() && self.high.is_empty()
    }
}

/// Splits the partition's compounds by their maximum `normalized_value`.
///
/// A compound is low-tier iff its maximum is strictly below `threshold`; compounds whose
/// values are all null have no maximum and are high-tier. Must run on globally capped,
/// un-rescaled values.
pub fn classify_tiers(df: &DataFrame, threshold: f64) -> Result<TierAssignment> {
    let stage = "tier classification";
    let compounds = str_values(df, COMPOUND_NAME, stage)?;
    let values = f64_values(df, NORMALIZED_VALUE, stage)?;

    let mut order: Vec<String> = Vec::new();
    let mut maxima: HashMap<String, Option<f64>> = HashMap::new();

    for (compound, value) in compounds.into_iter().zip(values) {
        let Some(compound) = compound else {
            continue;
        };
        let entry = maxima.entry(compound.clone()).or_insert_with(|| {
            order.push(compound.clone());
            None
        });
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            *entry = Some(entry.map_or(v, |current| current.max(v)));
        }
    }

    let mut assignment = TierAssignment::default();
    for compound in order {
        match maxima.get(&compound).copied().flatten() {
            Some(max) if max < threshold => assignment.low.push(compound),
            _ => assignment.high.push(compound),
        }
    }

    Ok(assignment)
}

/// Rows whose compound is one of `compounds`.
pub fn select_compounds(df: &DataFrame, compounds: &[String]) -> Result<DataFrame> {
    let names = str_values(df, COMPOUND_NAME, "compound selection")?;
    let keep: Vec<bool> = names
        .iter()
        .map(|name| {
            name.as_deref()
                .is_some_and(|name| compounds.iter().any(|c| c == name))
        })
        .collect();
    filter_rows(df, &keep)
}
