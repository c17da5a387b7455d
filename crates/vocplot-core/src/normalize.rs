use polars::prelude::*;
use vocplot_parser::schema::{COMPOUND_NAME, VALUE};

use crate::error::Result;
use crate::frame::{f64_values, str_values};
use crate::tiers::{Tier, TierAssignment};

/// Ingested value clipped to the global cap, µg/m³.
pub const NORMALIZED_VALUE: &str = "normalized_value";
/// Tier-adjusted value: ng/m³ for low-tier compounds, µg/m³ otherwise.
pub const SCALED_VALUE: &str = "scaled_value";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationPolicy {
    pub global_cap: f64,
    pub low_tier_scale: f64,
    pub low_tier_cap: f64,
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self {
            global_cap: 15.0,
            low_tier_scale: 1000.0,
            low_tier_cap: 250.0,
        }
    }
}

impl NormalizationPolicy {
    pub fn rescale_low(&self, value: f64) -> f64 {
        clip_upper(value * self.low_tier_scale, self.low_tier_cap)
    }

    pub fn scaled(&self, value: f64, tier: Tier) -> f64 {
        match tier {
            Tier::Low => self.rescale_low(value),
            Tier::High => value,
        }
    }
}

/// Upper clip that leaves NaN untouched.
pub fn clip_upper(value: f64, bound: f64) -> f64 {
    if value > bound {
        bound
    } else {
        value
    }
}

/// Writes `normalized_value` = min(`value`, cap). Nulls stay null.
pub fn apply_global_cap(df: &DataFrame, cap: f64) -> Result<DataFrame> {
    let values = f64_values(df, VALUE, "global cap")?;
    let capped: Vec<Option<f64>> = values
        .into_iter()
        .map(|value| value.map(|v| clip_upper(v, cap)))
        .collect();

    let mut output = df.clone();
    output.with_column(Series::new(NORMALIZED_VALUE.into(), capped))?;
    Ok(output)
}

/// Writes `scaled_value` from `normalized_value` using each row's compound tier. Rows whose
/// compound is in neither tier keep their normalized value.
pub fn apply_tier_scaling(
    df: &DataFrame,
    tiers: &TierAssignment,
    policy: &NormalizationPolicy,
) -> Result<DataFrame> {
    let stage = "tier scaling";
    let compounds = str_values(df, COMPOUND_NAME, stage)?;
    let values = f64_values(df, NORMALIZED_VALUE, stage)?;

    let scaled: Vec<Option<f64>> = compounds
        .iter()
        .zip(values)
        .map(|(compound, value)| {
            let value = value?;
            let tier = compound
                .as_deref()
                .and_then(|name| tiers.tier_of(name))
                .unwrap_or(Tier::High);
            Some(policy.scaled(value, tier))
        })
        .collect();

    let mut output = df.clone();
    output.with_column(Series::new(SCALED_VALUE.into(), scaled))?;
    Ok(output)
}
