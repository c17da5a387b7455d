use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::normalize::NormalizationPolicy;
use crate::periods::{default_periods, PeriodDefinition};
use crate::tiers::DEFAULT_LOW_TIER_THRESHOLD;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1800,
            height: 1000,
            font_family: "sans-serif".to_string(),
        }
    }
}

/// Run-scoped settings handed to the driver and the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub output_root: PathBuf,
    /// Upper bound applied to every ingested value, µg/m³.
    pub global_cap: f64,
    pub low_tier_threshold: f64,
    /// µg/m³ → ng/m³.
    pub low_tier_scale: f64,
    /// Upper bound for rescaled low-tier values, ng/m³.
    pub low_tier_cap: f64,
    pub periods: Vec<PeriodDefinition>,
    pub render: RenderSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let policy = NormalizationPolicy::default();
        Self {
            output_root: PathBuf::from("plots"),
            global_cap: policy.global_cap,
            low_tier_threshold: DEFAULT_LOW_TIER_THRESHOLD,
            low_tier_scale: policy.low_tier_scale,
            low_tier_cap: policy.low_tier_cap,
            periods: default_periods(),
            render: RenderSettings::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn normalization(&self) -> NormalizationPolicy {
        NormalizationPolicy {
            global_cap: self.global_cap,
            low_tier_scale: self.low_tier_scale,
            low_tier_cap: self.low_tier_cap,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("global_cap", self.global_cap),
            ("low_tier_threshold", self.low_tier_threshold),
            ("low_tier_scale", self.low_tier_scale),
            ("low_tier_cap", self.low_tier_cap),
        ];
        for (name, value) in bounds {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::Config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if self.render.width == 0 || self.render.height == 0 {
            return Err(AnalysisError::Config(
                "render width and height must be non-zero".into(),
            ));
        }

        let mut names = HashSet::new();
        for period in &self.periods {
            period.validate()?;
            if !names.insert(period.name.as_str()) {
                return Err(AnalysisError::Config(format!(
                    "period '{}' is defined more than once",
                    period.name
                )));
            }
        }

        Ok(())
    }
}
