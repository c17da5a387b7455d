use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::aggregate::{CompoundSeries, CorrelationMatrix, CycleTable, DailyMatrix, DistributionSummary};
use crate::periods::PeriodDefinition;
use crate::tiers::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    DistributionsOriginal,
    HourlyPatternsOriginal,
    Distributions,
    HourlyPatterns,
    WeeklyPatterns,
    MonthlyTrends,
    Correlation,
    CompoundCorrelations,
    ConcentrationHeatmap,
    Timeseries,
    Correlations,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::DistributionsOriginal => "distributions_original",
            ChartKind::HourlyPatternsOriginal => "hourly_patterns_original",
            ChartKind::Distributions => "distributions",
            ChartKind::HourlyPatterns => "hourly_patterns",
            ChartKind::WeeklyPatterns => "weekly_patterns",
            ChartKind::MonthlyTrends => "monthly_trends",
            ChartKind::Correlation => "correlation",
            ChartKind::CompoundCorrelations => "compound_correlations",
            ChartKind::ConcentrationHeatmap => "concentration_heatmap",
            ChartKind::Timeseries => "timeseries",
            ChartKind::Correlations => "correlations",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::DistributionsOriginal => "Distribution of Compound Concentrations",
            ChartKind::HourlyPatternsOriginal => "Hourly Patterns of Compound Concentrations",
            ChartKind::Distributions => "Distribution",
            ChartKind::HourlyPatterns => "Hourly Patterns",
            ChartKind::WeeklyPatterns => "Weekly Patterns",
            ChartKind::MonthlyTrends => "Monthly Trends",
            ChartKind::Correlation => "Compound Correlation",
            ChartKind::CompoundCorrelations => "Daily Compound Correlations",
            ChartKind::ConcentrationHeatmap => "Daily Concentration Heatmap",
            ChartKind::Timeseries => "Time Series",
            ChartKind::Correlations => "Compound Correlations",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConcentrationUnit {
    MicrogramsPerCubicMeter,
    NanogramsPerCubicMeter,
}

impl ConcentrationUnit {
    pub fn for_tier(tier: Option<Tier>) -> Self {
        match tier {
            Some(Tier::Low) => ConcentrationUnit::NanogramsPerCubicMeter,
            _ => ConcentrationUnit::MicrogramsPerCubicMeter,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConcentrationUnit::MicrogramsPerCubicMeter => "µg/m³",
            ConcentrationUnit::NanogramsPerCubicMeter => "ng/m³",
        }
    }
}

impl fmt::Display for ConcentrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartData {
    Cycle(CycleTable),
    Distributions(Vec<DistributionSummary>),
    Correlation(CorrelationMatrix),
    Daily(DailyMatrix),
    Timeseries(Vec<CompoundSeries>),
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Cycle(table) => table.is_empty(),
            ChartData::Distributions(summaries) => summaries.is_empty(),
            ChartData::Correlation(matrix) => matrix.is_empty(),
            ChartData::Daily(matrix) => matrix.is_empty(),
            ChartData::Timeseries(series) => series.iter().all(|s| s.points.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTag {
    pub name: String,
    pub label: String,
}

impl From<&PeriodDefinition> for PeriodTag {
    fn from(period: &PeriodDefinition) -> Self {
        Self {
            name: period.name.clone(),
            label: period.label.clone(),
        }
    }
}

/// An aggregate tagged with everything the renderer needs to label and route it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub site: String,
    pub tier: Option<Tier>,
    pub period: Option<PeriodTag>,
    pub unit: ConcentrationUnit,
    pub data: ChartData,
}

impl Chart {
    /// `site_dir` is the site's output directory name, which also prefixes the file name.
    pub fn file_name(&self, site_dir: &str) -> String {
        match self.tier {
            Some(tier) => format!("{site_dir}_{}_{}.png", self.kind, tier),
            None => format!("{site_dir}_{}.png", self.kind),
        }
    }

    /// Path relative to the output root: `<site>/` for full-history charts,
    /// `period_analysis/<period>/<site>/` for period charts.
    pub fn relative_path(&self, site_dir: &str) -> PathBuf {
        let dir = match &self.period {
            Some(period) => Path::new("period_analysis").join(&period.name).join(site_dir),
            None => PathBuf::from(site_dir),
        };
        dir.join(self.file_name(site_dir))
    }

    pub fn title(&self) -> String {
        let mut title = self.kind.title().to_string();
        if let Some(tier) = self.tier {
            title.push_str(" - ");
            title.push_str(tier.title());
        }
        title.push_str(" | ");
        title.push_str(&self.site);
        if let Some(period) = &self.period {
            title.push_str(" (");
            title.push_str(&period.label);
            title.push(')');
        }
        title
    }
}

/// Consumer of derived charts. Implementations own image encoding and styling.
pub trait ChartRenderer {
    fn render(&mut self, chart: &Chart, destination: &Path) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(tier: Option<Tier>, period: Option<PeriodTag>) -> Chart {
        Chart {
            kind: ChartKind::HourlyPatterns,
            site: "Harbor East".to_string(),
            tier,
            period,
            unit: ConcentrationUnit::for_tier(tier),
            data: ChartData::Timeseries(Vec::new()),
        }
    }

    #[test]
    fn paths_follow_site_directory() {
        assert_eq!(
            chart(Some(Tier::Low), None).relative_path("Harbor_East"),
            PathBuf::from("Harbor_East/Harbor_East_hourly_patterns_low.png")
        );

        let october = PeriodTag {
            name: "Oct_2023".to_string(),
            label: "October 8-20, 2023".to_string(),
        };
        assert_eq!(
            chart(None, Some(october)).relative_path("Harbor_East_2"),
            PathBuf::from("period_analysis/Oct_2023/Harbor_East_2/Harbor_East_2_hourly_patterns.png")
        );
    }
}
