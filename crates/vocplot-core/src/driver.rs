//! Per-site and per-(site, period) orchestration.
//!
//! Each unit runs tier classification and aggregation on its own partition and hands the
//! resulting charts to a [`ChartRenderer`]. A unit that fails is recorded in the
//! [`RunReport`] and iteration moves on to the next unit.

use std::fmt;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info, warn};
use vocplot_parser::read_observation_file;

use crate::aggregate::{
    compound_correlation, compound_timeseries, cycle_means, daily_means, distributions, Cycle,
};
use crate::charts::{Chart, ChartData, ChartKind, ChartRenderer, ConcentrationUnit, PeriodTag};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::normalize::{apply_global_cap, apply_tier_scaling, NORMALIZED_VALUE, SCALED_VALUE};
use crate::periods::{filter_period, PeriodDefinition};
use crate::sites::{distinct_sites, site_directories, site_partition, site_slug};
use crate::temporal::extract_temporal_features;
use crate::tiers::{classify_tiers, select_compounds, Tier, TierAssignment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    FullHistory,
    Periods,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisMode::FullHistory => "full_history",
            AnalysisMode::Periods => "periods",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    Rendered { charts: Vec<PathBuf> },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitOutcome {
    pub site: String,
    pub period: Option<String>,
    #[serde(flatten)]
    pub status: UnitStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub mode: AnalysisMode,
    pub excluded_rows: usize,
    pub units: Vec<UnitOutcome>,
}

impl RunReport {
    fn new(mode: AnalysisMode, excluded_rows: usize) -> Self {
        Self {
            mode,
            excluded_rows,
            units: Vec::new(),
        }
    }

    pub fn chart_count(&self) -> usize {
        self.units
            .iter()
            .map(|unit| match &unit.status {
                UnitStatus::Rendered { charts } => charts.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn failed_units(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.units
            .iter()
            .filter(|unit| matches!(unit.status, UnitStatus::Failed { .. }))
    }

    pub fn skipped_units(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.units
            .iter()
            .filter(|unit| matches!(unit.status, UnitStatus::Skipped { .. }))
    }
}

/// Observations with temporal features and `normalized_value`, ready for partitioning.
#[derive(Debug, Clone)]
pub struct PreparedObservations {
    pub dataframe: DataFrame,
    pub excluded_rows: usize,
}

/// Reads the input export. Missing files and missing required columns abort the run.
pub fn load_observations(path: &Path) -> Result<DataFrame> {
    let parsed = read_observation_file(path)?;
    if !parsed.ignored_headers.is_empty() {
        debug!(columns = ?parsed.ignored_headers, "ignoring unrecognised columns");
    }
    if parsed.unreadable_wind_cells > 0 {
        warn!(
            cells = parsed.unreadable_wind_cells,
            "non-numeric wind readings were treated as missing"
        );
    }
    info!(
        path = %path.display(),
        rows = parsed.row_count(),
        wind = parsed.has_wind(),
        "loaded observations"
    );
    Ok(parsed.df)
}

/// Temporal extraction followed by the global cap. Errors here abort the run.
pub fn prepare(observations: &DataFrame, config: &AnalysisConfig) -> Result<PreparedObservations> {
    let extraction = extract_temporal_features(observations)?;
    let dataframe = apply_global_cap(&extraction.dataframe, config.global_cap)?;
    Ok(PreparedObservations {
        dataframe,
        excluded_rows: extraction.excluded_rows,
    })
}

fn classify_and_scale(df: &DataFrame, config: &AnalysisConfig) -> Result<(TierAssignment, DataFrame)> {
    let tiers = classify_tiers(df, config.low_tier_threshold)?;
    let scaled = apply_tier_scaling(df, &tiers, &config.normalization())?;
    Ok((tiers, scaled))
}

struct ChartSet<'a> {
    site: &'a str,
    period: Option<PeriodTag>,
    charts: Vec<Chart>,
}

impl<'a> ChartSet<'a> {
    fn new(site: &'a str, period: Option<&PeriodDefinition>) -> Self {
        Self {
            site,
            period: period.map(PeriodTag::from),
            charts: Vec::new(),
        }
    }

    fn push(&mut self, kind: ChartKind, tier: Option<Tier>, data: ChartData) {
        if data.is_empty() {
            debug!(site = self.site, %kind, "no data for chart");
            return;
        }
        self.charts.push(Chart {
            kind,
            site: self.site.to_string(),
            tier,
            period: self.period.clone(),
            unit: ConcentrationUnit::for_tier(tier),
            data,
        });
    }
}

/// Full-history battery for one site partition.
pub fn build_site_charts(site_df: &DataFrame, site: &str, config: &AnalysisConfig) -> Result<Vec<Chart>> {
    let (tiers, scaled) = classify_and_scale(site_df, config)?;
    let all_compounds: Vec<String> = tiers.low.iter().chain(&tiers.high).cloned().collect();
    let mut set = ChartSet::new(site, None);

    set.push(
        ChartKind::DistributionsOriginal,
        None,
        ChartData::Distributions(distributions(&scaled, NORMALIZED_VALUE, &all_compounds)?),
    );
    set.push(
        ChartKind::HourlyPatternsOriginal,
        None,
        ChartData::Cycle(cycle_means(&scaled, Cycle::Hour, NORMALIZED_VALUE)?),
    );

    for tier in Tier::ALL {
        let compounds = tiers.compounds(tier);
        if compounds.is_empty() {
            continue;
        }
        let tier_df = select_compounds(&scaled, compounds)?;
        set.push(
            ChartKind::Distributions,
            Some(tier),
            ChartData::Distributions(distributions(&tier_df, SCALED_VALUE, compounds)?),
        );
        for (kind, cycle) in [
            (ChartKind::HourlyPatterns, Cycle::Hour),
            (ChartKind::WeeklyPatterns, Cycle::DayOfWeek),
            (ChartKind::MonthlyTrends, Cycle::Month),
        ] {
            set.push(
                kind,
                Some(tier),
                ChartData::Cycle(cycle_means(&tier_df, cycle, SCALED_VALUE)?),
            );
        }
    }

    set.push(
        ChartKind::Correlation,
        None,
        ChartData::Correlation(compound_correlation(&scaled, NORMALIZED_VALUE)?),
    );
    let daily = daily_means(&scaled, NORMALIZED_VALUE)?;
    set.push(
        ChartKind::CompoundCorrelations,
        None,
        ChartData::Correlation(daily.correlation()),
    );
    set.push(ChartKind::ConcentrationHeatmap, None, ChartData::Daily(daily));

    Ok(set.charts)
}

/// Period battery for one (site, period) partition. Tiers are classified on the period's rows
/// only, so they can differ from the site's full-history tiers.
pub fn build_period_charts(
    period_df: &DataFrame,
    site: &str,
    period: &PeriodDefinition,
    config: &AnalysisConfig,
) -> Result<Vec<Chart>> {
    let (tiers, scaled) = classify_and_scale(period_df, config)?;
    let mut set = ChartSet::new(site, Some(period));

    for tier in Tier::ALL {
        let compounds = tiers.compounds(tier);
        if compounds.is_empty() {
            continue;
        }
        let tier_df = select_compounds(&scaled, compounds)?;
        set.push(
            ChartKind::Timeseries,
            Some(tier),
            ChartData::Timeseries(compound_timeseries(&tier_df, SCALED_VALUE, compounds)?),
        );
        set.push(
            ChartKind::Distributions,
            Some(tier),
            ChartData::Distributions(distributions(&tier_df, SCALED_VALUE, compounds)?),
        );
        set.push(
            ChartKind::HourlyPatterns,
            Some(tier),
            ChartData::Cycle(cycle_means(&tier_df, Cycle::Hour, SCALED_VALUE)?),
        );
        set.push(
            ChartKind::Correlations,
            Some(tier),
            ChartData::Correlation(compound_correlation(&tier_df, SCALED_VALUE)?),
        );
    }

    Ok(set.charts)
}

fn render_all(
    charts: &[Chart],
    site_dir: &str,
    config: &AnalysisConfig,
    renderer: &mut dyn ChartRenderer,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(charts.len());
    for chart in charts {
        let destination = config.output_root.join(chart.relative_path(site_dir));
        debug!(site = %chart.site, kind = %chart.kind, path = %destination.display(), "rendering chart");
        renderer.render(chart, &destination)?;
        written.push(destination);
    }
    Ok(written)
}

fn finish_unit(
    built: Result<Vec<Chart>>,
    site_dir: &str,
    config: &AnalysisConfig,
    renderer: &mut dyn ChartRenderer,
) -> UnitStatus {
    let charts = match built {
        Ok(charts) => charts,
        Err(err) => return UnitStatus::Failed { error: err.to_string() },
    };
    if charts.is_empty() {
        return UnitStatus::Skipped {
            reason: "no chartable values".to_string(),
        };
    }
    match render_all(&charts, site_dir, config, renderer) {
        Ok(charts) => UnitStatus::Rendered { charts },
        Err(err) => UnitStatus::Failed {
            error: format!("{err:#}"),
        },
    }
}

fn log_outcome(outcome: &UnitOutcome) {
    let period = outcome.period.as_deref().unwrap_or("-");
    match &outcome.status {
        UnitStatus::Rendered { charts } => {
            info!(site = %outcome.site, period, charts = charts.len(), "unit rendered")
        }
        UnitStatus::Skipped { reason } => {
            warn!(site = %outcome.site, period, reason = %reason, "unit skipped")
        }
        UnitStatus::Failed { error } => {
            warn!(site = %outcome.site, period, error = %error, "unit failed")
        }
    }
}

/// Sites in first-seen order, each paired with its own output directory.
fn sites_with_directories(prepared: &PreparedObservations) -> Result<Vec<(String, String)>> {
    let sites = distinct_sites(&prepared.dataframe)?;
    let directories = site_directories(&sites);
    for (site, dir) in sites.iter().zip(&directories) {
        if *dir != site_slug(site) {
            warn!(site = %site, directory = %dir, "site name collides with another site's directory");
        }
    }
    Ok(sites.into_iter().zip(directories).collect())
}

/// Runs the full-history battery once per site, in first-seen site order.
pub fn run_full_history(
    prepared: &PreparedObservations,
    config: &AnalysisConfig,
    renderer: &mut dyn ChartRenderer,
) -> Result<RunReport> {
    config.validate()?;
    let sites = sites_with_directories(prepared)?;
    info!(sites = sites.len(), excluded_rows = prepared.excluded_rows, "starting full-history analysis");

    let mut report = RunReport::new(AnalysisMode::FullHistory, prepared.excluded_rows);
    for (site, site_dir) in sites {
        info!(site = %site, "processing site");
        let built = site_partition(&prepared.dataframe, &site)
            .and_then(|site_df| build_site_charts(&site_df, &site, config));
        let outcome = UnitOutcome {
            status: finish_unit(built, &site_dir, config, renderer),
            site,
            period: None,
        };
        log_outcome(&outcome);
        report.units.push(outcome);
    }

    Ok(report)
}

/// Runs the period battery once per (site, period) pair. Pairs without observations in the
/// period are reported as skipped.
pub fn run_period_analysis(
    prepared: &PreparedObservations,
    config: &AnalysisConfig,
    renderer: &mut dyn ChartRenderer,
) -> Result<RunReport> {
    config.validate()?;
    let sites = sites_with_directories(prepared)?;
    info!(
        sites = sites.len(),
        periods = config.periods.len(),
        excluded_rows = prepared.excluded_rows,
        "starting period analysis"
    );

    let mut report = RunReport::new(AnalysisMode::Periods, prepared.excluded_rows);
    for (site, site_dir) in sites {
        let site_df = match site_partition(&prepared.dataframe, &site) {
            Ok(df) => df,
            Err(err) => {
                for period in &config.periods {
                    let outcome = UnitOutcome {
                        site: site.clone(),
                        period: Some(period.name.clone()),
                        status: UnitStatus::Failed { error: err.to_string() },
                    };
                    log_outcome(&outcome);
                    report.units.push(outcome);
                }
                continue;
            }
        };

        for period in &config.periods {
            info!(site = %site, period = %period.name, "processing period");
            let status = match filter_period(&site_df, period) {
                Ok(period_df) if period_df.height() == 0 => UnitStatus::Skipped {
                    reason: format!("no observations between {} and {}", period.start, period.end),
                },
                Ok(period_df) => finish_unit(
                    build_period_charts(&period_df, &site, period, config),
                    &site_dir,
                    config,
                    renderer,
                ),
                Err(err) => UnitStatus::Failed { error: err.to_string() },
            };
            let outcome = UnitOutcome {
                site: site.clone(),
                period: Some(period.name.clone()),
                status,
            };
            log_outcome(&outcome);
            report.units.push(outcome);
        }
    }

    Ok(report)
}
