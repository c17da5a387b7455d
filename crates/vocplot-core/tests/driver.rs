use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use polars::prelude::*;

use vocplot_core::charts::{Chart, ChartData, ChartKind, ChartRenderer, ConcentrationUnit};
use vocplot_core::config::AnalysisConfig;
use vocplot_core::driver::{
    build_site_charts, prepare, run_full_history, run_period_analysis, AnalysisMode,
    PreparedObservations, UnitStatus,
};
use vocplot_core::error::AnalysisError;
use vocplot_core::normalize::NORMALIZED_VALUE;
use vocplot_core::sites::site_partition;
use vocplot_core::tiers::Tier;
use vocplot_parser::parse_observations;

const FIXTURE: &str = "\
Site ID,Site name,Parameter Cd,Compound_Name,Date,Time,Value
1,Harbor East,45201,Benzene,20231010,08:00,0.4
1,Harbor East,45201,Benzene,20231011,09:00,0.9
1,Harbor East,43202,Ethane,20231010,08:00,7.5
1,Harbor East,43202,Ethane,20231011,09:00,30.0
1,Harbor East,43202,Ethane,20230230,09:00,3.0
2,Refinery Gate,45202,Toluene,20230105,12:00,0.2
2,Refinery Gate,45202,Toluene,20230106,13:00,0.3
";

#[derive(Default)]
struct RecordingRenderer {
    rendered: Vec<(Chart, PathBuf)>,
    fail_for_site: Option<String>,
}

impl ChartRenderer for RecordingRenderer {
    fn render(&mut self, chart: &Chart, destination: &Path) -> Result<()> {
        if self.fail_for_site.as_deref() == Some(chart.site.as_str()) {
            bail!("disk full while writing {}", destination.display());
        }
        self.rendered.push((chart.clone(), destination.to_path_buf()));
        Ok(())
    }
}

fn observations() -> Result<DataFrame> {
    Ok(parse_observations(FIXTURE)?.df)
}

fn prepared() -> Result<PreparedObservations> {
    Ok(prepare(&observations()?, &config())?)
}

fn config() -> AnalysisConfig {
    AnalysisConfig {
        output_root: PathBuf::from("out"),
        ..AnalysisConfig::default()
    }
}

fn mentions(chart: &Chart, compound: &str) -> bool {
    match &chart.data {
        ChartData::Cycle(table) => table.compounds.iter().any(|c| c == compound),
        ChartData::Distributions(summaries) => summaries.iter().any(|s| s.compound == compound),
        ChartData::Correlation(matrix) => matrix.index_of(compound).is_some(),
        ChartData::Daily(matrix) => matrix.compounds.iter().any(|c| c == compound),
        ChartData::Timeseries(series) => series.iter().any(|s| s.compound == compound),
    }
}

#[test]
fn full_history_renders_every_site_in_first_seen_order() -> Result<()> {
    let mut renderer = RecordingRenderer::default();
    let report = run_full_history(&prepared()?, &config(), &mut renderer)?;

    assert_eq!(report.mode, AnalysisMode::FullHistory);
    assert_eq!(report.excluded_rows, 1);
    let sites: Vec<&str> = report.units.iter().map(|u| u.site.as_str()).collect();
    assert_eq!(sites, vec!["Harbor East", "Refinery Gate"]);
    assert!(report.failed_units().next().is_none());

    // two untiered views, four per tier for both tiers, three whole-site views
    let harbor: Vec<&(Chart, PathBuf)> = renderer
        .rendered
        .iter()
        .filter(|(chart, _)| chart.site == "Harbor East")
        .collect();
    assert_eq!(harbor.len(), 13);
    // Toluene is low-tier only, so no high-tier views
    assert_eq!(renderer.rendered.len() - harbor.len(), 9);
    assert_eq!(report.chart_count(), 22);

    assert!(renderer
        .rendered
        .iter()
        .any(|(_, path)| path == Path::new("out/Harbor_East/Harbor_East_distributions_low.png")));
    assert!(renderer
        .rendered
        .iter()
        .any(|(_, path)| path == Path::new("out/Refinery_Gate/Refinery_Gate_concentration_heatmap.png")));
    Ok(())
}

#[test]
fn compounds_never_leak_across_sites() -> Result<()> {
    let mut renderer = RecordingRenderer::default();
    run_full_history(&prepared()?, &config(), &mut renderer)?;

    for (chart, _) in &renderer.rendered {
        match chart.site.as_str() {
            "Harbor East" => assert!(!mentions(chart, "Toluene"), "{:?}", chart.kind),
            _ => {
                assert!(!mentions(chart, "Benzene"), "{:?}", chart.kind);
                assert!(!mentions(chart, "Ethane"), "{:?}", chart.kind);
            }
        }
    }
    Ok(())
}

#[test]
fn tier_views_carry_units_and_rescaled_values() -> Result<()> {
    let cfg = config();
    let prepared = prepare(&observations()?, &cfg)?;
    let harbor = site_partition(&prepared.dataframe, "Harbor East")?;
    let charts = build_site_charts(&harbor, "Harbor East", &cfg)?;

    let low_hourly = charts
        .iter()
        .find(|c| c.kind == ChartKind::HourlyPatterns && c.tier == Some(Tier::Low))
        .expect("low-tier hourly chart");
    assert_eq!(low_hourly.unit, ConcentrationUnit::NanogramsPerCubicMeter);
    let ChartData::Cycle(table) = &low_hourly.data else {
        panic!("hourly chart should hold a cycle table");
    };
    assert_eq!(table.get(8, "Benzene"), Some(250.0));
    assert_eq!(table.get(9, "Benzene"), Some(250.0));

    let high_hourly = charts
        .iter()
        .find(|c| c.kind == ChartKind::HourlyPatterns && c.tier == Some(Tier::High))
        .expect("high-tier hourly chart");
    assert_eq!(high_hourly.unit, ConcentrationUnit::MicrogramsPerCubicMeter);
    let ChartData::Cycle(table) = &high_hourly.data else {
        panic!("hourly chart should hold a cycle table");
    };
    // 30.0 is capped at 15 before anything else
    assert_eq!(table.get(9, "Ethane"), Some(15.0));

    let original = charts
        .iter()
        .find(|c| c.kind == ChartKind::HourlyPatternsOriginal)
        .expect("untiered hourly chart");
    assert_eq!(original.tier, None);
    let ChartData::Cycle(table) = &original.data else {
        panic!("hourly chart should hold a cycle table");
    };
    assert_eq!(table.get(8, "Benzene"), Some(0.4));
    Ok(())
}

#[test]
fn periods_without_data_are_skipped() -> Result<()> {
    let mut renderer = RecordingRenderer::default();
    let report = run_period_analysis(&prepared()?, &config(), &mut renderer)?;

    assert_eq!(report.mode, AnalysisMode::Periods);
    assert_eq!(report.excluded_rows, 1);
    assert_eq!(report.units.len(), 4);

    let harbor_october = &report.units[0];
    assert_eq!(harbor_october.site, "Harbor East");
    assert_eq!(harbor_october.period.as_deref(), Some("Oct_2023"));
    let UnitStatus::Rendered { charts } = &harbor_october.status else {
        panic!("expected rendered unit, got {:?}", harbor_october.status);
    };
    assert_eq!(charts.len(), 8);
    assert!(charts.contains(&PathBuf::from(
        "out/period_analysis/Oct_2023/Harbor_East/Harbor_East_timeseries_low.png"
    )));

    assert_eq!(report.skipped_units().count(), 3);
    assert!(renderer
        .rendered
        .iter()
        .all(|(chart, _)| chart.period.as_ref().map(|p| p.name.as_str()) == Some("Oct_2023")));
    Ok(())
}

#[test]
fn failing_unit_does_not_stop_the_run() -> Result<()> {
    let mut renderer = RecordingRenderer {
        fail_for_site: Some("Harbor East".to_string()),
        ..RecordingRenderer::default()
    };
    let report = run_full_history(&prepared()?, &config(), &mut renderer)?;

    assert_eq!(report.units.len(), 2);
    match &report.units[0].status {
        UnitStatus::Failed { error } => assert!(error.contains("disk full")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(matches!(report.units[1].status, UnitStatus::Rendered { .. }));
    assert!(renderer
        .rendered
        .iter()
        .all(|(chart, _)| chart.site == "Refinery Gate"));
    Ok(())
}

#[test]
fn missing_required_column_is_fatal() -> Result<()> {
    let mut df = observations()?;
    df.drop_in_place("raw_date")?;

    assert!(matches!(
        prepare(&df, &config()),
        Err(AnalysisError::MissingColumn { column: "raw_date", .. })
    ));
    Ok(())
}

#[test]
fn report_serialises_unit_status() -> Result<()> {
    let mut renderer = RecordingRenderer::default();
    let report = run_period_analysis(&prepared()?, &config(), &mut renderer)?;
    let json = serde_json::to_value(&report)?;

    assert_eq!(json["mode"], "periods");
    assert_eq!(json["units"][1]["status"], "skipped");
    assert_eq!(json["units"][1]["period"], "Feb_Mar_2023");
    Ok(())
}

#[test]
fn sites_with_colliding_slugs_get_separate_directories() -> Result<()> {
    let csv = "\
Site ID,Site name,Parameter Cd,Compound_Name,Date,Time,Value
1,Harbor East,45201,Benzene,20231010,08:00,0.4
1,Harbor East,45201,Benzene,20231011,09:00,0.9
3,Harbor_East,45202,Toluene,20231010,08:00,0.3
3,Harbor_East,45202,Toluene,20231011,09:00,0.6
";
    let prepared = prepare(&parse_observations(csv)?.df, &config())?;
    let mut renderer = RecordingRenderer::default();
    let report = run_full_history(&prepared, &config(), &mut renderer)?;

    assert_eq!(report.units.len(), 2);
    assert!(report.failed_units().next().is_none());

    let mut paths: Vec<&PathBuf> = renderer.rendered.iter().map(|(_, path)| path).collect();
    let total = paths.len();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), total, "two sites wrote to the same file");

    for (chart, path) in &renderer.rendered {
        let expected_dir = match chart.site.as_str() {
            "Harbor East" => Path::new("out/Harbor_East"),
            _ => Path::new("out/Harbor_East_2"),
        };
        assert_eq!(path.parent(), Some(expected_dir));
    }
    Ok(())
}

#[test]
fn derivation_errors_fail_only_their_unit() -> Result<()> {
    let cfg = config();
    let mut prepared = prepared()?;
    prepared.dataframe.drop_in_place(NORMALIZED_VALUE)?;

    let harbor = site_partition(&prepared.dataframe, "Harbor East")?;
    let err = build_site_charts(&harbor, "Harbor East", &cfg).unwrap_err();
    assert!(err.to_string().contains(NORMALIZED_VALUE));

    let mut renderer = RecordingRenderer::default();
    let report = run_full_history(&prepared, &cfg, &mut renderer)?;
    assert_eq!(report.units.len(), 2);
    assert_eq!(report.failed_units().count(), 2);
    assert!(renderer.rendered.is_empty());

    let report = run_period_analysis(&prepared, &cfg, &mut renderer)?;
    assert_eq!(report.units.len(), 4);
    match &report.units[0].status {
        UnitStatus::Failed { error } => assert!(error.contains(NORMALIZED_VALUE)),
        other => panic!("expected failure, got {other:?}"),
    }
    // periods without rows never reach derivation
    assert_eq!(report.failed_units().count(), 1);
    assert_eq!(report.skipped_units().count(), 3);
    assert!(renderer.rendered.is_empty());
    Ok(())
}

#[test]
fn unsafe_period_name_aborts_the_run() -> Result<()> {
    let mut cfg = config();
    cfg.periods[0].name = "../escape".to_string();

    let mut renderer = RecordingRenderer::default();
    let err = run_period_analysis(&prepared()?, &cfg, &mut renderer).unwrap_err();
    assert!(matches!(err, AnalysisError::Config(_)));
    assert!(renderer.rendered.is_empty());
    Ok(())
}
