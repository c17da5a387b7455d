use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use vocplot_core::driver::{RunReport, UnitStatus};

pub const SUMMARY_FILE: &str = "run_summary.json";

fn status_cells(status: &UnitStatus) -> (&'static str, String) {
    match status {
        UnitStatus::Rendered { charts } => ("rendered", format!("{} charts", charts.len())),
        UnitStatus::Skipped { reason } => ("skipped", reason.clone()),
        UnitStatus::Failed { error } => ("failed", error.clone()),
    }
}

pub fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Site", "Period", "Status", "Detail"]);

    for unit in &report.units {
        let (status, detail) = status_cells(&unit.status);
        table.add_row(vec![
            unit.site.clone(),
            unit.period.clone().unwrap_or_else(|| "-".to_string()),
            status.to_string(),
            detail,
        ]);
    }
    table
}

pub fn print_report(report: &RunReport) {
    println!(
        "\n{} analysis: {} charts, {} rows excluded for invalid dates",
        report.mode,
        report.chart_count(),
        report.excluded_rows
    );
    println!("{}", summary_table(report));
}

pub fn write_summary(output_root: &Path, reports: &[RunReport]) -> Result<PathBuf> {
    let path = output_root.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(reports).context("failed to serialise run summary")?;
    fs::write(&path, json).with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocplot_core::driver::{AnalysisMode, UnitOutcome};

    fn report() -> RunReport {
        RunReport {
            mode: AnalysisMode::Periods,
            excluded_rows: 2,
            units: vec![
                UnitOutcome {
                    site: "Harbor East".to_string(),
                    period: Some("Oct_2023".to_string()),
                    status: UnitStatus::Rendered {
                        charts: vec![PathBuf::from("a.png"), PathBuf::from("b.png")],
                    },
                },
                UnitOutcome {
                    site: "Harbor East".to_string(),
                    period: Some("Feb_Mar_2023".to_string()),
                    status: UnitStatus::Skipped {
                        reason: "no observations".to_string(),
                    },
                },
            ],
        }
    }

    #[test]
    fn table_lists_every_unit() {
        let rendered = summary_table(&report()).to_string();
        assert!(rendered.contains("Oct_2023"));
        assert!(rendered.contains("2 charts"));
        assert!(rendered.contains("skipped"));
    }

    #[test]
    fn summary_is_written_as_json_array() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("vocplot-summary-{}", std::process::id()));
        fs::create_dir_all(&dir)?;

        let path = write_summary(&dir, &[report()])?;
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(value[0]["excluded_rows"], 2);
        assert_eq!(value[0]["units"][0]["status"], "rendered");

        fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
