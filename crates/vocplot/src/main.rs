use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vocplot_core::config::AnalysisConfig;
use vocplot_core::driver::{
    load_observations, prepare, run_full_history, run_period_analysis, RunReport,
};

mod render;
mod summary;

use render::PlottersRenderer;

#[derive(Parser, Debug)]
#[command(author, version, about = "VOC monitoring chart generator", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Monitoring export to analyse
    #[arg(
        long,
        global = true,
        default_value = "data/air_quality_data_with_compounds.csv"
    )]
    input: PathBuf,

    /// Directory charts are written to (overrides the config file)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// TOML file with analysis settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full-history charts for every site
    Analyze,
    /// Charts for each configured date range at every site
    Periods,
    /// Both of the above
    All,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config(args: &CommonArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to load config from '{}'", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(output) = &args.output {
        config.output_root = output.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.common.json_logs);

    let config = load_config(&cli.common)?;
    let observations = load_observations(&cli.common.input)
        .with_context(|| format!("failed to read input '{}'", cli.common.input.display()))?;

    fs::create_dir_all(&config.output_root).with_context(|| {
        format!(
            "output directory '{}' is not writable",
            config.output_root.display()
        )
    })?;

    let prepared = prepare(&observations, &config)?;
    let mut renderer = PlottersRenderer::new(config.render.clone());
    let mut reports: Vec<RunReport> = Vec::new();

    if matches!(cli.command, Command::Analyze | Command::All) {
        reports.push(run_full_history(&prepared, &config, &mut renderer)?);
    }
    if matches!(cli.command, Command::Periods | Command::All) {
        reports.push(run_period_analysis(&prepared, &config, &mut renderer)?);
    }

    for report in &reports {
        summary::print_report(report);
        let failed = report.failed_units().count();
        if failed > 0 {
            warn!(mode = %report.mode, failed, "some units failed; see summary");
        }
    }

    let summary_path = summary::write_summary(&config.output_root, &reports)?;
    info!(path = %summary_path.display(), "run summary written");
    Ok(())
}
