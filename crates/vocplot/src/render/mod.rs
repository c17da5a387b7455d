//! PNG output for derived charts.

mod boxplot;
mod heatmap;
mod lines;
mod palette;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use vocplot_core::charts::{Chart, ChartData, ChartRenderer};
use vocplot_core::config::RenderSettings;

pub struct PlottersRenderer {
    settings: RenderSettings,
}

impl PlottersRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(&mut self, chart: &Chart, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create '{}'", parent.display()))?;
        }

        let settings = &self.settings;
        match &chart.data {
            ChartData::Cycle(table) => lines::draw_cycle(destination, settings, chart, table),
            ChartData::Timeseries(series) => {
                lines::draw_timeseries(destination, settings, chart, series)
            }
            ChartData::Distributions(summaries) => {
                boxplot::draw_distributions(destination, settings, chart, summaries)
            }
            ChartData::Correlation(matrix) => {
                heatmap::draw_correlation(destination, settings, chart, matrix)
            }
            ChartData::Daily(matrix) => heatmap::draw_daily(destination, settings, chart, matrix),
        }
        .with_context(|| format!("failed to draw {} for {}", chart.kind, chart.site))?;

        debug!(path = %destination.display(), "chart written");
        Ok(())
    }
}
