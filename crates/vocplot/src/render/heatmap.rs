use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use vocplot_core::aggregate::{CorrelationMatrix, DailyMatrix};
use vocplot_core::charts::Chart;
use vocplot_core::config::RenderSettings;

use super::boxplot::category_label;
use super::palette::{concentration_color, correlation_color};

/// Coefficient cells, annotated when the matrix is small enough to read.
pub fn draw_correlation(
    path: &Path,
    settings: &RenderSettings,
    chart: &Chart,
    matrix: &CorrelationMatrix,
) -> Result<()> {
    let n = matrix.len();
    let size = n as f64;

    let root = BitMapBackend::new(path, (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut plot = ChartBuilder::on(&root)
        .caption(chart.title(), (settings.font_family.as_str(), 28))
        .margin(20)
        .x_label_area_size(140)
        .y_label_area_size(160)
        .build_cartesian_2d(-0.5..(size - 0.5), -0.5..(size - 0.5))?;

    // first label on the top row
    let labels = &matrix.labels;
    let rows_bottom_up: Vec<String> = labels.iter().rev().cloned().collect();
    plot.configure_mesh()
        .disable_mesh()
        .x_labels(n.max(1))
        .y_labels(n.max(1))
        .x_label_formatter(&|x| category_label(labels, *x))
        .y_label_formatter(&|y| category_label(&rows_bottom_up, *y))
        .x_label_style(
            (settings.font_family.as_str(), 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .draw()?;

    plot.draw_series((0..n).flat_map(|row| {
        (0..n).map(move |col| {
            let (x, y) = (col as f64, (n - 1 - row) as f64);
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                correlation_color(matrix.get(row, col)).filled(),
            )
        })
    }))?;

    if n <= 20 {
        let font = (settings.font_family.as_str(), 14).into_font().color(&BLACK);
        for row in 0..n {
            for col in 0..n {
                if let Some(r) = matrix.get(row, col) {
                    plot.draw_series(std::iter::once(Text::new(
                        format!("{r:.2}"),
                        (col as f64 - 0.2, (n - 1 - row) as f64),
                        font.clone(),
                    )))?;
                }
            }
        }
    }

    root.present()?;
    Ok(())
}

/// Compound × day cells of daily mean concentration.
pub fn draw_daily(
    path: &Path,
    settings: &RenderSettings,
    chart: &Chart,
    matrix: &DailyMatrix,
) -> Result<()> {
    let rows = matrix.compounds.len();
    let cols = matrix.days.len();
    let max = matrix.max_value().unwrap_or(0.0);
    let day_labels: Vec<String> = matrix
        .days
        .iter()
        .map(|day| day.format("%Y-%m-%d").to_string())
        .collect();

    let root = BitMapBackend::new(path, (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut plot = ChartBuilder::on(&root)
        .caption(chart.title(), (settings.font_family.as_str(), 28))
        .margin(20)
        .x_label_area_size(110)
        .y_label_area_size(160)
        .build_cartesian_2d(-0.5..(cols as f64 - 0.5), -0.5..(rows as f64 - 0.5))?;

    let compounds_bottom_up: Vec<String> = matrix.compounds.iter().rev().cloned().collect();

    plot.configure_mesh()
        .disable_mesh()
        .x_desc("Date")
        .x_labels(cols.clamp(1, 20))
        .y_labels(rows.max(1))
        .x_label_formatter(&|x| category_label(&day_labels, *x))
        .y_label_formatter(&|y| category_label(&compounds_bottom_up, *y))
        .x_label_style(
            (settings.font_family.as_str(), 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .draw()?;

    plot.draw_series(matrix.values.iter().enumerate().flat_map(|(row, cells)| {
        cells.iter().enumerate().map(move |(col, value)| {
            let (x, y) = (col as f64, (rows - 1 - row) as f64);
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                concentration_color(*value, max).filled(),
            )
        })
    }))?;

    root.present()?;
    Ok(())
}
