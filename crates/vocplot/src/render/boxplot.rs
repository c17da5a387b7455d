use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use vocplot_core::aggregate::DistributionSummary;
use vocplot_core::charts::Chart;
use vocplot_core::config::RenderSettings;

use super::palette::{compound_color, value_range};

const BOX_HALF_WIDTH: f64 = 0.3;
const CAP_HALF_WIDTH: f64 = 0.15;

/// Name of the category at axis position `x`, or an empty label between categories.
pub(crate) fn category_label(names: &[String], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    names.get(nearest as usize).cloned().unwrap_or_default()
}

/// One box per compound: quartile box, median bar, whiskers, outlier points.
pub fn draw_distributions(
    path: &Path,
    settings: &RenderSettings,
    chart: &Chart,
    summaries: &[DistributionSummary],
) -> Result<()> {
    let names: Vec<String> = summaries.iter().map(|s| s.compound.clone()).collect();
    let y_range = value_range(summaries.iter().flat_map(|s| [s.min, s.max]));
    let n = summaries.len() as f64;

    let root = BitMapBackend::new(path, (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut plot = ChartBuilder::on(&root)
        .caption(chart.title(), (settings.font_family.as_str(), 28))
        .margin(20)
        .x_label_area_size(120)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5..(n - 0.5), y_range)?;

    plot.configure_mesh()
        .disable_x_mesh()
        .x_desc("Compound")
        .y_desc(format!("Concentration ({})", chart.unit))
        .x_labels(summaries.len().max(1))
        .x_label_formatter(&|x| category_label(&names, *x))
        .x_label_style(
            (settings.font_family.as_str(), 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .draw()?;

    for (index, summary) in summaries.iter().enumerate() {
        let x = index as f64;
        let color = compound_color(&summary.compound);

        plot.draw_series(std::iter::once(Rectangle::new(
            [(x - BOX_HALF_WIDTH, summary.q1), (x + BOX_HALF_WIDTH, summary.q3)],
            color.mix(0.6).filled(),
        )))?;
        plot.draw_series(std::iter::once(Rectangle::new(
            [(x - BOX_HALF_WIDTH, summary.q1), (x + BOX_HALF_WIDTH, summary.q3)],
            BLACK.stroke_width(1),
        )))?;
        plot.draw_series(std::iter::once(PathElement::new(
            vec![(x - BOX_HALF_WIDTH, summary.median), (x + BOX_HALF_WIDTH, summary.median)],
            BLACK.stroke_width(2),
        )))?;

        for (edge, whisker) in [(summary.q1, summary.lower_whisker), (summary.q3, summary.upper_whisker)] {
            plot.draw_series(std::iter::once(PathElement::new(
                vec![(x, edge), (x, whisker)],
                BLACK.stroke_width(1),
            )))?;
            plot.draw_series(std::iter::once(PathElement::new(
                vec![(x - CAP_HALF_WIDTH, whisker), (x + CAP_HALF_WIDTH, whisker)],
                BLACK.stroke_width(1),
            )))?;
        }

        plot.draw_series(
            summary
                .outliers
                .iter()
                .map(|value| Circle::new((x, *value), 3, color.filled())),
        )?;
    }

    root.present()?;
    Ok(())
}
