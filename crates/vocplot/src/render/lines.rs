use std::path::Path;

use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use plotters::prelude::*;
use vocplot_core::aggregate::{CompoundSeries, CycleTable};
use vocplot_core::charts::Chart;
use vocplot_core::compounds::is_refinery_compound;
use vocplot_core::config::RenderSettings;

use super::palette::{compound_color, threshold_levels, value_range};

fn stroke_width(compound: &str) -> u32 {
    if is_refinery_compound(compound) {
        3
    } else {
        2
    }
}

/// Mean per bucket, one line per compound.
pub fn draw_cycle(
    path: &Path,
    settings: &RenderSettings,
    chart: &Chart,
    table: &CycleTable,
) -> Result<()> {
    let (lo, hi) = table.cycle.bounds();
    let y_range = value_range(table.rows.values().flat_map(|means| means.values().copied()));

    let root = BitMapBackend::new(path, (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut plot = ChartBuilder::on(&root)
        .caption(chart.title(), (settings.font_family.as_str(), 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(f64::from(lo)..f64::from(hi), y_range)?;

    let cycle = table.cycle;
    plot.configure_mesh()
        .x_desc(cycle.axis_label())
        .y_desc(format!("Concentration ({})", chart.unit))
        .x_labels((hi - lo + 1) as usize)
        .x_label_formatter(&|x| cycle.bucket_label(x.round().max(0.0) as u32))
        .draw()?;

    for compound in &table.compounds {
        let color = compound_color(compound);
        let width = stroke_width(compound);
        let points: Vec<(f64, f64)> = table
            .series(compound)
            .into_iter()
            .map(|(bucket, mean)| (f64::from(bucket), mean))
            .collect();
        plot.draw_series(LineSeries::new(points, color.stroke_width(width)))?
            .label(compound.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width)));
    }

    plot.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn hours_since(origin: NaiveDateTime, ts: NaiveDateTime) -> f64 {
    (ts - origin).num_seconds() as f64 / 3600.0
}

/// Raw points against time, with guide lines at the tier's reference levels.
pub fn draw_timeseries(
    path: &Path,
    settings: &RenderSettings,
    chart: &Chart,
    series: &[CompoundSeries],
) -> Result<()> {
    let first = series.iter().filter_map(|s| s.points.first()).map(|(ts, _)| *ts).min();
    let last = series.iter().filter_map(|s| s.points.last()).map(|(ts, _)| *ts).max();
    let (Some(origin), Some(last)) = (first, last) else {
        anyhow::bail!("time series has no points");
    };
    let span_hours = hours_since(origin, last).max(1.0);

    let levels = threshold_levels(chart.unit);
    let y_range = value_range(
        series
            .iter()
            .flat_map(|s| s.points.iter().map(|(_, v)| *v))
            .chain(levels),
    );

    let root = BitMapBackend::new(path, (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut plot = ChartBuilder::on(&root)
        .caption(chart.title(), (settings.font_family.as_str(), 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..span_hours, y_range)?;

    plot.configure_mesh()
        .x_desc("Date")
        .y_desc(format!("Concentration ({})", chart.unit))
        .x_labels(12)
        .x_label_formatter(&|hours| {
            let ts = origin + Duration::minutes((hours * 60.0).round() as i64);
            ts.format("%m-%d %H:%M").to_string()
        })
        .draw()?;

    for (level, shade) in levels.into_iter().zip([0.9, 0.6, 0.35]) {
        let guide = RED.mix(shade);
        plot.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, level), (span_hours, level)],
            guide.stroke_width(1),
        )))?
        .label(format!("{level} {}", chart.unit))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], guide));
    }

    for compound in series {
        let color = compound_color(&compound.compound);
        let width = stroke_width(&compound.compound);
        let points: Vec<(f64, f64)> = compound
            .points
            .iter()
            .map(|(ts, value)| (hours_since(origin, *ts), *value))
            .collect();
        plot.draw_series(LineSeries::new(points, color.stroke_width(width)))?
            .label(compound.compound.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width)));
    }

    plot.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
