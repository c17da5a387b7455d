use std::ops::Range;

use plotters::style::RGBColor;
use vocplot_core::charts::ConcentrationUnit;
use vocplot_core::compounds::compound_rgb;

pub const MISSING_CELL: RGBColor = RGBColor(235, 235, 235);

pub fn compound_color(compound: &str) -> RGBColor {
    let (r, g, b) = compound_rgb(compound);
    RGBColor(r, g, b)
}

/// Guide levels drawn on period time series, highest first.
pub fn threshold_levels(unit: ConcentrationUnit) -> [f64; 3] {
    match unit {
        ConcentrationUnit::NanogramsPerCubicMeter => [250.0, 100.0, 50.0],
        ConcentrationUnit::MicrogramsPerCubicMeter => [2.0, 1.0, 0.5],
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    let t = t.clamp(0.0, 1.0);
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
}

fn blend(from: (u8, u8, u8), to: (u8, u8, u8), t: f64) -> RGBColor {
    RGBColor(lerp(from.0, to.0, t), lerp(from.1, to.1, t), lerp(from.2, to.2, t))
}

/// Diverging blue-white-red scale over [-1, 1].
pub fn correlation_color(r: Option<f64>) -> RGBColor {
    const BLUE: (u8, u8, u8) = (33, 102, 172);
    const WHITE: (u8, u8, u8) = (247, 247, 247);
    const RED: (u8, u8, u8) = (178, 24, 43);

    match r {
        Some(r) if r.is_finite() && r < 0.0 => blend(WHITE, BLUE, -r),
        Some(r) if r.is_finite() => blend(WHITE, RED, r),
        _ => MISSING_CELL,
    }
}

/// Sequential yellow-to-red scale over [0, max].
pub fn concentration_color(value: Option<f64>, max: f64) -> RGBColor {
    const YELLOW: (u8, u8, u8) = (255, 255, 204);
    const RED: (u8, u8, u8) = (189, 0, 38);

    match value {
        Some(v) if v.is_finite() && max > 0.0 => blend(YELLOW, RED, v / max),
        Some(v) if v.is_finite() => blend(YELLOW, RED, 0.0),
        _ => MISSING_CELL,
    }
}

/// Y range covering `values` with headroom; degenerate input still yields a drawable range.
pub fn value_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let lo = lo.min(0.0);
    let span = hi - lo;
    if span <= f64::EPSILON {
        return lo..(lo + 1.0);
    }
    lo..(hi + span * 0.1)
}
