use polars::prelude::*;

use crate::schema::{WIND_DIRECTION, WIND_SPEED};

/// Observation rows exactly as read, one row per (site, compound, date, time) measurement.
#[derive(Debug, Clone)]
pub struct ParsedObservations {
    pub df: DataFrame,
    /// Headers present in the file that did not map to a known column.
    pub ignored_headers: Vec<String>,
    /// Non-numeric wind cells that were read as null.
    pub unreadable_wind_cells: usize,
}

impl ParsedObservations {
    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn has_wind(&self) -> bool {
        self.df.column(WIND_SPEED).is_ok() || self.df.column(WIND_DIRECTION).is_ok()
    }
}
