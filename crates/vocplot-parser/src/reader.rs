use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::ParsedObservations;
use crate::schema::{InputColumn, OPTIONAL_COLUMNS, REQUIRED_COLUMNS};

enum ColumnBuffer {
    Text(Vec<String>),
    Numeric(Vec<Option<f64>>),
}

impl ColumnBuffer {
    fn for_column(column: InputColumn) -> Self {
        if column.is_numeric() {
            ColumnBuffer::Numeric(Vec::new())
        } else {
            ColumnBuffer::Text(Vec::new())
        }
    }

    fn into_column(self, name: &'static str) -> Column {
        match self {
            ColumnBuffer::Text(values) => Series::new(name.into(), values).into(),
            ColumnBuffer::Numeric(values) => Series::new(name.into(), values).into(),
        }
    }
}

pub fn read_observation_file(path: &Path) -> Result<ParsedObservations, ParserError> {
    let file = File::open(path).map_err(|source| ParserError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_reader(BufReader::new(file))
}

pub fn parse_observations(content: &str) -> Result<ParsedObservations, ParserError> {
    parse_reader(content.as_bytes())
}

fn parse_reader<R: Read>(source: R) -> Result<ParsedObservations, ParserError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let header = reader.headers()?.clone();
    let (layout, ignored_headers) = resolve_layout(&header)?;

    let mut unreadable_wind_cells = 0;
    let mut buffers: HashMap<InputColumn, ColumnBuffer> = layout
        .iter()
        .map(|(_, column)| (*column, ColumnBuffer::for_column(*column)))
        .collect();

    for (row_index, record) in reader.records().enumerate() {
        let record = record?;
        // Header occupies line 1.
        let line_index = row_index + 2;

        for (position, column) in &layout {
            let raw = record.get(*position).unwrap_or_default();
            match buffers.get_mut(column) {
                Some(ColumnBuffer::Text(values)) => values.push(raw.to_string()),
                Some(ColumnBuffer::Numeric(values)) if column.is_lenient() => {
                    let parsed = parse_optional_f64(raw, line_index, column.header_name())
                        .unwrap_or_else(|_| {
                            unreadable_wind_cells += 1;
                            None
                        });
                    values.push(parsed);
                }
                Some(ColumnBuffer::Numeric(values)) => {
                    values.push(parse_optional_f64(raw, line_index, column.header_name())?)
                }
                None => {
                    return Err(ParserError::Validation {
                        message: format!("no buffer allocated for {}", column.canonical_name()),
                    })
                }
            }
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(buffers.len());
    for column in REQUIRED_COLUMNS.iter().chain(OPTIONAL_COLUMNS.iter()) {
        if let Some(buffer) = buffers.remove(column) {
            columns.push(buffer.into_column(column.canonical_name()));
        }
    }

    let df = DataFrame::new(columns).map_err(|err| ParserError::Validation {
        message: format!("failed to build observation dataframe: {err}"),
    })?;

    Ok(ParsedObservations {
        df,
        ignored_headers,
        unreadable_wind_cells,
    })
}

type Layout = Vec<(usize, InputColumn)>;

fn resolve_layout(header: &StringRecord) -> Result<(Layout, Vec<String>), ParserError> {
    let mut layout: Layout = Vec::new();
    let mut ignored = Vec::new();

    for (position, cell) in header.iter().enumerate() {
        match InputColumn::classify_header(cell) {
            Some(column) => {
                if layout.iter().any(|(_, existing)| *existing == column) {
                    return Err(ParserError::DuplicateColumn {
                        column: column.header_name(),
                    });
                }
                layout.push((position, column));
            }
            None => ignored.push(cell.to_string()),
        }
    }

    let missing: Vec<&'static str> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !layout.iter().any(|(_, column)| column == *required))
        .map(|column| column.header_name())
        .collect();

    if !missing.is_empty() {
        return Err(ParserError::MissingColumns { missing });
    }

    Ok((layout, ignored))
}

pub(crate) fn parse_optional_f64(
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<Option<f64>, ParserError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|err| ParserError::DataRow {
            line_index,
            message: format!("failed to parse column '{column}' as float: {err}"),
        })
}
