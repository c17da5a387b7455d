// crates/vocplot-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input parsing failed: {0}")]
    Parser(#[from] vocplot_parser::ParserError),

    #[error("File I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML configuration could not be parsed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Column '{column}' is missing; run {stage} first")]
    MissingColumn {
        column: &'static str,
        stage: &'static str,
    },

    #[error("Timestamp {0} is outside the representable range")]
    InvalidTimestamp(i64),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
