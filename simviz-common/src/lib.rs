pub mod config;
pub use config::{Config, HistogramConfig, PyramidConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimVizError {
    #[error("invalid range: start {start} is greater than end {end}")]
    InvalidRange { start: f64, end: f64 },
    #[error("bin count must be at least 1, got {0}")]
    InvalidBinCount(usize),
    #[error("values length {values} does not match weights length {weights}")]
    MismatchedLength { values: usize, weights: usize },
    #[error("empty input: {0}")]
    EmptyInput(&'static str),
    #[error("unsupported mode: {0}")]
    UnsupportedMode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SimVizError>;
