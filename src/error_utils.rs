// error_utils.rs
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline errors. Anything here aborts the load; there is no
/// partial or degraded mode.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the CSV header row.
    #[error("schema error: required column '{column}' missing from '{path}'")]
    Schema { path: PathBuf, column: String },

    #[error("malformed GeoJSON: {0}")]
    Geometry(String),

    #[error("GeoJSON parse failure: {0}")]
    GeometryJson(#[from] serde_json::Error),
}

/// Result type for pipeline load operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for composite load paths that combine several pipeline
/// steps; the underlying `PipelineError` stays downcastable.
pub use anyhow::Result as AnyhowResult;

/// Non-fatal tally of records whose designation date was absent or could
/// not be parsed. Such records stay in the dataset and participate in every
/// aggregation except the designation time series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartialDataWarning {
    pub missing_dates: usize,
    pub unparseable_dates: usize,
}

impl PartialDataWarning {
    pub fn total(&self) -> usize {
        self.missing_dates + self.unparseable_dates
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Non-fatal report of join-key gaps between the museum counts and the
/// region geometry set. Regions listed here were counted in the data but
/// have no polygon to shade, so they are absent from the choropleth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinGapWarning {
    pub regions_without_geometry: Vec<String>,
    pub geometries_without_data: Vec<String>,
}

impl JoinGapWarning {
    pub fn is_clean(&self) -> bool {
        self.regions_without_geometry.is_empty() && self.geometries_without_data.is_empty()
    }
}
