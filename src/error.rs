use std::path::PathBuf;

use thiserror::Error;

/// Required columns were missing from the raw table. Fatal for the load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required column(s): {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<String>,
}

/// Failure reading a delimited stats file from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed table data: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A metric name that does not map to any known stat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stat: {0:?}")]
pub struct UnknownStat(pub String);
