//! Workspace-level error type for embedders of the coverage engine.

use thiserror::Error;

/// Result type alias using CoverageError.
pub type CoverageResult<T> = Result<T, CoverageError>;

/// Aggregated error type surfaced at the engine boundary.
///
/// Numeric components never produce errors; they return sentinel values
/// (±∞, no-data) and let the caller decide. Parsing and sweep execution
/// raise typed errors through this enum.
#[derive(Debug, Error)]
pub enum CoverageError {
    // === Configuration ===
    #[error("Invalid sector configuration: {0}")]
    BadConfig(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    // === DSM ingest ===
    #[error("Malformed DSM file: {0}")]
    ParseError(String),

    #[error("Unsupported DSM format: {0}")]
    UnsupportedFormat(String),

    // === Sweep execution ===
    #[error("No DSM coverage for the requested sector")]
    NoCoverage,

    #[error("Sweep cancelled")]
    Cancelled,

    // === Infrastructure ===
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl CoverageError {
    /// Process exit code for CLI wrappers around the core:
    /// 0 success, 2 bad-config, 3 no-coverage, 4 cancelled, 5 parse-error,
    /// >=10 internal.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoverageError::BadConfig(_) | CoverageError::InvalidCoordinates(_) => 2,
            CoverageError::NoCoverage => 3,
            CoverageError::Cancelled => 4,
            CoverageError::ParseError(_) | CoverageError::UnsupportedFormat(_) => 5,
            CoverageError::InternalError(_) => 10,
        }
    }
}

impl From<std::io::Error> for CoverageError {
    fn from(err: std::io::Error) -> Self {
        CoverageError::InternalError(err.to_string())
    }
}
