//! Digital Surface Model ingestion and sampling.
//!
//! Heterogenous gridded-elevation files (ESRI ASCII grid, SRTM HGT,
//! GeoTIFF, the in-country RES grid) are parsed into one uniform
//! [`DsmLayer`] shape and registered in a [`DsmRegistry`] that answers
//! elevation queries by `(lat, lon)`.
//!
//! Layers are immutable snapshots: a malformed file never partially
//! registers, and registered elevation arrays are shared read-only across
//! worker threads. Registry mutations are observable through a
//! subscription callback so consumers can invalidate caches.

pub mod formats;
pub mod layer;
pub mod registry;

use thiserror::Error;

pub use formats::{parse_dsm, parse_dsm_path, parse_dsm_with_crs, DsmFormat};
pub use layer::{DsmLayer, NativeGrid};
pub use registry::{DsmRegistry, RegistryEvent, SubscriptionId};

/// Result type for DSM parsing and registry operations.
pub type DsmResult<T> = Result<T, DsmError>;

/// Errors raised while ingesting a DSM file.
#[derive(Debug, Error)]
pub enum DsmError {
    /// The file does not match the expected layout for its format.
    #[error("malformed {format} file: {reason}")]
    BadFormat { format: &'static str, reason: String },

    /// The file ended before the declared sample count was read.
    #[error("truncated file: expected {expected} samples, found {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The coordinate reference system could not be established.
    #[error("unknown CRS: {0}")]
    UnknownCrs(String),

    /// The format is recognised but not supported.
    #[error("unsupported format: {0}")]
    Unsupported(String),

    /// The file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DsmError {
    pub(crate) fn bad_format(format: &'static str, reason: impl Into<String>) -> Self {
        DsmError::BadFormat {
            format,
            reason: reason.into(),
        }
    }
}
