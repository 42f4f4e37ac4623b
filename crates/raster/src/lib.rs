//! Streaming coverage raster.
//!
//! Maintains a fixed-size pixel grid over a sector's bounding rectangle,
//! folds packed worker batches into it with an order-independent merge,
//! and publishes PNG-encoded snapshots suitable for a map overlay.
//!
//! The merge rule is `new = max(current, incoming)` over the total order
//! `EMPTY < NO_DATA < BLOCKED < CLEAR`, which makes the fold commutative
//! and associative: any interleaving of worker batches produces a
//! byte-identical state buffer.

pub mod buffer;
pub mod mapping;
pub mod packed;
pub mod png;
pub mod snapshot;
pub mod stats;

use thiserror::Error;

pub use buffer::StateBuffer;
pub use mapping::RasterMapping;
pub use packed::{pack_cell, unpack_cell};
pub use snapshot::{RasterSnapshot, StreamingRaster};
pub use stats::CellStats;

/// Result type for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors raised while encoding or publishing snapshots.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("raster dimensions {width}x{height} out of range")]
    BadDimensions { width: usize, height: usize },
}
