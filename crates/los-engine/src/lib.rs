//! Line-of-sight area coverage engine.
//!
//! Expands a polar sector around an origin antenna into a lazy grid of
//! evaluation points, sweeps line-of-sight rays over the terrain in
//! parallel worker threads, and folds packed results into the streaming
//! raster at interactive cadence.
//!
//! The moving parts, in dependency order:
//!
//! - [`profile`] — the point-to-point LOS kernel: terrain profile,
//!   optical clearance, first-Fresnel-zone clearance.
//! - [`grid`] — the sector grid: lazy, restartable, indexable, so any
//!   worker can regenerate its chunk of points deterministically.
//! - [`executor`] — the chunk executor: a thread-pool worker interface
//!   producing packed result batches.
//! - [`engine`] — the coordinator: strategy selection, progress,
//!   cancellation, raster folding, snapshot cadence.

pub mod engine;
pub mod executor;
pub mod grid;
pub mod observer;
pub mod profile;

use thiserror::Error;

pub use engine::{run_area_sweep, run_area_sweep_with, SweepHandle, SweepOptions};
pub use executor::{Chunk, ChunkOutput, RayonExecutor};
pub use grid::{GridConfig, GridPoint, SectorGrid};
pub use observer::{
    BatchReport, CoverageCell, SweepObserver, SweepOutcome, SweepSummary,
};
pub use profile::{evaluate_path, LosOutcome, PathEvaluation, ProfileSample};

/// Result type for sweep configuration and execution.
pub type SweepResult<T> = Result<T, SweepError>;

/// Errors surfaced by the coverage engine.
#[derive(Debug, Clone, Error)]
pub enum SweepError {
    /// The sector configuration is unusable; reported before any work
    /// starts.
    #[error("invalid sweep configuration: {0}")]
    BadConfig(String),

    /// Unexpected failure inside the engine; the sweep aborts but the
    /// state buffer remains valid and inspectable.
    #[error("internal sweep error: {0}")]
    Internal(String),
}

impl From<SweepError> for rf_common::CoverageError {
    fn from(err: SweepError) -> Self {
        match err {
            SweepError::BadConfig(msg) => rf_common::CoverageError::BadConfig(msg),
            SweepError::Internal(msg) => rf_common::CoverageError::InternalError(msg),
        }
    }
}
