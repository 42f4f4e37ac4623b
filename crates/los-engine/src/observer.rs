//! Sweep event surface presented to callers.

use crate::SweepError;
use raster::{CellStats, RasterMapping, RasterSnapshot};
use rf_common::CellState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One evaluated grid cell, as returned in direct mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageCell {
    pub lat: f64,
    pub lon: f64,
    pub state: CellState,
}

/// Per-chunk completion report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub chunk_id: usize,
    pub points_processed: u64,
    pub clear: u64,
    pub blocked: u64,
    pub no_data: u64,
    /// Overall progress after folding this chunk, percent.
    pub percent: f64,
}

/// How a sweep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepOutcome {
    Completed,
    /// Every evaluated point lacked terrain data.
    NoCoverage,
    Cancelled,
}

/// Terminal summary delivered exactly once per sweep.
#[derive(Debug, Clone)]
pub struct SweepSummary {
    pub outcome: SweepOutcome,
    pub stats: CellStats,
    /// Full cell list; populated in direct mode only.
    pub cells: Option<Vec<CoverageCell>>,
    /// Final state-buffer bytes; populated in streaming mode only. The
    /// buffer is a pure function of the configuration, independent of
    /// worker count and chunk interleaving.
    pub state_buffer: Option<Vec<u8>>,
}

/// Callbacks fired by the calculation engine.
///
/// `on_complete` fires exactly once per sweep, whether it ran to the end
/// or was cancelled; no callback fires after it. `on_error` is terminal
/// too and replaces `on_complete` when the sweep aborts.
#[allow(unused_variables)]
pub trait SweepObserver: Send + Sync {
    /// The raster geometry and the exact point count are known; fired
    /// before any evaluation starts.
    fn on_bounds_ready(&self, mapping: &RasterMapping, estimate: u64) {}

    /// Monotone progress, throttled to at most one call per 100 ms.
    fn on_progress(&self, percent: f64) {}

    /// A chunk completed; fired unthrottled, in completion order.
    fn on_batch(&self, report: &BatchReport) {}

    /// A raster snapshot was published (streaming mode only).
    fn on_snapshot(&self, snapshot: Arc<RasterSnapshot>) {}

    /// Terminal: the sweep completed or was cancelled.
    fn on_complete(&self, summary: &SweepSummary) {}

    /// Terminal: the sweep aborted.
    fn on_error(&self, error: &SweepError) {}
}
