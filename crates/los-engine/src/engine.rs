//! The sweep coordinator.
//!
//! Owns the streaming raster and the statistics, feeds chunks to the
//! worker pool through a bounded window, folds completed batches in
//! arrival order and drives the observer callbacks. Arrival order does
//! not affect the final raster: the merge is order-independent, and the
//! counters are running sums.

use crate::executor::{Chunk, RayonExecutor, SweepContext};
use crate::grid::{GridConfig, SectorGrid};
use crate::observer::{BatchReport, CoverageCell, SweepObserver, SweepOutcome, SweepSummary};
use crate::SweepError;
use dsm_store::DsmRegistry;
use raster::{CellStats, RasterMapping, StreamingRaster};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

/// Grids at or below this point count run in direct mode.
const DIRECT_THRESHOLD: u64 = 50_000;
/// Smallest chunk handed to a worker.
const MIN_CHUNK: u64 = 256;
/// Largest chunk handed to a worker.
const MAX_CHUNK: u64 = 16_384;

/// Engine tuning knobs. The defaults match interactive use; tests pin
/// worker counts and thresholds through these.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Worker thread count; `None` uses the host's available parallelism.
    pub workers: Option<usize>,
    /// Direct-mode cutoff in grid points.
    pub direct_threshold: u64,
    /// Minimum interval between `on_progress` calls.
    pub progress_interval: Duration,
    /// Minimum interval between raster flushes.
    pub flush_interval: Duration,
    /// Dirty-cell count that forces a flush ahead of the interval.
    pub flush_dirty_cells: usize,
    /// Terrain sampling step along each ray; `None` derives it from the
    /// grid resolution, capped at 10 m.
    pub sample_step_m: Option<f64>,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            workers: None,
            direct_threshold: DIRECT_THRESHOLD,
            progress_interval: Duration::from_millis(100),
            flush_interval: Duration::from_millis(500),
            flush_dirty_cells: 50_000,
            sample_step_m: None,
        }
    }
}

/// Handle to a running sweep.
pub struct SweepHandle {
    cancel: Arc<AtomicBool>,
    join: tokio::task::JoinHandle<()>,
}

impl SweepHandle {
    /// Request cancellation. Workers observe the flag at their next
    /// point boundary; in-flight results are discarded and a terminal
    /// cancelled summary follows.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Wait for the sweep to reach its terminal event.
    pub async fn wait(self) {
        let _ = self.join.await;
    }
}

/// Start an area sweep with default options.
///
/// Must be called from within a tokio runtime. Configuration errors are
/// reported through `on_error` before any evaluation starts.
pub fn run_area_sweep(
    config: GridConfig,
    registry: Arc<DsmRegistry>,
    observer: Arc<dyn SweepObserver>,
) -> SweepHandle {
    run_area_sweep_with(config, registry, observer, SweepOptions::default())
}

/// Start an area sweep with explicit options.
pub fn run_area_sweep_with(
    config: GridConfig,
    registry: Arc<DsmRegistry>,
    observer: Arc<dyn SweepObserver>,
    options: SweepOptions,
) -> SweepHandle {
    let cancel = Arc::new(AtomicBool::new(false));
    let task_cancel = Arc::clone(&cancel);
    let join = tokio::spawn(async move {
        run_sweep(config, registry, observer, options, task_cancel).await;
    });
    SweepHandle { cancel, join }
}

async fn run_sweep(
    config: GridConfig,
    registry: Arc<DsmRegistry>,
    observer: Arc<dyn SweepObserver>,
    options: SweepOptions,
    cancel: Arc<AtomicBool>,
) {
    let grid = match SectorGrid::new(config.clone()) {
        Ok(grid) => grid,
        Err(err) => {
            warn!(%err, "sweep rejected");
            observer.on_error(&err);
            return;
        }
    };

    let total = grid.len();
    let mapping = RasterMapping::new(grid.bounds(), config.resolution_m);
    observer.on_bounds_ready(&mapping, total);

    let direct = total <= options.direct_threshold;
    let workers = options
        .workers
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
        .max(1);

    let chunk_size = (total / (workers as u64 * 32)).clamp(MIN_CHUNK, MAX_CHUNK);
    let chunks: Vec<Chunk> = (0..total)
        .step_by(chunk_size as usize)
        .enumerate()
        .map(|(id, start)| Chunk {
            id,
            start,
            end: (start + chunk_size).min(total),
        })
        .collect();

    info!(
        points = total,
        workers,
        chunks = chunks.len(),
        chunk_size,
        mode = if direct { "direct" } else { "streaming" },
        "sweep started"
    );

    let sample_step_m = options
        .sample_step_m
        .unwrap_or_else(|| config.resolution_m.min(10.0));

    let raster = StreamingRaster::new(mapping);
    let (tx, mut rx) = mpsc::channel(workers * 2);
    let ctx = Arc::new(SweepContext {
        grid,
        registry,
        mapping,
        cancel: Arc::clone(&cancel),
        sample_step_m,
        collect_cells: direct,
    });

    let executor = match RayonExecutor::new(workers, ctx, tx) {
        Ok(executor) => executor,
        Err(err) => {
            observer.on_error(&err);
            return;
        }
    };

    // Bounded submission window; refilled as results arrive
    let window = workers * 2;
    let mut next_chunk = 0usize;
    let mut outstanding = 0usize;
    while next_chunk < chunks.len() && outstanding < window {
        executor.submit(chunks[next_chunk]);
        next_chunk += 1;
        outstanding += 1;
    }

    let mut stats = CellStats::default();
    let mut processed = 0u64;
    let mut cell_batches: Option<Vec<(usize, Vec<CoverageCell>)>> = direct.then(Vec::new);
    let mut last_progress: Option<Instant> = None;
    let mut last_flush = Instant::now();

    while outstanding > 0 {
        let Some(output) = rx.recv().await else { break };
        outstanding -= 1;

        if cancel.load(Ordering::SeqCst) {
            // Discard; keep draining so worker threads unblock
            continue;
        }
        if output.interrupted {
            continue;
        }

        raster.apply_packed(&output.packed);
        stats.record(output.clear, output.blocked, output.no_data);
        processed += output.points_processed;
        let percent = (processed as f64 / total as f64 * 100.0).clamp(0.0, 100.0);

        observer.on_batch(&BatchReport {
            chunk_id: output.id,
            points_processed: output.points_processed,
            clear: output.clear,
            blocked: output.blocked,
            no_data: output.no_data,
            percent,
        });

        let throttled = last_progress
            .is_some_and(|t| t.elapsed() < options.progress_interval);
        if !throttled {
            observer.on_progress(percent);
            last_progress = Some(Instant::now());
        }

        if let (Some(batches), Some(cells)) = (cell_batches.as_mut(), output.cells) {
            batches.push((output.id, cells));
        }

        if !direct
            && (last_flush.elapsed() >= options.flush_interval
                || raster.dirty() >= options.flush_dirty_cells)
        {
            match raster.flush().await {
                Ok(snapshot) => observer.on_snapshot(snapshot),
                Err(err) => {
                    warn!(%err, "snapshot flush failed, aborting sweep");
                    observer.on_error(&SweepError::Internal(err.to_string()));
                    return;
                }
            }
            last_flush = Instant::now();
        }

        if next_chunk < chunks.len() && !cancel.load(Ordering::SeqCst) {
            executor.submit(chunks[next_chunk]);
            next_chunk += 1;
            outstanding += 1;
        }
    }

    if cancel.load(Ordering::SeqCst) {
        info!(processed, "sweep cancelled");
        observer.on_complete(&SweepSummary {
            outcome: SweepOutcome::Cancelled,
            stats,
            cells: None,
            state_buffer: None,
        });
        return;
    }

    observer.on_progress(100.0);

    // Final snapshot so the overlay shows the finished raster
    if !direct {
        match raster.flush().await {
            Ok(snapshot) => observer.on_snapshot(snapshot),
            Err(err) => {
                observer.on_error(&SweepError::Internal(err.to_string()));
                return;
            }
        }
    }

    let cells = cell_batches.map(|mut batches| {
        // Chunks complete in any order; the returned list does not
        batches.sort_by_key(|(id, _)| *id);
        batches.into_iter().flat_map(|(_, cells)| cells).collect()
    });

    let outcome = if stats.all_no_data() {
        SweepOutcome::NoCoverage
    } else {
        SweepOutcome::Completed
    };

    info!(
        total = stats.total,
        clear = stats.clear,
        blocked = stats.blocked,
        no_data = stats.no_data,
        ?outcome,
        "sweep finished"
    );

    observer.on_complete(&SweepSummary {
        outcome,
        stats,
        cells,
        state_buffer: (!direct).then(|| raster.state_bytes()),
    });
}
