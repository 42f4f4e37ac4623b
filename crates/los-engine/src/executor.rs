//! Chunk execution on a worker thread pool.
//!
//! The engine partitions the grid-point index space into chunks; each
//! worker regenerates its chunk's points from the shared grid, runs the
//! LOS kernel against the read-only DSM registry and emits one packed
//! 32-bit word per point. Results flow to the coordinator over a bounded
//! channel, so a slow coordinator blocks the pool instead of dropping
//! batches.

use crate::grid::SectorGrid;
use crate::observer::CoverageCell;
use crate::profile::evaluate_path;
use dsm_store::DsmRegistry;
use raster::{pack_cell, RasterMapping};
use rf_common::{CellState, GeoPoint};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// A contiguous slice of the grid-point index space.
#[derive(Debug, Clone, Copy)]
pub struct Chunk {
    pub id: usize,
    pub start: u64,
    pub end: u64,
}

/// Worker output for one chunk.
#[derive(Debug)]
pub struct ChunkOutput {
    pub id: usize,
    /// One packed `[px:12|py:12|state:8]` word per evaluated point.
    pub packed: Vec<u32>,
    /// Evaluated cells with coordinates; collected in direct mode only.
    pub cells: Option<Vec<CoverageCell>>,
    pub points_processed: u64,
    pub clear: u64,
    pub blocked: u64,
    pub no_data: u64,
    /// The cancel flag was observed mid-chunk; the coordinator discards
    /// this output.
    pub interrupted: bool,
}

/// Shared read-only context for chunk evaluation.
pub struct SweepContext {
    pub grid: SectorGrid,
    pub registry: Arc<DsmRegistry>,
    pub mapping: RasterMapping,
    pub cancel: Arc<AtomicBool>,
    /// Terrain sampling step along each ray, metres.
    pub sample_step_m: f64,
    /// Collect per-cell coordinates (direct mode).
    pub collect_cells: bool,
}

/// Evaluate every point of a chunk. Deterministic: the same chunk of the
/// same grid always produces the same packed words.
pub fn evaluate_chunk(ctx: &SweepContext, chunk: Chunk) -> ChunkOutput {
    let capacity = (chunk.end - chunk.start) as usize;
    let mut packed = Vec::with_capacity(capacity);
    let mut cells = ctx.collect_cells.then(|| Vec::with_capacity(capacity));
    let (mut clear, mut blocked, mut no_data) = (0u64, 0u64, 0u64);
    let mut interrupted = false;

    let config = ctx.grid.config().clone();
    let freq = config.frequency_mhz;

    for index in chunk.start..chunk.end {
        // Poll between grid-point iterations
        if ctx.cancel.load(Ordering::Relaxed) {
            interrupted = true;
            break;
        }

        let point = match ctx.grid.point_at(index) {
            Some(p) => p,
            None => break,
        };
        let target = GeoPoint::with_height(point.lat, point.lon, config.target_height_m);

        // Sector sweeps never ask for the profile
        let eval = evaluate_path(
            &ctx.registry,
            config.origin,
            target,
            freq,
            ctx.sample_step_m,
            false,
        );
        let state = eval.cell_state();
        match state {
            CellState::Clear => clear += 1,
            CellState::Blocked => blocked += 1,
            _ => no_data += 1,
        }

        let (px, py) = ctx.mapping.pixel_for(point.lat, point.lon);
        packed.push(pack_cell(px, py, state));

        if let Some(cells) = cells.as_mut() {
            cells.push(CoverageCell {
                lat: point.lat,
                lon: point.lon,
                state,
            });
        }
    }

    ChunkOutput {
        id: chunk.id,
        points_processed: clear + blocked + no_data,
        packed,
        cells,
        clear,
        blocked,
        no_data,
        interrupted,
    }
}

/// A worker pool executing chunks on dedicated rayon threads.
///
/// `submit` is fire-and-forget; completions arrive on the channel handed
/// to [`RayonExecutor::new`]. The channel is bounded: when the
/// coordinator falls behind, `blocking_send` parks the worker thread,
/// which is the engine's back-pressure.
pub struct RayonExecutor {
    pool: rayon::ThreadPool,
    ctx: Arc<SweepContext>,
    tx: mpsc::Sender<ChunkOutput>,
}

impl RayonExecutor {
    /// Build a pool with the given number of worker threads.
    pub fn new(
        workers: usize,
        ctx: Arc<SweepContext>,
        tx: mpsc::Sender<ChunkOutput>,
    ) -> Result<Self, crate::SweepError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("los-worker-{}", i))
            .build()
            .map_err(|e| crate::SweepError::Internal(format!("worker pool: {}", e)))?;
        debug!(workers, "worker pool ready");
        Ok(Self { pool, ctx, tx })
    }

    /// Queue a chunk for evaluation.
    pub fn submit(&self, chunk: Chunk) {
        let ctx = Arc::clone(&self.ctx);
        let tx = self.tx.clone();
        self.pool.spawn(move || {
            // A chunk whose turn comes after cancellation does not start
            if ctx.cancel.load(Ordering::Relaxed) {
                let _ = tx.blocking_send(ChunkOutput {
                    id: chunk.id,
                    packed: Vec::new(),
                    cells: None,
                    points_processed: 0,
                    clear: 0,
                    blocked: 0,
                    no_data: 0,
                    interrupted: true,
                });
                return;
            }
            let output = evaluate_chunk(&ctx, chunk);
            // The coordinator dropping the receiver means the sweep is
            // over; the output is no longer wanted.
            let _ = tx.blocking_send(output);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridConfig;
    use test_utils::{constant_layer, registry_with, AREA_CENTRAL};

    fn context(cancelled: bool) -> SweepContext {
        let config = GridConfig {
            origin: GeoPoint::with_height(32.0, 35.0, 10.0),
            min_distance_m: 200.0,
            max_distance_m: 2_000.0,
            min_azimuth_deg: 0.0,
            max_azimuth_deg: 360.0,
            resolution_m: 100.0,
            target_height_m: 10.0,
            frequency_mhz: None,
        };
        let grid = SectorGrid::new(config).unwrap();
        let mapping = RasterMapping::new(grid.bounds(), 100.0);
        SweepContext {
            grid,
            registry: Arc::new(registry_with(vec![constant_layer(
                "flat",
                AREA_CENTRAL,
                100.0,
                128,
            )])),
            mapping,
            cancel: Arc::new(AtomicBool::new(cancelled)),
            sample_step_m: 50.0,
            collect_cells: false,
        }
    }

    #[test]
    fn test_chunk_counts_add_up() {
        let ctx = context(false);
        let out = evaluate_chunk(
            &ctx,
            Chunk {
                id: 0,
                start: 0,
                end: 100,
            },
        );
        assert_eq!(out.points_processed, 100);
        assert_eq!(out.clear + out.blocked + out.no_data, 100);
        assert_eq!(out.packed.len(), 100);
        assert!(!out.interrupted);
    }

    #[test]
    fn test_chunk_is_deterministic() {
        let ctx = context(false);
        let chunk = Chunk {
            id: 3,
            start: 50,
            end: 250,
        };
        let a = evaluate_chunk(&ctx, chunk);
        let b = evaluate_chunk(&ctx, chunk);
        assert_eq!(a.packed, b.packed);
    }

    #[test]
    fn test_cancelled_chunk_is_interrupted() {
        let ctx = context(true);
        let out = evaluate_chunk(
            &ctx,
            Chunk {
                id: 0,
                start: 0,
                end: 100,
            },
        );
        assert!(out.interrupted);
        assert_eq!(out.points_processed, 0);
    }

    #[test]
    fn test_collect_cells_in_direct_mode() {
        let mut ctx = context(false);
        ctx.collect_cells = true;
        let out = evaluate_chunk(
            &ctx,
            Chunk {
                id: 0,
                start: 0,
                end: 40,
            },
        );
        let cells = out.cells.unwrap();
        assert_eq!(cells.len(), 40);
        assert!(cells.iter().all(|c| c.state == CellState::Clear));
    }
}
