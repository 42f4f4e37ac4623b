//! Snapshot publication with single-flight flushing.

use crate::buffer::StateBuffer;
use crate::mapping::RasterMapping;
use crate::png::encode_state_png;
use crate::{RasterError, RasterResult};
use bytes::Bytes;
use rf_common::GeoBounds;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// One published snapshot of the coverage raster.
#[derive(Debug, Clone)]
pub struct RasterSnapshot {
    /// PNG-encoded overlay image.
    pub png: Bytes,
    /// WGS84 corners of the image.
    pub corner_coords: GeoBounds,
    pub width: usize,
    pub height: usize,
    /// Effective resolution, metres per pixel east-west.
    pub eff_res_x_m: f64,
    /// Effective resolution, metres per pixel north-south.
    pub eff_res_y_m: f64,
    /// Monotone publication sequence number.
    pub seq: u64,
}

struct RasterState {
    buffer: StateBuffer,
    seq: u64,
    latest: Option<Arc<RasterSnapshot>>,
}

/// The streaming raster: a shared state buffer plus a snapshot publisher.
///
/// Batches are folded in by the sweep coordinator; `flush` encodes the
/// current buffer to PNG off-thread and publishes the result. Publishing
/// keeps only the latest snapshot; the previous one is dropped.
///
/// Flush is single-flight: a flush requested while one is running
/// collapses into a single queued follow-up instead of stacking.
pub struct StreamingRaster {
    mapping: RasterMapping,
    state: Mutex<RasterState>,
    flight: tokio::sync::Mutex<()>,
    queued: AtomicBool,
}

impl StreamingRaster {
    pub fn new(mapping: RasterMapping) -> Self {
        let buffer = StateBuffer::new(&mapping);
        Self {
            mapping,
            state: Mutex::new(RasterState {
                buffer,
                seq: 0,
                latest: None,
            }),
            flight: tokio::sync::Mutex::new(()),
            queued: AtomicBool::new(false),
        }
    }

    pub fn mapping(&self) -> &RasterMapping {
        &self.mapping
    }

    /// Fold a packed worker batch into the state buffer.
    pub fn apply_packed(&self, batch: &[u32]) {
        self.state.lock().unwrap().buffer.apply_packed(batch);
    }

    /// Pixels changed since the last flush.
    pub fn dirty(&self) -> usize {
        self.state.lock().unwrap().buffer.dirty()
    }

    /// Copy of the raw state bytes, for determinism checks and tests.
    pub fn state_bytes(&self) -> Vec<u8> {
        self.state.lock().unwrap().buffer.as_bytes().to_vec()
    }

    /// The most recently published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<RasterSnapshot>> {
        self.state.lock().unwrap().latest.clone()
    }

    /// Encode and publish a snapshot of the current buffer.
    ///
    /// Concurrent calls collapse: one caller runs the encode, late
    /// arrivals either run the single queued follow-up or return the
    /// snapshot published by the flush they waited on.
    pub async fn flush(&self) -> RasterResult<Arc<RasterSnapshot>> {
        if self.queued.swap(true, Ordering::SeqCst) {
            // A follow-up flush is already queued; wait for the flight to
            // clear and hand back whatever it published.
            let _guard = self.flight.lock().await;
            return self
                .state
                .lock()
                .unwrap()
                .latest
                .clone()
                .ok_or_else(|| RasterError::Encode("no snapshot published".into()));
        }

        let _guard = self.flight.lock().await;
        self.queued.store(false, Ordering::SeqCst);

        let (indices, seq, dirty) = {
            let mut state = self.state.lock().unwrap();
            state.seq += 1;
            let dirty = state.buffer.take_dirty();
            (state.buffer.as_bytes().to_vec(), state.seq, dirty)
        };

        let (width, height) = (self.mapping.width, self.mapping.height);
        let png = tokio::task::spawn_blocking(move || encode_state_png(&indices, width, height))
            .await
            .map_err(|e| RasterError::Encode(format!("encode task failed: {}", e)))??;

        debug!(seq, dirty, bytes = png.len(), "published raster snapshot");

        let snapshot = Arc::new(RasterSnapshot {
            png: Bytes::from(png),
            corner_coords: self.mapping.bounds,
            width,
            height,
            eff_res_x_m: self.mapping.eff_res_x_m,
            eff_res_y_m: self.mapping.eff_res_y_m,
            seq,
        });

        // Publish: the previous snapshot is dropped here
        self.state.lock().unwrap().latest = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}
