//! The pixel state buffer and its order-independent merge.

use crate::mapping::RasterMapping;
use crate::packed::unpack_cell;
use rf_common::CellState;

/// One byte per pixel, initially `EMPTY`.
///
/// Folding batches with `max` keeps the buffer independent of batch
/// arrival order; the final bytes are a pure function of the set of
/// merged cells.
#[derive(Debug, Clone)]
pub struct StateBuffer {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    /// Pixels touched since the last snapshot.
    dirty: usize,
}

impl StateBuffer {
    pub fn new(mapping: &RasterMapping) -> Self {
        Self {
            width: mapping.width,
            height: mapping.height,
            cells: vec![CellState::Empty as u8; mapping.len()],
            dirty: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Merge a single cell.
    #[inline]
    pub fn merge(&mut self, px: usize, py: usize, state: CellState) {
        let idx = py * self.width + px;
        let incoming = state as u8;
        if incoming > self.cells[idx] {
            self.cells[idx] = incoming;
            self.dirty += 1;
        }
    }

    /// Fold a packed worker batch into the buffer.
    pub fn apply_packed(&mut self, batch: &[u32]) {
        for &word in batch {
            let (px, py, state) = unpack_cell(word);
            if px < self.width && py < self.height {
                self.merge(px, py, state);
            }
        }
    }

    /// Raw state bytes, row-major. Values are `CellState` discriminants,
    /// which doubles as the palette-index plane for PNG encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Pixels changed since the last `take_dirty`.
    pub fn dirty(&self) -> usize {
        self.dirty
    }

    /// Reset the dirty counter, returning the previous value.
    pub fn take_dirty(&mut self) -> usize {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packed::pack_cell;
    use rf_common::GeoBounds;

    fn mapping() -> RasterMapping {
        RasterMapping::new(GeoBounds::new(34.0, 31.0, 35.0, 32.0), 1000.0)
    }

    #[test]
    fn test_merge_upgrades_only() {
        let mut buffer = StateBuffer::new(&mapping());
        buffer.merge(3, 3, CellState::Clear);
        buffer.merge(3, 3, CellState::Blocked);
        let idx = 3 * buffer.width() + 3;
        assert_eq!(buffer.as_bytes()[idx], CellState::Clear as u8);
    }

    #[test]
    fn test_dirty_counts_changes_not_writes() {
        let mut buffer = StateBuffer::new(&mapping());
        buffer.merge(1, 1, CellState::Blocked);
        buffer.merge(1, 1, CellState::Blocked);
        buffer.merge(1, 1, CellState::NoData);
        assert_eq!(buffer.dirty(), 1);
        assert_eq!(buffer.take_dirty(), 1);
        assert_eq!(buffer.dirty(), 0);
    }

    #[test]
    fn test_apply_packed_order_independent() {
        let m = mapping();
        let mut batches: Vec<Vec<u32>> = Vec::new();
        for chunk in 0..8u32 {
            let mut batch = Vec::new();
            for i in 0..200u32 {
                let px = ((chunk * 37 + i * 13) as usize) % m.width;
                let py = ((chunk * 11 + i * 7) as usize) % m.height;
                let state = match (chunk + i) % 3 {
                    0 => CellState::NoData,
                    1 => CellState::Blocked,
                    _ => CellState::Clear,
                };
                batch.push(pack_cell(px, py, state));
            }
            batches.push(batch);
        }

        let mut forward = StateBuffer::new(&m);
        for batch in &batches {
            forward.apply_packed(batch);
        }

        let mut reversed = StateBuffer::new(&m);
        for batch in batches.iter().rev() {
            reversed.apply_packed(batch);
        }

        // Interleave cell-by-cell as a third schedule
        let mut interleaved = StateBuffer::new(&m);
        let longest = batches.iter().map(Vec::len).max().unwrap();
        for i in 0..longest {
            for batch in &batches {
                if let Some(&word) = batch.get(i) {
                    interleaved.apply_packed(&[word]);
                }
            }
        }

        assert_eq!(forward.as_bytes(), reversed.as_bytes());
        assert_eq!(forward.as_bytes(), interleaved.as_bytes());
    }

    #[test]
    fn test_out_of_range_pixels_ignored() {
        let m = mapping();
        let mut buffer = StateBuffer::new(&m);
        buffer.apply_packed(&[pack_cell(4095, 4095, CellState::Clear)]);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }
}
