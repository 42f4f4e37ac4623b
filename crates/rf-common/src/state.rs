//! Per-cell coverage state and its merge ordering.

use serde::{Deserialize, Serialize};

/// Coverage verdict for one raster cell.
///
/// The numeric ordering `EMPTY < NO_DATA < BLOCKED < CLEAR` is the merge
/// function: folding worker batches with `max` makes the merge commutative
/// and associative, so the final raster is independent of the order in
/// which batches arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    /// No result has been written for this cell yet.
    Empty = 0,
    /// The cell was evaluated but terrain data was missing along the ray.
    NoData = 1,
    /// Terrain blocks the line of sight.
    Blocked = 2,
    /// The line of sight is clear.
    Clear = 3,
}

impl CellState {
    /// Decode a state byte from a packed result word. Unknown values
    /// collapse to `Empty` so a corrupt batch can never corrupt the merge.
    pub fn from_u8(v: u8) -> CellState {
        match v {
            1 => CellState::NoData,
            2 => CellState::Blocked,
            3 => CellState::Clear,
            _ => CellState::Empty,
        }
    }

    /// Merge an incoming state into the current one.
    pub fn merge(self, incoming: CellState) -> CellState {
        self.max(incoming)
    }
}
