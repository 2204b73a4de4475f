use serde::{Deserialize, Serialize};

/// One recorded cell of a trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailCell {
    pub x: i32,
    pub y: i32,
    /// Size multiplier of the cycle when the cell was laid, for rendering.
    pub size: u8,
}

/// Append-only history of the cells a cycle has occupied this round.
///
/// Membership is a linear scan on exact coordinates. Trails are bounded by
/// round length times tick rate, which keeps the scan cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trail {
    cells: Vec<TrailCell>,
}

impl Trail {
    pub fn push(&mut self, cell: TrailCell) {
        self.cells.push(cell);
    }

    /// Whether any recorded cell sits exactly at `(x, y)`.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.cells.iter().any(|c| c.x == x && c.y == y)
    }

    pub fn cells(&self) -> &[TrailCell] {
        &self.cells
    }

    pub fn last(&self) -> Option<&TrailCell> {
        self.cells.last()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
