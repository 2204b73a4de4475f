use serde::{Deserialize, Serialize};

use super::Direction;

/// A spawn position with starting direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
}

/// Playable canvas size in pixels, always a whole number of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent {
    pub width: i32,
    pub height: i32,
}

impl Extent {
    /// Round a viewport down to a multiple of `cell_size`.
    pub fn from_viewport(width: i32, height: i32, cell_size: i32) -> Self {
        Self {
            width: width - width.rem_euclid(cell_size),
            height: height - height.rem_euclid(cell_size),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    /// Number of cell columns.
    pub fn columns(&self, cell_size: i32) -> i32 {
        self.width / cell_size
    }

    /// Number of cell rows.
    pub fn rows(&self, cell_size: i32) -> i32 {
        self.height / cell_size
    }
}

/// Classic duel layout: red top-left heading east, blue further down
/// heading west.
pub fn default_spawn_points() -> [SpawnPoint; 2] {
    [
        SpawnPoint {
            x: 100,
            y: 100,
            direction: Direction::East,
        },
        SpawnPoint {
            x: 300,
            y: 300,
            direction: Direction::West,
        },
    ]
}
