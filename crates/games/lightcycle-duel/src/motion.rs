use serde::{Deserialize, Serialize};

use super::{CycleState, Direction};
use crate::arena::Extent;
use crate::trail::TrailCell;

/// Fastest supported speed, `2^8`. Compound pickups stop stacking here.
pub const MAX_SPEED_EXPONENT: i8 = 8;
/// Slowest supported speed, one half. Half of an even cell is still a whole
/// number of pixels, so displacement stays exact.
pub const MIN_SPEED_EXPONENT: i8 = -1;

/// Exact power-of-two speed multiplier (`2^exponent`).
///
/// Every effect doubles or halves speed, so tracking the exponent keeps
/// apply/revert pairs exact. `double` and `halve` never clamp inside the
/// supported range; the effective exponent used for movement is clamped to
/// [`MIN_SPEED_EXPONENT`]..=[`MAX_SPEED_EXPONENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeedMultiplier {
    exponent: i8,
}

impl SpeedMultiplier {
    pub const ONE: SpeedMultiplier = SpeedMultiplier { exponent: 0 };

    pub fn double(&mut self) {
        self.exponent = self.exponent.saturating_add(1);
    }

    pub fn halve(&mut self) {
        self.exponent = self.exponent.saturating_sub(1);
    }

    /// Raw exponent, including any out-of-range value loaded from a snapshot.
    pub fn exponent(self) -> i8 {
        self.exponent
    }

    fn effective_exponent(self) -> i8 {
        self.exponent.clamp(MIN_SPEED_EXPONENT, MAX_SPEED_EXPONENT)
    }

    pub fn factor(self) -> f32 {
        2f32.powi(i32::from(self.effective_exponent()))
    }

    /// Scale a cell-sized step. Exact for even steps, and never less than one
    /// pixel.
    pub fn scale(self, step: i32) -> i32 {
        let exponent = self.effective_exponent();
        let shift = u32::from(exponent.unsigned_abs());
        let scaled = if exponent >= 0 {
            step.checked_shl(shift).unwrap_or(i32::MAX)
        } else {
            step >> shift
        };
        scaled.max(1)
    }
}

/// Change heading. Only perpendicular turns are accepted; requests along the
/// current axis (including reversal) are ignored. Returns whether the heading
/// changed.
pub fn steer(cycle: &mut CycleState, direction: Direction) -> bool {
    if direction.is_parallel(cycle.direction) {
        return false;
    }
    cycle.direction = direction;
    true
}

/// Record the current cell in the trail, then advance one step along the
/// heading, wrapping at the canvas edges.
pub fn move_cycle(cycle: &mut CycleState, extent: Extent, cell_size: i32) {
    cycle.trail.push(TrailCell {
        x: cycle.x,
        y: cycle.y,
        size: cycle.size,
    });

    let (dx, dy) = cycle.velocity(cell_size);
    cycle.x = wrap(cycle.x.saturating_add(dx), extent.width, cell_size);
    cycle.y = wrap(cycle.y.saturating_add(dy), extent.height, cell_size);
}

/// Past the far edge lands on 0, before the near edge lands on the last cell.
fn wrap(coord: i32, extent: i32, cell_size: i32) -> i32 {
    if coord >= extent {
        0
    } else if coord < 0 {
        extent - cell_size
    } else {
        coord
    }
}
