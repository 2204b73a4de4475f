use serde::{Deserialize, Serialize};

use lightcycle_core::player::PlayerSlot;

use super::CycleState;

/// Which wall a crashed cycle ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashKind {
    /// Head landed on the opponent's trail.
    OpponentTrail,
    /// Head landed on its own trail.
    OwnTrail,
}

/// A detected crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crash {
    pub crashed: PlayerSlot,
    pub kind: CrashKind,
}

impl Crash {
    /// The other player takes the round regardless of whose wall was hit.
    pub fn winner(&self) -> PlayerSlot {
        self.crashed.opponent()
    }
}

/// Whether `cycle`'s head sits on any cell of `trail_owner`'s trail.
///
/// Trails only hold cells recorded before this tick's move, so a cycle's
/// current head is never in its own trail yet.
pub fn head_on_trail(cycle: &CycleState, trail_owner: &CycleState) -> bool {
    trail_owner.trail.contains(cycle.x, cycle.y)
}

/// Every crash this tick, in resolution priority order: opponent-trail hits
/// before own-trail hits, player one before player two within each kind.
pub fn detect_crashes(cycles: &[CycleState; 2]) -> Vec<Crash> {
    let mut crashes = Vec::new();
    for slot in PlayerSlot::ALL {
        let cycle = &cycles[slot.index()];
        let opponent = &cycles[slot.opponent().index()];
        if head_on_trail(cycle, opponent) {
            crashes.push(Crash {
                crashed: slot,
                kind: CrashKind::OpponentTrail,
            });
        }
    }
    for slot in PlayerSlot::ALL {
        let cycle = &cycles[slot.index()];
        if head_on_trail(cycle, cycle) {
            crashes.push(Crash {
                crashed: slot,
                kind: CrashKind::OwnTrail,
            });
        }
    }
    crashes
}

/// The crash that decides the round, if any. Lower-priority crashes in the
/// same tick are logged and dropped.
pub fn deciding_crash(cycles: &[CycleState; 2]) -> Option<Crash> {
    let crashes = detect_crashes(cycles);
    let (&first, rest) = crashes.split_first()?;
    for dropped in rest {
        tracing::debug!(
            crashed = %dropped.crashed,
            kind = ?dropped.kind,
            "Simultaneous crash outranked"
        );
    }
    Some(first)
}
