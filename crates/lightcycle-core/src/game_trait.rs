use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::player::PlayerSlot;
use crate::time::Millis;

/// Core trait for a frame-driven two-player simulation.
///
/// The host owns the frame loop and input devices; the game only handles
/// simulation logic and exposes snapshots for rendering.
pub trait ArenaGame: Send + Sync {
    /// Game metadata for display.
    fn metadata(&self) -> GameMetadata;

    /// Current simulation tick rate in Hz. May change between ticks, e.g.
    /// when a speed effect starts or expires.
    fn tick_rate(&self) -> f32;

    /// Run exactly one simulation tick. `now` is the wall-clock time used for
    /// effect expiry. Returns the events produced by this tick.
    fn update(&mut self, now: Millis) -> Vec<GameEvent>;

    /// Serialize the full game state for a renderer or observer.
    fn serialize_state(&self) -> Vec<u8>;

    /// Replace the game state with a previously serialized one.
    fn apply_state(&mut self, state: &[u8]);

    /// Apply an encoded input command for a player.
    fn apply_input(&mut self, slot: PlayerSlot, input: &[u8]);

    /// Whether the game supports being paused by the host.
    fn supports_pause(&self) -> bool {
        true
    }

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;

    /// Current match scores, one entry per slot.
    fn scores(&self) -> Vec<PlayerScore>;
}

/// Game metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub player_count: u8,
}

/// Free-form per-session overrides, keyed by config field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    pub custom: HashMap<String, serde_json::Value>,
}

/// Events emitted by a game during update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreUpdate { slot: PlayerSlot, score: u32 },
    RoundComplete { winner: PlayerSlot },
    MatchComplete { winner: PlayerSlot },
}

/// Score entry for a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub slot: PlayerSlot,
    pub score: u32,
}

/// Generates the boilerplate `ArenaGame` methods shared by every game:
/// `serialize_state`, `apply_state`, `pause`, `resume`, `is_paused`.
///
/// Requires the implementing struct to have `state: $StateType` and
/// `paused: bool` fields.
#[macro_export]
macro_rules! arena_game_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            match rmp_serde::to_vec(&self.state) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode game state");
                    Vec::new()
                },
            }
        }

        fn apply_state(&mut self, state: &[u8]) {
            match rmp_serde::from_slice::<$StateType>(state) {
                Ok(s) => self.state = s,
                Err(e) => tracing::debug!(error = %e, "Dropped malformed game state"),
            }
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }
    };
}
