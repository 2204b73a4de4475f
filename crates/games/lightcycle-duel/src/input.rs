use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lightcycle_core::player::PlayerSlot;

use super::Direction;

/// What a physical key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub slot: PlayerSlot,
    pub direction: Direction,
}

/// Steering command as sent through [`lightcycle_core::game_trait::ArenaGame::apply_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteerInput {
    pub direction: Direction,
}

/// Arrow keys steer player 1, WASD steers player 2. Keys use DOM
/// `KeyboardEvent.key` names.
pub fn default_key_bindings() -> BTreeMap<String, KeyBinding> {
    let keys = [
        ("ArrowUp", PlayerSlot::One, Direction::North),
        ("ArrowDown", PlayerSlot::One, Direction::South),
        ("ArrowLeft", PlayerSlot::One, Direction::West),
        ("ArrowRight", PlayerSlot::One, Direction::East),
        ("w", PlayerSlot::Two, Direction::North),
        ("s", PlayerSlot::Two, Direction::South),
        ("a", PlayerSlot::Two, Direction::West),
        ("d", PlayerSlot::Two, Direction::East),
    ];
    keys.into_iter()
        .map(|(key, slot, direction)| (key.to_string(), KeyBinding { slot, direction }))
        .collect()
}

/// Look up a key. Unbound keys return `None`.
pub fn resolve_key(bindings: &BTreeMap<String, KeyBinding>, key: &str) -> Option<KeyBinding> {
    bindings.get(key).copied()
}
