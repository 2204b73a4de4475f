use serde::{Deserialize, Serialize};

/// One of the two fixed seats in a duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    /// Both slots in update order.
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn opponent(self) -> Self {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }

    /// Zero-based index, usable for `[T; 2]` storage.
    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    /// Default trail color for this slot.
    pub fn default_color(self) -> PlayerColor {
        PlayerColor::PALETTE[self.index()]
    }
}

impl std::fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerSlot::One => write!(f, "player 1"),
            PlayerSlot::Two => write!(f, "player 2"),
        }
    }
}

/// Trail color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for PlayerColor {
    fn default() -> Self {
        Self::PALETTE[0]
    }
}

impl PlayerColor {
    /// Slot colors, indexed by [`PlayerSlot::index`].
    pub const PALETTE: &[PlayerColor] = &[
        PlayerColor { r: 255, g: 0, b: 0 }, // Red
        PlayerColor { r: 0, g: 0, b: 255 }, // Blue
    ];

    /// Human-readable name used in match announcements.
    pub fn name(&self) -> &'static str {
        match (self.r, self.g, self.b) {
            (255, 0, 0) => "red",
            (0, 0, 255) => "blue",
            _ => "custom",
        }
    }
}
