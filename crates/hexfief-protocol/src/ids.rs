use serde::{Deserialize, Serialize};

/// Player ID is an index into the game's ordered player list; that order is
/// also the turn order and never changes during a game.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

/// Display color assigned to a player at setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Cyan,
    White,
}

impl PlayerColor {
    /// Setup deals colors in this order.
    pub const ALL: [PlayerColor; 8] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
        PlayerColor::Purple,
        PlayerColor::Orange,
        PlayerColor::Cyan,
        PlayerColor::White,
    ];
}

/// Generational handle into the kingdom store (safe against slot reuse).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct KingdomId {
    pub index: u32,
    pub generation: u32,
}

impl KingdomId {
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}
