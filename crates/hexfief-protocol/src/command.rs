use serde::{Deserialize, Serialize};

use crate::{HexCoord, KingdomId};

/// All player intents accepted by the arbiter. Fully serializable; this is
/// also the redo representation of the arbiter's command history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Make a kingdom of the current player the active one.
    SelectKingdom { kingdom: KingdomId },
    /// Pick up an unplayed unit of the active kingdom.
    TakeUnit { at: HexCoord },
    /// Place the held selection (capture, in-kingdom drop, or tower build).
    Place { at: HexCoord },
    /// Buy a fresh level-1 unit, or upgrade the held unit by one level.
    BuyUnit,
    /// Buy a tower into the selection.
    BuyTower,
    /// Infer the intended action from the clicked hex.
    SmartAction { at: HexCoord },
    EndTurn,
}
