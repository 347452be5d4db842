use serde::{Deserialize, Serialize};

use crate::{HexCoord, KingdomId, PlayerColor, PlayerId};

/// Full read-only game state for a UI collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub turn: u32,
    pub players: Vec<PlayerSnapshot>,
    pub cells: Vec<CellSnapshot>,
    pub kingdoms: Vec<KingdomSnapshot>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub color: PlayerColor,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub coord: HexCoord,
    pub player: Option<PlayerId>,
    pub kingdom: Option<KingdomId>,
    #[serde(default)]
    pub entity: Option<EntitySnapshot>,
    pub capital: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntitySnapshot {
    Unit { level: u8, played: bool },
    Tower,
    Tree,
    Grave,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KingdomSnapshot {
    pub id: KingdomId,
    pub player: PlayerId,
    pub hexes: Vec<HexCoord>,
    pub money: i32,
    pub balance: BalanceSnapshot,
}

/// Last income-pass figures, shown by the kingdom menu.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub last_capital: i32,
    pub income: i32,
    pub upkeep: i32,
}

/// Read-only arbiter state for drawing the action menu.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ArbiterSnapshot {
    pub current_player: Option<PlayerId>,
    pub current_kingdom: Option<KingdomId>,
    #[serde(default)]
    pub selection: Option<EntitySnapshot>,
    pub has_undo: bool,
    pub has_redo: bool,
    pub winner: Option<PlayerId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_snapshot_round_trips_through_json() {
        let cell = CellSnapshot {
            coord: HexCoord::new(1, -2),
            player: Some(PlayerId(1)),
            kingdom: Some(KingdomId::new(3, 0)),
            entity: Some(EntitySnapshot::Unit {
                level: 2,
                played: false,
            }),
            capital: true,
        };
        let json = serde_json::to_string(&cell).expect("serialize");
        let back: CellSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.coord, cell.coord);
        assert_eq!(back.entity, cell.entity);
        assert!(back.capital);
    }
}
