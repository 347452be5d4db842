use serde::{Deserialize, Serialize};

use hexfief_protocol::{KingdomId, PlayerColor, PlayerId, PlayerSnapshot, WorldSnapshot};

use crate::{
    kingdom::{Kingdom, KingdomStore},
    map::WorldMap,
    rng::GameRng,
    territory,
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub color: PlayerColor,
}

/// The whole game state: the fixed board, the live kingdoms, the ordered
/// player list and the turn counter. Only the arbiter mutates it.
#[derive(Clone, Debug)]
pub struct World {
    pub map: WorldMap,
    pub kingdoms: KingdomStore,
    pub players: Vec<Player>,
    pub turn: u32,
    pub rng: GameRng,
}

impl World {
    pub fn new(map: WorldMap, colors: &[PlayerColor], seed: u64) -> Self {
        let players = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| Player {
                id: PlayerId(i as u8),
                color,
            })
            .collect();
        Self {
            map,
            kingdoms: KingdomStore::default(),
            players,
            turn: 0,
            rng: GameRng::seed_from_u64(seed),
        }
    }

    pub fn kingdoms_of(&self, player: PlayerId) -> impl Iterator<Item = (KingdomId, &Kingdom)> {
        self.kingdoms
            .iter_ordered()
            .filter(move |(_, k)| k.player == player)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            turn: self.turn,
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id,
                    color: p.color,
                })
                .collect(),
            cells: self.map.snapshot_cells(),
            kingdoms: self
                .kingdoms
                .iter_ordered()
                .map(|(id, k)| k.snapshot(id))
                .collect(),
        }
    }
}

/// Invariant violation found by [`check_invariants`].
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Audit the world's structural invariants. Returns every violation found;
/// empty means the state is consistent. This is a bug detector, not a
/// gameplay rule: a correct engine never trips it between operations.
#[must_use]
pub fn check_invariants(world: &World) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut report = |message: String| violations.push(InvariantViolation { message });

    for cell in world.map.cells() {
        if let Some(id) = cell.kingdom {
            match world.kingdoms.get(id) {
                None => report(format!("cell {:?} points at a dead kingdom", cell.coord)),
                Some(kingdom) => {
                    if cell.player != Some(kingdom.player) {
                        report(format!(
                            "cell {:?} owner {:?} disagrees with its kingdom's {:?}",
                            cell.coord, cell.player, kingdom.player
                        ));
                    }
                    if !kingdom.contains(cell.coord) {
                        report(format!(
                            "cell {:?} is not listed by the kingdom it references",
                            cell.coord
                        ));
                    }
                }
            }
        } else if cell.capital {
            report(format!(
                "kingdom-less cell {:?} carries a capital",
                cell.coord
            ));
        }
    }

    for (id, kingdom) in world.kingdoms.iter_ordered() {
        if kingdom.size() < 2 {
            report(format!("kingdom {id:?} has fewer than 2 hexes"));
        }
        if kingdom.money < 0 {
            report(format!("kingdom {id:?} has negative money"));
        }

        let components = territory::connected_components(&kingdom.hexes);
        if components.len() != 1 {
            report(format!(
                "kingdom {id:?} splits into {} components",
                components.len()
            ));
        }

        let mut capitals = 0;
        for &coord in &kingdom.hexes {
            match world.map.get(coord) {
                None => report(format!("kingdom {id:?} lists off-board hex {coord:?}")),
                Some(cell) => {
                    if cell.kingdom != Some(id) {
                        report(format!(
                            "kingdom {id:?} lists {coord:?} but the cell points elsewhere"
                        ));
                    }
                    if cell.capital {
                        capitals += 1;
                    }
                }
            }
        }
        if capitals != 1 {
            report(format!("kingdom {id:?} has {capitals} capitals"));
        }
    }

    violations
}
