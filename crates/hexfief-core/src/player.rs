use hexfief_protocol::{HexCoord, KingdomId};

use crate::{
    arbiter::{ActionError, Arbiter},
    entity::Entity,
    territory,
};

/// What a controller did with its turn notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnStatus {
    /// Leave the turn open; an external driver (the UI) issues the intents.
    Waiting,
    /// The controller played its turn; the arbiter should end it.
    Ended,
}

/// The contract a player implementation satisfies. `notify_turn` is invoked
/// exactly once per turn start and must stay on the calling thread; an
/// autonomous implementation issues its intents through the arbiter before
/// returning [`TurnStatus::Ended`].
pub trait PlayerController: std::fmt::Debug {
    fn notify_turn(&mut self, arbiter: &mut Arbiter) -> Result<TurnStatus, ActionError>;
}

/// A human seat: turn start is a no-op and the UI drives the arbiter.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalPlayer;

impl PlayerController for LocalPlayer {
    fn notify_turn(&mut self, _arbiter: &mut Arbiter) -> Result<TurnStatus, ActionError> {
        Ok(TurnStatus::Waiting)
    }
}

/// Baseline autonomous seat: marches rested units onto the nearest
/// unprotected frontier cell, then spends the treasury on fresh recruits.
/// Deliberately simple; it exists to exercise the turn contract, not to play
/// well.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyPlayer;

impl PlayerController for GreedyPlayer {
    fn notify_turn(&mut self, arbiter: &mut Arbiter) -> Result<TurnStatus, ActionError> {
        let Some(me) = arbiter.current_player() else {
            return Ok(TurnStatus::Ended);
        };
        let kingdom_ids: Vec<KingdomId> =
            arbiter.world().kingdoms_of(me).map(|(id, _)| id).collect();

        for id in kingdom_ids {
            // Earlier captures this turn may have folded this kingdom into
            // another one.
            if arbiter.world().kingdoms.get(id).is_none() {
                continue;
            }
            arbiter.set_current_kingdom(id)?;

            let posts: Vec<(HexCoord, u8)> = {
                let world = arbiter.world();
                let Some(kingdom) = world.kingdoms.get(id) else {
                    continue;
                };
                kingdom
                    .hexes
                    .iter()
                    .filter_map(|&h| {
                        let cell = world.map.get(h)?;
                        match cell.entity {
                            Some(Entity::Unit(unit)) if !unit.played => Some((h, unit.level)),
                            _ => None,
                        }
                    })
                    .collect()
            };
            for (post, level) in posts {
                let Some(target) = capture_target(arbiter, id, level) else {
                    continue;
                };
                arbiter.take_unit_at(post)?;
                arbiter.place_at(target)?;
            }

            loop {
                let Some(kingdom) = arbiter.world().kingdoms.get(id) else {
                    break;
                };
                if kingdom.money < arbiter.economy().unit_price {
                    break;
                }
                let Some(target) = capture_target(arbiter, id, 1) else {
                    break;
                };
                arbiter.buy_unit()?;
                arbiter.place_at(target)?;
            }
        }

        Ok(TurnStatus::Ended)
    }
}

/// First frontier cell of `id` capturable at `level`: adjacent to the
/// kingdom, not defended, and not one of our own occupied cells.
fn capture_target(arbiter: &Arbiter, id: KingdomId, level: u8) -> Option<HexCoord> {
    let world = arbiter.world();
    let economy = arbiter.economy();
    let kingdom = world.kingdoms.get(id)?;
    let me = kingdom.player;

    for &h in &kingdom.hexes {
        for n in h.neighbors() {
            let Some(cell) = world.map.get(n) else {
                continue;
            };
            if cell.kingdom == Some(id) {
                continue;
            }
            if cell.player == Some(me) && (cell.entity.is_some() || cell.capital) {
                continue;
            }
            if territory::protectors(world, economy, n, level, me).is_empty() {
                return Some(n);
            }
        }
    }
    None
}
