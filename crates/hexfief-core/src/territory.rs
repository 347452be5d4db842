//! Pure territory algorithms: adjacency, protection, and the connectivity
//! bookkeeping that keeps kingdoms consistent while hexes change hands.
//!
//! The mutating functions take a revert log and record the prior value of
//! every datum they touch, so a caller can fold them into one atomically
//! undoable step.

use std::collections::{HashSet, VecDeque};

use hexfief_protocol::{HexCoord, KingdomId, PlayerId};

use crate::{
    economy::EconomyConfig,
    entity::Entity,
    kingdom::Kingdom,
    undo::Revert,
    world::World,
};

/// Connected components of `coords` under hex adjacency. Components come out
/// with sorted members, in order of their first appearance in `coords`.
pub fn connected_components(coords: &[HexCoord]) -> Vec<Vec<HexCoord>> {
    let members: HashSet<HexCoord> = coords.iter().copied().collect();
    let mut visited: HashSet<HexCoord> = HashSet::new();
    let mut components = Vec::new();

    for &start in coords {
        if visited.contains(&start) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited.insert(start);
        while let Some(coord) = queue.pop_front() {
            component.push(coord);
            for neighbor in coord.neighbors() {
                if members.contains(&neighbor) && visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }

    components
}

pub fn is_adjacent_to_kingdom(world: &World, coord: HexCoord, kingdom: KingdomId) -> bool {
    coord
        .neighbors()
        .any(|n| world.map.get(n).is_some_and(|c| c.kingdom == Some(kingdom)))
}

/// Something standing in the way of a capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Protector {
    pub at: HexCoord,
    pub level: u8,
}

/// Defenders blocking a capture of `target` at `attack_level`: entities on
/// the target cell or on adjacent cells of the same owner, whose protection
/// level meets or exceeds the attack. Units protect at their level, towers
/// and capitals at their configured levels. The attacker's own hexes have no
/// defenders.
pub fn protectors(
    world: &World,
    economy: &EconomyConfig,
    target: HexCoord,
    attack_level: u8,
    attacker: PlayerId,
) -> Vec<Protector> {
    let Some(owner) = world.map.get(target).and_then(|c| c.player) else {
        return Vec::new();
    };
    if owner == attacker {
        return Vec::new();
    }

    let mut out = Vec::new();
    for coord in std::iter::once(target).chain(target.neighbors()) {
        let Some(cell) = world.map.get(coord) else {
            continue;
        };
        if cell.player != Some(owner) {
            continue;
        }
        let mut level = if cell.capital {
            economy.capital_protection
        } else {
            0
        };
        match cell.entity {
            Some(Entity::Unit(unit)) => level = level.max(unit.level),
            Some(Entity::Tower) => level = level.max(economy.tower_protection),
            _ => {}
        }
        if level > 0 && level >= attack_level {
            out.push(Protector { at: coord, level });
        }
    }
    out
}

/// After the cell at `at` joined `into`, union every distinct same-player
/// kingdom among its neighbors into `into` (summing treasuries), and absorb
/// adjacent kingdom-less cells of the same player.
pub fn merge_adjacent_kingdoms(
    world: &mut World,
    at: HexCoord,
    into: KingdomId,
    reverts: &mut Vec<Revert>,
) {
    let Some(player) = world.map.get(at).and_then(|c| c.player) else {
        return;
    };

    for neighbor in at.neighbors() {
        let Some(cell) = world.map.get(neighbor) else {
            continue;
        };
        if cell.player != Some(player) {
            continue;
        }
        match cell.kingdom {
            Some(other) if other != into => {
                let Some(removed) = world.kingdoms.remove(other) else {
                    continue;
                };
                if let Some(dst) = world.kingdoms.get_mut(into) {
                    reverts.push(Revert::KingdomMoney {
                        kingdom: into,
                        money: dst.money,
                    });
                    reverts.push(Revert::KingdomHexes {
                        kingdom: into,
                        hexes: dst.hexes.clone(),
                    });
                    dst.money += removed.money;
                    for &h in &removed.hexes {
                        dst.add_hex(h);
                    }
                }
                for &h in &removed.hexes {
                    if let Some(c) = world.map.get_mut(h) {
                        reverts.push(Revert::CellOwner {
                            at: h,
                            player: c.player,
                            kingdom: c.kingdom,
                        });
                        c.kingdom = Some(into);
                    }
                }
                reverts.push(Revert::KingdomRemoved {
                    kingdom: other,
                    value: Box::new(removed),
                });
            }
            None => {
                if let Some(dst) = world.kingdoms.get_mut(into) {
                    reverts.push(Revert::KingdomHexes {
                        kingdom: into,
                        hexes: dst.hexes.clone(),
                    });
                    dst.add_hex(neighbor);
                }
                if let Some(c) = world.map.get_mut(neighbor) {
                    reverts.push(Revert::CellOwner {
                        at: neighbor,
                        player: c.player,
                        kingdom: c.kingdom,
                    });
                    c.kingdom = Some(into);
                }
            }
            _ => {}
        }
    }
}

/// Re-run connectivity over `id` after it lost a hex. If it broke into
/// several components, the largest keeps the original kingdom and the rest
/// become new kingdoms (or demote to lone cells). The treasury is divided
/// among the surviving kingdoms proportional to size; lone hexes keep no
/// treasury.
pub fn split_kingdom(world: &mut World, id: KingdomId, reverts: &mut Vec<Revert>) {
    let Some(kingdom) = world.kingdoms.get(id) else {
        return;
    };
    let player = kingdom.player;
    let money = kingdom.money;
    let original_hexes = kingdom.hexes.clone();

    let mut components = connected_components(&original_hexes);
    if components.len() <= 1 {
        demote_if_too_small(world, id, reverts);
        return;
    }

    // Deterministic order: largest first, then lowest leading coordinate.
    components.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));

    let viable: usize = components
        .iter()
        .filter(|c| c.len() >= 2)
        .map(Vec::len)
        .sum();
    let mut shares: Vec<i32> = components
        .iter()
        .map(|c| {
            if c.len() >= 2 && viable > 0 {
                money * c.len() as i32 / viable as i32
            } else {
                0
            }
        })
        .collect();
    let mut remainder = money - shares.iter().sum::<i32>();
    for (share, component) in shares.iter_mut().zip(&components) {
        if remainder == 0 {
            break;
        }
        if component.len() >= 2 {
            *share += 1;
            remainder -= 1;
        }
    }

    // The first component keeps the original kingdom.
    reverts.push(Revert::KingdomHexes {
        kingdom: id,
        hexes: original_hexes,
    });
    reverts.push(Revert::KingdomMoney { kingdom: id, money });
    if let Some(k) = world.kingdoms.get_mut(id) {
        k.hexes = components[0].clone();
        k.money = shares[0];
    }

    for (component, &share) in components.iter().zip(&shares).skip(1) {
        if component.len() >= 2 {
            let mut fresh = Kingdom::new(player, component.clone());
            fresh.money = share;
            let new_id = world.kingdoms.insert(fresh);
            reverts.push(Revert::KingdomCreated { kingdom: new_id });
            for &h in component {
                if let Some(c) = world.map.get_mut(h) {
                    reverts.push(Revert::CellOwner {
                        at: h,
                        player: c.player,
                        kingdom: c.kingdom,
                    });
                    c.kingdom = Some(new_id);
                }
            }
        } else {
            for &h in component {
                if let Some(c) = world.map.get_mut(h) {
                    reverts.push(Revert::CellOwner {
                        at: h,
                        player: c.player,
                        kingdom: c.kingdom,
                    });
                    c.kingdom = None;
                }
            }
        }
    }

    demote_if_too_small(world, id, reverts);
}

/// A kingdom below 2 hexes stops being one: its remaining cell (if any)
/// stays player-owned but kingdom-less, and the kingdom leaves the store.
pub fn demote_if_too_small(world: &mut World, id: KingdomId, reverts: &mut Vec<Revert>) {
    let Some(kingdom) = world.kingdoms.get(id) else {
        return;
    };
    if kingdom.size() >= 2 {
        return;
    }
    for h in kingdom.hexes.clone() {
        if let Some(c) = world.map.get_mut(h) {
            reverts.push(Revert::CellOwner {
                at: h,
                player: c.player,
                kingdom: c.kingdom,
            });
            c.kingdom = None;
        }
    }
    if let Some(removed) = world.kingdoms.remove(id) {
        reverts.push(Revert::KingdomRemoved {
            kingdom: id,
            value: Box::new(removed),
        });
    }
}

/// Ensure every kingdom has exactly one capital: keep the existing seat if
/// still a member, merge surplus seats down to the lowest coordinate, and
/// re-found a missing seat on the best member cell (empty preferred, then
/// overgrown cells whose occupant is cleared).
pub fn rebuild_capitals(world: &mut World, reverts: &mut Vec<Revert>) {
    let ids: Vec<KingdomId> = world.kingdoms.iter_ordered().map(|(id, _)| id).collect();
    for id in ids {
        let Some(kingdom) = world.kingdoms.get(id) else {
            continue;
        };
        let members = kingdom.hexes.clone();
        let flagged: Vec<HexCoord> = members
            .iter()
            .copied()
            .filter(|&h| world.map.get(h).is_some_and(|c| c.capital))
            .collect();

        match flagged.len() {
            1 => {}
            0 => {
                let Some(chosen) = pick_capital_site(world, &members) else {
                    continue;
                };
                if let Some(c) = world.map.get_mut(chosen) {
                    if matches!(c.entity, Some(Entity::Tree) | Some(Entity::Grave)) {
                        reverts.push(Revert::CellEntity {
                            at: chosen,
                            entity: c.entity,
                        });
                        c.entity = None;
                    }
                    reverts.push(Revert::CellCapital {
                        at: chosen,
                        capital: c.capital,
                    });
                    c.capital = true;
                }
            }
            _ => {
                // Members are sorted, so flagged[0] is the lowest seat.
                for &h in &flagged[1..] {
                    if let Some(c) = world.map.get_mut(h) {
                        reverts.push(Revert::CellCapital {
                            at: h,
                            capital: true,
                        });
                        c.capital = false;
                    }
                }
            }
        }
    }
}

fn pick_capital_site(world: &World, members: &[HexCoord]) -> Option<HexCoord> {
    let empty = members
        .iter()
        .copied()
        .find(|&h| world.map.get(h).is_some_and(|c| c.entity.is_none()));
    if empty.is_some() {
        return empty;
    }
    members
        .iter()
        .copied()
        .find(|&h| {
            matches!(
                world.map.get(h).and_then(|c| c.entity),
                Some(Entity::Tree) | Some(Entity::Grave)
            )
        })
        .or_else(|| members.first().copied())
}

/// Capitals cannot survive on kingdom-less cells: clear the stranded flag
/// and let the abandoned seat grow over.
pub fn clear_stranded_capitals(world: &mut World, reverts: &mut Vec<Revert>) {
    let stranded: Vec<HexCoord> = world
        .map
        .cells()
        .iter()
        .filter(|c| c.capital && c.kingdom.is_none())
        .map(|c| c.coord)
        .collect();
    for at in stranded {
        if let Some(c) = world.map.get_mut(at) {
            reverts.push(Revert::CellCapital { at, capital: true });
            c.capital = false;
            if c.entity.is_none() {
                reverts.push(Revert::CellEntity { at, entity: None });
                c.entity = Some(Entity::Tree);
            }
        }
    }
}

/// Income of one kingdom for an income pass: every member cell not overgrown
/// by a tree or grave produces `income_per_hex`.
pub fn kingdom_income(world: &World, economy: &EconomyConfig, kingdom: &Kingdom) -> i32 {
    let productive = kingdom
        .hexes
        .iter()
        .filter(|&&h| {
            !matches!(
                world.map.get(h).and_then(|c| c.entity),
                Some(Entity::Tree) | Some(Entity::Grave)
            )
        })
        .count();
    economy.income_per_hex * productive as i32
}

/// Upkeep owed by one kingdom for an income pass: the sum of its units'
/// level-scaled wages.
pub fn kingdom_upkeep(world: &World, economy: &EconomyConfig, kingdom: &Kingdom) -> i32 {
    kingdom
        .hexes
        .iter()
        .filter_map(|&h| world.map.get(h).and_then(|c| c.entity))
        .map(|entity| match entity {
            Entity::Unit(unit) => economy.unit_upkeep(unit.level),
            _ => 0,
        })
        .sum()
}
