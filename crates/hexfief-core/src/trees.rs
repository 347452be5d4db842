use hexfief_protocol::HexCoord;

use crate::{entity::Entity, world::World};

/// One-in-N chance per tree per end-turn to seed a neighbor.
const SPREAD_NUM: u32 = 1;
const SPREAD_DEN: u32 = 10;

/// Between-turn tree growth: each tree may seed one empty neighbor cell.
/// Runs off the world's own PRNG, so a seeded game replays identically.
/// Never touches ownership, kingdom structure or capitals.
pub fn spawn_trees(world: &mut World) {
    let groves: Vec<HexCoord> = world
        .map
        .cells()
        .iter()
        .filter(|c| matches!(c.entity, Some(Entity::Tree)))
        .map(|c| c.coord)
        .collect();

    let mut sprouts = Vec::new();
    for coord in groves {
        if !world.rng.chance(SPREAD_NUM, SPREAD_DEN) {
            continue;
        }
        let open: Vec<HexCoord> = world
            .map
            .neighbors(coord)
            .filter(|c| c.entity.is_none() && !c.capital)
            .map(|c| c.coord)
            .collect();
        if open.is_empty() {
            continue;
        }
        let pick = world.rng.gen_index(open.len());
        sprouts.push(open[pick]);
    }

    for at in sprouts {
        if let Some(cell) = world.map.get_mut(at) {
            if cell.entity.is_none() {
                cell.entity = Some(Entity::Tree);
            }
        }
    }
}
