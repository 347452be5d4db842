use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use hexfief_protocol::{CellSnapshot, HexCoord, KingdomId, PlayerId};

use crate::entity::Entity;

/// One hex of the board. Cells are created by world generation and never
/// destroyed; ownership, kingdom membership, occupant and the capital flag
/// are the mutable parts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub coord: HexCoord,
    pub player: Option<PlayerId>,
    pub kingdom: Option<KingdomId>,
    pub entity: Option<Entity>,
    pub capital: bool,
}

impl Cell {
    pub fn unclaimed(coord: HexCoord) -> Self {
        Self {
            coord,
            player: None,
            kingdom: None,
            entity: None,
            capital: false,
        }
    }

}

/// The fixed board: an arena of cells in ascending coordinate order plus a
/// coordinate index. Iteration over `cells()` is the deterministic order
/// used everywhere.
#[derive(Clone, Debug)]
pub struct WorldMap {
    cells: Vec<Cell>,
    index: HashMap<HexCoord, usize>,
}

impl WorldMap {
    pub fn from_coords(coords: impl IntoIterator<Item = HexCoord>) -> Self {
        let mut coords: Vec<HexCoord> = coords.into_iter().collect();
        coords.sort_unstable();
        coords.dedup();

        let index = coords
            .iter()
            .enumerate()
            .map(|(i, &coord)| (coord, i))
            .collect();
        let cells = coords.into_iter().map(Cell::unclaimed).collect();
        Self { cells, index }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.index.contains_key(&coord)
    }

    pub fn get(&self, coord: HexCoord) -> Option<&Cell> {
        self.index.get(&coord).map(|&i| &self.cells[i])
    }

    pub fn get_mut(&mut self, coord: HexCoord) -> Option<&mut Cell> {
        let i = *self.index.get(&coord)?;
        Some(&mut self.cells[i])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// On-board neighbors of `coord`, in direction order.
    pub fn neighbors(&self, coord: HexCoord) -> impl Iterator<Item = &Cell> {
        coord.neighbors().filter_map(move |n| self.get(n))
    }

    pub fn is_neighbor(&self, a: HexCoord, b: HexCoord) -> bool {
        a.distance(b) == 1 && self.contains(a) && self.contains(b)
    }

    pub fn snapshot_cells(&self) -> Vec<CellSnapshot> {
        self.cells
            .iter()
            .map(|cell| CellSnapshot {
                coord: cell.coord,
                player: cell.player,
                kingdom: cell.kingdom,
                entity: cell.entity.as_ref().map(Entity::snapshot),
                capital: cell.capital,
            })
            .collect()
    }
}
