use serde::{Deserialize, Serialize};

use hexfief_protocol::{BalanceSnapshot, HexCoord, KingdomId, KingdomSnapshot, PlayerId};

/// Last income-pass figures, kept for the UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KingdomBalance {
    pub last_capital: i32,
    pub income: i32,
    pub upkeep: i32,
}

/// A maximal connected set of same-player hexes with a shared treasury.
/// Membership is kept sorted so `hexes[0]` is the deterministic
/// lowest-coordinate member.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Kingdom {
    pub player: PlayerId,
    pub hexes: Vec<HexCoord>,
    pub money: i32,
    pub balance: KingdomBalance,
}

impl Kingdom {
    pub fn new(player: PlayerId, mut hexes: Vec<HexCoord>) -> Self {
        hexes.sort_unstable();
        hexes.dedup();
        Self {
            player,
            hexes,
            money: 0,
            balance: KingdomBalance::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.hexes.len()
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.hexes.binary_search(&coord).is_ok()
    }

    pub fn add_hex(&mut self, coord: HexCoord) {
        if let Err(pos) = self.hexes.binary_search(&coord) {
            self.hexes.insert(pos, coord);
        }
    }

    pub fn remove_hex(&mut self, coord: HexCoord) {
        if let Ok(pos) = self.hexes.binary_search(&coord) {
            self.hexes.remove(pos);
        }
    }

    pub fn snapshot(&self, id: KingdomId) -> KingdomSnapshot {
        KingdomSnapshot {
            id,
            player: self.player,
            hexes: self.hexes.clone(),
            money: self.money,
            balance: BalanceSnapshot {
                last_capital: self.balance.last_capital,
                income: self.balance.income,
                upkeep: self.balance.upkeep,
            },
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    value: Option<Kingdom>,
}

/// Deterministic, generational storage for kingdoms.
///
/// - Stable iteration order: ascending slot index.
/// - Safe handles: `KingdomId { index, generation }`; `remove` bumps the
///   slot generation so stale handles miss.
/// - `restore` and `discard` rewind an earlier `remove`/`insert` exactly,
///   including the generation, so an undone-then-redone operation hands out
///   identical ids. Only the undo engine calls them.
#[derive(Clone, Debug, Default)]
pub struct KingdomStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl KingdomStore {
    pub fn insert(&mut self, kingdom: Kingdom) -> KingdomId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.value.is_none());
            slot.value = Some(kingdom);
            KingdomId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(kingdom),
            });
            KingdomId::new(index, 0)
        }
    }

    pub fn get(&self, id: KingdomId) -> Option<&Kingdom> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation == id.generation {
            slot.value.as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: KingdomId) -> Option<&mut Kingdom> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation == id.generation {
            slot.value.as_mut()
        } else {
            None
        }
    }

    pub fn remove(&mut self, id: KingdomId) -> Option<Kingdom> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(value)
    }

    /// Rewind a `remove`: put the kingdom back under its old id and roll the
    /// slot generation back to it.
    pub fn restore(&mut self, id: KingdomId, kingdom: Kingdom) {
        let slot = &mut self.slots[id.index as usize];
        debug_assert!(slot.value.is_none());
        slot.generation = id.generation;
        slot.value = Some(kingdom);
        self.free.retain(|&i| i != id.index);
    }

    /// Rewind an `insert`: vacate the slot without bumping the generation,
    /// so a replayed insert hands out the same id again.
    pub fn discard(&mut self, id: KingdomId) {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return;
        };
        if slot.generation != id.generation || slot.value.is_none() {
            return;
        }
        slot.value = None;
        self.free.push(id.index);
    }

    pub fn iter_ordered(&self) -> impl Iterator<Item = (KingdomId, &Kingdom)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let value = slot.value.as_ref()?;
            Some((KingdomId::new(index as u32, slot.generation), value))
        })
    }

    pub fn iter_ordered_mut(&mut self) -> impl Iterator<Item = (KingdomId, &mut Kingdom)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                let value = slot.value.as_mut()?;
                Some((KingdomId::new(index as u32, slot.generation), value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(pairs: &[(i32, i32)]) -> Vec<HexCoord> {
        pairs.iter().map(|&(q, r)| HexCoord::new(q, r)).collect()
    }

    #[test]
    fn membership_stays_sorted() {
        let mut kingdom = Kingdom::new(PlayerId(0), coords(&[(2, 0), (0, 0)]));
        kingdom.add_hex(HexCoord::new(1, 0));
        assert_eq!(
            kingdom.hexes,
            coords(&[(0, 0), (1, 0), (2, 0)]),
        );
        kingdom.remove_hex(HexCoord::new(0, 0));
        assert_eq!(kingdom.hexes[0], HexCoord::new(1, 0));
    }

    #[test]
    fn stale_ids_miss_after_removal() {
        let mut store = KingdomStore::default();
        let id = store.insert(Kingdom::new(PlayerId(0), coords(&[(0, 0), (1, 0)])));
        store.remove(id).expect("present");
        assert!(store.get(id).is_none());

        let reused = store.insert(Kingdom::new(PlayerId(1), coords(&[(0, 1)])));
        assert_eq!(reused.index, id.index);
        assert_ne!(reused.generation, id.generation);
        assert!(store.get(id).is_none());
    }

    #[test]
    fn discard_rewinds_an_insert_for_identical_replay() {
        let mut store = KingdomStore::default();
        let first = store.insert(Kingdom::new(PlayerId(0), coords(&[(0, 0), (1, 0)])));
        store.discard(first);
        assert!(store.get(first).is_none());
        let replayed = store.insert(Kingdom::new(PlayerId(0), coords(&[(0, 0), (1, 0)])));
        assert_eq!(replayed, first);
    }

    #[test]
    fn restore_revives_under_the_old_id() {
        let mut store = KingdomStore::default();
        let id = store.insert(Kingdom::new(PlayerId(0), coords(&[(0, 0), (1, 0)])));
        let removed = store.remove(id).expect("present");
        store.restore(id, removed);
        assert_eq!(store.get(id).expect("restored").player, PlayerId(0));
        // The freed slot must not be handed out again.
        let fresh = store.insert(Kingdom::new(PlayerId(1), coords(&[(0, 1)])));
        assert_ne!(fresh.index, id.index);
    }
}
