use hexfief_protocol::{Command, HexCoord, KingdomId, PlayerId};

use crate::{arbiter::Selection, entity::Entity, kingdom::Kingdom};

/// Prior-value patch recorded by a mutating operation. The undo engine
/// replays a step's patches in reverse order; they are plain data, so a
/// recorded step can be inspected in tests.
#[derive(Clone, Debug)]
pub enum Revert {
    CellEntity {
        at: HexCoord,
        entity: Option<Entity>,
    },
    CellOwner {
        at: HexCoord,
        player: Option<PlayerId>,
        kingdom: Option<KingdomId>,
    },
    CellCapital {
        at: HexCoord,
        capital: bool,
    },
    KingdomMoney {
        kingdom: KingdomId,
        money: i32,
    },
    KingdomHexes {
        kingdom: KingdomId,
        hexes: Vec<HexCoord>,
    },
    /// The kingdom was removed during the operation; revive it whole under
    /// its old id.
    KingdomRemoved {
        kingdom: KingdomId,
        value: Box<Kingdom>,
    },
    /// The kingdom was created during the operation; remove it again.
    KingdomCreated {
        kingdom: KingdomId,
    },
    Selection {
        selection: Selection,
    },
    CurrentKingdom {
        kingdom: Option<KingdomId>,
    },
}

/// One committed operation: the intent that produced it (replayed verbatim on
/// redo) and the inverse patches that unwind it.
#[derive(Clone, Debug)]
pub struct UndoStep {
    pub command: Command,
    pub reverts: Vec<Revert>,
}

/// In-turn command history. Never survives a turn boundary.
#[derive(Debug, Default)]
pub struct History {
    done: Vec<UndoStep>,
    undone: Vec<Command>,
}

impl History {
    pub fn push(&mut self, step: UndoStep) {
        self.done.push(step);
    }

    pub fn pop(&mut self) -> Option<UndoStep> {
        self.done.pop()
    }

    pub fn push_undone(&mut self, command: Command) {
        self.undone.push(command);
    }

    pub fn pop_undone(&mut self) -> Option<Command> {
        self.undone.pop()
    }

    pub fn clear_undone(&mut self) {
        self.undone.clear();
    }

    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }

    pub fn has_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn has_redo(&self) -> bool {
        !self.undone.is_empty()
    }
}
