use thiserror::Error;

use hexfief_protocol::{ArbiterSnapshot, Command, EntitySnapshot, HexCoord, KingdomId, PlayerId};

use crate::{
    economy::EconomyConfig,
    entity::{Entity, Unit},
    kingdom::KingdomBalance,
    player::{PlayerController, TurnStatus},
    territory::{self, Protector},
    trees,
    undo::{History, Revert, UndoStep},
    world::World,
};

/// Expected, user-recoverable rule violations. The UI presents these to the
/// player; everything else in [`ActionError`] is a caller bug.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IllegalMoveError {
    #[error("not enough money: need {needed}, have {available}")]
    NotEnoughMoney { needed: i32, available: i32 },
    #[error("hex is protected by {} defender(s)", blockers.len())]
    HexProtected { blockers: Vec<Protector> },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error(transparent)]
    IllegalMove(#[from] IllegalMoveError),
    #[error("no player selected")]
    NoPlayerSelected,
    #[error("unknown player {player:?}")]
    UnknownPlayer { player: PlayerId },
    #[error("no kingdom selected")]
    NoKingdomSelected,
    #[error("unknown kingdom")]
    UnknownKingdom,
    #[error("kingdom belongs to another player")]
    NotYourKingdom,
    #[error("no hex at {at:?}")]
    UnknownHex { at: HexCoord },
    #[error("hex is not part of the current kingdom")]
    NotYourHex,
    #[error("no unit at {at:?}")]
    NoUnitAt { at: HexCoord },
    #[error("unit can no longer move this turn")]
    UnitAlreadyPlayed,
    #[error("a selection is already held")]
    SelectionPending,
    #[error("nothing is selected")]
    NothingSelected,
    #[error("selected unit is already at max level")]
    SelectionAtMaxLevel,
    #[error("hex is too far from the current kingdom")]
    NotAdjacentToKingdom,
    #[error("merged unit would exceed level {max}")]
    UnitMergeTooHigh { max: u8 },
    #[error("a tower occupies this hex")]
    OccupiedByTower,
    #[error("the kingdom capital occupies this hex")]
    OccupiedByCapital,
    #[error("towers need an empty hex")]
    TowerNeedsEmptyHex,
    #[error("cannot change kingdom while holding a selection")]
    SelectionBlocksKingdomChange,
    #[error("the game is over")]
    GameOver,
}

/// What the current player holds between a take/buy and its placement.
/// A closed set; placement dispatches by exhaustive match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    None,
    Unit(Unit),
    Tower,
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn snapshot(&self) -> Option<EntitySnapshot> {
        match *self {
            Selection::None => None,
            Selection::Unit(Unit { level, played }) => Some(EntitySnapshot::Unit { level, played }),
            Selection::Tower => Some(EntitySnapshot::Tower),
        }
    }
}

/// The orchestrator and sole mutator of [`World`]: validates every intent
/// against the turn/selection state machine, applies it, and records a
/// data-only inverse so anything done within a turn can be undone.
#[derive(Debug)]
pub struct Arbiter {
    world: World,
    economy: EconomyConfig,
    selection: Selection,
    current_player: Option<PlayerId>,
    current_kingdom: Option<KingdomId>,
    history: History,
    winner: Option<PlayerId>,
    replaying: bool,
    controllers: Vec<Option<Box<dyn PlayerController>>>,
}

impl Arbiter {
    pub fn new(world: World, economy: EconomyConfig) -> Self {
        let controllers = world.players.iter().map(|_| None).collect();
        Self {
            world,
            economy,
            selection: Selection::None,
            current_player: None,
            current_kingdom: None,
            history: History::default(),
            winner: None,
            replaying: false,
            controllers,
        }
    }

    /// Attach a controller to a seat. Seats without one are driven
    /// externally, like a local player's UI.
    pub fn set_controller(&mut self, player: PlayerId, controller: Box<dyn PlayerController>) {
        if let Some(slot) = self.controllers.get_mut(player.0 as usize) {
            *slot = Some(controller);
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for setup and tests; gameplay goes through the
    /// public operations.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn economy(&self) -> &EconomyConfig {
        &self.economy
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.current_player
    }

    pub fn current_kingdom(&self) -> Option<KingdomId> {
        self.current_kingdom
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn has_undo(&self) -> bool {
        self.history.has_undo()
    }

    pub fn has_redo(&self) -> bool {
        self.history.has_redo()
    }

    pub fn snapshot(&self) -> ArbiterSnapshot {
        ArbiterSnapshot {
            current_player: self.current_player,
            current_kingdom: self.current_kingdom,
            selection: self.selection.snapshot(),
            has_undo: self.history.has_undo(),
            has_redo: self.history.has_redo(),
            winner: self.winner,
        }
    }

    /// Single dispatch entry for serialized intents; also how redo replays.
    pub fn apply(&mut self, command: Command) -> Result<(), ActionError> {
        match command {
            Command::SelectKingdom { kingdom } => self.set_current_kingdom(kingdom),
            Command::TakeUnit { at } => self.take_unit_at(at),
            Command::Place { at } => self.place_at(at),
            Command::BuyUnit => self.buy_unit(),
            Command::BuyTower => self.buy_tower(),
            Command::SmartAction { at } => self.smart_action(at),
            Command::EndTurn => self.end_turn(),
        }
    }

    /// Hand the turn to `player`: selection cleared, history cleared (undo
    /// never crosses a turn boundary), controller notified.
    pub fn set_current_player(&mut self, player: PlayerId) -> Result<(), ActionError> {
        self.ensure_known_player(player)?;
        self.selection = Selection::None;
        self.current_kingdom = None;
        self.history.clear();
        self.current_player = Some(player);
        self.run_controllers()
    }

    pub fn set_current_kingdom(&mut self, kingdom: KingdomId) -> Result<(), ActionError> {
        let player = self.ensure_player_selected()?;
        let owner = self
            .world
            .kingdoms
            .get(kingdom)
            .ok_or(ActionError::UnknownKingdom)?
            .player;
        if owner != player {
            return Err(ActionError::NotYourKingdom);
        }

        let reverts = vec![Revert::CurrentKingdom {
            kingdom: self.current_kingdom,
        }];
        self.current_kingdom = Some(kingdom);
        self.commit(Command::SelectKingdom { kingdom }, reverts);
        Ok(())
    }

    pub fn take_unit_at(&mut self, at: HexCoord) -> Result<(), ActionError> {
        let kid = self.ensure_kingdom_selected()?;
        let cell = self
            .world
            .map
            .get(at)
            .ok_or(ActionError::UnknownHex { at })?;
        if cell.kingdom != Some(kid) {
            return Err(ActionError::NotYourHex);
        }
        let Some(Entity::Unit(unit)) = cell.entity else {
            return Err(ActionError::NoUnitAt { at });
        };
        if unit.played {
            return Err(ActionError::UnitAlreadyPlayed);
        }
        if !self.selection.is_none() {
            return Err(ActionError::SelectionPending);
        }

        let reverts = vec![
            Revert::CellEntity {
                at,
                entity: Some(Entity::Unit(unit)),
            },
            Revert::Selection {
                selection: Selection::None,
            },
        ];
        if let Some(cell) = self.world.map.get_mut(at) {
            cell.entity = None;
        }
        self.selection = Selection::Unit(unit);
        self.commit(Command::TakeUnit { at }, reverts);
        Ok(())
    }

    /// Place the held selection, dispatching on what is held and where.
    pub fn place_at(&mut self, at: HexCoord) -> Result<(), ActionError> {
        let kid = self.ensure_kingdom_selected()?;
        let cell_kingdom = self
            .world
            .map
            .get(at)
            .ok_or(ActionError::UnknownHex { at })?
            .kingdom;
        match self.selection {
            Selection::None => Err(ActionError::NothingSelected),
            Selection::Unit(unit) => {
                if cell_kingdom == Some(kid) {
                    self.place_unit_inside(at, unit)
                } else {
                    self.place_unit_capture(at, unit, kid)
                }
            }
            Selection::Tower => self.place_tower(at, kid),
        }
    }

    pub fn buy_unit(&mut self) -> Result<(), ActionError> {
        let kid = self.ensure_kingdom_selected()?;
        let price = self.economy.unit_price;
        let money = self
            .world
            .kingdoms
            .get(kid)
            .ok_or(ActionError::UnknownKingdom)?
            .money;
        if money < price {
            return Err(IllegalMoveError::NotEnoughMoney {
                needed: price,
                available: money,
            }
            .into());
        }
        match self.selection {
            Selection::Unit(unit) if unit.level >= self.economy.unit_max_level => {
                return Err(ActionError::SelectionAtMaxLevel)
            }
            Selection::Tower => return Err(ActionError::SelectionPending),
            _ => {}
        }

        let reverts = vec![
            Revert::Selection {
                selection: self.selection,
            },
            Revert::KingdomMoney {
                kingdom: kid,
                money,
            },
        ];
        match &mut self.selection {
            Selection::Unit(unit) => unit.level += 1,
            selection => *selection = Selection::Unit(Unit::recruit()),
        }
        if let Some(kingdom) = self.world.kingdoms.get_mut(kid) {
            kingdom.money -= price;
        }
        self.commit(Command::BuyUnit, reverts);
        Ok(())
    }

    pub fn buy_tower(&mut self) -> Result<(), ActionError> {
        let kid = self.ensure_kingdom_selected()?;
        let price = self.economy.tower_price;
        let money = self
            .world
            .kingdoms
            .get(kid)
            .ok_or(ActionError::UnknownKingdom)?
            .money;
        if money < price {
            return Err(IllegalMoveError::NotEnoughMoney {
                needed: price,
                available: money,
            }
            .into());
        }
        if !self.selection.is_none() {
            return Err(ActionError::SelectionPending);
        }

        let reverts = vec![
            Revert::Selection {
                selection: Selection::None,
            },
            Revert::KingdomMoney {
                kingdom: kid,
                money,
            },
        ];
        self.selection = Selection::Tower;
        if let Some(kingdom) = self.world.kingdoms.get_mut(kid) {
            kingdom.money -= price;
        }
        self.commit(Command::BuyTower, reverts);
        Ok(())
    }

    /// Infer intent from a clicked hex. With nothing held, clicking one of
    /// the player's kingdoms selects it (picking up a rested unit when one
    /// is there); with a selection held, clicking always attempts placement
    /// and never switches kingdoms.
    pub fn smart_action(&mut self, at: HexCoord) -> Result<(), ActionError> {
        let player = self.ensure_player_selected()?;
        let (cell_kingdom, rested_unit) = {
            let cell = self
                .world
                .map
                .get(at)
                .ok_or(ActionError::UnknownHex { at })?;
            let rested = matches!(cell.entity, Some(Entity::Unit(unit)) if !unit.played);
            (cell.kingdom, rested)
        };

        if self.selection.is_none() {
            let Some(kid) = cell_kingdom else {
                return Ok(());
            };
            if Some(kid) == self.current_kingdom {
                if rested_unit {
                    self.take_unit_at(at)?;
                }
                return Ok(());
            }
            let owner = self
                .world
                .kingdoms
                .get(kid)
                .ok_or(ActionError::UnknownKingdom)?
                .player;
            if owner == player {
                self.set_current_kingdom(kid)?;
                if rested_unit {
                    self.take_unit_at(at)?;
                }
            }
            Ok(())
        } else {
            match cell_kingdom {
                Some(kid) if Some(kid) == self.current_kingdom => self.place_at(at),
                Some(kid) => {
                    let owner = self
                        .world
                        .kingdoms
                        .get(kid)
                        .ok_or(ActionError::UnknownKingdom)?
                        .player;
                    if owner == player {
                        Err(ActionError::SelectionBlocksKingdomChange)
                    } else {
                        self.place_at(at)
                    }
                }
                None => self.place_at(at),
            }
        }
    }

    /// Close the current player's turn: reset their units, advance (wrapping
    /// bumps the turn counter), run the incoming player's income pass after
    /// the turn-0 grace period, grow trees, then notify the next seat.
    pub fn end_turn(&mut self) -> Result<(), ActionError> {
        self.ensure_player_selected()?;
        if self.winner.is_some() {
            return Err(ActionError::GameOver);
        }
        if !self.selection.is_none() {
            return Err(ActionError::SelectionPending);
        }
        self.advance_turn()?;
        self.run_controllers()
    }

    /// Resume a game whose current seat is autonomous. One call is bounded
    /// by the same guard as `end_turn`; headless drivers call it in a loop.
    pub fn run_autonomous(&mut self) -> Result<(), ActionError> {
        self.run_controllers()
    }

    pub fn undo(&mut self) {
        if let Some(step) = self.history.pop() {
            for revert in step.reverts.into_iter().rev() {
                self.apply_revert(revert);
            }
            self.history.push_undone(step.command);
        }
    }

    pub fn redo(&mut self) -> Result<(), ActionError> {
        let Some(command) = self.history.pop_undone() else {
            return Ok(());
        };
        self.replaying = true;
        let result = self.apply(command);
        self.replaying = false;
        result
    }

    /// Rewind to the state at the start of the current turn.
    pub fn undo_all(&mut self) {
        while self.history.has_undo() {
            self.undo();
        }
    }

    fn ensure_player_selected(&self) -> Result<PlayerId, ActionError> {
        self.current_player.ok_or(ActionError::NoPlayerSelected)
    }

    fn ensure_kingdom_selected(&self) -> Result<KingdomId, ActionError> {
        self.ensure_player_selected()?;
        self.current_kingdom.ok_or(ActionError::NoKingdomSelected)
    }

    fn ensure_known_player(&self, player: PlayerId) -> Result<(), ActionError> {
        if (player.0 as usize) < self.world.players.len() {
            Ok(())
        } else {
            Err(ActionError::UnknownPlayer { player })
        }
    }

    fn commit(&mut self, command: Command, reverts: Vec<Revert>) {
        if !self.replaying {
            self.history.clear_undone();
        }
        self.history.push(UndoStep { command, reverts });
    }

    fn apply_revert(&mut self, revert: Revert) {
        match revert {
            Revert::CellEntity { at, entity } => {
                if let Some(cell) = self.world.map.get_mut(at) {
                    cell.entity = entity;
                }
            }
            Revert::CellOwner {
                at,
                player,
                kingdom,
            } => {
                if let Some(cell) = self.world.map.get_mut(at) {
                    cell.player = player;
                    cell.kingdom = kingdom;
                }
            }
            Revert::CellCapital { at, capital } => {
                if let Some(cell) = self.world.map.get_mut(at) {
                    cell.capital = capital;
                }
            }
            Revert::KingdomMoney { kingdom, money } => {
                if let Some(k) = self.world.kingdoms.get_mut(kingdom) {
                    k.money = money;
                }
            }
            Revert::KingdomHexes { kingdom, hexes } => {
                if let Some(k) = self.world.kingdoms.get_mut(kingdom) {
                    k.hexes = hexes;
                }
            }
            Revert::KingdomRemoved { kingdom, value } => {
                self.world.kingdoms.restore(kingdom, *value);
            }
            Revert::KingdomCreated { kingdom } => {
                self.world.kingdoms.discard(kingdom);
            }
            Revert::Selection { selection } => self.selection = selection,
            Revert::CurrentKingdom { kingdom } => self.current_kingdom = kingdom,
        }
    }

    fn place_unit_inside(&mut self, at: HexCoord, held: Unit) -> Result<(), ActionError> {
        let max_level = self.economy.unit_max_level;
        let cell = self
            .world
            .map
            .get(at)
            .ok_or(ActionError::UnknownHex { at })?;
        if cell.capital {
            return Err(ActionError::OccupiedByCapital);
        }
        match cell.entity {
            Some(Entity::Tower) => Err(ActionError::OccupiedByTower),
            Some(Entity::Unit(existing)) => {
                if existing.level + held.level > max_level {
                    return Err(ActionError::UnitMergeTooHigh { max: max_level });
                }
                let reverts = vec![
                    Revert::CellEntity {
                        at,
                        entity: Some(Entity::Unit(existing)),
                    },
                    Revert::Selection {
                        selection: Selection::Unit(held),
                    },
                ];
                if let Some(cell) = self.world.map.get_mut(at) {
                    cell.entity = Some(Entity::Unit(Unit {
                        level: existing.level + held.level,
                        played: existing.played,
                    }));
                }
                self.selection = Selection::None;
                self.commit(Command::Place { at }, reverts);
                Ok(())
            }
            ground => {
                let mut placed = held;
                if matches!(ground, Some(Entity::Tree) | Some(Entity::Grave)) {
                    // Clearing overgrown ground costs the unit its move.
                    placed.played = true;
                }
                let reverts = vec![
                    Revert::CellEntity { at, entity: ground },
                    Revert::Selection {
                        selection: Selection::Unit(held),
                    },
                ];
                if let Some(cell) = self.world.map.get_mut(at) {
                    cell.entity = Some(Entity::Unit(placed));
                }
                self.selection = Selection::None;
                self.commit(Command::Place { at }, reverts);
                Ok(())
            }
        }
    }

    fn place_unit_capture(
        &mut self,
        at: HexCoord,
        held: Unit,
        kid: KingdomId,
    ) -> Result<(), ActionError> {
        let attacker = self
            .world
            .kingdoms
            .get(kid)
            .ok_or(ActionError::UnknownKingdom)?
            .player;
        if !territory::is_adjacent_to_kingdom(&self.world, at, kid) {
            return Err(ActionError::NotAdjacentToKingdom);
        }
        let blockers = territory::protectors(&self.world, &self.economy, at, held.level, attacker);
        if !blockers.is_empty() {
            return Err(IllegalMoveError::HexProtected { blockers }.into());
        }

        let (former_kingdom, had_capital, prior_entity, prior_player) = {
            let cell = self
                .world
                .map
                .get(at)
                .ok_or(ActionError::UnknownHex { at })?;
            (cell.kingdom, cell.capital, cell.entity, cell.player)
        };

        let mut reverts = Vec::new();

        // A conquered capital forfeits its kingdom's treasury and its seat.
        if had_capital {
            if let Some(former) = former_kingdom {
                if let Some(k) = self.world.kingdoms.get_mut(former) {
                    reverts.push(Revert::KingdomMoney {
                        kingdom: former,
                        money: k.money,
                    });
                    k.money = 0;
                }
            }
            if let Some(cell) = self.world.map.get_mut(at) {
                reverts.push(Revert::CellCapital { at, capital: true });
                cell.capital = false;
            }
        }

        // Land the unit, spent.
        let mut placed = held;
        placed.played = true;
        reverts.push(Revert::CellEntity {
            at,
            entity: prior_entity,
        });
        reverts.push(Revert::Selection {
            selection: Selection::Unit(held),
        });
        if let Some(cell) = self.world.map.get_mut(at) {
            cell.entity = Some(Entity::Unit(placed));
        }
        self.selection = Selection::None;

        // Pull the hex out of its former kingdom...
        if let Some(former) = former_kingdom {
            if let Some(k) = self.world.kingdoms.get_mut(former) {
                reverts.push(Revert::KingdomHexes {
                    kingdom: former,
                    hexes: k.hexes.clone(),
                });
                k.remove_hex(at);
            }
        }

        // ...and into ours.
        reverts.push(Revert::CellOwner {
            at,
            player: prior_player,
            kingdom: former_kingdom,
        });
        if let Some(cell) = self.world.map.get_mut(at) {
            cell.player = Some(attacker);
            cell.kingdom = Some(kid);
        }
        if let Some(k) = self.world.kingdoms.get_mut(kid) {
            reverts.push(Revert::KingdomHexes {
                kingdom: kid,
                hexes: k.hexes.clone(),
            });
            k.add_hex(at);
        }

        territory::merge_adjacent_kingdoms(&mut self.world, at, kid, &mut reverts);
        if let Some(former) = former_kingdom {
            territory::split_kingdom(&mut self.world, former, &mut reverts);
        }
        territory::rebuild_capitals(&mut self.world, &mut reverts);
        territory::clear_stranded_capitals(&mut self.world, &mut reverts);

        self.commit(Command::Place { at }, reverts);
        Ok(())
    }

    fn place_tower(&mut self, at: HexCoord, kid: KingdomId) -> Result<(), ActionError> {
        let cell = self
            .world
            .map
            .get(at)
            .ok_or(ActionError::UnknownHex { at })?;
        if cell.kingdom != Some(kid) {
            return Err(ActionError::NotYourHex);
        }
        if cell.capital {
            return Err(ActionError::OccupiedByCapital);
        }
        if cell.entity.is_some() {
            return Err(ActionError::TowerNeedsEmptyHex);
        }

        let reverts = vec![
            Revert::CellEntity { at, entity: None },
            Revert::Selection {
                selection: Selection::Tower,
            },
        ];
        if let Some(cell) = self.world.map.get_mut(at) {
            cell.entity = Some(Entity::Tower);
        }
        self.selection = Selection::None;
        self.commit(Command::Place { at }, reverts);
        Ok(())
    }

    fn advance_turn(&mut self) -> Result<(), ActionError> {
        let current = self.ensure_player_selected()?;
        if !self.selection.is_none() {
            return Err(ActionError::SelectionPending);
        }
        self.reset_played_units(current);

        let next_index = (current.0 as usize + 1) % self.world.players.len();
        if next_index == 0 {
            self.world.turn += 1;
        }
        let next = self.world.players[next_index].id;

        // Turn 0 is a grace period with no economy pass.
        if self.world.turn > 0 {
            self.run_income_pass(next);
        }
        trees::spawn_trees(&mut self.world);
        self.update_winner();

        self.selection = Selection::None;
        self.current_kingdom = None;
        self.history.clear();
        self.current_player = Some(next);
        Ok(())
    }

    fn run_controllers(&mut self) -> Result<(), ActionError> {
        let cap = self.world.players.len().saturating_mul(4).max(1);
        let mut advanced = 0usize;
        loop {
            if self.winner.is_some() {
                return Ok(());
            }
            let Some(player) = self.current_player else {
                return Ok(());
            };
            let Some(slot) = self.controllers.get_mut(player.0 as usize) else {
                return Ok(());
            };
            let Some(mut controller) = slot.take() else {
                return Ok(());
            };
            let status = controller.notify_turn(self);
            self.controllers[player.0 as usize] = Some(controller);
            match status? {
                TurnStatus::Waiting => return Ok(()),
                TurnStatus::Ended => {
                    self.advance_turn()?;
                    advanced += 1;
                    if advanced >= cap {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn reset_played_units(&mut self, player: PlayerId) {
        let posts: Vec<HexCoord> = self
            .world
            .kingdoms
            .iter_ordered()
            .filter(|(_, k)| k.player == player)
            .flat_map(|(_, k)| k.hexes.iter().copied())
            .collect();
        for at in posts {
            if let Some(cell) = self.world.map.get_mut(at) {
                if let Some(unit) = cell.entity.as_mut().and_then(Entity::as_unit_mut) {
                    unit.played = false;
                }
            }
        }
    }

    fn run_income_pass(&mut self, player: PlayerId) {
        let ids: Vec<KingdomId> = self
            .world
            .kingdoms
            .iter_ordered()
            .filter(|(_, k)| k.player == player)
            .map(|(id, _)| id)
            .collect();

        for id in ids {
            let Some(kingdom) = self.world.kingdoms.get(id) else {
                continue;
            };
            let income = territory::kingdom_income(&self.world, &self.economy, kingdom);
            let upkeep = territory::kingdom_upkeep(&self.world, &self.economy, kingdom);
            let last_capital = kingdom.money;
            let hexes = kingdom.hexes.clone();

            let broke = {
                let Some(k) = self.world.kingdoms.get_mut(id) else {
                    continue;
                };
                k.balance = KingdomBalance {
                    last_capital,
                    income,
                    upkeep,
                };
                k.money += income - upkeep;
                if k.money < 0 {
                    k.money = 0;
                    true
                } else {
                    false
                }
            };

            for &at in &hexes {
                if let Some(cell) = self.world.map.get_mut(at) {
                    match cell.entity {
                        // Last turn's dead grow over before new wages are due.
                        Some(Entity::Grave) => cell.entity = Some(Entity::Tree),
                        Some(Entity::Unit(_)) if broke => cell.entity = Some(Entity::Grave),
                        _ => {}
                    }
                }
            }
        }

        // Lone cells support no garrison at all.
        let lone: Vec<HexCoord> = self
            .world
            .map
            .cells()
            .iter()
            .filter(|c| c.player == Some(player) && c.kingdom.is_none())
            .map(|c| c.coord)
            .collect();
        for at in lone {
            if let Some(cell) = self.world.map.get_mut(at) {
                match cell.entity {
                    Some(Entity::Grave) => cell.entity = Some(Entity::Tree),
                    Some(Entity::Unit(_)) => cell.entity = Some(Entity::Grave),
                    _ => {}
                }
            }
        }
    }

    /// A player who owns every live kingdom has won; `end_turn` is disabled
    /// once a winner is set.
    fn update_winner(&mut self) {
        if self.winner.is_some() || self.world.turn == 0 {
            return;
        }
        let mut owners = self.world.kingdoms.iter_ordered().map(|(_, k)| k.player);
        let Some(first) = owners.next() else {
            return;
        };
        if owners.all(|p| p == first) {
            self.winner = Some(first);
        }
    }
}
