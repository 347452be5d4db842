use serde::{Deserialize, Serialize};

use hexfief_protocol::EntitySnapshot;

/// A mobile fighting piece. `played` is consumed when the unit moves or
/// captures and resets at the owner's next turn start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub level: u8,
    pub played: bool,
}

impl Unit {
    pub const fn recruit() -> Self {
        Self {
            level: 1,
            played: false,
        }
    }

    pub const fn with_level(level: u8) -> Self {
        Self {
            level,
            played: false,
        }
    }
}

/// Everything that can occupy a hex. A closed set: dispatch is an exhaustive
/// match, never a runtime type test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Entity {
    Unit(Unit),
    Tower,
    Tree,
    /// Marker left where an unpaid unit died; turns into a tree at the
    /// owner's next income pass.
    Grave,
}

impl Entity {
    pub fn as_unit(&self) -> Option<&Unit> {
        match self {
            Entity::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn as_unit_mut(&mut self) -> Option<&mut Unit> {
        match self {
            Entity::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Entity::Unit(_))
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        match *self {
            Entity::Unit(Unit { level, played }) => EntitySnapshot::Unit { level, played },
            Entity::Tower => EntitySnapshot::Tower,
            Entity::Tree => EntitySnapshot::Tree,
            Entity::Grave => EntitySnapshot::Grave,
        }
    }
}
