//! hexfief-core: the game-state authority for a hex territorial strategy
//! game — the board and kingdom model, the connectivity algorithms that keep
//! kingdoms consistent as territory changes hands, and the turn/action
//! arbiter with in-turn undo/redo.

mod arbiter;
mod economy;
mod entity;
mod kingdom;
mod map;
mod player;
mod rng;
pub mod selfplay;
mod territory;
mod trees;
mod undo;
mod world;
mod worldgen;

pub use crate::arbiter::*;
pub use crate::economy::*;
pub use crate::entity::*;
pub use crate::kingdom::*;
pub use crate::map::*;
pub use crate::player::*;
pub use crate::rng::*;
pub use crate::selfplay::{run_selfplay, SelfPlayConfig, SelfPlayResult};
pub use crate::territory::*;
pub use crate::trees::spawn_trees;
pub use crate::undo::*;
pub use crate::world::*;
pub use crate::worldgen::*;
