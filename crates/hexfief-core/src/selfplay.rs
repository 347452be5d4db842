//! Headless self-play harness: autonomous seats play each other to exercise
//! the full engine and the turn contract end to end.

use serde::{Deserialize, Serialize};

use hexfief_protocol::{PlayerColor, PlayerId};

use crate::{
    arbiter::{ActionError, Arbiter},
    economy::EconomyConfig,
    player::GreedyPlayer,
    worldgen::{generate_world, WorldGenConfig},
};

/// Configuration for one self-play game.
#[derive(Clone, Debug)]
pub struct SelfPlayConfig {
    /// Board radius.
    pub radius: i32,
    /// Number of autonomous seats (2..=8).
    pub num_players: usize,
    /// Random seed for determinism.
    pub seed: u64,
    /// Turn cap before declaring a draw.
    pub max_turns: u32,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            radius: 5,
            num_players: 2,
            seed: 42,
            max_turns: 150,
        }
    }
}

/// Outcome of a self-play game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfPlayResult {
    pub seed: u64,
    pub turns_played: u32,
    pub winner: Option<PlayerId>,
    /// Final cell counts per seat, in turn order.
    pub hexes_owned: Vec<u32>,
}

/// Run a single self-play game to a winner or the turn cap.
pub fn run_selfplay(
    economy: &EconomyConfig,
    config: &SelfPlayConfig,
) -> Result<SelfPlayResult, ActionError> {
    let players = config.num_players.clamp(2, PlayerColor::ALL.len());
    let world = generate_world(
        economy,
        &WorldGenConfig {
            radius: config.radius,
            colors: PlayerColor::ALL[..players].to_vec(),
            seed: config.seed,
            tree_ratio: 0.1,
        },
    );

    let mut arbiter = Arbiter::new(world, economy.clone());
    for seat in 0..players {
        arbiter.set_controller(PlayerId(seat as u8), Box::new(GreedyPlayer));
    }

    arbiter.set_current_player(PlayerId(0))?;
    while arbiter.winner().is_none() && arbiter.world().turn < config.max_turns {
        arbiter.run_autonomous()?;
    }

    let mut hexes_owned = vec![0u32; players];
    for cell in arbiter.world().map.cells() {
        if let Some(p) = cell.player {
            hexes_owned[p.0 as usize] += 1;
        }
    }

    Ok(SelfPlayResult {
        seed: config.seed,
        turns_played: arbiter.world().turn,
        winner: arbiter.winner(),
        hexes_owned,
    })
}
