//! Batch self-play runner for balance checks.
//!
//! Usage: `hexfief-selfplay [games] [players] [radius]`

use tracing::info;

use hexfief_core::{load_economy, run_selfplay, EconomySource, SelfPlayConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        tracing::error!("self-play batch failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let games: u64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 10,
    };
    let num_players: usize = match args.next() {
        Some(raw) => raw.parse()?,
        None => 2,
    };
    let radius: i32 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 5,
    };

    let economy = load_economy(EconomySource::Embedded)?;

    let mut wins = vec![0u32; num_players];
    let mut draws = 0u32;
    for seed in 0..games {
        let config = SelfPlayConfig {
            radius,
            num_players,
            seed,
            ..SelfPlayConfig::default()
        };
        let result = run_selfplay(&economy, &config)?;
        info!(
            seed,
            turns = result.turns_played,
            winner = ?result.winner,
            hexes = ?result.hexes_owned,
            "game finished"
        );
        match result.winner {
            Some(p) => wins[p.0 as usize] += 1,
            None => draws += 1,
        }
    }
    info!(?wins, draws, "batch complete");
    Ok(())
}
