//! Shared vocabulary between the hexfief engine and its frontends:
//! coordinates, identifiers, player intents, and read-only snapshots.

mod command;
mod hex;
mod ids;
mod snapshot;

pub use command::*;
pub use hex::*;
pub use ids::*;
pub use snapshot::*;
