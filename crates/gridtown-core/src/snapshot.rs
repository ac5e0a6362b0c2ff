//! Broadcast snapshots of world state.
//!
//! The server captures a snapshot after each tick and ships it to clients
//! through the external transport; clients only ever read these, never the
//! live world. Encoding uses bincode over the serde shapes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gridtown_logic::protocol::Envelope;
use gridtown_logic::{NpcId, Position};

/// Message-type tag snapshots travel under.
pub const SNAPSHOT: &str = "worldSnapshot";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot codec failure: {0}")]
    Codec(#[from] bincode::Error),
}

/// One NPC as the clients see it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NpcState {
    pub id: NpcId,
    pub position: Position,
    pub speed: f32,
    pub arrived: bool,
}

/// Complete per-tick world state for broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub sim_time: f64,
    /// NPC states sorted by id for a stable broadcast order.
    pub npcs: Vec<NpcState>,
    /// Row-major explored mask for the client's fog overlay.
    pub explored: Vec<bool>,
}

impl WorldSnapshot {
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Wraps the encoded snapshot for the transport.
    pub fn envelope(&self) -> Result<Envelope, SnapshotError> {
        Ok(Envelope::new(SNAPSHOT, 0, self.encode()?))
    }
}
