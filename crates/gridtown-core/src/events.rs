//! Events emitted by the engine for the driver and the network layer.

use serde::{Deserialize, Serialize};

use gridtown_logic::protocol::ArrivalNotice;
use gridtown_logic::{NpcId, Position};

/// One simulation event. The engine queues these during `update`; the
/// driver drains the queue and forwards what the clients need to hear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    NpcSpawned { id: NpcId, position: Position },
    NpcArrived { id: NpcId, position: Position },
}

impl SimEvent {
    /// The wire message for events that clients are notified about.
    pub fn arrival_notice(&self) -> Option<ArrivalNotice> {
        match *self {
            SimEvent::NpcArrived { id, position } => Some(ArrivalNotice {
                npc: id,
                position,
            }),
            SimEvent::NpcSpawned { .. } => None,
        }
    }
}
