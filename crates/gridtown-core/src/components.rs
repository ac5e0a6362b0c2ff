//! Components attached to simulated entities.
//!
//! The [`gridtown_logic::Trajectory`] type is used directly as a component;
//! an NPC entity is the triple `(Npc, Mobility, Trajectory)`.

use serde::{Deserialize, Serialize};

use gridtown_logic::{NpcId, PropId};

/// Identity marker for NPC entities. The id is the handle stored in tile
/// occupancy lists and sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub id: NpcId,
}

/// Movement capability of an agent, in tiles per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mobility {
    pub speed: f32,
}

/// Identity marker for interactive (clickable) objects placed on tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prop {
    pub id: PropId,
}
