//! Message contract shared with the network layer.
//!
//! The transport and its serialization framework live outside this
//! workspace; the simulation core only agrees on plain-data shapes. Every
//! message travels as an [`Envelope`]: a string message-type tag, an integer
//! subtype code, and an opaque payload the transport does not interpret.

use serde::{Deserialize, Serialize};

use crate::grid::Position;
use crate::tile::NpcId;

/// Message-type tag for connection events.
pub const NET_EVENT: &str = "netEvent";
/// Message-type tag for movement orders sent to the server.
pub const MOVE_ORDER: &str = "moveOrder";
/// Message-type tag for arrival notices broadcast by the server.
pub const ARRIVAL_NOTICE: &str = "arrivalNotice";

/// Transport-facing wrapper: tag, subtype code, opaque payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub message_type: String,
    pub code: i32,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn new(message_type: &str, code: i32, payload: Vec<u8>) -> Self {
        Self {
            message_type: message_type.to_string(),
            code,
            payload,
        }
    }
}

/// Connection-level events exchanged between server and client. Some are
/// produced by the transport itself (probe/response pairs), others are sent
/// explicitly; the simulation core only ever sees them as plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetEvent {
    /// The server stopped answering.
    ServerLost,
    /// Probe sent to the server; answered with [`NetEvent::ServerResponse`].
    ServerTry,
    /// Server answer to a probe. Never sent manually.
    ServerResponse,
    /// The client stopped answering.
    ClientLost,
    /// Probe sent to the client; answered with [`NetEvent::ClientResponse`].
    ClientTry,
    /// Client answer to a probe. Never sent manually.
    ClientResponse,
    /// A message could not be delivered; carries its sequence number.
    MessageLost(i32),
    /// A player joined the game; carries the player id.
    PlayerJoin(i32),
    /// A player left the game; carries the player id.
    PlayerQuit(i32),
    /// Sending a message failed; carries its sequence number.
    SendError(i32),
    /// Receiving a message failed.
    ReceiveError,
}

impl NetEvent {
    /// Wire subtype code of this event.
    pub fn code(&self) -> i32 {
        match self {
            NetEvent::ServerLost => 1,
            NetEvent::ServerTry => 2,
            NetEvent::ServerResponse => 3,
            NetEvent::ClientLost => 4,
            NetEvent::ClientTry => 5,
            NetEvent::ClientResponse => 6,
            NetEvent::MessageLost(_) => 7,
            NetEvent::PlayerJoin(_) => 8,
            NetEvent::PlayerQuit(_) => 9,
            NetEvent::SendError(_) => 10,
            NetEvent::ReceiveError => 11,
        }
    }

    pub fn message_type() -> &'static str {
        NET_EVENT
    }
}

/// A deserialized movement order for one NPC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveOrder {
    pub npc: NpcId,
    pub target: Position,
}

/// Broadcast when an NPC reaches the end of its trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrivalNotice {
    pub npc: NpcId,
    pub position: Position,
}
