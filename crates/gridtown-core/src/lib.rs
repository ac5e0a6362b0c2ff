//! Gridtown Core - City Simulation Engine
//!
//! An ECS-based simulation of a city populated by NPC agents that pathfind
//! across a tile grid. The authoritative server owns one engine instance,
//! advances it once per tick, and broadcasts snapshots; clients render those
//! snapshots and send orders back.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: NPCs and interactive props
//! - **Components**: Pure data attached to entities (Npc, Mobility, Trajectory)
//! - **Systems**: Logic that queries and updates components
//!
//! The map itself is not entity-based: the [`gridtown_logic::Geography`] grid
//! is a single resource owned by the engine, mutated only from the tick loop.
//!
//! # Example
//!
//! ```rust,no_run
//! use gridtown_core::prelude::*;
//!
//! let mut engine = SimulationEngine::new(SimConfig::default());
//! engine.populate();
//!
//! // Run simulation
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod generation;
pub mod snapshot;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::engine::{EngineError, SimulationEngine};
    pub use crate::events::SimEvent;
}
