//! Pure spatial simulation logic for Gridtown.
//!
//! This crate contains the map and movement substrate that is independent
//! of any ECS, database, or runtime. Functions take plain data and return
//! results, making them unit-testable and portable between the authoritative
//! server engine and any headless tooling.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`grid`] | Tile coordinates, cardinal directions, continuous positions |
//! | [`tile`] | Map cells: terrain, exits, speed, occupancy, fog, buildings |
//! | [`geography`] | The tile grid container and walkable seed tile |
//! | [`pathfinding`] | Uniform-cost search over the tile exit graph |
//! | [`trajectory`] | Waypoint-queue movement of agents between tiles |
//! | [`protocol`] | Message contract shared with the network layer |

pub mod geography;
pub mod grid;
pub mod pathfinding;
pub mod protocol;
pub mod tile;
pub mod trajectory;

pub use geography::Geography;
pub use grid::{Coordinates, Direction, Position};
pub use pathfinding::Pathfinder;
pub use tile::{NpcId, PropId, Tile, TileKind};
pub use trajectory::Trajectory;
