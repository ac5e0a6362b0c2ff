//! Simulation configuration.

use serde::{Deserialize, Serialize};

/// Parameters for generating and running one city simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seed for the deterministic city generator and NPC spawner.
    pub seed: u64,
    /// Map width in tiles.
    pub width: i32,
    /// Map height in tiles.
    pub height: i32,
    /// Distance between parallel roads; each block is `block_size - 1`
    /// tiles across.
    pub block_size: i32,
    /// Chance that a block receives a building instead of staying an
    /// empty lot.
    pub building_density: f32,
    /// Number of NPCs spawned by [`populate`](crate::engine::SimulationEngine::populate).
    pub npc_count: usize,
    /// Number of interactive props scattered on walkable tiles.
    pub prop_count: usize,
    /// Walking speed of spawned NPCs, in tiles per second.
    pub npc_speed: f32,
    /// Chebyshev radius each NPC reveals around itself.
    pub vision_radius: i32,
    /// When set, arrived NPCs immediately receive a fresh random
    /// destination so the city keeps moving.
    pub auto_wander: bool,
    /// Simulation speed multiplier (1.0 = real time).
    pub time_scale: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 424242,
            width: 48,
            height: 48,
            block_size: 6,
            building_density: 0.8,
            npc_count: 500,
            prop_count: 40,
            npc_speed: 1.0,
            vision_radius: 3,
            auto_wander: true,
            time_scale: 1.0,
        }
    }
}
