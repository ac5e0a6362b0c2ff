//! Simulation engine - main entry point for running the simulation

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use gridtown_logic::protocol::MoveOrder;
use gridtown_logic::{Coordinates, Geography, NpcId, Pathfinder, Position, Trajectory};

use crate::components::{Mobility, Npc, Prop};
use crate::config::SimConfig;
use crate::events::SimEvent;
use crate::generation::generate_city;
use crate::snapshot::{NpcState, WorldSnapshot};
use crate::systems::{
    apply_transfers, conceal_around, movement_system, place_props, random_destination,
    reveal_around, spawn_npcs,
};

/// Violations of the order-issuance contract, caught at the engine boundary.
/// The planner itself treats bad endpoints as fatal, so orders are validated
/// before any trajectory is built.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("unknown NPC {0:?}")]
    UnknownNpc(NpcId),
    #[error("order target {0:?} is outside the map")]
    TargetOutOfBounds(Position),
    #[error("order target tile {0:?} is not walkable")]
    TargetUnwalkable(Coordinates),
    #[error("order target tile {0:?} already contains the NPC")]
    DegenerateOrder(Coordinates),
}

/// The authoritative simulation. One instance lives on the server; a single
/// thread owns it and advances it once per tick. Clients never touch this
/// state directly, they consume [`WorldSnapshot`]s.
pub struct SimulationEngine {
    /// ECS world containing NPCs and props
    pub world: World,
    /// The city map, owned exclusively by the engine
    pub geography: Geography,
    pathfinder: Pathfinder,
    config: SimConfig,
    rng: StdRng,
    sim_time: f64,
    tick: u64,
    time_scale: f32,
    next_npc_id: u32,
    events: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Generates the city for `config` and wraps it in an empty simulation.
    pub fn new(config: SimConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let geography = generate_city(&config, &mut rng);
        log::info!(
            "generated {}x{} city (seed {})",
            config.width,
            config.height,
            config.seed,
        );
        Self {
            world: World::new(),
            geography,
            pathfinder: Pathfinder::new(),
            time_scale: config.time_scale,
            config,
            rng,
            sim_time: 0.0,
            tick: 0,
            next_npc_id: 0,
            events: Vec::new(),
        }
    }

    /// Spawns the configured NPC population and props on random walkable
    /// tiles.
    pub fn populate(&mut self) {
        let props = place_props(
            &mut self.world,
            &mut self.geography,
            &mut self.rng,
            self.config.prop_count,
            0,
        );
        let spawned = spawn_npcs(
            &mut self.world,
            &mut self.geography,
            &mut self.pathfinder,
            &mut self.rng,
            self.config.npc_count,
            self.next_npc_id,
            self.config.npc_speed,
        );
        self.next_npc_id += spawned.len() as u32;
        for event in &spawned {
            if let SimEvent::NpcSpawned { position, .. } = event {
                reveal_around(
                    &mut self.geography,
                    position.tile_coords(),
                    self.config.vision_radius,
                );
            }
        }
        log::info!("spawned {} NPCs and {} props", spawned.len(), props.len());
        self.events.extend(spawned);
    }

    /// Advances the simulation by `delta_seconds` of real time, scaled by
    /// the configured time scale.
    pub fn update(&mut self, delta_seconds: f32) {
        let dt = delta_seconds * self.time_scale;
        self.sim_time += f64::from(dt);
        self.tick += 1;

        let outcome = movement_system(&mut self.world, &mut self.geography, dt);
        apply_transfers(
            &mut self.geography,
            &outcome.transfers,
            self.config.vision_radius,
        );

        for arrival in &outcome.arrivals {
            self.events.push(SimEvent::NpcArrived {
                id: arrival.id,
                position: arrival.position,
            });
            log::debug!("NPC {:?} arrived at {:?}", arrival.id, arrival.position);
        }

        if self.config.auto_wander {
            for arrival in &outcome.arrivals {
                let target = random_destination(&self.geography, arrival.position, &mut self.rng);
                let trajectory = Trajectory::plan(
                    arrival.position,
                    target,
                    &self.geography,
                    &mut self.pathfinder,
                );
                let _ = self.world.insert_one(arrival.entity, trajectory);
            }
        }
    }

    /// Replaces an NPC's trajectory with a route to the ordered target.
    pub fn issue_order(&mut self, order: MoveOrder) -> Result<(), EngineError> {
        let target_tile = order.target.tile_coords();
        if !self.geography.in_bounds(target_tile) {
            return Err(EngineError::TargetOutOfBounds(order.target));
        }
        if !self.geography.tile(target_tile).is_walkable() {
            return Err(EngineError::TargetUnwalkable(target_tile));
        }

        let found = self.find_npc(order.npc);
        let (entity, position) = found.ok_or(EngineError::UnknownNpc(order.npc))?;
        if position.tile_coords() == target_tile {
            return Err(EngineError::DegenerateOrder(target_tile));
        }

        let trajectory =
            Trajectory::plan(position, order.target, &self.geography, &mut self.pathfinder);
        let _ = self.world.insert_one(entity, trajectory);
        log::debug!("NPC {:?} ordered to {:?}", order.npc, order.target);
        Ok(())
    }

    /// Removes an NPC from the world, its tile, and the fog bookkeeping.
    pub fn remove_npc(&mut self, id: NpcId) -> Result<(), EngineError> {
        let found = self.find_npc(id);
        let (entity, position) = found.ok_or(EngineError::UnknownNpc(id))?;
        let coords = position.tile_coords();
        self.geography.tile_mut(coords).remove_npc(id);
        conceal_around(&mut self.geography, coords, self.config.vision_radius);
        let _ = self.world.despawn(entity);
        Ok(())
    }

    fn find_npc(&self, id: NpcId) -> Option<(Entity, Position)> {
        self.world
            .query::<(&Npc, &Trajectory)>()
            .iter()
            .find(|(_, (npc, _))| npc.id == id)
            .map(|(entity, (_, trajectory))| (entity, trajectory.position()))
    }

    /// Captures the state clients need, sorted for a stable broadcast order.
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut npcs: Vec<NpcState> = self
            .world
            .query::<(&Npc, &Mobility, &Trajectory)>()
            .iter()
            .map(|(_, (npc, mobility, trajectory))| NpcState {
                id: npc.id,
                position: trajectory.position(),
                speed: mobility.speed,
                arrived: trajectory.has_arrived(),
            })
            .collect();
        npcs.sort_by_key(|npc| npc.id.0);
        WorldSnapshot {
            tick: self.tick,
            sim_time: self.sim_time,
            npcs,
            explored: self.geography.tiles().map(|tile| tile.explored).collect(),
        }
    }

    /// Drains the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Simulated seconds since start.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn npc_count(&self) -> usize {
        self.world.query::<&Npc>().iter().count()
    }

    pub fn prop_count(&self) -> usize {
        self.world.query::<&Prop>().iter().count()
    }

    /// NPCs currently walking a trajectory.
    pub fn moving_count(&self) -> usize {
        self.world
            .query::<(&Npc, &Trajectory)>()
            .iter()
            .filter(|(_, (_, trajectory))| !trajectory.has_arrived())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtown_logic::TileKind;

    fn test_config() -> SimConfig {
        SimConfig {
            width: 18,
            height: 18,
            npc_count: 20,
            ..Default::default()
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = SimulationEngine::new(test_config());
        assert_eq!(engine.npc_count(), 0);
        assert_eq!(engine.sim_time(), 0.0);
        assert_eq!(engine.geography.width(), 18);
    }

    #[test]
    fn test_populate_spawns_configured_npcs() {
        let mut engine = SimulationEngine::new(test_config());
        engine.populate();
        assert_eq!(engine.npc_count(), 20);
        assert_eq!(engine.moving_count(), 20);
        assert_eq!(engine.prop_count(), engine.config.prop_count);

        let events = engine.drain_events();
        assert_eq!(events.len(), 20);
        assert!(events
            .iter()
            .all(|event| matches!(event, SimEvent::NpcSpawned { .. })));
    }

    #[test]
    fn test_update_advances_time() {
        let mut engine = SimulationEngine::new(test_config());
        for _ in 0..10 {
            engine.update(0.1);
        }
        assert!((engine.sim_time() - 1.0).abs() < 1e-6);
        assert_eq!(engine.tick(), 10);
    }

    #[test]
    fn test_time_scale() {
        let mut engine = SimulationEngine::new(test_config());
        engine.set_time_scale(2.0);
        engine.update(1.0);
        assert!((engine.sim_time() - 2.0).abs() < 1e-6);
        engine.set_time_scale(-1.0);
        assert_eq!(engine.time_scale(), 0.0);
    }

    #[test]
    fn test_auto_wander_keeps_the_city_moving() {
        let mut engine = SimulationEngine::new(test_config());
        engine.populate();
        let _ = engine.drain_events();

        for _ in 0..400 {
            engine.update(0.5);
        }

        let arrivals = engine
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, SimEvent::NpcArrived { .. }))
            .count();
        assert!(arrivals > 0, "nobody arrived in 200 simulated seconds");
        // Every arrival got a fresh destination.
        assert_eq!(engine.moving_count(), engine.npc_count());
    }

    #[test]
    fn test_occupancy_stays_consistent() {
        let mut engine = SimulationEngine::new(test_config());
        engine.populate();
        for _ in 0..100 {
            engine.update(0.5);
        }

        let occupants: usize = engine.geography.tiles().map(|tile| tile.npcs.len()).sum();
        assert_eq!(occupants, engine.npc_count());

        for (_, (npc, trajectory)) in engine.world.query::<(&Npc, &Trajectory)>().iter() {
            let tile = engine.geography.tile(trajectory.position().tile_coords());
            assert!(tile.npcs.contains(&npc.id));
            assert!(tile.is_walkable());
        }
    }

    #[test]
    fn test_issue_order_validation() {
        let mut engine = SimulationEngine::new(test_config());
        engine.populate();

        let unknown = MoveOrder {
            npc: NpcId(999),
            target: Position::new(0.5, 0.5),
        };
        assert_eq!(
            engine.issue_order(unknown),
            Err(EngineError::UnknownNpc(NpcId(999))),
        );

        let outside = MoveOrder {
            npc: NpcId(0),
            target: Position::new(-3.0, 0.5),
        };
        assert!(matches!(
            engine.issue_order(outside),
            Err(EngineError::TargetOutOfBounds(_)),
        ));

        // Find some building tile to aim at.
        let blocked = engine
            .geography
            .tiles()
            .find(|tile| matches!(tile.kind, TileKind::House | TileKind::Bank))
            .map(|tile| tile.coords)
            .expect("default density places buildings");
        let unwalkable = MoveOrder {
            npc: NpcId(0),
            target: Position::tile_center(blocked),
        };
        assert_eq!(
            engine.issue_order(unwalkable),
            Err(EngineError::TargetUnwalkable(blocked)),
        );

        // Ordering an NPC onto its own tile is rejected, not planned.
        let current = engine.find_npc(NpcId(0)).unwrap().1;
        let degenerate = MoveOrder {
            npc: NpcId(0),
            target: Position::tile_center(current.tile_coords()),
        };
        assert_eq!(
            engine.issue_order(degenerate),
            Err(EngineError::DegenerateOrder(current.tile_coords())),
        );
    }

    #[test]
    fn test_issue_order_replans_trajectory() {
        let mut engine = SimulationEngine::new(test_config());
        engine.populate();

        let seed = engine.geography.walkable_seed().coords;
        let current = engine.find_npc(NpcId(3)).unwrap().1;
        let target = if current.tile_coords() == seed {
            Position::tile_center(Coordinates::new(seed.col + engine.config.block_size, seed.row))
        } else {
            Position::tile_center(seed)
        };

        engine
            .issue_order(MoveOrder {
                npc: NpcId(3),
                target,
            })
            .unwrap();

        let trajectory = {
            let mut query = engine.world.query::<(&Npc, &Trajectory)>();
            query
                .iter()
                .find(|(_, (npc, _))| npc.id == NpcId(3))
                .map(|(_, (_, trajectory))| trajectory.clone())
                .unwrap()
        };
        assert!(!trajectory.has_arrived());
        let last = trajectory.waypoints().last().copied().unwrap();
        assert_eq!(last.tile_coords(), target.tile_coords());
    }

    #[test]
    fn test_remove_npc_cleans_up() {
        let mut engine = SimulationEngine::new(test_config());
        engine.populate();
        assert_eq!(engine.npc_count(), 20);

        engine.remove_npc(NpcId(5)).unwrap();
        assert_eq!(engine.npc_count(), 19);
        let occupants: usize = engine.geography.tiles().map(|tile| tile.npcs.len()).sum();
        assert_eq!(occupants, 19);
        assert_eq!(
            engine.remove_npc(NpcId(5)),
            Err(EngineError::UnknownNpc(NpcId(5))),
        );
    }

    #[test]
    fn test_snapshot_reflects_population() {
        let mut engine = SimulationEngine::new(test_config());
        engine.populate();
        engine.update(0.5);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.npcs.len(), 20);
        assert_eq!(snapshot.explored.len(), (18 * 18) as usize);
        // Sorted by id.
        for pair in snapshot.npcs.windows(2) {
            assert!(pair[0].id.0 < pair[1].id.0);
        }
        // Spawn vision explored at least the spawn surroundings.
        assert!(snapshot.explored.iter().any(|&explored| explored));

        let bytes = snapshot.encode().unwrap();
        assert_eq!(WorldSnapshot::decode(&bytes).unwrap(), snapshot);
    }
}
