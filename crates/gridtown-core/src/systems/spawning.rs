//! NPC spawning and re-ordering.

use hecs::World;
use rand::rngs::StdRng;
use rand::Rng;

use gridtown_logic::{Geography, NpcId, Pathfinder, Position, PropId, Trajectory};

use crate::components::{Mobility, Npc, Prop};
use crate::events::SimEvent;

/// Samples a uniform position strictly inside the map bounds that lands on
/// a walkable tile.
pub fn random_walkable_position(map: &Geography, rng: &mut StdRng) -> Position {
    loop {
        let position = Position::new(
            rng.gen_range(0.01..map.width() as f32 - 0.01),
            rng.gen_range(0.01..map.height() as f32 - 0.01),
        );
        if position.tile(map).is_walkable() {
            return position;
        }
    }
}

/// Samples a walkable destination on a different tile than `from`. Orders
/// are pre-validated here: the planner treats a degenerate or unwalkable
/// request as a caller bug, not a condition to recover from.
pub fn random_destination(map: &Geography, from: Position, rng: &mut StdRng) -> Position {
    loop {
        let target = random_walkable_position(map, rng);
        if target.tile_coords() != from.tile_coords() {
            return target;
        }
    }
}

/// Spawns `count` NPCs on random walkable tiles, each with a planned route
/// to a random destination. Ids are assigned from `first_id` upward.
pub fn spawn_npcs(
    world: &mut World,
    map: &mut Geography,
    pathfinder: &mut Pathfinder,
    rng: &mut StdRng,
    count: usize,
    first_id: u32,
    speed: f32,
) -> Vec<SimEvent> {
    let mut events = Vec::with_capacity(count);
    for offset in 0..count {
        let id = NpcId(first_id + offset as u32);
        let start = random_walkable_position(map, rng);
        let target = random_destination(map, start, rng);
        let trajectory = Trajectory::plan(start, target, map, pathfinder);
        let _ = world.spawn((Npc { id }, Mobility { speed }, trajectory));
        map.tile_mut(start.tile_coords()).add_npc(id);
        events.push(SimEvent::NpcSpawned {
            id,
            position: start,
        });
    }
    events
}

/// Scatters `count` interactive props across random walkable tiles.
pub fn place_props(
    world: &mut World,
    map: &mut Geography,
    rng: &mut StdRng,
    count: usize,
    first_id: u32,
) -> Vec<PropId> {
    let mut placed = Vec::with_capacity(count);
    for offset in 0..count {
        let id = PropId(first_id + offset as u32);
        let position = random_walkable_position(map, rng);
        map.tile_mut(position.tile_coords()).add_prop(id);
        let _ = world.spawn((Prop { id },));
        placed.push(id);
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::generation::generate_city;
    use rand::SeedableRng;

    fn small_city() -> (Geography, StdRng) {
        let config = SimConfig {
            width: 18,
            height: 18,
            npc_count: 0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(config.seed);
        let map = generate_city(&config, &mut rng);
        (map, rng)
    }

    #[test]
    fn test_sampled_positions_are_walkable() {
        let (map, mut rng) = small_city();
        for _ in 0..50 {
            let position = random_walkable_position(&map, &mut rng);
            assert!(map.tile(position.tile_coords()).is_walkable());
        }
    }

    #[test]
    fn test_destination_never_shares_the_start_tile() {
        let (map, mut rng) = small_city();
        for _ in 0..50 {
            let start = random_walkable_position(&map, &mut rng);
            let target = random_destination(&map, start, &mut rng);
            assert_ne!(start.tile_coords(), target.tile_coords());
            assert!(map.tile(target.tile_coords()).is_walkable());
        }
    }

    #[test]
    fn test_spawn_seeds_world_and_occupancy() {
        let (mut map, mut rng) = small_city();
        let mut world = World::new();
        let mut pathfinder = Pathfinder::new();

        let events = spawn_npcs(&mut world, &mut map, &mut pathfinder, &mut rng, 25, 0, 1.0);
        assert_eq!(events.len(), 25);

        let mut seen = 0;
        for (_, (npc, trajectory)) in world.query::<(&Npc, &Trajectory)>().iter() {
            seen += 1;
            assert!(!trajectory.has_arrived());
            assert!(trajectory.pending_waypoints() >= 1);
            let tile = map.tile(trajectory.position().tile_coords());
            assert!(tile.npcs.contains(&npc.id));
        }
        assert_eq!(seen, 25);

        let occupants: usize = map.tiles().map(|tile| tile.npcs.len()).sum();
        assert_eq!(occupants, 25);
    }

    #[test]
    fn test_props_land_on_walkable_tiles() {
        let (mut map, mut rng) = small_city();
        let mut world = World::new();

        let placed = place_props(&mut world, &mut map, &mut rng, 10, 0);
        assert_eq!(placed.len(), 10);

        let scattered: usize = map.tiles().map(|tile| tile.props.len()).sum();
        assert_eq!(scattered, 10);
        for tile in map.tiles() {
            if !tile.props.is_empty() {
                assert!(tile.is_walkable());
            }
        }
        assert_eq!(world.query::<&Prop>().iter().count(), 10);
    }
}
