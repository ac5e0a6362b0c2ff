//! Seeded city generation.
//!
//! Lays out a Manhattan grid: roads every `block_size` tiles in both
//! directions, with at most one rectangular building per block. Every free
//! interior tile of a block can reach the surrounding roads, so the walkable
//! graph is connected by construction; [`walkable_connected`] double-checks
//! that property for tests and tooling.

use rand::rngs::StdRng;
use rand::Rng;

use gridtown_logic::tile::Exits;
use gridtown_logic::{Coordinates, Direction, Geography, Tile, TileKind};

use crate::config::SimConfig;

const ROAD_SPEED: f32 = 1.0;
const INTERSECTION_SPEED: f32 = 0.8;
const LOT_SPEED: f32 = 0.5;
const BANK_CHANCE: f64 = 0.15;

/// Generates the city map for the given configuration.
pub fn generate_city(config: &SimConfig, rng: &mut StdRng) -> Geography {
    let width = config.width;
    let height = config.height;
    let block = config.block_size;
    assert!(block >= 2, "blocks need room between roads");

    let mut tiles = Vec::with_capacity((width * height) as usize);
    for row in 0..height {
        for col in 0..width {
            let coords = Coordinates::new(col, row);
            let seat = Coordinates::new((col / block) * block, (row / block) * block);
            let on_road_col = col % block == 0;
            let on_road_row = row % block == 0;
            let (kind, speed) = match (on_road_col, on_road_row) {
                (true, true) => (TileKind::Intersection, INTERSECTION_SPEED),
                (true, false) => (TileKind::RoadV, ROAD_SPEED),
                (false, true) => (TileKind::RoadH, ROAD_SPEED),
                (false, false) => (TileKind::Blank, LOT_SPEED),
            };
            let mut tile = Tile::new(coords, kind)
                .with_speed(speed)
                .with_borough(seat);
            tile.anxiety = rng.gen_range(0.0..0.3);
            tile.population_density = match kind {
                TileKind::Blank => rng.gen_range(0.2..0.6),
                _ => rng.gen_range(0.05..0.3),
            };
            tiles.push(tile);
        }
    }
    let mut map = Geography::new(width, height, tiles, Coordinates::new(0, 0));

    place_buildings(&mut map, config, rng);
    open_exits(&mut map);
    map
}

/// Drops at most one rectangular building into each block interior.
fn place_buildings(map: &mut Geography, config: &SimConfig, rng: &mut StdRng) {
    let block = config.block_size;
    let mut block_row = 0;
    while block_row * block < config.height {
        let mut block_col = 0;
        while block_col * block < config.width {
            let interior_min = Coordinates::new(block_col * block + 1, block_row * block + 1);
            let interior_max = Coordinates::new(
                ((block_col + 1) * block - 1).min(config.width - 1),
                ((block_row + 1) * block - 1).min(config.height - 1),
            );
            block_col += 1;
            if interior_min.col > interior_max.col || interior_min.row > interior_max.row {
                continue;
            }
            if !rng.gen_bool(f64::from(config.building_density)) {
                continue;
            }

            let max_width = interior_max.col - interior_min.col + 1;
            let max_height = interior_max.row - interior_min.row + 1;
            let bat_width = rng.gen_range(1..=max_width);
            let bat_height = rng.gen_range(1..=max_height);
            let origin = Coordinates::new(
                rng.gen_range(interior_min.col..=interior_max.col - bat_width + 1),
                rng.gen_range(interior_min.row..=interior_max.row - bat_height + 1),
            );

            let bank = rng.gen_bool(BANK_CHANCE);
            let kind = if bank { TileKind::Bank } else { TileKind::House };
            for row in origin.row..origin.row + bat_height {
                for col in origin.col..origin.col + bat_width {
                    let tile = map.tile_mut(Coordinates::new(col, row));
                    tile.kind = kind;
                    tile.speed = 0.0;
                    tile.building_origin = origin;
                    tile.building_width = bat_width;
                    tile.building_height = bat_height;
                    tile.destructible = !bank;
                }
            }
            map.tile_mut(origin).hidden_building_tiles = bat_width * bat_height;
            let density = rng.gen_range(0.4..1.0);
            for row in origin.row..origin.row + bat_height {
                for col in origin.col..origin.col + bat_width {
                    map.tile_mut(Coordinates::new(col, row)).population_density = density;
                }
            }
        }
        block_row += 1;
    }
}

/// Opens every exit that leads from a walkable tile to a walkable in-bounds
/// neighbor. The generator produces two-way streets only; one-way streets
/// remain expressible through the per-tile flags.
fn open_exits(map: &mut Geography) {
    for row in 0..map.height() {
        for col in 0..map.width() {
            let coords = Coordinates::new(col, row);
            if !map.tile(coords).is_walkable() {
                map.tile_mut(coords).exits = Exits::CLOSED;
                continue;
            }
            for dir in Direction::ALL {
                let open = map
                    .get(coords.step(dir))
                    .map_or(false, |tile| tile.is_walkable());
                map.tile_mut(coords).exits.set(dir, open);
            }
        }
    }
}

/// True iff every walkable tile is reachable from the walkable seed tile.
pub fn walkable_connected(map: &Geography) -> bool {
    use std::collections::{HashSet, VecDeque};

    let seed = map.walkable_seed().coords;
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(seed);
    queue.push_back(seed);
    while let Some(coords) = queue.pop_front() {
        for neighbor in map.tile(coords).neighbors(map) {
            if neighbor.is_walkable() && visited.insert(neighbor.coords) {
                queue.push_back(neighbor.coords);
            }
        }
    }

    let walkable = map.tiles().filter(|tile| tile.is_walkable()).count();
    visited.len() == walkable
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn city(config: &SimConfig) -> Geography {
        let mut rng = StdRng::seed_from_u64(config.seed);
        generate_city(config, &mut rng)
    }

    #[test]
    fn test_generated_city_is_connected() {
        for seed in [1, 424242, 9000] {
            let config = SimConfig {
                seed,
                ..Default::default()
            };
            assert!(walkable_connected(&city(&config)), "seed {}", seed);
        }
    }

    #[test]
    fn test_truncated_blocks_stay_connected() {
        // Dimensions that are not multiples of the block size.
        let config = SimConfig {
            width: 23,
            height: 17,
            block_size: 5,
            building_density: 1.0,
            ..Default::default()
        };
        assert!(walkable_connected(&city(&config)));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = SimConfig::default();
        let a = city(&config);
        let b = city(&config);
        for (ta, tb) in a.tiles().zip(b.tiles()) {
            assert_eq!(ta.kind, tb.kind);
            assert_eq!(ta.speed, tb.speed);
            assert_eq!(ta.exits, tb.exits);
        }
    }

    #[test]
    fn test_buildings_stay_off_roads() {
        let config = SimConfig {
            building_density: 1.0,
            ..Default::default()
        };
        let map = city(&config);
        for tile in map.tiles() {
            if matches!(tile.kind, TileKind::House | TileKind::Bank) {
                assert_ne!(tile.coords.col % config.block_size, 0);
                assert_ne!(tile.coords.row % config.block_size, 0);
                assert!(!tile.is_walkable());
            }
        }
    }

    #[test]
    fn test_exits_match_walkability() {
        let map = city(&SimConfig::default());
        for tile in map.tiles() {
            for dir in Direction::ALL {
                let neighbor_walkable = map
                    .get(tile.coords.step(dir))
                    .map_or(false, |t| t.is_walkable());
                let expected = tile.is_walkable() && neighbor_walkable;
                assert_eq!(tile.allows_exit(dir), expected, "{:?} {:?}", tile.coords, dir);
            }
        }
    }

    #[test]
    fn test_building_metadata_is_consistent() {
        let config = SimConfig {
            building_density: 1.0,
            ..Default::default()
        };
        let map = city(&config);
        for tile in map.tiles() {
            if !matches!(tile.kind, TileKind::House | TileKind::Bank) {
                continue;
            }
            let origin = map.tile(tile.building_origin);
            assert_eq!(origin.kind, tile.kind);
            assert_eq!(origin.building_width, tile.building_width);
            assert_eq!(origin.building_height, tile.building_height);
            if tile.is_building_origin() {
                assert_eq!(
                    tile.hidden_building_tiles,
                    tile.building_width * tile.building_height,
                );
            }
        }
    }

    #[test]
    fn test_borough_seats_are_intersections() {
        let map = city(&SimConfig::default());
        for tile in map.tiles() {
            let seat = map.tile(tile.borough_seat);
            assert_eq!(seat.kind, TileKind::Intersection);
        }
    }
}
