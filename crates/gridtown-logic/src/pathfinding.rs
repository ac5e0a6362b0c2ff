//! Uniform-cost search over the tile exit graph.
//!
//! All traversable edges cost 1, so the search is Dijkstra degenerating to
//! breadth-first order. Search state lives in an arena plus a coordinate
//! side table owned by the [`Pathfinder`], never on the tiles themselves;
//! both are cleared on entry to and exit from every query, so no stale
//! search state can survive between queries.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::geography::Geography;
use crate::grid::Coordinates;

/// Per-query annotation for one visited tile.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    coords: Coordinates,
    distance: u32,
    /// Arena index of the node this one was reached from.
    parent: Option<u32>,
    open: bool,
    closed: bool,
}

/// Entry in the open queue. Ordered so the max-heap pops the smallest
/// tentative distance first; equal distances pop in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    distance: u32,
    seq: u32,
    node: u32,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Route planner over a [`Geography`]. Reusable across queries; the scratch
/// buffers keep their capacity so routing stays allocation-light once warm.
#[derive(Debug, Default)]
pub struct Pathfinder {
    nodes: Vec<SearchNode>,
    by_coord: HashMap<Coordinates, u32>,
    open: BinaryHeap<OpenEntry>,
    seq: u32,
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the tile route from `start` to `target` inclusive.
    ///
    /// Panics if the two tiles are not connected through the exit graph:
    /// a disconnected request signals a map-generation or caller bug, not a
    /// recoverable runtime condition. Callers issuing orders are expected to
    /// pre-validate their endpoints.
    pub fn route(
        &mut self,
        map: &Geography,
        start: Coordinates,
        target: Coordinates,
    ) -> Vec<Coordinates> {
        let goal = self.search(map, start, target);
        let goal = match goal {
            Some(index) => index,
            None => panic!(
                "no route from {:?} to {:?}: walkable graph is disconnected",
                start, target,
            ),
        };

        let mut route = Vec::new();
        let mut cursor = Some(goal);
        while let Some(index) = cursor {
            let node = self.nodes[index as usize];
            route.push(node.coords);
            cursor = node.parent;
        }
        route.reverse();

        self.clear();
        route
    }

    fn search(&mut self, map: &Geography, start: Coordinates, target: Coordinates) -> Option<u32> {
        self.clear();
        // Both endpoints must exist; the lookups panic on out-of-bounds.
        let _ = map.tile(start);
        let _ = map.tile(target);

        self.nodes.push(SearchNode {
            coords: start,
            distance: 0,
            parent: None,
            open: true,
            closed: false,
        });
        self.by_coord.insert(start, 0);
        self.open.push(OpenEntry {
            distance: 0,
            seq: 0,
            node: 0,
        });
        self.seq = 1;

        while let Some(entry) = self.open.pop() {
            let coords = self.nodes[entry.node as usize].coords;
            if coords == target {
                return Some(entry.node);
            }
            self.nodes[entry.node as usize].closed = true;

            for neighbor in map.tile(coords).neighbors(map) {
                self.explore(neighbor.coords, entry.node);
            }
        }
        None
    }

    /// Visits one neighbor reached from the node at `from`. A tile seen for
    /// the first time gets a fresh node and a queue entry; an already-open
    /// tile with a strictly shorter path through `from` is relaxed in place,
    /// while its queue entry keeps the original priority (no re-queue).
    fn explore(&mut self, coords: Coordinates, from: u32) {
        let candidate = self.nodes[from as usize].distance + 1;
        if let Some(&index) = self.by_coord.get(&coords) {
            let node = &mut self.nodes[index as usize];
            if node.closed {
                return;
            }
            if node.open && candidate < node.distance {
                node.distance = candidate;
                node.parent = Some(from);
            }
        } else {
            let index = self.nodes.len() as u32;
            self.nodes.push(SearchNode {
                coords,
                distance: candidate,
                parent: Some(from),
                open: true,
                closed: false,
            });
            self.by_coord.insert(coords, index);
            self.open.push(OpenEntry {
                distance: candidate,
                seq: self.seq,
                node: index,
            });
            self.seq += 1;
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.by_coord.clear();
        self.open.clear();
        self.seq = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction;
    use crate::tile::{Tile, TileKind};

    /// Builds a map from ascii rows: '.' is open road, '#' is an unwalkable
    /// building. Exit flags open toward walkable in-bounds neighbors.
    fn map_from_rows(rows: &[&str]) -> Geography {
        let height = rows.len() as i32;
        let width = rows[0].len() as i32;
        let mut tiles = Vec::new();
        let mut seed = None;
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let coords = Coordinates::new(col as i32, row as i32);
                let (kind, speed) = match ch {
                    '#' => (TileKind::House, 0.0),
                    _ => (TileKind::Intersection, 1.0),
                };
                if speed > 0.0 && seed.is_none() {
                    seed = Some(coords);
                }
                tiles.push(Tile::new(coords, kind).with_speed(speed));
            }
        }
        let mut map = Geography::new(width, height, tiles, seed.expect("no walkable tile"));
        for row in 0..height {
            for col in 0..width {
                let coords = Coordinates::new(col, row);
                if !map.tile(coords).is_walkable() {
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
        map
    }

    /// Reference breadth-first distance used to check the planner.
    fn bfs_distance(map: &Geography, start: Coordinates, target: Coordinates) -> Option<u32> {
        use std::collections::VecDeque;
        let mut dist: HashMap<Coordinates, u32> = HashMap::new();
        let mut queue = VecDeque::new();
        dist.insert(start, 0);
        queue.push_back(start);
        while let Some(coords) = queue.pop_front() {
            let d = dist[&coords];
            if coords == target {
                return Some(d);
            }
            for neighbor in map.tile(coords).neighbors(map) {
                if !dist.contains_key(&neighbor.coords) {
                    dist.insert(neighbor.coords, d + 1);
                    queue.push_back(neighbor.coords);
                }
            }
        }
        None
    }

    fn assert_route_valid(
        map: &Geography,
        route: &[Coordinates],
        start: Coordinates,
        target: Coordinates,
    ) {
        assert_eq!(route.first(), Some(&start));
        assert_eq!(route.last(), Some(&target));
        for pair in route.windows(2) {
            let dir = Direction::ALL
                .into_iter()
                .find(|&d| pair[0].step(d) == pair[1])
                .expect("consecutive route tiles must be adjacent");
            assert!(
                map.tile(pair[0]).allows_exit(dir),
                "route uses a closed exit {:?} -> {:?}",
                pair[0],
                pair[1],
            );
        }
    }

    #[test]
    fn test_route_on_open_grid_is_shortest() {
        let map = map_from_rows(&[".....", ".....", ".....", ".....", "....."]);
        let mut pathfinder = Pathfinder::new();
        for target in [
            Coordinates::new(4, 4),
            Coordinates::new(0, 4),
            Coordinates::new(3, 1),
        ] {
            let start = Coordinates::new(0, 0);
            let route = pathfinder.route(&map, start, target);
            assert_route_valid(&map, &route, start, target);
            // On an open 4-connected grid the shortest hop count is the
            // Manhattan distance.
            let manhattan = (target.col - start.col).abs() + (target.row - start.row).abs();
            assert_eq!(route.len() as i32, manhattan + 1);
        }
    }

    #[test]
    fn test_route_matches_bfs_reference_with_obstacles() {
        let map = map_from_rows(&[
            ".....",
            ".###.",
            ".....",
            ".#...",
            ".....",
        ]);
        let mut pathfinder = Pathfinder::new();
        let pairs = [
            (Coordinates::new(0, 0), Coordinates::new(4, 0)),
            (Coordinates::new(0, 0), Coordinates::new(4, 4)),
            (Coordinates::new(2, 2), Coordinates::new(2, 0)),
            (Coordinates::new(0, 4), Coordinates::new(4, 2)),
        ];
        for (start, target) in pairs {
            let route = pathfinder.route(&map, start, target);
            assert_route_valid(&map, &route, start, target);
            let reference = bfs_distance(&map, start, target).expect("pairs are connected");
            assert_eq!(route.len() as u32, reference + 1, "{:?} -> {:?}", start, target);
        }
    }

    #[test]
    fn test_same_tile_request_yields_single_step_route() {
        let map = map_from_rows(&["..."]);
        let mut pathfinder = Pathfinder::new();
        let start = Coordinates::new(1, 0);
        assert_eq!(pathfinder.route(&map, start, start), vec![start]);
    }

    #[test]
    fn test_one_way_street_is_honored() {
        let mut map = map_from_rows(&[".."]);
        // Forbid stepping back west from the right tile.
        map.tile_mut(Coordinates::new(1, 0))
            .exits
            .set(Direction::West, false);
        let mut pathfinder = Pathfinder::new();
        let route = pathfinder.route(&map, Coordinates::new(0, 0), Coordinates::new(1, 0));
        assert_eq!(route.len(), 2);
    }

    #[test]
    #[should_panic(expected = "disconnected")]
    fn test_disconnected_request_panics() {
        let map = map_from_rows(&[".#."]);
        let mut pathfinder = Pathfinder::new();
        let _ = pathfinder.route(&map, Coordinates::new(0, 0), Coordinates::new(2, 0));
    }

    #[test]
    fn test_scratch_cleared_after_every_query() {
        let map = map_from_rows(&[".....", ".###.", "....."]);
        let mut pathfinder = Pathfinder::new();
        let _ = pathfinder.route(&map, Coordinates::new(0, 0), Coordinates::new(4, 2));
        assert!(pathfinder.nodes.is_empty());
        assert!(pathfinder.by_coord.is_empty());
        assert!(pathfinder.open.is_empty());

        // A second query on the same planner is unaffected by the first.
        let route = pathfinder.route(&map, Coordinates::new(4, 2), Coordinates::new(0, 0));
        assert_route_valid(
            &map,
            &route,
            Coordinates::new(4, 2),
            Coordinates::new(0, 0),
        );
        assert!(pathfinder.nodes.is_empty());
    }

    #[test]
    fn test_equal_length_routes_are_deterministic() {
        let map = map_from_rows(&["....", "....", "...."]);
        let mut pathfinder = Pathfinder::new();
        let first = pathfinder.route(&map, Coordinates::new(0, 0), Coordinates::new(3, 2));
        let second = pathfinder.route(&map, Coordinates::new(0, 0), Coordinates::new(3, 2));
        assert_eq!(first, second);
    }
}
