//! Waypoint-queue movement of agents between tiles.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::geography::Geography;
use crate::grid::Position;
use crate::pathfinding::Pathfinder;

/// An agent's planned and in-progress movement.
///
/// The queue always holds the current position at the front, followed by the
/// remaining waypoints and the final target. Once only the current position
/// remains the trajectory is arrived and further updates are no-ops; a
/// superseding order replaces the trajectory rather than mutating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    waypoints: VecDeque<Position>,
    arrived: bool,
}

impl Trajectory {
    /// Plans a trajectory by routing between the tiles containing `start`
    /// and `target`, refining the tile route to tile-center waypoints with
    /// the literal endpoints spliced at head and tail.
    ///
    /// Callers are responsible for ordering sensible trips: `start` and
    /// `target` should resolve to distinct walkable tiles, and the planner
    /// panics on a disconnected pair.
    pub fn plan(
        start: Position,
        target: Position,
        map: &Geography,
        pathfinder: &mut Pathfinder,
    ) -> Self {
        let route = pathfinder.route(map, start.tile_coords(), target.tile_coords());
        let mut waypoints = VecDeque::with_capacity(route.len() + 1);
        waypoints.push_back(start);
        if route.len() > 1 {
            for &coords in &route[1..route.len() - 1] {
                waypoints.push_back(Position::tile_center(coords));
            }
        }
        waypoints.push_back(target);
        Self {
            waypoints,
            arrived: false,
        }
    }

    /// Builds a trajectory from explicit waypoints, current position first.
    /// Used to restore agents from snapshots and to inject corrections.
    pub fn from_waypoints(waypoints: impl IntoIterator<Item = Position>) -> Self {
        let waypoints: VecDeque<Position> = waypoints.into_iter().collect();
        assert!(
            !waypoints.is_empty(),
            "a trajectory needs at least the current position",
        );
        let arrived = waypoints.len() == 1;
        Self { waypoints, arrived }
    }

    /// Advances the current position straight toward the next waypoint by
    /// `speed * dt` tile units. When the remaining distance after the step
    /// is within half the step length the waypoint is popped; popping the
    /// last one transitions to arrived. A zero-length direction vector is
    /// treated as an immediate snap rather than a division by zero.
    pub fn update(&mut self, dt: f32, speed: f32, map: &Geography) {
        assert!(
            !self.waypoints.is_empty(),
            "trajectory lost its current position",
        );
        if self.arrived {
            return;
        }
        assert!(
            self.waypoints.len() > 1,
            "moving trajectory must have a pending waypoint",
        );
        debug_assert!(dt >= 0.0, "elapsed time must be non-negative");
        debug_assert!(speed >= 0.0, "speed must be non-negative");

        let step = dt * speed;
        let target = self.waypoints[1];
        let current = &mut self.waypoints[0];
        let dx = target.x - current.x;
        let dy = target.y - current.y;
        let norm = (dx * dx + dy * dy).sqrt();
        if norm > 0.0 {
            current.translate(dx / norm * step, dy / norm * step);
        }
        debug_assert!(
            map.in_bounds(self.waypoints[0].tile_coords()),
            "agent left map bounds at {:?}",
            self.waypoints[0],
        );

        let remaining = self.waypoints[0].distance(&target);
        if remaining <= step / 2.0 {
            let _ = self.waypoints.remove(1);
            if self.waypoints.len() == 1 {
                self.arrived = true;
            }
        }
    }

    /// Current position of the agent.
    pub fn position(&self) -> Position {
        self.waypoints[0]
    }

    /// Externally corrects the current position, e.g. on order cancellation.
    pub fn set_position(&mut self, position: Position) {
        self.waypoints[0] = position;
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    /// Remaining waypoints including the current position.
    pub fn waypoints(&self) -> impl Iterator<Item = &Position> {
        self.waypoints.iter()
    }

    /// Waypoints still ahead of the agent.
    pub fn pending_waypoints(&self) -> usize {
        self.waypoints.len() - 1
    }
}
