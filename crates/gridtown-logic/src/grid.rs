//! Coordinate and position value types for the tile grid.

use serde::{Deserialize, Serialize};

use crate::geography::Geography;
use crate::tile::Tile;

/// Integer tile coordinates: column and row within the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub col: i32,
    pub row: i32,
}

impl Coordinates {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The adjacent coordinate one step in the given direction.
    pub fn step(self, direction: Direction) -> Self {
        let (dc, dr) = direction.offset();
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }

    /// Chebyshev (max-norm) distance to another coordinate, used for
    /// vision and area queries rather than movement.
    pub fn chebyshev_distance(self, other: Self) -> i32 {
        (self.col - other.col).abs().max((self.row - other.row).abs())
    }
}

/// The four cardinal step directions. North is toward row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Column/row delta of one step in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

/// Continuous 2D position in tile units. The tile that owns a position is
/// derived by floor division, so (1.5, 0.5) sits at the center of tile (1, 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The center of the given tile.
    pub fn tile_center(coords: Coordinates) -> Self {
        Self {
            x: coords.col as f32 + 0.5,
            y: coords.row as f32 + 0.5,
        }
    }

    /// Coordinates of the tile containing this position.
    pub fn tile_coords(&self) -> Coordinates {
        Coordinates {
            col: self.x.floor() as i32,
            row: self.y.floor() as i32,
        }
    }

    /// The tile containing this position. Panics when the position has left
    /// the map: agents are required to stay in bounds while the simulation
    /// runs.
    pub fn tile<'a>(&self, map: &'a Geography) -> &'a Tile {
        map.tile(self.tile_coords())
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Move the position by the given delta.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}
