//! Map cells: terrain kind, directional exits, speed, occupancy, and fog.

use serde::{Deserialize, Serialize};

use crate::geography::Geography;
use crate::grid::{Coordinates, Direction};

/// Terrain category of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Horizontal road segment.
    RoadH,
    /// Vertical road segment.
    RoadV,
    /// Road crossing.
    Intersection,
    Bank,
    House,
    /// Empty lot.
    Blank,
}

/// Handle to an NPC tracked by the engine. Tiles store handles rather than
/// references so occupancy lists stay plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NpcId(pub u32);

/// Handle to an interactive (clickable) object placed on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropId(pub u32);

/// Per-direction exit permissions. The flags are independent: a one-way
/// street may allow exit toward a neighbor that forbids the return step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exits {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl Exits {
    pub const CLOSED: Exits = Exits {
        north: false,
        south: false,
        east: false,
        west: false,
    };

    pub const OPEN: Exits = Exits {
        north: true,
        south: true,
        east: true,
        west: true,
    };

    pub fn allows(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    pub fn set(&mut self, direction: Direction, open: bool) {
        match direction {
            Direction::North => self.north = open,
            Direction::South => self.south = open,
            Direction::East => self.east = open,
            Direction::West => self.west = open,
        }
    }
}

/// A single cell of the map: terrain, passability, occupancy, and fog state.
///
/// Search annotations are deliberately not stored here; the pathfinder keeps
/// its per-query state in a side table keyed by coordinates, so a tile can
/// never carry stale search state between queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub coords: Coordinates,
    pub kind: TileKind,
    pub exits: Exits,
    /// Speed multiplier in [0, 1]. Zero means impassable for agents even if
    /// a neighboring tile nominally permits entry.
    pub speed: f32,
    pub destructible: bool,
    pub destruction: f32,
    pub anxiety: f32,
    pub population_density: f32,
    /// Origin tile of the (rectangular) building this tile belongs to.
    /// Free-standing tiles are their own 1x1 origin.
    pub building_origin: Coordinates,
    pub building_width: i32,
    pub building_height: i32,
    /// Count of this building's tiles still unexplored; meaningful on the
    /// origin tile only.
    pub hidden_building_tiles: i32,
    /// Seat of the borough (district) this tile belongs to.
    pub borough_seat: Coordinates,
    /// Number of agents currently watching this tile. Zero means fogged.
    pub fog_watchers: i32,
    /// Latched once the tile has been seen at least once.
    pub explored: bool,
    /// NPCs currently located in the tile, in arrival order.
    pub npcs: Vec<NpcId>,
    /// Interactive objects currently placed on the tile.
    pub props: Vec<PropId>,
}

impl Tile {
    pub fn new(coords: Coordinates, kind: TileKind) -> Self {
        Self {
            coords,
            kind,
            exits: Exits::CLOSED,
            speed: 0.0,
            destructible: false,
            destruction: 0.0,
            anxiety: 0.0,
            population_density: 0.0,
            building_origin: coords,
            building_width: 1,
            building_height: 1,
            hidden_building_tiles: 0,
            borough_seat: coords,
            fog_watchers: 0,
            explored: false,
            npcs: Vec::new(),
            props: Vec::new(),
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_exits(mut self, exits: Exits) -> Self {
        self.exits = exits;
        self
    }

    pub fn with_building(
        mut self,
        origin: Coordinates,
        width: i32,
        height: i32,
        destructible: bool,
    ) -> Self {
        self.building_origin = origin;
        self.building_width = width;
        self.building_height = height;
        self.destructible = destructible;
        self
    }

    pub fn with_borough(mut self, seat: Coordinates) -> Self {
        self.borough_seat = seat;
        self
    }

    /// True iff an agent can stand on this tile.
    pub fn is_walkable(&self) -> bool {
        self.speed > 0.0
    }

    /// True while no agent has line of sight on the tile.
    pub fn is_in_fog(&self) -> bool {
        self.fog_watchers == 0
    }

    /// True iff this tile is the origin cell of its building.
    pub fn is_building_origin(&self) -> bool {
        self.coords == self.building_origin
    }

    pub fn allows_exit(&self, direction: Direction) -> bool {
        self.exits.allows(direction)
    }

    /// Location equality only, ignoring the rest of the tile state. The
    /// pathfinder uses this to test goal membership.
    pub fn same_location(&self, other: &Tile) -> bool {
        self.coords == other.coords
    }

    pub fn add_npc(&mut self, id: NpcId) {
        self.npcs.push(id);
    }

    /// Removes an NPC from the occupancy list. Removing an id that is not
    /// present is a logic error upstream; it is asserted in debug builds and
    /// ignored in release so the list is never corrupted.
    pub fn remove_npc(&mut self, id: NpcId) {
        let found = self.npcs.iter().position(|&n| n == id);
        debug_assert!(found.is_some(), "NPC {:?} not in tile {:?}", id, self.coords);
        if let Some(index) = found {
            let _ = self.npcs.remove(index);
        }
    }

    pub fn add_prop(&mut self, id: PropId) {
        self.props.push(id);
    }

    /// Same contract as [`Tile::remove_npc`].
    pub fn remove_prop(&mut self, id: PropId) {
        let found = self.props.iter().position(|&p| p == id);
        debug_assert!(found.is_some(), "prop {:?} not in tile {:?}", id, self.coords);
        if let Some(index) = found {
            let _ = self.props.remove(index);
        }
    }

    /// Tiles reachable in exactly one step, filtered by this tile's exit
    /// flags only. There is no reciprocity check and no speed check: one-way
    /// streets are legal, and walkability is an agent concern.
    pub fn neighbors<'a>(&self, map: &'a Geography) -> Vec<&'a Tile> {
        Direction::ALL
            .iter()
            .filter(|&&dir| self.exits.allows(dir))
            .filter_map(|&dir| map.get(self.coords.step(dir)))
            .collect()
    }

    /// All tiles within Chebyshev distance `r` inclusive, independent of
    /// passability. Used for vision and area-of-effect queries.
    pub fn tiles_in_radius<'a>(&self, map: &'a Geography, r: i32) -> Vec<&'a Tile> {
        let mut tiles = Vec::new();
        for row in (self.coords.row - r)..=(self.coords.row + r) {
            for col in (self.coords.col - r)..=(self.coords.col + r) {
                if let Some(tile) = map.get(Coordinates::new(col, row)) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }

    /// NPCs occupying any tile within Chebyshev distance `r` inclusive.
    pub fn npcs_in_radius(&self, map: &Geography, r: i32) -> Vec<NpcId> {
        self.tiles_in_radius(map, r)
            .into_iter()
            .flat_map(|tile| tile.npcs.iter().copied())
            .collect()
    }
}
