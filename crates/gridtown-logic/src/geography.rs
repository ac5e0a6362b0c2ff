//! The tile grid container.

use serde::{Deserialize, Serialize};

use crate::grid::Coordinates;
use crate::tile::Tile;

/// Dense row-major grid of tiles. Owns every tile exclusively; tiles never
/// outlive their geography.
///
/// Generation is a collaborator concern (see `gridtown-core::generation`);
/// the container only promises bounds, per-coordinate lookup, and a
/// designated walkable seed tile from which the walkable graph is connected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geography {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    walkable_seed: Coordinates,
}

impl Geography {
    /// Builds a geography from row-major tiles. Panics if the tile count
    /// does not match the dimensions or the seed tile is not walkable.
    pub fn new(width: i32, height: i32, tiles: Vec<Tile>, walkable_seed: Coordinates) -> Self {
        assert!(width > 0 && height > 0, "map dimensions must be positive");
        assert_eq!(
            tiles.len(),
            (width * height) as usize,
            "tile count must match {}x{} map",
            width,
            height,
        );
        let map = Self {
            width,
            height,
            tiles,
            walkable_seed,
        };
        assert!(
            map.tile(walkable_seed).is_walkable(),
            "walkable seed tile {:?} is not walkable",
            walkable_seed,
        );
        map
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, coords: Coordinates) -> bool {
        coords.col >= 0 && coords.col < self.width && coords.row >= 0 && coords.row < self.height
    }

    /// Bounds-checked tile lookup. Out-of-bounds coordinates are a caller
    /// bug and panic; use [`Geography::get`] for probing.
    pub fn tile(&self, coords: Coordinates) -> &Tile {
        assert!(
            self.in_bounds(coords),
            "tile {:?} out of bounds for {}x{} map",
            coords,
            self.width,
            self.height,
        );
        &self.tiles[self.index(coords)]
    }

    /// Mutable counterpart of [`Geography::tile`].
    pub fn tile_mut(&mut self, coords: Coordinates) -> &mut Tile {
        assert!(
            self.in_bounds(coords),
            "tile {:?} out of bounds for {}x{} map",
            coords,
            self.width,
            self.height,
        );
        let index = self.index(coords);
        &mut self.tiles[index]
    }

    pub fn get(&self, coords: Coordinates) -> Option<&Tile> {
        if self.in_bounds(coords) {
            Some(&self.tiles[self.index(coords)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, coords: Coordinates) -> Option<&mut Tile> {
        if self.in_bounds(coords) {
            let index = self.index(coords);
            Some(&mut self.tiles[index])
        } else {
            None
        }
    }

    /// The designated walkable tile used to seed spawning and connectivity
    /// checks.
    pub fn walkable_seed(&self) -> &Tile {
        self.tile(self.walkable_seed)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    fn index(&self, coords: Coordinates) -> usize {
        (coords.row * self.width + coords.col) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Exits, TileKind};

    fn strip(width: i32) -> Geography {
        let tiles = (0..width)
            .map(|col| {
                Tile::new(Coordinates::new(col, 0), TileKind::RoadH)
                    .with_speed(1.0)
                    .with_exits(Exits::OPEN)
            })
            .collect();
        Geography::new(width, 1, tiles, Coordinates::new(0, 0))
    }

    #[test]
    fn test_bounds_and_lookup() {
        let map = strip(3);
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 1);
        assert!(map.in_bounds(Coordinates::new(2, 0)));
        assert!(!map.in_bounds(Coordinates::new(3, 0)));
        assert!(!map.in_bounds(Coordinates::new(-1, 0)));
        assert_eq!(map.tile(Coordinates::new(1, 0)).coords, Coordinates::new(1, 0));
        assert!(map.get(Coordinates::new(3, 0)).is_none());
    }

    #[test]
    fn test_walkable_seed() {
        let map = strip(3);
        assert!(map.walkable_seed().is_walkable());
        assert_eq!(map.walkable_seed().coords, Coordinates::new(0, 0));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_out_of_bounds_lookup_panics() {
        let map = strip(3);
        let _ = map.tile(Coordinates::new(5, 0));
    }

    #[test]
    #[should_panic(expected = "not walkable")]
    fn test_unwalkable_seed_rejected() {
        let tiles = vec![Tile::new(Coordinates::new(0, 0), TileKind::House)];
        let _ = Geography::new(1, 1, tiles, Coordinates::new(0, 0));
    }
}
