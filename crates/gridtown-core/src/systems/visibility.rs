//! Fog-of-war bookkeeping.
//!
//! Every tile keeps a watcher counter; a tile is in fog while nobody watches
//! it. Counters are adjusted incrementally around the tile crossings the
//! movement system reports, so a full-map sweep is never needed. The first
//! time a tile is revealed it latches `explored`, and buildings count down
//! their hidden tiles on the origin tile.

use gridtown_logic::{Coordinates, Geography, TileKind};

use super::movement::TileTransfer;

/// Adds a watcher to every tile within `radius` of `center`.
pub fn reveal_around(map: &mut Geography, center: Coordinates, radius: i32) {
    adjust(map, center, radius, 1);
}

/// Removes a watcher from every tile within `radius` of `center`.
pub fn conceal_around(map: &mut Geography, center: Coordinates, radius: i32) {
    adjust(map, center, radius, -1);
}

/// Applies the watcher deltas for one tick's tile crossings.
pub fn apply_transfers(map: &mut Geography, transfers: &[TileTransfer], radius: i32) {
    for transfer in transfers {
        adjust(map, transfer.to, radius, 1);
        adjust(map, transfer.from, radius, -1);
    }
}

fn adjust(map: &mut Geography, center: Coordinates, radius: i32, delta: i32) {
    for row in (center.row - radius)..=(center.row + radius) {
        for col in (center.col - radius)..=(center.col + radius) {
            let coords = Coordinates::new(col, row);
            if !map.in_bounds(coords) {
                continue;
            }
            let first_reveal = {
                let tile = map.tile_mut(coords);
                tile.fog_watchers += delta;
                debug_assert!(
                    tile.fog_watchers >= 0,
                    "fog watcher count went negative at {:?}",
                    coords,
                );
                if delta > 0 && !tile.explored {
                    tile.explored = true;
                    matches!(tile.kind, TileKind::House | TileKind::Bank)
                        .then_some(tile.building_origin)
                } else {
                    None
                }
            };
            if let Some(origin) = first_reveal {
                let origin_tile = map.tile_mut(origin);
                origin_tile.hidden_building_tiles -= 1;
                debug_assert!(
                    origin_tile.hidden_building_tiles >= 0,
                    "building at {:?} revealed more tiles than it has",
                    origin,
                );
            }
        }
    }
}
