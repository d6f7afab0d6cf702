//! Sea level determination and lake bounding.
//!
//! The sea level is found by flood-expanding from the lowest tile while
//! raising a candidate level until the flooded area reaches the configured
//! fraction of the map. Interior water bodies larger than the lake cap are
//! then re-leveled back onto land. Traversal order is fixed throughout so
//! results depend only on the seed.

use std::collections::VecDeque;

use log::debug;

use crate::generator::GeneratorParams;
use crate::heights;
use crate::map::{Direction, HexMap, MapPos};
use crate::tiles::TileStore;

/// Highest level the sea search may reach.
const SEA_LEVEL_CAP: u8 = u8::MAX;

/// Whether a height is water relative to a sea level.
pub fn is_water_height(height: u8, sea_level: u8) -> bool {
    height <= sea_level
}

/// Determine the sea level. Returns the level and the flood reference
/// position; the connected component containing that position is the ocean.
///
/// Starting at the first row-major minimum-height tile, the flood expands
/// through neighbors (fixed `Direction` order) whose height is at or below
/// the candidate level. Whenever the reachable area stalls short of
/// `water_level * tile_count`, the candidate level rises by one and blocked
/// frontier tiles are re-examined in the order they were first seen.
pub fn init_sea_level(
    map: &HexMap,
    tiles: &TileStore,
    params: &GeneratorParams,
) -> (u8, MapPos) {
    let tile_count = map.tile_count() as usize;
    let target = (params.water_level * tile_count as f64) as usize;
    let reference = heights::lowest_position(map, tiles);

    let mut visited = vec![false; tile_count];
    let mut queue = VecDeque::new();
    let mut blocked: Vec<MapPos> = Vec::new();
    let mut area = 0usize;
    let mut level = tiles.get(reference).height;

    visited[reference.idx()] = true;
    queue.push_back(reference);

    loop {
        while let Some(pos) = queue.pop_front() {
            if tiles.get(pos).height > level {
                blocked.push(pos);
                continue;
            }
            area += 1;
            for dir in Direction::ALL {
                let next = map.move_pos(pos, dir);
                if !visited[next.idx()] {
                    visited[next.idx()] = true;
                    queue.push_back(next);
                }
            }
        }

        if area >= target || level == SEA_LEVEL_CAP {
            break;
        }
        level += 1;

        let mut still_blocked = Vec::with_capacity(blocked.len());
        for pos in blocked.drain(..) {
            if tiles.get(pos).height <= level {
                queue.push_back(pos);
            } else {
                still_blocked.push(pos);
            }
        }
        blocked = still_blocked;
    }

    debug!(
        "sea level {} ({} of {} tiles flooded from the reference point)",
        level, area, tile_count
    );
    (level, reference)
}

/// Re-level every interior water component larger than `max_lake_area`.
///
/// Components are discovered by row-major scan and flooded in fixed
/// direction order. The component containing `ocean_seed` is the ocean and
/// is exempt from the cap; every other oversized component has its tiles
/// raised to one above sea level, removing it from water classification.
pub fn init_lakes(
    map: &HexMap,
    tiles: &mut TileStore,
    sea_level: u8,
    ocean_seed: MapPos,
    max_lake_area: u32,
) {
    let tile_count = map.tile_count() as usize;
    let mut visited = vec![false; tile_count];
    let mut releveled = 0usize;

    for start in map.positions() {
        if visited[start.idx()] || !is_water_height(tiles.get(start).height, sea_level) {
            continue;
        }

        let mut component = Vec::new();
        let mut queue = VecDeque::new();
        visited[start.idx()] = true;
        queue.push_back(start);
        let mut contains_ocean_seed = false;

        while let Some(pos) = queue.pop_front() {
            component.push(pos);
            if pos == ocean_seed {
                contains_ocean_seed = true;
            }
            for dir in Direction::ALL {
                let next = map.move_pos(pos, dir);
                if !visited[next.idx()] && is_water_height(tiles.get(next).height, sea_level) {
                    visited[next.idx()] = true;
                    queue.push_back(next);
                }
            }
        }

        if !contains_ocean_seed && component.len() as u32 > max_lake_area {
            for pos in component {
                tiles.get_mut(pos).height = sea_level.saturating_add(1);
                releveled += 1;
            }
        }
    }

    if releveled > 0 {
        debug!("re-leveled {} oversized lake tiles", releveled);
    }
}

/// Sizes of all connected water components, ocean first. Used by the
/// generator's stats reporting and by tests.
pub fn water_components(
    map: &HexMap,
    tiles: &TileStore,
    sea_level: u8,
    ocean_seed: MapPos,
) -> (usize, Vec<usize>) {
    let tile_count = map.tile_count() as usize;
    let mut visited = vec![false; tile_count];
    let mut ocean_size = 0usize;
    let mut lakes = Vec::new();

    for start in map.positions() {
        if visited[start.idx()] || !is_water_height(tiles.get(start).height, sea_level) {
            continue;
        }
        let mut size = 0usize;
        let mut contains_ocean_seed = false;
        let mut queue = VecDeque::new();
        visited[start.idx()] = true;
        queue.push_back(start);
        while let Some(pos) = queue.pop_front() {
            size += 1;
            if pos == ocean_seed {
                contains_ocean_seed = true;
            }
            for dir in Direction::ALL {
                let next = map.move_pos(pos, dir);
                if !visited[next.idx()] && is_water_height(tiles.get(next).height, sea_level) {
                    visited[next.idx()] = true;
                    queue.push_back(next);
                }
            }
        }
        if contains_ocean_seed {
            ocean_size = size;
        } else {
            lakes.push(size);
        }
    }

    (ocean_size, lakes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorParams;
    use crate::heights;
    use crate::rng::GameRandom;

    fn synthesized_map(seed: u64) -> (HexMap, TileStore) {
        let map = HexMap::new(6, 6);
        let mut tiles = TileStore::new(map.tile_count() as usize);
        let mut rng = GameRandom::from_master(seed);
        heights::init_heights(&map, &mut tiles, &mut rng, &GeneratorParams::default());
        (map, tiles)
    }

    #[test]
    fn test_sea_level_reaches_target_fraction() {
        let map = HexMap::new(6, 6);
        let mut tiles = TileStore::new(map.tile_count() as usize);
        let mut rng = GameRandom::from_state(0x1b2d, 0x4e5f, 0x7a81);
        let params = GeneratorParams::default();
        heights::init_heights(&map, &mut tiles, &mut rng, &params);
        let (sea_level, _) = init_sea_level(&map, &tiles, &params);

        let water = map
            .positions()
            .filter(|&p| is_water_height(tiles.get(p).height, sea_level))
            .count();
        let fraction = water as f64 / map.tile_count() as f64;
        assert!(
            fraction >= params.water_level,
            "water fraction {} below target {}",
            fraction,
            params.water_level
        );
        // The search stops at the first level meeting the target, so the
        // overshoot is at most one level's worth of tiles plus unreached
        // basins.
        assert!(
            fraction <= params.water_level + 0.1,
            "water fraction {} overshoots target {}",
            fraction,
            params.water_level
        );
    }

    #[test]
    fn test_reference_point_is_lowest_tile() {
        let (map, tiles) = synthesized_map(11);
        let params = GeneratorParams::default();
        let (_, reference) = init_sea_level(&map, &tiles, &params);
        assert_eq!(tiles.get(reference).height, 0);
    }

    #[test]
    fn test_lakes_above_cap_are_releveled() {
        let (map, mut tiles) = synthesized_map(77);
        let params = GeneratorParams::default();
        let (sea_level, ocean_seed) = init_sea_level(&map, &tiles, &params);
        init_lakes(&map, &mut tiles, sea_level, ocean_seed, params.max_lake_area);

        let (ocean, lakes) = water_components(&map, &tiles, sea_level, ocean_seed);
        assert!(ocean > 0);
        for lake in lakes {
            assert!(
                lake as u32 <= params.max_lake_area,
                "lake of {} tiles exceeds cap {}",
                lake,
                params.max_lake_area
            );
        }
    }

    #[test]
    fn test_zero_lake_area_removes_all_interior_water() {
        let (map, mut tiles) = synthesized_map(31);
        let params = GeneratorParams::default();
        let (sea_level, ocean_seed) = init_sea_level(&map, &tiles, &params);
        init_lakes(&map, &mut tiles, sea_level, ocean_seed, 0);

        let (ocean, lakes) = water_components(&map, &tiles, sea_level, ocean_seed);
        assert!(ocean > 0);
        assert!(lakes.is_empty(), "interior water survived a zero lake cap");
    }

    #[test]
    fn test_releveled_tiles_sit_just_above_sea() {
        let map = HexMap::new(4, 4);
        let mut tiles = TileStore::new(map.tile_count() as usize);
        // Flat land at 10 with one low basin far from the origin.
        for pos in map.positions() {
            tiles.get_mut(pos).height = 10;
        }
        tiles.get_mut(map.pos(0, 0)).height = 0;
        for (col, row) in [(8, 8), (9, 8), (8, 9), (9, 9)] {
            tiles.get_mut(map.pos(col, row)).height = 1;
        }

        let sea_level = 1;
        let ocean_seed = map.pos(0, 0);
        init_lakes(&map, &mut tiles, sea_level, ocean_seed, 2);

        for (col, row) in [(8, 8), (9, 8), (8, 9), (9, 9)] {
            assert_eq!(tiles.get(map.pos(col, row)).height, sea_level + 1);
        }
        assert_eq!(tiles.get(ocean_seed).height, 0);
    }

    #[test]
    fn test_sea_level_is_deterministic() {
        let (map, tiles) = synthesized_map(500);
        let params = GeneratorParams::default();
        let a = init_sea_level(&map, &tiles, &params);
        let b = init_sea_level(&map, &tiles, &params);
        assert_eq!(a, b);
    }
}
