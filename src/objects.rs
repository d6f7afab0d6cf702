//! Decorative object and ground deposit placement.
//!
//! Objects are scattered in clusters around randomly drawn anchors, each
//! category with its own cluster count, spread, and tolerated terrain.
//! Deposits grow around anchors with amounts decaying by hex distance. The
//! category order below is fixed; reordering shifts every later random draw.

use log::debug;

use crate::classify::hexagon_types_in_range;
use crate::map::{hex_offset_dist, HexMap, MapPos};
use crate::rng::GameRandom;
use crate::terrain::{Mineral, Object, Terrain};
use crate::tiles::TileStore;

/// Deposit cluster radius in hex distance.
const RESOURCE_RADIUS: i32 = 2;

/// One object category's scatter parameters.
struct ClusterConfig {
    /// Anchor count for the whole map.
    clusters: u32,
    /// Placement attempts per anchor.
    cluster_size: u32,
    /// Offsets are drawn uniformly from `[-spread, spread]` per axis.
    spread: i32,
    min: Terrain,
    max: Terrain,
}

/// Whether both of the tile's own triangles fall in the inclusive range.
fn own_triangles_in_range(tiles: &TileStore, pos: MapPos, min: Terrain, max: Terrain) -> bool {
    let tile = tiles.get(pos);
    (min..=max).contains(&tile.type_up) && (min..=max).contains(&tile.type_down)
}

/// Scatter one object category. Every attempt draws two offsets; the object
/// variant is drawn only when the attempt actually places, so failed
/// attempts perturb the stream by exactly two draws.
fn place_clusters(
    map: &HexMap,
    tiles: &mut TileStore,
    rng: &mut GameRandom,
    config: &ClusterConfig,
    mut make: impl FnMut(&mut GameRandom) -> Object,
) {
    let span = 2 * config.spread + 1;
    for _ in 0..config.clusters {
        let anchor = map.random_pos(rng);
        for _ in 0..config.cluster_size {
            let dc = i32::from(rng.random_int()) % span - config.spread;
            let dr = i32::from(rng.random_int()) % span - config.spread;
            let pos = map.pos_add(anchor, dc, dr);
            if tiles.get(pos).object.is_none()
                && own_triangles_in_range(tiles, pos, config.min, config.max)
            {
                let object = make(rng);
                tiles.get_mut(pos).object = object;
            }
        }
    }
}

/// Place every decorative object category in fixed order.
pub fn init_objects(map: &HexMap, tiles: &mut TileStore, rng: &mut GameRandom) {
    let n = map.tile_count();

    // Dense forest cores.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 64,
            cluster_size: 10,
            spread: 4,
            min: Terrain::Grass1,
            max: Terrain::Grass2,
        },
        |rng| Object::Tree((rng.random_int() & 7) as u8),
    );
    // Looser tree stands.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 128,
            cluster_size: 6,
            spread: 8,
            min: Terrain::Grass1,
            max: Terrain::Grass2,
        },
        |rng| Object::Tree((rng.random_int() & 7) as u8),
    );
    // Pine stands, tolerant of shore grass.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 64,
            cluster_size: 6,
            spread: 8,
            min: Terrain::Grass0,
            max: Terrain::Grass2,
        },
        |rng| Object::Pine((rng.random_int() & 7) as u8),
    );
    // Lone mixed trees across the grassland.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 16,
            cluster_size: 1,
            spread: 16,
            min: Terrain::Grass1,
            max: Terrain::Grass2,
        },
        |rng| {
            let r = rng.random_int();
            if r & 8 != 0 {
                Object::Pine((r & 7) as u8)
            } else {
                Object::Tree((r & 7) as u8)
            }
        },
    );
    // Quarryable stone piles.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 128,
            cluster_size: 6,
            spread: 8,
            min: Terrain::Grass1,
            max: Terrain::Grass3,
        },
        |rng| Object::Stone((rng.random_int() & 7) as u8),
    );
    // Lone stone piles.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 64,
            cluster_size: 1,
            spread: 16,
            min: Terrain::Grass1,
            max: Terrain::Grass3,
        },
        |rng| Object::Stone((rng.random_int() & 7) as u8),
    );
    // Dead trees.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 256,
            cluster_size: 1,
            spread: 16,
            min: Terrain::Grass0,
            max: Terrain::Grass2,
        },
        |_| Object::DeadTree,
    );
    // Sandstone boulders.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 256,
            cluster_size: 1,
            spread: 16,
            min: Terrain::Grass0,
            max: Terrain::Grass2,
        },
        |rng| Object::Sandstone((rng.random_int() & 1) as u8),
    );
    // Submerged trees in the shallows.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 64,
            cluster_size: 3,
            spread: 8,
            min: Terrain::Water1,
            max: Terrain::Water0,
        },
        |rng| Object::WaterTree((rng.random_int() & 3) as u8),
    );
    // Stubs.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 256,
            cluster_size: 1,
            spread: 16,
            min: Terrain::Grass0,
            max: Terrain::Grass2,
        },
        |_| Object::Stub,
    );
    // Small boulders.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 256,
            cluster_size: 1,
            spread: 16,
            min: Terrain::Grass0,
            max: Terrain::Grass2,
        },
        |_| Object::SmallBoulder,
    );
    // Animal cadavers in the desert.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 256,
            cluster_size: 2,
            spread: 8,
            min: Terrain::Desert0,
            max: Terrain::Desert2,
        },
        |rng| Object::Cadaver((rng.random_int() & 1) as u8),
    );
    // Cacti.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 128,
            cluster_size: 6,
            spread: 8,
            min: Terrain::Desert0,
            max: Terrain::Desert2,
        },
        |rng| Object::Cactus((rng.random_int() & 1) as u8),
    );
    // Stones breaking the water surface.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 64,
            cluster_size: 3,
            spread: 8,
            min: Terrain::Water2,
            max: Terrain::Water0,
        },
        |rng| Object::WaterStone((rng.random_int() & 3) as u8),
    );
    // Palms along the desert edge.
    place_clusters(
        map,
        tiles,
        rng,
        &ClusterConfig {
            clusters: n / 64,
            cluster_size: 6,
            spread: 8,
            min: Terrain::Grass3,
            max: Terrain::Desert2,
        },
        |rng| Object::Palm((rng.random_int() & 3) as u8),
    );

    let placed = tiles.iter().filter(|t| !t.object.is_none()).count();
    debug!("placed {} decorative objects", placed);
}

/// Grow one deposit kind around random anchors. An anchor only takes if its
/// own tile lies in the host range; the deposit then fills the surrounding
/// disc with amounts halving per hex distance step, skipping tiles that
/// already carry a deposit.
fn place_deposits(
    map: &HexMap,
    tiles: &mut TileStore,
    rng: &mut GameRandom,
    clusters: u32,
    mineral: Mineral,
    base_amount: impl Fn(&mut GameRandom) -> u8,
) {
    let (min, max) = match mineral.host_range() {
        Some(range) => range,
        None => return,
    };

    for _ in 0..clusters {
        let anchor = map.random_pos(rng);
        if !own_triangles_in_range(tiles, anchor, min, max) {
            continue;
        }
        let base = base_amount(rng);
        for dr in -RESOURCE_RADIUS..=RESOURCE_RADIUS {
            for dc in -RESOURCE_RADIUS..=RESOURCE_RADIUS {
                let dist = hex_offset_dist(dc, dr);
                if dist > RESOURCE_RADIUS as u32 {
                    continue;
                }
                let amount = base >> dist;
                if amount == 0 {
                    continue;
                }
                let pos = map.pos_add(anchor, dc, dr);
                if tiles.get(pos).resource_amount == 0
                    && own_triangles_in_range(tiles, pos, min, max)
                {
                    let tile = tiles.get_mut(pos);
                    tile.resource_type = mineral;
                    tile.resource_amount = amount;
                }
            }
        }
    }
}

/// Place every ground deposit kind in fixed order. Gold is the scarcest,
/// fish the most common.
pub fn init_resources(map: &HexMap, tiles: &mut TileStore, rng: &mut GameRandom) {
    let n = map.tile_count();

    place_deposits(map, tiles, rng, n / 1024, Mineral::Gold, |rng| {
        1 + (rng.random_int() & 3) as u8
    });
    place_deposits(map, tiles, rng, n / 512, Mineral::Iron, |rng| {
        5 + (rng.random_int() & 7) as u8
    });
    place_deposits(map, tiles, rng, n / 512, Mineral::Coal, |rng| {
        5 + (rng.random_int() & 7) as u8
    });
    place_deposits(map, tiles, rng, n / 512, Mineral::Stone, |rng| {
        6 + (rng.random_int() & 7) as u8
    });
    place_deposits(map, tiles, rng, n / 128, Mineral::Fish, |rng| {
        4 + (rng.random_int() & 3) as u8
    });

    let deposits = tiles.iter().filter(|t| t.resource_amount > 0).count();
    debug!("placed {} deposit tiles", deposits);
}

/// Final sweep: strip objects whose surrounding hexagon strayed outside
/// their tolerated range, and deposits whose own tile no longer hosts them.
/// Earlier passes mutate terrain after placement would have been legal, so
/// this runs last.
pub fn init_clean_up(map: &HexMap, tiles: &mut TileStore) {
    let mut stripped_objects = 0usize;
    let mut stripped_deposits = 0usize;

    for pos in map.positions() {
        if let Some((min, max)) = tiles.get(pos).object.allowed_range() {
            if !hexagon_types_in_range(map, tiles, pos, min, max) {
                tiles.get_mut(pos).object = Object::None;
                stripped_objects += 1;
            }
        }
        if let Some((min, max)) = tiles.get(pos).resource_type.host_range() {
            if !own_triangles_in_range(tiles, pos, min, max) {
                let tile = tiles.get_mut(pos);
                tile.resource_type = Mineral::None;
                tile.resource_amount = 0;
                stripped_deposits += 1;
            }
        }
    }

    if stripped_objects > 0 || stripped_deposits > 0 {
        debug!(
            "cleanup stripped {} objects and {} deposits",
            stripped_objects, stripped_deposits
        );
    }
}
