//! Height field synthesis.
//!
//! Builds the initial elevation field by recursive midpoint displacement over
//! a coarse square lattice, in one of two interchangeable variants, then
//! clamps and rebases the field. The displacement law and every traversal
//! order here are fixed: any deviation changes the output map entirely.

use log::debug;

use crate::generator::{GeneratorParams, HeightAlgorithm};
use crate::map::{HexMap, MapPos};
use crate::rng::GameRandom;
use crate::tiles::TileStore;

/// Valid height range after clamping.
pub const HEIGHT_MAX: i32 = 255;

/// Coarse lattice spacing seeded before subdivision.
const INIT_SPACING: u32 = 16;

/// Mid-range start value the lattice seeds displace around.
const BASE_LEVEL: i32 = 128;

/// Populate every tile's height from the configured algorithm.
pub fn init_heights(
    map: &HexMap,
    tiles: &mut TileStore,
    rng: &mut GameRandom,
    params: &GeneratorParams,
) {
    let spacing = INIT_SPACING.min(map.cols()).min(map.rows());
    let mut field = vec![0i32; map.tile_count() as usize];

    seed_lattice(map, &mut field, rng, spacing, params);
    match params.height_algorithm {
        HeightAlgorithm::Midpoints => init_heights_midpoints(map, &mut field, rng, spacing, params),
        HeightAlgorithm::DiamondSquare => {
            init_heights_diamond_square(map, &mut field, rng, spacing, params)
        }
    }

    clamp_heights(&mut field);
    rebase_heights(&mut field);
    debug!(
        "height field synthesized ({:?}, spacing {})",
        params.height_algorithm, spacing
    );

    for pos in map.positions() {
        tiles.get_mut(pos).height = field[pos.idx()] as u8;
    }
}

/// Displacement magnitude for a given lattice step. Shrinks geometrically
/// with the step; scaled by the spikyness fraction (16.16 of 0x10000).
fn displacement_base(step: u32, spikyness: u16) -> i32 {
    ((step as i32 * 8) * i32::from(spikyness)) >> 16
}

/// The core stochastic law: average plus a signed random offset bounded by
/// `base`. `preserve_bugs` reproduces the legacy truncating divide, which
/// rounds negative offsets toward zero instead of down.
fn displace(rng: &mut GameRandom, avg: i32, base: i32, preserve_bugs: bool) -> i32 {
    let r = i32::from(rng.random_int()) - 0x8000;
    let offset = if preserve_bugs {
        (r * base) / 0x8000
    } else {
        (r * base) >> 15
    };
    avg + offset
}

/// Seed the coarse square lattice with displaced mid-range values,
/// row-major over lattice intersections.
fn seed_lattice(
    map: &HexMap,
    field: &mut [i32],
    rng: &mut GameRandom,
    spacing: u32,
    params: &GeneratorParams,
) {
    let base = displacement_base(spacing, params.terrain_spikyness);
    for row in (0..map.rows()).step_by(spacing as usize) {
        for col in (0..map.cols()).step_by(spacing as usize) {
            let pos = map.pos(col, row);
            field[pos.idx()] = displace(rng, BASE_LEVEL, base, params.preserve_bugs);
        }
    }
}

/// Square-submesh midpoint displacement: each halving step fills the right,
/// down, and diagonal-center midpoints of every lattice cell from the two
/// governing corners, in that fixed order.
fn init_heights_midpoints(
    map: &HexMap,
    field: &mut [i32],
    rng: &mut GameRandom,
    spacing: u32,
    params: &GeneratorParams,
) {
    let mut s = spacing;
    while s > 1 {
        let h = s / 2;
        let base = displacement_base(s, params.terrain_spikyness);
        for row in (0..map.rows()).step_by(s as usize) {
            for col in (0..map.cols()).step_by(s as usize) {
                let p00 = field[map.pos(col, row).idx()];
                let p10 = field[map.pos(col + s, row).idx()];
                let p01 = field[map.pos(col, row + s).idx()];
                let p11 = field[map.pos(col + s, row + s).idx()];

                let right = map.pos(col + h, row);
                field[right.idx()] = displace(rng, (p00 + p10) / 2, base, params.preserve_bugs);
                let down = map.pos(col, row + h);
                field[down.idx()] = displace(rng, (p00 + p01) / 2, base, params.preserve_bugs);
                let center = map.pos(col + h, row + h);
                field[center.idx()] = displace(rng, (p00 + p11) / 2, base, params.preserve_bugs);
            }
        }
        s = h;
    }
}

/// Diamond-square: per halving step, a full diamond pass (square centers
/// from four corners) runs before the square pass (edge midpoints from four
/// governing neighbors). Both passes scan row-major.
fn init_heights_diamond_square(
    map: &HexMap,
    field: &mut [i32],
    rng: &mut GameRandom,
    spacing: u32,
    params: &GeneratorParams,
) {
    let mut s = spacing;
    while s > 1 {
        let h = s / 2;
        let base = displacement_base(s, params.terrain_spikyness);

        for row in (0..map.rows()).step_by(s as usize) {
            for col in (0..map.cols()).step_by(s as usize) {
                let avg = (field[map.pos(col, row).idx()]
                    + field[map.pos(col + s, row).idx()]
                    + field[map.pos(col, row + s).idx()]
                    + field[map.pos(col + s, row + s).idx()])
                    / 4;
                let center = map.pos(col + h, row + h);
                field[center.idx()] = displace(rng, avg, base, params.preserve_bugs);
            }
        }

        for row in (0..map.rows()).step_by(s as usize) {
            for col in (0..map.cols()).step_by(s as usize) {
                let top = map.pos(col + h, row);
                let avg = (field[map.pos(col, row).idx()]
                    + field[map.pos(col + s, row).idx()]
                    + field[map.pos(col + h, row + map.rows() - h).idx()]
                    + field[map.pos(col + h, row + h).idx()])
                    / 4;
                field[top.idx()] = displace(rng, avg, base, params.preserve_bugs);

                let left = map.pos(col, row + h);
                let avg = (field[map.pos(col, row).idx()]
                    + field[map.pos(col, row + s).idx()]
                    + field[map.pos(col + map.cols() - h, row + h).idx()]
                    + field[map.pos(col + h, row + h).idx()])
                    / 4;
                field[left.idx()] = displace(rng, avg, base, params.preserve_bugs);
            }
        }

        s = h;
    }
}

/// Bound every height into the valid range.
pub fn clamp_heights(field: &mut [i32]) {
    for h in field.iter_mut() {
        *h = (*h).clamp(0, HEIGHT_MAX);
    }
}

/// Shift the whole field so the minimum sits at the zero baseline.
pub fn rebase_heights(field: &mut [i32]) {
    let min = field.iter().copied().min().unwrap_or(0);
    for h in field.iter_mut() {
        *h -= min;
    }
}

/// First row-major position holding the minimum height.
pub fn lowest_position(map: &HexMap, tiles: &TileStore) -> MapPos {
    let mut best = MapPos(0);
    let mut best_height = u8::MAX;
    for pos in map.positions() {
        let h = tiles.get(pos).height;
        if h < best_height {
            best_height = h;
            best = pos;
        }
    }
    best
}
