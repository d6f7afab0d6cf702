//! Dense per-position tile store.
//!
//! One record per map position, allocated once per generator and mutated in
//! place by the generation passes. Exposed read-only after generation.

use crate::map::{MapPos, Triangle};
use crate::terrain::{Mineral, Object, Terrain};

/// Per-position generation state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    /// Elevation, rebased so the map minimum sits at 0.
    pub height: u8,
    /// Terrain of the upward triangle at this position's hex corner.
    pub type_up: Terrain,
    /// Terrain of the downward triangle.
    pub type_down: Terrain,
    pub object: Object,
    pub resource_type: Mineral,
    /// Deposit quantity; 0 means no deposit.
    pub resource_amount: u8,
}

impl Tile {
    pub fn triangle(&self, tri: Triangle) -> Terrain {
        match tri {
            Triangle::Up => self.type_up,
            Triangle::Down => self.type_down,
        }
    }

    pub fn set_triangle(&mut self, tri: Triangle, terrain: Terrain) {
        match tri {
            Triangle::Up => self.type_up = terrain,
            Triangle::Down => self.type_down = terrain,
        }
    }
}

/// Dense array of tiles indexed by packed position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileStore {
    tiles: Vec<Tile>,
}

impl TileStore {
    pub fn new(tile_count: usize) -> Self {
        Self {
            tiles: vec![Tile::default(); tile_count],
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, pos: MapPos) -> &Tile {
        &self.tiles[pos.idx()]
    }

    pub fn get_mut(&mut self, pos: MapPos) -> &mut Tile {
        &mut self.tiles[pos.idx()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_starts_default() {
        let store = TileStore::new(64);
        assert_eq!(store.len(), 64);
        for tile in store.iter() {
            assert_eq!(tile.height, 0);
            assert_eq!(tile.object, Object::None);
            assert_eq!(tile.resource_amount, 0);
        }
    }

    #[test]
    fn test_triangle_accessors() {
        let mut tile = Tile::default();
        tile.set_triangle(Triangle::Up, Terrain::Grass2);
        tile.set_triangle(Triangle::Down, Terrain::Tundra0);
        assert_eq!(tile.triangle(Triangle::Up), Terrain::Grass2);
        assert_eq!(tile.triangle(Triangle::Down), Terrain::Tundra0);
    }
}
