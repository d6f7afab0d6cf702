//! PNG export of generated maps.
//!
//! One pixel per tile: the up-triangle terrain picks the base color and the
//! tile height modulates brightness so relief reads through the terrain
//! bands.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::map::HexMap;
use crate::terrain::Terrain;
use crate::tiles::TileStore;

/// Base color for a terrain kind
pub fn terrain_color(terrain: Terrain) -> [u8; 3] {
    match terrain {
        Terrain::Water3 => [0, 54, 114],
        Terrain::Water2 => [0, 70, 132],
        Terrain::Water1 => [0, 86, 150],
        Terrain::Water0 => [0, 101, 168],
        Terrain::Grass0 => [93, 115, 51],
        Terrain::Grass1 => [65, 115, 24],
        Terrain::Grass2 => [72, 126, 27],
        Terrain::Grass3 => [79, 137, 30],
        Terrain::Desert0 => [220, 187, 126],
        Terrain::Desert1 => [230, 198, 137],
        Terrain::Desert2 => [240, 210, 148],
        Terrain::Tundra0 => [138, 122, 96],
        Terrain::Tundra1 => [148, 130, 100],
        Terrain::Tundra2 => [158, 138, 104],
        Terrain::Snow0 => [222, 222, 226],
        Terrain::Snow1 => [240, 240, 245],
    }
}

/// Scale a color by a brightness factor
fn shade(color: [u8; 3], factor: f32) -> [u8; 3] {
    [
        (color[0] as f32 * factor).clamp(0.0, 255.0) as u8,
        (color[1] as f32 * factor).clamp(0.0, 255.0) as u8,
        (color[2] as f32 * factor).clamp(0.0, 255.0) as u8,
    ]
}

/// Export a terrain map with height-modulated shading
pub fn export_terrain_map(
    map: &HexMap,
    tiles: &TileStore,
    path: &str,
) -> Result<(), image::ImageError> {
    let mut img: RgbImage = ImageBuffer::new(map.cols(), map.rows());

    let max_height = tiles.iter().map(|t| t.height).max().unwrap_or(0).max(1);
    for row in 0..map.rows() {
        for col in 0..map.cols() {
            let tile = tiles.get(map.pos(col, row));
            let relief = tile.height as f32 / max_height as f32;
            // 0.75 at the lowest tile up to 1.15 at the highest
            let color = shade(terrain_color(tile.type_up), 0.75 + relief * 0.4);
            img.put_pixel(col, row, Rgb(color));
        }
    }

    img.save(path)
}

/// Export the raw height field as grayscale
pub fn export_heightmap(
    map: &HexMap,
    tiles: &TileStore,
    path: &str,
) -> Result<(), image::ImageError> {
    let mut img: RgbImage = ImageBuffer::new(map.cols(), map.rows());

    for row in 0..map.rows() {
        for col in 0..map.cols() {
            let h = tiles.get(map.pos(col, row)).height;
            img.put_pixel(col, row, Rgb([h, h, h]));
        }
    }

    img.save(path)
}
