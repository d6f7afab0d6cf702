//! ASCII rendering and export for generated maps.
//!
//! Renders the up-triangle terrain of each tile as one character per cell,
//! plus height and object overlays, and writes a full map report to a text
//! file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};

use chrono::Local;

use crate::map::HexMap;
use crate::terrain::{Object, Terrain};
use crate::tiles::TileStore;

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum AsciiMode {
    /// Show terrain characters
    Terrain,
    /// Show elevation gradient
    Height,
    /// Show placed objects
    Objects,
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Terrain => "Terrain",
            AsciiMode::Height => "Height",
            AsciiMode::Objects => "Objects",
        }
    }
}

/// Get ASCII character for a terrain kind
pub fn terrain_char(terrain: Terrain) -> char {
    match terrain {
        Terrain::Water3 => '~',
        Terrain::Water2 => '~',
        Terrain::Water1 => '-',
        Terrain::Water0 => ',',
        Terrain::Grass0 => '.',
        Terrain::Grass1 => '"',
        Terrain::Grass2 => '"',
        Terrain::Grass3 => ';',
        Terrain::Desert0 => 'd',
        Terrain::Desert1 => 'D',
        Terrain::Desert2 => 'D',
        Terrain::Tundra0 => 'n',
        Terrain::Tundra1 => '^',
        Terrain::Tundra2 => '^',
        Terrain::Snow0 => 'A',
        Terrain::Snow1 => 'A',
    }
}

/// Get ASCII character for elevation (11-level gradient over 0..=255)
pub fn height_char(height: u8) -> char {
    const CHARS: &[char] = &['~', '.', '-', '=', '+', '*', '#', '%', '^', 'A', 'M'];
    let idx = height as usize * (CHARS.len() - 1) / 255;
    CHARS[idx.min(CHARS.len() - 1)]
}

/// Get ASCII character for a placed object
pub fn object_char(object: Object) -> char {
    match object {
        Object::None => ' ',
        Object::Tree(_) => 'T',
        Object::Pine(_) => 'P',
        Object::Palm(_) => 'p',
        Object::WaterTree(_) => 'w',
        Object::Stone(_) => 'S',
        Object::Sandstone(_) => 's',
        Object::Stub => ',',
        Object::SmallBoulder => 'o',
        Object::Cadaver(_) => 'x',
        Object::Cactus(_) => 'c',
        Object::WaterStone(_) => 'O',
        Object::DeadTree => 'X',
    }
}

/// Render a map to ASCII string
pub fn render_ascii_map(map: &HexMap, tiles: &TileStore, mode: AsciiMode) -> String {
    let mut result = String::with_capacity(((map.cols() + 1) * map.rows()) as usize);

    for row in 0..map.rows() {
        for col in 0..map.cols() {
            let tile = tiles.get(map.pos(col, row));
            let ch = match mode {
                AsciiMode::Terrain => terrain_char(tile.type_up),
                AsciiMode::Height => height_char(tile.height),
                AsciiMode::Objects => object_char(tile.object),
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

/// Generate legend for terrain characters
pub fn terrain_legend() -> String {
    let mut legend = String::new();
    legend.push_str("=== TERRAIN LEGEND ===\n");
    legend.push_str("WATER:\n");
    legend.push_str("  ~ deep water   - water       , shallows\n");
    legend.push_str("LAND:\n");
    legend.push_str("  . shore grass  \" grass       ; high grass\n");
    legend.push_str("DESERT:\n");
    legend.push_str("  d fringe       D desert\n");
    legend.push_str("MOUNTAIN:\n");
    legend.push_str("  n foothills    ^ mountain    A snow\n");
    legend
}

/// Count triangles per terrain kind
pub fn calculate_terrain_stats(map: &HexMap, tiles: &TileStore) -> HashMap<Terrain, usize> {
    let mut stats = HashMap::new();
    for pos in map.positions() {
        let tile = tiles.get(pos);
        *stats.entry(tile.type_up).or_insert(0) += 1;
        *stats.entry(tile.type_down).or_insert(0) += 1;
    }
    stats
}

/// Export a generated map to an ASCII report file
pub fn export_map_file(
    map: &HexMap,
    tiles: &TileStore,
    seed: u64,
    sea_level: u8,
    path: &str,
) -> io::Result<()> {
    let mut file = File::create(path)?;
    let total = map.tile_count() as usize;

    // Header
    writeln!(file, "=== HEXMAP GENERATOR MAP FILE ===")?;
    writeln!(file, "Seed: {}", seed)?;
    writeln!(file, "Size: {}x{}", map.cols(), map.rows())?;
    writeln!(file, "Sea level: {}", sea_level)?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;

    // Terrain map
    writeln!(file, "=== MAP (Terrain View) ===")?;
    write!(file, "{}", render_ascii_map(map, tiles, AsciiMode::Terrain))?;
    writeln!(file)?;

    write!(file, "{}", terrain_legend())?;
    writeln!(file)?;

    // Statistics
    writeln!(file, "=== STATISTICS ===")?;
    writeln!(file, "Total tiles: {}", total)?;

    let water_count = map
        .positions()
        .filter(|&p| tiles.get(p).type_up.is_water())
        .count();
    let land_count = total - water_count;
    writeln!(file, "Land: {} ({:.1}%)", land_count, 100.0 * land_count as f64 / total as f64)?;
    writeln!(file, "Water: {} ({:.1}%)", water_count, 100.0 * water_count as f64 / total as f64)?;
    writeln!(file)?;

    writeln!(file, "Terrain Distribution (triangles):")?;
    let stats = calculate_terrain_stats(map, tiles);
    let mut sorted_stats: Vec<_> = stats.iter().collect();
    sorted_stats.sort_by(|a, b| b.1.cmp(a.1));
    for (terrain, count) in sorted_stats {
        let pct = 100.0 * *count as f64 / (2 * total) as f64;
        writeln!(
            file,
            "  {:14} {} {:>7} ({:>5.1}%)",
            terrain.name(),
            terrain_char(*terrain),
            count,
            pct
        )?;
    }
    writeln!(file)?;

    // Objects and deposits
    let objects = tiles.iter().filter(|t| !t.object.is_none()).count();
    let deposits = tiles.iter().filter(|t| t.resource_amount > 0).count();
    writeln!(file, "Objects: {}", objects)?;
    writeln!(file, "Deposit tiles: {}", deposits)?;

    Ok(())
}

/// Print ASCII map to stdout
pub fn print_ascii_map(map: &HexMap, tiles: &TileStore, mode: AsciiMode) {
    print!("{}", render_ascii_map(map, tiles, mode));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapPos;

    #[test]
    fn test_render_dimensions() {
        let map = HexMap::new(3, 4);
        let tiles = TileStore::new(map.tile_count() as usize);
        let out = render_ascii_map(&map, &tiles, AsciiMode::Terrain);
        assert_eq!(out.lines().count(), map.rows() as usize);
        assert!(out.lines().all(|l| l.chars().count() == map.cols() as usize));
    }

    #[test]
    fn test_height_char_gradient_ends() {
        assert_eq!(height_char(0), '~');
        assert_eq!(height_char(255), 'M');
    }

    #[test]
    fn test_terrain_stats_count_both_triangles() {
        let map = HexMap::new(2, 2);
        let mut tiles = TileStore::new(map.tile_count() as usize);
        tiles.get_mut(MapPos(0)).type_up = Terrain::Grass1;
        let stats = calculate_terrain_stats(&map, &tiles);
        assert_eq!(stats[&Terrain::Grass1], 1);
        assert_eq!(stats[&Terrain::Water0], 2 * map.tile_count() as usize - 1);
    }
}
