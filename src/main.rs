use std::fs;
use std::process::ExitCode;

use clap::Parser;

use hexmap_generator::ascii::{self, AsciiMode};
use hexmap_generator::export;
use hexmap_generator::generator::{
    ClassicMapGenerator, ClassicMissionMapGenerator, GeneratorParams, HeightAlgorithm,
    MapGenerator,
};
use hexmap_generator::map::HexMap;

#[derive(Parser, Debug)]
#[command(name = "hexmap_generator")]
#[command(about = "Generate deterministic hexagonal game maps")]
struct Args {
    /// Map width as a power of two (2^N columns)
    #[arg(short = 'W', long, default_value = "8")]
    width_exp: u32,

    /// Map height as a power of two (2^N rows)
    #[arg(short = 'H', long, default_value = "8")]
    height_exp: u32,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Load generation parameters from a JSON file
    #[arg(long)]
    params: Option<String>,

    /// Height synthesis algorithm
    #[arg(short, long, value_enum)]
    algorithm: Option<HeightAlgorithm>,

    /// Target water fraction of the map (0.0 to 1.0)
    #[arg(long)]
    water_level: Option<f64>,

    /// Largest interior water body kept as a lake, in tiles
    #[arg(long)]
    max_lake_area: Option<u32>,

    /// Height roughness as a 16.16 fraction (0 to 65535)
    #[arg(long)]
    spikyness: Option<u16>,

    /// Reproduce the legacy displacement rounding quirk
    #[arg(long)]
    preserve_bugs: bool,

    /// Regenerate a campaign mission map from its stored random state
    #[arg(long)]
    mission: Option<u64>,

    /// Print an ASCII view to stdout
    #[arg(long, value_enum)]
    ascii: Option<AsciiMode>,

    /// Export an ASCII map report to a text file
    #[arg(long)]
    export_file: Option<String>,

    /// Export the terrain map to PNG
    #[arg(long)]
    export_png: Option<String>,

    /// Export the height field to a grayscale PNG
    #[arg(long)]
    export_heightmap: Option<String>,
}

/// Unpack a mission number's stored random state from the low 48 bits.
fn mission_state(mission: u64) -> [u16; 3] {
    [
        (mission & 0xffff) as u16,
        ((mission >> 16) & 0xffff) as u16,
        ((mission >> 32) & 0xffff) as u16,
    ]
}

fn load_params(args: &Args) -> Result<GeneratorParams, String> {
    let mut params = match &args.params {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path, e))?;
            serde_json::from_str(&text).map_err(|e| format!("cannot parse {}: {}", path, e))?
        }
        None => GeneratorParams::default(),
    };

    if let Some(algorithm) = args.algorithm {
        params.height_algorithm = algorithm;
    }
    if let Some(water_level) = args.water_level {
        params.water_level = water_level;
    }
    if let Some(max_lake_area) = args.max_lake_area {
        params.max_lake_area = max_lake_area;
    }
    if let Some(spikyness) = args.spikyness {
        params.terrain_spikyness = spikyness;
    }
    if args.preserve_bugs {
        params.preserve_bugs = true;
    }
    Ok(params)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let map = HexMap::new(args.width_exp, args.height_exp);

    println!("Map size: {}x{}", map.cols(), map.rows());

    let (tiles, map, sea_level, seed) = if let Some(mission) = args.mission {
        let state = mission_state(mission);
        println!("Regenerating mission map from state {:04x}:{:04x}:{:04x}", state[0], state[1], state[2]);
        let mut gen = ClassicMissionMapGenerator::new(map, state);
        gen.generate();
        let sea_level = gen.sea_level();
        (gen.tiles().clone(), gen.map().clone(), sea_level, mission)
    } else {
        let params = match load_params(&args) {
            Ok(params) => params,
            Err(err) => {
                eprintln!("Error: {}", err);
                return ExitCode::FAILURE;
            }
        };
        let seed = args.seed.unwrap_or_else(rand::random);
        println!("Generating map with seed: {}", seed);
        let mut gen = ClassicMapGenerator::from_seed(map, seed, params);
        gen.generate();

        let (ocean, lakes) = gen.water_stats();
        println!("Sea level: {}", gen.sea_level());
        println!("Ocean: {} tiles, {} lakes", ocean, lakes.len());
        let sea_level = gen.sea_level();
        (gen.tiles().clone(), gen.map().clone(), sea_level, seed)
    };

    let water = map
        .positions()
        .filter(|&p| tiles.get(p).type_up.is_water())
        .count();
    println!(
        "Water: {:.1}% of {} tiles",
        100.0 * water as f64 / map.tile_count() as f64,
        map.tile_count()
    );
    let objects = tiles.iter().filter(|t| !t.object.is_none()).count();
    let deposits = tiles.iter().filter(|t| t.resource_amount > 0).count();
    println!("Objects: {}, deposit tiles: {}", objects, deposits);

    if let Some(mode) = args.ascii {
        println!();
        ascii::print_ascii_map(&map, &tiles, mode);
    }

    if let Some(path) = &args.export_file {
        match ascii::export_map_file(&map, &tiles, seed, sea_level, path) {
            Ok(()) => println!("Wrote map report to {}", path),
            Err(err) => {
                eprintln!("Error writing {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(path) = &args.export_png {
        match export::export_terrain_map(&map, &tiles, path) {
            Ok(()) => println!("Wrote terrain map to {}", path),
            Err(err) => {
                eprintln!("Error writing {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(path) = &args.export_heightmap {
        match export::export_heightmap(&map, &tiles, path) {
            Ok(()) => println!("Wrote heightmap to {}", path),
            Err(err) => {
                eprintln!("Error writing {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_state_unpacks_low_words() {
        assert_eq!(mission_state(0x9abc_5678_1234), [0x1234, 0x5678, 0x9abc]);
        assert_eq!(mission_state(0), [0, 0, 0]);
    }
}
