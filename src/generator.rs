//! Generation pipeline orchestration.
//!
//! `ClassicMapGenerator` runs the pass sequence end to end: heights, sea
//! level, lakes, terrain types, smoothing, deserts, crater cleanup, objects,
//! deposits, final cleanup. All passes draw from one random stream in this
//! order, so a map is fully described by its dimensions, seed state, and
//! parameters.

use log::info;

use crate::classify;
use crate::heights;
use crate::hydrology;
use crate::map::{HexMap, MapPos};
use crate::objects;
use crate::rng::GameRandom;
use crate::terrain::{Mineral, Object, Terrain};
use crate::tiles::TileStore;

/// Height synthesis variant.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    clap::ValueEnum,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum HeightAlgorithm {
    /// Square-submesh midpoint displacement, the original variant.
    Midpoints,
    /// Diamond-square, the smoother default.
    #[default]
    DiamondSquare,
}

/// Tunable generation parameters.
///
/// Values are taken as given; out-of-range settings (a water level above
/// 1.0, say) are a caller contract violation and produce degenerate but
/// well-defined maps rather than errors.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GeneratorParams {
    pub height_algorithm: HeightAlgorithm,
    /// Reproduce the legacy truncating-divide displacement rounding.
    pub preserve_bugs: bool,
    /// Target water fraction of the map.
    pub water_level: f64,
    /// Largest interior water body kept as a lake, in tiles.
    pub max_lake_area: u32,
    /// Height roughness as a 16.16 fraction of 0x10000.
    pub terrain_spikyness: u16,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            height_algorithm: HeightAlgorithm::default(),
            preserve_bugs: false,
            water_level: 0.35,
            max_lake_area: 14,
            terrain_spikyness: 0x9999,
        }
    }
}

/// A complete map generation strategy.
pub trait MapGenerator {
    /// Run every pass. Call once per instance.
    fn generate(&mut self);

    fn map(&self) -> &HexMap;

    /// The finished tiles; meaningful after [`MapGenerator::generate`].
    fn tiles(&self) -> &TileStore;

    fn get_height(&self, pos: MapPos) -> u8 {
        self.tiles().get(pos).height
    }

    fn get_type_up(&self, pos: MapPos) -> Terrain {
        self.tiles().get(pos).type_up
    }

    fn get_type_down(&self, pos: MapPos) -> Terrain {
        self.tiles().get(pos).type_down
    }

    fn get_obj(&self, pos: MapPos) -> Object {
        self.tiles().get(pos).object
    }

    /// Deposit kind and remaining amount at a position.
    fn get_resource(&self, pos: MapPos) -> (Mineral, u8) {
        let tile = self.tiles().get(pos);
        (tile.resource_type, tile.resource_amount)
    }
}

/// The standard generator for free-play maps.
pub struct ClassicMapGenerator {
    map: HexMap,
    tiles: TileStore,
    rng: GameRandom,
    params: GeneratorParams,
    sea_level: u8,
    ocean_seed: MapPos,
}

impl ClassicMapGenerator {
    pub fn new(map: HexMap, rng: GameRandom, params: GeneratorParams) -> Self {
        let tiles = TileStore::new(map.tile_count() as usize);
        Self {
            map,
            tiles,
            rng,
            params,
            sea_level: 0,
            ocean_seed: MapPos(0),
        }
    }

    /// Convenience constructor from a 64-bit master seed.
    pub fn from_seed(map: HexMap, seed: u64, params: GeneratorParams) -> Self {
        Self::new(map, GameRandom::from_master(seed), params)
    }

    pub fn sea_level(&self) -> u8 {
        self.sea_level
    }

    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    /// Ocean size and lake sizes of the finished map.
    pub fn water_stats(&self) -> (usize, Vec<usize>) {
        hydrology::water_components(&self.map, &self.tiles, self.sea_level, self.ocean_seed)
    }
}

impl MapGenerator for ClassicMapGenerator {
    fn generate(&mut self) {
        info!(
            "generating {}x{} map with {:?}",
            self.map.cols(),
            self.map.rows(),
            self.params.height_algorithm
        );

        heights::init_heights(&self.map, &mut self.tiles, &mut self.rng, &self.params);

        let (sea_level, ocean_seed) = hydrology::init_sea_level(&self.map, &self.tiles, &self.params);
        self.sea_level = sea_level;
        self.ocean_seed = ocean_seed;
        hydrology::init_lakes(
            &self.map,
            &mut self.tiles,
            sea_level,
            ocean_seed,
            self.params.max_lake_area,
        );

        classify::init_types(&self.map, &mut self.tiles, sea_level);
        classify::init_types_2(&self.map, &mut self.tiles);
        classify::init_desert(&self.map, &mut self.tiles, &mut self.rng);
        classify::init_desert_2(&self.map, &mut self.tiles);
        classify::init_crosses(&self.map, &mut self.tiles);

        objects::init_objects(&self.map, &mut self.tiles, &mut self.rng);
        objects::init_resources(&self.map, &mut self.tiles, &mut self.rng);
        objects::init_clean_up(&self.map, &mut self.tiles);

        let water = self
            .map
            .positions()
            .filter(|&p| self.tiles.get(p).type_up.is_water())
            .count();
        info!(
            "map finished: sea level {}, {:.1}% water triangles",
            sea_level,
            100.0 * water as f64 / self.map.tile_count() as f64
        );
    }

    fn map(&self) -> &HexMap {
        &self.map
    }

    fn tiles(&self) -> &TileStore {
        &self.tiles
    }
}

/// Generator for the fixed campaign missions. Locks the parameters the
/// legacy campaign was balanced against and seeds the stream from the
/// mission's stored random state, so a mission always regenerates the same
/// map.
pub struct ClassicMissionMapGenerator {
    inner: ClassicMapGenerator,
}

impl ClassicMissionMapGenerator {
    pub fn new(map: HexMap, mission_state: [u16; 3]) -> Self {
        let params = GeneratorParams {
            height_algorithm: HeightAlgorithm::Midpoints,
            preserve_bugs: true,
            ..GeneratorParams::default()
        };
        Self {
            inner: ClassicMapGenerator::new(
                map,
                GameRandom::from_state(mission_state[0], mission_state[1], mission_state[2]),
                params,
            ),
        }
    }

    pub fn sea_level(&self) -> u8 {
        self.inner.sea_level()
    }
}

impl MapGenerator for ClassicMissionMapGenerator {
    fn generate(&mut self) {
        self.inner.generate();
    }

    fn map(&self) -> &HexMap {
        self.inner.map()
    }

    fn tiles(&self) -> &TileStore {
        self.inner.tiles()
    }
}
