//! Terrain, object, and ground deposit kinds.
//!
//! Terrain kinds are declared in elevation order (deep water up to snow), so
//! the derived `Ord` doubles as the classification rank used by the
//! smoothing passes. Deserts sit between grass and tundra in the declaration
//! but are an overlay, not a height band.

/// Terrain kind of one triangular sub-tile.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Terrain {
    /// Deepest water.
    Water3,
    Water2,
    Water1,
    /// Shallow water bordering the shore.
    #[default]
    Water0,
    /// Marshy shore grass, the only land kind allowed against water.
    Grass0,
    Grass1,
    Grass2,
    Grass3,
    /// Desert fringe.
    Desert0,
    Desert1,
    /// Desert core.
    Desert2,
    /// Lower mountain slopes.
    Tundra0,
    Tundra1,
    Tundra2,
    Snow0,
    Snow1,
}

impl Terrain {
    /// Classification rank; equals the declaration order.
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Terrain {
        const TABLE: [Terrain; 16] = [
            Terrain::Water3,
            Terrain::Water2,
            Terrain::Water1,
            Terrain::Water0,
            Terrain::Grass0,
            Terrain::Grass1,
            Terrain::Grass2,
            Terrain::Grass3,
            Terrain::Desert0,
            Terrain::Desert1,
            Terrain::Desert2,
            Terrain::Tundra0,
            Terrain::Tundra1,
            Terrain::Tundra2,
            Terrain::Snow0,
            Terrain::Snow1,
        ];
        TABLE[rank as usize]
    }

    pub fn is_water(self) -> bool {
        self <= Terrain::Water0
    }

    pub fn is_grass(self) -> bool {
        (Terrain::Grass0..=Terrain::Grass3).contains(&self)
    }

    pub fn is_desert(self) -> bool {
        (Terrain::Desert0..=Terrain::Desert2).contains(&self)
    }

    pub fn is_tundra(self) -> bool {
        (Terrain::Tundra0..=Terrain::Tundra2).contains(&self)
    }

    pub fn is_snow(self) -> bool {
        self >= Terrain::Snow0
    }

    /// Position on the land smoothing gradient (shore = 0, high snow = 8).
    /// Deserts are an overlay and have no gradient level.
    pub fn land_level(self) -> Option<u8> {
        match self {
            Terrain::Grass0 => Some(0),
            Terrain::Grass1 => Some(1),
            Terrain::Grass2 => Some(2),
            Terrain::Grass3 => Some(3),
            Terrain::Tundra0 => Some(4),
            Terrain::Tundra1 => Some(5),
            Terrain::Tundra2 => Some(6),
            Terrain::Snow0 => Some(7),
            Terrain::Snow1 => Some(8),
            _ => None,
        }
    }

    pub fn from_land_level(level: u8) -> Terrain {
        const TABLE: [Terrain; 9] = [
            Terrain::Grass0,
            Terrain::Grass1,
            Terrain::Grass2,
            Terrain::Grass3,
            Terrain::Tundra0,
            Terrain::Tundra1,
            Terrain::Tundra2,
            Terrain::Snow0,
            Terrain::Snow1,
        ];
        TABLE[level as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Water3 => "deep water",
            Terrain::Water2 => "water",
            Terrain::Water1 => "water",
            Terrain::Water0 => "shallow water",
            Terrain::Grass0 => "shore grass",
            Terrain::Grass1 => "grass",
            Terrain::Grass2 => "grass",
            Terrain::Grass3 => "grass",
            Terrain::Desert0 => "desert fringe",
            Terrain::Desert1 => "desert",
            Terrain::Desert2 => "desert core",
            Terrain::Tundra0 => "foothills",
            Terrain::Tundra1 => "mountain",
            Terrain::Tundra2 => "high mountain",
            Terrain::Snow0 => "snow line",
            Terrain::Snow1 => "snow",
        }
    }
}

/// Decorative object placed on a tile. Variant payloads select one of the
/// interchangeable sprites within a category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Object {
    #[default]
    None,
    Tree(u8),
    Pine(u8),
    Palm(u8),
    WaterTree(u8),
    Stone(u8),
    Sandstone(u8),
    Stub,
    SmallBoulder,
    Cadaver(u8),
    Cactus(u8),
    WaterStone(u8),
    DeadTree,
}

impl Object {
    pub fn is_none(self) -> bool {
        self == Object::None
    }

    /// Terrain range this object category tolerates around its position.
    /// The final cleanup sweep strips objects whose surrounding hexagon
    /// strays outside this range.
    pub fn allowed_range(self) -> Option<(Terrain, Terrain)> {
        match self {
            Object::None => None,
            Object::Tree(_) | Object::Pine(_) | Object::Stub | Object::DeadTree => {
                Some((Terrain::Grass0, Terrain::Grass3))
            }
            Object::SmallBoulder => Some((Terrain::Grass0, Terrain::Grass3)),
            Object::Stone(_) | Object::Sandstone(_) => Some((Terrain::Grass0, Terrain::Tundra0)),
            Object::Palm(_) => Some((Terrain::Grass3, Terrain::Desert2)),
            Object::Cadaver(_) | Object::Cactus(_) => Some((Terrain::Desert0, Terrain::Desert2)),
            Object::WaterTree(_) | Object::WaterStone(_) => {
                Some((Terrain::Water1, Terrain::Water0))
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Object::None => "none",
            Object::Tree(_) => "tree",
            Object::Pine(_) => "pine",
            Object::Palm(_) => "palm",
            Object::WaterTree(_) => "water tree",
            Object::Stone(_) => "stone pile",
            Object::Sandstone(_) => "sandstone boulder",
            Object::Stub => "stub",
            Object::SmallBoulder => "small boulder",
            Object::Cadaver(_) => "cadaver",
            Object::Cactus(_) => "cactus",
            Object::WaterStone(_) => "water stone",
            Object::DeadTree => "dead tree",
        }
    }
}

/// Ground deposit kind.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Mineral {
    #[default]
    None,
    Gold,
    Iron,
    Coal,
    Stone,
    Fish,
}

impl Mineral {
    /// Terrain range that can host this deposit.
    pub fn host_range(self) -> Option<(Terrain, Terrain)> {
        match self {
            Mineral::None => None,
            Mineral::Gold | Mineral::Iron | Mineral::Coal | Mineral::Stone => {
                Some((Terrain::Tundra0, Terrain::Tundra2))
            }
            Mineral::Fish => Some((Terrain::Water3, Terrain::Water0)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mineral::None => "none",
            Mineral::Gold => "gold",
            Mineral::Iron => "iron",
            Mineral::Coal => "coal",
            Mineral::Stone => "stone",
            Mineral::Fish => "fish",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_roundtrip() {
        for rank in 0..16u8 {
            assert_eq!(Terrain::from_rank(rank).rank(), rank);
        }
    }

    #[test]
    fn test_water_ordering() {
        assert!(Terrain::Water3 < Terrain::Water0);
        assert!(Terrain::Water0 < Terrain::Grass0);
        assert!(Terrain::Water3.is_water());
        assert!(!Terrain::Grass0.is_water());
    }

    #[test]
    fn test_land_level_roundtrip() {
        for level in 0..=8u8 {
            assert_eq!(Terrain::from_land_level(level).land_level(), Some(level));
        }
        assert_eq!(Terrain::Desert1.land_level(), None);
        assert_eq!(Terrain::Water0.land_level(), None);
    }

    #[test]
    fn test_object_ranges_exclude_water_for_land_objects() {
        let (min, max) = Object::Tree(0).allowed_range().unwrap();
        assert!(!min.is_water() && !max.is_water());
        let (min, max) = Object::WaterTree(0).allowed_range().unwrap();
        assert!(min.is_water() && max.is_water());
    }

    #[test]
    fn test_mineral_hosts() {
        assert_eq!(
            Mineral::Gold.host_range(),
            Some((Terrain::Tundra0, Terrain::Tundra2))
        );
        let (min, max) = Mineral::Fish.host_range().unwrap();
        assert!(min.is_water() && max.is_water());
        assert_eq!(Mineral::None.host_range(), None);
    }
}
