//! Terrain catalog: immutable terrain attributes looked up by code or name
//!
//! Raster cells store one byte-sized terrain code, so a catalog holds at
//! most 256 entries. The catalog is owned by whoever constructs the map;
//! there is no process-wide terrain table.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{MapError, Result};

/// Terrain names the LOS rules reference directly.
pub mod names {
    pub const HILLOCK: &str = "Hillock";
    pub const WALL: &str = "Wall";
    pub const HEDGE: &str = "Hedge";
    pub const BOCAGE: &str = "Bocage";
    pub const CLIFF: &str = "Cliff";
    pub const STONE_RUBBLE: &str = "Stone Rubble";
    pub const WOODEN_RUBBLE: &str = "Wooden Rubble";
    pub const GRAIN: &str = "Grain";
    pub const BRUSH: &str = "Brush";
    pub const ORCHARD_OUT_OF_SEASON: &str = "Orchard, Out of Season";
    pub const DENSE_JUNGLE: &str = "Dense Jungle";
    pub const BAMBOO: &str = "Bamboo";
}

/// How a terrain type interacts with a line of sight crossing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LosCategory {
    /// No effect on LOS by itself
    Open,
    /// Degrades but does not block LOS
    Hindrance,
    /// Blocks LOS outright when tall enough
    Obstacle,
    /// Water obstacles (rivers, ocean, streams)
    Water,
}

/// One immutable terrain catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    pub code: u8,
    pub name: String,
    /// Height in full levels above the ground level of its hex
    pub height: i32,
    pub category: LosCategory,
    /// Terrain top is a half level above `height` (walls, grain, ...)
    #[serde(default)]
    pub half_level_height: bool,
    #[serde(default)]
    pub building: bool,
    #[serde(default)]
    pub depression: bool,
    #[serde(default)]
    pub entrenchment: bool,
    /// Lives on a hexside rather than in a hex (walls, hedges, bocage)
    #[serde(default)]
    pub hexside: bool,
    /// Spills into adjacent hexes (rubble, jungle, bamboo)
    #[serde(default)]
    pub inherent: bool,
    #[serde(default)]
    pub bridge: bool,
    #[serde(default)]
    pub rowhouse_wall: bool,
    /// Dual terrain such as orchards; the lower part may differ
    #[serde(default)]
    pub split: bool,
    #[serde(default)]
    pub lower_los_obstacle: bool,
    #[serde(default)]
    pub lower_los_hindrance: bool,
}

impl Terrain {
    pub fn new(code: u8, name: &str, category: LosCategory) -> Self {
        Terrain {
            code,
            name: name.to_string(),
            height: 0,
            category,
            half_level_height: false,
            building: false,
            depression: false,
            entrenchment: false,
            hexside: false,
            inherent: false,
            bridge: false,
            rowhouse_wall: false,
            split: false,
            lower_los_obstacle: false,
            lower_los_hindrance: false,
        }
    }

    pub fn with_height(mut self, height: i32) -> Self {
        self.height = height;
        self
    }

    pub fn half_level(mut self) -> Self {
        self.half_level_height = true;
        self
    }

    pub fn building(mut self) -> Self {
        self.building = true;
        self
    }

    pub fn depression(mut self) -> Self {
        self.depression = true;
        self
    }

    pub fn entrenchment(mut self) -> Self {
        self.entrenchment = true;
        self
    }

    pub fn hexside(mut self) -> Self {
        self.hexside = true;
        self
    }

    pub fn inherent(mut self) -> Self {
        self.inherent = true;
        self
    }

    pub fn bridge(mut self) -> Self {
        self.bridge = true;
        self
    }

    pub fn rowhouse(mut self) -> Self {
        self.rowhouse_wall = true;
        self
    }

    pub fn split(mut self) -> Self {
        self.split = true;
        self
    }

    pub fn lower_obstacle(mut self) -> Self {
        self.lower_los_obstacle = true;
        self
    }

    pub fn lower_hindrance(mut self) -> Self {
        self.lower_los_hindrance = true;
        self
    }

    pub fn is_open(&self) -> bool {
        self.category == LosCategory::Open
    }

    pub fn is_los_obstacle(&self) -> bool {
        self.category == LosCategory::Obstacle
    }

    pub fn is_los_hindrance(&self) -> bool {
        self.category == LosCategory::Hindrance
    }

    pub fn is_water_terrain(&self) -> bool {
        self.category == LosCategory::Water
    }
}

/// Catalog of terrain types for one map, indexed by code and name.
#[derive(Debug, Clone, Default)]
pub struct TerrainCatalog {
    by_code: AHashMap<u8, Terrain>,
    by_name: AHashMap<String, u8>,
}

impl TerrainCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a terrain type. Codes and names must be unique.
    pub fn add(&mut self, terrain: Terrain) -> Result<()> {
        if self.by_code.contains_key(&terrain.code) {
            return Err(MapError::Catalog(format!(
                "duplicate terrain code {}",
                terrain.code
            )));
        }
        if self.by_name.contains_key(&terrain.name) {
            return Err(MapError::Catalog(format!(
                "duplicate terrain name '{}'",
                terrain.name
            )));
        }
        self.by_name.insert(terrain.name.clone(), terrain.code);
        self.by_code.insert(terrain.code, terrain);
        Ok(())
    }

    pub fn by_code(&self, code: u8) -> Option<&Terrain> {
        self.by_code.get(&code)
    }

    pub fn by_name(&self, name: &str) -> Option<&Terrain> {
        self.by_name.get(name).and_then(|c| self.by_code.get(c))
    }

    pub fn code_of(&self, name: &str) -> Option<u8> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Load a catalog from a JSON array of terrain records.
    pub fn from_json(json: &str) -> Result<Self> {
        let terrains: Vec<Terrain> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for t in terrains {
            catalog.add(t)?;
        }
        Ok(catalog)
    }

    /// The terrain types the LOS rules reference by name. Hosts loading
    /// real board data will usually build their own catalog; this one is
    /// complete enough to run every rule.
    pub fn standard() -> Self {
        use LosCategory::*;
        let mut c = Self::new();
        let entries = vec![
            Terrain::new(0, "Open Ground", Open),
            Terrain::new(1, names::GRAIN, Hindrance).half_level(),
            Terrain::new(2, names::BRUSH, Hindrance).half_level(),
            Terrain::new(3, "Woods", Obstacle).with_height(1),
            Terrain::new(4, "Orchard", Hindrance)
                .with_height(1)
                .split()
                .lower_hindrance(),
            Terrain::new(5, names::ORCHARD_OUT_OF_SEASON, Hindrance)
                .with_height(1)
                .split(),
            Terrain::new(6, names::HILLOCK, Open).half_level(),
            Terrain::new(7, names::WALL, Obstacle).hexside().half_level(),
            Terrain::new(8, names::HEDGE, Obstacle).hexside().half_level(),
            Terrain::new(9, names::BOCAGE, Obstacle).hexside().with_height(1),
            Terrain::new(10, names::CLIFF, Obstacle).hexside(),
            Terrain::new(11, "Rowhouse Wall", Obstacle)
                .hexside()
                .rowhouse()
                .with_height(1),
            Terrain::new(12, "Stone Building, 1 Level", Obstacle)
                .building()
                .with_height(1),
            Terrain::new(13, "Stone Building, 2 Level", Obstacle)
                .building()
                .with_height(2),
            Terrain::new(14, "Wooden Building, 1 Level", Obstacle)
                .building()
                .with_height(1),
            Terrain::new(15, "Wooden Building, 2 Level", Obstacle)
                .building()
                .with_height(2),
            Terrain::new(16, names::STONE_RUBBLE, Obstacle)
                .inherent()
                .half_level(),
            Terrain::new(17, names::WOODEN_RUBBLE, Obstacle)
                .inherent()
                .half_level(),
            Terrain::new(18, "Gully", Open).depression(),
            Terrain::new(19, "Water", Water),
            Terrain::new(20, names::DENSE_JUNGLE, Obstacle)
                .inherent()
                .with_height(1),
            Terrain::new(21, names::BAMBOO, Obstacle).inherent().with_height(1),
            Terrain::new(22, "Foxholes", Open).entrenchment(),
            Terrain::new(23, "Wooden Bridge", Open).bridge(),
        ];
        for t in entries {
            // codes are assigned by hand above and cannot collide
            let _ = c.add(t);
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_lookups() {
        let catalog = TerrainCatalog::standard();
        assert_eq!(catalog.code_of("Open Ground"), Some(0));

        let wall = catalog.by_name(names::WALL).unwrap();
        assert!(wall.hexside);
        assert!(wall.half_level_height);
        assert!(wall.is_los_obstacle());

        let grain = catalog.by_name(names::GRAIN).unwrap();
        assert!(grain.is_los_hindrance());
        assert_eq!(grain.height, 0);
    }

    #[test]
    fn test_rule_referenced_names_present() {
        let catalog = TerrainCatalog::standard();
        for name in [
            names::HILLOCK,
            names::WALL,
            names::HEDGE,
            names::BOCAGE,
            names::CLIFF,
            names::STONE_RUBBLE,
            names::WOODEN_RUBBLE,
            names::GRAIN,
            names::BRUSH,
            names::ORCHARD_OUT_OF_SEASON,
            names::DENSE_JUNGLE,
            names::BAMBOO,
        ] {
            assert!(catalog.by_name(name).is_some(), "missing terrain {name}");
        }
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut catalog = TerrainCatalog::new();
        catalog
            .add(Terrain::new(1, "A", LosCategory::Open))
            .unwrap();
        assert!(catalog.add(Terrain::new(1, "B", LosCategory::Open)).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"[
            {"code": 0, "name": "Open Ground", "height": 0, "category": "Open"},
            {"code": 7, "name": "Wall", "height": 0, "category": "Obstacle",
             "hexside": true, "half_level_height": true}
        ]"#;
        let catalog = TerrainCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.by_name("Wall").unwrap().hexside);
    }
}
