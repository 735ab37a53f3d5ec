//! Game-state collaborators for LOS queries
//!
//! The tracer itself only knows the map. Counters that live on top of
//! it (smoke, vehicles, artillery concentrations, terrain overlays) are
//! supplied per query through `GameQueries`; hosts with no counters in
//! play pass `NoCounters`.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::map::{HexCoord, Location};

/// A smoke counter. `level` is the height of the smoke base above the
/// hex base level; `height` the depth of the smoke column above it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Smoke {
    pub hex: HexCoord,
    pub level: i32,
    pub height: i32,
    pub hindrance: i32,
}

impl Smoke {
    pub fn new(hex: HexCoord, level: i32, height: i32, hindrance: i32) -> Self {
        Smoke {
            hex,
            level,
            height,
            hindrance,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub location: Location,
}

impl Vehicle {
    pub fn new(location: Location) -> Self {
        Vehicle { location }
    }

    pub fn hex(&self) -> HexCoord {
        self.location.hex()
    }
}

/// An artillery concentration covering a blast area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Oba {
    pub hex: HexCoord,
    pub blast_radius: i32,
    pub blast_height: i32,
    pub hindrance: i32,
}

impl Oba {
    pub fn new(hex: HexCoord, blast_radius: i32, blast_height: i32, hindrance: i32) -> Self {
        Oba {
            hex,
            blast_radius,
            blast_height,
            hindrance,
        }
    }
}

/// Per-query view of the counters in play. Default methods report an
/// empty board.
pub trait GameQueries {
    /// Terrain code replacing the hex center terrain (rubble counters
    /// and the like).
    fn terrain_override(&self, _hex: HexCoord) -> Option<u8> {
        None
    }

    fn smoke_at(&self, _hex: HexCoord) -> &[Smoke] {
        &[]
    }

    fn vehicles_at(&self, _hex: HexCoord) -> &[Vehicle] {
        &[]
    }

    fn oba(&self) -> &[Oba] {
        &[]
    }
}

/// No counters in play.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCounters;

impl GameQueries for NoCounters {}

/// Hash-map backed counter state, for hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct ScenarioState {
    terrain_overrides: AHashMap<HexCoord, u8>,
    smoke: AHashMap<HexCoord, Vec<Smoke>>,
    vehicles: AHashMap<HexCoord, Vec<Vehicle>>,
    oba: Vec<Oba>,
}

impl ScenarioState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_terrain_override(&mut self, hex: HexCoord, code: u8) {
        self.terrain_overrides.insert(hex, code);
    }

    pub fn clear_terrain_override(&mut self, hex: HexCoord) {
        self.terrain_overrides.remove(&hex);
    }

    pub fn add_smoke(&mut self, smoke: Smoke) {
        self.smoke.entry(smoke.hex).or_default().push(smoke);
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicles
            .entry(vehicle.hex())
            .or_default()
            .push(vehicle);
    }

    pub fn add_oba(&mut self, oba: Oba) {
        self.oba.push(oba);
    }
}

impl GameQueries for ScenarioState {
    fn terrain_override(&self, hex: HexCoord) -> Option<u8> {
        self.terrain_overrides.get(&hex).copied()
    }

    fn smoke_at(&self, hex: HexCoord) -> &[Smoke] {
        self.smoke.get(&hex).map_or(&[], Vec::as_slice)
    }

    fn vehicles_at(&self, hex: HexCoord) -> &[Vehicle] {
        self.vehicles.get(&hex).map_or(&[], Vec::as_slice)
    }

    fn oba(&self) -> &[Oba] {
        &self.oba
    }
}
