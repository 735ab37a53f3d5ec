//! Hexsight - line-of-sight engine for hexagonal wargame maps
//!
//! The map uses two parallel data structures: a terrain/elevation raster
//! (one cell per image pixel, origin top-left) and a hex grid (column,
//! row, with the upper-left hex at (0,0) and odd columns shifted half a
//! hex). LOS queries walk the pixel line between two locations and run
//! an ordered battery of terrain, elevation, and obstacle rules at every
//! traversed point.

pub mod core;
pub mod los;
pub mod map;
pub mod terrain;

pub use crate::core::{MapError, Result};
pub use los::{GameQueries, LosResult, NoCounters, Oba, ScenarioState, Smoke, Vehicle};
pub use map::{GameMap, Hex, HexCoord, Location};
pub use terrain::{Terrain, TerrainCatalog};
