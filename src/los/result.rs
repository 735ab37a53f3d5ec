//! Result of a LOS trace
//!
//! Collects hindrances as the trace walks the line and records the
//! first blocking point. Hindrances accumulate; a running total of six
//! or more blocks the LOS outright.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::map::HexCoord;

const BLOCKING_HINDRANCE_TOTAL: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HindranceKind {
    Terrain,
    Smoke,
    Vehicle,
    Oba,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hindrance {
    pub hex: HexCoord,
    pub point: (i32, i32),
    pub value: i32,
    pub kind: HindranceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blockage {
    pub at: (i32, i32),
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LosResult {
    range: i32,
    blocked: Option<Blockage>,
    los_is_horizontal: bool,
    los_is_60_degree: bool,
    source_exit_hexspine: Option<usize>,
    target_enter_hexspine: Option<usize>,
    continuous_slope: bool,
    hindrances: Vec<Hindrance>,
    // repeated pixel visits to a hex must not double-count it; the id
    // tells stacked counters sharing one hex apart
    counted: AHashSet<(HexCoord, HindranceKind, u32)>,
}

impl LosResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything for reuse on another trace.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn range(&self) -> i32 {
        self.range
    }

    pub fn set_range(&mut self, range: i32) {
        self.range = range;
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.is_some()
    }

    pub fn blockage(&self) -> Option<&Blockage> {
        self.blocked.as_ref()
    }

    pub fn set_blocked(&mut self, x: i32, y: i32, reason: &str) {
        if self.blocked.is_none() {
            self.blocked = Some(Blockage {
                at: (x, y),
                reason: reason.to_string(),
            });
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.los_is_horizontal
    }

    pub fn set_horizontal(&mut self, horizontal: bool) {
        self.los_is_horizontal = horizontal;
    }

    pub fn is_60_degree(&self) -> bool {
        self.los_is_60_degree
    }

    pub fn set_60_degree(&mut self, sixty: bool) {
        self.los_is_60_degree = sixty;
    }

    pub fn source_exit_hexspine(&self) -> Option<usize> {
        self.source_exit_hexspine
    }

    pub fn set_source_exit_hexspine(&mut self, hexspine: Option<usize>) {
        self.source_exit_hexspine = hexspine;
    }

    pub fn target_enter_hexspine(&self) -> Option<usize> {
        self.target_enter_hexspine
    }

    pub fn set_target_enter_hexspine(&mut self, hexspine: Option<usize>) {
        self.target_enter_hexspine = hexspine;
    }

    pub fn has_continuous_slope(&self) -> bool {
        self.continuous_slope
    }

    pub fn set_continuous_slope(&mut self, slope: bool) {
        self.continuous_slope = slope;
    }

    pub fn hindrances(&self) -> &[Hindrance] {
        &self.hindrances
    }

    pub fn total_hindrance(&self) -> i32 {
        self.hindrances.iter().map(|h| h.value).sum()
    }

    fn add(&mut self, hex: HexCoord, x: i32, y: i32, value: i32, kind: HindranceKind, id: u32) {
        if value <= 0 {
            return;
        }
        if !self.counted.insert((hex, kind, id)) {
            return;
        }
        self.hindrances.push(Hindrance {
            hex,
            point: (x, y),
            value,
            kind,
        });
        if self.total_hindrance() >= BLOCKING_HINDRANCE_TOTAL {
            self.set_blocked(x, y, "Hindrance total of six or more (B.10)");
        }
    }

    /// Terrain hindrances count once per hex no matter the value.
    pub fn add_terrain_hindrance(&mut self, hex: HexCoord, x: i32, y: i32, value: i32) {
        self.add(hex, x, y, value, HindranceKind::Terrain, 0);
    }

    /// The value is the capped per-location smoke total, recorded once
    /// per hex.
    pub fn add_smoke_hindrance(&mut self, hex: HexCoord, x: i32, y: i32, value: i32) {
        self.add(hex, x, y, value, HindranceKind::Smoke, 0);
    }

    pub fn add_vehicle_hindrance(&mut self, hex: HexCoord, x: i32, y: i32, value: i32) {
        self.add(hex, x, y, value, HindranceKind::Vehicle, 0);
    }

    /// Each artillery concentration counts once; `counter` tells stacked
    /// concentrations in the same hex apart.
    pub fn add_oba_hindrance(&mut self, hex: HexCoord, x: i32, y: i32, value: i32, counter: u32) {
        self.add(hex, x, y, value, HindranceKind::Oba, counter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_hindrance_counted_once_per_hex() {
        let mut result = LosResult::new();
        let hex = HexCoord::new(3, 3);
        result.add_terrain_hindrance(hex, 10, 10, 1);
        result.add_terrain_hindrance(hex, 11, 10, 1);
        result.add_terrain_hindrance(hex, 12, 10, 2);
        assert_eq!(result.total_hindrance(), 1);
    }

    #[test]
    fn test_hindrance_total_of_six_blocks() {
        let mut result = LosResult::new();
        for col in 0..5 {
            result.add_terrain_hindrance(HexCoord::new(col, 0), col, 0, 1);
        }
        assert!(!result.is_blocked());
        result.add_smoke_hindrance(HexCoord::new(5, 0), 5, 0, 1);
        assert!(result.is_blocked());
        let blockage = result.blockage().unwrap();
        assert_eq!(blockage.reason, "Hindrance total of six or more (B.10)");
    }

    #[test]
    fn test_stacked_oba_counters_each_count() {
        let mut result = LosResult::new();
        let hex = HexCoord::new(4, 4);
        result.add_oba_hindrance(hex, 8, 8, 1, 0);
        result.add_oba_hindrance(hex, 8, 8, 1, 1);
        // a repeated visit by the same counter does not count again
        result.add_oba_hindrance(hex, 9, 8, 1, 0);
        assert_eq!(result.total_hindrance(), 2);
    }

    #[test]
    fn test_first_blockage_wins() {
        let mut result = LosResult::new();
        result.set_blocked(5, 5, "Blocked by terrain");
        result.set_blocked(9, 9, "Blocked by elevation");
        assert_eq!(result.blockage().unwrap().at, (5, 5));
        assert_eq!(result.blockage().unwrap().reason, "Blocked by terrain");
    }

    #[test]
    fn test_reset_clears_state() {
        let mut result = LosResult::new();
        result.set_range(7);
        result.add_terrain_hindrance(HexCoord::new(1, 1), 2, 2, 3);
        result.set_blocked(4, 4, "Blocked");
        result.reset();
        assert_eq!(result.range(), 0);
        assert!(!result.is_blocked());
        assert_eq!(result.total_hindrance(), 0);
    }
}
