//! Mutable state carried along a single LOS trace
//!
//! Built once per query, then updated point by point as the tracer
//! walks the pixel line. Everything the rule battery needs to know
//! about where the trace currently is lives here.

use ahash::AHashSet;
use geo::{Intersects, Line};
use geo_types::Coord;

use crate::los::result::LosResult;
use crate::los::scenario::GameQueries;
use crate::map::{opposite_hexside, range, GameMap, HexCoord, Location, HEXSIDES};
use crate::terrain::{names, Terrain};

pub struct LosStatus<'a> {
    pub map: &'a GameMap,
    pub scenario: &'a dyn GameQueries,
    pub source: &'a Location,
    pub use_aux_source: bool,
    pub target: &'a Location,
    pub use_aux_target: bool,

    pub source_x: i32,
    pub source_y: i32,
    pub target_x: i32,
    pub target_y: i32,

    pub col_dir: i32,
    pub row_dir: i32,
    pub num_cols: i32,
    pub delta_y: f64,

    pub blocked: bool,
    pub reason: String,

    pub current_terrain: &'a Terrain,
    pub current_terrain_height: i32,
    pub ground_level: i32,

    pub source_hex: HexCoord,
    pub target_hex: HexCoord,
    pub current_hex: HexCoord,
    pub temp_hex: HexCoord,
    pub source_elevation: i32,
    pub target_elevation: i32,
    pub range: i32,
    pub range_to_source: i32,
    pub range_to_target: i32,

    pub continuous_slope: bool,
    pub los_leaves_building: bool,
    pub los_is_60_degree: bool,
    pub los_is_horizontal: bool,

    pub source_exit_hexsides: [Option<usize>; 2],
    pub target_enter_hexsides: [Option<usize>; 2],
    /// Hexspine the LOS leaves the source hex along, when on a hexspine
    pub source_exit_hexspine: Option<usize>,
    /// Hexspine the LOS enters the target hex along
    pub target_enter_hexspine: Option<usize>,

    // hillock bookkeeping (indices into the map's hillock list)
    pub starts_on_hillock: bool,
    pub ends_on_hillock: bool,
    pub crossing_hillock: Option<usize>,
    pub crossed_hillocks: AHashSet<usize>,
    pub source_adjacent_hillock: Option<usize>,
    pub target_adjacent_hillock: Option<usize>,
    pub first_wall_crossed: Option<Location>,
    pub first_wall_point: Option<(i32, i32)>,
    pub first_rubble_crossed: Option<HexCoord>,
    pub first_half_level_hindrance: Option<HexCoord>,

    /// Slope rules in effect (the higher location is up-slope)
    pub slopes: bool,

    /// Looking out of a depression with the elevation/range restriction
    /// not yet satisfied
    pub exits_source_depression: bool,
    pub ignore_ground_level_hex: Option<HexCoord>,
    /// Looking into a depression, reverse of the above
    pub enters_target_depression: bool,

    // grid column entry/exit rows
    pub enter: f64,
    pub exit: f64,
    pub current_col: i32,
    pub current_row: i32,

    pub slope: f64,
}

impl<'a> LosStatus<'a> {
    pub fn new(
        map: &'a GameMap,
        source: &'a Location,
        use_aux_source: bool,
        target: &'a Location,
        use_aux_target: bool,
        scenario: &'a dyn GameQueries,
        result: &mut LosResult,
    ) -> Self {
        let (source_x, source_y) = source.aiming_point(use_aux_source);
        let (target_x, target_y) = target.aiming_point(use_aux_target);

        let col_dir = if target_x - source_x < 0 { -1 } else { 1 };
        let row_dir = if target_y - source_y < 0 { -1 } else { 1 };
        let num_cols = (target_x - source_x).abs() + 1;

        let source_hex = source.hex();
        let target_hex = target.hex();
        let source_elevation = map.absolute_height(source);
        let target_elevation = map.absolute_height(target);
        let los_range = range(source_hex, target_hex);

        let source_center_terrain = map
            .hex(source_hex)
            .map(|h| map.terrain(h.center_location().terrain_code()));
        let los_leaves_building = !source_center_terrain.map_or(false, |t| t.building);

        let delta_y = (target_y - source_y) as f64 / num_cols as f64;

        // looking out of a depression at a higher elevation before the
        // elevation/range restriction is satisfied
        let exits_source_depression = source.is_depression_terrain()
            && (target_elevation < source_elevation
                || (target_elevation - source_elevation > 0
                    && target_elevation - source_elevation < los_range)
                || (target.is_depression_terrain() && target_elevation == source_elevation));

        let enters_target_depression = target.is_depression_terrain()
            && source_elevation - target_elevation > 0
            && source_elevation - target_elevation < los_range;

        let enter = source_y as f64;
        let exit = enter + delta_y;

        result.set_range(los_range);

        let los_is_horizontal = source_y == target_y;
        result.set_horizontal(los_is_horizontal);

        let slope = ((source_y - target_y) as f64 / (source_x - target_x) as f64).abs();

        // compensate for the fuzzy geometry of scanned board art
        let tolerance = if los_range <= 15 { 0.03 } else { 0.015 };
        let los_is_60_degree = (slope - 60f64.to_radians().tan()).abs() < tolerance;
        result.set_60_degree(los_is_60_degree);

        let (source_exit_hexspine, target_enter_hexspine) = if los_is_60_degree {
            match (col_dir, row_dir) {
                (1, 1) => (Some(3), Some(0)),
                (1, _) => (Some(1), Some(4)),
                (_, 1) => (Some(4), Some(1)),
                _ => (Some(0), Some(3)),
            }
        } else if slope == 0.0 {
            if col_dir == 1 {
                (Some(2), Some(5))
            } else {
                (Some(5), Some(2))
            }
        } else {
            (None, None)
        };
        result.set_source_exit_hexspine(source_exit_hexspine);
        result.set_target_enter_hexspine(target_enter_hexspine);

        let mut status = LosStatus {
            map,
            scenario,
            source,
            use_aux_source,
            target,
            use_aux_target,
            source_x,
            source_y,
            target_x,
            target_y,
            col_dir,
            row_dir,
            num_cols,
            delta_y,
            blocked: false,
            reason: String::new(),
            current_terrain: map.terrain(0),
            current_terrain_height: 0,
            ground_level: -9999,
            source_hex,
            target_hex,
            current_hex: source_hex,
            temp_hex: source_hex,
            source_elevation,
            target_elevation,
            range: los_range,
            range_to_source: 0,
            range_to_target: los_range,
            continuous_slope: true,
            los_leaves_building,
            los_is_60_degree,
            los_is_horizontal,
            source_exit_hexsides: [None, None],
            target_enter_hexsides: [None, None],
            source_exit_hexspine,
            target_enter_hexspine,
            starts_on_hillock: false,
            ends_on_hillock: false,
            crossing_hillock: None,
            crossed_hillocks: AHashSet::new(),
            source_adjacent_hillock: None,
            target_adjacent_hillock: None,
            first_wall_crossed: None,
            first_wall_point: None,
            first_rubble_crossed: None,
            first_half_level_hindrance: None,
            slopes: false,
            exits_source_depression,
            ignore_ground_level_hex: None,
            enters_target_depression,
            enter,
            exit,
            current_col: source_x,
            current_row: source_y,
            slope,
        };

        status.set_enter_exit_hexsides();

        // slope rules are in effect if the higher location is up-slope
        status.slopes = (status.exits_slope_hexside()
            && source_elevation >= target_elevation)
            || (status.enters_slope_hexside() && target_elevation >= source_elevation);

        status.starts_on_hillock =
            map.terrain(source.terrain_code()).name == names::HILLOCK || status.slopes;
        status.ends_on_hillock = map.terrain(target.terrain_code()).name == names::HILLOCK;
        if status.starts_on_hillock {
            status.crossing_hillock = map.hillock_of(source_hex);
        }
        status.set_adjacent_to_hillock();

        status
    }

    pub fn hex_terrain_name(&self, hex: HexCoord) -> &str {
        match self.map.hex(hex) {
            Some(h) => &self.map.terrain(h.center_location().terrain_code()).name,
            None => "",
        }
    }

    /// Does the LOS exit the source hex via a slope hexside?
    pub fn exits_slope_hexside(&self) -> bool {
        let Some(hex) = self.map.hex(self.source_hex) else { return false };
        self.source_exit_hexsides
            .iter()
            .flatten()
            .any(|&s| hex.has_slope(s))
    }

    /// Does the LOS enter the target hex via a slope hexside?
    pub fn enters_slope_hexside(&self) -> bool {
        let Some(hex) = self.map.hex(self.target_hex) else { return false };
        self.target_enter_hexsides
            .iter()
            .flatten()
            .any(|&s| hex.has_slope(s))
    }

    /// Adjust the hillock bookkeeping when the trace enters a new hex.
    pub fn update_hillock_status(&mut self) {
        let hillock = self.map.hillock_of(self.current_hex);

        match (self.crossing_hillock, hillock) {
            (Some(crossing), None) => {
                self.crossed_hillocks.insert(crossing);
                self.crossing_hillock = None;
            }
            (None, Some(h)) => {
                self.crossing_hillock = Some(h);
            }
            _ => {}
        }

        // rubble is inherent terrain, so the hex attribution is safe here
        let name = &self.current_terrain.name;
        if (name == names::STONE_RUBBLE || name == names::WOODEN_RUBBLE)
            && self.hex_terrain_name(self.current_hex) == *name
            && self.first_rubble_crossed.is_none()
        {
            self.first_rubble_crossed = Some(self.current_hex);
        }
    }

    fn adjacent_hillock_via(&self, hex: HexCoord, hexside: Option<usize>) -> Option<usize> {
        let side = hexside?;
        let adjacent = self.map.adjacent_hex(hex, side)?;
        if self.hex_terrain_name(adjacent.coord()) == names::HILLOCK {
            self.map.hillock_of(adjacent.coord())
        } else {
            None
        }
    }

    fn set_adjacent_to_hillock(&mut self) {
        if !self.starts_on_hillock {
            for side in self.source_exit_hexsides {
                if let Some(h) = self.adjacent_hillock_via(self.source_hex, side) {
                    self.source_adjacent_hillock = Some(h);
                }
            }
        }
        if !self.ends_on_hillock {
            for side in self.target_enter_hexsides {
                if let Some(h) = self.adjacent_hillock_via(self.target_hex, side) {
                    self.target_adjacent_hillock = Some(h);
                }
            }
        }
    }

    /// Which hexsides the LOS exits the source hex and enters the target
    /// hex through. Two values when leaving along a hexspine.
    fn set_enter_exit_hexsides(&mut self) {
        if self.source.is_center_location() {
            self.source_exit_hexsides = self.exit_from_center_hexsides();
        } else {
            self.source_exit_hexsides = self.crossed_hexside_pair(self.source_hex);
        }

        if self.target.is_center_location() {
            // the opposite of the exit logic
            let exits = self.exit_from_center_hexsides();
            self.target_enter_hexsides = [
                exits[0].map(opposite_hexside),
                exits[1].map(opposite_hexside),
            ];
        } else {
            self.target_enter_hexsides = self.crossed_hexside_pair(self.target_hex);
        }
    }

    fn crossed_hexside_pair(&self, hex: HexCoord) -> [Option<usize>; 2] {
        let mut hexsides = self.hexsides_crossed(hex);
        // a LOS ending on a vertex touches extra hexsides; drop them
        if hexsides.len() > 2 {
            self.remove_vertex_hexsides(hex, &mut hexsides);
        }
        let mut pair = [None, None];
        let mut iter = hexsides.into_iter();
        pair[0] = iter.next();
        pair[1] = iter.next();
        pair
    }

    /// The hexsides the LOS would exit the source hex through when the
    /// source is the hex center.
    fn exit_from_center_hexsides(&self) -> [Option<usize>; 2] {
        if self.source_x == self.target_x {
            // vertical LOS
            return if self.source_y > self.target_y {
                [Some(0), None]
            } else {
                [Some(3), None]
            };
        }

        let signed_slope =
            (self.source_y - self.target_y) as f64 / (self.source_x - self.target_x) as f64;

        if self.los_is_horizontal {
            if self.col_dir == 1 {
                [Some(1), Some(2)]
            } else {
                [Some(4), Some(5)]
            }
        } else if self.los_is_60_degree {
            if self.col_dir == 1 {
                if signed_slope > 0.0 {
                    [Some(2), Some(3)]
                } else {
                    [Some(0), Some(1)]
                }
            } else if signed_slope > 0.0 {
                [Some(5), Some(0)]
            } else {
                [Some(3), Some(4)]
            }
        } else {
            let hexsides = self.hexsides_crossed(self.source_hex);
            [hexsides.first().copied(), None]
        }
    }

    /// All hexsides of a hex whose extended-border edge intersects the
    /// LOS line, in hexside order.
    fn hexsides_crossed(&self, hex: HexCoord) -> Vec<usize> {
        let Some(hex) = self.map.hex(hex) else { return Vec::new() };
        let los = Line::new(
            Coord {
                x: self.source_x as f64,
                y: self.source_y as f64,
            },
            Coord {
                x: self.target_x as f64,
                y: self.target_y as f64,
            },
        );

        hex.extended_border()
            .exterior()
            .lines()
            .enumerate()
            .filter(|(_, edge)| edge.intersects(&los))
            .map(|(side, _)| side % HEXSIDES)
            .collect()
    }

    /// Drop hexsides whose vertex coincides with a LOS end point.
    fn remove_vertex_hexsides(&self, hex: HexCoord, hexsides: &mut Vec<usize>) {
        let Some(hex) = self.map.hex(hex) else { return };
        hexsides.retain(|&side| {
            let location = hex.hexside_location(side);
            let points = [location.los_point(), location.aux_los_point()];
            !points.contains(&(self.source_x, self.source_y))
                && !points.contains(&(self.target_x, self.target_y))
        });
    }

    /// Lift the depression exit restriction and update per-hex state when
    /// the trace enters a new hex.
    pub fn enter_hex(&mut self, hex: HexCoord) {
        self.current_hex = hex;
        self.range_to_source = range(self.current_hex, self.source_hex);
        self.range_to_target = range(self.current_hex, self.target_hex);

        let current = self.map.hex(hex);
        let base_elevation = current.map_or(0, |h| h.base_elevation());
        let is_depression = current.map_or(false, |h| h.is_depression_terrain());

        // still continuous slope?
        if (self.source_elevation - base_elevation).abs() != self.range_to_source {
            self.continuous_slope = false;
        }

        if self.exits_source_depression {
            let satisfied_inside = is_depression
                && self.target_elevation - base_elevation >= self.range_to_target;
            // or the LOS leaves the depression because the hex elevation
            // dropped to the level of the depression floor
            let leaves_low = !is_depression && base_elevation <= self.source_elevation;
            if satisfied_inside || leaves_low {
                self.ignore_ground_level_hex = Some(hex);
                self.exits_source_depression = false;
            }
        }

        self.update_hillock_status();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::los::result::LosResult;
    use crate::los::scenario::NoCounters;
    use crate::terrain::TerrainCatalog;

    fn geo_map() -> GameMap {
        GameMap::new(33, 10, TerrainCatalog::standard()).unwrap()
    }

    fn status_between<'a>(
        map: &'a GameMap,
        source: &'a Location,
        target: &'a Location,
        result: &mut LosResult,
    ) -> LosStatus<'a> {
        static NO_COUNTERS: NoCounters = NoCounters;
        LosStatus::new(map, source, false, target, false, &NO_COUNTERS, result)
    }

    #[test]
    fn test_horizontal_los_classified() {
        let map = geo_map();
        let source = map.hex_by_name("C5").unwrap().center_location().clone();
        let target = map.hex_by_name("I5").unwrap().center_location().clone();
        let mut result = LosResult::new();
        let status = status_between(&map, &source, &target, &mut result);
        assert!(status.los_is_horizontal);
        assert!(!status.los_is_60_degree);
        assert_eq!(result.source_exit_hexspine(), Some(2));
        assert_eq!(result.target_enter_hexspine(), Some(5));
    }

    #[test]
    fn test_vertical_los_exit_hexsides() {
        let map = geo_map();
        let source = map.hex_by_name("E5").unwrap().center_location().clone();
        let target = map.hex_by_name("E2").unwrap().center_location().clone();
        let mut result = LosResult::new();
        let status = status_between(&map, &source, &target, &mut result);
        assert_eq!(status.source_exit_hexsides, [Some(0), None]);
        assert_eq!(status.target_enter_hexsides, [Some(3), None]);
    }

    #[test]
    fn test_range_set_on_result() {
        let map = geo_map();
        let source = map.hex_by_name("A1").unwrap().center_location().clone();
        let target = map.hex_by_name("F3").unwrap().center_location().clone();
        let mut result = LosResult::new();
        let status = status_between(&map, &source, &target, &mut result);
        assert_eq!(result.range(), status.range);
        assert_eq!(status.range, range(source.hex(), target.hex()));
    }

    #[test]
    fn test_sixty_degree_los() {
        let map = geo_map();
        // one column over, one and a half hexes down: along a hexspine
        let source = map.hex_by_name("D5").unwrap().center_location().clone();
        let target = map.hex_by_name("F8").unwrap().center_location().clone();
        let mut result = LosResult::new();
        let status = status_between(&map, &source, &target, &mut result);
        assert!(status.los_is_60_degree);
        assert_eq!(result.source_exit_hexspine(), Some(3));
        assert_eq!(result.target_enter_hexspine(), Some(0));
    }

    #[test]
    fn test_depression_restrictions_inactive_on_level_ground() {
        let map = geo_map();
        let source = map.hex_by_name("B2").unwrap().center_location().clone();
        let target = map.hex_by_name("H7").unwrap().center_location().clone();
        let mut result = LosResult::new();
        let status = status_between(&map, &source, &target, &mut result);
        assert!(!status.exits_source_depression);
        assert!(!status.enters_target_depression);
        assert!(!status.slopes);
        assert!(!status.starts_on_hillock);
    }
}
