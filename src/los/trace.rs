//! The LOS tracer
//!
//! Walks the pixel line between two aiming points column by column,
//! running the rule battery at every grid point. A LOS exactly along a
//! hexside or hexspine touches two hexes at once and both get checked.

use crate::los::result::LosResult;
use crate::los::rules::{apply_los_rules, check_same_hex_rule, check_same_hex_smoke_rule};
use crate::los::scenario::GameQueries;
use crate::los::status::LosStatus;
use crate::map::{range, GameMap, HexCoord, Location, HEXSIDES};
use crate::terrain::names;

impl GameMap {
    /// Trace the LOS between two locations, filling `result` with the
    /// range, hindrances, and first blockage. Aux aiming points select
    /// the far vertex of a hexside location.
    pub fn los(
        &self,
        source: &Location,
        use_aux_source: bool,
        target: &Location,
        use_aux_target: bool,
        result: &mut LosResult,
        scenario: &dyn GameQueries,
    ) {
        result.reset();

        if source == target {
            result.set_range(0);
            return;
        }

        let mut status = LosStatus::new(
            self,
            source,
            use_aux_source,
            target,
            use_aux_target,
            scenario,
            result,
        );

        if check_same_hex_smoke_rule(&mut status, result) {
            return;
        }
        if check_same_hex_rule(&mut status, result) {
            return;
        }

        status.current_col = status.source_x;
        for col in 0..status.num_cols {
            status.current_row = status.enter as i32;
            let num_rows = (status.exit as i32 - status.enter as i32).abs() + 1;

            for _ in 0..num_rows {
                let x = status.current_col;
                let y = status.current_row;
                status.current_terrain = self.grid_terrain(x, y);
                status.ground_level = self.grid_elevation(x, y);

                // the hex this point belongs to; the extended borders of
                // the end hexes win over the seam arithmetic
                status.temp_hex = if self
                    .hex(status.source_hex)
                    .map_or(false, |h| h.contains_extended(x, y))
                {
                    status.source_hex
                } else if self
                    .hex(status.target_hex)
                    .map_or(false, |h| h.contains_extended(x, y))
                {
                    status.target_hex
                } else {
                    self.point_to_hex(x, y)
                        .map_or(status.temp_hex, |h| h.coord())
                };

                if !status.los_leaves_building && !status.current_terrain.building {
                    status.los_leaves_building = true;
                }

                // a LOS along a hexside touches the hexes on both sides
                let adjacent = if status.los_is_horizontal || status.los_is_60_degree {
                    self.adjacent_hexside_hexes(&status, status.temp_hex)
                } else {
                    None
                };

                match adjacent {
                    None => {
                        if apply_los_rules(&mut status, result) {
                            return;
                        }
                    }
                    Some((near, far)) => {
                        for hex in [near, far] {
                            let touches = self
                                .hex(hex)
                                .map_or(false, |h| h.contains_extended(x, y));
                            if touches && self.check_los_on_hexside_rule(&mut status, result, hex)
                            {
                                return;
                            }
                        }
                    }
                }

                status.current_row += status.row_dir;
            }

            status.enter = status.exit;
            status.current_col += status.col_dir;
            if col + 1 == status.num_cols {
                status.exit = status.target_y as f64;
            } else {
                status.exit += status.delta_y;
            }
        }

        result.set_continuous_slope(status.continuous_slope);
    }

    /// The two hexes touched by a LOS running along a hexside, or None
    /// when the point is not truly on a hexside.
    fn adjacent_hexside_hexes(
        &self,
        status: &LosStatus,
        range_hex: HexCoord,
    ) -> Option<(HexCoord, HexCoord)> {
        let x = status.current_col;
        let y = status.current_row;

        let in_end_hex = self
            .hex(status.source_hex)
            .map_or(false, |h| h.contains_extended(x, y))
            || self
                .hex(status.target_hex)
                .map_or(false, |h| h.contains_extended(x, y));
        // from a hex center the LOS only runs along hexsides at odd range
        if in_end_hex
            || (status.source.is_center_location()
                && range(status.source_hex, range_hex) % 2 == 0)
        {
            return None;
        }

        for side in 0..HEXSIDES {
            if let Some(adjacent) = self.adjacent_hex(range_hex, side) {
                if adjacent.contains_extended(x, y) {
                    let coord = adjacent.coord();
                    // pairs including an end hex get the normal treatment
                    if coord != status.source_hex && coord != status.target_hex {
                        return Some((range_hex, coord));
                    }
                }
            }
        }
        None
    }

    /// Check one of the two hexes touched by a LOS along a hexside.
    fn check_los_on_hexside_rule<'a>(
        &'a self,
        status: &mut LosStatus<'a>,
        result: &mut LosResult,
        hex: HexCoord,
    ) -> bool {
        status.temp_hex = hex;

        // the end hexes are handled by the ordinary battery
        if hex == status.source_hex || hex == status.target_hex {
            return false;
        }

        let center_code = match self.hex(hex) {
            Some(h) => h.center_location().terrain_code(),
            None => return false,
        };
        let center = self.terrain(center_code);

        // hexside terrain on a hex with inherent terrain gets checked
        // before the inherent terrain replaces it
        if status.current_terrain.hexside && center.inherent {
            if apply_los_rules(status, result) {
                return true;
            }
        }

        if center.inherent {
            // water along a dense jungle or bamboo edge stays water
            let water_edge = (center.name == names::DENSE_JUNGLE
                || center.name == names::BAMBOO)
                && status.current_terrain.is_water_terrain();
            if !water_edge {
                status.current_terrain = center;
            }
        }

        apply_los_rules(status, result)
    }
}
