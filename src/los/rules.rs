//! The ordered battery of LOS rules
//!
//! Each rule inspects the current trace point and either vetoes the LOS
//! (returning true), records a hindrance, or passes. `apply_los_rules`
//! runs them in a fixed order; the first veto wins. Rules that depend on
//! counters consult the scenario through `GameQueries`.

use tracing::debug;

use crate::los::result::LosResult;
use crate::los::scenario::{NoCounters, Oba, Smoke};
use crate::los::status::LosStatus;
use crate::map::{range, GameMap, HexCoord, Location};
use crate::terrain::names;

/// Hindrance value of one intervening terrain hex.
const TERRAIN_HINDRANCE: i32 = 1;

type Rule = fn(&mut LosStatus, &mut LosResult) -> bool;

/// Rules that run at every traced point.
const ENTRY_RULES: [Rule; 6] = [
    check_depression_rule,
    check_building_restriction_rule,
    check_hexside_terrain_gate,
    check_hex_smoke_rule,
    check_vehicle_hindrance_rule,
    check_oba_hindrance_rule,
];

/// Rules gated behind the source/target-hex exemption.
const TERRAIN_RULES: [Rule; 8] = [
    check_bridge_hindrance_rule,
    check_ground_level_rule,
    check_split_terrain_rule,
    check_half_level_terrain_rule,
    check_terrain_height_rule,
    check_terrain_is_higher_rule,
    check_blind_hex_rule,
    check_hillock_rule,
];

fn block(status: &mut LosStatus, result: &mut LosResult, reason: &str) -> bool {
    status.reason = reason.to_string();
    status.blocked = true;
    result.set_blocked(status.current_col, status.current_row, reason);
    true
}

fn hex_base(status: &LosStatus, hex: HexCoord) -> i32 {
    status.map.hex(hex).map_or(0, |h| h.base_elevation())
}

fn hex_is_depression(status: &LosStatus, hex: HexCoord) -> bool {
    status.map.hex(hex).map_or(false, |h| h.is_depression_terrain())
}

/// Apply the full rule battery to the current point. Returns true when
/// the LOS is blocked.
pub fn apply_los_rules(status: &mut LosStatus, result: &mut LosResult) -> bool {
    // a terrain counter in the hex replaces the terrain under it
    if let Some(code) = status.scenario.terrain_override(status.temp_hex) {
        status.current_terrain = status.map.terrain(code);
    }
    status.current_terrain_height = status.current_terrain.height;

    if status.temp_hex != status.current_hex {
        let hex = status.temp_hex;
        status.enter_hex(hex);
    }

    for rule in ENTRY_RULES {
        if rule(status, result) {
            return true;
        }
    }

    // the current hex is exempt when it is the source or target hex and
    // the LOS runs from its center (a non-center location implies bypass
    // and may still be blocked)
    let in_source = status.current_hex == status.source_hex;
    let in_target = status.current_hex == status.target_hex;
    let exempt = (in_source && (status.current_terrain.is_open() || status.source.is_center_location()))
        || (in_target && (status.current_terrain.is_open() || status.target.is_center_location()));

    if !exempt {
        // ignore inherent terrain spilling in from an adjacent hex,
        // unless a terrain counter put it here
        if status.current_terrain.inherent {
            let center_code = status
                .map
                .hex(status.current_hex)
                .map(|h| h.center_location().terrain_code());
            if center_code != Some(status.current_terrain.code)
                && status.scenario.terrain_override(status.current_hex).is_none()
            {
                return false;
            }
        }

        for rule in TERRAIN_RULES {
            if rule(status, result) {
                return true;
            }
        }
    }

    if status.blocked {
        result.set_blocked(status.current_col, status.current_row, &status.reason);
        return true;
    }
    false
}

/// Elevation/range restrictions for a source or target inside a
/// depression.
pub fn check_depression_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    if status.exits_source_depression
        && status.ground_level > hex_base(status, status.current_hex)
    {
        return block(
            status,
            result,
            "Exits depression before range/elevation restrictions are satisfied (A6.3)",
        );
    }

    if status.enters_target_depression
        && status.range_to_source > (status.source_elevation - status.target_elevation)
        && !(hex_is_depression(status, status.current_hex)
            && status.ground_level == hex_base(status, status.current_hex))
    {
        return block(
            status,
            result,
            "Does not enter depression while range/elevation restrictions are satisfied (A6.3)",
        );
    }
    false
}

/// Units at different levels of the same building cannot see each other
/// through the building.
pub fn check_building_restriction_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    let target_in_building = status.map.terrain(status.target.terrain_code()).building;
    if !status.los_leaves_building
        && status.current_hex != status.source_hex
        && status.current_terrain.building
        && target_in_building
        && status.source_elevation != status.target_elevation
        && status.ground_level + status.current_terrain_height >= status.source_elevation
    {
        return block(
            status,
            result,
            "LOS must leave the building before leaving the source hex to see a location with a different elevation (A6.8 Example 2)",
        );
    }
    false
}

fn check_hexside_terrain_gate(status: &mut LosStatus, result: &mut LosResult) -> bool {
    if status.current_terrain.hexside && status.current_terrain.name != names::CLIFF {
        return check_hexside_terrain_rule(status, result);
    }
    false
}

/// Walls, hedges, bocage, rowhouse walls, and the entrenchment nuances
/// around them.
pub fn check_hexside_terrain_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    // hillock LOS handles hexsides itself
    if status.starts_on_hillock || status.ends_on_hillock {
        return false;
    }

    let map = status.map;
    let top = status.ground_level + status.current_terrain_height;

    if status.current_terrain.rowhouse_wall {
        let blocks = top > status.source_elevation && top > status.target_elevation
            || (top == status.source_elevation
                && top == status.target_elevation
                && status.current_terrain.half_level_height)
            || (top == status.source_elevation.max(status.target_elevation)
                && top > status.source_elevation.min(status.target_elevation));
        if blocks {
            return block(status, result, "Cannot see through rowhouse wall (B23.71)");
        }
        if is_blind_hex(status, status.current_terrain_height, false) {
            return block(status, result, "Source or Target location is in a blind hex");
        }
        return false;
    }

    let source_entrenched = map.terrain(status.source.terrain_code()).entrenchment;
    let target_entrenched = map.terrain(status.target.terrain_code()).entrenchment;

    if source_entrenched {
        if status.range > 1 && status.target_elevation <= status.source_elevation {
            return block(
                status,
                result,
                "Unit in entrenchment cannot see over hexside terrain to non-adjacent lower target (B27.2)",
            );
        }
        return false;
    }
    if target_entrenched {
        if status.range > 1 && status.target_elevation >= status.source_elevation {
            return block(
                status,
                result,
                "Cannot see non-adjacent unit in higher elevation entrenchment over hexside terrain (B27.2)",
            );
        }
        return false;
    }

    let nearest = match map.hex(status.current_hex) {
        Some(hex) => hex.nearest_location(status.current_col, status.current_row),
        None => return false,
    };
    let ignore = map.is_ignorable_hexside_terrain(
        status.source_hex,
        nearest,
        status.source_exit_hexspine,
    ) || map.is_ignorable_hexside_terrain(
        status.target_hex,
        nearest,
        status.target_enter_hexspine,
    );
    if ignore {
        return false;
    }

    if status.current_terrain.name == names::BOCAGE {
        let blocks = top > status.source_elevation && top > status.target_elevation
            || (top == status.source_elevation
                && top == status.target_elevation
                && status.current_terrain.half_level_height)
            || (top == status.source_elevation.max(status.target_elevation)
                && top > status.source_elevation.min(status.target_elevation)
                && !status.slopes);
        if blocks {
            return block(status, result, "Cannot see through/over bocage (B9.52)");
        }
        if is_blind_hex(status, status.current_terrain_height, false) {
            return block(
                status,
                result,
                "Source or Target location is in a blind hex (B9.52)",
            );
        }
        return false;
    }

    if status.ground_level == status.source_elevation
        && status.ground_level == status.target_elevation
        && !status.slopes
    {
        return block(status, result, "Intervening hexside terrain (11.51)");
    }
    false
}

fn location_in_smoke(location: &Location, smoke: &Smoke) -> bool {
    location.base_height() >= smoke.level
        && location.base_height() < smoke.level + smoke.height
}

fn smoke_absolute_base(map: &GameMap, smoke: &Smoke) -> i32 {
    map.hex(smoke.hex).map_or(0, |h| h.base_elevation()) + smoke.level
}

/// Smoke in the current hex hinders or, in quantity, blocks.
pub fn check_hex_smoke_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    let map = status.map;
    let hex = status.current_hex;
    let smoke_list = status.scenario.smoke_at(hex);
    if smoke_list.is_empty() {
        return false;
    }

    let source_height = map.absolute_height(status.source);
    let target_height = map.absolute_height(status.target);

    let mut hindrance = 0;
    let mut source_in_smoke = false;
    for s in smoke_list {
        let smoke_base = smoke_absolute_base(map, s);
        let smoke_top = smoke_base + s.height;
        if hex == status.source_hex {
            if location_in_smoke(status.source, s) {
                hindrance += s.hindrance + 1;
                source_in_smoke = true;
            } else if source_height == smoke_top && target_height < source_height {
                // shooting down through the smoke
                hindrance += s.hindrance;
            }
        } else if hex == status.target_hex {
            if location_in_smoke(status.source, s) {
                hindrance += s.hindrance;
            } else if target_height == smoke_top && source_height < target_height {
                hindrance += s.hindrance;
            }
        } else if source_height >= smoke_base
            && source_height < smoke_top
            && target_height >= smoke_base
            && target_height < smoke_top
        {
            hindrance += s.hindrance;
        } else if is_blind_hex(status, s.height, false) {
            // smoke tall enough to create a blind hex
            hindrance += s.hindrance;
        }
    }

    if hindrance > 0 {
        // at most 3 per location, 4 when the source is inside the smoke
        let cap = if source_in_smoke { 4 } else { 3 };
        hindrance = hindrance.min(cap);
        result.add_smoke_hindrance(hex, status.current_col, status.current_row, hindrance);
        return result.is_blocked();
    }
    false
}

/// A vehicle between two same-level units hinders if both have a clear
/// LOS to it.
pub fn check_vehicle_hindrance_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    let map = status.map;
    let hex = status.current_hex;
    let vehicles = status.scenario.vehicles_at(hex);
    if vehicles.is_empty() || hex == status.source_hex || hex == status.target_hex {
        return false;
    }

    let source_height = map.absolute_height(status.source);
    let target_height = map.absolute_height(status.target);

    let mut hindrance = 0;
    for v in vehicles {
        if source_height != target_height || source_height != map.absolute_height(&v.location) {
            continue;
        }

        // no hindrance when up-slope, or when both units are on hillocks
        // and the vehicle is not
        if status.slopes
            || (status.starts_on_hillock
                && status.ends_on_hillock
                && status.crossing_hillock.is_none())
        {
            return false;
        }

        // a vehicle in bypass only counts if the LOS crosses its hexside
        let at_traced_location = v.location.is_center_location()
            || map
                .hex(hex)
                .map_or(false, |h| {
                    h.nearest_location(status.current_col, status.current_row) == &v.location
                });
        if !at_traced_location {
            continue;
        }

        // both endpoints need their own LOS to the vehicle; counters are
        // left out of the sub-queries to keep the recursion finite
        let mut to_vehicle = LosResult::new();
        let mut from_vehicle = LosResult::new();
        map.los(
            status.source,
            status.use_aux_source,
            &v.location,
            false,
            &mut to_vehicle,
            &NoCounters,
        );
        map.los(
            status.target,
            status.use_aux_target,
            &v.location,
            false,
            &mut from_vehicle,
            &NoCounters,
        );
        if !to_vehicle.is_blocked() && !from_vehicle.is_blocked() {
            hindrance += 1;
        }
    }

    if hindrance > 0 {
        result.add_vehicle_hindrance(hex, status.current_col, status.current_row, hindrance);
        return result.is_blocked();
    }
    false
}

fn location_in_oba(map: &GameMap, location: &Location, oba: &Oba) -> bool {
    let center_base = map
        .hex(oba.hex)
        .map_or(0, |h| h.center_location().base_height());
    range(oba.hex, location.hex()) <= oba.blast_radius
        && location.base_height() >= center_base
        && location.base_height() < center_base + oba.blast_height
}

/// Artillery concentrations hinder anything traced through the blast
/// area.
pub fn check_oba_hindrance_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    let map = status.map;
    for (counter, oba) in status.scenario.oba().iter().enumerate() {
        if range(status.current_hex, oba.hex) > oba.blast_radius {
            continue;
        }

        let center_height = map
            .hex(oba.hex)
            .map_or(0, |h| map.absolute_height(h.center_location()));
        let source_height = map.absolute_height(status.source);
        let target_height = map.absolute_height(status.target);

        let applies = location_in_oba(map, status.source, oba)
            || location_in_oba(map, status.target, oba)
            || (source_height >= center_height
                && source_height < center_height + oba.blast_height
                && target_height >= center_height
                && target_height < center_height + oba.blast_height)
            || is_blind_hex(status, oba.blast_height, false);

        if applies {
            // each concentration counts once across repeated pixel visits
            result.add_oba_hindrance(
                oba.hex,
                status.current_col,
                status.current_row,
                oba.hindrance,
                counter as u32,
            );
            if result.is_blocked() {
                return true;
            }
        }
    }
    false
}

/// The off-road part of a bridge deck hinders same-level LOS.
pub fn check_bridge_hindrance_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    let Some(bridge) = status.map.hex(status.current_hex).and_then(|h| h.bridge()) else {
        return false;
    };
    if status.source_elevation == status.target_elevation
        && status.source_elevation == bridge.road_level
        && bridge.contains(status.current_col, status.current_row)
        && !bridge.road_contains(status.current_col, status.current_row)
    {
        return add_hindrance_hex(status, result);
    }
    false
}

/// Ground higher than both endpoints blocks.
pub fn check_ground_level_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    if status.ground_level > status.source_elevation
        && status.ground_level > status.target_elevation
    {
        return block(
            status,
            result,
            "Ground level is higher than both the source and target (43.4)",
        );
    }
    false
}

/// Terrain with two vertical parts, like orchards: the lower part has
/// its own LOS effect for same-level traces.
pub fn check_split_terrain_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    if !(status.current_terrain.split
        && status.ground_level == status.source_elevation
        && status.ground_level == status.target_elevation)
    {
        return false;
    }

    if status.slopes {
        if status.current_terrain.is_los_obstacle() {
            return block(status, result, "This terrain blocks LOS to up-slope location");
        }
        return add_hindrance_hex(status, result);
    }
    if status.current_terrain.lower_los_obstacle {
        return block(
            status,
            result,
            "This terrain blocks LOS to same elevation Source and Target",
        );
    }
    if status.current_terrain.lower_los_hindrance {
        return add_hindrance_hex(status, result);
    }
    false
}

/// Half-level terrain at the shared level of source and target.
pub fn check_half_level_terrain_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    // hillock special cases first
    if (hillock_rule_applicable(status) && !status.slopes)
        || hillock_hindrance_to_lower_elevation(status)
    {
        // at most one grain/brush hindrance
        let name = &status.current_terrain.name;
        if status.first_half_level_hindrance.is_none()
            && (name == names::BRUSH || name == names::GRAIN)
            && !(status.starts_on_hillock && status.ends_on_hillock)
        {
            status.first_half_level_hindrance = Some(status.current_hex);
            if add_hindrance_hex(status, result) {
                return true;
            }
        }
        return false;
    }

    if status.current_terrain.half_level_height
        && !status.current_terrain.hexside
        && status.ground_level + status.current_terrain_height == status.source_elevation
        && status.ground_level + status.current_terrain_height == status.target_elevation
        && !status.slopes
    {
        return apply_half_level_terrain(status, result);
    }
    false
}

fn apply_half_level_terrain(status: &mut LosStatus, result: &mut LosResult) -> bool {
    if status.current_terrain.is_los_obstacle() {
        return block(
            status,
            result,
            "Half level terrain is higher than both the source and target (43.4)",
        );
    }
    add_hindrance_hex(status, result)
}

/// Terrain level with the higher endpoint and above the lower one needs
/// a height advantage to see over.
pub fn check_terrain_height_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    let map = status.map;
    let top = status.ground_level + status.current_terrain_height;
    if !(top == status.source_elevation.max(status.target_elevation)
        && top > status.source_elevation.min(status.target_elevation))
    {
        return false;
    }

    // slopes and hillocks are handled by the blind hex rule
    if status.slopes || status.starts_on_hillock || status.ends_on_hillock {
        return false;
    }

    // exiting/entering gully restrictions already satisfied?
    let in_lifted_hex = status.ignore_ground_level_hex.map_or(false, |h| {
        map.hex(h)
            .map_or(false, |hex| hex.contains_extended(status.current_col, status.current_row))
    });
    if in_lifted_hex
        || (status.enters_target_depression && hex_is_depression(status, status.current_hex))
        || (status.exits_source_depression && hex_is_depression(status, status.current_hex))
    {
        return false;
    }

    // open ground spilling into the first hex of a water obstacle can be
    // ignored when looking into the water from an adjacent hex
    let current_center_water = map
        .hex(status.current_hex)
        .map_or(false, |h| map.terrain(h.center_location().terrain_code()).is_water_terrain());
    let target_center_water = map
        .hex(status.target_hex)
        .map_or(false, |h| map.terrain(h.center_location().terrain_code()).is_water_terrain());
    let source_center_water = map
        .hex(status.source_hex)
        .map_or(false, |h| map.terrain(h.center_location().terrain_code()).is_water_terrain());
    let water_exception = current_center_water
        && status.current_terrain.height < 1
        && ((status.range_to_source == 1
            && status.source_elevation > status.target_elevation
            && target_center_water)
            || (status.range_to_target == 1
                && status.target_elevation > status.source_elevation
                && source_center_water));
    if water_exception {
        return false;
    }

    if status.current_terrain.name == names::ORCHARD_OUT_OF_SEASON {
        return add_hindrance_hex(status, result);
    }
    block(
        status,
        result,
        "Must have a height advantage to see over this terrain (43.4)",
    )
}

/// Terrain higher than both endpoints blocks or hinders.
pub fn check_terrain_is_higher_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    // split terrain and bocage have their own rules
    if status.current_terrain.split
        && status.ground_level == status.source_elevation
        && status.ground_level == status.target_elevation
    {
        return false;
    }
    if status.current_terrain.name == names::BOCAGE {
        return false;
    }

    let top = status.ground_level + status.current_terrain_height;
    if top > status.source_elevation && top > status.target_elevation {
        if status.current_terrain.is_los_obstacle() {
            return block(
                status,
                result,
                "Terrain is higher than both the source and target (43.4)",
            );
        }
        return add_hindrance_hex(status, result);
    }
    false
}

/// Blind hexes behind obstacles between different elevations.
pub fn check_blind_hex_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    let map = status.map;
    let top = status.ground_level + status.current_terrain_height;
    let higher = status.source_elevation.max(status.target_elevation);
    let lower = status.source_elevation.min(status.target_elevation);

    // up-slope and hillock LOS can still be blocked by a blind hex even
    // when the obstacle is level with the higher endpoint
    if top == higher && top > lower {
        if (status.starts_on_hillock || status.slopes)
            && is_blind_hex(status, status.current_terrain_height, false)
        {
            return block(
                status,
                result,
                "Source or Target location is in a blind hex from an up-slope location (F2.3)",
            );
        }
    }

    // bocage blind hexes are handled by the hexside rule
    if status.current_terrain.name == names::BOCAGE {
        return false;
    }

    if !(top > lower && top < higher) {
        return false;
    }
    let cliff = map.nearest_hexside_is_cliff(status.current_col, status.current_row);
    if !is_blind_hex(status, status.current_terrain_height, cliff) {
        return false;
    }

    if status.current_terrain.is_los_obstacle() {
        // inherent terrain differing from the hex center is spill
        let center_code = map
            .hex(status.current_hex)
            .map(|h| h.center_location().terrain_code());
        if !status.current_terrain.inherent || center_code == Some(status.current_terrain.code) {
            return block(
                status,
                result,
                "Source or Target location is in a blind hex (7.4, 43.62)",
            );
        }
        return false;
    }

    // ground level alone can create the blind hex
    if status.ground_level > lower
        && status.ground_level < higher
        && is_blind_hex(status, 0, cliff)
    {
        return block(
            status,
            result,
            "Source or Target location is in a blind hex (B10.23)",
        );
    }

    // a hindrance in the blind hex, unless in the source/target hex
    if status.current_hex != status.target_hex && status.current_hex != status.source_hex {
        if status.current_terrain.name == names::ORCHARD_OUT_OF_SEASON {
            // out-of-season orchards give at most one such hindrance
            if status.range_to_target == 1 {
                return add_hindrance_hex(status, result);
            }
            return false;
        }
        return add_hindrance_hex(status, result);
    }
    false
}

fn hillock_rule_applicable(status: &LosStatus) -> bool {
    let top = status.ground_level + status.current_terrain_height;
    top == status.source_elevation
        && top == status.target_elevation
        && (status.crossing_hillock.is_some()
            || status.starts_on_hillock
            || status.ends_on_hillock
            || status.source_adjacent_hillock.is_some()
            || status.target_adjacent_hillock.is_some())
}

fn hillock_hindrance_to_lower_elevation(status: &LosStatus) -> bool {
    let top = status.ground_level + status.current_terrain_height;
    (status.starts_on_hillock
        && top == status.source_elevation
        && top > status.target_elevation)
        || (status.ends_on_hillock
            && top == status.target_elevation
            && top > status.source_elevation)
}

fn block_by_hillock(status: &mut LosStatus, result: &mut LosResult) -> bool {
    block(status, result, "Intervening hillock (F6.4)")
}

/// Hillocks, and the walls/rubble special cases around them. Supersedes
/// the half-level terrain rule when applicable.
pub fn check_hillock_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    if !hillock_rule_applicable(status) {
        return false;
    }
    let map = status.map;

    // both units on hillocks: always clear
    if status.starts_on_hillock && status.ends_on_hillock {
        return false;
    }

    if status.starts_on_hillock || status.ends_on_hillock {
        let crossed = status.crossed_hillocks.len() as i32;

        if status.starts_on_hillock
            && crossed - i32::from(status.target_adjacent_hillock.is_some())
                + i32::from(status.exits_slope_hexside())
                > 2
        {
            return block_by_hillock(status, result);
        }
        if status.ends_on_hillock
            && crossed - i32::from(status.source_adjacent_hillock.is_some())
                + i32::from(status.enters_slope_hexside())
                > 1
        {
            return block_by_hillock(status, result);
        }

        let name = status.current_terrain.name.clone();
        if name == names::WALL || name == names::HEDGE {
            let nearest = match map.hex(status.current_hex) {
                Some(hex) => hex
                    .nearest_location(status.current_col, status.current_row)
                    .clone(),
                None => return false,
            };

            match &status.first_wall_crossed {
                None => {
                    status.first_wall_crossed = Some(nearest);
                    status.first_wall_point = Some((status.current_col, status.current_row));
                }
                Some(first_wall) => {
                    // the same wall seen from either side is still the
                    // first wall
                    if !nearest.is_center_location() && &nearest == first_wall {
                        return false;
                    }
                    // pretend we are not on a hillock and let the
                    // hexside rule decide whether this wall blocks
                    let starts = status.starts_on_hillock;
                    let ends = status.ends_on_hillock;
                    status.starts_on_hillock = false;
                    status.ends_on_hillock = false;
                    let wall_blocks =
                        check_hexside_terrain_rule(status, &mut LosResult::new());
                    let far_enough = status.first_wall_point.map_or(false, |(px, py)| {
                        let dx = (px - status.current_col) as f64;
                        let dy = (py - status.current_row) as f64;
                        (dx * dx + dy * dy).sqrt() > 15.0
                    });
                    if wall_blocks && far_enough {
                        return block(
                            status,
                            result,
                            "More than one intervening wall/hedge (F6.4)",
                        );
                    }
                    status.starts_on_hillock = starts;
                    status.ends_on_hillock = ends;
                    status.blocked = false;
                    status.reason.clear();
                }
            }
            return false;
        }

        if name == names::STONE_RUBBLE || name == names::WOODEN_RUBBLE {
            if status.first_rubble_crossed != Some(status.current_hex) {
                return block(
                    status,
                    result,
                    "More than one intervening rubble hex (F6.4)",
                );
            }
        }
        return false;
    }

    // hillocks adjacent to a non-entrenched endpoint are ignored
    let source_entrenched = map.terrain(status.source.terrain_code()).entrenchment;
    let target_entrenched = map.terrain(status.target.terrain_code()).entrenchment;
    let in_source_adjacent = status
        .source_adjacent_hillock
        .and_then(|i| map.hillock(i))
        .map_or(false, |h| h.contains(status.current_hex));
    let in_target_adjacent = status
        .target_adjacent_hillock
        .and_then(|i| map.hillock(i))
        .map_or(false, |h| h.contains(status.current_hex));
    if (in_source_adjacent && !source_entrenched) || (in_target_adjacent && !target_entrenched) {
        return false;
    }

    if status.current_terrain.half_level_height && !status.current_terrain.hexside {
        return apply_half_level_terrain(status, result);
    }
    false
}

/// Is the far end of the trace in a blind hex behind an obstacle of the
/// given height? Swaps the endpoints so the LOS always falls.
pub fn is_blind_hex(status: &LosStatus, terrain_height: i32, is_cliff_hexside: bool) -> bool {
    let mut source_elevation = status.source_elevation;
    let mut target_elevation = status.target_elevation;
    let mut range_to_source = status.range_to_source;
    let mut range_to_target = status.range_to_target;
    let ground_level = status.ground_level;

    // not applicable to same-level LOS
    if source_elevation == target_elevation {
        return false;
    }

    if source_elevation < target_elevation {
        std::mem::swap(&mut source_elevation, &mut target_elevation);
        std::mem::swap(&mut range_to_source, &mut range_to_target);
    }

    // slopes and hillocks raise the effective source level when the
    // obstacle is level with the higher endpoint
    if (status.slopes || status.starts_on_hillock)
        && status.ground_level + status.current_terrain_height
            == status.source_elevation.max(status.target_elevation)
    {
        source_elevation += 1;
    }

    if terrain_height == 0 && !is_cliff_hexside {
        // crest line: the number of blind hexes grows with range
        range_to_target
            <= (2 * (ground_level + terrain_height) + range_to_source / 5
                - source_elevation
                - target_elevation)
                .max(0)
    } else if status.current_terrain.building && status.current_terrain.height > 1 {
        range_to_target <= 2
    } else if !status.current_terrain.is_open() {
        range_to_target <= 1
    } else {
        false
    }
}

/// Record a hindrance for the current hex if it lies strictly between
/// source and target.
pub fn add_hindrance_hex(status: &mut LosStatus, result: &mut LosResult) -> bool {
    if status.current_hex == status.source_hex || status.current_hex == status.target_hex {
        return false;
    }
    let total = range(status.source_hex, status.target_hex);
    if range(status.source_hex, status.current_hex) < total
        && range(status.target_hex, status.current_hex) < total
    {
        result.add_terrain_hindrance(
            status.current_hex,
            status.current_col,
            status.current_row,
            TERRAIN_HINDRANCE,
        );
        return result.is_blocked();
    }
    false
}

/// Same-hex LOS: building levels, stairways, and bridges.
pub fn check_same_hex_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    if status.source_hex != status.target_hex {
        return false;
    }
    let map = status.map;
    result.set_range(0);

    if !(status.source.is_center_location() || status.target.is_center_location()) {
        return false;
    }

    let source_terrain = map.terrain(status.source.terrain_code());
    let target_terrain = map.terrain(status.target.terrain_code());
    let (px, py) = status.source.los_point();

    if source_terrain.building && target_terrain.building {
        let has_stairway = map.hex(status.source_hex).map_or(false, |h| h.has_stairway());
        if (status.source.base_height() - status.target.base_height()).abs() > 1 || !has_stairway
        {
            result.set_blocked(px, py, "Crosses building level or no stairway");
            return true;
        }
    }

    if (source_terrain.bridge && status.target.is_center_location())
        || (target_terrain.bridge && status.source.is_center_location())
    {
        result.set_blocked(px, py, "Cannot see location under the bridge");
        return true;
    }

    // otherwise clear
    true
}

/// Smoke hindrances for LOS inside one hex.
pub fn check_same_hex_smoke_rule(status: &mut LosStatus, result: &mut LosResult) -> bool {
    if status.source_hex != status.target_hex {
        return false;
    }
    let smoke_list = status.scenario.smoke_at(status.source_hex);
    if !smoke_list.is_empty() {
        let mut hindrance = 0;
        for s in smoke_list {
            if location_in_smoke(status.source, s) {
                hindrance += s.hindrance + 1;
            }
            if location_in_smoke(status.target, s) {
                hindrance += s.hindrance;
            }
        }

        if hindrance >= 6 {
            result.set_blocked(
                status.source_x,
                status.source_y,
                "Hindrance total of six or more (B.10)",
            );
        } else if hindrance > 0 {
            result.add_smoke_hindrance(
                status.source_hex,
                status.source_x,
                status.source_y,
                hindrance,
            );
        }
    }
    if result.is_blocked() {
        debug!("same-hex smoke blocks LOS");
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::los::result::LosResult;
    use crate::los::scenario::NoCounters;
    use crate::los::status::LosStatus;
    use crate::terrain::TerrainCatalog;

    const QUIET: NoCounters = NoCounters;

    const WOODS: u8 = 3;
    const STONE_BUILDING_2: u8 = 13;

    fn geo_map() -> GameMap {
        GameMap::new(33, 10, TerrainCatalog::standard()).unwrap()
    }

    fn status_between<'a>(map: &'a GameMap, from: &str, to: &str) -> LosStatus<'a> {
        let source = map.hex_by_name(from).unwrap().center_location();
        let target = map.hex_by_name(to).unwrap().center_location();
        let mut result = LosResult::new();
        LosStatus::new(map, source, false, target, false, &QUIET, &mut result)
    }

    #[test]
    fn test_blind_hex_not_applicable_at_same_level() {
        let map = geo_map();
        let mut status = status_between(&map, "C5", "G5");
        status.source_elevation = 2;
        status.target_elevation = 2;
        status.ground_level = 1;
        status.range_to_source = 2;
        status.range_to_target = 2;
        assert!(!is_blind_hex(&status, 0, false));
    }

    #[test]
    fn test_crest_line_blind_hex_count() {
        // 2 * ground + range_to_source / 5 - 3 - 0 = 2 + 2 - 3 = 1
        let map = geo_map();
        let mut status = status_between(&map, "C5", "G5");
        status.source_elevation = 3;
        status.target_elevation = 0;
        status.ground_level = 1;
        status.current_terrain_height = 0;
        status.range_to_source = 10;

        status.range_to_target = 1;
        assert!(is_blind_hex(&status, 0, false));
        status.range_to_target = 2;
        assert!(!is_blind_hex(&status, 0, false));
    }

    #[test]
    fn test_crest_line_range_bonus_truncates() {
        // range_to_source 9 contributes 9 / 5 = 1, not 2
        let map = geo_map();
        let mut status = status_between(&map, "C5", "G5");
        status.source_elevation = 3;
        status.target_elevation = 0;
        status.ground_level = 1;
        status.current_terrain_height = 0;
        status.range_to_source = 9;
        status.range_to_target = 1;
        assert!(!is_blind_hex(&status, 0, false));
    }

    #[test]
    fn test_blind_hex_swaps_falling_los() {
        // the lower-to-higher trace matches the higher-to-lower one
        let map = geo_map();
        let mut status = status_between(&map, "C5", "G5");
        status.source_elevation = 0;
        status.target_elevation = 3;
        status.ground_level = 1;
        status.current_terrain_height = 0;
        status.range_to_source = 1;
        status.range_to_target = 10;
        assert!(is_blind_hex(&status, 0, false));
    }

    #[test]
    fn test_woods_casts_one_blind_hex() {
        let map = geo_map();
        let mut status = status_between(&map, "C5", "G5");
        status.current_terrain = map.terrain(WOODS);
        status.source_elevation = 2;
        status.target_elevation = 0;
        status.ground_level = 0;
        status.current_terrain_height = 1;
        status.range_to_source = 2;

        status.range_to_target = 1;
        assert!(is_blind_hex(&status, 1, false));
        status.range_to_target = 2;
        assert!(!is_blind_hex(&status, 1, false));
    }

    #[test]
    fn test_tall_building_casts_two_blind_hexes() {
        let map = geo_map();
        let mut status = status_between(&map, "C5", "G5");
        status.current_terrain = map.terrain(STONE_BUILDING_2);
        status.source_elevation = 3;
        status.target_elevation = 0;
        status.ground_level = 0;
        status.current_terrain_height = 2;
        status.range_to_source = 2;

        status.range_to_target = 2;
        assert!(is_blind_hex(&status, 2, false));
        status.range_to_target = 3;
        assert!(!is_blind_hex(&status, 2, false));
    }

    #[test]
    fn test_slope_raises_effective_source_level() {
        // crest at the source level: 2 * 2 - 2 - 0 = 2 without the slope,
        // one less with it
        let map = geo_map();
        let mut status = status_between(&map, "C5", "G5");
        status.source_elevation = 2;
        status.target_elevation = 0;
        status.ground_level = 2;
        status.current_terrain_height = 0;
        status.range_to_source = 4;
        status.range_to_target = 2;

        assert!(is_blind_hex(&status, 0, false));
        status.slopes = true;
        assert!(!is_blind_hex(&status, 0, false));
    }
}
