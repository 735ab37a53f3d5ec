//! End-to-end LOS scenarios on a standard geomorphic-sized board
//!
//! Each test paints terrain or elevation into the raster, rebuilds the
//! hex summaries, and traces a LOS between hex centers.

use hexsight::map::range;
use hexsight::{
    GameMap, Location, LosResult, NoCounters, Oba, ScenarioState, Smoke, TerrainCatalog, Vehicle,
};

const WOODS: u8 = 3;
const GRAIN: u8 = 1;
const WALL: u8 = 7;
const GULLY: u8 = 18;
const STONE_BUILDING: u8 = 12;

fn geo_map() -> GameMap {
    GameMap::new(33, 10, TerrainCatalog::standard()).unwrap()
}

fn center(map: &GameMap, name: &str) -> Location {
    map.hex_by_name(name).unwrap().center_location().clone()
}

/// Paint a small patch of terrain around the hex center, enough to cover
/// the pixels a LOS through the center crosses.
fn paint_hex_center(map: &mut GameMap, name: &str, code: u8) {
    let (x, y) = map.hex_by_name(name).unwrap().center_location().los_point();
    map.fill_terrain(x - 5, y - 5, 11, 11, code).unwrap();
}

fn raise_hex_center(map: &mut GameMap, name: &str, elevation: i32) {
    let (x, y) = map.hex_by_name(name).unwrap().center_location().los_point();
    map.fill_elevation(x - 5, y - 5, 11, 11, elevation).unwrap();
}

fn trace(map: &GameMap, from: &str, to: &str) -> LosResult {
    trace_with(map, from, to, &NoCounters)
}

fn trace_with(
    map: &GameMap,
    from: &str,
    to: &str,
    scenario: &dyn hexsight::GameQueries,
) -> LosResult {
    let source = center(map, from);
    let target = center(map, to);
    let mut result = LosResult::new();
    map.los(&source, false, &target, false, &mut result, scenario);
    result
}

#[test]
fn test_open_ground_long_range_is_clear() {
    let map = geo_map();
    let result = trace(&map, "A1", "Z5");
    assert!(!result.is_blocked(), "{:?}", result.blockage());
    assert_eq!(result.total_hindrance(), 0);
}

#[test]
fn test_woods_blocks_same_level_los() {
    let mut map = geo_map();
    paint_hex_center(&mut map, "E5", WOODS);
    map.reset_hex_terrain();

    let result = trace(&map, "C5", "G5");
    assert!(result.is_blocked());
    assert_eq!(result.range(), 4);
}

#[test]
fn test_grain_hinders_but_does_not_block() {
    let mut map = geo_map();
    paint_hex_center(&mut map, "E5", GRAIN);
    map.reset_hex_terrain();

    let result = trace(&map, "C5", "G5");
    assert!(!result.is_blocked(), "{:?}", result.blockage());
    assert_eq!(result.total_hindrance(), 1);
}

#[test]
fn test_higher_ground_blocks_same_level_los() {
    let mut map = geo_map();
    raise_hex_center(&mut map, "E5", 1);
    map.reset_hex_terrain();

    let result = trace(&map, "C5", "G5");
    assert!(result.is_blocked());
}

#[test]
fn test_height_advantage_sees_over_woods() {
    let mut map = geo_map();
    raise_hex_center(&mut map, "C5", 2);
    paint_hex_center(&mut map, "E5", WOODS);
    map.reset_hex_terrain();

    let result = trace(&map, "C5", "G5");
    assert!(!result.is_blocked(), "{:?}", result.blockage());
}

#[test]
fn test_woods_level_with_viewer_blocks() {
    let mut map = geo_map();
    raise_hex_center(&mut map, "C5", 1);
    paint_hex_center(&mut map, "E5", WOODS);
    map.reset_hex_terrain();

    let result = trace(&map, "C5", "G5");
    assert!(result.is_blocked());
}

#[test]
fn test_wall_blocks_same_level_los() {
    let mut map = geo_map();
    let (x, y) = map.hex_by_name("E3").unwrap().hexside_midpoint(3);
    let (x, y) = (x.round() as i32, y.round() as i32);
    map.fill_terrain(x - 5, y - 5, 11, 11, WALL).unwrap();
    map.reset_hex_terrain();

    let result = trace(&map, "E2", "E5");
    assert!(result.is_blocked());
    assert!(result
        .blockage()
        .unwrap()
        .reason
        .contains("hexside terrain"));
}

#[test]
fn test_wall_ignored_between_adjacent_hexes() {
    let mut map = geo_map();
    let (x, y) = map.hex_by_name("E3").unwrap().hexside_midpoint(3);
    let (x, y) = (x.round() as i32, y.round() as i32);
    map.fill_terrain(x - 5, y - 5, 11, 11, WALL).unwrap();
    map.reset_hex_terrain();

    let result = trace(&map, "E3", "E4");
    assert!(!result.is_blocked(), "{:?}", result.blockage());
}

#[test]
fn test_gully_target_only_visible_from_adjacent_hex() {
    let mut map = geo_map();
    paint_hex_center(&mut map, "E5", GULLY);
    map.reset_hex_terrain();

    // a one-level advantage does not cover range 4
    let far = trace(&map, "A5", "E5");
    assert!(far.is_blocked());

    let near = trace(&map, "C5", "E5");
    assert!(near.is_blocked());

    // adjacent hexes see into the gully
    let adjacent = trace(&map, "D5", "E5");
    assert!(!adjacent.is_blocked(), "{:?}", adjacent.blockage());
}

#[test]
fn test_smoke_in_intermediate_hex_hinders() {
    let mut map = geo_map();
    map.reset_hex_terrain();
    let e5 = map.hex_by_name("E5").unwrap().coord();

    let mut scenario = ScenarioState::new();
    scenario.add_smoke(Smoke::new(e5, 0, 2, 2));

    let result = trace_with(&map, "C5", "G5", &scenario);
    assert!(!result.is_blocked(), "{:?}", result.blockage());
    assert_eq!(result.total_hindrance(), 2);
}

#[test]
fn test_smoke_in_source_hex_adds_one() {
    let mut map = geo_map();
    map.reset_hex_terrain();
    let c5 = map.hex_by_name("C5").unwrap().coord();

    let mut scenario = ScenarioState::new();
    scenario.add_smoke(Smoke::new(c5, 0, 2, 2));

    let result = trace_with(&map, "C5", "G5", &scenario);
    assert!(!result.is_blocked(), "{:?}", result.blockage());
    assert_eq!(result.total_hindrance(), 3);
}

#[test]
fn test_smoke_hindrance_caps_at_three_per_location() {
    let mut map = geo_map();
    map.reset_hex_terrain();
    let e5 = map.hex_by_name("E5").unwrap().coord();

    let mut scenario = ScenarioState::new();
    scenario.add_smoke(Smoke::new(e5, 0, 2, 3));
    scenario.add_smoke(Smoke::new(e5, 0, 2, 3));

    let result = trace_with(&map, "C5", "G5", &scenario);
    assert!(!result.is_blocked(), "{:?}", result.blockage());
    assert_eq!(result.total_hindrance(), 3);
}

#[test]
fn test_source_smoke_hindrance_caps_at_four() {
    let mut map = geo_map();
    map.reset_hex_terrain();
    let c5 = map.hex_by_name("C5").unwrap().coord();

    let mut scenario = ScenarioState::new();
    scenario.add_smoke(Smoke::new(c5, 0, 2, 3));
    scenario.add_smoke(Smoke::new(c5, 0, 2, 3));

    let result = trace_with(&map, "C5", "G5", &scenario);
    assert!(!result.is_blocked(), "{:?}", result.blockage());
    assert_eq!(result.total_hindrance(), 4);
}

#[test]
fn test_hindrance_total_of_six_blocks() {
    let mut map = geo_map();
    map.reset_hex_terrain();
    let e5 = map.hex_by_name("E5").unwrap().coord();
    let g5 = map.hex_by_name("G5").unwrap().coord();

    let mut scenario = ScenarioState::new();
    scenario.add_smoke(Smoke::new(e5, 0, 2, 3));
    scenario.add_smoke(Smoke::new(g5, 0, 2, 3));

    let result = trace_with(&map, "C5", "K5", &scenario);
    assert!(result.is_blocked());
    assert_eq!(
        result.blockage().unwrap().reason,
        "Hindrance total of six or more (B.10)"
    );
}

#[test]
fn test_vehicle_between_same_level_units_hinders() {
    let mut map = geo_map();
    map.reset_hex_terrain();
    let vehicle = Vehicle::new(center(&map, "E5"));

    let mut scenario = ScenarioState::new();
    scenario.add_vehicle(vehicle);

    let result = trace_with(&map, "C5", "G5", &scenario);
    assert!(!result.is_blocked(), "{:?}", result.blockage());
    assert_eq!(result.total_hindrance(), 1);
}

#[test]
fn test_oba_concentration_hinders() {
    let mut map = geo_map();
    map.reset_hex_terrain();
    let e5 = map.hex_by_name("E5").unwrap().coord();

    let mut scenario = ScenarioState::new();
    scenario.add_oba(Oba::new(e5, 1, 2, 1));

    let result = trace_with(&map, "C5", "G5", &scenario);
    assert!(!result.is_blocked(), "{:?}", result.blockage());
    assert_eq!(result.total_hindrance(), 1);
}

#[test]
fn test_stacked_oba_concentrations_each_hinder() {
    let mut map = geo_map();
    map.reset_hex_terrain();
    let e5 = map.hex_by_name("E5").unwrap().coord();

    let mut scenario = ScenarioState::new();
    scenario.add_oba(Oba::new(e5, 1, 2, 1));
    scenario.add_oba(Oba::new(e5, 1, 2, 1));

    let result = trace_with(&map, "C5", "G5", &scenario);
    assert!(!result.is_blocked(), "{:?}", result.blockage());
    assert_eq!(result.total_hindrance(), 2);
}

#[test]
fn test_building_levels_need_a_stairway() {
    let mut map = geo_map();
    paint_hex_center(&mut map, "E5", STONE_BUILDING);
    map.reset_hex_terrain();
    let hex = map.hex_by_name("E5").unwrap();
    let ground = hex.center_location().clone();
    let upper = hex.location_at_level(1);
    let coord = hex.coord();

    let mut result = LosResult::new();
    map.los(&ground, false, &upper, false, &mut result, &NoCounters);
    assert!(result.is_blocked());
    assert_eq!(
        result.blockage().unwrap().reason,
        "Crosses building level or no stairway"
    );

    map.set_stairway(coord, true);
    let hex = map.hex_by_name("E5").unwrap();
    let ground = hex.center_location().clone();
    let upper = hex.location_at_level(1);
    let mut result = LosResult::new();
    map.los(&ground, false, &upper, false, &mut result, &NoCounters);
    assert!(!result.is_blocked(), "{:?}", result.blockage());
    assert_eq!(result.range(), 0);
}

#[test]
fn test_los_symmetry_with_terrain() {
    let mut map = geo_map();
    paint_hex_center(&mut map, "E5", GRAIN);
    paint_hex_center(&mut map, "F6", WOODS);
    map.reset_hex_terrain();

    for (from, to) in [("C5", "G5"), ("B2", "K8"), ("A1", "M9")] {
        let forward = trace(&map, from, to);
        let back = trace(&map, to, from);
        assert_eq!(forward.is_blocked(), back.is_blocked(), "{from}->{to}");
        assert_eq!(forward.range(), back.range(), "{from}->{to}");
    }
}

#[test]
fn test_range_matches_hex_distance() {
    let map = geo_map();
    let result = trace(&map, "B3", "H6");
    assert_eq!(
        result.range(),
        range(
            map.hex_by_name("B3").unwrap().coord(),
            map.hex_by_name("H6").unwrap().coord(),
        )
    );
}
