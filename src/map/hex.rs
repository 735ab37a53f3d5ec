//! Hex and Location model
//!
//! Hexes are flat-topped; hexside 0 is the top edge, numbering continues
//! clockwise through 5. Vertex `i` is the shared corner of hexsides
//! `i - 1` and `i`, so hexside `i` runs from vertex `i` to vertex
//! `i + 1 (mod 6)`.
//!
//! A hexside is physically shared by the two hexes that touch it. Each
//! hex owns its own `Location` value for the side, but the two values
//! compare equal: equality is structural on a canonical
//! (hex, hexside, level) identity, picked the same way from either side.

use geo::{Contains, MapCoords, Point, Polygon};
use geo_types::{Coord, LineString};
use serde::{Deserialize, Serialize};

/// Padding (pixels) added radially to the extended hex border so that
/// pixels on a shared hexside fall inside both adjacent hexes.
const EXTENDED_BORDER_MARGIN: f64 = 1.0;

pub const HEXSIDES: usize = 6;

/// Hex grid coordinate. Column 0 is the left edge ('A'); row 0 is the
/// first hex in the column. Odd columns hold one more row than even ones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    pub col: i32,
    pub row: i32,
}

impl HexCoord {
    pub fn new(col: i32, row: i32) -> Self {
        HexCoord { col, row }
    }
}

/// The hexside shared with the adjacent hex across hexside `side`.
pub fn opposite_hexside(side: usize) -> usize {
    (side + 3) % 6
}

/// Coordinate of the hex adjacent across the given hexside, ignoring map
/// bounds (the map decides whether the coordinate exists).
pub fn adjacent_coord(c: HexCoord, hexside: usize) -> HexCoord {
    let col_is_even = c.col % 2 == 0;
    match hexside {
        0 => HexCoord::new(c.col, c.row - 1),
        1 => HexCoord::new(c.col + 1, if col_is_even { c.row } else { c.row - 1 }),
        2 => HexCoord::new(c.col + 1, if col_is_even { c.row + 1 } else { c.row }),
        3 => HexCoord::new(c.col, c.row + 1),
        4 => HexCoord::new(c.col - 1, if col_is_even { c.row + 1 } else { c.row }),
        _ => HexCoord::new(c.col - 1, if col_is_even { c.row } else { c.row - 1 }),
    }
}

/// Range in hexes between two hex coordinates. Walks column by column
/// toward the target, adjusting the tracked row only when column parity
/// and direction make the diagonal step free, then adds the residual
/// row distance.
pub fn range(source: HexCoord, target: HexCoord) -> i32 {
    let dir_x = if target.col > source.col { 1 } else { -1 };
    let dir_y = if target.row > source.row { 1 } else { -1 };

    let mut rng = 0;
    let mut current_row = source.row;
    let mut current_col = source.col;

    while current_col != target.col {
        if current_row != target.row
            && ((current_col % 2 == 0 && dir_y == 1) || (current_col % 2 != 0 && dir_y == -1))
        {
            current_row += dir_y;
        }
        current_col += dir_x;
        rng += 1;
    }

    if current_row != target.row {
        rng += (target.row - current_row).abs();
    }

    rng
}

/// Canonical identity of a location, shared by the two hexes touching a
/// hexside. For a hexside location the canonical owner is whichever of
/// the two (hex, side) views orders first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId {
    pub hex: HexCoord,
    /// `None` for the hex center
    pub hexside: Option<u8>,
    /// Building level above the hex base (0 = ground)
    pub level: i32,
}

/// A point of interest in a hex: the center or one of its six hexsides,
/// possibly at an upper building level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    hex: HexCoord,
    hexside: Option<u8>,
    canon: LocationId,
    name: String,
    terrain: u8,
    base_height: i32,
    los_point: (i32, i32),
    aux_los_point: (i32, i32),
    depression: bool,
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.canon == other.canon
    }
}

impl Eq for Location {}

impl std::hash::Hash for Location {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canon.hash(state);
    }
}

impl Location {
    /// The hex this location view belongs to (not necessarily the
    /// canonical owner of a shared hexside).
    pub fn hex(&self) -> HexCoord {
        self.hex
    }

    pub fn hexside(&self) -> Option<usize> {
        self.hexside.map(|s| s as usize)
    }

    pub fn id(&self) -> &LocationId {
        &self.canon
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terrain_code(&self) -> u8 {
        self.terrain
    }

    /// Height relative to the hex base elevation.
    pub fn base_height(&self) -> i32 {
        self.base_height
    }

    pub fn is_center_location(&self) -> bool {
        self.hexside.is_none()
    }

    pub fn is_depression_terrain(&self) -> bool {
        self.depression
    }

    /// Primary LOS aiming point. For hexside locations this is one
    /// vertex of the bypassed hexside; the auxiliary point is the other.
    pub fn los_point(&self) -> (i32, i32) {
        self.los_point
    }

    pub fn aux_los_point(&self) -> (i32, i32) {
        self.aux_los_point
    }

    pub fn aiming_point(&self, use_aux: bool) -> (i32, i32) {
        if use_aux {
            self.aux_los_point
        } else {
            self.los_point
        }
    }

    pub(crate) fn set_terrain(&mut self, code: u8, depression: bool) {
        self.terrain = code;
        self.depression = depression;
    }

    pub(crate) fn set_base_height(&mut self, height: i32) {
        self.base_height = height;
        self.canon.level = height;
    }
}

/// Deck and roadway geometry for a hex with a bridge.
#[derive(Debug, Clone)]
pub struct Bridge {
    pub road_level: i32,
    area: Polygon<f64>,
    road_area: Polygon<f64>,
}

impl Bridge {
    pub fn new(road_level: i32, area: Polygon<f64>, road_area: Polygon<f64>) -> Self {
        Bridge {
            road_level,
            area,
            road_area,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.area.contains(&Point::new(x as f64, y as f64))
    }

    pub fn road_contains(&self, x: i32, y: i32) -> bool {
        self.road_area.contains(&Point::new(x as f64, y as f64))
    }

    /// The bridge as seen after a 180 degree rotation of a grid of the
    /// given pixel size.
    pub(crate) fn flipped(&self, grid_width: f64, grid_height: f64) -> Bridge {
        let rot = |c: Coord<f64>| Coord {
            x: grid_width - 1.0 - c.x,
            y: grid_height - 1.0 - c.y,
        };
        Bridge {
            road_level: self.road_level,
            area: self.area.map_coords(rot),
            road_area: self.road_area.map_coords(rot),
        }
    }

    pub(crate) fn translated(&self, dx: f64, dy: f64) -> Bridge {
        let shift = |c: Coord<f64>| Coord {
            x: c.x + dx,
            y: c.y + dy,
        };
        Bridge {
            road_level: self.road_level,
            area: self.area.map_coords(shift),
            road_area: self.road_area.map_coords(shift),
        }
    }
}

/// One cell of the hex grid.
#[derive(Debug, Clone)]
pub struct Hex {
    coord: HexCoord,
    name: String,
    center: (f64, f64),
    base_elevation: i32,
    border: Polygon<f64>,
    extended_border: Polygon<f64>,
    edge_midpoints: [(f64, f64); HEXSIDES],
    center_location: Location,
    hexside_locations: [Location; HEXSIDES],
    hexside_terrain: [Option<u8>; HEXSIDES],
    slopes: [bool; HEXSIDES],
    cliffs: [bool; HEXSIDES],
    stairway: bool,
    bridge: Option<Bridge>,
}

fn polygon_from(vertices: &[(f64, f64); HEXSIDES]) -> Polygon<f64> {
    let mut coords: Vec<Coord<f64>> = vertices.iter().map(|&(x, y)| Coord { x, y }).collect();
    coords.push(coords[0]);
    Polygon::new(LineString::from(coords), vec![])
}

impl Hex {
    /// Build a hex from its grid coordinate and center point. `open_code`
    /// is the terrain every location starts out with until the grids are
    /// loaded and `reset_hex_terrain` runs.
    pub(crate) fn new(
        coord: HexCoord,
        name: String,
        center: (f64, f64),
        hex_width: f64,
        hex_height: f64,
        base_elevation: i32,
        open_code: u8,
    ) -> Self {
        let (cx, cy) = center;
        let w3 = hex_width / 3.0;
        let h2 = hex_height / 2.0;
        let vertices = [
            (cx - w3, cy - h2),
            (cx + w3, cy - h2),
            (cx + 2.0 * w3, cy),
            (cx + w3, cy + h2),
            (cx - w3, cy + h2),
            (cx - 2.0 * w3, cy),
        ];

        let mut extended = vertices;
        for v in extended.iter_mut() {
            let dx = v.0 - cx;
            let dy = v.1 - cy;
            let len = (dx * dx + dy * dy).sqrt();
            if len > 0.0 {
                v.0 += dx / len * EXTENDED_BORDER_MARGIN;
                v.1 += dy / len * EXTENDED_BORDER_MARGIN;
            }
        }

        let mut edge_midpoints = [(0.0, 0.0); HEXSIDES];
        for side in 0..HEXSIDES {
            let a = vertices[side];
            let b = vertices[(side + 1) % HEXSIDES];
            edge_midpoints[side] = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
        }

        let center_location = Location {
            hex: coord,
            hexside: None,
            canon: LocationId {
                hex: coord,
                hexside: None,
                level: 0,
            },
            name: name.clone(),
            terrain: open_code,
            base_height: 0,
            los_point: (cx.round() as i32, cy.round() as i32),
            aux_los_point: (cx.round() as i32, cy.round() as i32),
            depression: false,
        };

        let hexside_locations = std::array::from_fn(|side| {
            let a = vertices[side];
            let b = vertices[(side + 1) % HEXSIDES];
            Location {
                hex: coord,
                hexside: Some(side as u8),
                canon: canonical_hexside_id(coord, side),
                name: format!("{}:{}", name, side),
                terrain: open_code,
                base_height: 0,
                los_point: (a.0.round() as i32, a.1.round() as i32),
                aux_los_point: (b.0.round() as i32, b.1.round() as i32),
                depression: false,
            }
        });

        Hex {
            coord,
            name,
            center,
            base_elevation,
            border: polygon_from(&vertices),
            extended_border: polygon_from(&extended),
            edge_midpoints,
            center_location,
            hexside_locations,
            hexside_terrain: [None; HEXSIDES],
            slopes: [false; HEXSIDES],
            cliffs: [false; HEXSIDES],
            stairway: false,
            bridge: None,
        }
    }

    pub fn coord(&self) -> HexCoord {
        self.coord
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    pub fn base_elevation(&self) -> i32 {
        self.base_elevation
    }

    pub(crate) fn set_base_elevation(&mut self, elevation: i32) {
        self.base_elevation = elevation;
    }

    pub fn center_location(&self) -> &Location {
        &self.center_location
    }

    pub fn hexside_location(&self, side: usize) -> &Location {
        &self.hexside_locations[side % HEXSIDES]
    }

    /// Midpoint of a hexside edge, where its terrain is sampled.
    pub fn hexside_midpoint(&self, side: usize) -> (f64, f64) {
        self.edge_midpoints[side % HEXSIDES]
    }

    /// The center location at a building level above the ground floor.
    pub fn location_at_level(&self, level: i32) -> Location {
        let mut loc = self.center_location.clone();
        loc.base_height = level;
        loc.canon.level = level;
        loc.name = format!("{} level {}", self.name, level);
        loc
    }

    pub fn hexside_terrain(&self, side: usize) -> Option<u8> {
        self.hexside_terrain[side % HEXSIDES]
    }

    pub(crate) fn set_hexside_terrain(&mut self, side: usize, code: Option<u8>) {
        self.hexside_terrain[side % HEXSIDES] = code;
    }

    pub(crate) fn center_location_mut(&mut self) -> &mut Location {
        &mut self.center_location
    }

    pub(crate) fn hexside_location_mut(&mut self, side: usize) -> &mut Location {
        &mut self.hexside_locations[side % HEXSIDES]
    }

    pub fn has_slope(&self, side: usize) -> bool {
        self.slopes[side % HEXSIDES]
    }

    pub fn slopes_array(&self) -> [bool; HEXSIDES] {
        self.slopes
    }

    pub fn cliffs_array(&self) -> [bool; HEXSIDES] {
        self.cliffs
    }

    pub fn set_slopes(&mut self, slopes: [bool; HEXSIDES]) {
        self.slopes = slopes;
    }

    pub fn has_cliff(&self, side: usize) -> bool {
        self.cliffs[side % HEXSIDES]
    }

    pub fn set_cliff(&mut self, side: usize, cliff: bool) {
        self.cliffs[side % HEXSIDES] = cliff;
    }

    pub fn has_stairway(&self) -> bool {
        self.stairway
    }

    pub fn set_stairway(&mut self, stairway: bool) {
        self.stairway = stairway;
    }

    pub fn has_bridge(&self) -> bool {
        self.bridge.is_some()
    }

    pub fn bridge(&self) -> Option<&Bridge> {
        self.bridge.as_ref()
    }

    pub fn set_bridge(&mut self, bridge: Option<Bridge>) {
        self.bridge = bridge;
    }

    pub fn is_depression_terrain(&self) -> bool {
        self.center_location.depression
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.border.contains(&Point::new(x, y))
    }

    /// Containment against the slightly enlarged border that absorbs the
    /// geometric fuzz along shared hexsides.
    pub fn contains_extended(&self, x: i32, y: i32) -> bool {
        self.extended_border.contains(&Point::new(x as f64, y as f64))
    }

    pub fn extended_border(&self) -> &Polygon<f64> {
        &self.extended_border
    }

    /// Classify a pixel as the center or the nearest hexside location.
    pub fn nearest_location(&self, x: i32, y: i32) -> &Location {
        let px = x as f64;
        let py = y as f64;
        let dist2 = |p: (f64, f64)| {
            let dx = p.0 - px;
            let dy = p.1 - py;
            dx * dx + dy * dy
        };

        let mut best: &Location = &self.center_location;
        let mut best_d = dist2(self.center);
        for side in 0..HEXSIDES {
            let d = dist2(self.edge_midpoints[side]);
            if d < best_d {
                best_d = d;
                best = &self.hexside_locations[side];
            }
        }
        best
    }

    /// Which hexside of this hex the location sits on, if any.
    pub fn location_hexside(&self, location: &Location) -> Option<usize> {
        (0..HEXSIDES).find(|&side| &self.hexside_locations[side] == location)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.center_location.name = name.clone();
        for (side, loc) in self.hexside_locations.iter_mut().enumerate() {
            loc.name = format!("{}:{}", name, side);
        }
        self.name = name;
    }
}

fn canonical_hexside_id(coord: HexCoord, side: usize) -> LocationId {
    let other = adjacent_coord(coord, side);
    let mine = (coord, side as u8);
    let theirs = (other, opposite_hexside(side) as u8);
    let (hex, hexside) = if mine <= theirs { mine } else { theirs };
    LocationId {
        hex,
        hexside: Some(hexside),
        level: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_hexside() {
        assert_eq!(opposite_hexside(0), 3);
        assert_eq!(opposite_hexside(1), 4);
        assert_eq!(opposite_hexside(5), 2);
    }

    #[test]
    fn test_range_same_hex() {
        let h = HexCoord::new(3, 4);
        assert_eq!(range(h, h), 0);
    }

    #[test]
    fn test_range_adjacent() {
        let h = HexCoord::new(2, 2);
        for side in 0..HEXSIDES {
            assert_eq!(range(h, adjacent_coord(h, side)), 1, "hexside {side}");
        }
    }

    #[test]
    fn test_range_symmetric() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(5, 3);
        assert_eq!(range(a, b), range(b, a));
    }

    #[test]
    fn test_adjacency_round_trip() {
        let h = HexCoord::new(4, 3);
        for side in 0..HEXSIDES {
            let n = adjacent_coord(h, side);
            assert_eq!(adjacent_coord(n, opposite_hexside(side)), h);
        }
    }

    #[test]
    fn test_shared_hexside_locations_equal() {
        let a = HexCoord::new(2, 2);
        for side in 0..HEXSIDES {
            let b = adjacent_coord(a, side);
            let hex_a = Hex::new(a, "A".into(), (100.0, 100.0), 56.25, 64.5, 0, 0);
            let hex_b = Hex::new(b, "B".into(), (50.0, 50.0), 56.25, 64.5, 0, 0);
            assert_eq!(
                hex_a.hexside_location(side),
                hex_b.hexside_location(opposite_hexside(side)),
                "hexside {side} not shared"
            );
        }
    }

    #[test]
    fn test_center_containment() {
        let hex = Hex::new(HexCoord::new(0, 0), "A1".into(), (100.0, 100.0), 56.25, 64.5, 0, 0);
        assert!(hex.contains(100.0, 100.0));
        assert!(!hex.contains(200.0, 200.0));
        assert!(hex.contains_extended(100, 100));
    }

    #[test]
    fn test_nearest_location_center_vs_hexside() {
        let hex = Hex::new(HexCoord::new(0, 0), "A1".into(), (100.0, 100.0), 56.25, 64.5, 0, 0);
        assert!(hex.nearest_location(100, 100).is_center_location());
        // top edge midpoint is at (100, 100 - 32.25)
        let top = hex.nearest_location(100, 70);
        assert_eq!(top.hexside(), Some(0));
    }
}
