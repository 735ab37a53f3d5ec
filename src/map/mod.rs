//! The game map: a hex grid over a terrain/elevation raster
//!
//! The raster is authoritative. Per-hex state (center terrain, hexside
//! terrain, base elevation) is a summary derived from the raster by
//! `reset_hex_terrain`, and map surgery (`flip`, `crop`, `insert_map`)
//! edits the raster and re-derives the summaries rather than patching
//! hex objects in place.

pub mod grid;
pub mod hex;
pub mod hillock;

use ahash::AHashMap;
use tracing::debug;

use crate::core::{MapError, Result};
use crate::terrain::{names, Terrain, TerrainCatalog};

pub use grid::RasterGrid;
pub use hex::{
    adjacent_coord, opposite_hexside, range, Bridge, Hex, HexCoord, Location, LocationId, HEXSIDES,
};
pub use hillock::Hillock;

/// Hex width in pixels on a standard geomorphic board.
pub const GEO_HEX_WIDTH: f64 = 56.25;
/// Hex height in pixels on a standard geomorphic board.
pub const GEO_HEX_HEIGHT: f64 = 64.5;
/// Center of hex A1 on a standard geomorphic board.
pub const GEO_A1_CENTER: (f64, f64) = (0.0, 32.25);

#[derive(Debug, Clone)]
pub struct GameMap {
    width: i32,
    height: i32,
    hex_width: f64,
    hex_height: f64,
    a1_center: (f64, f64),
    grid: RasterGrid,
    /// One Vec per column; odd columns hold `height + 1` hexes
    hexes: Vec<Vec<Hex>>,
    catalog: TerrainCatalog,
    /// Open ground, used when a raster cell holds a code the catalog
    /// does not know
    fallback: Terrain,
    hillocks: Vec<Hillock>,
    hillock_index: AHashMap<HexCoord, usize>,
}

impl GameMap {
    /// A map with standard geomorphic hex geometry.
    pub fn new(width: i32, height: i32, catalog: TerrainCatalog) -> Result<Self> {
        let image_width = (GEO_HEX_WIDTH * (width - 1).max(1) as f64).round() as i32;
        let image_height = (GEO_HEX_HEIGHT * height.max(1) as f64).round() as i32;
        Self::with_geometry(width, height, GEO_A1_CENTER, image_width, image_height, catalog)
    }

    /// A map with explicit geometry. `a1_center` is the pixel center of
    /// the first hex; negative components select the alternate naming
    /// schemes some board sets use.
    pub fn with_geometry(
        width: i32,
        height: i32,
        a1_center: (f64, f64),
        image_width: i32,
        image_height: i32,
        catalog: TerrainCatalog,
    ) -> Result<Self> {
        if width < 2 || height < 1 {
            return Err(MapError::InvalidDimensions { width, height });
        }
        let fallback = catalog
            .by_code(0)
            .cloned()
            .ok_or_else(|| MapError::Catalog("catalog has no terrain code 0".to_string()))?;

        let grid = RasterGrid::new(image_width, image_height)?;
        let hex_height = image_height as f64 / height as f64;
        let hex_width = image_width as f64 / (width - 1) as f64;

        let mut map = GameMap {
            width,
            height,
            hex_width,
            hex_height,
            a1_center,
            grid,
            hexes: Vec::new(),
            catalog,
            fallback,
            hillocks: Vec::new(),
            hillock_index: AHashMap::new(),
        };

        let mut hexes = Vec::with_capacity(width as usize);
        for col in 0..width {
            let rows = map.rows_in_col(col);
            let mut column = Vec::with_capacity(rows as usize);
            for row in 0..rows {
                column.push(Hex::new(
                    HexCoord::new(col, row),
                    map.geo_hex_name(col, row),
                    map.hex_center_point(col, row),
                    hex_width,
                    hex_height,
                    0,
                    0,
                ));
            }
            hexes.push(column);
        }
        map.hexes = hexes;

        Ok(map)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in hexes of the even columns; odd columns hold one more.
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn grid_width(&self) -> i32 {
        self.grid.width()
    }

    pub fn grid_height(&self) -> i32 {
        self.grid.height()
    }

    pub fn hex_width(&self) -> f64 {
        self.hex_width
    }

    pub fn hex_height(&self) -> f64 {
        self.hex_height
    }

    pub fn catalog(&self) -> &TerrainCatalog {
        &self.catalog
    }

    fn rows_in_col(&self, col: i32) -> i32 {
        self.height + (col % 2)
    }

    /// Center pixel of a hex. Odd columns are shifted half a hex toward
    /// the top of the map; negative origin components are treated as zero
    /// here (they only affect naming).
    pub fn hex_center_point(&self, col: i32, row: i32) -> (f64, f64) {
        let ax = if self.a1_center.0 < 0.0 { 0.0 } else { self.a1_center.0 };
        let ay = if self.a1_center.1 < 0.0 {
            self.hex_height / 2.0
        } else {
            self.a1_center.1
        };
        (
            ax + self.hex_width * col as f64,
            ay + self.hex_height * row as f64 - self.hex_height / 2.0 * (col % 2) as f64,
        )
    }

    /// Conventional hex name: columns A..Z then AA..ZZ and so on, rows
    /// numbered from 1 in even columns and 0 in odd ones. A negative
    /// origin x starts the lettering at Q; a negative origin y offsets
    /// the row numbers.
    pub fn geo_hex_name(&self, col: i32, row: i32) -> String {
        let mut name = String::new();

        if self.a1_center.0 < 0.0 {
            if col < 10 {
                name.push((b'Q' + col as u8) as char);
            } else {
                let c = (b'A' + ((col - 10) % 26) as u8) as char;
                name.push(c);
                name.push(c);
            }
        } else {
            let c = (b'A' + (col % 26) as u8) as char;
            name.push(c);
            for _ in 0..(col / 26) {
                name.push(c);
            }
        }

        let row_offset = if self.a1_center.1 < 0.0 {
            (-self.a1_center.1 / self.hex_height) as i32 + 1
        } else {
            0
        };
        let first = if col % 2 == 0 { 1 } else { 0 };
        format!("{}{}", name, row + row_offset + first)
    }

    pub fn hex_on_map(&self, coord: HexCoord) -> bool {
        coord.col >= 0
            && coord.col < self.width
            && coord.row >= 0
            && coord.row < self.rows_in_col(coord.col)
    }

    pub fn hex(&self, coord: HexCoord) -> Option<&Hex> {
        if self.hex_on_map(coord) {
            Some(&self.hexes[coord.col as usize][coord.row as usize])
        } else {
            None
        }
    }

    fn hex_mut(&mut self, coord: HexCoord) -> Option<&mut Hex> {
        if self.hex_on_map(coord) {
            Some(&mut self.hexes[coord.col as usize][coord.row as usize])
        } else {
            None
        }
    }

    pub fn hex_by_name(&self, name: &str) -> Option<&Hex> {
        self.all_hexes().find(|h| h.name().eq_ignore_ascii_case(name))
    }

    /// Strict lookup by name. A name that is not letters followed by
    /// digits, or that falls off the map, is an error.
    pub fn hex_named(&self, name: &str) -> Result<&Hex> {
        let letters = name.chars().take_while(char::is_ascii_alphabetic).count();
        let digits = &name[letters..];
        if letters == 0 || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(MapError::InvalidHexName(name.to_string()));
        }
        self.hex_by_name(name)
            .ok_or_else(|| MapError::InvalidHexName(name.to_string()))
    }

    pub fn all_hexes(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.iter().flat_map(|col| col.iter())
    }

    pub fn adjacent_hex(&self, coord: HexCoord, hexside: usize) -> Option<&Hex> {
        if hexside >= HEXSIDES {
            return None;
        }
        self.hex(adjacent_coord(coord, hexside))
    }

    /// Is the pixel on the map grid?
    pub fn on_map(&self, x: i32, y: i32) -> bool {
        self.grid.contains(x, y)
    }

    /// The hex containing a pixel. Points in the narrow "grey" band
    /// where adjacent columns interleave are resolved by polygon
    /// containment against the candidate hexes.
    pub fn point_to_hex(&self, x: i32, y: i32) -> Option<&Hex> {
        if !self.on_map(x, y) {
            return None;
        }

        let z = (x as f64 / (self.hex_width / 3.0)) as i32;
        let row_for = |col: i32| -> i32 {
            if col % 2 == 0 {
                (y as f64 / self.hex_height) as i32
            } else {
                ((y as f64 + self.hex_height / 2.0) / self.hex_height) as i32
            }
        };

        if (z - 1) % 3 == 0 {
            let col = (((z - 1) as f64) / 3.0).ceil() as i32;
            let row = row_for(col);
            let contains = |c: HexCoord| self.hex(c).map_or(false, |h| h.contains(x as f64, y as f64));

            let first = HexCoord::new(col, row);
            if contains(first) {
                return self.hex(first);
            }
            if col % 2 == 0 {
                let lower = HexCoord::new(col + 1, row + 1);
                if contains(lower) {
                    self.hex(lower)
                } else {
                    self.hex(HexCoord::new(col + 1, row))
                }
            } else {
                let upper = HexCoord::new(col + 1, row - 1);
                if (row - 1 >= 0 && contains(upper)) || row == self.height {
                    self.hex(upper)
                } else {
                    self.hex(HexCoord::new(col + 1, row))
                }
            }
        } else {
            let col = ((z as f64) / 3.0).ceil() as i32;
            self.hex(HexCoord::new(col, row_for(col)))
        }
    }

    /// Terrain for a raster code, falling back to open ground for codes
    /// the catalog does not know.
    pub fn terrain(&self, code: u8) -> &Terrain {
        self.catalog.by_code(code).unwrap_or(&self.fallback)
    }

    pub fn grid_terrain_code(&self, x: i32, y: i32) -> Option<u8> {
        self.grid.terrain_code(x, y)
    }

    pub fn grid_terrain(&self, x: i32, y: i32) -> &Terrain {
        self.terrain(self.grid.terrain_code(x, y).unwrap_or(0))
    }

    pub fn grid_elevation(&self, x: i32, y: i32) -> i32 {
        self.grid.elevation(x, y).unwrap_or(0)
    }

    pub fn set_grid_terrain_code(&mut self, x: i32, y: i32, code: u8) -> Result<()> {
        self.grid.set_terrain_code(x, y, code)
    }

    pub fn set_grid_elevation(&mut self, x: i32, y: i32, elevation: i32) -> Result<()> {
        self.grid.set_elevation(x, y, elevation)
    }

    /// Paint a rectangle of the terrain grid with one code.
    pub fn fill_terrain(&mut self, x: i32, y: i32, w: i32, h: i32, code: u8) -> Result<()> {
        for px in x..x + w {
            for py in y..y + h {
                self.grid.set_terrain_code(px, py, code)?;
            }
        }
        Ok(())
    }

    /// Paint a rectangle of the elevation grid with one level.
    pub fn fill_elevation(&mut self, x: i32, y: i32, w: i32, h: i32, elevation: i32) -> Result<()> {
        for px in x..x + w {
            for py in y..y + h {
                self.grid.set_elevation(px, py, elevation)?;
            }
        }
        Ok(())
    }

    /// Elevation of a location above sea level.
    pub fn absolute_height(&self, location: &Location) -> i32 {
        let base = self.hex(location.hex()).map_or(0, Hex::base_elevation);
        base + location.base_height()
    }

    /// Re-derive every hex's terrain summary from the raster, then
    /// rebuild the hillock groups.
    pub fn reset_hex_terrain(&mut self) {
        struct HexUpdate {
            coord: HexCoord,
            elevation: i32,
            center_code: u8,
            center_depression: bool,
            sides: [(u8, bool, bool); HEXSIDES],
        }

        let mut updates = Vec::new();
        for hex in self.all_hexes() {
            let (cx, cy) = hex.center();
            let (cx, cy) = (cx.round() as i32, cy.round() as i32);
            let center_code = self.grid.terrain_code(cx, cy).unwrap_or(0);
            let elevation = self.grid.elevation(cx, cy).unwrap_or(0);
            let center = self.terrain(center_code);

            let sides = std::array::from_fn(|side| {
                let (mx, my) = hex.hexside_midpoint(side);
                let code = self
                    .grid
                    .terrain_code(mx.round() as i32, my.round() as i32)
                    .unwrap_or(center_code);
                let t = self.terrain(code);
                (code, t.hexside, t.depression)
            });

            updates.push(HexUpdate {
                coord: hex.coord(),
                elevation,
                center_code,
                center_depression: center.depression,
                sides,
            });
        }

        for u in updates {
            if let Some(hex) = self.hex_mut(u.coord) {
                hex.set_base_elevation(u.elevation);
                let center = hex.center_location_mut();
                center.set_terrain(u.center_code, u.center_depression);
                center.set_base_height(if u.center_depression { -1 } else { 0 });
                for (side, &(code, is_hexside, depression)) in u.sides.iter().enumerate() {
                    hex.set_hexside_terrain(side, if is_hexside { Some(code) } else { None });
                    hex.hexside_location_mut(side).set_terrain(code, depression);
                }
            }
        }

        self.build_hillocks();
    }

    /// Rebuild the hillock groups from the current hex terrain.
    pub fn build_hillocks(&mut self) {
        let coords: Vec<HexCoord> = self
            .all_hexes()
            .filter(|h| {
                self.terrain(h.center_location().terrain_code()).name == names::HILLOCK
            })
            .map(Hex::coord)
            .collect();

        self.hillocks = hillock::build_hillocks(&coords);
        self.hillock_index = self
            .hillocks
            .iter()
            .enumerate()
            .flat_map(|(i, g)| g.hexes().map(move |&h| (h, i)))
            .collect();
        debug!(groups = self.hillocks.len(), "rebuilt hillocks");
    }

    /// Index of the hillock group containing a hex, if any.
    pub fn hillock_of(&self, hex: HexCoord) -> Option<usize> {
        self.hillock_index.get(&hex).copied()
    }

    pub fn hillock(&self, index: usize) -> Option<&Hillock> {
        self.hillocks.get(index)
    }

    /// Rotate the map 180 degrees. Hex names and per-hex attributes
    /// travel with their hex to the opposite corner; terrain summaries
    /// are re-derived from the rotated raster.
    pub fn flip(&mut self) {
        self.grid.flip();

        struct Carried {
            name: String,
            slopes: [bool; HEXSIDES],
            cliffs: [bool; HEXSIDES],
            stairway: bool,
            bridge: Option<Bridge>,
        }

        let gw = self.grid.width() as f64;
        let gh = self.grid.height() as f64;
        let carried: Vec<(HexCoord, Carried)> = self
            .all_hexes()
            .map(|h| {
                let c = h.coord();
                let flipped = HexCoord::new(
                    self.width - 1 - c.col,
                    self.rows_in_col(self.width - 1 - c.col) - 1 - c.row,
                );
                // rotating the hex turns each hexside into its opposite
                let rot = |a: [bool; HEXSIDES]| {
                    std::array::from_fn(|i| a[opposite_hexside(i)])
                };
                (
                    flipped,
                    Carried {
                        name: h.name().to_string(),
                        slopes: rot(h.slopes_array()),
                        cliffs: rot(h.cliffs_array()),
                        stairway: h.has_stairway(),
                        bridge: h.bridge().map(|b| b.flipped(gw, gh)),
                    },
                )
            })
            .collect();

        for (coord, c) in carried {
            if let Some(hex) = self.hex_mut(coord) {
                hex.set_name(c.name);
                hex.set_slopes(c.slopes);
                for (side, &cliff) in c.cliffs.iter().enumerate() {
                    hex.set_cliff(side, cliff);
                }
                hex.set_stairway(c.stairway);
                hex.set_bridge(c.bridge);
            }
        }

        self.reset_hex_terrain();
    }

    /// Cut out the rectangle between two grid points as a new map. The
    /// corners must lie so the left and right edges of the result are
    /// half hexes.
    pub fn crop(&self, upper_left: (i32, i32), lower_right: (i32, i32)) -> Result<GameMap> {
        let grid_w = lower_right.0 - upper_left.0;
        let grid_h = lower_right.1 - upper_left.1;
        if grid_w <= 0
            || grid_h <= 0
            || !self.on_map(upper_left.0, upper_left.1)
            || !self.on_map(lower_right.0 - 1, lower_right.1 - 1)
        {
            return Err(MapError::InvalidDimensions {
                width: grid_w,
                height: grid_h,
            });
        }

        let mut hex_w = (grid_w as f64 / self.hex_width).round() as i32 + 1;
        let hex_h = (grid_h as f64 / self.hex_height).round() as i32;
        // keep the right edge a half hex
        if hex_w % 2 != 1 {
            hex_w += 1;
        }

        let mut cropped = GameMap::with_geometry(
            hex_w,
            hex_h,
            self.a1_center,
            grid_w,
            grid_h,
            self.catalog.clone(),
        )?;

        for x in 0..grid_w.min(self.grid.width() - upper_left.0) {
            for y in 0..grid_h.min(self.grid.height() - upper_left.1) {
                if let Some(code) = self.grid.terrain_code(x + upper_left.0, y + upper_left.1) {
                    cropped.grid.set_terrain_code(x, y, code)?;
                }
                if let Some(e) = self.grid.elevation(x + upper_left.0, y + upper_left.1) {
                    cropped.grid.set_elevation(x, y, e)?;
                }
            }
        }

        let origin = self
            .point_to_hex(upper_left.0, upper_left.1)
            .map(Hex::coord)
            .unwrap_or_default();
        self.copy_hex_attributes(
            &mut cropped,
            origin,
            HexCoord::new(0, 0),
            (-(upper_left.0 as f64), -(upper_left.1 as f64)),
        );

        cropped.reset_hex_terrain();
        Ok(cropped)
    }

    /// Overlay another map so its upper-left hex lands on `upper_left`.
    /// Hex names come from the inserted map. Assumes compatible half-hex
    /// board edges.
    pub fn insert_map(&mut self, other: &GameMap, upper_left: HexCoord) -> Result<()> {
        let anchor = self
            .hex(upper_left)
            .ok_or(MapError::OutOfBounds(upper_left.col, upper_left.row))?;
        let (ax, ay) = anchor.center_location().los_point();
        let left = ax;
        let upper = ay - (self.hex_height as i32) / 2;
        if !self.on_map(left, upper) {
            return Err(MapError::OutOfBounds(left, upper));
        }

        for x in 0..other.grid.width().min(self.grid.width() - left) {
            for y in 0..other.grid.height().min(self.grid.height() - upper) {
                if let Some(code) = other.grid.terrain_code(x, y) {
                    self.grid.set_terrain_code(left + x, upper + y, code)?;
                }
                if let Some(e) = other.grid.elevation(x, y) {
                    self.grid.set_elevation(left + x, upper + y, e)?;
                }
            }
        }

        other.copy_hex_attributes(
            self,
            HexCoord::new(0, 0),
            upper_left,
            (left as f64, upper as f64),
        );

        self.reset_hex_terrain();
        Ok(())
    }

    /// Copy names and per-hex attributes from `self` starting at
    /// `src_origin` into `dest` starting at `dest_origin`, shifting
    /// bridge shapes by `pixel_shift`.
    fn copy_hex_attributes(
        &self,
        dest: &mut GameMap,
        src_origin: HexCoord,
        dest_origin: HexCoord,
        pixel_shift: (f64, f64),
    ) {
        for col in 0..dest.width {
            for row in 0..dest.rows_in_col(col) {
                let dest_coord = HexCoord::new(dest_origin.col + col, dest_origin.row + row);
                let src_coord = HexCoord::new(src_origin.col + col, src_origin.row + row);
                let Some(src) = self.hex(src_coord) else { continue };
                let name = src.name().to_string();
                let slopes = src.slopes_array();
                let cliffs = src.cliffs_array();
                let stairway = src.has_stairway();
                let bridge = src
                    .bridge()
                    .map(|b| b.translated(pixel_shift.0, pixel_shift.1));
                if let Some(d) = dest.hex_mut(dest_coord) {
                    d.set_name(name);
                    d.set_slopes(slopes);
                    for (side, &c) in cliffs.iter().enumerate() {
                        d.set_cliff(side, c);
                    }
                    d.set_stairway(stairway);
                    d.set_bridge(bridge);
                }
            }
        }
    }

    /// Apply per-hex slope flags keyed by hex name. Unknown names are
    /// ignored.
    pub fn set_slopes(&mut self, slopes: &AHashMap<String, [bool; HEXSIDES]>) {
        for (name, flags) in slopes {
            let coord = self.hex_by_name(name).map(Hex::coord);
            match coord {
                Some(c) => {
                    if let Some(hex) = self.hex_mut(c) {
                        hex.set_slopes(*flags);
                    }
                }
                None => debug!(hex = %name, "slope entry for unknown hex"),
            }
        }
    }

    /// Set a cliff along a hexside of a hex and the matching side of the
    /// adjacent hex.
    pub fn set_cliff(&mut self, coord: HexCoord, hexside: usize, cliff: bool) {
        if let Some(hex) = self.hex_mut(coord) {
            hex.set_cliff(hexside, cliff);
        }
        let other = adjacent_coord(coord, hexside);
        if let Some(hex) = self.hex_mut(other) {
            hex.set_cliff(opposite_hexside(hexside), cliff);
        }
    }

    pub fn set_stairway(&mut self, coord: HexCoord, stairway: bool) {
        if let Some(hex) = self.hex_mut(coord) {
            hex.set_stairway(stairway);
        }
    }

    pub fn set_bridge(&mut self, coord: HexCoord, bridge: Option<Bridge>) {
        if let Some(hex) = self.hex_mut(coord) {
            hex.set_bridge(bridge);
        }
    }

    /// Is the location one of the hexsides of `h` (seen from either
    /// adjacent hex)?
    pub fn is_adjacent_hexside(&self, h: HexCoord, location: &Location) -> bool {
        if location.is_center_location() {
            return false;
        }
        if location.hex() == h {
            return true;
        }
        for side in 0..HEXSIDES {
            if let Some(adjacent) = self.adjacent_hex(h, side) {
                if adjacent.hexside_location(opposite_hexside(side)) == location {
                    return true;
                }
            }
        }
        false
    }

    /// Is the location on one of the six hexspines radiating from `h`?
    pub fn is_hexspine(&self, h: HexCoord, location: &Location) -> bool {
        for side in 0..HEXSIDES {
            if let Some(adjacent) = self.adjacent_hex(h, side) {
                let (a, b) = ((side + 2) % HEXSIDES, (side + 4) % HEXSIDES);
                if adjacent.hexside_location(a) == location
                    || adjacent.hexside_location(b) == location
                {
                    return true;
                }
            }
        }
        false
    }

    /// Can hexside terrain at `location` be ignored for a LOS that
    /// starts or ends in `h`? Covers the adjacent-hexside and hexspine
    /// exemptions; `los_hexspine` is the hexspine the LOS runs along
    /// when it leaves `h`, if any.
    pub fn is_ignorable_hexside_terrain(
        &self,
        h: HexCoord,
        location: &Location,
        los_hexspine: Option<usize>,
    ) -> bool {
        let location_hex = location.hex();
        let location_hexside = match self
            .hex(location_hex)
            .and_then(|hex| hex.location_hexside(location))
        {
            Some(s) => s,
            None => return false,
        };
        let hexside_terrain = self
            .hex(location_hex)
            .and_then(|hex| hex.hexside_terrain(location_hexside));

        if range(h, location_hex) > 2 {
            return false;
        }
        if self.is_adjacent_hexside(h, location) {
            return true;
        }
        let is_bocage = hexside_terrain
            .map_or(false, |code| self.terrain(code).name == names::BOCAGE);
        if self.is_hexspine(h, location) && !is_bocage {
            return true;
        }
        // hexside terrain in an adjacent hex that spills into an
        // adjacent location
        if range(h, location_hex) == 1 && !self.terrain(location.terrain_code()).hexside {
            return true;
        }

        let Some(los_hexspine) = los_hexspine else { return false };

        let location = if range(h, location_hex) == 2 {
            // use the matching location in the hex across the hexside
            let Some(opposite) = self.adjacent_hex(location_hex, location_hexside) else {
                return true;
            };
            if range(h, opposite.coord()) > 1 {
                return false;
            }
            opposite
                .hexside_location(opposite_hexside(location_hexside))
                .clone()
        } else {
            location.clone()
        };

        // the two hexsides flanking the hexspine, and the hexspine's
        // continuation at its far end
        let hexside = if los_hexspine == 0 { 5 } else { los_hexspine - 1 };
        let hexspine = if los_hexspine < 2 {
            los_hexspine + 4
        } else {
            los_hexspine - 2
        };

        let (Some(hex1), Some(hex2)) = (
            self.adjacent_hex(h, hexside),
            self.adjacent_hex(h, los_hexspine),
        ) else {
            return false;
        };

        let l2 = hex1.hexside_location(los_hexspine);
        let l3 = hex2.hexside_location(hexside);

        let t1 = hex2.hexside_terrain(hexspine);
        let t2 = hex1.hexside_terrain(los_hexspine);
        let t3 = hex2.hexside_terrain(hexside);

        t1.is_some() && (&location == l2 || &location == l3) && (t2.is_none() || t3.is_none())
    }

    /// Is the hexside location nearest to a pixel a cliff?
    pub fn nearest_hexside_is_cliff(&self, x: i32, y: i32) -> bool {
        let Some(hex) = self.point_to_hex(x, y) else { return false };
        let location = hex.nearest_location(x, y);
        match hex.location_hexside(location) {
            Some(side) => hex.has_cliff(side),
            None => false,
        }
    }
}
