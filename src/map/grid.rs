//! Per-pixel terrain and elevation raster backing the hex grid
//!
//! One cell per image pixel, origin at the upper left. Out-of-bounds
//! queries return `None`; they are never wrapped.

use crate::core::{MapError, Result};

#[derive(Debug, Clone)]
pub struct RasterGrid {
    width: i32,
    height: i32,
    terrain: Vec<u8>,
    elevation: Vec<i8>,
}

impl RasterGrid {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(MapError::InvalidDimensions { width, height });
        }
        let cells = (width as usize) * (height as usize);
        Ok(RasterGrid {
            width,
            height,
            terrain: vec![0; cells],
            elevation: vec![0; cells],
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (x as usize) * (self.height as usize) + (y as usize)
    }

    pub fn terrain_code(&self, x: i32, y: i32) -> Option<u8> {
        if self.contains(x, y) {
            Some(self.terrain[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn set_terrain_code(&mut self, x: i32, y: i32, code: u8) -> Result<()> {
        if !self.contains(x, y) {
            return Err(MapError::OutOfBounds(x, y));
        }
        let i = self.index(x, y);
        self.terrain[i] = code;
        Ok(())
    }

    pub fn elevation(&self, x: i32, y: i32) -> Option<i32> {
        if self.contains(x, y) {
            Some(self.elevation[self.index(x, y)] as i32)
        } else {
            None
        }
    }

    pub fn set_elevation(&mut self, x: i32, y: i32, elevation: i32) -> Result<()> {
        if !self.contains(x, y) {
            return Err(MapError::OutOfBounds(x, y));
        }
        let i = self.index(x, y);
        self.elevation[i] = elevation as i8;
        Ok(())
    }

    /// Rotate both grids 180 degrees in place.
    pub fn flip(&mut self) {
        self.terrain.reverse();
        self.elevation.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut grid = RasterGrid::new(10, 10).unwrap();
        assert_eq!(grid.terrain_code(-1, 0), None);
        assert_eq!(grid.terrain_code(10, 0), None);
        assert_eq!(grid.elevation(0, 10), None);
        assert!(grid.set_terrain_code(10, 10, 1).is_err());
        assert!(grid.set_elevation(-1, 0, 1).is_err());
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = RasterGrid::new(4, 3).unwrap();
        grid.set_terrain_code(2, 1, 7).unwrap();
        grid.set_elevation(2, 1, -2).unwrap();
        assert_eq!(grid.terrain_code(2, 1), Some(7));
        assert_eq!(grid.elevation(2, 1), Some(-2));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(RasterGrid::new(0, 5).is_err());
        assert!(RasterGrid::new(5, -1).is_err());
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let mut grid = RasterGrid::new(5, 4).unwrap();
        grid.set_terrain_code(0, 0, 3).unwrap();
        grid.set_terrain_code(4, 3, 9).unwrap();
        grid.set_elevation(1, 2, 2).unwrap();

        grid.flip();
        assert_eq!(grid.terrain_code(4, 3), Some(3));
        assert_eq!(grid.terrain_code(0, 0), Some(9));

        grid.flip();
        assert_eq!(grid.terrain_code(0, 0), Some(3));
        assert_eq!(grid.elevation(1, 2), Some(2));
    }
}
