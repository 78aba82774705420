use glam::Vec2;

use crate::api::TileQuery;
use crate::error::TileMapError;
use crate::types::Body;

/// Default tile edge in pixels.
pub const TILE_SIZE: f32 = 16.0;

/// Row-major grid of per-cell flag bytes, origin at pixel (0, 0).
#[derive(Clone, Debug)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: f32,
    cells: Vec<u8>,
    solid_bounds: bool,
}

impl TileGrid {
    /// Blocks general movement.
    pub const SOLID: u8 = 1 << 0;
    /// Liquid; ignored by solidity queries.
    pub const WATER: u8 = 1 << 1;

    /// Empty grid of `width` x `height` cells.
    pub fn new(width: u32, height: u32, tile_size: f32) -> Result<Self, TileMapError> {
        let len = Self::check_dims(width, height, tile_size)?;
        Ok(Self {
            width,
            height,
            tile_size,
            cells: vec![0; len],
            solid_bounds: false,
        })
    }

    pub fn from_cells(
        width: u32,
        height: u32,
        tile_size: f32,
        cells: Vec<u8>,
    ) -> Result<Self, TileMapError> {
        let expected = Self::check_dims(width, height, tile_size)?;
        if cells.len() != expected {
            return Err(TileMapError::CellCount { expected, actual: cells.len() });
        }
        Ok(Self { width, height, tile_size, cells, solid_bounds: false })
    }

    /// Parse rows of glyphs: `#` solid, `~` water, `.` or space empty.
    pub fn from_ascii<S: AsRef<str>>(rows: &[S], tile_size: f32) -> Result<Self, TileMapError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        Self::check_dims(width as u32, height as u32, tile_size)?;
        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let len = line.chars().count();
            if len != width {
                return Err(TileMapError::RaggedRow { row, len, expected: width });
            }
            for (col, glyph) in line.chars().enumerate() {
                let flags = match glyph {
                    '#' => Self::SOLID,
                    '~' => Self::WATER,
                    '.' | ' ' => 0,
                    _ => return Err(TileMapError::UnknownGlyph { glyph, row, col }),
                };
                cells.push(flags);
            }
        }
        Self::from_cells(width as u32, height as u32, tile_size, cells)
    }

    /// Treat everything outside the grid as solid.
    pub fn with_solid_bounds(mut self, solid: bool) -> Self {
        self.solid_bounds = solid;
        self
    }

    fn check_dims(width: u32, height: u32, tile_size: f32) -> Result<usize, TileMapError> {
        if width == 0 || height == 0 {
            return Err(TileMapError::ZeroSize { width, height });
        }
        if !(tile_size > 0.0) {
            return Err(TileMapError::TileSize(tile_size));
        }
        Ok(width as usize * height as usize)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Pixel to cell, flooring toward negative infinity.
    pub fn world_to_cell(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x / self.tile_size).floor() as i32,
            (p.y / self.tile_size).floor() as i32,
        )
    }

    fn index(&self, cx: i32, cy: i32) -> Option<usize> {
        if cx < 0 || cy < 0 || cx >= self.width as i32 || cy >= self.height as i32 {
            return None;
        }
        Some(cy as usize * self.width as usize + cx as usize)
    }

    /// Flags of a cell; out-of-range cells read as `SOLID` or empty depending
    /// on `with_solid_bounds`.
    pub fn flags(&self, cx: i32, cy: i32) -> u8 {
        match self.index(cx, cy) {
            Some(i) => self.cells[i],
            None if self.solid_bounds => Self::SOLID,
            None => 0,
        }
    }

    /// Overwrite one cell. Returns false when the cell is outside the grid.
    pub fn set(&mut self, cx: i32, cy: i32, flags: u8) -> bool {
        match self.index(cx, cy) {
            Some(i) => {
                self.cells[i] = flags;
                true
            }
            None => false,
        }
    }

    /// Overwrite an inclusive cell rectangle, clipped to the grid.
    pub fn fill_rect(&mut self, cx0: i32, cy0: i32, cx1: i32, cy1: i32, flags: u8) {
        for cy in cy0.min(cy1)..=cy0.max(cy1) {
            for cx in cx0.min(cx1)..=cx0.max(cx1) {
                self.set(cx, cy, flags);
            }
        }
    }

    /// True iff no cell covered by `body` carries any of `flags`.
    ///
    /// Covers the half-open pixel range `[pos, pos + size)`.
    pub fn is_free_of(&self, body: &Body, flags: u8) -> bool {
        let (x0, y0) = self.world_to_cell(body.pos);
        let far = body.pos + body.size;
        let x1 = (far.x / self.tile_size).ceil() as i32 - 1;
        let y1 = (far.y / self.tile_size).ceil() as i32 - 1;
        for cy in y0..=y1.max(y0) {
            for cx in x0..=x1.max(x0) {
                if self.flags(cx, cy) & flags != 0 {
                    return false;
                }
            }
        }
        true
    }
}

impl TileQuery for TileGrid {
    fn is_solid(&self, x: f32, y: f32) -> bool {
        let (cx, cy) = self.world_to_cell(Vec2::new(x, y));
        self.flags(cx, cy) & Self::SOLID != 0
    }

    fn tile_size(&self) -> Option<f32> {
        Some(self.tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_to_cell_floor() {
        let mut g = TileGrid::new(4, 4, TILE_SIZE).unwrap();
        g.set(1, 2, TileGrid::SOLID);
        assert!(g.is_solid(16.0, 32.0));
        assert!(g.is_solid(31.9, 47.9));
        assert!(!g.is_solid(15.9, 32.0));
        assert!(!g.is_solid(16.0, 48.0));
    }

    #[test]
    fn test_out_of_range_policy() {
        let g = TileGrid::new(2, 2, TILE_SIZE).unwrap();
        assert!(!g.is_solid(-1.0, 0.0));
        assert!(!g.is_solid(100.0, 100.0));
        let closed = g.with_solid_bounds(true);
        assert!(closed.is_solid(-0.5, 0.0));
        assert!(closed.is_solid(32.0, 0.0));
        assert!(!closed.is_solid(31.0, 31.0));
    }

    #[test]
    fn test_from_ascii_and_water_is_not_solid() {
        let g = TileGrid::from_ascii(&["..#", "~~#"], TILE_SIZE).unwrap();
        assert_eq!((g.width(), g.height()), (3, 2));
        assert!(g.is_solid(40.0, 4.0));
        assert!(!g.is_solid(4.0, 20.0));
        assert_eq!(g.flags(0, 1), TileGrid::WATER);
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            TileGrid::new(0, 3, TILE_SIZE).unwrap_err(),
            TileMapError::ZeroSize { width: 0, height: 3 }
        );
        assert_eq!(
            TileGrid::from_cells(2, 2, TILE_SIZE, vec![0; 3]).unwrap_err(),
            TileMapError::CellCount { expected: 4, actual: 3 }
        );
        assert_eq!(
            TileGrid::from_ascii(&["..", "."], TILE_SIZE).unwrap_err(),
            TileMapError::RaggedRow { row: 1, len: 1, expected: 2 }
        );
        assert!(matches!(
            TileGrid::from_ascii(&[".x"], TILE_SIZE),
            Err(TileMapError::UnknownGlyph { glyph: 'x', row: 0, col: 1 })
        ));
        assert!(matches!(TileGrid::new(1, 1, 0.0), Err(TileMapError::TileSize(_))));
    }

    #[test]
    fn test_is_free_of_water() {
        let g = TileGrid::from_ascii(&["....", "..~~", "...."], TILE_SIZE).unwrap();
        // Box sitting exactly on top of the water row does not touch it.
        assert!(g.is_free_of(&Body::new(32.0, 0.0, 16.0, 16.0), TileGrid::WATER));
        // Dipping one pixel in does.
        assert!(!g.is_free_of(&Body::new(32.0, 1.0, 16.0, 16.0), TileGrid::WATER));
        assert!(g.is_free_of(&Body::new(32.0, 1.0, 16.0, 16.0), TileGrid::SOLID));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut g = TileGrid::new(3, 3, TILE_SIZE).unwrap();
        g.fill_rect(-2, 1, 5, 1, TileGrid::SOLID);
        for cx in 0..3 {
            assert_eq!(g.flags(cx, 1), TileGrid::SOLID);
            assert_eq!(g.flags(cx, 0), 0);
        }
        assert!(!g.set(3, 0, TileGrid::SOLID));
    }
}
