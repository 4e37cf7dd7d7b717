//! Tile-grid walkability.
//!
//! A [`CollisionMap`] stacks a base collision grid with zero or more overlay
//! grids (the building layer). A pixel is walkable only when it lies inside the
//! base grid and every layer marks its tile as walkable.

use glam::{IVec2, UVec2};
use smallvec::SmallVec;

use crate::constants::EMPTY_TILE_ID;

/// An immutable 2D grid of walkability flags, indexed by tile coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    /// Row-major: `cells[y * width + x]`.
    cells: Vec<bool>,
}

impl TileGrid {
    /// Builds a grid from explicit flags. Returns `None` for an empty or mis-sized grid.
    pub fn new(width: u32, height: u32, cells: Vec<bool>) -> Option<Self> {
        if width == 0 || height == 0 || cells.len() != (width * height) as usize {
            return None;
        }
        Some(Self { width, height, cells })
    }

    /// Builds a grid from a collision layout where `0` is walkable and anything else is a wall.
    ///
    /// Rows may be ragged; cells missing from a short row are treated as walls.
    pub fn from_collision_rows(rows: &[Vec<u8>]) -> Option<Self> {
        Self::from_rows(rows, |cell| cell.map(|value| *value == 0).unwrap_or(false))
    }

    /// Builds a grid from a sparse tile layer where [`EMPTY_TILE_ID`] is walkable and any tile blocks.
    ///
    /// Cells missing from a short row count as empty.
    pub fn from_occupancy_rows(rows: &[Vec<i32>]) -> Option<Self> {
        Self::from_rows(rows, |cell| cell.map(|id| *id == EMPTY_TILE_ID).unwrap_or(true))
    }

    fn from_rows<T>(rows: &[Vec<T>], walkable: impl Fn(Option<&T>) -> bool) -> Option<Self> {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;

        let mut cells = Vec::with_capacity((width * height) as usize);
        for row in rows {
            for x in 0..width as usize {
                cells.push(walkable(row.get(x)));
            }
        }

        Self::new(width, height, cells)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    pub fn contains(&self, tile: IVec2) -> bool {
        tile.x >= 0 && tile.y >= 0 && (tile.x as u32) < self.width && (tile.y as u32) < self.height
    }

    /// Out-of-bounds tiles are never walkable.
    pub fn walkable(&self, tile: IVec2) -> bool {
        if !self.contains(tile) {
            return false;
        }
        self.cells[tile.y as usize * self.width as usize + tile.x as usize]
    }

    /// Iterates over the coordinates of every walkable tile.
    pub fn walkable_tiles(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.cells.iter().enumerate().filter(|(_, walkable)| **walkable).map(move |(index, _)| {
            IVec2::new((index % self.width as usize) as i32, (index / self.width as usize) as i32)
        })
    }
}

/// Collision layers for a single map, queried in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionMap {
    base: TileGrid,
    overlays: SmallVec<[TileGrid; 1]>,
    tile_size: u32,
}

impl CollisionMap {
    pub fn new(base: TileGrid, tile_size: u32) -> Self {
        Self {
            base,
            overlays: SmallVec::new(),
            tile_size,
        }
    }

    /// Adds a layer that can only block tiles, never open them.
    pub fn with_overlay(mut self, overlay: TileGrid) -> Self {
        self.overlays.push(overlay);
        self
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn base(&self) -> &TileGrid {
        &self.base
    }

    /// Pixel extent covered by the base grid.
    pub fn pixel_size(&self) -> UVec2 {
        self.base.size() * self.tile_size
    }

    /// Converts a pixel position to the tile containing it.
    pub fn tile_at(&self, pixel: IVec2) -> IVec2 {
        pixel.div_euclid(IVec2::splat(self.tile_size as i32))
    }

    /// Pixel center of a tile.
    pub fn tile_center(&self, tile: IVec2) -> IVec2 {
        tile * self.tile_size as i32 + IVec2::splat(self.tile_size as i32 / 2)
    }

    /// Whether the tile at a given tile coordinate can be stood on.
    pub fn tile_walkable(&self, tile: IVec2) -> bool {
        self.base.walkable(tile)
            && self
                .overlays
                .iter()
                .all(|overlay| !overlay.contains(tile) || overlay.walkable(tile))
    }

    /// Whether the pixel at `(x, y)` is walkable. Negative and out-of-range pixels never are.
    pub fn walkable(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || self.tile_size == 0 {
            return false;
        }
        self.tile_walkable(self.tile_at(IVec2::new(x, y)))
    }
}
