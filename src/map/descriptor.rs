//! Validated, in-memory form of a [`MapRecord`].

use glam::{IVec2, UVec2};

use crate::error::MapError;
use crate::map::grid::{CollisionMap, TileGrid};
use crate::map::record::{DecorationRecord, InteractableRecord, MapKind, MapRecord};

/// A render-only layer of tile ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    rows: Vec<Vec<i32>>,
    size: UVec2,
}

impl TileLayer {
    pub fn new(rows: Vec<Vec<i32>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let size = UVec2::new(width, rows.len() as u32);
        Self { rows, size }
    }

    /// Tile count per axis; the width is that of the longest row.
    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn get(&self, tile: IVec2) -> Option<i32> {
        if tile.x < 0 || tile.y < 0 {
            return None;
        }
        self.rows.get(tile.y as usize)?.get(tile.x as usize).copied()
    }

    pub fn rows(&self) -> &[Vec<i32>] {
        &self.rows
    }
}

/// Which tileset image a map is drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetRef {
    pub source: String,
    /// Tileset width, in tiles.
    pub width: u32,
    /// Tile size inside the tileset image, in pixels.
    pub original_tile_size: u32,
    /// Tile size on screen, in pixels.
    pub tile_size: u32,
}

/// A fully validated map, ready to be made current by the map manager.
#[derive(Debug, Clone)]
pub struct MapDescriptor {
    pub name: String,
    pub kind: MapKind,
    pub terrain: TileLayer,
    pub building: Option<TileLayer>,
    /// Drawn on top; never collides.
    pub decoration: Option<TileLayer>,
    pub collision: CollisionMap,
    pub tileset: TilesetRef,
    pub spawn_tile: Option<UVec2>,
    pub decorations: Vec<DecorationRecord>,
    pub interactables: Vec<InteractableRecord>,
    pub collectibles: Vec<UVec2>,
}

impl MapDescriptor {
    pub fn tile_size(&self) -> u32 {
        self.tileset.tile_size
    }

    /// World size in pixels: terrain tile count times tile size, per axis.
    pub fn world_size(&self) -> UVec2 {
        self.terrain.size() * self.tile_size()
    }

    /// Top-left pixel of the spawn tile, or the origin when the map declares none.
    pub fn spawn_pixel(&self) -> IVec2 {
        self.spawn_tile
            .map(|tile| (tile * self.tile_size()).as_ivec2())
            .unwrap_or(IVec2::ZERO)
    }

    pub fn can_move(&self, x: i32, y: i32) -> bool {
        self.collision.walkable(x, y)
    }
}

/// Checks that `rows` form a non-empty rectangle, and that it matches `expected` when given.
fn layer_size<T>(map: &str, layer: &'static str, rows: &[Vec<T>], expected: Option<UVec2>) -> Result<UVec2, MapError> {
    let width = rows.first().map_or(0, Vec::len);
    if width == 0 {
        return Err(MapError::EmptyGrid {
            map: map.to_string(),
            layer,
        });
    }
    if let Some(row) = rows.iter().position(|row| row.len() != width) {
        return Err(MapError::RaggedGrid {
            map: map.to_string(),
            layer,
            row,
        });
    }

    let found = UVec2::new(width as u32, rows.len() as u32);
    match expected {
        Some(expected) if expected != found => Err(MapError::GridSizeMismatch {
            map: map.to_string(),
            layer,
            expected,
            found,
        }),
        _ => Ok(found),
    }
}

impl TryFrom<MapRecord> for MapDescriptor {
    type Error = MapError;

    fn try_from(record: MapRecord) -> Result<Self, Self::Error> {
        if record.tile_size == 0 {
            return Err(MapError::ZeroTileSize(record.name));
        }

        let size = layer_size(&record.name, "terrain", &record.terrain_grid, None)?;
        layer_size(&record.name, "collision", &record.collision_grid, Some(size))?;
        if let Some(building) = &record.building_grid {
            layer_size(&record.name, "building", building, Some(size))?;
        }
        if let Some(decoration) = &record.decoration_grid {
            layer_size(&record.name, "decoration", decoration, Some(size))?;
        }

        let base = TileGrid::from_collision_rows(&record.collision_grid).ok_or_else(|| MapError::EmptyGrid {
            map: record.name.clone(),
            layer: "collision",
        })?;
        let terrain = TileLayer::new(record.terrain_grid);
        if let Some((x, y)) = record.spawn_tile {
            if x >= terrain.size().x || y >= terrain.size().y {
                return Err(MapError::InvalidConfig(format!(
                    "spawn tile ({x}, {y}) lies outside '{}'",
                    record.name
                )));
            }
        }

        let mut collision = CollisionMap::new(base, record.tile_size);
        if let Some(building) = record.building_grid.as_deref().and_then(TileGrid::from_occupancy_rows) {
            collision = collision.with_overlay(building);
        }

        Ok(Self {
            kind: record.kind,
            terrain,
            building: record.building_grid.map(TileLayer::new),
            decoration: record.decoration_grid.map(TileLayer::new),
            collision,
            tileset: TilesetRef {
                source: record.tile_source_ref,
                width: record.tileset_width,
                original_tile_size: record.original_tile_size,
                tile_size: record.tile_size,
            },
            spawn_tile: record.spawn_tile.map(|(x, y)| UVec2::new(x, y)),
            decorations: record.static_decorations,
            interactables: record.interactables,
            collectibles: record.collectibles.into_iter().map(|(x, y)| UVec2::new(x, y)).collect(),
            name: record.name,
        })
    }
}
