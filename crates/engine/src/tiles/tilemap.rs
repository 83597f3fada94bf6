use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::atomic_io::write_level_atomic;
use super::level_format::{parse_level, write_level, LevelGrid};
use super::registry::TileTypeRegistry;
use super::tile::Tile;
use super::types::TileTypeId;
use crate::app::{ScreenRect, Surface};

/// Grid cell edge in pixels, shared by every tile type. Type sizes only
/// affect rendering.
pub const TILE_SIZE_PX: i32 = 64;
pub const MAX_MAP_DIMENSION: i64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Foreground,
    Background,
}

impl Layer {
    pub const ALL: [Layer; 2] = [Layer::Foreground, Layer::Background];

    pub fn index(self) -> usize {
        match self {
            Layer::Foreground => 0,
            Layer::Background => 1,
        }
    }

    pub fn toggled(self) -> Layer {
        match self {
            Layer::Foreground => Layer::Background,
            Layer::Background => Layer::Foreground,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Layer::Foreground => "foreground",
            Layer::Background => "background",
        }
    }
}

#[derive(Debug, Error)]
pub enum TileMapError {
    #[error("map dimensions {width}x{height} must each be in 1..={MAX_MAP_DIMENSION}")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("level file not found: {path}")]
    FileNotFound { path: PathBuf },
    #[error("failed to read level {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed level {path} at line {line}: {reason}")]
    MalformedLevel {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("refusing to save an empty map to {path}")]
    EmptyMap { path: PathBuf },
    #[error("failed to write level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Two equally sized layers of tiles, stored row-major. Every `(col, row)`
/// valid for one layer is valid for the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileMap {
    width: usize,
    height: usize,
    layers: [Vec<Tile>; 2],
}

impl TileMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_size(width: i64, height: i64) -> Result<Self, TileMapError> {
        let mut map = Self::empty();
        map.new_grid(width, height)?;
        Ok(map)
    }

    /// Reallocates both layers as `width x height` empty tiles. On error the
    /// map keeps its previous grid.
    pub fn new_grid(&mut self, width: i64, height: i64) -> Result<(), TileMapError> {
        let valid = 1..=MAX_MAP_DIMENSION;
        if !valid.contains(&width) || !valid.contains(&height) {
            return Err(TileMapError::InvalidDimensions { width, height });
        }
        let (width, height) = (width as usize, height as usize);
        let blank = vec![TileTypeId::EMPTY; width * height];
        self.replace_grid(width, height, &blank, &blank);
        debug!(width, height, "tile_map_reset");
        Ok(())
    }

    pub fn load(&mut self, path: &Path) -> Result<(), TileMapError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                TileMapError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                TileMapError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let grid = parse_level(&raw).map_err(|error| TileMapError::MalformedLevel {
            path: path.to_path_buf(),
            line: error.line,
            reason: error.reason,
        })?;
        let too_large = |dimension: usize| dimension as i64 > MAX_MAP_DIMENSION;
        if too_large(grid.width) || too_large(grid.height) {
            return Err(TileMapError::MalformedLevel {
                path: path.to_path_buf(),
                line: 1,
                reason: format!(
                    "{}x{} exceeds the {MAX_MAP_DIMENSION} tile limit",
                    grid.width, grid.height
                ),
            });
        }

        self.replace_grid(grid.width, grid.height, &grid.foreground, &grid.background);
        info!(
            path = %path.display(),
            width = self.width,
            height = self.height,
            "level_loaded"
        );
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), TileMapError> {
        if self.width == 0 || self.height == 0 {
            return Err(TileMapError::EmptyMap {
                path: path.to_path_buf(),
            });
        }
        let text = write_level(&self.to_grid());
        write_level_atomic(path, &text).map_err(|source| TileMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            width = self.width,
            height = self.height,
            "level_saved"
        );
        Ok(())
    }

    pub fn to_grid(&self) -> LevelGrid {
        let ids = |layer: Layer| {
            self.layers[layer.index()]
                .iter()
                .map(Tile::type_id)
                .collect::<Vec<_>>()
        };
        LevelGrid {
            width: self.width,
            height: self.height,
            foreground: ids(Layer::Foreground),
            background: ids(Layer::Background),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width_px(&self) -> u32 {
        (self.width as u32).saturating_mul(TILE_SIZE_PX as u32)
    }

    pub fn height_px(&self) -> u32 {
        (self.height as u32).saturating_mul(TILE_SIZE_PX as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn tiles(&self, layer: Layer) -> &[Tile] {
        &self.layers[layer.index()]
    }

    /// Grid cell containing the pixel, if it lies on the map.
    pub fn cell_at(&self, px: i32, py: i32) -> Option<(usize, usize)> {
        if px < 0 || py < 0 {
            return None;
        }
        let col = (px / TILE_SIZE_PX) as usize;
        let row = (py / TILE_SIZE_PX) as usize;
        (col < self.width && row < self.height).then_some((col, row))
    }

    pub fn tile(&self, col: usize, row: usize, layer: Layer) -> Option<&Tile> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.layers[layer.index()].get(row * self.width + col)
    }

    pub fn tile_mut(&mut self, col: usize, row: usize, layer: Layer) -> Option<&mut Tile> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let width = self.width;
        self.layers[layer.index()].get_mut(row * width + col)
    }

    pub fn tile_at(&self, px: i32, py: i32, layer: Layer) -> Option<&Tile> {
        let (col, row) = self.cell_at(px, py)?;
        self.tile(col, row, layer)
    }

    pub fn tile_at_mut(&mut self, px: i32, py: i32, layer: Layer) -> Option<&mut Tile> {
        let (col, row) = self.cell_at(px, py)?;
        self.tile_mut(col, row, layer)
    }

    /// First match in row-major order.
    pub fn find_tile_of_type(&self, type_id: TileTypeId, layer: Layer) -> Option<&Tile> {
        self.layers[layer.index()]
            .iter()
            .find(|tile| tile.type_id() == type_id)
    }

    pub fn fill(&mut self, layer: Layer, type_id: TileTypeId) {
        for tile in &mut self.layers[layer.index()] {
            tile.set_type(type_id);
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface, registry: &TileTypeRegistry, camera_x: i32, camera_y: i32) {
        self.draw_frame(surface, registry, camera_x, camera_y, 0);
    }

    /// Background first, then foreground. Tiles whose drawn box misses the
    /// viewport are skipped.
    pub fn draw_frame(
        &self,
        surface: &mut dyn Surface,
        registry: &TileTypeRegistry,
        camera_x: i32,
        camera_y: i32,
        frame: u32,
    ) {
        let (view_width, view_height) = surface.size();
        let viewport = ScreenRect::new(camera_x, camera_y, view_width, view_height);
        for layer in [Layer::Background, Layer::Foreground] {
            for tile in &self.layers[layer.index()] {
                let Some(def) = tile.type_def(registry) else {
                    continue;
                };
                let bounds = ScreenRect::new(tile.x(), tile.y(), def.width, def.height);
                if bounds.intersects(&viewport) {
                    tile.draw(surface, registry, camera_x, camera_y, frame);
                }
            }
        }
    }

    fn replace_grid(
        &mut self,
        width: usize,
        height: usize,
        foreground: &[TileTypeId],
        background: &[TileTypeId],
    ) {
        let build = |ids: &[TileTypeId]| {
            ids.iter()
                .enumerate()
                .map(|(index, id)| {
                    let col = (index % width) as i32;
                    let row = (index / width) as i32;
                    Tile::new(col * TILE_SIZE_PX, row * TILE_SIZE_PX, *id)
                })
                .collect::<Vec<_>>()
        };
        self.layers = [build(foreground), build(background)];
        self.width = width;
        self.height = height;
    }
}
