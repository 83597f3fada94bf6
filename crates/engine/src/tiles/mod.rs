mod atomic_io;
pub mod collision;
pub mod level_format;
pub mod registry;
pub mod tile;
pub mod tilemap;
pub mod types;

pub use collision::{
    any_with_attribute, is_blocked, sweep_x, sweep_y, tiles_overlapping, Aabb, AxisMove,
    COLLISION_LAYER,
};
pub use level_format::{parse_level, write_level, LevelGrid, LevelParseError, LAYER_SEPARATOR};
pub use registry::{
    CycleDirection, DefinitionErrorCode, SourceLocation, TileTypeLoadError, TileTypeRegistry,
};
pub use tile::Tile;
pub use tilemap::{Layer, TileMap, TileMapError, MAX_MAP_DIMENSION, TILE_SIZE_PX};
pub use types::{SpriteFrames, TileAttribute, TileAttributes, TileTypeDef, TileTypeId};
