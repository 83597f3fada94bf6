use super::registry::TileTypeRegistry;
use super::tile::Tile;
use super::tilemap::{Layer, TileMap, TILE_SIZE_PX};
use super::types::TileAttribute;

/// Tiles on this layer take part in movement and attribute checks.
pub const COLLISION_LAYER: Layer = Layer::Foreground;

/// Axis-aligned box in map pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Aabb {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Aabb {
        Aabb {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMove {
    pub moved: i32,
    pub blocked: bool,
}

/// Tiles on `layer` whose grid cell the box overlaps. Cells off the map are
/// simply absent.
pub fn tiles_overlapping<'m>(map: &'m TileMap, aabb: Aabb, layer: Layer) -> Vec<&'m Tile> {
    if aabb.width == 0 || aabb.height == 0 {
        return Vec::new();
    }
    let first_col = aabb.x.div_euclid(TILE_SIZE_PX);
    let last_col = (aabb.right() - 1).div_euclid(TILE_SIZE_PX);
    let first_row = aabb.y.div_euclid(TILE_SIZE_PX);
    let last_row = (aabb.bottom() - 1).div_euclid(TILE_SIZE_PX);

    (first_row..=last_row)
        .flat_map(|row| (first_col..=last_col).map(move |col| (col, row)))
        .filter_map(|(col, row)| map.tile_at(col * TILE_SIZE_PX, row * TILE_SIZE_PX, layer))
        .collect()
}

pub fn any_with_attribute(
    map: &TileMap,
    registry: &TileTypeRegistry,
    aabb: Aabb,
    attribute: TileAttribute,
) -> bool {
    tiles_overlapping(map, aabb, COLLISION_LAYER)
        .into_iter()
        .any(|tile| tile.has_attribute(registry, attribute))
}

/// Solid tiles block, as do the map's left, right and top edges. The bottom
/// is open so bodies can fall out of the level.
pub fn is_blocked(map: &TileMap, registry: &TileTypeRegistry, aabb: Aabb) -> bool {
    if aabb.x < 0 || aabb.y < 0 || aabb.right() as i64 > map.width_px() as i64 {
        return true;
    }
    any_with_attribute(map, registry, aabb, TileAttribute::Solid)
}

/// Moves one pixel at a time along x and stops just short of the first
/// blocked position.
pub fn sweep_x(map: &TileMap, registry: &TileTypeRegistry, aabb: Aabb, dx: i32) -> AxisMove {
    sweep(dx, |moved| is_blocked(map, registry, aabb.offset(moved, 0)))
}

pub fn sweep_y(map: &TileMap, registry: &TileTypeRegistry, aabb: Aabb, dy: i32) -> AxisMove {
    sweep(dy, |moved| is_blocked(map, registry, aabb.offset(0, moved)))
}

fn sweep(delta: i32, blocked_at: impl Fn(i32) -> bool) -> AxisMove {
    let step = delta.signum();
    let mut moved = 0;
    while moved != delta {
        if blocked_at(moved + step) {
            return AxisMove {
                moved,
                blocked: true,
            };
        }
        moved += step;
    }
    AxisMove {
        moved,
        blocked: false,
    }
}
