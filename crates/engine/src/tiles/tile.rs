use super::registry::TileTypeRegistry;
use super::types::{TileAttribute, TileAttributes, TileTypeDef, TileTypeId};
use crate::app::Surface;

/// One grid cell. Holds only a type id; every type-derived query goes through
/// the registry and degrades to "empty" when the id has no definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tile {
    x: i32,
    y: i32,
    type_id: TileTypeId,
}

impl Tile {
    pub fn new(x: i32, y: i32, type_id: TileTypeId) -> Self {
        Self { x, y, type_id }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn type_id(&self) -> TileTypeId {
        self.type_id
    }

    /// Accepts any id, loaded or not.
    pub fn set_type(&mut self, type_id: TileTypeId) {
        self.type_id = type_id;
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn type_def<'r>(&self, registry: &'r TileTypeRegistry) -> Option<&'r TileTypeDef> {
        registry.get_type(self.type_id)
    }

    pub fn width(&self, registry: &TileTypeRegistry) -> u32 {
        self.type_def(registry).map_or(0, |def| def.width)
    }

    pub fn height(&self, registry: &TileTypeRegistry) -> u32 {
        self.type_def(registry).map_or(0, |def| def.height)
    }

    pub fn attributes(&self, registry: &TileTypeRegistry) -> TileAttributes {
        self.type_def(registry)
            .map_or(TileAttributes::NONE, |def| def.attributes)
    }

    pub fn has_attribute(&self, registry: &TileTypeRegistry, attribute: TileAttribute) -> bool {
        self.attributes(registry).contains(attribute)
    }

    pub fn display_name<'r>(&self, registry: &'r TileTypeRegistry) -> &'r str {
        self.type_def(registry).map_or("", |def| def.name.as_str())
    }

    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        registry: &TileTypeRegistry,
        origin_x: i32,
        origin_y: i32,
        frame: u32,
    ) {
        if let Some(def) = self.type_def(registry) {
            def.draw(surface, self.x - origin_x, self.y - origin_y, frame);
        }
    }
}
