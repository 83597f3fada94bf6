use std::fmt;

use crate::app::{Rgba, ScreenRect, SpriteRect, Surface};

const FALLBACK_SOLID_COLOR: Rgba = [112, 83, 58, 255];
const FALLBACK_HAZARD_COLOR: Rgba = [196, 52, 44, 255];
const FALLBACK_FINISH_COLOR: Rgba = [232, 196, 60, 255];
const FALLBACK_SPAWN_COLOR: Rgba = [70, 120, 220, 255];
const FALLBACK_LIGHT_COLOR: Rgba = [250, 240, 170, 255];
const FALLBACK_PLAIN_COLOR: Rgba = [74, 112, 56, 255];

/// Numeric tile type reference. `TileTypeId::EMPTY` never has a definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileTypeId(pub u16);

impl TileTypeId {
    pub const EMPTY: TileTypeId = TileTypeId(0);

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl fmt::Display for TileTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileAttribute {
    Solid,
    Spawn,
    Hazard,
    Finish,
    LightSource,
}

impl TileAttribute {
    pub const ALL: [TileAttribute; 5] = [
        TileAttribute::Solid,
        TileAttribute::Spawn,
        TileAttribute::Hazard,
        TileAttribute::Finish,
        TileAttribute::LightSource,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            TileAttribute::Solid => "Solid",
            TileAttribute::Spawn => "Spawn",
            TileAttribute::Hazard => "Hazard",
            TileAttribute::Finish => "Finish",
            TileAttribute::LightSource => "LightSource",
        }
    }

    /// Case-insensitive; `LIGHT_SOURCE` and `LightSource` are the same flag.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().replace('_', "");
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.name().eq_ignore_ascii_case(&normalized))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileAttributes(u8);

impl TileAttributes {
    pub const NONE: TileAttributes = TileAttributes(0);

    pub fn with(mut self, attribute: TileAttribute) -> Self {
        self.insert(attribute);
        self
    }

    pub fn insert(&mut self, attribute: TileAttribute) {
        self.0 |= attribute.bit();
    }

    pub fn contains(self, attribute: TileAttribute) -> bool {
        self.0 & attribute.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = TileAttribute> {
        TileAttribute::ALL
            .into_iter()
            .filter(move |attribute| self.contains(*attribute))
    }
}

impl FromIterator<TileAttribute> for TileAttributes {
    fn from_iter<I: IntoIterator<Item = TileAttribute>>(iter: I) -> Self {
        iter.into_iter()
            .fold(TileAttributes::NONE, TileAttributes::with)
    }
}

/// Animation or variant frames laid out left to right on one sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteFrames {
    pub sheet: String,
    pub x: u32,
    pub y: u32,
    pub frame_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileTypeDef {
    pub id: TileTypeId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub attributes: TileAttributes,
    pub sprite: Option<SpriteFrames>,
}

impl TileTypeDef {
    pub fn has_attribute(&self, attribute: TileAttribute) -> bool {
        self.attributes.contains(attribute)
    }

    pub fn frame_count(&self) -> u32 {
        self.sprite
            .as_ref()
            .map(|sprite| sprite.frame_count.max(1))
            .unwrap_or(1)
    }

    pub fn clamp_frame(&self, frame: u32) -> u32 {
        frame.min(self.frame_count() - 1)
    }

    pub fn frame_rect(&self, frame: u32) -> Option<SpriteRect> {
        let sprite = self.sprite.as_ref()?;
        let frame = self.clamp_frame(frame);
        let x = frame
            .checked_mul(self.width)
            .and_then(|offset| sprite.x.checked_add(offset))?;
        Some(SpriteRect {
            x,
            y: sprite.y,
            width: self.width,
            height: self.height,
        })
    }

    pub fn draw(&self, surface: &mut dyn Surface, x: i32, y: i32, frame: u32) {
        match (&self.sprite, self.frame_rect(frame)) {
            (Some(sprite), Some(src)) => surface.blit(&sprite.sheet, src, x, y),
            _ => surface.fill_rect(
                ScreenRect::new(x, y, self.width, self.height),
                self.fallback_color(),
            ),
        }
    }

    fn fallback_color(&self) -> Rgba {
        if self.has_attribute(TileAttribute::Hazard) {
            FALLBACK_HAZARD_COLOR
        } else if self.has_attribute(TileAttribute::Finish) {
            FALLBACK_FINISH_COLOR
        } else if self.has_attribute(TileAttribute::Spawn) {
            FALLBACK_SPAWN_COLOR
        } else if self.has_attribute(TileAttribute::Solid) {
            FALLBACK_SOLID_COLOR
        } else if self.has_attribute(TileAttribute::LightSource) {
            FALLBACK_LIGHT_COLOR
        } else {
            FALLBACK_PLAIN_COLOR
        }
    }
}
