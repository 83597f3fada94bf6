use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::warn;

pub type Rgba = [u8; 4];

pub const PLACEHOLDER_SHEET_COLOR: Rgba = [255, 0, 255, 255];

/// Source rectangle inside a sprite sheet, in sheet pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Destination rectangle on a surface. May extend past the surface edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn intersects(&self, other: &ScreenRect) -> bool {
        self.intersection(other).is_some()
    }

    pub fn intersection(&self, other: &ScreenRect) -> Option<ScreenRect> {
        let left = (self.x as i64).max(other.x as i64);
        let top = (self.y as i64).max(other.y as i64);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left >= right || top >= bottom {
            return None;
        }
        Some(ScreenRect {
            x: left as i32,
            y: top as i32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }

    pub fn translated(&self, dx: i32, dy: i32) -> ScreenRect {
        ScreenRect {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }
}

/// Minimal drawing capability the tile map, editor and race views draw through.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn fill_rect(&mut self, rect: ScreenRect, color: Rgba);

    /// Copies `src` from the named sheet to `(dst_x, dst_y)`, writing only inside `clip`.
    fn blit_clipped(
        &mut self,
        sheet: &str,
        src: SpriteRect,
        dst_x: i32,
        dst_y: i32,
        clip: ScreenRect,
    );

    fn bounds(&self) -> ScreenRect {
        let (width, height) = self.size();
        ScreenRect::new(0, 0, width, height)
    }

    fn blit(&mut self, sheet: &str, src: SpriteRect, dst_x: i32, dst_y: i32) {
        let clip = self.bounds();
        self.blit_clipped(sheet, src, dst_x, dst_y, clip);
    }

    fn clear(&mut self, color: Rgba) {
        let bounds = self.bounds();
        self.fill_rect(bounds, color);
    }
}

pub fn draw_outline(surface: &mut dyn Surface, rect: ScreenRect, thickness: u32, color: Rgba) {
    if rect.is_empty() || thickness == 0 {
        return;
    }
    let t = thickness.min(rect.width).min(rect.height);
    surface.fill_rect(ScreenRect::new(rect.x, rect.y, rect.width, t), color);
    surface.fill_rect(
        ScreenRect::new(rect.x, rect.y + (rect.height - t) as i32, rect.width, t),
        color,
    );
    surface.fill_rect(ScreenRect::new(rect.x, rect.y, t, rect.height), color);
    surface.fill_rect(
        ScreenRect::new(rect.x + (rect.width - t) as i32, rect.y, t, rect.height),
        color,
    );
}

/// Sheet keys are relative, lowercase paths under `assets/sprites` without an extension.
pub fn is_valid_sheet_key(key: &str) -> bool {
    if key.is_empty() || key.starts_with('/') || key.contains("..") {
        return false;
    }
    key.chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-'))
}

struct LoadedSheet {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// Lazily decoded sprite sheets. A sheet that fails to load is remembered as
/// missing and drawn as a placeholder from then on.
pub struct SpriteSheetCache {
    sprite_root: PathBuf,
    sheets: HashMap<String, Option<LoadedSheet>>,
    warned_keys: HashSet<String>,
}

impl SpriteSheetCache {
    pub fn new(asset_root: &Path) -> Self {
        Self {
            sprite_root: asset_root.join("sprites"),
            sheets: HashMap::new(),
            warned_keys: HashSet::new(),
        }
    }

    fn resolve(&mut self, key: &str) -> Option<&LoadedSheet> {
        if !self.sheets.contains_key(key) {
            let loaded = match self.load(key) {
                Ok(sheet) => Some(sheet),
                Err(reason) => {
                    if self.warned_keys.insert(key.to_string()) {
                        warn!(
                            sheet = key,
                            reason = reason.as_str(),
                            "sprite_sheet_load_failed_using_placeholder"
                        );
                    }
                    None
                }
            };
            self.sheets.insert(key.to_string(), loaded);
        }
        self.sheets.get(key).and_then(Option::as_ref)
    }

    fn load(&self, key: &str) -> Result<LoadedSheet, String> {
        if !is_valid_sheet_key(key) {
            return Err("invalid_key".to_string());
        }
        let path = self.sprite_root.join(format!("{key}.png"));
        let reader =
            ImageReader::open(&path).map_err(|error| format!("file_open_failed:{error}"))?;
        let decoded = reader
            .decode()
            .map_err(|error| format!("decode_failed:{error}"))?;
        let image = decoded.to_rgba8();
        Ok(LoadedSheet {
            width: image.width(),
            height: image.height(),
            rgba: image.into_raw(),
        })
    }
}

/// RGBA8 frame buffer surface, row-major, `width * height * 4` bytes.
pub struct FrameSurface<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    sheets: &'a mut SpriteSheetCache,
}

impl<'a> FrameSurface<'a> {
    pub fn new(
        frame: &'a mut [u8],
        width: u32,
        height: u32,
        sheets: &'a mut SpriteSheetCache,
    ) -> Self {
        let expected = width as usize * height as usize * 4;
        let (width, height) = if frame.len() < expected {
            (0, 0)
        } else {
            (width, height)
        };
        Self {
            frame,
            width,
            height,
            sheets,
        }
    }
}

impl Surface for FrameSurface<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Rgba) {
        let Some(visible) = rect.intersection(&self.bounds()) else {
            return;
        };
        let stride = self.width as usize * 4;
        for y in visible.y..visible.y + visible.height as i32 {
            let row = y as usize * stride;
            for x in visible.x..visible.x + visible.width as i32 {
                let offset = row + x as usize * 4;
                self.frame[offset..offset + 4].copy_from_slice(&color);
            }
        }
    }

    fn blit_clipped(
        &mut self,
        sheet: &str,
        src: SpriteRect,
        dst_x: i32,
        dst_y: i32,
        clip: ScreenRect,
    ) {
        let dst = ScreenRect::new(dst_x, dst_y, src.width, src.height);
        let Some(visible) = dst
            .intersection(&self.bounds())
            .and_then(|rect| rect.intersection(&clip))
        else {
            return;
        };
        let frame_width = self.width as usize;
        let frame = &mut *self.frame;
        let Some(loaded) = self.sheets.resolve(sheet) else {
            let stride = frame_width * 4;
            for y in visible.y..visible.y + visible.height as i32 {
                for x in visible.x..visible.x + visible.width as i32 {
                    let offset = y as usize * stride + x as usize * 4;
                    frame[offset..offset + 4].copy_from_slice(&PLACEHOLDER_SHEET_COLOR);
                }
            }
            return;
        };

        for y in visible.y..visible.y + visible.height as i32 {
            let src_y = src.y + (y - dst_y) as u32;
            if src_y >= loaded.height {
                continue;
            }
            for x in visible.x..visible.x + visible.width as i32 {
                let src_x = src.x + (x - dst_x) as u32;
                if src_x >= loaded.width {
                    continue;
                }
                let src_offset = (src_y as usize * loaded.width as usize + src_x as usize) * 4;
                let texel = &loaded.rgba[src_offset..src_offset + 4];
                let alpha = texel[3];
                if alpha == 0 {
                    continue;
                }
                let dst_offset = (y as usize * frame_width + x as usize) * 4;
                let out = &mut frame[dst_offset..dst_offset + 4];
                if alpha == u8::MAX {
                    out.copy_from_slice(texel);
                } else {
                    for channel in 0..3 {
                        out[channel] = blend_channel(out[channel], texel[channel], alpha);
                    }
                    out[3] = u8::MAX;
                }
            }
        }
    }
}

fn blend_channel(dst: u8, src: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8
}

/// A clipped, offset view into another surface, used for split-screen viewports.
pub struct SubSurface<'s> {
    inner: &'s mut dyn Surface,
    rect: ScreenRect,
}

impl<'s> SubSurface<'s> {
    pub fn new(inner: &'s mut dyn Surface, rect: ScreenRect) -> Self {
        let rect = rect
            .intersection(&inner.bounds())
            .unwrap_or(ScreenRect::new(rect.x, rect.y, 0, 0));
        Self { inner, rect }
    }
}

impl Surface for SubSurface<'_> {
    fn size(&self) -> (u32, u32) {
        (self.rect.width, self.rect.height)
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Rgba) {
        let translated = rect.translated(self.rect.x, self.rect.y);
        if let Some(visible) = translated.intersection(&self.rect) {
            self.inner.fill_rect(visible, color);
        }
    }

    fn blit_clipped(
        &mut self,
        sheet: &str,
        src: SpriteRect,
        dst_x: i32,
        dst_y: i32,
        clip: ScreenRect,
    ) {
        let clip = clip.translated(self.rect.x, self.rect.y);
        let Some(clip) = clip.intersection(&self.rect) else {
            return;
        };
        self.inner.blit_clipped(
            sheet,
            src,
            dst_x.saturating_add(self.rect.x),
            dst_y.saturating_add(self.rect.y),
            clip,
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum DrawCall {
        Fill(ScreenRect, Rgba),
        Blit {
            sheet: String,
            src: SpriteRect,
            dst_x: i32,
            dst_y: i32,
        },
    }

    pub(crate) struct RecordingSurface {
        pub width: u32,
        pub height: u32,
        pub calls: Vec<DrawCall>,
    }

    impl RecordingSurface {
        pub(crate) fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                calls: Vec::new(),
            }
        }
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn fill_rect(&mut self, rect: ScreenRect, color: Rgba) {
            self.calls.push(DrawCall::Fill(rect, color));
        }

        fn blit_clipped(
            &mut self,
            sheet: &str,
            src: SpriteRect,
            dst_x: i32,
            dst_y: i32,
            _clip: ScreenRect,
        ) {
            self.calls.push(DrawCall::Blit {
                sheet: sheet.to_string(),
                src,
                dst_x,
                dst_y,
            });
        }
    }
}
