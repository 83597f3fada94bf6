use std::path::Path;

use engine::{
    draw_outline, draw_text, draw_text_centered, text_width, AppPaths, Camera, CycleDirection,
    InputAction, InputSnapshot, Layer, Rgba, ScreenRect, SubSurface, Surface, TileMap,
    TileMapError, TileTypeId, TileTypeRegistry, TILE_SIZE_PX,
};
use tracing::{info, warn};

use super::GameContext;

const CAMERA_SPEED: u32 = 8;
/// Cursor distance from the screen edge that starts scrolling.
const SCROLL_MARGIN_PX: u32 = 96;
const BACKGROUND: Rgba = [255, 255, 255, 255];
const PANEL_COLOR: Rgba = [32, 36, 48, 230];
const PANEL_TEXT: Rgba = [240, 240, 240, 255];
const STATUS_COLOR: Rgba = [250, 214, 72, 255];
const CURSOR_COLOR: Rgba = [230, 40, 40, 255];
const DIALOG_COLOR: Rgba = [20, 24, 36, 245];
const PANEL_HEIGHT: u32 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EditorMode {
    Editing,
    Opening,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EditorCommand {
    None,
    ToMenu,
}

/// Map being edited plus the editor's view and selection state.
#[derive(Debug)]
pub(crate) struct EditorSession {
    map: TileMap,
    camera: Camera,
    screen: (u32, u32),
    layer: Layer,
    selected: TileTypeId,
    mode: EditorMode,
    open_name: String,
    save_name: String,
    new_map_size: (i64, i64),
    status: Option<String>,
}

impl EditorSession {
    /// Starts on a blank map with the open dialog showing.
    pub(crate) fn new(ctx: &GameContext) -> Self {
        let new_map_size = (ctx.settings.new_map_width, ctx.settings.new_map_height);
        let map = TileMap::with_size(new_map_size.0, new_map_size.1).unwrap_or_else(|error| {
            warn!(error = %error, "editor_blank_map_invalid");
            TileMap::empty()
        });
        let selected = ctx
            .registry
            .cycle(TileTypeId::EMPTY, CycleDirection::Forward)
            .unwrap_or(TileTypeId::EMPTY);
        let mut session = Self {
            camera: Camera::default(),
            map,
            screen: ctx.screen,
            layer: Layer::Foreground,
            selected,
            mode: EditorMode::Opening,
            open_name: ctx.settings.editor_open_name.clone(),
            save_name: ctx.settings.editor_save_name.clone(),
            new_map_size,
            status: None,
        };
        session.reset_camera();
        session
    }

    #[cfg(test)]
    pub(crate) fn map(&self) -> &TileMap {
        &self.map
    }

    #[cfg(test)]
    pub(crate) fn mode(&self) -> EditorMode {
        self.mode
    }

    #[cfg(test)]
    pub(crate) fn layer(&self) -> Layer {
        self.layer
    }

    #[cfg(test)]
    pub(crate) fn selected(&self) -> TileTypeId {
        self.selected
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub(crate) fn update(&mut self, input: &InputSnapshot, ctx: &GameContext) -> EditorCommand {
        match self.mode {
            EditorMode::Opening | EditorMode::Saving => {
                self.update_dialog(input, ctx);
                EditorCommand::None
            }
            EditorMode::Editing => self.update_editing(input, ctx),
        }
    }

    fn update_dialog(&mut self, input: &InputSnapshot, ctx: &GameContext) {
        if input.was_pressed(InputAction::Cancel) {
            self.mode = EditorMode::Editing;
            return;
        }
        if !input.was_pressed(InputAction::Confirm) {
            return;
        }
        let mode = self.mode;
        self.mode = EditorMode::Editing;
        match mode {
            EditorMode::Opening => {
                let name = self.open_name.clone();
                self.open_named(&ctx.paths, &name);
            }
            EditorMode::Saving => {
                let name = self.save_name.clone();
                self.save_named(&ctx.paths, &name);
            }
            EditorMode::Editing => {}
        }
    }

    fn update_editing(&mut self, input: &InputSnapshot, ctx: &GameContext) -> EditorCommand {
        if input.was_pressed(InputAction::ToMenu) || input.was_pressed(InputAction::Quit) {
            return EditorCommand::ToMenu;
        }
        if input.was_pressed(InputAction::OpenMap) {
            self.mode = EditorMode::Opening;
            return EditorCommand::None;
        }
        if input.was_pressed(InputAction::SaveMap) {
            self.mode = EditorMode::Saving;
            return EditorCommand::None;
        }
        if input.was_pressed(InputAction::NewMap) {
            let (width, height) = self.new_map_size;
            if let Err(error) = self.new_map(width, height) {
                self.report_failure("new map", &error);
            }
        }
        if input.was_pressed(InputAction::ToggleLayer) {
            self.layer = self.layer.toggled();
        }
        if input.was_pressed(InputAction::CycleNext) {
            self.cycle_selection(&ctx.registry, CycleDirection::Forward);
        }
        if input.was_pressed(InputAction::CyclePrev) {
            self.cycle_selection(&ctx.registry, CycleDirection::Backward);
        }
        if input.was_pressed(InputAction::FillLayer) {
            self.map.fill(self.layer, self.selected);
            info!(layer = self.layer.label(), type_id = %self.selected, "editor_layer_filled");
        }

        let Some((cursor_x, cursor_y)) = input.cursor_position_px() else {
            return EditorCommand::None;
        };
        let (world_x, world_y) = self.camera.screen_to_world(cursor_x, cursor_y);
        if input.was_pressed(InputAction::PickType) {
            self.pick_at(world_x, world_y);
        }
        if input.left_mouse_down() {
            self.paint_at(world_x, world_y, self.selected);
        } else if input.right_mouse_down() {
            self.paint_at(world_x, world_y, TileTypeId::EMPTY);
        }
        self.camera.follow(world_x, world_y);
        EditorCommand::None
    }

    /// Leaves the selection alone when the registry has nothing to offer.
    pub(crate) fn cycle_selection(&mut self, registry: &TileTypeRegistry, direction: CycleDirection) {
        if let Some(next) = registry.cycle(self.selected, direction) {
            self.selected = next;
        }
    }

    pub(crate) fn paint_at(&mut self, world_x: i32, world_y: i32, type_id: TileTypeId) -> bool {
        match self.map.tile_at_mut(world_x, world_y, self.layer) {
            Some(tile) => {
                tile.set_type(type_id);
                true
            }
            None => false,
        }
    }

    pub(crate) fn pick_at(&mut self, world_x: i32, world_y: i32) {
        if let Some(tile) = self.map.tile_at(world_x, world_y, self.layer) {
            self.selected = tile.type_id();
        }
    }

    pub(crate) fn new_map(&mut self, width: i64, height: i64) -> Result<(), TileMapError> {
        self.map.new_grid(width, height)?;
        info!(width, height, "editor_new_map");
        self.status = Some(format!("new map {width}x{height}"));
        self.reset_camera();
        Ok(())
    }

    pub(crate) fn open_named(&mut self, paths: &AppPaths, name: &str) {
        let Some(path) = paths.data_file(name) else {
            warn!(map_name = name, "editor_map_name_rejected");
            self.status = Some(format!("bad map name: {name}"));
            return;
        };
        match self.open(&path) {
            Ok(()) => self.status = Some(format!("opened {name}")),
            Err(error) => self.report_failure("open", &error),
        }
    }

    pub(crate) fn save_named(&mut self, paths: &AppPaths, name: &str) {
        let Some(path) = paths.data_file(name) else {
            warn!(map_name = name, "editor_map_name_rejected");
            self.status = Some(format!("bad map name: {name}"));
            return;
        };
        match self.map.save(&path) {
            Ok(()) => self.status = Some(format!("saved {name}")),
            Err(error) => self.report_failure("save", &error),
        }
    }

    fn open(&mut self, path: &Path) -> Result<(), TileMapError> {
        self.map.load(path)?;
        self.reset_camera();
        Ok(())
    }

    fn report_failure(&mut self, action: &'static str, error: &TileMapError) {
        warn!(action, error = %error, "editor_action_failed");
        self.status = Some(format!("{action} failed"));
    }

    fn reset_camera(&mut self) {
        let (width, height) = self.screen;
        self.camera = Camera::new(width, height, self.map.width_px(), self.map.height_px());
        self.camera.set_speed(CAMERA_SPEED);
        self.camera.set_bounds(
            (width / 2).saturating_sub(SCROLL_MARGIN_PX),
            (height / 2).saturating_sub(SCROLL_MARGIN_PX),
        );
    }

    pub(crate) fn title(&self, registry: &TileTypeRegistry) -> String {
        let selected_name = registry
            .get_type(self.selected)
            .map(|def| def.name.as_str())
            .unwrap_or("empty");
        format!(
            "Mini Jim editor | {} ({}) | {} | {}x{}",
            selected_name,
            self.selected,
            self.layer.label(),
            self.map.width(),
            self.map.height()
        )
    }

    pub(crate) fn draw(&self, surface: &mut dyn Surface, registry: &TileTypeRegistry, cursor: Option<(i32, i32)>) {
        surface.clear(BACKGROUND);
        let (camera_x, camera_y) = (self.camera.x(), self.camera.y());
        self.map.draw(surface, registry, camera_x, camera_y);

        if self.mode == EditorMode::Editing {
            if let Some((cursor_x, cursor_y)) = cursor {
                let (world_x, world_y) = self.camera.screen_to_world(cursor_x, cursor_y);
                if let Some(tile) = self.map.tile_at(world_x, world_y, self.layer) {
                    let (x, y) = self.camera.world_to_screen(tile.x(), tile.y());
                    let size = TILE_SIZE_PX as u32;
                    draw_outline(surface, ScreenRect::new(x, y, size, size), 2, CURSOR_COLOR);
                }
            }
        }

        self.draw_panel(surface, registry);
        match self.mode {
            EditorMode::Opening => draw_dialog(surface, "OPEN", &self.open_name),
            EditorMode::Saving => draw_dialog(surface, "SAVE", &self.save_name),
            EditorMode::Editing => {}
        }
    }

    fn draw_panel(&self, surface: &mut dyn Surface, registry: &TileTypeRegistry) {
        let (width, height) = surface.size();
        surface.fill_rect(ScreenRect::new(0, 0, width, PANEL_HEIGHT), PANEL_COLOR);
        if let Some(def) = registry.get_type(self.selected) {
            // Palette swatch is clipped to the panel so oversized types stay tidy.
            let mut swatch = SubSurface::new(surface, ScreenRect::new(3, 3, 64, 64));
            def.draw(&mut swatch, 0, 0, 0);
        }
        let name = registry
            .get_type(self.selected)
            .map(|def| def.name.as_str())
            .unwrap_or("empty");
        draw_text(surface, 80, 10, 3, PANEL_TEXT, &format!("{name} ({})", self.selected));
        draw_text(
            surface,
            80,
            36,
            3,
            PANEL_TEXT,
            &format!("height-{} width-{}", self.map.height(), self.map.width()),
        );
        let mode_line = format!("editing mode: {}", self.layer.label());
        let mode_width = text_width(&mode_line, 3) as i32;
        draw_text(surface, width as i32 - mode_width - 16, 10, 3, PANEL_TEXT, &mode_line);

        if let Some(status) = &self.status {
            draw_text(surface, 16, height as i32 - 30, 3, STATUS_COLOR, status);
        }
    }
}

fn draw_dialog(surface: &mut dyn Surface, verb: &str, name: &str) {
    let (width, height) = surface.size();
    let rect = ScreenRect::new(width as i32 / 2 - 300, height as i32 / 2 - 70, 600, 140);
    surface.fill_rect(rect, DIALOG_COLOR);
    draw_outline(surface, rect, 3, PANEL_TEXT);
    let center_x = width as i32 / 2;
    draw_text_centered(surface, center_x, rect.y + 30, 4, PANEL_TEXT, &format!("{verb}: {name}"));
    draw_text_centered(surface, center_x, rect.y + 90, 3, STATUS_COLOR, "enter: ok   tilde: cancel");
}

#[cfg(test)]
mod tests {
    use engine::{TileAttribute, TileAttributes, TileTypeDef};
    use tempfile::TempDir;

    use super::*;
    use crate::app::settings::Settings;

    const TS: i32 = TILE_SIZE_PX;

    fn registry() -> TileTypeRegistry {
        let def = |id: u16, name: &str, attributes: TileAttributes| TileTypeDef {
            id: TileTypeId(id),
            name: name.to_string(),
            width: 64,
            height: 64,
            attributes,
            sprite: None,
        };
        TileTypeRegistry::from_defs([
            def(1, "grass", TileAttributes::NONE.with(TileAttribute::Solid)),
            def(5, "torch", TileAttributes::NONE.with(TileAttribute::LightSource)),
            def(199, "spawn", TileAttributes::NONE.with(TileAttribute::Spawn)),
        ])
    }

    fn context(dir: &TempDir) -> GameContext {
        let settings = Settings {
            new_map_width: 4,
            new_map_height: 3,
            editor_open_name: "start.lvl".to_string(),
            editor_save_name: "saved.lvl".to_string(),
            ..Settings::default()
        };
        GameContext {
            paths: AppPaths::from_root(dir.path().to_path_buf()),
            registry: registry(),
            settings,
            screen: (640, 480),
        }
    }

    fn press(action: InputAction) -> InputSnapshot {
        InputSnapshot::empty().with_action_pressed(action)
    }

    fn editing(ctx: &GameContext) -> EditorSession {
        let mut editor = EditorSession::new(ctx);
        editor.update(&press(InputAction::Cancel), ctx);
        assert_eq!(editor.mode(), EditorMode::Editing);
        editor
    }

    #[test]
    fn starts_with_open_dialog_and_first_type_selected() {
        let dir = TempDir::new().expect("temp");
        let ctx = context(&dir);
        let editor = EditorSession::new(&ctx);
        assert_eq!(editor.mode(), EditorMode::Opening);
        assert_eq!(editor.selected(), TileTypeId(1));
        assert_eq!((editor.map().width(), editor.map().height()), (4, 3));
    }

    #[test]
    fn cycling_forward_then_back_returns_to_start() {
        let dir = TempDir::new().expect("temp");
        let ctx = context(&dir);
        let mut editor = editing(&ctx);
        for _ in 0..5 {
            editor.update(&press(InputAction::CycleNext), &ctx);
        }
        assert_ne!(editor.selected(), TileTypeId(1));
        for _ in 0..5 {
            editor.update(&press(InputAction::CyclePrev), &ctx);
        }
        assert_eq!(editor.selected(), TileTypeId(1));
    }

    #[test]
    fn paint_erase_and_pick_use_current_layer() {
        let dir = TempDir::new().expect("temp");
        let ctx = context(&dir);
        let mut editor = editing(&ctx);
        let at_cell = |col: i32, row: i32| {
            InputSnapshot::empty().with_cursor_position_px(Some((col * TS + 10, row * TS + 10)))
        };

        editor.update(&at_cell(1, 1).with_left_mouse_down(true), &ctx);
        assert_eq!(
            editor.map().tile(1, 1, Layer::Foreground).map(|t| t.type_id()),
            Some(TileTypeId(1))
        );

        editor.update(&press(InputAction::ToggleLayer), &ctx);
        editor.update(&press(InputAction::CycleNext), &ctx);
        editor.update(&at_cell(2, 0).with_left_mouse_down(true), &ctx);
        assert_eq!(
            editor.map().tile(2, 0, Layer::Background).map(|t| t.type_id()),
            Some(TileTypeId(5))
        );
        assert_eq!(
            editor.map().tile(2, 0, Layer::Foreground).map(|t| t.type_id()),
            Some(TileTypeId::EMPTY)
        );

        editor.update(&at_cell(2, 0).with_right_mouse_down(true), &ctx);
        assert_eq!(
            editor.map().tile(2, 0, Layer::Background).map(|t| t.type_id()),
            Some(TileTypeId::EMPTY)
        );

        editor.update(&press(InputAction::ToggleLayer), &ctx);
        editor.update(&press(InputAction::CycleNext), &ctx);
        assert_eq!(editor.selected(), TileTypeId(199));
        editor.update(&at_cell(1, 1).with_action_pressed(InputAction::PickType), &ctx);
        assert_eq!(editor.selected(), TileTypeId(1));
    }

    #[test]
    fn painting_outside_the_map_is_ignored() {
        let dir = TempDir::new().expect("temp");
        let ctx = context(&dir);
        let mut editor = editing(&ctx);
        let before = editor.map().clone();
        assert!(!editor.paint_at(-5, 10, TileTypeId(1)));
        assert!(!editor.paint_at(10 * TS, 10, TileTypeId(1)));
        assert_eq!(editor.map(), &before);
    }

    #[test]
    fn fill_touches_only_current_layer() {
        let dir = TempDir::new().expect("temp");
        let ctx = context(&dir);
        let mut editor = editing(&ctx);
        editor.update(&press(InputAction::ToggleLayer), &ctx);
        assert_eq!(editor.layer(), Layer::Background);
        editor.update(&press(InputAction::FillLayer), &ctx);
        let map = editor.map();
        assert!(map
            .tiles(Layer::Background)
            .iter()
            .all(|tile| tile.type_id() == TileTypeId(1)));
        assert!(map.tiles(Layer::Foreground).iter().all(|tile| tile.type_id().is_empty()));
    }

    #[test]
    fn save_then_open_round_trips_through_data_dir() {
        let dir = TempDir::new().expect("temp");
        let ctx = context(&dir);
        std::fs::create_dir_all(&ctx.paths.data_dir).expect("data dir");
        let mut editor = editing(&ctx);
        editor.paint_at(0, 0, TileTypeId(199));

        editor.update(&press(InputAction::SaveMap), &ctx);
        assert_eq!(editor.mode(), EditorMode::Saving);
        editor.update(&press(InputAction::Confirm), &ctx);
        assert_eq!(editor.status(), Some("saved saved.lvl"));
        let saved = editor.map().clone();

        editor.update(&press(InputAction::NewMap), &ctx);
        assert_ne!(editor.map(), &saved);
        editor.open_named(&ctx.paths, "saved.lvl");
        assert_eq!(editor.map(), &saved);
    }

    #[test]
    fn failed_open_keeps_current_map() {
        let dir = TempDir::new().expect("temp");
        let ctx = context(&dir);
        let mut editor = EditorSession::new(&ctx);
        editor.paint_at(0, 0, TileTypeId(1));
        let before = editor.map().clone();

        editor.update(&press(InputAction::Confirm), &ctx);
        assert_eq!(editor.mode(), EditorMode::Editing);
        assert_eq!(editor.status(), Some("open failed"));
        assert_eq!(editor.map(), &before);

        editor.open_named(&ctx.paths, "../escape.lvl");
        assert_eq!(editor.status(), Some("bad map name: ../escape.lvl"));
        assert_eq!(editor.map(), &before);
    }

    #[test]
    fn menu_key_is_ignored_while_dialog_open() {
        let dir = TempDir::new().expect("temp");
        let ctx = context(&dir);
        let mut editor = EditorSession::new(&ctx);
        assert_eq!(editor.update(&press(InputAction::ToMenu), &ctx), EditorCommand::None);
        editor.update(&press(InputAction::Cancel), &ctx);
        assert_eq!(editor.update(&press(InputAction::ToMenu), &ctx), EditorCommand::ToMenu);
    }

    #[test]
    fn empty_registry_leaves_selection_unchanged() {
        let dir = TempDir::new().expect("temp");
        let ctx = context(&dir);
        let mut editor = editing(&ctx);
        editor.cycle_selection(&TileTypeRegistry::default(), CycleDirection::Forward);
        assert_eq!(editor.selected(), TileTypeId(1));
    }
}
