use std::path::Path;

use engine::{
    draw_outline, draw_text, draw_text_centered, Camera, InputAction, InputSnapshot, Layer, Rgba,
    ScreenRect, SubSurface, Surface, TileAttribute, TileMap, TileMapError, TileTypeRegistry,
};
use tracing::{debug, info, warn};

use crate::app::player::{Player, PlayerControls, PlayerEvent};

pub(crate) const TICKS_PER_SECOND: u32 = 60;
/// Input is ignored until the countdown has run out.
pub(crate) const COUNTDOWN_TICKS: u32 = 72;
const COUNTDOWN_STEPS: [(u32, &str); 4] = [
    (20, "3"),
    (40, "2"),
    (60, "1"),
    (COUNTDOWN_TICKS, "GO!"),
];

const FRAME_PX: u32 = 16;
const DIVIDER_HALF_PX: u32 = 8;
const BORDER_COLOR: Rgba = [0, 0, 0, 255];
const SKY_COLOR: Rgba = [120, 180, 230, 255];
const HUD_COLOR: Rgba = [16, 16, 24, 200];
const HUD_TEXT: Rgba = [240, 240, 240, 255];
const COUNTDOWN_COLOR: Rgba = [250, 214, 72, 255];
const RESULTS_COLOR: Rgba = [20, 24, 36, 240];
const PLAYER_COLORS: [Rgba; 2] = [[214, 64, 52, 255], [64, 160, 72, 255]];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RaceCommand {
    None,
    ToMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RaceResult {
    pub(crate) player: u8,
    pub(crate) ticks: u32,
    pub(crate) deaths: u32,
}

#[derive(Debug)]
struct Racer {
    player: Player,
    camera: Camera,
    viewport: ScreenRect,
    race_ticks: u32,
}

/// One level being raced by one or two players, each with its own viewport.
#[derive(Debug)]
pub(crate) struct RaceSession {
    map: TileMap,
    level_number: u32,
    racers: Vec<Racer>,
    countdown_ticks: u32,
    results_logged: bool,
}

impl RaceSession {
    /// Loads the level file; the error leaves nothing half-built behind.
    pub(crate) fn start(
        level_path: &Path,
        level_number: u32,
        registry: &TileTypeRegistry,
        single_player: bool,
        screen: (u32, u32),
    ) -> Result<Self, TileMapError> {
        let mut map = TileMap::empty();
        map.load(level_path)?;
        Ok(Self::with_map(map, level_number, registry, single_player, screen))
    }

    pub(crate) fn with_map(
        map: TileMap,
        level_number: u32,
        registry: &TileTypeRegistry,
        single_player: bool,
        screen: (u32, u32),
    ) -> Self {
        let spawn = registry
            .first_with_attribute(TileAttribute::Spawn)
            .and_then(|spawn_id| map.find_tile_of_type(spawn_id, Layer::Foreground))
            .map(|tile| (tile.x(), tile.y()));
        let (spawn_x, spawn_y) = spawn.unwrap_or_else(|| {
            warn!(level = level_number, "level_spawn_missing");
            (0, 0)
        });

        let player_count = if single_player { 1 } else { 2 };
        let controls = [PlayerControls::PLAYER_ONE, PlayerControls::PLAYER_TWO];
        let racers = viewport_rects(screen, player_count)
            .into_iter()
            .enumerate()
            .map(|(index, viewport)| {
                let mut player = Player::new(index as u8 + 1, controls[index], PLAYER_COLORS[index]);
                player.set_spawn(spawn_x, spawn_y);
                debug!(
                    player = player.number(),
                    at_spawn = player.is_at_spawn(&map, registry),
                    "racer_placed"
                );
                let mut camera =
                    Camera::new(viewport.width, viewport.height, map.width_px(), map.height_px());
                let (center_x, center_y) = player.center();
                camera.follow(center_x, center_y);
                Racer {
                    player,
                    camera,
                    viewport,
                    race_ticks: 0,
                }
            })
            .collect();

        info!(
            level = level_number,
            players = player_count,
            spawn_x,
            spawn_y,
            "race_started"
        );
        Self {
            map,
            level_number,
            racers,
            countdown_ticks: 0,
            results_logged: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn player_count(&self) -> usize {
        self.racers.len()
    }

    pub(crate) fn countdown_finished(&self) -> bool {
        self.countdown_ticks >= COUNTDOWN_TICKS
    }

    pub(crate) fn all_finished(&self) -> bool {
        self.racers.iter().all(|racer| racer.player.is_finished())
    }

    #[cfg(test)]
    pub(crate) fn player_position(&self, index: usize) -> Option<(i32, i32)> {
        self.racers.get(index).map(|racer| racer.player.position())
    }

    pub(crate) fn results(&self) -> Vec<RaceResult> {
        self.racers
            .iter()
            .map(|racer| RaceResult {
                player: racer.player.number(),
                ticks: racer.race_ticks,
                deaths: racer.player.death_count(),
            })
            .collect()
    }

    pub(crate) fn update(&mut self, input: &InputSnapshot, registry: &TileTypeRegistry) -> RaceCommand {
        if input.was_pressed(InputAction::ToMenu) || input.was_pressed(InputAction::Quit) {
            return RaceCommand::ToMenu;
        }
        if !self.countdown_finished() {
            self.countdown_ticks += 1;
            return RaceCommand::None;
        }

        for racer in &mut self.racers {
            if racer.player.is_finished() {
                continue;
            }
            racer.race_ticks += 1;
            for event in racer.player.update(input, &self.map, registry) {
                match event {
                    PlayerEvent::Died { death_count } => debug!(
                        player = racer.player.number(),
                        death_count,
                        ticks = racer.race_ticks,
                        "racer_respawned"
                    ),
                    PlayerEvent::Finished => info!(
                        player = racer.player.number(),
                        ticks = racer.race_ticks,
                        "racer_time_recorded"
                    ),
                }
            }
            let (center_x, center_y) = racer.player.center();
            racer.camera.follow(center_x, center_y);
        }

        if !self.all_finished() {
            return RaceCommand::None;
        }
        if !self.results_logged {
            self.results_logged = true;
            let results = self.results();
            let leader = winner(&results);
            for result in &results {
                info!(
                    level = self.level_number,
                    player = result.player,
                    seconds = %format_seconds(result.ticks),
                    deaths = result.deaths,
                    "race_result"
                );
            }
            info!(level = self.level_number, winner = ?leader.map(|result| result.player), "race_finished");
        }
        if input.was_pressed(InputAction::Confirm) {
            RaceCommand::ToMenu
        } else {
            RaceCommand::None
        }
    }

    pub(crate) fn title(&self) -> String {
        format!("Mini Jim | level {}", self.level_number)
    }

    pub(crate) fn draw(&self, surface: &mut dyn Surface, registry: &TileTypeRegistry) {
        surface.clear(BORDER_COLOR);
        let (width, _) = surface.size();
        for racer in &self.racers {
            let (camera_x, camera_y) = (racer.camera.x(), racer.camera.y());
            let mut view = SubSurface::new(surface, racer.viewport);
            view.clear(SKY_COLOR);
            self.map.draw(&mut view, registry, camera_x, camera_y);
            for other in &self.racers {
                other.player.draw(&mut view, camera_x, camera_y);
            }
            draw_hud(&mut view, racer);
            if let Some(label) = countdown_label(self.countdown_ticks) {
                let (view_width, view_height) = view.size();
                let y = (view_height / 2) as i32 - 40;
                draw_text_centered(&mut view, (view_width / 2) as i32, y, 16, COUNTDOWN_COLOR, label);
            }
        }
        if self.all_finished() {
            self.draw_results(surface, width);
        }
    }

    fn draw_results(&self, surface: &mut dyn Surface, width: u32) {
        let (_, height) = surface.size();
        let results = self.results();
        let panel_height = 120 + 50 * results.len() as u32;
        let rect = ScreenRect::new(
            width as i32 / 2 - 320,
            (height / 2) as i32 - (panel_height / 2) as i32,
            640,
            panel_height,
        );
        surface.fill_rect(rect, RESULTS_COLOR);
        draw_outline(surface, rect, 3, HUD_TEXT);
        let center_x = width as i32 / 2;

        let mut y = rect.y + 24;
        for result in &results {
            let line = format!(
                "p{}: {}s  deaths:{}",
                result.player,
                format_seconds(result.ticks),
                result.deaths
            );
            draw_text_centered(surface, center_x, y, 4, HUD_TEXT, &line);
            y += 50;
        }
        let verdict = match (results.len(), winner(&results)) {
            (1, _) => "finished!".to_string(),
            (_, Some(best)) => {
                let margin = results
                    .iter()
                    .filter(|result| result.player != best.player)
                    .map(|result| result.ticks - best.ticks)
                    .min()
                    .unwrap_or(0);
                format!("p{} wins by {}s", best.player, format_seconds(margin))
            }
            (_, None) => "tie!".to_string(),
        };
        draw_text_centered(surface, center_x, y, 5, COUNTDOWN_COLOR, &verdict);
        draw_text_centered(surface, center_x, y + 50, 3, HUD_TEXT, "enter: menu");
    }
}

fn draw_hud(surface: &mut dyn Surface, racer: &Racer) {
    surface.fill_rect(ScreenRect::new(20, 20, 300, 70), HUD_COLOR);
    let time = format!("time: {}", format_seconds(racer.race_ticks));
    draw_text(surface, 32, 28, 3, HUD_TEXT, &time);
    let deaths = format!("deaths:{}", racer.player.death_count());
    draw_text(surface, 32, 58, 3, HUD_TEXT, &deaths);
}

/// Full screen inside the black frame, or top and bottom halves split by a
/// divider bar.
pub(crate) fn viewport_rects(screen: (u32, u32), player_count: usize) -> Vec<ScreenRect> {
    let (width, height) = screen;
    let inner_width = width.saturating_sub(FRAME_PX * 2);
    let frame = FRAME_PX as i32;
    if player_count <= 1 {
        return vec![ScreenRect::new(frame, frame, inner_width, height.saturating_sub(FRAME_PX * 2))];
    }
    let half_height = (height / 2).saturating_sub(FRAME_PX + DIVIDER_HALF_PX);
    vec![
        ScreenRect::new(frame, frame, inner_width, half_height),
        ScreenRect::new(frame, (height / 2 + DIVIDER_HALF_PX) as i32, inner_width, half_height),
    ]
}

pub(crate) fn countdown_label(countdown_ticks: u32) -> Option<&'static str> {
    COUNTDOWN_STEPS
        .iter()
        .find(|(end, _)| countdown_ticks < *end)
        .map(|(_, label)| *label)
}

/// Fastest finisher, or none on a tie for first.
pub(crate) fn winner(results: &[RaceResult]) -> Option<RaceResult> {
    let best = results.iter().min_by_key(|result| result.ticks)?;
    let tied = results
        .iter()
        .filter(|result| result.ticks == best.ticks)
        .count();
    (tied == 1).then_some(*best)
}

pub(crate) fn format_seconds(ticks: u32) -> String {
    format!("{:.1}", ticks as f64 / TICKS_PER_SECOND as f64)
}
