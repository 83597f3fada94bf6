use engine::tiles::{any_with_attribute, is_blocked, sweep_x, sweep_y};
use engine::{
    draw_outline, Aabb, InputAction, InputSnapshot, Rgba, ScreenRect, Surface, TileAttribute,
    TileMap, TileTypeRegistry,
};
use tracing::info;

pub(crate) const PLAYER_SIZE_PX: u32 = 64;
const RUN_SPEED: i32 = 6;
const GRAVITY: i32 = 1;
const JUMP_SPEED: i32 = 18;
const MAX_FALL_SPEED: i32 = 16;
const OUTLINE_COLOR: Rgba = [20, 20, 20, 255];
const EYE_COLOR: Rgba = [250, 250, 250, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlayerControls {
    pub(crate) left: InputAction,
    pub(crate) right: InputAction,
    pub(crate) up: InputAction,
    pub(crate) down: InputAction,
    pub(crate) jump: InputAction,
}

impl PlayerControls {
    pub(crate) const PLAYER_ONE: PlayerControls = PlayerControls {
        left: InputAction::P1Left,
        right: InputAction::P1Right,
        up: InputAction::P1Up,
        down: InputAction::P1Down,
        jump: InputAction::P1Jump,
    };

    pub(crate) const PLAYER_TWO: PlayerControls = PlayerControls {
        left: InputAction::P2Left,
        right: InputAction::P2Right,
        up: InputAction::P2Up,
        down: InputAction::P2Down,
        jump: InputAction::P2Jump,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerEvent {
    Died { death_count: u32 },
    Finished,
}

/// A racer. Moves in whole pixels with fixed per-tick steps, so a map plus an
/// input sequence always replays the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Player {
    number: u8,
    x: i32,
    y: i32,
    spawn_x: i32,
    spawn_y: i32,
    velocity_y: i32,
    on_ground: bool,
    facing_left: bool,
    finished: bool,
    death_count: u32,
    controls: PlayerControls,
    color: Rgba,
}

impl Player {
    pub(crate) fn new(number: u8, controls: PlayerControls, color: Rgba) -> Self {
        Self {
            number,
            x: 0,
            y: 0,
            spawn_x: 0,
            spawn_y: 0,
            velocity_y: 0,
            on_ground: false,
            facing_left: false,
            finished: false,
            death_count: 0,
            controls,
            color,
        }
    }

    /// Also places the player on the new spawn point.
    pub(crate) fn set_spawn(&mut self, x: i32, y: i32) {
        self.spawn_x = x;
        self.spawn_y = y;
        self.respawn();
    }

    pub(crate) fn number(&self) -> u8 {
        self.number
    }

    pub(crate) fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub(crate) fn center(&self) -> (i32, i32) {
        let half = (PLAYER_SIZE_PX / 2) as i32;
        (self.x + half, self.y + half)
    }

    pub(crate) fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, PLAYER_SIZE_PX, PLAYER_SIZE_PX)
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn death_count(&self) -> u32 {
        self.death_count
    }

    pub(crate) fn is_at_spawn(&self, map: &TileMap, registry: &TileTypeRegistry) -> bool {
        any_with_attribute(map, registry, self.bounds(), TileAttribute::Spawn)
    }

    /// Moves by `(dx, dy)` as far as solid tiles allow, x first. Returns true
    /// when the whole move happened.
    pub(crate) fn try_move(
        &mut self,
        map: &TileMap,
        registry: &TileTypeRegistry,
        dx: i32,
        dy: i32,
    ) -> bool {
        let horizontal = sweep_x(map, registry, self.bounds(), dx);
        self.x += horizontal.moved;
        let vertical = sweep_y(map, registry, self.bounds(), dy);
        self.y += vertical.moved;
        !horizontal.blocked && !vertical.blocked
    }

    /// One simulation tick. Finished players ignore input and stay put.
    pub(crate) fn update(
        &mut self,
        input: &InputSnapshot,
        map: &TileMap,
        registry: &TileTypeRegistry,
    ) -> Vec<PlayerEvent> {
        if self.finished {
            return Vec::new();
        }

        let mut dx = 0;
        if input.is_down(self.controls.left) {
            dx -= RUN_SPEED;
        }
        if input.is_down(self.controls.right) {
            dx += RUN_SPEED;
        }
        if dx != 0 {
            self.facing_left = dx < 0;
        }

        self.on_ground = is_blocked(map, registry, self.bounds().offset(0, 1));
        let wants_jump = input.is_down(self.controls.jump) || input.is_down(self.controls.up);
        if wants_jump && self.on_ground {
            self.velocity_y = -JUMP_SPEED;
        }
        let gravity = if input.is_down(self.controls.down) && !self.on_ground {
            GRAVITY * 2
        } else {
            GRAVITY
        };
        self.velocity_y = (self.velocity_y + gravity).min(MAX_FALL_SPEED);

        let start_y = self.y;
        self.try_move(map, registry, dx, self.velocity_y);
        if self.y - start_y != self.velocity_y {
            // Landed or hit a ceiling.
            self.velocity_y = 0;
        }

        self.resolve_tile_effects(map, registry)
    }

    fn resolve_tile_effects(&mut self, map: &TileMap, registry: &TileTypeRegistry) -> Vec<PlayerEvent> {
        let fell_out = self.y as i64 >= map.height_px() as i64;
        if fell_out || any_with_attribute(map, registry, self.bounds(), TileAttribute::Hazard) {
            return vec![self.die()];
        }
        if any_with_attribute(map, registry, self.bounds(), TileAttribute::Finish) {
            self.finished = true;
            info!(player = self.number, death_count = self.death_count, "player_finished");
            return vec![PlayerEvent::Finished];
        }
        Vec::new()
    }

    fn die(&mut self) -> PlayerEvent {
        self.death_count += 1;
        info!(
            player = self.number,
            death_count = self.death_count,
            x = self.x,
            y = self.y,
            "player_died"
        );
        self.respawn();
        PlayerEvent::Died {
            death_count: self.death_count,
        }
    }

    fn respawn(&mut self) {
        self.x = self.spawn_x;
        self.y = self.spawn_y;
        self.velocity_y = 0;
        self.on_ground = false;
    }

    pub(crate) fn draw(&self, surface: &mut dyn Surface, camera_x: i32, camera_y: i32) {
        let rect = ScreenRect::new(
            self.x - camera_x,
            self.y - camera_y,
            PLAYER_SIZE_PX,
            PLAYER_SIZE_PX,
        );
        surface.fill_rect(rect, self.color);
        draw_outline(surface, rect, 3, OUTLINE_COLOR);
        let eye_x = if self.facing_left { 12 } else { 40 };
        surface.fill_rect(
            ScreenRect::new(rect.x + eye_x, rect.y + 16, 12, 12),
            EYE_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use engine::{Layer, TileAttributes, TileTypeDef, TileTypeId, TILE_SIZE_PX};

    use super::*;

    const TS: i32 = TILE_SIZE_PX;
    const GRASS: TileTypeId = TileTypeId(1);
    const LAVA: TileTypeId = TileTypeId(2);
    const FLAG: TileTypeId = TileTypeId(3);
    const SPAWN: TileTypeId = TileTypeId(199);

    fn registry() -> TileTypeRegistry {
        let def = |id: TileTypeId, name: &str, attribute: TileAttribute| TileTypeDef {
            id,
            name: name.to_string(),
            width: 64,
            height: 64,
            attributes: TileAttributes::NONE.with(attribute),
            sprite: None,
        };
        TileTypeRegistry::from_defs([
            def(GRASS, "grass", TileAttribute::Solid),
            def(LAVA, "lava", TileAttribute::Hazard),
            def(FLAG, "flag", TileAttribute::Finish),
            def(SPAWN, "spawn", TileAttribute::Spawn),
        ])
    }

    fn set(map: &mut TileMap, col: usize, row: usize, id: TileTypeId) {
        map.tile_mut(col, row, Layer::Foreground)
            .expect("cell")
            .set_type(id);
    }

    /// 3x3, empty except the spawn marker in the middle.
    fn spawn_map() -> TileMap {
        let mut map = TileMap::with_size(3, 3).expect("map");
        set(&mut map, 1, 1, SPAWN);
        map
    }

    fn player_at_spawn(map: &TileMap) -> Player {
        let spawn = map
            .find_tile_of_type(SPAWN, Layer::Foreground)
            .expect("spawn tile");
        let mut player = Player::new(1, PlayerControls::PLAYER_ONE, [200, 40, 40, 255]);
        player.set_spawn(spawn.x(), spawn.y());
        player
    }

    /// Floor of grass along the bottom row with the given tile at `(col, row)`.
    fn floor_map(width: i64, extra: &[(usize, usize, TileTypeId)]) -> TileMap {
        let mut map = TileMap::with_size(width, 3).expect("map");
        for col in 0..width as usize {
            set(&mut map, col, 2, GRASS);
        }
        for &(col, row, id) in extra {
            set(&mut map, col, row, id);
        }
        map
    }

    fn hold(action: InputAction) -> InputSnapshot {
        InputSnapshot::empty().with_action_down(action, true)
    }

    #[test]
    fn player_placed_on_spawn_tile_is_at_spawn() {
        let registry = registry();
        let map = spawn_map();
        let player = player_at_spawn(&map);
        assert_eq!(player.position(), (TS, TS));
        assert!(player.is_at_spawn(&map, &registry));
    }

    #[test]
    fn move_into_solid_is_blocked_and_empty_cell_succeeds() {
        let registry = registry();
        let mut map = spawn_map();
        set(&mut map, 2, 1, GRASS);
        let mut player = player_at_spawn(&map);

        assert!(!player.try_move(&map, &registry, TS, 0));
        assert_eq!(player.position(), (TS, TS));

        assert!(player.try_move(&map, &registry, -TS, 0));
        assert_eq!(player.position(), (0, TS));
        assert!(!player.is_at_spawn(&map, &registry));
    }

    #[test]
    fn standing_player_stays_on_floor() {
        let registry = registry();
        let map = floor_map(3, &[]);
        let mut player = Player::new(1, PlayerControls::PLAYER_ONE, [0, 0, 0, 255]);
        player.set_spawn(0, TS);
        for _ in 0..10 {
            assert!(player.update(&InputSnapshot::empty(), &map, &registry).is_empty());
        }
        assert_eq!(player.position(), (0, TS));
    }

    #[test]
    fn jump_rises_then_lands_back() {
        let registry = registry();
        let map = floor_map(3, &[]);
        let mut player = Player::new(1, PlayerControls::PLAYER_ONE, [0, 0, 0, 255]);
        player.set_spawn(0, TS);

        player.update(&hold(InputAction::P1Jump), &map, &registry);
        assert!(player.position().1 < TS);
        // Top edge of the map caps the jump; gravity brings the player back.
        for _ in 0..80 {
            player.update(&InputSnapshot::empty(), &map, &registry);
        }
        assert_eq!(player.position(), (0, TS));
    }

    #[test]
    fn hazard_respawns_and_counts_death() {
        let registry = registry();
        let map = floor_map(4, &[(1, 1, LAVA)]);
        let mut player = Player::new(2, PlayerControls::PLAYER_TWO, [0, 0, 0, 255]);
        player.set_spawn(0, TS);

        let mut events = Vec::new();
        for _ in 0..20 {
            events.extend(player.update(&hold(InputAction::P2Right), &map, &registry));
            if !events.is_empty() {
                break;
            }
        }
        assert_eq!(events, vec![PlayerEvent::Died { death_count: 1 }]);
        assert_eq!(player.position(), (0, TS));
        assert_eq!(player.death_count(), 1);
    }

    #[test]
    fn falling_out_of_the_map_kills() {
        let registry = registry();
        let map = TileMap::with_size(2, 2).expect("map");
        let mut player = Player::new(1, PlayerControls::PLAYER_ONE, [0, 0, 0, 255]);
        player.set_spawn(0, 0);

        let died = (0..200)
            .flat_map(|_| player.update(&InputSnapshot::empty(), &map, &registry))
            .next();
        assert_eq!(died, Some(PlayerEvent::Died { death_count: 1 }));
    }

    #[test]
    fn finish_stops_further_input() {
        let registry = registry();
        let map = floor_map(4, &[(2, 1, FLAG)]);
        let mut player = Player::new(1, PlayerControls::PLAYER_ONE, [0, 0, 0, 255]);
        player.set_spawn(0, TS);

        let mut finished_at = None;
        for tick in 0..40 {
            let events = player.update(&hold(InputAction::P1Right), &map, &registry);
            if events.contains(&PlayerEvent::Finished) {
                finished_at = Some(tick);
                break;
            }
        }
        assert!(finished_at.is_some());
        assert!(player.is_finished());
        let frozen = player.position();
        assert!(player
            .update(&hold(InputAction::P1Right), &map, &registry)
            .is_empty());
        assert_eq!(player.position(), frozen);
    }

    #[test]
    fn same_inputs_replay_identically() {
        let registry = registry();
        let map = floor_map(6, &[(3, 1, GRASS), (5, 1, LAVA)]);
        let script = (0..120)
            .map(|tick| {
                let mut snapshot = InputSnapshot::empty()
                    .with_action_down(InputAction::P1Right, tick % 30 < 25);
                if tick % 17 == 0 {
                    snapshot = snapshot.with_action_down(InputAction::P1Jump, true);
                }
                snapshot
            })
            .collect::<Vec<_>>();

        let run = || {
            let mut player = Player::new(1, PlayerControls::PLAYER_ONE, [0, 0, 0, 255]);
            player.set_spawn(0, TS);
            let events = script
                .iter()
                .flat_map(|input| player.update(input, &map, &registry))
                .collect::<Vec<_>>();
            (player, events)
        };
        assert_eq!(run(), run());
    }
}
