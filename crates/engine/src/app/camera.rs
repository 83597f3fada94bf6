use super::surface::ScreenRect;

pub const CAMERA_SPEED_DEFAULT: u32 = 1;

/// Pixel-space view into a map. `(x, y)` is the map pixel shown at the
/// viewport's top-left corner; it never leaves `[0, map - viewport]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Camera {
    x: i32,
    y: i32,
    viewport_width: u32,
    viewport_height: u32,
    map_width_px: u32,
    map_height_px: u32,
    speed: u32,
    bounds_x: u32,
    bounds_y: u32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl Camera {
    pub fn new(
        viewport_width: u32,
        viewport_height: u32,
        map_width_px: u32,
        map_height_px: u32,
    ) -> Self {
        Self {
            x: 0,
            y: 0,
            viewport_width,
            viewport_height,
            map_width_px,
            map_height_px,
            speed: CAMERA_SPEED_DEFAULT,
            bounds_x: 0,
            bounds_y: 0,
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    /// Divisor applied to the remaining distance each `follow` call; 1 snaps.
    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed.max(1);
    }

    /// Dead zone around the viewport centre inside which the target may move
    /// without scrolling.
    pub fn set_bounds(&mut self, bounds_x: u32, bounds_y: u32) {
        self.bounds_x = bounds_x;
        self.bounds_y = bounds_y;
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        self.clamp_to_map();
    }

    pub fn follow(&mut self, target_x: i32, target_y: i32) {
        let desired_x = target_x - (self.viewport_width / 2) as i32;
        let desired_y = target_y - (self.viewport_height / 2) as i32;
        self.x += step_toward(self.x, desired_x, self.bounds_x, self.speed);
        self.y += step_toward(self.y, desired_y, self.bounds_y, self.speed);
        self.clamp_to_map();
    }

    pub fn visible_rect(&self) -> ScreenRect {
        ScreenRect::new(self.x, self.y, self.viewport_width, self.viewport_height)
    }

    pub fn world_to_screen(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.x, y - self.y)
    }

    pub fn screen_to_world(&self, x: i32, y: i32) -> (i32, i32) {
        (x + self.x, y + self.y)
    }

    fn clamp_to_map(&mut self) {
        let max_x = self.map_width_px.saturating_sub(self.viewport_width) as i32;
        let max_y = self.map_height_px.saturating_sub(self.viewport_height) as i32;
        self.x = self.x.clamp(0, max_x);
        self.y = self.y.clamp(0, max_y);
    }
}

fn step_toward(current: i32, desired: i32, dead_zone: u32, speed: u32) -> i32 {
    let diff = desired - current;
    let dead_zone = dead_zone as i32;
    if diff.abs() <= dead_zone {
        return 0;
    }
    let excess = diff - diff.signum() * dead_zone;
    let step = excess / speed as i32;
    if step == 0 {
        excess.signum()
    } else {
        step
    }
}
