use engine::{draw_text_centered, InputAction, InputSnapshot, ScreenRect, Surface};

pub(crate) const INTRO_TICKS: u32 = 120;
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
const TITLE_COLOR: [u8; 4] = [250, 214, 72, 255];
const HINT_COLOR: [u8; 4] = [150, 150, 150, 255];

/// Splash screen; ends after `INTRO_TICKS` or on confirm.
#[derive(Debug, Default)]
pub(crate) struct IntroState {
    ticks: u32,
}

impl IntroState {
    /// Returns true once the intro is done.
    pub(crate) fn update(&mut self, input: &InputSnapshot) -> bool {
        self.ticks = self.ticks.saturating_add(1);
        self.ticks >= INTRO_TICKS || input.was_pressed(InputAction::Confirm)
    }

    pub(crate) fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(BACKGROUND);
        let (width, height) = surface.size();
        let center_x = (width / 2) as i32;
        let center_y = (height / 2) as i32;

        // Bar grows across the screen while the intro runs.
        let progress = width * self.ticks.min(INTRO_TICKS) / INTRO_TICKS;
        surface.fill_rect(
            ScreenRect::new(0, center_y + 90, progress, 8),
            TITLE_COLOR,
        );
        draw_text_centered(surface, center_x, center_y - 60, 16, TITLE_COLOR, "MINI JIM");
        draw_text_centered(surface, center_x, center_y + 120, 4, HINT_COLOR, "PRESS ENTER");
    }
}
