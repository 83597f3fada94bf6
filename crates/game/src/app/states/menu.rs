use engine::{draw_text_centered, InputAction, InputSnapshot, Surface};

const BACKGROUND: [u8; 4] = [24, 32, 56, 255];
const TITLE_COLOR: [u8; 4] = [250, 214, 72, 255];
const TEXT_COLOR: [u8; 4] = [240, 240, 240, 255];
const HINT_COLOR: [u8; 4] = [150, 160, 190, 255];
const NOTICE_COLOR: [u8; 4] = [236, 90, 80, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuCommand {
    None,
    StartRace { level_number: u32, single_player: bool },
    OpenEditor,
    Quit,
}

#[derive(Debug)]
pub(crate) struct MenuState {
    level_number: u32,
    level_count: u32,
    single_player: bool,
    notice: Option<String>,
}

impl MenuState {
    pub(crate) fn new(
        level_number: u32,
        level_count: u32,
        single_player: bool,
        notice: Option<String>,
    ) -> Self {
        let level_count = level_count.max(1);
        Self {
            level_number: level_number.clamp(1, level_count),
            level_count,
            single_player,
            notice,
        }
    }

    pub(crate) fn level_number(&self) -> u32 {
        self.level_number
    }

    pub(crate) fn single_player(&self) -> bool {
        self.single_player
    }

    pub(crate) fn update(&mut self, input: &InputSnapshot) -> MenuCommand {
        if input.was_pressed(InputAction::Quit) {
            return MenuCommand::Quit;
        }
        if input.was_pressed(InputAction::OpenEditor) {
            return MenuCommand::OpenEditor;
        }
        if input.was_pressed(InputAction::Confirm) {
            return MenuCommand::StartRace {
                level_number: self.level_number,
                single_player: self.single_player,
            };
        }
        if input.was_pressed(InputAction::P1Left) {
            self.level_number = if self.level_number <= 1 {
                self.level_count
            } else {
                self.level_number - 1
            };
        }
        if input.was_pressed(InputAction::P1Right) {
            self.level_number = self.level_number % self.level_count + 1;
        }
        if input.was_pressed(InputAction::TogglePlayers) {
            self.single_player = !self.single_player;
        }
        MenuCommand::None
    }

    pub(crate) fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(BACKGROUND);
        let (width, height) = surface.size();
        let center_x = (width / 2) as i32;
        let top = (height / 5) as i32;

        draw_text_centered(surface, center_x, top, 14, TITLE_COLOR, "MINI JIM");
        let level_line = format!("< LEVEL {} / {} >", self.level_number, self.level_count);
        draw_text_centered(surface, center_x, top + 200, 6, TEXT_COLOR, &level_line);
        let players_line = if self.single_player {
            "PLAYERS: 1"
        } else {
            "PLAYERS: 2"
        };
        draw_text_centered(surface, center_x, top + 270, 6, TEXT_COLOR, players_line);

        let hints = [
            "LEFT/RIGHT: LEVEL   P: PLAYERS",
            "ENTER: RACE   E: EDITOR   ESC: QUIT",
        ];
        for (row, hint) in hints.iter().enumerate() {
            draw_text_centered(surface, center_x, top + 380 + row as i32 * 40, 4, HINT_COLOR, hint);
        }
        if let Some(notice) = &self.notice {
            draw_text_centered(surface, center_x, top + 500, 4, NOTICE_COLOR, notice);
        }
    }
}
