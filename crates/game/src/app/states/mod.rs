mod editor;
mod intro;
mod menu;
mod race;

use engine::{
    AppPaths, InputAction, InputSnapshot, Rgba, StateHost, StateId, StateTracker, Surface,
    TileTypeRegistry,
};
use tracing::{error, info};

use self::editor::{EditorCommand, EditorSession};
use self::intro::IntroState;
use self::menu::{MenuCommand, MenuState};
use self::race::{RaceCommand, RaceSession};
use crate::app::settings::Settings;

const IDLE_COLOR: Rgba = [0, 0, 0, 255];
const WINDOW_TITLE: &str = "Mini Jim";

/// Everything a state needs that outlives any single state.
#[derive(Debug)]
pub(crate) struct GameContext {
    pub(crate) paths: AppPaths,
    pub(crate) registry: TileTypeRegistry,
    pub(crate) settings: Settings,
    pub(crate) screen: (u32, u32),
}

#[derive(Debug)]
enum ActiveState {
    Null,
    Init,
    Intro(IntroState),
    Menu(MenuState),
    Edit(Box<EditorSession>),
    Game(Box<RaceSession>),
    Exit,
}

/// Owns the active state and routes each tick and frame to it. Transitions go
/// through `StateTracker`, so only table-listed moves ever happen.
#[derive(Debug)]
pub(crate) struct StateEngine {
    ctx: GameContext,
    tracker: StateTracker,
    active: ActiveState,
    level_number: u32,
    single_player: bool,
    notice: Option<String>,
    cursor: Option<(i32, i32)>,
}

impl StateEngine {
    pub(crate) fn new(ctx: GameContext) -> Self {
        let mut engine = Self {
            level_number: ctx.settings.starting_level,
            single_player: ctx.settings.single_player,
            ctx,
            tracker: StateTracker::default(),
            active: ActiveState::Null,
            notice: None,
            cursor: None,
        };
        engine.tracker.request(StateId::Init);
        engine.change_state();
        engine
    }

    /// Applies queued transitions until none is pending. Entering a state may
    /// queue another one (Init moves straight on, a failed race load falls
    /// back to Menu).
    fn change_state(&mut self) {
        while let Some((_, to)) = self.tracker.apply() {
            self.active = self.enter(to);
        }
    }

    fn enter(&mut self, state: StateId) -> ActiveState {
        match state {
            StateId::Null => ActiveState::Null,
            StateId::Init => {
                info!(tile_types = self.ctx.registry.len(), "init_complete");
                self.tracker.request(StateId::Intro);
                ActiveState::Init
            }
            StateId::Intro => ActiveState::Intro(IntroState::default()),
            StateId::Menu => ActiveState::Menu(MenuState::new(
                self.level_number,
                self.ctx.settings.level_count,
                self.single_player,
                self.notice.take(),
            )),
            StateId::Edit => ActiveState::Edit(Box::new(EditorSession::new(&self.ctx))),
            StateId::Game => {
                let level_path = self.ctx.paths.level_path(self.level_number);
                match RaceSession::start(
                    &level_path,
                    self.level_number,
                    &self.ctx.registry,
                    self.single_player,
                    self.ctx.screen,
                ) {
                    Ok(race) => ActiveState::Game(Box::new(race)),
                    Err(err) => {
                        error!(
                            level = self.level_number,
                            path = %level_path.display(),
                            error = %err,
                            "level_load_failed"
                        );
                        self.notice = Some(format!("could not load level {}", self.level_number));
                        self.tracker.request(StateId::Menu);
                        ActiveState::Null
                    }
                }
            }
            StateId::Exit => ActiveState::Exit,
        }
    }
}

impl StateHost for StateEngine {
    fn current_state(&self) -> StateId {
        self.tracker.current()
    }

    fn update(&mut self, input: &InputSnapshot) {
        self.cursor = input.cursor_position_px();
        let next = if input.quit_requested() {
            Some(StateId::Exit)
        } else {
            match &mut self.active {
                ActiveState::Intro(intro) => {
                    if input.was_pressed(InputAction::Quit) {
                        Some(StateId::Exit)
                    } else if intro.update(input) {
                        Some(StateId::Menu)
                    } else {
                        None
                    }
                }
                ActiveState::Menu(menu) => {
                    let command = menu.update(input);
                    self.level_number = menu.level_number();
                    self.single_player = menu.single_player();
                    match command {
                        MenuCommand::None => None,
                        MenuCommand::StartRace { .. } => Some(StateId::Game),
                        MenuCommand::OpenEditor => Some(StateId::Edit),
                        MenuCommand::Quit => Some(StateId::Exit),
                    }
                }
                ActiveState::Edit(editor) => match editor.update(input, &self.ctx) {
                    EditorCommand::None => None,
                    EditorCommand::ToMenu => Some(StateId::Menu),
                },
                ActiveState::Game(race) => match race.update(input, &self.ctx.registry) {
                    RaceCommand::None => None,
                    RaceCommand::ToMenu => Some(StateId::Menu),
                },
                ActiveState::Null | ActiveState::Init | ActiveState::Exit => None,
            }
        };
        if let Some(next) = next {
            self.tracker.request(next);
        }
        self.change_state();
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        match &self.active {
            ActiveState::Intro(intro) => intro.draw(surface),
            ActiveState::Menu(menu) => menu.draw(surface),
            ActiveState::Edit(editor) => editor.draw(surface, &self.ctx.registry, self.cursor),
            ActiveState::Game(race) => race.draw(surface, &self.ctx.registry),
            ActiveState::Null | ActiveState::Init | ActiveState::Exit => surface.clear(IDLE_COLOR),
        }
    }

    fn title(&self) -> Option<String> {
        let title = match &self.active {
            ActiveState::Edit(editor) => editor.title(&self.ctx.registry),
            ActiveState::Game(race) => race.title(),
            _ => WINDOW_TITLE.to_string(),
        };
        Some(title)
    }

    fn shutdown(&mut self) {
        info!(state = ?self.tracker.current(), "state_engine_shutdown");
    }
}
