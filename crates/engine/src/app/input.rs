use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    P1Up,
    P1Down,
    P1Left,
    P1Right,
    P1Jump,
    P2Up,
    P2Down,
    P2Left,
    P2Right,
    P2Jump,
    Confirm,
    ToMenu,
    Cancel,
    ToggleLayer,
    CycleNext,
    CyclePrev,
    PickType,
    FillLayer,
    SaveMap,
    OpenMap,
    NewMap,
    OpenEditor,
    TogglePlayers,
    Quit,
}

const ACTION_COUNT: usize = 24;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set_down(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn set_pressed(&mut self, action: InputAction, pressed: bool) {
        self.pressed[action.index()] = pressed;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }

    pub(crate) fn clear_pressed(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        self as usize
    }
}

/// Input state for one simulation tick. `is_down` is the held state, `was_pressed`
/// is true only on the first tick after a press.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    cursor_position_px: Option<(i32, i32)>,
    left_mouse_down: bool,
    right_mouse_down: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        cursor_position_px: Option<(i32, i32)>,
        left_mouse_down: bool,
        right_mouse_down: bool,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            cursor_position_px,
            left_mouse_down,
            right_mouse_down,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set_down(action, is_down);
        self
    }

    /// Marks `action` as pressed this tick (and held).
    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set_down(action, true);
        self.actions.set_pressed(action, true);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<(i32, i32)>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_mouse_down(mut self, left_mouse_down: bool) -> Self {
        self.left_mouse_down = left_mouse_down;
        self
    }

    pub fn with_right_mouse_down(mut self, right_mouse_down: bool) -> Self {
        self.right_mouse_down = right_mouse_down;
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn cursor_position_px(&self) -> Option<(i32, i32)> {
        self.cursor_position_px
    }

    pub fn left_mouse_down(&self) -> bool {
        self.left_mouse_down
    }

    pub fn right_mouse_down(&self) -> bool {
        self.right_mouse_down
    }
}

pub trait InputSource {
    fn snapshot_for_tick(&mut self) -> InputSnapshot;
}

/// Replays a fixed sequence of snapshots, then empty input.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    queued: VecDeque<InputSnapshot>,
}

impl ScriptedInput {
    pub fn new(snapshots: impl IntoIterator<Item = InputSnapshot>) -> Self {
        Self {
            queued: snapshots.into_iter().collect(),
        }
    }

    pub fn push(&mut self, snapshot: InputSnapshot) {
        self.queued.push_back(snapshot);
    }

    pub fn remaining(&self) -> usize {
        self.queued.len()
    }
}

impl InputSource for ScriptedInput {
    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        self.queued.pop_front().unwrap_or_default()
    }
}
