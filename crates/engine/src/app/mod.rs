mod camera;
mod input;
mod loop_runner;
mod state;
pub(crate) mod surface;
mod text;

pub use camera::{Camera, CAMERA_SPEED_DEFAULT};
pub use input::{InputAction, InputSnapshot, InputSource, ScriptedInput};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use state::{is_legal_transition, StateHost, StateId, StateTracker};
pub use surface::{
    draw_outline, is_valid_sheet_key, FrameSurface, Rgba, ScreenRect, SpriteRect,
    SpriteSheetCache, Surface, SubSurface, PLACEHOLDER_SHEET_COLOR,
};
pub use text::{draw_text, draw_text_centered, text_height, text_width};
