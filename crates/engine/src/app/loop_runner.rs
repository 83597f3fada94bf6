use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::{Error as PixelsError, Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::ActionStates;
use super::state::{StateHost, StateId};
use super::surface::{FrameSurface, SpriteSheetCache};
use super::{InputAction, InputSnapshot, InputSource};

pub const SLOW_FRAME_ENV_VAR: &str = "MINIJIM_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Size of the frame buffer states draw into; scaled to the window.
    pub render_width: u32,
    pub render_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Mini Jim".to_string(),
            window_width: 1280,
            window_height: 960,
            render_width: 1280,
            render_height: 960,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Runs `host` until it reaches `StateId::Exit` or the window closes.
/// `host.update` runs at a fixed tick rate; `host.draw` once per presented frame.
pub fn run_app(
    config: LoopConfig,
    asset_root: PathBuf,
    mut host: Box<dyn StateHost>,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let render_width = config.render_width.max(1);
    let render_height = config.render_height.max(1);
    let window_size = window.inner_size();
    let mut pixels = Pixels::new(
        render_width,
        render_height,
        SurfaceTexture::new(window_size.width, window_size.height, Arc::clone(&window)),
    )
    .map_err(AppError::CreateRenderer)?;
    let mut sheets = SpriteSheetCache::new(&asset_root);

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let mut input_collector = InputCollector::default();

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        render_width,
        render_height,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if new_size.width > 0 && new_size.height > 0 {
                        if let Err(error) = pixels.resize_surface(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let mapped = pixels
                        .window_pos_to_pixel((position.x as f32, position.y as f32))
                        .ok()
                        .map(|(x, y)| (x as i32, y as i32));
                    input_collector.set_cursor_position_px(mapped);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.set_cursor_position_px(None);
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_key(event.physical_key, event.state);
                }
                WindowEvent::RedrawRequested => {
                    if slow_frame_delay > Duration::ZERO {
                        // Debug perturbation only; the FPS cap is applied below.
                        thread::sleep(slow_frame_delay);
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;
                    accumulator =
                        accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let snapshot = input_collector.snapshot_for_tick();
                        host.update(&snapshot);
                        if host.current_state() == StateId::Exit {
                            break;
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;
                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }
                    if host.current_state() == StateId::Exit {
                        info!(reason = "exit_state", "shutdown_requested");
                        window_target.exit();
                        return;
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    {
                        let mut surface = FrameSurface::new(
                            pixels.frame_mut(),
                            render_width,
                            render_height,
                            &mut sheets,
                        );
                        host.draw(&mut surface);
                    }
                    if let Err(error) = pixels.render() {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title = host.title();
                    if next_title != last_applied_title {
                        window.set_title(next_title.as_deref().unwrap_or(&config.window_title));
                        last_applied_title = next_title;
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                host.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Turns window events into per-tick snapshots. Press edges survive until the
/// next snapshot, so a tap between two ticks is never lost.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    cursor_position_px: Option<(i32, i32)>,
    left_mouse_is_down: bool,
    right_mouse_is_down: bool,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let is_pressed = state == ElementState::Pressed;
        for action in actions_for_key(code) {
            if is_pressed && !self.action_states.is_down(*action) {
                self.action_states.set_pressed(*action, true);
            }
            self.action_states.set_down(*action, is_pressed);
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        let is_down = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.left_mouse_is_down = is_down,
            MouseButton::Right => self.right_mouse_is_down = is_down,
            _ => {}
        }
    }

    fn set_cursor_position_px(&mut self, position: Option<(i32, i32)>) {
        self.cursor_position_px = position;
    }
}

impl InputSource for InputCollector {
    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.cursor_position_px,
            self.left_mouse_is_down,
            self.right_mouse_is_down,
        );
        self.action_states.clear_pressed();
        snapshot
    }
}

/// Fixed key bindings. Player one uses the arrows and keypad enter, player two
/// uses WASD and space; the editor shares some of those keys.
fn actions_for_key(code: KeyCode) -> &'static [InputAction] {
    use InputAction::*;
    match code {
        KeyCode::ArrowUp => &[P1Up, CycleNext],
        KeyCode::ArrowDown => &[P1Down, CyclePrev],
        KeyCode::ArrowLeft => &[P1Left],
        KeyCode::ArrowRight => &[P1Right],
        KeyCode::NumpadEnter => &[P1Jump],
        KeyCode::KeyW => &[P2Up],
        KeyCode::KeyS => &[P2Down, SaveMap],
        KeyCode::KeyA => &[P2Left],
        KeyCode::KeyD => &[P2Right],
        KeyCode::Space => &[P2Jump],
        KeyCode::Enter => &[Confirm],
        KeyCode::KeyM => &[ToMenu],
        KeyCode::Backquote => &[Cancel],
        KeyCode::Tab => &[ToggleLayer],
        KeyCode::KeyK => &[PickType],
        KeyCode::KeyF => &[FillLayer],
        KeyCode::KeyO => &[OpenMap],
        KeyCode::KeyN => &[NewMap],
        KeyCode::KeyE => &[OpenEditor],
        KeyCode::KeyP => &[TogglePlayers],
        KeyCode::Escape => &[Quit],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::replace(&mut accumulator, Duration::ZERO)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    cap.map_or_else(|| "off".to_string(), |value| value.to_string())
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let result = plan_sim_steps(Duration::from_millis(48), Duration::from_millis(16), 5);
        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_keeps_partial_tick() {
        let result = plan_sim_steps(Duration::from_millis(40), Duration::from_millis(16), 5);
        assert_eq!(result.ticks_to_run, 2);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(8));
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let result = plan_sim_steps(Duration::from_millis(120), Duration::from_millis(16), 3);
        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn key_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::default();
        input.handle_key(PhysicalKey::Code(KeyCode::Tab), ElementState::Pressed);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.was_pressed(InputAction::ToggleLayer));
        assert!(!second.was_pressed(InputAction::ToggleLayer));
        assert!(second.is_down(InputAction::ToggleLayer));
    }

    #[test]
    fn held_key_repeat_does_not_spam_press_edges() {
        let mut input = InputCollector::default();
        let key = PhysicalKey::Code(KeyCode::KeyF);

        input.handle_key(key, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        input.handle_key(key, ElementState::Pressed);
        let second = input.snapshot_for_tick();
        input.handle_key(key, ElementState::Released);
        input.handle_key(key, ElementState::Pressed);
        let third = input.snapshot_for_tick();

        assert!(first.was_pressed(InputAction::FillLayer));
        assert!(!second.was_pressed(InputAction::FillLayer));
        assert!(third.was_pressed(InputAction::FillLayer));
    }

    #[test]
    fn tap_between_ticks_is_still_seen_once() {
        let mut input = InputCollector::default();
        let key = PhysicalKey::Code(KeyCode::Enter);
        input.handle_key(key, ElementState::Pressed);
        input.handle_key(key, ElementState::Released);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.was_pressed(InputAction::Confirm));
        assert!(!snapshot.is_down(InputAction::Confirm));
    }

    #[test]
    fn player_bindings_do_not_overlap() {
        let mut input = InputCollector::default();
        input.handle_key(PhysicalKey::Code(KeyCode::ArrowLeft), ElementState::Pressed);
        input.handle_key(PhysicalKey::Code(KeyCode::KeyD), ElementState::Pressed);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::P1Left));
        assert!(snapshot.is_down(InputAction::P2Right));
        assert!(!snapshot.is_down(InputAction::P2Left));
        assert!(!snapshot.is_down(InputAction::P1Right));
    }

    #[test]
    fn shared_key_drives_every_bound_action() {
        let mut input = InputCollector::default();
        input.handle_key(PhysicalKey::Code(KeyCode::ArrowUp), ElementState::Pressed);
        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.was_pressed(InputAction::P1Up));
        assert!(snapshot.was_pressed(InputAction::CycleNext));
    }

    #[test]
    fn mouse_buttons_report_held_state() {
        let mut input = InputCollector::default();
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.set_cursor_position_px(Some((40, 50)));
        let held = input.snapshot_for_tick();
        assert!(held.left_mouse_down());
        assert!(!held.right_mouse_down());
        assert_eq!(held.cursor_position_px(), Some((40, 50)));

        input.handle_mouse_input(MouseButton::Left, ElementState::Released);
        assert!(!input.snapshot_for_tick().left_mouse_down());
    }

    #[test]
    fn close_request_reaches_snapshot() {
        let mut input = InputCollector::default();
        input.mark_quit_requested();
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn target_frame_duration_for_60hz_is_expected() {
        assert_eq!(target_frame_duration(None), None);
        let duration = target_frame_duration(Some(60)).expect("duration");
        assert!((duration.as_secs_f64() - (1.0 / 60.0)).abs() < 0.000_001);
    }

    #[test]
    fn compute_cap_sleep_only_when_under_budget() {
        let target = target_frame_duration(Some(60));
        assert_eq!(compute_cap_sleep(Duration::from_millis(20), target), Duration::ZERO);
        assert!(compute_cap_sleep(Duration::from_millis(5), target) > Duration::ZERO);
    }

    #[test]
    fn normalize_render_fps_cap_disables_zero() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(normalize_render_fps_cap(Some(60)), Some(60));
    }
}
