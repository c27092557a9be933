use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::{InputAction, InputSnapshot, MetricsHandle, Renderer, Scene, SceneCommand, Viewport};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Homestead".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: Some(60),
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

pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>) -> Result<(), AppError> {
    run_app_with_metrics(config, scene, MetricsHandle::default())
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    mut scene: Box<dyn Scene>,
    metrics_handle: MetricsHandle,
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
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let metrics_log_interval =
        non_zero_or(config.metrics_log_interval, Duration::from_secs(1));
    let mut clock = TickClock::from_config(&config);
    let mut pacer = FramePacer::new(config.max_render_fps);
    let viewport = renderer.viewport();
    let mut input_collector = InputCollector::new(viewport.width, viewport.height);

    scene.load(viewport);
    info!(
        width = viewport.width,
        height = viewport.height,
        "scene_loaded"
    );
    info!(
        tick_ms = clock.step.as_secs_f64() * 1000.0,
        frame_limit_ms = clock.frame_limit.as_millis() as u64,
        tick_limit = clock.tick_limit,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = ?pacer.cap(),
        "loop_config"
    );

    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
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
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_key(event.physical_key, event.state);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let budget = clock.advance(raw_frame_dt);
                    let dt = clock.step_seconds();
                    for _ in 0..budget.ticks {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        let command = scene.update(dt, &input_snapshot);
                        metrics_accumulator.record_tick();
                        if command == SceneCommand::Quit {
                            info!(reason = "scene", "shutdown_requested");
                            window_target.exit();
                            break;
                        }
                    }
                    if budget.dropped > Duration::ZERO {
                        warn!(
                            dropped_ms = budget.dropped.as_millis() as u64,
                            tick_limit = clock.tick_limit,
                            "sim_backlog_dropped"
                        );
                    }

                    let idle = pacer.idle_before_present(Instant::now());
                    if idle > Duration::ZERO {
                        thread::sleep(idle);
                    }

                    let render_result = renderer.render_frame(|canvas, viewport: Viewport| {
                        scene.render(canvas, viewport);
                    });
                    if let Err(error) = render_result {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    pacer.presented(Instant::now());

                    let next_title = scene.debug_title();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window.set_title(title),
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        let Some(action) = action_for_key(key) else {
            return;
        };
        self.action_states.set(action, is_pressed);
        if action == InputAction::Quit && is_pressed {
            self.mark_quit_requested();
        }
    }

    /// Press edges are consumed by the first tick that sees them.
    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.window_width,
            self.window_height,
        );
        self.action_states.clear_edges();
        snapshot
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let action = match code {
        KeyCode::KeyW | KeyCode::ArrowUp => InputAction::MoveUp,
        KeyCode::KeyS | KeyCode::ArrowDown => InputAction::MoveDown,
        KeyCode::KeyA | KeyCode::ArrowLeft => InputAction::MoveLeft,
        KeyCode::KeyD | KeyCode::ArrowRight => InputAction::MoveRight,
        KeyCode::Space | KeyCode::KeyC => InputAction::UseTool,
        KeyCode::KeyQ | KeyCode::Tab => InputAction::SwitchTool,
        KeyCode::KeyE => InputAction::CycleSeed,
        KeyCode::KeyF => InputAction::Plant,
        KeyCode::KeyH => InputAction::Harvest,
        KeyCode::Enter => InputAction::Sleep,
        KeyCode::Escape => InputAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Turns wall-clock frame time into whole fixed-length simulation ticks.
#[derive(Debug)]
struct TickClock {
    step: Duration,
    frame_limit: Duration,
    tick_limit: u32,
    banked: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TickBudget {
    ticks: u32,
    dropped: Duration,
}

impl TickClock {
    fn new(step: Duration, frame_limit: Duration, tick_limit: u32) -> Self {
        Self {
            step: non_zero_or(step, Duration::from_secs(1)),
            frame_limit: non_zero_or(frame_limit, Duration::from_millis(250)),
            tick_limit: tick_limit.max(1),
            banked: Duration::ZERO,
        }
    }

    fn from_config(config: &LoopConfig) -> Self {
        let tps = config.target_tps.max(1);
        Self::new(
            Duration::from_secs_f64(1.0 / f64::from(tps)),
            config.max_frame_delta,
            config.max_ticks_per_frame,
        )
    }

    fn step_seconds(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Banks one frame of elapsed time and spends it on ticks. A backlog
    /// beyond the tick limit is discarded instead of carried forward.
    fn advance(&mut self, frame_dt: Duration) -> TickBudget {
        self.banked = self
            .banked
            .saturating_add(frame_dt.min(self.frame_limit));
        let due = self.banked.as_nanos() / self.step.as_nanos();
        let ticks = due.min(u128::from(self.tick_limit)) as u32;
        self.banked = self.banked.saturating_sub(self.step * ticks);

        let dropped = if due > u128::from(self.tick_limit) {
            std::mem::take(&mut self.banked)
        } else {
            Duration::ZERO
        };
        TickBudget { ticks, dropped }
    }
}

/// Sleeps off the rest of a frame when presenting faster than the cap.
#[derive(Debug)]
struct FramePacer {
    frame_time: Option<Duration>,
    last_present: Instant,
}

impl FramePacer {
    fn new(max_render_fps: Option<u32>) -> Self {
        Self {
            frame_time: max_render_fps
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps))),
            last_present: Instant::now(),
        }
    }

    fn cap(&self) -> Option<u32> {
        self.frame_time
            .map(|frame| (1.0 / frame.as_secs_f64()).round() as u32)
    }

    fn idle_before_present(&self, now: Instant) -> Duration {
        match self.frame_time {
            Some(frame) => frame.saturating_sub(now.saturating_duration_since(self.last_present)),
            None => Duration::ZERO,
        }
    }

    fn presented(&mut self, at: Instant) {
        self.last_present = at;
    }
}

fn non_zero_or(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
