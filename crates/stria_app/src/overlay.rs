//! Transparent overlay window and event loop
//!
//! A borderless, always-on-top, click-through window spanning the primary
//! monitor. Because the window never takes focus, key and cursor state
//! come from raw device events rather than window events; on platforms
//! that withhold raw input the trail simply stays idle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId, WindowLevel};

use stria_core::{
    ControlEvent, ControlQueue, InputSnapshot, KeyChoice, ShapeMode, TrailConfig,
};
use stria_paint::{PaintContext, Point};
use stria_trail::FrameScheduler;

use crate::renderer::GpuRenderer;

/// Run the overlay until quit; returns the (possibly updated) settings so
/// the caller can persist them.
pub fn run(config: TrailConfig, fps: u32, seed: u64) -> Result<TrailConfig> {
    let event_loop = EventLoop::new()?;
    let mut app = OverlayApp::new(config, fps, seed);
    event_loop.run_app(&mut app)?;

    let mut config = app.config;
    config.shape_mode = app.scheduler.shape_mode();
    Ok(config)
}

/// Held-key state assembled from raw device events
#[derive(Debug, Default)]
struct KeyState {
    control: bool,
    shift: bool,
    alt: bool,
    super_key: bool,
    caps_lock: bool,
}

impl KeyState {
    fn active(&self, choice: KeyChoice) -> bool {
        match choice {
            KeyChoice::Control => self.control,
            KeyChoice::Shift => self.shift,
            KeyChoice::Alt => self.alt,
            KeyChoice::Super => self.super_key,
            KeyChoice::Capslock => self.caps_lock,
        }
    }
}

struct OverlayApp {
    config: TrailConfig,
    scheduler: FrameScheduler,
    controls: ControlQueue,
    window: Option<Arc<Window>>,
    renderer: Option<GpuRenderer>,
    keys: KeyState,
    cursor: Point,
    bounds: PhysicalSize<u32>,
    frame_interval: Duration,
    last_tick: Instant,
    ctx: PaintContext,
}

impl OverlayApp {
    fn new(config: TrailConfig, fps: u32, seed: u64) -> Self {
        let scheduler = FrameScheduler::new(&config, fps as f32, seed);
        Self {
            config,
            scheduler,
            controls: ControlQueue::new(),
            window: None,
            renderer: None,
            keys: KeyState::default(),
            cursor: Point::ZERO,
            bounds: PhysicalSize::new(1, 1),
            frame_interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            last_tick: Instant::now(),
            ctx: PaintContext::new(),
        }
    }

    fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            cursor: self.cursor,
            trigger_held: self.keys.active(self.config.trigger_key),
            pause_held: self.keys.active(self.config.pause_key),
            pause_toggled: self.keys.active(self.config.toggle_key),
        }
    }

    fn on_raw_key(&mut self, key: KeyCode, state: ElementState) {
        let pressed = state.is_pressed();
        match key {
            KeyCode::ControlLeft | KeyCode::ControlRight => self.keys.control = pressed,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.keys.shift = pressed,
            KeyCode::AltLeft | KeyCode::AltRight => self.keys.alt = pressed,
            KeyCode::SuperLeft | KeyCode::SuperRight => self.keys.super_key = pressed,
            KeyCode::CapsLock => {
                if pressed {
                    self.keys.caps_lock = !self.keys.caps_lock;
                }
            }
            // Alt+1..4 switches the drawing mode
            KeyCode::Digit1 if pressed && self.keys.alt => {
                self.controls
                    .sender()
                    .send(ControlEvent::ShapeMode(ShapeMode::Freehand));
            }
            KeyCode::Digit2 if pressed && self.keys.alt => {
                self.controls
                    .sender()
                    .send(ControlEvent::ShapeMode(ShapeMode::Box));
            }
            KeyCode::Digit3 if pressed && self.keys.alt => {
                self.controls
                    .sender()
                    .send(ControlEvent::ShapeMode(ShapeMode::Circle));
            }
            KeyCode::Digit4 if pressed && self.keys.alt => {
                self.controls
                    .sender()
                    .send(ControlEvent::ShapeMode(ShapeMode::Arrow));
            }
            _ => {}
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = (now - self.last_tick).as_secs_f32();
        self.last_tick = now;

        let events = self.controls.drain();
        if events.contains(&ControlEvent::Quit) {
            event_loop.exit();
            return;
        }

        self.scheduler
            .tick(Some(self.snapshot()), &events, &self.config, dt);

        self.ctx.clear();
        self.scheduler.render(&mut self.ctx, &self.config);
        if let Some(renderer) = &mut self.renderer {
            if let Err(error) = renderer.present(self.ctx.commands()) {
                // Skip this frame's draw; the next tick retries cleanly
                tracing::warn!(%error, "present failed");
            }
        }
    }
}

impl ApplicationHandler for OverlayApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        self.bounds = event_loop
            .primary_monitor()
            .map(|monitor| monitor.size())
            .unwrap_or(PhysicalSize::new(1920, 1080));
        self.cursor = Point::new(self.bounds.width as f32 / 2.0, self.bounds.height as f32 / 2.0);

        let attrs = Window::default_attributes()
            .with_title("stria")
            .with_inner_size(self.bounds)
            .with_decorations(false)
            .with_resizable(false)
            .with_transparent(true)
            .with_window_level(WindowLevel::AlwaysOnTop);

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                tracing::error!(%error, "failed to create overlay window");
                event_loop.exit();
                return;
            }
        };
        if let Err(error) = window.set_cursor_hittest(false) {
            tracing::warn!(%error, "overlay is not click-through on this platform");
        }

        match GpuRenderer::new(window.clone(), self.bounds.width, self.bounds.height) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(error) => {
                // Keep ticking without presentation rather than dying;
                // useful on machines with no usable GPU surface.
                tracing::warn!(%error, "renderer unavailable, running without presentation");
            }
        }

        self.last_tick = Instant::now();
        self.window = Some(window);
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.last_tick + self.frame_interval));
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if matches!(cause, StartCause::ResumeTimeReached { .. }) {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                self.bounds = size;
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => self.frame(event_loop),

            // Delivered while the window is hovered even without focus
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Point::new(position.x as f32, position.y as f32);
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        match event {
            DeviceEvent::MouseMotion { delta: (dx, dy) } => {
                self.cursor = Point::new(
                    (self.cursor.x + dx as f32).clamp(0.0, self.bounds.width as f32),
                    (self.cursor.y + dy as f32).clamp(0.0, self.bounds.height as f32),
                );
            }
            DeviceEvent::Key(raw) => {
                if let PhysicalKey::Code(code) = raw.physical_key {
                    self.on_raw_key(code, raw.state);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.last_tick + self.frame_interval));
    }
}
