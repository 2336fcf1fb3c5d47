//! Frame scheduler
//!
//! The fixed-interval driver: each tick drains control events, snapshots
//! input, feeds the point buffer, ages everything, and records the frame.
//! Tick and render run back to back on one thread, so the buffer and
//! particle list are never touched concurrently.

use stria_core::{ControlEvent, InputSnapshot, ShapeMode, TrailConfig};
use stria_paint::{PaintContext, Point};

use crate::buffer::{AppendOutcome, PointBuffer, StrokeKind};
use crate::compositor;
use crate::particle::{self, ParticleSystem};
use crate::shape;

/// A drag shorter than this commits no shape.
const MIN_SHAPE_DRAG: f32 = 5.0;

/// Scheduler state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No trigger, nothing left to fade
    Idle,
    /// Trigger held, or released with points still fading
    Drawing,
    /// Aging suspended by the pause key, lock toggle, or menu pause
    Frozen,
}

pub struct FrameScheduler {
    buffer: PointBuffer,
    particles: ParticleSystem,
    phase: Phase,
    /// Phase to restore when the freeze lifts
    resume_phase: Phase,
    prev_trigger: bool,
    /// Latched pause flipped by [`ControlEvent::PauseToggled`]
    pause_latch: bool,
    shape_mode: ShapeMode,
    shape_anchor: Option<Point>,
    last_snapshot: InputSnapshot,
    frame_rate: f32,
}

impl FrameScheduler {
    pub fn new(config: &TrailConfig, frame_rate: f32, seed: u64) -> Self {
        Self {
            buffer: PointBuffer::new(),
            particles: ParticleSystem::new(seed),
            phase: Phase::Idle,
            resume_phase: Phase::Idle,
            prev_trigger: false,
            pause_latch: false,
            shape_mode: config.shape_mode,
            shape_anchor: None,
            last_snapshot: InputSnapshot::default(),
            frame_rate: frame_rate.max(1.0),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn buffer(&self) -> &PointBuffer {
        &self.buffer
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn shape_mode(&self) -> ShapeMode {
        self.shape_mode
    }

    /// One fixed-interval tick. A `None` snapshot is a transient input
    /// fault: the last good snapshot is reused and the tick proceeds.
    pub fn tick(
        &mut self,
        snapshot: Option<InputSnapshot>,
        events: &[ControlEvent],
        config: &TrailConfig,
        dt: f32,
    ) {
        match snapshot {
            Some(snapshot) => self.last_snapshot = snapshot,
            None => tracing::trace!("input poll failed, reusing last snapshot"),
        }
        let snap = self.last_snapshot;

        for event in events {
            match event {
                ControlEvent::PauseToggled => self.pause_latch = !self.pause_latch,
                ControlEvent::Clear => self.buffer.clear(),
                ControlEvent::ShapeMode(mode) => self.shape_mode = *mode,
                // Shutdown belongs to the shell driving this scheduler
                ControlEvent::Quit => {}
            }
        }

        let frozen = self.pause_latch || snap.pause_held || snap.pause_toggled;
        self.apply_freeze(frozen);

        let pressed = snap.trigger_held;
        if pressed && !self.prev_trigger {
            self.on_trigger_pressed(snap.cursor);
        }
        if !pressed && self.prev_trigger {
            self.on_trigger_released(snap.cursor, config);
        }

        if pressed
            && self.shape_mode == ShapeMode::Freehand
            && (!frozen || config.append_while_frozen)
        {
            if let AppendOutcome::Added(position) = self.buffer.append(snap.cursor, config) {
                if !frozen {
                    self.particles.on_point_appended(
                        position,
                        self.local_tangent(),
                        self.frame_rate,
                        config,
                    );
                }
            }
        }

        self.buffer.set_paused(frozen);
        self.buffer.tick(dt, config);
        if !frozen {
            self.particles.tick(dt);
        }

        if self.phase == Phase::Drawing && !pressed && self.buffer.is_empty() {
            self.phase = Phase::Idle;
        }
        self.prev_trigger = pressed;
    }

    /// Record the frame: trail strokes, the live shape preview, then
    /// particles on top. Render only reads; every fault class it could
    /// hit (non-finite samples, coincident points, out-of-range settings)
    /// has already been sanitized or clamped on the way in.
    pub fn render(&self, ctx: &mut PaintContext, config: &TrailConfig) {
        let gradient = compositor::gradient_for(config);
        compositor::render_trail(ctx, &self.buffer, &gradient, config);

        if let Some(anchor) = self.shape_anchor {
            let cursor = self.last_snapshot.cursor;
            if anchor.distance(cursor) > MIN_SHAPE_DRAG {
                compositor::render_shape_preview(
                    ctx,
                    self.shape_mode,
                    anchor,
                    cursor,
                    &gradient,
                    config,
                );
            }
        }

        particle::render_particles(ctx, self.particles.particles());
    }

    fn apply_freeze(&mut self, frozen: bool) {
        if frozen && self.phase != Phase::Frozen {
            self.resume_phase = self.phase;
            self.phase = Phase::Frozen;
        } else if !frozen && self.phase == Phase::Frozen {
            self.phase = self.resume_phase;
        }
    }

    fn on_trigger_pressed(&mut self, cursor: Point) {
        match self.phase {
            Phase::Idle => self.phase = Phase::Drawing,
            Phase::Frozen => self.resume_phase = Phase::Drawing,
            Phase::Drawing => {}
        }
        self.buffer.begin_stroke(match self.shape_mode {
            ShapeMode::Freehand => StrokeKind::Curved,
            _ => StrokeKind::Straight,
        });
        self.particles.begin_stroke();
        if self.shape_mode != ShapeMode::Freehand && cursor.is_finite() {
            self.shape_anchor = Some(cursor);
        }
    }

    fn on_trigger_released(&mut self, cursor: Point, config: &TrailConfig) {
        if let Some(anchor) = self.shape_anchor.take() {
            if cursor.is_finite() && anchor.distance(cursor) > MIN_SHAPE_DRAG {
                for polyline in
                    shape::outline(self.shape_mode, anchor, cursor, config.core_thickness)
                {
                    self.buffer.commit_polyline(&polyline, config);
                }
            }
        }
    }

    /// Direction of the newest span of the current stroke, for crystal
    /// spawning.
    fn local_tangent(&self) -> Option<Point> {
        let points = self.buffer.points();
        let [.., prev, last] = points else {
            return None;
        };
        if prev.stroke != last.stroke {
            return None;
        }
        let delta = last.smoothed - prev.smoothed;
        let length = delta.distance(Point::ZERO);
        (length > 0.5).then(|| delta * (1.0 / length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> TrailConfig {
        TrailConfig {
            min_spacing: 1.0,
            ema_alpha: 1.0,
            fade_duration: 1.0,
            fade_slowdown: 1.0,
            particles_enabled: false,
            crystals_enabled: false,
            ..TrailConfig::default()
        }
    }

    fn held_at(x: f32, y: f32) -> InputSnapshot {
        InputSnapshot {
            cursor: Point::new(x, y),
            trigger_held: true,
            ..InputSnapshot::default()
        }
    }

    fn released_at(x: f32, y: f32) -> InputSnapshot {
        InputSnapshot::at(Point::new(x, y))
    }

    #[test]
    fn trigger_press_enters_drawing() {
        let cfg = config();
        let mut scheduler = FrameScheduler::new(&cfg, 60.0, 1);
        assert_eq!(scheduler.phase(), Phase::Idle);

        scheduler.tick(Some(held_at(10.0, 10.0)), &[], &cfg, DT);
        assert_eq!(scheduler.phase(), Phase::Drawing);
        assert_eq!(scheduler.buffer().len(), 1);
    }

    #[test]
    fn drawing_persists_after_release_until_points_fade() {
        let cfg = config();
        let mut scheduler = FrameScheduler::new(&cfg, 60.0, 1);

        for i in 0..5 {
            scheduler.tick(Some(held_at(i as f32 * 10.0, 0.0)), &[], &cfg, DT);
        }
        scheduler.tick(Some(released_at(50.0, 0.0)), &[], &cfg, DT);
        assert_eq!(scheduler.phase(), Phase::Drawing);
        assert!(!scheduler.buffer().is_empty());

        // Age everything past the fade duration
        scheduler.tick(Some(released_at(50.0, 0.0)), &[], &cfg, 2.0);
        assert!(scheduler.buffer().is_empty());
        assert_eq!(scheduler.phase(), Phase::Idle);
    }

    #[test]
    fn pause_key_freezes_ages_and_restores_previous_phase() {
        let cfg = config();
        let mut scheduler = FrameScheduler::new(&cfg, 60.0, 1);
        scheduler.tick(Some(held_at(0.0, 0.0)), &[], &cfg, DT);
        scheduler.tick(Some(held_at(30.0, 0.0)), &[], &cfg, DT);
        let age_before = scheduler.buffer().points()[0].age;

        let mut paused = held_at(30.0, 0.0);
        paused.pause_held = true;
        scheduler.tick(Some(paused), &[], &cfg, 5.0);
        assert_eq!(scheduler.phase(), Phase::Frozen);
        assert_eq!(scheduler.buffer().points()[0].age, age_before);

        scheduler.tick(Some(held_at(30.0, 0.0)), &[], &cfg, DT);
        assert_eq!(scheduler.phase(), Phase::Drawing);
    }

    #[test]
    fn pause_toggle_event_latches_until_toggled_again() {
        let cfg = config();
        let mut scheduler = FrameScheduler::new(&cfg, 60.0, 1);
        scheduler.tick(Some(held_at(0.0, 0.0)), &[ControlEvent::PauseToggled], &cfg, DT);
        assert_eq!(scheduler.phase(), Phase::Frozen);

        scheduler.tick(Some(held_at(0.0, 0.0)), &[], &cfg, DT);
        assert_eq!(scheduler.phase(), Phase::Frozen);

        scheduler.tick(Some(held_at(0.0, 0.0)), &[ControlEvent::PauseToggled], &cfg, DT);
        assert_eq!(scheduler.phase(), Phase::Drawing);
    }

    #[test]
    fn clear_event_empties_the_buffer() {
        let cfg = config();
        let mut scheduler = FrameScheduler::new(&cfg, 60.0, 1);
        for i in 0..4 {
            scheduler.tick(Some(held_at(i as f32 * 20.0, 0.0)), &[], &cfg, DT);
        }
        assert!(!scheduler.buffer().is_empty());

        scheduler.tick(Some(held_at(80.0, 0.0)), &[ControlEvent::Clear], &cfg, DT);
        // The clear lands before this tick's append, so at most the fresh
        // point remains
        assert!(scheduler.buffer().len() <= 1);
    }

    #[test]
    fn input_fault_reuses_the_last_snapshot() {
        let cfg = config();
        let mut scheduler = FrameScheduler::new(&cfg, 60.0, 1);
        scheduler.tick(Some(held_at(0.0, 0.0)), &[], &cfg, DT);
        let len = scheduler.buffer().len();

        scheduler.tick(None, &[], &cfg, DT);
        assert_eq!(scheduler.phase(), Phase::Drawing);
        // Same cursor position coalesces, never panics or drops the stroke
        assert_eq!(scheduler.buffer().len(), len);
    }

    #[test]
    fn shape_drag_commits_on_release() {
        let cfg = config();
        let mut scheduler = FrameScheduler::new(&cfg, 60.0, 1);
        scheduler.tick(
            Some(released_at(0.0, 0.0)),
            &[ControlEvent::ShapeMode(ShapeMode::Box)],
            &cfg,
            DT,
        );

        scheduler.tick(Some(held_at(0.0, 0.0)), &[], &cfg, DT);
        // Dragging: nothing committed yet, freehand append is bypassed
        scheduler.tick(Some(held_at(100.0, 60.0)), &[], &cfg, DT);
        assert!(scheduler.buffer().is_empty());

        scheduler.tick(Some(released_at(100.0, 60.0)), &[], &cfg, DT);
        assert!(!scheduler.buffer().is_empty());
        assert!(scheduler
            .buffer()
            .points()
            .iter()
            .all(|p| p.kind == StrokeKind::Straight));
    }

    #[test]
    fn tiny_shape_drag_commits_nothing() {
        let cfg = config();
        let mut scheduler = FrameScheduler::new(&cfg, 60.0, 1);
        scheduler.tick(
            Some(released_at(0.0, 0.0)),
            &[ControlEvent::ShapeMode(ShapeMode::Circle)],
            &cfg,
            DT,
        );
        scheduler.tick(Some(held_at(0.0, 0.0)), &[], &cfg, DT);
        scheduler.tick(Some(released_at(2.0, 2.0)), &[], &cfg, DT);
        assert!(scheduler.buffer().is_empty());
    }

    #[test]
    fn shape_preview_renders_while_dragging() {
        let cfg = config();
        let mut scheduler = FrameScheduler::new(&cfg, 60.0, 1);
        scheduler.tick(
            Some(released_at(0.0, 0.0)),
            &[ControlEvent::ShapeMode(ShapeMode::Arrow)],
            &cfg,
            DT,
        );
        scheduler.tick(Some(held_at(0.0, 0.0)), &[], &cfg, DT);
        scheduler.tick(Some(held_at(120.0, 40.0)), &[], &cfg, DT);

        let mut ctx = PaintContext::new();
        scheduler.render(&mut ctx, &cfg);
        assert!(!ctx.commands().is_empty());
    }

    #[test]
    fn particles_spawn_while_drawing_when_enabled() {
        let cfg = TrailConfig {
            particles_enabled: true,
            explosion_frequency: 60.0,
            ..config()
        };
        let mut scheduler = FrameScheduler::new(&cfg, 60.0, 1);
        for i in 0..5 {
            scheduler.tick(Some(held_at(i as f32 * 15.0, 0.0)), &[], &cfg, DT);
        }
        assert!(!scheduler.particles().is_empty());
    }

    #[test]
    fn render_records_commands_for_a_live_stroke() {
        let cfg = config();
        let mut scheduler = FrameScheduler::new(&cfg, 60.0, 1);
        for i in 0..6 {
            scheduler.tick(Some(held_at(i as f32 * 12.0, (i as f32).sin() * 8.0)), &[], &cfg, DT);
        }
        let mut ctx = PaintContext::new();
        scheduler.render(&mut ctx, &cfg);
        assert!(!ctx.commands().is_empty());
    }
}
