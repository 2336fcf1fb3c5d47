//! Headless runner
//!
//! Drives the frame scheduler against a scripted cursor path without a
//! display: the trigger is held for the first two thirds of the run, then
//! released so the trail fades out. Useful for smoke-testing the pipeline
//! on machines with no compositor.

use stria_core::{ControlQueue, InputSnapshot, InputSource, ScriptedInput, TrailConfig};
use stria_paint::{PaintContext, Point};
use stria_trail::{FrameScheduler, Phase};

#[derive(Debug, Default)]
pub struct HeadlessStats {
    pub ticks: u64,
    pub peak_points: usize,
    pub peak_particles: usize,
    pub peak_commands: usize,
    pub final_points: usize,
    pub finished_idle: bool,
}

pub fn run(config: &TrailConfig, fps: u32, ticks: u64, seed: u64) -> HeadlessStats {
    let dt = 1.0 / fps.max(1) as f32;
    let mut scheduler = FrameScheduler::new(config, fps as f32, seed);
    let mut input = ScriptedInput::new(script(ticks));
    let controls = ControlQueue::new();
    let mut ctx = PaintContext::new();
    let mut stats = HeadlessStats::default();

    for _ in 0..ticks {
        let events = controls.drain();
        scheduler.tick(input.poll(), &events, config, dt);

        ctx.clear();
        scheduler.render(&mut ctx, config);

        stats.ticks += 1;
        stats.peak_points = stats.peak_points.max(scheduler.buffer().len());
        stats.peak_particles = stats.peak_particles.max(scheduler.particles().len());
        stats.peak_commands = stats.peak_commands.max(ctx.commands().len());
    }

    stats.final_points = scheduler.buffer().len();
    stats.finished_idle = scheduler.phase() == Phase::Idle;
    stats
}

/// A slow figure-of-eight sweep, trigger held for the first two thirds.
fn script(ticks: u64) -> Vec<InputSnapshot> {
    let held_for = ticks * 2 / 3;
    (0..ticks)
        .map(|i| {
            let t = i as f32 * 0.05;
            InputSnapshot {
                cursor: Point::new(
                    640.0 + 400.0 * t.sin(),
                    360.0 + 200.0 * (2.0 * t).sin(),
                ),
                trigger_held: i < held_for,
                ..InputSnapshot::default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_draws_then_fades_back_to_idle() {
        let config = TrailConfig {
            fade_duration: 0.5,
            ..TrailConfig::default()
        };
        // 600 ticks at 60 fps: 6.6 s of drawing, 3.3 s to fade and settle
        let stats = run(&config, 60, 600, 1234);

        assert_eq!(stats.ticks, 600);
        assert!(stats.peak_points > 10);
        assert!(stats.peak_commands > 0);
        assert_eq!(stats.final_points, 0);
        assert!(stats.finished_idle);
    }

    #[test]
    fn zero_ticks_is_a_no_op() {
        let stats = run(&TrailConfig::default(), 60, 0, 1);
        assert_eq!(stats.ticks, 0);
        assert_eq!(stats.peak_commands, 0);
    }
}
