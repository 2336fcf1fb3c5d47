//! Particle subsystem
//!
//! Sparks burst stochastically along the stroke; ice crystals spray
//! perpendicular to the path. Purely additive decoration: nothing here
//! feeds back into trail state.

use std::f32::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use stria_core::TrailConfig;
use stria_paint::{Color, LineCap, PaintContext, Point};

/// A burst also fires when the cursor has moved this far since the last
/// one, so fast strokes stay covered between timed bursts.
const BURST_DISTANCE: f32 = 40.0;

/// Spark physics
const SPARK_GRAVITY: f32 = 200.0;
const SPARK_DRAG: f32 = 0.98;

/// Ice-crystal physics: high drag, barely any gravity
const CRYSTAL_GRAVITY: f32 = 15.0;
const CRYSTAL_DRAG: f32 = 0.94;

/// Crystal velocity jitter around the perpendicular, +/- 30 degrees
const CRYSTAL_JITTER: f32 = 0.52;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Spark,
    IceCrystal,
}

/// A single short-lived particle
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub position: Point,
    pub velocity: Point,
    pub age: f32,
    pub lifetime: f32,
    pub kind: ParticleKind,
}

impl Particle {
    /// Render alpha: 1 at spawn, 0 at expiry.
    pub fn alpha(&self) -> f32 {
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }

    fn life_ratio(&self) -> f32 {
        (self.age / self.lifetime).clamp(0.0, 1.0)
    }
}

/// Owns every live particle and the RNG that spawns them
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: SmallRng,
    last_burst: Option<Point>,
}

impl ParticleSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            last_burst: None,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Reset the burst distance tracking at the start of a stroke so the
    /// first burst of a new stroke is not distance-triggered from the old
    /// one.
    pub fn begin_stroke(&mut self) {
        self.last_burst = None;
    }

    /// Called for every accepted point append while drawing. `tangent` is
    /// the local path direction (normalized), if known.
    pub fn on_point_appended(
        &mut self,
        position: Point,
        tangent: Option<Point>,
        frame_rate: f32,
        config: &TrailConfig,
    ) {
        if config.particles_enabled {
            let probability = (config.explosion_frequency / frame_rate.max(1.0)).min(1.0);
            let distance_triggered = self
                .last_burst
                .is_some_and(|last| last.distance(position) > BURST_DISTANCE);
            if distance_triggered || self.rng.gen::<f32>() < probability {
                self.spawn_burst(position, config);
                self.last_burst = Some(position);
            }
        }
        if config.crystals_enabled {
            self.spawn_crystals(position, tangent);
        }
        self.enforce_cap(config.max_particles);
    }

    /// Spark count scales as `20 * intensity^1.2`, +/- 25%.
    fn spawn_burst(&mut self, position: Point, config: &TrailConfig) {
        let base = 20.0 * config.particle_intensity.powf(1.2);
        let variance = base * 0.25;
        let lo = (base - variance).max(1.0);
        let hi = (base + variance).max(2.0);
        let count = self.rng.gen_range(lo..=hi) as usize;

        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..TAU);
            let speed = self.rng.gen_range(25.0..200.0);
            let upward = self.rng.gen_range(-80.0..-20.0);
            self.particles.push(Particle {
                position,
                velocity: Point::new(angle.cos() * speed, angle.sin() * speed + upward),
                age: 0.0,
                lifetime: self.rng.gen_range(1.5..3.0),
                kind: ParticleKind::Spark,
            });
        }
    }

    fn spawn_crystals(&mut self, position: Point, tangent: Option<Point>) {
        let count = self.rng.gen_range(1..=3);
        for _ in 0..count {
            let direction = match tangent {
                Some(t) => {
                    // Perpendicular to the path, random side, jittered
                    let perp = if self.rng.gen::<bool>() {
                        Point::new(-t.y, t.x)
                    } else {
                        Point::new(t.y, -t.x)
                    };
                    let jitter = self.rng.gen_range(-CRYSTAL_JITTER..CRYSTAL_JITTER);
                    let (sin, cos) = jitter.sin_cos();
                    Point::new(perp.x * cos - perp.y * sin, perp.x * sin + perp.y * cos)
                }
                None => {
                    let angle = self.rng.gen_range(0.0..TAU);
                    Point::new(angle.cos(), angle.sin())
                }
            };
            let speed = self.rng.gen_range(75.0..180.0);
            let offset = Point::new(
                self.rng.gen_range(-3.0..3.0),
                self.rng.gen_range(-3.0..3.0),
            );
            self.particles.push(Particle {
                position: position + offset,
                velocity: direction * speed,
                age: 0.0,
                lifetime: self.rng.gen_range(0.75..1.875),
                kind: ParticleKind::IceCrystal,
            });
        }
    }

    /// Advance every particle and drop the expired. Frozen frames simply
    /// skip the call, which freezes both age and position.
    pub fn tick(&mut self, dt: f32) {
        if dt < 0.0 {
            return;
        }
        self.particles.retain_mut(|particle| {
            particle.age += dt;
            if particle.age >= particle.lifetime {
                return false;
            }
            particle.position = particle.position + particle.velocity * dt;
            match particle.kind {
                ParticleKind::Spark => {
                    particle.velocity.y += SPARK_GRAVITY * dt;
                    particle.velocity = particle.velocity * SPARK_DRAG;
                }
                ParticleKind::IceCrystal => {
                    particle.velocity.y += CRYSTAL_GRAVITY * dt;
                    particle.velocity = particle.velocity * CRYSTAL_DRAG;
                }
            }
            true
        });
    }

    fn enforce_cap(&mut self, max_particles: usize) {
        let len = self.particles.len();
        if len > max_particles {
            self.particles.drain(..len - max_particles);
        }
    }
}

/// Draw every live particle.
pub fn render_particles(ctx: &mut PaintContext, particles: &[Particle]) {
    for particle in particles {
        let alpha = particle.alpha();
        if alpha <= 0.0 {
            continue;
        }
        match particle.kind {
            ParticleKind::Spark => render_spark(ctx, particle, alpha),
            ParticleKind::IceCrystal => render_crystal(ctx, particle, alpha),
        }
    }
}

fn render_spark(ctx: &mut PaintContext, particle: &Particle, alpha: f32) {
    let life = particle.life_ratio();
    let color = spark_color(life).with_alpha(alpha);
    let size = (4.0 * (1.0 - life * 0.8)).max(1.0);

    // Fast sparks draw as streaks trailing their velocity
    let speed = particle.velocity.distance(Point::ZERO);
    if speed > 0.5 {
        let streak = (speed * 0.5).min(size * 3.0);
        let tail = particle.position - particle.velocity * (streak / speed);
        ctx.stroke_line(
            particle.position,
            tail,
            (size / 2.0).max(1.0),
            color,
            LineCap::Round,
        );
    }
    ctx.fill_circle(particle.position, size, color);
}

fn render_crystal(ctx: &mut PaintContext, particle: &Particle, alpha: f32) {
    let life = particle.life_ratio();
    let color = crystal_color(life).with_alpha(alpha);
    let size = 1.8 * (1.0 - life * 0.2);
    ctx.fill_circle(particle.position, size, color);
    if life < 0.5 {
        // Bright sparkle center while the crystal is young
        ctx.fill_circle(
            particle.position,
            size * 0.3,
            Color::WHITE.with_alpha(alpha * 0.8),
        );
    }
}

/// Cooling ramp: white-hot through orange and red down to ember brown.
fn spark_color(life: f32) -> Color {
    if life <= 0.1 {
        Color::WHITE
    } else if life <= 0.45 {
        let t = (life - 0.1) / 0.35;
        Color::from_rgba8(255, 165, 50, 255).lerp(Color::from_rgba8(255, 50, 0, 255), t)
    } else if life <= 0.7 {
        let t = (life - 0.45) / 0.25;
        Color::from_rgba8(255, 50, 0, 255).lerp(Color::from_rgba8(120, 40, 20, 255), t)
    } else {
        let t = (life - 0.7) / 0.3;
        Color::from_rgba8(120, 40, 20, 255).lerp(Color::from_rgba8(10, 10, 10, 255), t)
    }
}

/// Icy white fading toward pale blue.
fn crystal_color(life: f32) -> Color {
    Color::from_rgba8(240, 250, 255, 255).lerp(Color::from_rgba8(160, 200, 255, 255), life)
}
