//! Stria Trail Core
//!
//! The rendering pipeline behind the cursor trail:
//!
//! - **Point Buffer**: timestamped samples with EMA smoothing,
//!   minimum-spacing coalescing, and per-frame aging/expiry
//! - **Curve Engine**: centripetal Catmull-Rom sampling through the
//!   retained points
//! - **Stroke Compositor**: dual glow/core passes with gradient color and
//!   alpha-from-age
//! - **Particle Subsystem**: sparks and ice crystals spawned along the
//!   stroke
//! - **Frame Scheduler**: the fixed-interval tick that samples input, ages
//!   the buffer, and records the frame
//!
//! Everything runs on one thread: a tick mutates, the render pass that
//! follows it only reads, so the pipeline needs no locking.

pub mod buffer;
pub mod compositor;
pub mod curve;
pub mod particle;
pub mod scheduler;
pub mod shape;

pub use buffer::{AppendOutcome, PointBuffer, StrokeKind, TrailPoint};
pub use curve::CurveVertex;
pub use particle::{Particle, ParticleKind, ParticleSystem};
pub use scheduler::{FrameScheduler, Phase};
