//! Stria Paint API
//!
//! Renderer-agnostic 2D drawing types for the trail overlay.
//!
//! # Features
//!
//! - RGBA colors with hex parsing and HSV conversion
//! - Gradient stop sets and the rainbow hue ramp
//! - Polyline strokes with per-vertex color
//! - Shape primitives (rect, circle)
//! - Paint-command recording for presentation by any backend

pub mod color;
pub mod context;
pub mod gradient;
pub mod path;
pub mod primitives;

pub use color::Color;
pub use context::{LineCap, PaintCommand, PaintContext};
pub use gradient::{GradientStop, TrailGradient};
pub use path::{Point, PolylineStroke, StrokeVertex};
pub use primitives::*;
