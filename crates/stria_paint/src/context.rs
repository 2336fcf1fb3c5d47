//! Paint context - command recording for the render surface
//!
//! The trail core records what a frame looks like as a list of
//! [`PaintCommand`]s; a presenter (GPU, headless, test) consumes them.
//! The core stays agnostic to how the frame is actually shown.

use crate::color::Color;
use crate::path::{Point, PolylineStroke};
use crate::primitives::Circle;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// A paint command for the presenter
#[derive(Clone, Debug)]
pub enum PaintCommand {
    FillCircle {
        circle: Circle,
        color: Color,
    },
    StrokeLine {
        from: Point,
        to: Point,
        width: f32,
        color: Color,
        cap: LineCap,
    },
    StrokePolyline {
        stroke: PolylineStroke,
    },
}

/// The paint context the render pass draws into
#[derive(Default)]
pub struct PaintContext {
    commands: Vec<PaintCommand>,
}

impl PaintContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded commands
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Take ownership of recorded commands
    pub fn take_commands(&mut self) -> Vec<PaintCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Drop all recorded commands, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.commands.push(PaintCommand::FillCircle {
            circle: Circle::new(center, radius),
            color,
        });
    }

    pub fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Color, cap: LineCap) {
        self.commands.push(PaintCommand::StrokeLine {
            from,
            to,
            width,
            color,
            cap,
        });
    }

    /// Record a continuous polyline stroke. Strokes with fewer than two
    /// vertices carry no geometry and are dropped here rather than pushed
    /// to the presenter.
    pub fn stroke_polyline(&mut self, stroke: PolylineStroke) {
        if stroke.vertices.len() < 2 {
            tracing::trace!(vertices = stroke.vertices.len(), "dropping degenerate stroke");
            return;
        }
        self.commands.push(PaintCommand::StrokePolyline { stroke });
    }
}
