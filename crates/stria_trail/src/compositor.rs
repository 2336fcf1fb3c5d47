//! Stroke compositor
//!
//! Builds the drawable frame from the smoothed trail: an outer glow pass
//! (wider, faint, layered falloff) under an inner core pass at full
//! strength, with rounded end caps. Every pass over a stroke is a single
//! continuous polyline; stroking segments independently double-blends
//! where they overlap and beads at sharp turns.

use stria_core::{ShapeMode, TrailConfig};
use stria_paint::{Color, LineCap, PaintContext, Point, PolylineStroke, TrailGradient};

use crate::buffer::{PointBuffer, StrokeKind, TrailPoint};
use crate::curve::{sample_spline, CurveVertex};
use crate::shape;

/// Glow layer alpha falls from this at the innermost layer...
const GLOW_ALPHA_INNER: f32 = 80.0 / 255.0;
/// ...to this at the outermost.
const GLOW_ALPHA_OUTER: f32 = 10.0 / 255.0;

/// End caps are drawn slightly smaller than the stroke so they do not
/// visually overshoot the path.
const CAP_SCALE: f32 = 0.95;

/// The gradient for this frame's settings snapshot.
pub fn gradient_for(config: &TrailConfig) -> TrailGradient {
    if config.rainbow {
        TrailGradient::Rainbow
    } else {
        TrailGradient::from_colors(&config.enabled_colors())
    }
}

/// Render every retained stroke.
pub fn render_trail(
    ctx: &mut PaintContext,
    buffer: &PointBuffer,
    gradient: &TrailGradient,
    config: &TrailConfig,
) {
    for stroke in buffer.strokes() {
        render_stroke(ctx, stroke, gradient, config);
    }
}

/// Render the in-progress shape drag at full opacity.
pub fn render_shape_preview(
    ctx: &mut PaintContext,
    mode: ShapeMode,
    anchor: Point,
    cursor: Point,
    gradient: &TrailGradient,
    config: &TrailConfig,
) {
    for polyline in shape::outline(mode, anchor, cursor, config.core_thickness) {
        let vertices: Vec<CurveVertex> = polyline
            .into_iter()
            .map(|position| CurveVertex::new(position, 0.0))
            .collect();
        render_vertices(ctx, &vertices, gradient, config);
    }
}

fn render_stroke(
    ctx: &mut PaintContext,
    points: &[TrailPoint],
    gradient: &TrailGradient,
    config: &TrailConfig,
) {
    let Some(first) = points.first() else {
        return;
    };
    let control: Vec<CurveVertex> = points
        .iter()
        .map(|point| {
            CurveVertex::new(
                point.smoothed,
                point.progress(config.fade_duration, config.fade_slowdown),
            )
        })
        .collect();

    // Shape outlines are already dense polylines; only freehand strokes go
    // through the curve engine.
    let vertices = match first.kind {
        StrokeKind::Curved => sample_spline(&control, config.substeps, config.tension),
        StrokeKind::Straight => control,
    };
    render_vertices(ctx, &vertices, gradient, config);
}

fn render_vertices(
    ctx: &mut PaintContext,
    vertices: &[CurveVertex],
    gradient: &TrailGradient,
    config: &TrailConfig,
) {
    match vertices {
        [] => {}
        [dot] => {
            // A single retained point draws as a capped dot, no curve math.
            let color = faded_color(gradient, dot.phase, 1.0);
            if color.a > 0.0 {
                ctx.fill_circle(
                    dot.position,
                    config.core_thickness / 2.0 * CAP_SCALE,
                    color,
                );
            }
        }
        _ => {
            if config.glow_enabled && config.glow_percent > 0.0 {
                render_glow(ctx, vertices, gradient, config);
            }
            render_pass(ctx, vertices, gradient, config.core_thickness, 1.0);
            render_caps(ctx, vertices, gradient, config);
        }
    }
}

/// Layered glow falloff: widths step from just outside the core out to the
/// full glow width, fainter the wider they get.
fn render_glow(
    ctx: &mut PaintContext,
    vertices: &[CurveVertex],
    gradient: &TrailGradient,
    config: &TrailConfig,
) {
    let layers = config.gradient_layers.max(1);
    let inner_width = config.core_thickness + 1.0;
    let glow_width = config.glow_width().max(inner_width);
    for layer in 0..layers {
        let layer_ratio = (layers - layer) as f32 / layers as f32;
        let width = inner_width + (glow_width - inner_width) * layer_ratio;
        let alpha = GLOW_ALPHA_INNER - (GLOW_ALPHA_INNER - GLOW_ALPHA_OUTER) * layer_ratio;
        render_pass(ctx, vertices, gradient, width, alpha);
    }
}

/// One continuous pass over the whole stroke at the given width, scaling
/// every vertex alpha by `alpha_factor`.
fn render_pass(
    ctx: &mut PaintContext,
    vertices: &[CurveVertex],
    gradient: &TrailGradient,
    width: f32,
    alpha_factor: f32,
) {
    let mut stroke = PolylineStroke::new(width, LineCap::Butt);
    for vertex in vertices {
        stroke.push(vertex.position, faded_color(gradient, vertex.phase, alpha_factor));
    }
    ctx.stroke_polyline(stroke);
}

/// Rounded, core-only caps at both extremities.
fn render_caps(
    ctx: &mut PaintContext,
    vertices: &[CurveVertex],
    gradient: &TrailGradient,
    config: &TrailConfig,
) {
    let radius = config.core_thickness / 2.0 * CAP_SCALE;
    for end in [vertices.first(), vertices.last()].into_iter().flatten() {
        let color = faded_color(gradient, end.phase, 1.0);
        if color.a > 0.0 {
            ctx.fill_circle(end.position, radius, color);
        }
    }
}

/// Gradient color at `phase` with alpha `1 - phase`: fully opaque at the
/// newest point, transparent at full fade.
fn faded_color(gradient: &TrailGradient, phase: f32, alpha_factor: f32) -> Color {
    let phase = phase.clamp(0.0, 1.0);
    gradient
        .color_at(phase)
        .with_alpha((1.0 - phase) * alpha_factor)
}
