//! Curve engine
//!
//! Turns the buffer's retained points into a smooth open polyline using
//! centripetal Catmull-Rom interpolation. Centripetal parametrization
//! (knot exponent 0.5) behaves well on the uneven gaps the
//! minimum-spacing coalescing produces; uniform parametrization would
//! overshoot there.

use stria_paint::Point;

/// A sampled curve position with its interpolated color phase
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveVertex {
    pub position: Point,
    pub phase: f32,
}

impl CurveVertex {
    pub const fn new(position: Point, phase: f32) -> Self {
        Self { position, phase }
    }
}

/// Coincident control points make the knot spacing collapse; merge them
/// before evaluation.
const COINCIDENT_SQ: f32 = 1e-6;

/// Floor for knot gaps, keeping tangent math away from divide-by-zero.
const MIN_KNOT_GAP: f32 = 1e-4;

/// Sample a centripetal Catmull-Rom spline through `control`.
///
/// The result interpolates every control point exactly: output index
/// `i * substeps` is control point `i`. Endpoints use virtual neighbors
/// synthesized by linear extrapolation. Fewer than four distinct points
/// degrade gracefully: nothing, a single dot, or the straight polyline.
pub fn sample_spline(control: &[CurveVertex], substeps: u32, tension: f32) -> Vec<CurveVertex> {
    let control = merge_coincident(control);
    let substeps = substeps.max(1);

    match control.len() {
        0 => Vec::new(),
        1 => control,
        2 | 3 => control,
        n => {
            let mut out = Vec::with_capacity((n - 1) * substeps as usize + 1);
            for i in 0..n - 1 {
                let p1 = control[i];
                let p2 = control[i + 1];
                let p0 = if i > 0 {
                    control[i - 1]
                } else {
                    extrapolate(p1, p2)
                };
                let p3 = if i + 2 < n {
                    control[i + 2]
                } else {
                    extrapolate(p2, p1)
                };
                for j in 0..substeps {
                    let t = j as f32 / substeps as f32;
                    out.push(eval_span(p0, p1, p2, p3, t, tension));
                }
            }
            out.push(control[n - 1]);
            out
        }
    }
}

fn merge_coincident(control: &[CurveVertex]) -> Vec<CurveVertex> {
    let mut merged: Vec<CurveVertex> = Vec::with_capacity(control.len());
    for &vertex in control {
        match merged.last() {
            Some(last)
                if last.position.distance_squared(vertex.position) < COINCIDENT_SQ =>
            {
                continue;
            }
            _ => merged.push(vertex),
        }
    }
    merged
}

/// Virtual endpoint mirrored across `from`, away from `toward`.
fn extrapolate(from: CurveVertex, toward: CurveVertex) -> CurveVertex {
    CurveVertex::new(from.position * 2.0 - toward.position, from.phase)
}

/// Evaluate one span at parameter `t` in [0,1).
///
/// Tangents come from the centripetal knot sequence
/// (`t_{i+1} = t_i + |p_{i+1} - p_i|^(1/2)`), rescaled to the [0,1] span
/// and multiplied by the configured tension. Position is the cubic
/// Hermite of the span endpoints and those tangents, which is exact at
/// t = 0 and t = 1.
fn eval_span(
    p0: CurveVertex,
    p1: CurveVertex,
    p2: CurveVertex,
    p3: CurveVertex,
    t: f32,
    tension: f32,
) -> CurveVertex {
    let (a0, a1, a2, a3) = (p0.position, p1.position, p2.position, p3.position);
    let t01 = a0.distance(a1).sqrt().max(MIN_KNOT_GAP);
    let t12 = a1.distance(a2).sqrt().max(MIN_KNOT_GAP);
    let t23 = a2.distance(a3).sqrt().max(MIN_KNOT_GAP);

    let m1 = (a2 - a1 + ((a1 - a0) * (1.0 / t01) - (a2 - a0) * (1.0 / (t01 + t12))) * t12)
        * tension;
    let m2 = (a2 - a1 + ((a3 - a2) * (1.0 / t23) - (a3 - a1) * (1.0 / (t12 + t23))) * t12)
        * tension;

    let t2 = t * t;
    let t3 = t2 * t;
    let h_a = (a1 - a2) * 2.0 + m1 + m2;
    let h_b = (a2 - a1) * 3.0 - m1 * 2.0 - m2;
    let position = h_a * t3 + h_b * t2 + m1 * t + a1;

    CurveVertex::new(position, p1.phase + (p2.phase - p1.phase) * t)
}
