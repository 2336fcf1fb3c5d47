//! Parametric shape outlines
//!
//! Box, circle, and arrow modes bypass the curve engine: the outline is
//! generated directly from the drag anchor and the current cursor, dense
//! enough to take the same gradient/fade treatment as a freehand stroke.

use std::f32::consts::TAU;

use stria_core::ShapeMode;
use stria_paint::{Point, Rect};

/// Interpolated points per box edge and per arrow stroke
const POINTS_PER_EDGE: usize = 10;

/// Barb length cap as a multiple of the core thickness
const BARB_THICKNESS_FACTOR: f32 = 10.0;

/// Outline polylines for `mode`, anchored at the drag start. The arrow is
/// three polylines (shaft and two barbs); box and circle are one closed
/// loop each. Freehand and degenerate drags produce nothing.
pub fn outline(
    mode: ShapeMode,
    anchor: Point,
    cursor: Point,
    core_thickness: f32,
) -> Vec<Vec<Point>> {
    match mode {
        ShapeMode::Freehand => Vec::new(),
        ShapeMode::Box => vec![box_outline(anchor, cursor)],
        ShapeMode::Circle => vec![circle_outline(anchor, cursor)],
        ShapeMode::Arrow => arrow_outline(anchor, cursor, core_thickness),
    }
}

fn box_outline(anchor: Point, cursor: Point) -> Vec<Point> {
    let rect = Rect::from_points(anchor, cursor);
    let corners = rect.corners();
    let mut points = Vec::with_capacity(4 * POINTS_PER_EDGE + 1);
    for i in 0..4 {
        let from = corners[i];
        let to = corners[(i + 1) % 4];
        for j in 0..POINTS_PER_EDGE {
            points.push(from.lerp(to, j as f32 / POINTS_PER_EDGE as f32));
        }
    }
    // Close the loop
    points.push(corners[0]);
    points
}

fn circle_outline(center: Point, rim: Point) -> Vec<Point> {
    let radius = center.distance(rim);
    if radius <= 0.0 {
        return Vec::new();
    }
    // More points for larger circles
    let count = ((radius * 0.5) as usize).max(20);
    let mut points = Vec::with_capacity(count + 1);
    for i in 0..count {
        let angle = TAU * i as f32 / count as f32;
        points.push(Point::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        ));
    }
    points.push(points[0]);
    points
}

/// The arrow points from the drag position back to the anchor: tip at the
/// anchor, tail under the cursor, barbs at 45 degrees off the shaft.
fn arrow_outline(tip: Point, tail: Point, core_thickness: f32) -> Vec<Vec<Point>> {
    let shaft = tip - tail;
    let length = tail.distance(tip);
    if length <= 0.0 {
        return Vec::new();
    }
    let dir = shaft * (1.0 / length);
    let barb_length = (length / 2.0).min(core_thickness * BARB_THICKNESS_FACTOR);

    // Barb directions: the reversed shaft rotated +/- 45 degrees
    let back = dir * -1.0;
    let (sin, cos) = std::f32::consts::FRAC_PI_4.sin_cos();
    let barb1 = Point::new(back.x * cos + back.y * sin, -back.x * sin + back.y * cos);
    let barb2 = Point::new(back.x * cos - back.y * sin, back.x * sin + back.y * cos);

    let barb1_end = tip + barb1 * barb_length;
    let barb2_end = tip + barb2 * barb_length;

    vec![
        segment_points(tail, tip),
        segment_points(tip, barb1_end),
        segment_points(tip, barb2_end),
    ]
}

fn segment_points(from: Point, to: Point) -> Vec<Point> {
    (0..=POINTS_PER_EDGE)
        .map(|i| from.lerp(to, i as f32 / POINTS_PER_EDGE as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_outline_is_a_closed_loop() {
        let points = box_outline(Point::new(0.0, 0.0), Point::new(100.0, 50.0));
        assert_eq!(points.len(), 4 * POINTS_PER_EDGE + 1);
        assert_eq!(points.first(), points.last());
    }

    #[test]
    fn circle_points_lie_on_the_radius() {
        let center = Point::new(50.0, 50.0);
        let points = circle_outline(center, Point::new(90.0, 50.0));
        assert!(points.len() >= 20);
        for point in &points {
            assert!((center.distance(*point) - 40.0).abs() < 1e-3);
        }
        assert_eq!(points.first(), points.last());
    }

    #[test]
    fn arrow_has_shaft_and_two_barbs() {
        let strokes = arrow_outline(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 16.0);
        assert_eq!(strokes.len(), 3);
        // Shaft runs tail to tip
        assert_eq!(strokes[0].first().copied(), Some(Point::new(100.0, 0.0)));
        assert_eq!(strokes[0].last().copied(), Some(Point::new(0.0, 0.0)));
        // Both barbs start at the tip
        assert_eq!(strokes[1].first().copied(), Some(Point::new(0.0, 0.0)));
        assert_eq!(strokes[2].first().copied(), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn barb_length_is_capped_by_half_shaft_and_thickness() {
        // Short shaft: barbs capped at half its length
        let strokes = arrow_outline(Point::new(0.0, 0.0), Point::new(40.0, 0.0), 16.0);
        let barb_end = *strokes[1].last().unwrap();
        assert!((Point::new(0.0, 0.0).distance(barb_end) - 20.0).abs() < 1e-3);

        // Long shaft: barbs capped at 10x the core thickness
        let strokes = arrow_outline(Point::new(0.0, 0.0), Point::new(1000.0, 0.0), 4.0);
        let barb_end = *strokes[1].last().unwrap();
        assert!((Point::new(0.0, 0.0).distance(barb_end) - 40.0).abs() < 1e-3);
    }

    #[test]
    fn degenerate_drag_produces_no_arrow() {
        assert!(arrow_outline(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 16.0).is_empty());
    }

    #[test]
    fn freehand_mode_has_no_parametric_outline() {
        assert!(outline(
            ShapeMode::Freehand,
            Point::ZERO,
            Point::new(10.0, 10.0),
            16.0
        )
        .is_empty());
    }
}
