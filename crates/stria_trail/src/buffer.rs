//! Point buffer and aging model
//!
//! An ordered sequence of timestamped trail points: append-only at the
//! tail, trimmed from the head as points expire. Insertion order defines
//! the curve shape, so it is preserved exactly.

use stria_core::TrailConfig;
use stria_paint::Point;

/// How a stroke's points are turned into drawable geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeKind {
    /// Freehand points, smoothed through the curve engine
    Curved,
    /// Parametric shape outline points, drawn as-is
    Straight,
}

/// One retained cursor sample
#[derive(Clone, Copy, Debug)]
pub struct TrailPoint {
    /// Raw sampled position
    pub raw: Point,
    /// EMA-smoothed position; this is what gets drawn
    pub smoothed: Point,
    /// Seconds lived, advanced by `tick` unless aging is paused
    pub age: f32,
    pub stroke: u32,
    pub kind: StrokeKind,
}

impl TrailPoint {
    /// Nonlinear fade progress in [0,1]: 0 fully opaque, 1 expired.
    pub fn progress(&self, fade_duration: f32, fade_slowdown: f32) -> f32 {
        effective_progress(self.age, fade_duration, fade_slowdown)
    }
}

/// `(age / fade_duration) ^ (1 / fade_slowdown)`, clamped to [0,1].
///
/// Slowdown above 1.0 compresses the early fade and stretches the late
/// fade, so old strokes linger.
pub fn effective_progress(age: f32, fade_duration: f32, fade_slowdown: f32) -> f32 {
    if fade_duration <= 0.0 {
        return 1.0;
    }
    let linear = (age / fade_duration).max(0.0);
    linear.powf(1.0 / fade_slowdown.max(1.0)).clamp(0.0, 1.0)
}

/// What `append` did with a sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AppendOutcome {
    /// A new point was retained at the given smoothed position
    Added(Point),
    /// The sample was folded into the last point's smoothed position
    Coalesced,
    /// The sample was invalid and ignored
    Rejected,
}

/// The live trail
pub struct PointBuffer {
    points: Vec<TrailPoint>,
    paused: bool,
    stroke: u32,
    kind: StrokeKind,
}

impl PointBuffer {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            paused: false,
            stroke: 0,
            kind: StrokeKind::Curved,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze or resume aging without discarding anything.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Drop every retained point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Start a new stroke; subsequent appends belong to it. Older strokes
    /// keep fading independently.
    pub fn begin_stroke(&mut self, kind: StrokeKind) {
        self.stroke = self.stroke.wrapping_add(1);
        self.kind = kind;
    }

    /// Append a cursor sample to the current stroke.
    ///
    /// The sample is blended into the EMA chain
    /// (`alpha * raw + (1 - alpha) * previous_smoothed`); if the result
    /// lands closer than the minimum spacing to the last retained point it
    /// only updates that point's smoothed position. Non-finite coordinates
    /// are rejected outright.
    pub fn append(&mut self, raw: Point, config: &TrailConfig) -> AppendOutcome {
        if !raw.is_finite() {
            tracing::warn!(?raw, "rejecting non-finite cursor sample");
            return AppendOutcome::Rejected;
        }

        let last_in_stroke = self
            .points
            .last()
            .filter(|point| point.stroke == self.stroke)
            .copied();

        let smoothed = match last_in_stroke {
            Some(last) => last.smoothed.lerp(raw, config.ema_alpha),
            None => raw,
        };

        if let Some(last) = last_in_stroke {
            let spacing_sq = config.min_spacing * config.min_spacing;
            if smoothed.distance_squared(last.smoothed) < spacing_sq {
                if let Some(point) = self.points.last_mut() {
                    point.smoothed = smoothed;
                }
                return AppendOutcome::Coalesced;
            }
        }

        self.points.push(TrailPoint {
            raw,
            smoothed,
            age: 0.0,
            stroke: self.stroke,
            kind: self.kind,
        });
        self.enforce_cap(config.max_points);
        AppendOutcome::Added(smoothed)
    }

    /// Commit a shape outline as one straight stroke of its own.
    pub fn commit_polyline(&mut self, outline: &[Point], config: &TrailConfig) {
        self.begin_stroke(StrokeKind::Straight);
        for &position in outline {
            if !position.is_finite() {
                continue;
            }
            self.points.push(TrailPoint {
                raw: position,
                smoothed: position,
                age: 0.0,
                stroke: self.stroke,
                kind: StrokeKind::Straight,
            });
        }
        self.enforce_cap(config.max_points);
    }

    /// Advance every point's age by `dt` and evict expired points from the
    /// head. A paused buffer ignores the tick; a negative `dt` is rejected
    /// since time must be monotonic.
    pub fn tick(&mut self, dt: f32, config: &TrailConfig) {
        if dt < 0.0 {
            tracing::warn!(dt, "rejecting negative tick interval");
            return;
        }
        if self.paused {
            return;
        }
        for point in &mut self.points {
            point.age += dt;
        }
        // Ages decrease monotonically from head to tail, so expiry only
        // ever trims a prefix.
        let expired = self
            .points
            .iter()
            .take_while(|point| point.age >= config.fade_duration)
            .count();
        if expired > 0 {
            self.points.drain(..expired);
        }
    }

    /// Iterate over consecutive runs of points sharing a stroke id.
    pub fn strokes(&self) -> StrokeSlices<'_> {
        StrokeSlices { rest: &self.points }
    }

    fn enforce_cap(&mut self, max_points: usize) {
        let len = self.points.len();
        if len > max_points {
            self.points.drain(..len - max_points);
        }
    }
}

impl Default for PointBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over per-stroke slices of the buffer
pub struct StrokeSlices<'a> {
    rest: &'a [TrailPoint],
}

impl<'a> Iterator for StrokeSlices<'a> {
    type Item = &'a [TrailPoint];

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.first()?;
        let len = self
            .rest
            .iter()
            .take_while(|point| point.stroke == first.stroke)
            .count();
        let (run, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TrailConfig {
        TrailConfig {
            min_spacing: 5.0,
            ema_alpha: 1.0,
            fade_duration: 2.0,
            fade_slowdown: 1.0,
            ..TrailConfig::default()
        }
    }

    #[test]
    fn close_samples_coalesce_into_the_last_point() {
        let mut buffer = PointBuffer::new();
        let cfg = config();
        buffer.begin_stroke(StrokeKind::Curved);

        buffer.append(Point::new(0.0, 0.0), &cfg);
        buffer.append(Point::new(3.0, 0.0), &cfg);
        buffer.append(Point::new(10.0, 0.0), &cfg);

        // (3,0) is within spacing of (0,0): with alpha = 1 it replaces the
        // smoothed position instead of adding a point.
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.points()[0].smoothed, Point::new(3.0, 0.0));
        assert_eq!(buffer.points()[1].smoothed, Point::new(10.0, 0.0));
    }

    #[test]
    fn coalescing_shifts_smoothed_by_exactly_alpha() {
        let mut buffer = PointBuffer::new();
        let cfg = TrailConfig {
            ema_alpha: 0.25,
            min_spacing: 10.0,
            ..TrailConfig::default()
        };
        buffer.begin_stroke(StrokeKind::Curved);

        buffer.append(Point::new(0.0, 0.0), &cfg);
        let outcome = buffer.append(Point::new(4.0, 0.0), &cfg);

        assert_eq!(outcome, AppendOutcome::Coalesced);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.points()[0].smoothed, Point::new(1.0, 0.0));
    }

    #[test]
    fn tick_advances_every_age_by_dt() {
        let mut buffer = PointBuffer::new();
        let cfg = config();
        buffer.begin_stroke(StrokeKind::Curved);
        buffer.append(Point::new(0.0, 0.0), &cfg);
        buffer.append(Point::new(20.0, 0.0), &cfg);

        buffer.tick(0.5, &cfg);
        assert!(buffer.points().iter().all(|p| p.age == 0.5));

        buffer.tick(0.25, &cfg);
        assert!(buffer.points().iter().all(|p| p.age == 0.75));
    }

    #[test]
    fn paused_buffer_does_not_age() {
        let mut buffer = PointBuffer::new();
        let cfg = config();
        buffer.begin_stroke(StrokeKind::Curved);
        buffer.append(Point::new(0.0, 0.0), &cfg);
        buffer.tick(0.5, &cfg);

        buffer.set_paused(true);
        buffer.tick(5.0, &cfg);
        assert_eq!(buffer.points()[0].age, 0.5);

        buffer.set_paused(false);
        buffer.tick(0.1, &cfg);
        assert!((buffer.points()[0].age - 0.6).abs() < 1e-6);
    }

    #[test]
    fn point_older_than_fade_duration_is_evicted() {
        let mut buffer = PointBuffer::new();
        let cfg = config();
        buffer.begin_stroke(StrokeKind::Curved);
        buffer.append(Point::new(0.0, 0.0), &cfg);

        buffer.tick(2.1, &cfg);
        assert!(buffer.is_empty());
    }

    #[test]
    fn negative_dt_is_rejected() {
        let mut buffer = PointBuffer::new();
        let cfg = config();
        buffer.begin_stroke(StrokeKind::Curved);
        buffer.append(Point::new(0.0, 0.0), &cfg);
        buffer.tick(1.0, &cfg);

        buffer.tick(-0.5, &cfg);
        assert_eq!(buffer.points()[0].age, 1.0);
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let mut buffer = PointBuffer::new();
        let cfg = config();
        buffer.begin_stroke(StrokeKind::Curved);

        assert_eq!(
            buffer.append(Point::new(f32::NAN, 0.0), &cfg),
            AppendOutcome::Rejected
        );
        assert_eq!(
            buffer.append(Point::new(0.0, f32::INFINITY), &cfg),
            AppendOutcome::Rejected
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn hard_cap_evicts_oldest_first() {
        let mut buffer = PointBuffer::new();
        let cfg = TrailConfig {
            min_spacing: 0.0,
            ema_alpha: 1.0,
            max_points: 16,
            ..TrailConfig::default()
        };
        buffer.begin_stroke(StrokeKind::Curved);
        for i in 0..40 {
            buffer.append(Point::new(i as f32 * 10.0, 0.0), &cfg);
        }
        assert_eq!(buffer.len(), 16);
        assert_eq!(buffer.points()[0].raw.x, 240.0);
    }

    #[test]
    fn strokes_group_consecutive_runs() {
        let mut buffer = PointBuffer::new();
        let cfg = config();
        buffer.begin_stroke(StrokeKind::Curved);
        buffer.append(Point::new(0.0, 0.0), &cfg);
        buffer.append(Point::new(20.0, 0.0), &cfg);
        buffer.begin_stroke(StrokeKind::Curved);
        buffer.append(Point::new(100.0, 0.0), &cfg);

        let strokes: Vec<_> = buffer.strokes().collect();
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].len(), 2);
        assert_eq!(strokes[1].len(), 1);
    }

    #[test]
    fn effective_progress_reparametrizes_age() {
        // Linear at slowdown 1.0
        assert_eq!(effective_progress(1.0, 2.0, 1.0), 0.5);
        assert_eq!(effective_progress(2.0, 2.0, 1.0), 1.0);
        assert_eq!(effective_progress(3.0, 2.0, 1.0), 1.0);
        // Slowdown 2.0 compresses the early fade: sqrt(0.25) = 0.5
        assert_eq!(effective_progress(0.5, 2.0, 2.0), 0.5);
    }

    #[test]
    fn commit_polyline_is_its_own_straight_stroke() {
        let mut buffer = PointBuffer::new();
        let cfg = config();
        buffer.begin_stroke(StrokeKind::Curved);
        buffer.append(Point::new(0.0, 0.0), &cfg);

        buffer.commit_polyline(&[Point::new(5.0, 5.0), Point::new(15.0, 5.0)], &cfg);

        let strokes: Vec<_> = buffer.strokes().collect();
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[1][0].kind, StrokeKind::Straight);
        assert_eq!(strokes[1].len(), 2);
    }
}
