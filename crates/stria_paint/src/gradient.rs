//! Trail gradients
//!
//! Maps a color phase in [0,1] onto either an ordered set of 1-3 stops or
//! the continuous rainbow hue ramp.

use smallvec::SmallVec;

use crate::color::Color;

/// A gradient stop
#[derive(Clone, Copy, Debug)]
pub struct GradientStop {
    pub offset: f32, // 0.0 to 1.0
    pub color: Color,
}

/// Phase-to-color mapping for a single stroke render.
///
/// Immutable once built; the compositor rebuilds it from the settings
/// snapshot each frame.
#[derive(Clone, Debug)]
pub enum TrailGradient {
    Stops(SmallVec<[GradientStop; 3]>),
    Rainbow,
}

impl TrailGradient {
    /// Build from the enabled subset of the configured colors, evenly
    /// spaced across [0,1]. An empty set degrades to solid white rather
    /// than failing.
    pub fn from_colors(colors: &[Color]) -> Self {
        let mut stops: SmallVec<[GradientStop; 3]> = SmallVec::new();
        match colors.len() {
            0 => stops.push(GradientStop {
                offset: 0.0,
                color: Color::WHITE,
            }),
            1 => stops.push(GradientStop {
                offset: 0.0,
                color: colors[0],
            }),
            n => {
                for (i, &color) in colors.iter().enumerate() {
                    stops.push(GradientStop {
                        offset: i as f32 / (n - 1) as f32,
                        color,
                    });
                }
            }
        }
        TrailGradient::Stops(stops)
    }

    /// Sample the gradient at `phase`, clamped to [0,1].
    pub fn color_at(&self, phase: f32) -> Color {
        let phase = phase.clamp(0.0, 1.0);
        match self {
            TrailGradient::Rainbow => Color::from_hsv(phase * 360.0, 1.0, 1.0),
            TrailGradient::Stops(stops) => match stops.len() {
                0 => Color::WHITE,
                1 => stops[0].color,
                _ => {
                    let last = stops.len() - 1;
                    if phase <= stops[0].offset {
                        return stops[0].color;
                    }
                    if phase >= stops[last].offset {
                        return stops[last].color;
                    }
                    // Find the bracketing pair and interpolate within it
                    let mut upper = 1;
                    while upper < last && stops[upper].offset < phase {
                        upper += 1;
                    }
                    let lo = stops[upper - 1];
                    let hi = stops[upper];
                    let span = hi.offset - lo.offset;
                    if span <= f32::EPSILON {
                        return hi.color;
                    }
                    let t = (phase - lo.offset) / span;
                    lo.color.lerp(hi.color, t)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_first_and_last_stop() {
        let purple = Color::from_rgba8(170, 0, 255, 255);
        let orange = Color::from_rgba8(255, 140, 0, 255);
        let yellow = Color::from_rgba8(255, 255, 0, 255);
        let gradient = TrailGradient::from_colors(&[purple, orange, yellow]);

        assert_eq!(gradient.color_at(0.0), purple);
        assert_eq!(gradient.color_at(1.0), yellow);
        assert_eq!(gradient.color_at(0.5), orange);
    }

    #[test]
    fn single_stop_is_constant() {
        let cyan = Color::from_rgba8(0, 255, 255, 255);
        let gradient = TrailGradient::from_colors(&[cyan]);
        for phase in [0.0, 0.25, 0.5, 0.99, 1.0] {
            assert_eq!(gradient.color_at(phase), cyan);
        }
    }

    #[test]
    fn two_stops_interpolate_midway() {
        let from = Color::rgb(1.0, 0.0, 0.0);
        let to = Color::rgb(0.0, 0.0, 1.0);
        let gradient = TrailGradient::from_colors(&[from, to]);
        let mid = gradient.color_at(0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert!((mid.b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn phase_is_clamped() {
        let gradient = TrailGradient::from_colors(&[Color::BLACK, Color::WHITE]);
        assert_eq!(gradient.color_at(-2.0), gradient.color_at(0.0));
        assert_eq!(gradient.color_at(7.5), gradient.color_at(1.0));
    }

    #[test]
    fn rainbow_sweeps_hue() {
        let gradient = TrailGradient::Rainbow;
        assert_eq!(gradient.color_at(0.0).to_rgba8(), [255, 0, 0, 255]);
        // One third of the way around the wheel is green
        assert_eq!(gradient.color_at(1.0 / 3.0).to_rgba8(), [0, 255, 0, 255]);
    }

    #[test]
    fn empty_set_falls_back_to_white() {
        let gradient = TrailGradient::from_colors(&[]);
        assert_eq!(gradient.color_at(0.5), Color::WHITE);
    }
}
