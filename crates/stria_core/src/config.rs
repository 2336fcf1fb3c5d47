//! Trail configuration (stria.toml)
//!
//! The settings snapshot read by the frame scheduler at the start of each
//! tick. Values outside their documented bounds are clamped to the nearest
//! valid bound, never rejected; a missing settings file yields defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use stria_paint::Color;

use crate::error::ConfigError;

/// Drawing mode for the trail
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeMode {
    #[default]
    Freehand,
    Box,
    Circle,
    Arrow,
}

/// Which physical key a binding refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyChoice {
    Control,
    Shift,
    Alt,
    Super,
    Capslock,
}

/// One configured gradient stop
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ColorStopConfig {
    #[serde(with = "hex_color")]
    pub color: Color,
    pub enabled: bool,
}

impl ColorStopConfig {
    pub const fn new(color: Color, enabled: bool) -> Self {
        Self { color, enabled }
    }
}

/// The full settings snapshot
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Key held to draw
    pub trigger_key: KeyChoice,
    /// Key held to freeze aging
    pub pause_key: KeyChoice,
    /// Lock key that freezes aging while toggled on
    pub toggle_key: KeyChoice,

    /// Core stroke thickness in pixels (1-100)
    pub core_thickness: f32,
    /// Glow width as a percentage of the core thickness (0-200)
    pub glow_percent: f32,
    pub glow_enabled: bool,
    /// Number of layered glow strokes for the falloff (2-25)
    pub gradient_layers: u32,

    /// Seconds from fully opaque to fully transparent (0.1-20)
    pub fade_duration: f32,
    /// Fade reparametrization exponent: 1.0 is linear, higher values
    /// compress early fade and stretch late fade (1.0-3.0)
    pub fade_slowdown: f32,

    /// EMA smoothing weight for incoming cursor samples (0.0-1.0)
    pub ema_alpha: f32,
    /// Minimum spacing between retained points in pixels (0-20)
    pub min_spacing: f32,
    /// Catmull-Rom tangent scale (0.2-2.0)
    pub tension: f32,
    /// Curve evaluations per control-point span (2-32)
    pub substeps: u32,

    /// Ordered gradient stops; disabled stops are skipped
    pub stops: [ColorStopConfig; 3],
    /// Ignore the stops and sweep the hue wheel instead
    pub rainbow: bool,

    pub particles_enabled: bool,
    /// Spark bursts per second while drawing (1-60)
    pub explosion_frequency: f32,
    /// Spark count multiplier (0.1-5.0)
    pub particle_intensity: f32,
    /// Ice-crystal trail along the stroke
    pub crystals_enabled: bool,

    pub shape_mode: ShapeMode,
    /// Whether freehand points may still be appended while aging is frozen
    pub append_while_frozen: bool,

    /// Hard cap on retained trail points (16-16384)
    pub max_points: usize,
    /// Hard cap on live particles (16-8192)
    pub max_particles: usize,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            trigger_key: KeyChoice::Control,
            pause_key: KeyChoice::Shift,
            toggle_key: KeyChoice::Capslock,
            core_thickness: 16.0,
            glow_percent: 0.0,
            glow_enabled: true,
            gradient_layers: 6,
            fade_duration: 1.5,
            fade_slowdown: 2.5,
            ema_alpha: 0.35,
            min_spacing: 3.5,
            tension: 1.0,
            substeps: 12,
            stops: [
                ColorStopConfig::new(Color::from_rgba8(170, 0, 255, 255), true),
                ColorStopConfig::new(Color::from_rgba8(255, 140, 0, 255), true),
                ColorStopConfig::new(Color::from_rgba8(255, 255, 0, 255), true),
            ],
            rainbow: false,
            particles_enabled: true,
            explosion_frequency: 15.0,
            particle_intensity: 1.0,
            crystals_enabled: true,
            shape_mode: ShapeMode::Freehand,
            append_while_frozen: true,
            max_points: 4096,
            max_particles: 2048,
        }
    }
}

impl TrailConfig {
    /// Snap every field into its documented range.
    pub fn clamp(&mut self) {
        self.core_thickness = self.core_thickness.clamp(1.0, 100.0);
        self.glow_percent = self.glow_percent.clamp(0.0, 200.0);
        self.gradient_layers = self.gradient_layers.clamp(2, 25);
        self.fade_duration = self.fade_duration.clamp(0.1, 20.0);
        self.fade_slowdown = self.fade_slowdown.clamp(1.0, 3.0);
        self.ema_alpha = self.ema_alpha.clamp(0.0, 1.0);
        self.min_spacing = self.min_spacing.clamp(0.0, 20.0);
        self.tension = self.tension.clamp(0.2, 2.0);
        self.substeps = self.substeps.clamp(2, 32);
        self.explosion_frequency = self.explosion_frequency.clamp(1.0, 60.0);
        self.particle_intensity = self.particle_intensity.clamp(0.1, 5.0);
        self.max_points = self.max_points.clamp(16, 16384);
        self.max_particles = self.max_particles.clamp(16, 8192);
    }

    /// Full glow stroke width in pixels
    pub fn glow_width(&self) -> f32 {
        self.core_thickness + self.core_thickness * self.glow_percent / 100.0
    }

    /// The enabled stop colors, in configured order
    pub fn enabled_colors(&self) -> Vec<Color> {
        self.stops
            .iter()
            .filter(|stop| stop.enabled)
            .map(|stop| stop.color)
            .collect()
    }

    /// Parse and clamp a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let mut config: TrailConfig = toml::from_str(text)?;
        config.clamp();
        Ok(config)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Persist to `path` as TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

mod hex_color {
    use serde::{Deserialize, Deserializer, Serializer};
    use stria_paint::Color;

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_hex_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::parse_hex(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color {text:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_already_in_range() {
        let mut config = TrailConfig::default();
        let before = format!("{config:?}");
        config.clamp();
        assert_eq!(before, format!("{config:?}"));
    }

    #[test]
    fn clamp_snaps_out_of_range_values() {
        let mut config = TrailConfig {
            fade_duration: 500.0,
            fade_slowdown: 0.0,
            ema_alpha: -2.0,
            explosion_frequency: 1000.0,
            core_thickness: 0.25,
            ..TrailConfig::default()
        };
        config.clamp();
        assert_eq!(config.fade_duration, 20.0);
        assert_eq!(config.fade_slowdown, 1.0);
        assert_eq!(config.ema_alpha, 0.0);
        assert_eq!(config.explosion_frequency, 60.0);
        assert_eq!(config.core_thickness, 1.0);
    }

    #[test]
    fn toml_round_trip_preserves_colors() {
        let config = TrailConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = TrailConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.stops[0].color.to_hex_string(), "#AA00FF");
        assert_eq!(parsed.stops[2].color.to_hex_string(), "#FFFF00");
        assert_eq!(parsed.shape_mode, ShapeMode::Freehand);
    }

    #[test]
    fn out_of_range_file_values_are_clamped_on_load() {
        let parsed = TrailConfig::from_toml("fade_duration = 99.0\ntension = 0.0\n").unwrap();
        assert_eq!(parsed.fade_duration, 20.0);
        assert_eq!(parsed.tension, 0.2);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed = TrailConfig::from_toml("rainbow = true\n").unwrap();
        assert!(parsed.rainbow);
        assert_eq!(parsed.fade_duration, 1.5);
    }

    #[test]
    fn glow_width_scales_with_percent() {
        let mut config = TrailConfig::default();
        config.core_thickness = 10.0;
        config.glow_percent = 50.0;
        assert_eq!(config.glow_width(), 15.0);
    }

    #[test]
    fn enabled_colors_skips_disabled_stops() {
        let mut config = TrailConfig::default();
        config.stops[1].enabled = false;
        let colors = config.enabled_colors();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0].to_hex_string(), "#AA00FF");
        assert_eq!(colors[1].to_hex_string(), "#FFFF00");
    }
}
