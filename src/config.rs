//! Editor tunables.
//!
//! Every field has a default matching [`crate::consts`]. Native hosts can
//! override them through `SKETCHPAD_*` environment variables; browser hosts
//! pass a JSON object to [`EditorConfig::from_json`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::{
    BRUSH_STRENGTH, ERASER_RADIUS, HANDLE_RADIUS_PX, HISTORY_CAPACITY, MIN_DIMENSION,
    MIN_SHAPE_SIZE, PASTE_OFFSET, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP,
};
use crate::element::TextProps;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum undo entries; older entries are evicted first.
    pub history_capacity: usize,
    /// Floor for shape width/height during create and resize.
    pub min_shape_size: f64,
    /// Per-paste offset in world units.
    pub paste_offset: f64,
    /// Zoom multiplier change per step.
    pub zoom_step: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Resize handle hit slop in screen pixels.
    pub handle_radius_px: f64,
    /// Brush line width in world units.
    pub brush_strength: f64,
    /// Eraser radius in world units.
    pub eraser_radius: f64,
    /// Text properties given to text elements placed with the text tool.
    pub default_text: TextProps,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            min_shape_size: MIN_SHAPE_SIZE,
            paste_offset: PASTE_OFFSET,
            zoom_step: ZOOM_STEP,
            zoom_min: ZOOM_MIN,
            zoom_max: ZOOM_MAX,
            handle_radius_px: HANDLE_RADIUS_PX,
            brush_strength: BRUSH_STRENGTH,
            eraser_radius: ERASER_RADIUS,
            default_text: TextProps::default(),
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `SKETCHPAD_HISTORY_CAPACITY`: default 20
    /// - `SKETCHPAD_MIN_SHAPE_SIZE`: default 18
    /// - `SKETCHPAD_PASTE_OFFSET`: default 10
    /// - `SKETCHPAD_ZOOM_STEP`: default 0.1
    /// - `SKETCHPAD_ZOOM_MIN`: default 0.1
    /// - `SKETCHPAD_ZOOM_MAX`: default 3.0
    /// - `SKETCHPAD_BRUSH_STRENGTH`: default 4
    /// - `SKETCHPAD_ERASER_RADIUS`: default 12
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            history_capacity: env_parse("SKETCHPAD_HISTORY_CAPACITY", defaults.history_capacity),
            min_shape_size: env_parse("SKETCHPAD_MIN_SHAPE_SIZE", defaults.min_shape_size),
            paste_offset: env_parse("SKETCHPAD_PASTE_OFFSET", defaults.paste_offset),
            zoom_step: env_parse("SKETCHPAD_ZOOM_STEP", defaults.zoom_step),
            zoom_min: env_parse("SKETCHPAD_ZOOM_MIN", defaults.zoom_min),
            zoom_max: env_parse("SKETCHPAD_ZOOM_MAX", defaults.zoom_max),
            brush_strength: env_parse("SKETCHPAD_BRUSH_STRENGTH", defaults.brush_strength),
            eraser_radius: env_parse("SKETCHPAD_ERASER_RADIUS", defaults.eraser_radius),
            ..defaults
        };
        config.sanitized()
    }

    /// Parse a host-supplied JSON object. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when `raw` is not a JSON object of the
    /// expected shape.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(raw)?;
        Ok(config.sanitized())
    }

    /// Repair values that would break engine invariants (inverted zoom range,
    /// zero-capacity history, a sub-unit shape floor).
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.zoom_min.is_nan() || self.zoom_min <= 0.0 {
            self.zoom_min = ZOOM_MIN;
        }
        if self.zoom_max.is_nan() {
            self.zoom_max = ZOOM_MAX;
        }
        if self.zoom_max < self.zoom_min {
            std::mem::swap(&mut self.zoom_min, &mut self.zoom_max);
        }
        self.history_capacity = self.history_capacity.max(1);
        if self.min_shape_size.is_nan() || self.min_shape_size < MIN_DIMENSION {
            self.min_shape_size = MIN_DIMENSION;
        }
        self
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
