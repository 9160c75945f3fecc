//! Client → canvas-space conversion.
//!
//! Pointer events report CSS pixel positions relative to the page. The
//! canvas backing store may be larger or smaller than its rendered CSS box
//! (device pixel ratio, CSS scaling), independently on each axis. Everything
//! past this module works in canvas space.

#[cfg(test)]
#[path = "coords_test.rs"]
mod coords_test;

use web_sys::HtmlCanvasElement;

use crate::camera::Point;

/// A measurement snapshot of the canvas element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMetrics {
    /// Left edge of the bounding client rect, in CSS pixels.
    pub left: f64,
    /// Top edge of the bounding client rect, in CSS pixels.
    pub top: f64,
    /// Rendered width in CSS pixels.
    pub rendered_width: f64,
    /// Rendered height in CSS pixels.
    pub rendered_height: f64,
    /// Backing-store width in device pixels.
    pub pixel_width: f64,
    /// Backing-store height in device pixels.
    pub pixel_height: f64,
}

impl CanvasMetrics {
    /// Measure a live canvas element.
    #[must_use]
    pub fn measure(canvas: &HtmlCanvasElement) -> Self {
        let rect = canvas.get_bounding_client_rect();
        Self {
            left: rect.left(),
            top: rect.top(),
            rendered_width: rect.width(),
            rendered_height: rect.height(),
            pixel_width: f64::from(canvas.width()),
            pixel_height: f64::from(canvas.height()),
        }
    }

    /// Backing-store pixels per CSS pixel on each axis. A collapsed axis
    /// (zero rendered size) maps 1:1.
    #[must_use]
    pub fn scale(&self) -> (f64, f64) {
        let sx = if self.rendered_width > 0.0 { self.pixel_width / self.rendered_width } else { 1.0 };
        let sy = if self.rendered_height > 0.0 { self.pixel_height / self.rendered_height } else { 1.0 };
        (sx, sy)
    }

    /// Center of the backing store in canvas space.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.pixel_width * 0.5, self.pixel_height * 0.5)
    }
}

/// Convert client (page) coordinates to canvas space.
#[must_use]
pub fn to_canvas_space(client_x: f64, client_y: f64, metrics: &CanvasMetrics) -> Point {
    let (sx, sy) = metrics.scale();
    Point::new((client_x - metrics.left) * sx, (client_y - metrics.top) * sy)
}
