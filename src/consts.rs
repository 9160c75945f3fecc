//! Shared numeric constants for the editor crate.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width/height a shape may have after create or resize, in world units.
pub const MIN_SHAPE_SIZE: f64 = 18.0;

/// Hard floor for any element dimension after a property change.
pub const MIN_DIMENSION: f64 = 1.0;

/// Width and height given to elements created without explicit size.
pub const DEFAULT_ELEMENT_SIZE: f64 = 100.0;

/// Default fill and stroke color for new elements.
pub const DEFAULT_COLOR: &str = "#000000";

/// Offset applied to each pasted element relative to the copy buffer.
pub const PASTE_OFFSET: f64 = 10.0;

// ── History ─────────────────────────────────────────────────────

/// Maximum number of entries kept on the undo stack.
pub const HISTORY_CAPACITY: usize = 20;

// ── Camera ──────────────────────────────────────────────────────

/// Zoom multiplier change per zoom step.
pub const ZOOM_STEP: f64 = 0.1;

/// Lowest allowed zoom multiplier.
pub const ZOOM_MIN: f64 = 0.1;

/// Highest allowed zoom multiplier.
pub const ZOOM_MAX: f64 = 3.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Painting ────────────────────────────────────────────────────

/// Default brush line width in world units.
pub const BRUSH_STRENGTH: f64 = 4.0;

/// Default eraser radius in world units.
pub const ERASER_RADIUS: f64 = 12.0;

// ── Layers ──────────────────────────────────────────────────────

/// Name given to layers created without one.
pub const DEFAULT_LAYER_NAME: &str = "New Layer";
