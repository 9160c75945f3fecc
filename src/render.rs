//! Rendering: draws layers, elements and interaction overlays to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives read-only views of engine state and produces pixels; it does
//! not mutate any application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point, Rect};
use crate::config::EditorConfig;
use crate::consts::{BRUSH_STRENGTH, ERASER_RADIUS};
use crate::document::Document;
use crate::element::{Element, ElementKind};
use crate::input::{InputState, UiState};
use crate::layer::{Layer, LayerId, LayerStack, PaintMode};
use crate::resize::ResizeHandle;

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

const SELECTION_COLOR: &str = "#1E90FF";

/// Look up the 2D context of a canvas element.
///
/// # Errors
///
/// Returns `Err` if the browser refuses a 2D context.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    let Some(ctx) = canvas.get_context("2d")? else {
        return Err(JsValue::from_str("2d context unavailable"));
    };
    ctx.dyn_into::<CanvasRenderingContext2d>().map_err(JsValue::from)
}

/// Reset the transform and clear a `width` x `height` canvas-pixel area.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn clear(ctx: &CanvasRenderingContext2d, width: f64, height: f64) -> Result<(), JsValue> {
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, width, height);
    Ok(())
}

fn apply_camera(ctx: &CanvasRenderingContext2d, camera: &Camera) -> Result<(), JsValue> {
    ctx.set_transform(camera.zoom, 0.0, 0.0, camera.zoom, camera.pan_x, camera.pan_y)
}

// =============================================================
// Layers
// =============================================================

/// Replay a layer's paint operations, then draw its elements.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw_layer(ctx: &CanvasRenderingContext2d, doc: &Document, layer: &Layer, camera: &Camera) -> Result<(), JsValue> {
    if layer.hidden {
        return Ok(());
    }
    apply_camera(ctx, camera)?;
    for stroke in &layer.raster {
        let width = match stroke.mode {
            PaintMode::Draw => stroke.strength,
            PaintMode::Erase => stroke.strength * 2.0,
        };
        draw_polyline(ctx, &stroke.path, &stroke.color, width, stroke.mode)?;
    }
    for element in doc.elements.iter().filter(|e| e.layer_id == layer.id) {
        draw_element(ctx, element)?;
    }
    Ok(())
}

/// Whether any visible layer lacks its own canvas and so must be composited
/// onto the main canvas.
pub fn shares_main_canvas(layers: &LayerStack, has_own_canvas: impl Fn(&LayerId) -> bool) -> bool {
    layers.iter().any(|l| !l.hidden && !has_own_canvas(&l.id))
}

/// A detached canvas of `width` x `height` pixels for isolating one layer.
///
/// # Errors
///
/// Returns `Err` when there is no DOM document or the element cannot be
/// created.
pub fn offscreen_canvas(width: u32, height: u32) -> Result<HtmlCanvasElement, JsValue> {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return Err(JsValue::from_str("no document for offscreen canvas"));
    };
    let canvas = document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>().map_err(JsValue::from)?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(canvas)
}

/// Draw `layer` alone on `scratch`, then copy the result onto `ctx`. Erase
/// strokes only clear pixels of `layer`, never of the layers beneath it.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn composite_layer(
    ctx: &CanvasRenderingContext2d,
    scratch: &HtmlCanvasElement,
    doc: &Document,
    layer: &Layer,
    camera: &Camera,
) -> Result<(), JsValue> {
    if layer.hidden {
        return Ok(());
    }
    let (width, height) = (f64::from(scratch.width()), f64::from(scratch.height()));
    let scratch_ctx = context_2d(scratch)?;
    clear(&scratch_ctx, width, height)?;
    draw_layer(&scratch_ctx, doc, layer, camera)?;
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    ctx.draw_image_with_html_canvas_element(scratch, 0.0, 0.0)
}

fn draw_polyline(
    ctx: &CanvasRenderingContext2d,
    path: &[Point],
    color: &str,
    width: f64,
    mode: PaintMode,
) -> Result<(), JsValue> {
    let Some(first) = path.first() else {
        return Ok(());
    };
    ctx.save();
    if mode == PaintMode::Erase {
        ctx.set_global_composite_operation("destination-out")?;
    }
    ctx.set_stroke_style_str(color);
    ctx.set_fill_style_str(color);
    ctx.set_line_width(width);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    if path.len() == 1 {
        // A single sample paints a dot.
        ctx.begin_path();
        ctx.arc(first.x, first.y, width * 0.5, 0.0, 2.0 * PI)?;
        ctx.fill();
    } else {
        ctx.begin_path();
        ctx.move_to(first.x, first.y);
        for p in &path[1..] {
            ctx.line_to(p.x, p.y);
        }
        ctx.stroke();
    }
    ctx.restore();
    Ok(())
}

// =============================================================
// Elements
// =============================================================

fn draw_element(ctx: &CanvasRenderingContext2d, element: &Element) -> Result<(), JsValue> {
    let Some(b) = element.bounds() else {
        return Ok(());
    };
    match element.kind {
        ElementKind::Rectangle => {
            ctx.set_fill_style_str(&element.fill);
            ctx.fill_rect(b.x, b.y, b.width, b.height);
            ctx.set_stroke_style_str(&element.stroke);
            ctx.set_line_width(1.0);
            ctx.stroke_rect(b.x, b.y, b.width, b.height);
        }
        ElementKind::Circle => {
            let c = b.center();
            ctx.begin_path();
            ctx.ellipse(c.x, c.y, b.width * 0.5, b.height * 0.5, 0.0, 0.0, 2.0 * PI)?;
            fill_and_stroke(ctx, element);
        }
        ElementKind::Triangle => {
            ctx.begin_path();
            ctx.move_to(b.x + b.width * 0.5, b.y);
            ctx.line_to(b.right(), b.bottom());
            ctx.line_to(b.x, b.bottom());
            ctx.close_path();
            fill_and_stroke(ctx, element);
        }
        ElementKind::Text => {
            if let Some(text) = &element.text {
                ctx.save();
                ctx.set_fill_style_str(&element.fill);
                ctx.set_text_align("left");
                ctx.set_text_baseline("top");
                ctx.set_font(&format!("{}px {}", text.size, text.family));
                ctx.fill_text(&text.content, b.x, b.y)?;
                ctx.restore();
            }
        }
        ElementKind::BrushStroke => {
            draw_polyline(ctx, &element.path, &element.stroke, BRUSH_STRENGTH, PaintMode::Draw)?;
        }
        ElementKind::EraserStroke => {
            draw_polyline(ctx, &element.path, &element.stroke, ERASER_RADIUS * 2.0, PaintMode::Erase)?;
        }
    }
    Ok(())
}

fn fill_and_stroke(ctx: &CanvasRenderingContext2d, element: &Element) {
    ctx.set_fill_style_str(&element.fill);
    ctx.fill();
    ctx.set_stroke_style_str(&element.stroke);
    ctx.set_line_width(1.0);
    ctx.stroke();
}

// =============================================================
// Overlay
// =============================================================

/// Draw the in-progress paint preview, selection boxes with handles, and the
/// marquee.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw_overlay(
    ctx: &CanvasRenderingContext2d,
    doc: &Document,
    camera: &Camera,
    input: &InputState,
    ui: &UiState,
    config: &EditorConfig,
) -> Result<(), JsValue> {
    apply_camera(ctx, camera)?;
    let zoom = camera.zoom;

    if let InputState::Painting { mode, path, .. } = input {
        match mode {
            PaintMode::Draw => draw_polyline(ctx, path, &ui.stroke, config.brush_strength, PaintMode::Draw)?,
            PaintMode::Erase => {
                if let Some(last) = path.last() {
                    ctx.save();
                    ctx.set_stroke_style_str("rgba(0, 0, 0, 0.4)");
                    ctx.set_line_width(1.0 / zoom);
                    ctx.begin_path();
                    ctx.arc(last.x, last.y, config.eraser_radius, 0.0, 2.0 * PI)?;
                    ctx.stroke();
                    ctx.restore();
                }
            }
        }
    }

    for element in doc.elements_bottom_up().filter(|e| e.focused) {
        if let Some(b) = element.bounds() {
            draw_selection(ctx, &b, zoom, config.handle_radius_px)?;
        }
    }

    if let InputState::Marquee { anchor_world, current_world } = input {
        draw_marquee(ctx, &Rect::from_corners(*anchor_world, *current_world), zoom)?;
    }
    Ok(())
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash_world: f64) -> Result<(), JsValue> {
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash_world.into());
    dash_array.push(&dash_world.into());
    ctx.set_line_dash(&dash_array)
}

fn draw_selection(ctx: &CanvasRenderingContext2d, b: &Rect, zoom: f64, handle_radius_px: f64) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / zoom);
    set_dash(ctx, SELECTION_DASH_PX / zoom)?;
    ctx.stroke_rect(b.x, b.y, b.width, b.height);
    ctx.set_line_dash(&js_sys::Array::new())?;

    let half = handle_radius_px * 0.5 / zoom;
    ctx.set_fill_style_str("#fff");
    for handle in ResizeHandle::ALL {
        let p = handle.point_on(b);
        ctx.fill_rect(p.x - half, p.y - half, half * 2.0, half * 2.0);
        ctx.stroke_rect(p.x - half, p.y - half, half * 2.0, half * 2.0);
    }
    ctx.restore();
    Ok(())
}

fn draw_marquee(ctx: &CanvasRenderingContext2d, marquee: &Rect, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    set_dash(ctx, SELECTION_DASH_PX / zoom)?;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_fill_style_str("rgba(30, 144, 255, 0.12)");
    ctx.set_line_width(1.0 / zoom);
    ctx.fill_rect(marquee.x, marquee.y, marquee.width, marquee.height);
    ctx.stroke_rect(marquee.x, marquee.y, marquee.width, marquee.height);
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}
