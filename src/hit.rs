//! Hit-testing: which element or resize handle is under a world-space point.
//!
//! Only elements on visible layers are candidates. Handle slop is given in
//! screen pixels and converted through the camera so handles stay the same
//! on-screen size at any zoom.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point, Rect};
use crate::document::Document;
use crate::element::{Element, ElementId, ElementKind};
use crate::resize::ResizeHandle;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// A resize handle on a focused element.
    ResizeHandle(ResizeHandle),
    Body,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
    /// Whether the element was focused at the time of the test.
    pub focused: bool,
}

/// Test what is under `world_pt`.
///
/// Priority: a resize handle of a focused element, then the body of a focused
/// element, then the topmost element body.
#[must_use]
pub fn hit_test(doc: &Document, camera: &Camera, world_pt: Point, handle_radius_px: f64) -> Option<Hit> {
    if let Some((element_id, handle)) = handle_at(doc, camera, world_pt, handle_radius_px) {
        return Some(Hit { element_id, part: HitPart::ResizeHandle(handle), focused: true });
    }
    if let Some(element_id) = focused_element_at(doc, world_pt) {
        return Some(Hit { element_id, part: HitPart::Body, focused: true });
    }
    element_at(doc, world_pt).map(|element_id| Hit { element_id, part: HitPart::Body, focused: false })
}

/// The resize handle of a focused, visible element within the slop radius.
#[must_use]
pub fn handle_at(
    doc: &Document,
    camera: &Camera,
    world_pt: Point,
    handle_radius_px: f64,
) -> Option<(ElementId, ResizeHandle)> {
    let radius = camera.screen_dist_to_world(handle_radius_px);
    let radius_sq = radius * radius;
    doc.elements_top_down().filter(|e| e.focused).find_map(|e| {
        let bounds = e.bounds()?;
        ResizeHandle::ALL
            .into_iter()
            .find(|h| h.point_on(&bounds).dist_sq(world_pt) <= radius_sq)
            .map(|h| (e.id, h))
    })
}

/// The topmost focused, visible element whose shape contains `world_pt`.
#[must_use]
pub fn focused_element_at(doc: &Document, world_pt: Point) -> Option<ElementId> {
    doc.elements_top_down().find(|e| e.focused && contains_point(e, world_pt)).map(|e| e.id)
}

/// The topmost visible element whose shape contains `world_pt`.
#[must_use]
pub fn element_at(doc: &Document, world_pt: Point) -> Option<ElementId> {
    doc.elements_top_down().find(|e| contains_point(e, world_pt)).map(|e| e.id)
}

/// Visible elements whose bounds intersect `rect`, in paint order.
#[must_use]
pub fn elements_in_rect(doc: &Document, rect: &Rect) -> Vec<ElementId> {
    doc.elements_bottom_up()
        .filter(|e| e.bounds().is_some_and(|b| b.intersects(rect)))
        .map(|e| e.id)
        .collect()
}

/// Whether `pt` lies inside the element's drawn shape.
#[must_use]
pub fn contains_point(element: &Element, pt: Point) -> bool {
    let Some(b) = element.bounds() else {
        return false;
    };
    if !b.contains(pt) {
        return false;
    }
    match element.kind {
        ElementKind::Circle => {
            let c = b.center();
            let rx = b.width * 0.5;
            let ry = b.height * 0.5;
            let nx = (pt.x - c.x) / rx;
            let ny = (pt.y - c.y) / ry;
            nx * nx + ny * ny <= 1.0
        }
        ElementKind::Triangle => {
            // Apex at top-center, base along the bottom edge.
            let t = (pt.y - b.y) / b.height;
            (pt.x - b.center().x).abs() <= t * b.width * 0.5
        }
        ElementKind::Rectangle | ElementKind::Text | ElementKind::BrushStroke | ElementKind::EraserStroke => true,
    }
}
