//! Element model: drawable shapes, text and stroke elements, and their store.
//!
//! An [`Element`] is one drawable unit owned (by reference) by a layer. All
//! mutation goes through [`ElementStore`] so that the interaction engine and
//! the history can reason about exactly which elements changed.
//!
//! Positions are optional: an element created without one is "unplaced" and
//! gets centered in the viewport on the next layout pass
//! ([`ElementStore::resolve_positions`]). Moving an unplaced element leaves it
//! unplaced.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::camera::{Point, Rect};
use crate::consts::{DEFAULT_COLOR, DEFAULT_ELEMENT_SIZE, MIN_DIMENSION};
use crate::error::EditorError;
use crate::layer::LayerId;

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// The variant tag of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Rectangle,
    /// Ellipse inscribed in the bounding box.
    Circle,
    /// Isosceles triangle with its apex at the top-center of the bounding box.
    Triangle,
    Text,
    BrushStroke,
    EraserStroke,
}

impl ElementKind {
    /// Whether the element is a freehand polyline.
    #[must_use]
    pub fn is_stroke(self) -> bool {
        matches!(self, Self::BrushStroke | Self::EraserStroke)
    }
}

/// Content and font of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProps {
    pub content: String,
    pub family: String,
    /// Font size in world units.
    pub size: f64,
}

impl Default for TextProps {
    fn default() -> Self {
        Self { content: "Text".into(), family: "sans-serif".into(), size: 16.0 }
    }
}

/// A drawable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Assigned at creation; never changes.
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Top-left corner in world space. `None` until placed.
    pub position: Option<Point>,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    pub stroke: String,
    /// The owning layer.
    pub layer_id: LayerId,
    /// Selection flag.
    pub focused: bool,
    /// Present exactly when `kind` is [`ElementKind::Text`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextProps>,
    /// World-space polyline for stroke elements; empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Point>,
}

impl Element {
    /// Bounding box in world space, or `None` while unplaced.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.position.map(|p| Rect { x: p.x, y: p.y, width: self.width, height: self.height })
    }

    /// Check the text invariant: `text` is present iff the kind is text.
    ///
    /// # Errors
    ///
    /// [`EditorError::MissingTextProperties`] when a text element has no text
    /// record or another kind carries one.
    pub fn validate(&self) -> Result<(), EditorError> {
        if (self.kind == ElementKind::Text) == self.text.is_some() {
            Ok(())
        } else {
            Err(EditorError::MissingTextProperties)
        }
    }

    /// Shift the element (and every path point) by a world-space delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if let Some(p) = self.position.as_mut() {
            p.x += dx;
            p.y += dy;
        }
        for p in &mut self.path {
            p.x += dx;
            p.y += dy;
        }
    }

    /// Move and size the element to `rect`. Stroke paths are scaled from the
    /// old bounds into the new ones.
    pub fn set_bounds(&mut self, rect: Rect) {
        if let Some(old) = self.bounds() {
            if self.kind.is_stroke() {
                let sx = if old.width > 0.0 { rect.width / old.width } else { 1.0 };
                let sy = if old.height > 0.0 { rect.height / old.height } else { 1.0 };
                for p in &mut self.path {
                    p.x = rect.x + (p.x - old.x) * sx;
                    p.y = rect.y + (p.y - old.y) * sy;
                }
            }
        }
        self.position = Some(Point::new(rect.x, rect.y));
        self.width = rect.width;
        self.height = rect.height;
    }
}

/// Caller-supplied properties overlaid on the defaults by
/// [`ElementStore::create`]. The id is never part of the overlay.
#[derive(Debug, Clone, Default)]
pub struct ElementProps {
    pub position: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub layer_id: Option<LayerId>,
    pub focused: Option<bool>,
    pub text: Option<TextProps>,
    pub path: Option<Vec<Point>>,
}

/// Match elements whose id is in `ids`.
pub fn by_ids(ids: &[ElementId]) -> impl Fn(&Element) -> bool + '_ {
    move |e| ids.contains(&e.id)
}

/// Ordered element collection plus the copy buffer.
///
/// Order is draw order within a layer: later elements are drawn on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementStore {
    elements: Vec<Element>,
    clipboard: Vec<Element>,
}

impl ElementStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-validated elements, in order.
    #[must_use]
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self { elements, clipboard: Vec::new() }
    }

    /// Create and append an element.
    ///
    /// Defaults: unplaced, 100×100, black fill and stroke, unfocused. The
    /// caller's properties are overlaid, then a fresh id is assigned. Stroke
    /// elements with a path take their bounds from the path.
    ///
    /// # Errors
    ///
    /// - [`EditorError::NoActiveLayer`] when `props.layer_id` is absent.
    /// - [`EditorError::MissingTextProperties`] for a text element without `props.text`.
    pub fn create(&mut self, kind: ElementKind, props: ElementProps) -> Result<ElementId, EditorError> {
        let Some(layer_id) = props.layer_id else {
            return Err(EditorError::NoActiveLayer);
        };
        let text = match (kind, props.text) {
            (ElementKind::Text, None) => return Err(EditorError::MissingTextProperties),
            (ElementKind::Text, Some(text)) => Some(text),
            (_, Some(_)) => {
                debug!(?kind, "ignoring text properties on non-text element");
                None
            }
            (_, None) => None,
        };

        let mut element = Element {
            id: Uuid::nil(),
            kind,
            position: props.position,
            width: props.width.unwrap_or(DEFAULT_ELEMENT_SIZE),
            height: props.height.unwrap_or(DEFAULT_ELEMENT_SIZE),
            fill: props.fill.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            stroke: props.stroke.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            layer_id,
            focused: props.focused.unwrap_or(false),
            text,
            path: if kind.is_stroke() { props.path.unwrap_or_default() } else { Vec::new() },
        };
        if let Some(rect) = path_bounds(&element.path) {
            element.position = Some(Point::new(rect.x, rect.y));
            element.width = rect.width;
            element.height = rect.height;
        }
        clamp_dimensions(&mut element);
        element.id = Uuid::new_v4();

        let id = element.id;
        self.elements.push(element);
        Ok(id)
    }

    /// Append an existing element (history restore). Replaces any element with
    /// the same id in place.
    pub fn insert(&mut self, element: Element) {
        if let Some(slot) = self.elements.iter_mut().find(|e| e.id == element.id) {
            *slot = element;
        } else {
            self.elements.push(element);
        }
    }

    /// Insert an existing element at `index` (clamped to the end).
    pub fn insert_at(&mut self, index: usize, element: Element) {
        if self.contains(&element.id) {
            self.insert(element);
            return;
        }
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
    }

    /// Overwrite the element with the same id. Returns false if absent.
    pub fn replace(&mut self, element: Element) -> bool {
        match self.elements.iter_mut().find(|e| e.id == element.id) {
            Some(slot) => {
                *slot = element;
                true
            }
            None => false,
        }
    }

    /// Apply `update` to every element matched by `matches`.
    ///
    /// The id is restored after the update; width and height are clamped to
    /// at least 1; an update that breaks the text invariant is rejected for
    /// that element. Returns the ids that actually changed.
    pub fn change_properties<M, U>(&mut self, mut matches: M, mut update: U) -> Vec<ElementId>
    where
        M: FnMut(&Element) -> bool,
        U: FnMut(Element) -> Element,
    {
        let mut changed = Vec::new();
        for slot in &mut self.elements {
            if !matches(slot) {
                continue;
            }
            let id = slot.id;
            let mut next = update(slot.clone());
            next.id = id;
            clamp_dimensions(&mut next);
            if let Err(err) = next.validate() {
                warn!(%id, %err, "property change rejected");
                continue;
            }
            if next != *slot {
                *slot = next;
                changed.push(id);
            }
        }
        changed
    }

    /// Set bounds on one element through [`Self::change_properties`].
    pub fn set_bounds(&mut self, id: &ElementId, rect: Rect) -> bool {
        !self
            .change_properties(
                |e| e.id == *id,
                |mut e| {
                    e.set_bounds(rect);
                    e
                },
            )
            .is_empty()
    }

    /// Set `focused` on the matched elements only. Returns how many changed.
    pub fn focus(&mut self, ids: &[ElementId]) -> usize {
        self.set_focus(ids, true)
    }

    /// Clear `focused` on the matched elements only. Returns how many changed.
    pub fn unfocus(&mut self, ids: &[ElementId]) -> usize {
        self.set_focus(ids, false)
    }

    /// Clear `focused` everywhere.
    pub fn unfocus_all(&mut self) -> usize {
        let ids = self.focused_ids();
        self.unfocus(&ids)
    }

    fn set_focus(&mut self, ids: &[ElementId], focused: bool) -> usize {
        let mut count = 0;
        for e in self.elements.iter_mut().filter(|e| ids.contains(&e.id)) {
            if e.focused != focused {
                e.focused = focused;
                count += 1;
            }
        }
        count
    }

    /// Remove the matched elements. Unknown ids are ignored. Returns the
    /// removed elements with their former indices, ascending.
    pub fn delete(&mut self, ids: &[ElementId]) -> Vec<(usize, Element)> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.elements.len());
        for (index, e) in self.elements.drain(..).enumerate() {
            if ids.contains(&e.id) {
                removed.push((index, e));
            } else {
                kept.push(e);
            }
        }
        self.elements = kept;
        removed
    }

    /// Translate the matched elements.
    pub fn translate(&mut self, ids: &[ElementId], dx: f64, dy: f64) {
        for e in self.elements.iter_mut().filter(|e| ids.contains(&e.id)) {
            e.translate(dx, dy);
        }
    }

    /// Snapshot the matched elements into the copy buffer. Returns how many
    /// were captured; copying nothing leaves the buffer untouched.
    pub fn copy(&mut self, ids: &[ElementId]) -> usize {
        let captured: Vec<Element> = self.elements.iter().filter(|e| ids.contains(&e.id)).cloned().collect();
        if captured.is_empty() {
            return 0;
        }
        let count = captured.len();
        self.clipboard = captured;
        count
    }

    /// Append clones of the copy buffer with fresh ids, offset by `offset` on
    /// both axes. The pasted set becomes the new copy buffer.
    pub fn paste(&mut self, offset: f64) -> Vec<ElementId> {
        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for source in &self.clipboard {
            let mut clone = source.clone();
            clone.id = Uuid::new_v4();
            clone.translate(offset, offset);
            pasted.push(clone);
        }
        let ids = pasted.iter().map(|e| e.id).collect();
        self.elements.extend(pasted.iter().cloned());
        self.clipboard = pasted;
        ids
    }

    /// The current copy buffer.
    #[must_use]
    pub fn clipboard(&self) -> &[Element] {
        &self.clipboard
    }

    /// Place every unplaced element centered on `center`. Returns how many
    /// were placed.
    pub fn resolve_positions(&mut self, center: Point) -> usize {
        let mut placed = 0;
        for e in self.elements.iter_mut().filter(|e| e.position.is_none()) {
            e.position = Some(Point::new(center.x - e.width * 0.5, center.y - e.height * 0.5));
            placed += 1;
        }
        placed
    }

    /// Put the matched elements on layer `to`. Returns how many changed.
    pub fn move_to_layer(&mut self, ids: &[ElementId], to: LayerId) -> usize {
        let mut count = 0;
        for e in self.elements.iter_mut().filter(|e| ids.contains(&e.id) && e.layer_id != to) {
            e.layer_id = to;
            count += 1;
        }
        count
    }

    /// Reassign every element owned by `from` to `to`.
    pub fn reassign_layer(&mut self, from: &LayerId, to: LayerId) -> usize {
        let mut count = 0;
        for e in self.elements.iter_mut().filter(|e| e.layer_id == *from) {
            e.layer_id = to;
            count += 1;
        }
        count
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn focused_ids(&self) -> Vec<ElementId> {
        self.elements.iter().filter(|e| e.focused).map(|e| e.id).collect()
    }

    /// Elements in draw order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.elements.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Bounding box of a polyline, with each side at least the minimum dimension.
#[must_use]
pub fn path_bounds(path: &[Point]) -> Option<Rect> {
    let first = path.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in path {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Rect {
        x: min_x,
        y: min_y,
        width: (max_x - min_x).max(MIN_DIMENSION),
        height: (max_y - min_y).max(MIN_DIMENSION),
    })
}

fn clamp_dimensions(element: &mut Element) {
    if element.width.is_nan() || element.width < MIN_DIMENSION {
        warn!(id = %element.id, requested = element.width, "width clamped to minimum");
        element.width = MIN_DIMENSION;
    }
    if element.height.is_nan() || element.height < MIN_DIMENSION {
        warn!(id = %element.id, requested = element.height, "height clamped to minimum");
        element.height = MIN_DIMENSION;
    }
}
