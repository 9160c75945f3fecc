use std::collections::HashMap;

use tracing::{debug, error, info};
use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;

use crate::camera::{Camera, Point, Rect};
use crate::compositor::{self, Compositor, FlattenedScene};
use crate::config::EditorConfig;
use crate::coords::{CanvasMetrics, to_canvas_space};
use crate::document::{Document, DocumentSnapshot};
use crate::element::{Element, ElementId, ElementKind, ElementProps, by_ids};
use crate::error::EditorError;
use crate::hit::{self, HitPart};
use crate::history::{History, HistoryAction};
use crate::input::{Button, Buttons, InputState, Key, KeyCombo, Mode, Modifiers, ShapeKind, UiState, WheelDelta};
use crate::keymap::{Command, Keymap};
use crate::layer::{LayerId, PaintMode, StrokeRecord};
use crate::render;
use crate::resize;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Message shown when an edit needs an active layer and none exists.
pub const NO_ACTIVE_LAYER_ALERT: &str = "No active layer found";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The scene should be redrawn.
    RenderNeeded,
    /// The document changed; the host should persist a fresh snapshot.
    DocumentChanged,
    SetCursor(String),
    ModeChanged(Mode),
    /// Open the host text editor for a text element.
    EditTextRequested { id: ElementId, content: String },
    /// A user-triggerable failure to show in a dialog.
    Alert(String),
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
/// Points passed to the pointer handlers are in canvas space.
pub struct EngineCore {
    pub doc: Document,
    pub history: History,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub config: EditorConfig,
    pub keymap: Keymap,
    /// Viewport size in canvas pixels.
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Last pointer position in canvas space, if the pointer is over the canvas.
    pub last_pointer: Option<Point>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EngineCore {
    /// An engine over a fresh document with one active layer.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let config = config.sanitized();
        Self {
            doc: Document::with_default_layer(None),
            history: History::new(config.history_capacity),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            config,
            keymap: Keymap::standard(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            last_pointer: None,
        }
    }

    // --- Document ---

    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot {
        self.doc.snapshot()
    }

    /// Replace the document with a loaded snapshot. Clears history and any
    /// gesture in progress.
    pub fn load_snapshot(&mut self, snapshot: DocumentSnapshot) -> Vec<Action> {
        self.doc = Document::from_snapshot(snapshot);
        self.history.clear();
        self.input = InputState::Idle;
        self.place_pending();
        vec![Action::RenderNeeded]
    }

    /// Capture the visible scene for export.
    #[must_use]
    pub fn flatten(&self) -> FlattenedScene {
        FlattenedScene::capture(&self.doc, self.viewport_width, self.viewport_height)
    }

    /// Flatten and render through `compositor`.
    ///
    /// # Errors
    ///
    /// Whatever the compositor returns.
    pub fn export<C: Compositor>(&self, compositor: &C, quality: f64) -> Result<Vec<u8>, C::Error> {
        compositor::export(compositor, &self.flatten(), quality)
    }

    // --- Viewport ---

    /// Update the viewport size (canvas pixels) and place any elements still
    /// waiting for a position at the viewport center.
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.viewport_width = width;
        self.viewport_height = height;
        let mut actions = vec![Action::RenderNeeded];
        if self.place_pending() > 0 {
            actions.push(Action::DocumentChanged);
        }
        actions
    }

    fn place_pending(&mut self) -> usize {
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return 0;
        }
        let center = self.camera.screen_to_world(Point::new(self.viewport_width * 0.5, self.viewport_height * 0.5));
        let placed = self.doc.elements.resolve_positions(center);
        if placed > 0 {
            debug!(placed, "placed pending elements at viewport center");
        }
        placed
    }

    // --- Mode / style ---

    /// Switch mode. Refused while a gesture is in progress.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Action> {
        if !self.input.is_idle() {
            debug!(?mode, "mode change ignored during gesture");
            return Vec::new();
        }
        if self.ui.mode == mode {
            return Vec::new();
        }
        self.ui.mode = mode;
        let mut actions = vec![Action::ModeChanged(mode)];
        actions.extend(self.set_cursor(mode.cursor()));
        actions
    }

    pub fn set_shape(&mut self, shape: ShapeKind) {
        self.ui.shape = shape;
    }

    /// Set the fill color for new shapes and apply it to the focused elements.
    pub fn set_fill(&mut self, color: &str) -> Vec<Action> {
        self.ui.fill = color.to_string();
        let color = color.to_string();
        self.change_focused(move |mut e| {
            e.fill.clone_from(&color);
            e
        })
    }

    /// Set the stroke color for new shapes and brushes and apply it to the
    /// focused elements.
    pub fn set_stroke(&mut self, color: &str) -> Vec<Action> {
        self.ui.stroke = color.to_string();
        let color = color.to_string();
        self.change_focused(move |mut e| {
            e.stroke.clone_from(&color);
            e
        })
    }

    /// Replace a text element's content as one recorded property change.
    ///
    /// # Errors
    ///
    /// [`EditorError::ElementNotFound`] when `id` is not a text element.
    pub fn set_text(&mut self, id: &ElementId, content: &str) -> Result<Vec<Action>, EditorError> {
        match self.doc.elements.get(id) {
            Some(e) if e.kind == ElementKind::Text => {}
            _ => return Err(EditorError::ElementNotFound(*id)),
        }
        let content = content.to_string();
        Ok(self.change_elements(&[*id], move |mut e| {
            if let Some(text) = e.text.as_mut() {
                text.content.clone_from(&content);
            }
            e
        }))
    }

    fn change_focused<U>(&mut self, update: U) -> Vec<Action>
    where
        U: FnMut(Element) -> Element,
    {
        let ids = self.doc.elements.focused_ids();
        self.change_elements(&ids, update)
    }

    fn change_elements<U>(&mut self, ids: &[ElementId], update: U) -> Vec<Action>
    where
        U: FnMut(Element) -> Element,
    {
        if ids.is_empty() {
            return Vec::new();
        }
        let before = self.clone_elements(ids);
        let changed = self.doc.elements.change_properties(by_ids(ids), update);
        if changed.is_empty() {
            return Vec::new();
        }
        let before = before.into_iter().filter(|e| changed.contains(&e.id)).collect();
        let after = self.clone_elements(&changed);
        self.history.push(HistoryAction::PropertyChange { before, after });
        vec![Action::DocumentChanged, Action::RenderNeeded]
    }

    fn clone_elements(&self, ids: &[ElementId]) -> Vec<Element> {
        self.doc.elements.iter().filter(|e| ids.contains(&e.id)).cloned().collect()
    }

    // --- Element commands ---

    /// Create an element through the model and record it. Without an explicit
    /// layer the element goes to the active layer.
    ///
    /// # Errors
    ///
    /// [`EditorError::LayerNotFound`] for an explicit layer that does not
    /// exist, otherwise [`EditorError::NoActiveLayer`] or
    /// [`EditorError::MissingTextProperties`] from element creation.
    pub fn add_element(&mut self, kind: ElementKind, mut props: ElementProps) -> Result<ElementId, EditorError> {
        match props.layer_id {
            Some(layer_id) if self.doc.layers.get(&layer_id).is_none() => {
                return Err(EditorError::LayerNotFound(layer_id));
            }
            Some(_) => {}
            None => props.layer_id = self.doc.layers.active_id(),
        }
        let id = self.doc.elements.create(kind, props)?;
        self.place_pending();
        self.record_created(&[id]);
        Ok(id)
    }

    fn record_created(&mut self, ids: &[ElementId]) {
        let elements: Vec<(usize, Element)> = self
            .doc
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| ids.contains(&e.id))
            .map(|(i, e)| (i, e.clone()))
            .collect();
        if !elements.is_empty() {
            self.history.push(HistoryAction::CreateElements { elements });
        }
    }

    /// Delete the focused elements as one recorded action.
    pub fn delete_focused(&mut self) -> Vec<Action> {
        let ids = self.doc.elements.focused_ids();
        if ids.is_empty() {
            debug!("delete with nothing focused");
            return Vec::new();
        }
        let removed = self.doc.elements.delete(&ids);
        debug!(count = removed.len(), "deleted focused elements");
        self.history.push(HistoryAction::DeleteElements { removed });
        vec![Action::DocumentChanged, Action::RenderNeeded]
    }

    /// Copy the focused elements into the copy buffer.
    pub fn copy(&mut self) -> Vec<Action> {
        let ids = self.doc.elements.focused_ids();
        let count = self.doc.elements.copy(&ids);
        debug!(count, "copied");
        Vec::new()
    }

    /// Paste the copy buffer offset from its last position. The pasted
    /// elements become the selection.
    ///
    /// Clones whose source layer was removed or hidden since the copy land on
    /// the active layer. Clones that still end up on a hidden layer are not
    /// selected.
    pub fn paste(&mut self) -> Vec<Action> {
        let ids = self.doc.elements.paste(self.config.paste_offset);
        if ids.is_empty() {
            debug!("paste with empty copy buffer");
            return Vec::new();
        }
        let (_, stranded) = self.visible_split(&ids);
        if let Some(active) = self.doc.layers.active_id().filter(|_| !stranded.is_empty()) {
            let moved = self.doc.elements.move_to_layer(&stranded, active);
            debug!(moved, layer = %active, "pasted onto active layer");
        }
        let (shown, _) = self.visible_split(&ids);
        self.doc.elements.unfocus_all();
        self.doc.elements.focus(&shown);
        self.place_pending();
        self.record_created(&ids);
        vec![Action::DocumentChanged, Action::RenderNeeded]
    }

    /// Partition `ids` into elements on a visible layer and the rest.
    fn visible_split(&self, ids: &[ElementId]) -> (Vec<ElementId>, Vec<ElementId>) {
        ids.iter().partition(|id| self.doc.elements.get(id).is_some_and(|e| self.doc.is_element_visible(e)))
    }

    /// Focus every element on a visible layer.
    pub fn select_all(&mut self) -> Vec<Action> {
        let ids: Vec<ElementId> = self.doc.elements_top_down().map(|e| e.id).collect();
        if self.doc.elements.focus(&ids) == 0 {
            return Vec::new();
        }
        vec![Action::RenderNeeded]
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) -> Vec<Action> {
        if self.doc.elements.unfocus_all() == 0 {
            return Vec::new();
        }
        vec![Action::RenderNeeded]
    }

    // --- History ---

    /// Undo the last action. No-op while a gesture is in progress.
    pub fn undo(&mut self) -> Vec<Action> {
        if !self.input.is_idle() || !self.history.undo(&mut self.doc) {
            return Vec::new();
        }
        vec![Action::DocumentChanged, Action::RenderNeeded]
    }

    /// Redo the last undone action. No-op while a gesture is in progress.
    pub fn redo(&mut self) -> Vec<Action> {
        if !self.input.is_idle() || !self.history.redo(&mut self.doc) {
            return Vec::new();
        }
        vec![Action::DocumentChanged, Action::RenderNeeded]
    }

    // --- Zoom ---

    pub fn zoom_in(&mut self, anchor: Option<Point>) -> Vec<Action> {
        self.zoom_by(self.config.zoom_step, anchor)
    }

    pub fn zoom_out(&mut self, anchor: Option<Point>) -> Vec<Action> {
        self.zoom_by(-self.config.zoom_step, anchor)
    }

    fn zoom_by(&mut self, step: f64, anchor: Option<Point>) -> Vec<Action> {
        let anchor = anchor.unwrap_or_else(|| Point::new(self.viewport_width * 0.5, self.viewport_height * 0.5));
        let target = self.camera.zoom + step;
        if self.camera.zoom_at(anchor, target, self.config.zoom_min, self.config.zoom_max) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Layers ---

    /// Append a layer and record it.
    pub fn add_layer(&mut self, name: Option<&str>) -> LayerId {
        let id = self.doc.layers.create(name, None);
        if let (Some(index), Some(layer)) = (self.doc.layers.index_of(&id), self.doc.layers.get(&id)) {
            self.history.push(HistoryAction::CreateLayer { index, layer: layer.clone() });
        }
        id
    }

    /// Remove a layer and the elements it owns as one recorded action.
    /// Removing the last layer is refused.
    pub fn remove_layer(&mut self, id: &LayerId) -> Vec<Action> {
        if self.doc.layers.get(id).is_none() {
            debug!(%id, "remove of unknown layer");
            return Vec::new();
        }
        if self.doc.layers.len() <= 1 {
            debug!(%id, "refusing to remove the last layer");
            return Vec::new();
        }
        let owned: Vec<ElementId> = self.doc.elements.iter().filter(|e| e.layer_id == *id).map(|e| e.id).collect();
        let elements = self.doc.elements.delete(&owned);
        let Some((index, layer)) = self.doc.layers.remove(id) else {
            return Vec::new();
        };
        info!(%id, elements = elements.len(), "layer removed");
        self.history.push(HistoryAction::RemoveLayer { index, layer, elements });
        vec![Action::DocumentChanged, Action::RenderNeeded]
    }

    pub fn rename_layer(&mut self, id: &LayerId, name: &str) -> Vec<Action> {
        let Some(before) = self.doc.layers.get(id).map(|l| l.name.clone()) else {
            return Vec::new();
        };
        if !self.doc.layers.rename(id, name) {
            return Vec::new();
        }
        let after = name.trim().to_string();
        self.history.push(HistoryAction::RenameLayer { id: *id, before, after });
        vec![Action::DocumentChanged]
    }

    pub fn move_layer_up(&mut self, id: &LayerId) -> Vec<Action> {
        self.reorder_layer(id, true)
    }

    pub fn move_layer_down(&mut self, id: &LayerId) -> Vec<Action> {
        self.reorder_layer(id, false)
    }

    fn reorder_layer(&mut self, id: &LayerId, up: bool) -> Vec<Action> {
        let Some(from) = self.doc.layers.index_of(id) else {
            return Vec::new();
        };
        let moved = if up { self.doc.layers.move_up(id) } else { self.doc.layers.move_down(id) };
        let Some(to) = self.doc.layers.index_of(id).filter(|_| moved) else {
            return Vec::new();
        };
        self.history.push(HistoryAction::ReorderLayer { id: *id, from, to });
        vec![Action::DocumentChanged, Action::RenderNeeded]
    }

    /// Make `id` the active layer. View state; not recorded.
    pub fn toggle_layer_active(&mut self, id: &LayerId) -> Vec<Action> {
        if self.doc.layers.toggle_active(id) { vec![Action::DocumentChanged] } else { Vec::new() }
    }

    /// Show or hide a layer. Hiding a layer drops its elements from the
    /// selection. View state; not recorded.
    pub fn toggle_layer_visibility(&mut self, id: &LayerId) -> Vec<Action> {
        let Some(hidden) = self.doc.layers.toggle_visibility(id) else {
            return Vec::new();
        };
        if hidden {
            let owned: Vec<ElementId> = self.doc.elements.iter().filter(|e| e.layer_id == *id).map(|e| e.id).collect();
            self.doc.elements.unfocus(&owned);
        }
        vec![Action::DocumentChanged, Action::RenderNeeded]
    }

    // --- Pointer input ---

    /// Pointer pressed at canvas-space `screen_pt`.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.last_pointer = Some(screen_pt);
        if !self.input.is_idle() {
            debug!(?button, "pointer down ignored during gesture");
            return Vec::new();
        }

        let pan = button == Button::Middle
            || (button == Button::Primary && (self.ui.mode == Mode::Move || modifiers.shift));
        if pan {
            self.input = InputState::Panning { last_screen: screen_pt, button };
            return self.set_cursor("grabbing").into_iter().collect();
        }
        if button != Button::Primary {
            return Vec::new();
        }

        let world = self.camera.screen_to_world(screen_pt);
        match self.ui.mode {
            Mode::Draw => self.begin_paint(PaintMode::Draw, world),
            Mode::Erase => self.begin_paint(PaintMode::Erase, world),
            Mode::ZoomIn => self.zoom_in(Some(screen_pt)),
            Mode::ZoomOut => self.zoom_out(Some(screen_pt)),
            Mode::Text => self.place_text(world),
            Mode::Select | Mode::Shapes => self.begin_element_gesture(screen_pt, world),
            Mode::Move => Vec::new(),
        }
    }

    /// Pointer moved. `buttons` is the set currently held.
    pub fn on_pointer_move(&mut self, screen_pt: Point, buttons: Buttons, _modifiers: Modifiers) -> Vec<Action> {
        self.last_pointer = Some(screen_pt);
        if self.input.is_idle() {
            return self.hover(screen_pt);
        }
        if !buttons.contains(self.input.required_buttons()) {
            debug!("gesture button released outside the canvas; committing");
            return self.finish_gesture();
        }

        let world = self.camera.screen_to_world(screen_pt);
        let zoom = self.camera.zoom;
        let min_size = self.config.min_shape_size;
        match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen, .. } => {
                let (dx, dy) = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                *last_screen = screen_pt;
                self.camera.pan_by(dx, dy);
                vec![Action::RenderNeeded]
            }
            InputState::Painting { path, .. } => {
                path.push(world);
                vec![Action::RenderNeeded]
            }
            InputState::DraggingElements { ids, last_screen, total_dx, total_dy } => {
                let dx = (screen_pt.x - last_screen.x) / zoom;
                let dy = (screen_pt.y - last_screen.y) / zoom;
                *last_screen = screen_pt;
                *total_dx += dx;
                *total_dy += dy;
                self.doc.elements.translate(ids, dx, dy);
                vec![Action::RenderNeeded]
            }
            InputState::CreatingShape { id, anchor_world } => {
                let rect = creation_rect(*anchor_world, world, min_size);
                let id = *id;
                self.doc.elements.set_bounds(&id, rect);
                vec![Action::RenderNeeded]
            }
            InputState::Resizing { handle, start_world, originals } => {
                let (dx, dy) = (world.x - start_world.x, world.y - start_world.y);
                for original in originals.iter() {
                    let Some(bounds) = original.bounds() else {
                        continue;
                    };
                    let mut next = original.clone();
                    next.set_bounds(resize::resize(bounds, *handle, dx, dy, min_size));
                    self.doc.elements.replace(next);
                }
                vec![Action::RenderNeeded]
            }
            InputState::Marquee { current_world, .. } => {
                *current_world = world;
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Pointer released: commit the active gesture.
    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        self.last_pointer = Some(screen_pt);
        self.finish_gesture()
    }

    pub fn on_pointer_enter(&mut self, screen_pt: Point) -> Vec<Action> {
        self.last_pointer = Some(screen_pt);
        self.hover(screen_pt)
    }

    /// Pointer left the canvas: the active gesture ends as if released.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.last_pointer = None;
        self.finish_gesture()
    }

    /// Window lost focus: the active gesture ends as if released.
    pub fn on_blur(&mut self) -> Vec<Action> {
        self.finish_gesture()
    }

    /// Ctrl/Meta + wheel zooms at the pointer; a plain wheel pans.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.command() {
            if delta.dy < 0.0 {
                return self.zoom_in(Some(screen_pt));
            }
            if delta.dy > 0.0 {
                return self.zoom_out(Some(screen_pt));
            }
            return Vec::new();
        }
        if delta.dx == 0.0 && delta.dy == 0.0 {
            return Vec::new();
        }
        self.camera.pan_by(-delta.dx, -delta.dy);
        vec![Action::RenderNeeded]
    }

    // --- Keyboard input ---

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        if matches!(key, Key::Shift | Key::Control | Key::Alt | Key::Meta) {
            return Vec::new();
        }
        // Escape aborts whatever modifiers are held.
        if key == Key::Escape {
            return self.run_command(Command::Cancel);
        }
        let combo = KeyCombo::new(key, modifiers);
        match self.keymap.lookup(&combo) {
            Some(command) => self.run_command(command),
            None => Vec::new(),
        }
    }

    pub fn on_key_up(&mut self, _key: Key, _modifiers: Modifiers) -> Vec<Action> {
        Vec::new()
    }

    /// Execute a shortcut command.
    pub fn run_command(&mut self, command: Command) -> Vec<Action> {
        if !self.input.is_idle() && command != Command::Cancel {
            debug!(?command, "command ignored during gesture");
            return Vec::new();
        }
        match command {
            Command::SetMode(mode) => self.set_mode(mode),
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::Delete => self.delete_focused(),
            Command::Copy => self.copy(),
            Command::Paste => self.paste(),
            Command::SelectAll => self.select_all(),
            Command::ZoomIn => self.zoom_in(self.last_pointer),
            Command::ZoomOut => self.zoom_out(self.last_pointer),
            Command::Cancel => {
                if self.input.is_idle() {
                    self.clear_selection()
                } else {
                    self.abort_gesture()
                }
            }
            Command::EditText => self.request_text_edit(),
        }
    }

    fn request_text_edit(&self) -> Vec<Action> {
        let focused = self.doc.elements.focused_ids();
        let [id] = focused.as_slice() else {
            return Vec::new();
        };
        match self.doc.elements.get(id).and_then(|e| e.text.as_ref()) {
            Some(text) => vec![Action::EditTextRequested { id: *id, content: text.content.clone() }],
            None => Vec::new(),
        }
    }

    // --- Gestures ---

    fn begin_paint(&mut self, mode: PaintMode, world: Point) -> Vec<Action> {
        let Some(layer_id) = self.doc.layers.active_id() else {
            return vec![alert_no_active_layer()];
        };
        if mode == PaintMode::Erase && !self.doc.layers.is_visible(&layer_id) {
            debug!(%layer_id, "erase on hidden layer ignored");
            return Vec::new();
        }
        self.input = InputState::Painting { mode, layer_id, path: vec![world] };
        vec![Action::RenderNeeded]
    }

    fn place_text(&mut self, world: Point) -> Vec<Action> {
        let props = ElementProps {
            position: Some(world),
            fill: Some(self.ui.fill.clone()),
            stroke: Some(self.ui.stroke.clone()),
            text: Some(self.config.default_text.clone()),
            ..Default::default()
        };
        let id = match self.add_element(ElementKind::Text, props) {
            Ok(id) => id,
            Err(EditorError::NoActiveLayer) => return vec![alert_no_active_layer()],
            Err(err) => {
                error!(%err, "text placement failed");
                return vec![Action::Alert(err.to_string())];
            }
        };
        self.doc.elements.unfocus_all();
        self.doc.elements.focus(&[id]);
        vec![
            Action::DocumentChanged,
            Action::RenderNeeded,
            Action::EditTextRequested { id, content: self.config.default_text.content.clone() },
        ]
    }

    fn begin_element_gesture(&mut self, screen_pt: Point, world: Point) -> Vec<Action> {
        let hit = hit::hit_test(&self.doc, &self.camera, world, self.config.handle_radius_px);
        match hit {
            Some(h) => match h.part {
                HitPart::ResizeHandle(handle) => {
                    let ids = self.doc.elements.focused_ids();
                    self.input = InputState::Resizing {
                        handle,
                        start_world: world,
                        originals: self.clone_elements(&ids),
                    };
                    Vec::new()
                }
                HitPart::Body if h.focused => {
                    self.begin_drag(screen_pt);
                    Vec::new()
                }
                HitPart::Body if self.ui.mode == Mode::Select => {
                    self.doc.elements.unfocus_all();
                    self.doc.elements.focus(&[h.element_id]);
                    self.begin_drag(screen_pt);
                    vec![Action::RenderNeeded]
                }
                HitPart::Body => self.begin_shape(world),
            },
            None if self.ui.mode == Mode::Shapes => self.begin_shape(world),
            None => {
                self.doc.elements.unfocus_all();
                self.input = InputState::Marquee { anchor_world: world, current_world: world };
                vec![Action::RenderNeeded]
            }
        }
    }

    fn begin_drag(&mut self, screen_pt: Point) {
        self.input = InputState::DraggingElements {
            ids: self.doc.elements.focused_ids(),
            last_screen: screen_pt,
            total_dx: 0.0,
            total_dy: 0.0,
        };
    }

    fn begin_shape(&mut self, world: Point) -> Vec<Action> {
        let min = self.config.min_shape_size;
        let props = ElementProps {
            layer_id: self.doc.layers.active_id(),
            position: Some(world),
            width: Some(min),
            height: Some(min),
            fill: Some(self.ui.fill.clone()),
            stroke: Some(self.ui.stroke.clone()),
            ..Default::default()
        };
        let Ok(id) = self.doc.elements.create(self.ui.shape.element_kind(), props) else {
            return vec![alert_no_active_layer()];
        };
        self.doc.elements.unfocus_all();
        self.input = InputState::CreatingShape { id, anchor_world: world };
        vec![Action::RenderNeeded]
    }

    /// End the active gesture, recording its history action.
    fn finish_gesture(&mut self) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        let mut actions = match state {
            InputState::Idle => return Vec::new(),
            InputState::Panning { .. } => vec![Action::RenderNeeded],
            InputState::Painting { mode, layer_id, path } => self.commit_paint(mode, layer_id, path),
            InputState::DraggingElements { ids, total_dx, total_dy, .. } => {
                if total_dx == 0.0 && total_dy == 0.0 {
                    Vec::new()
                } else {
                    self.history.push(HistoryAction::MoveElements { ids, dx: total_dx, dy: total_dy });
                    vec![Action::DocumentChanged, Action::RenderNeeded]
                }
            }
            InputState::CreatingShape { id, .. } => {
                self.doc.elements.focus(&[id]);
                self.record_created(&[id]);
                vec![Action::DocumentChanged, Action::RenderNeeded]
            }
            InputState::Resizing { originals, .. } => {
                let ids: Vec<ElementId> = originals.iter().map(|e| e.id).collect();
                let after = self.clone_elements(&ids);
                if after == originals {
                    Vec::new()
                } else {
                    self.history.push(HistoryAction::PropertyChange { before: originals, after });
                    vec![Action::DocumentChanged, Action::RenderNeeded]
                }
            }
            InputState::Marquee { anchor_world, current_world } => {
                let rect = Rect::from_corners(anchor_world, current_world);
                let ids = hit::elements_in_rect(&self.doc, &rect);
                self.doc.elements.focus(&ids);
                vec![Action::RenderNeeded]
            }
        };
        if let Some(point) = self.last_pointer {
            actions.extend(self.hover(point));
        } else {
            actions.extend(self.set_cursor(self.ui.mode.cursor()));
        }
        actions
    }

    /// Drop the active gesture and undo its visual effects without recording.
    fn abort_gesture(&mut self) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        match state {
            InputState::Idle => return Vec::new(),
            InputState::Panning { .. } | InputState::Painting { .. } | InputState::Marquee { .. } => {}
            InputState::DraggingElements { ids, total_dx, total_dy, .. } => {
                self.doc.elements.translate(&ids, -total_dx, -total_dy);
            }
            InputState::CreatingShape { id, .. } => {
                self.doc.elements.delete(&[id]);
            }
            InputState::Resizing { originals, .. } => {
                for original in originals {
                    self.doc.elements.replace(original);
                }
            }
        }
        debug!("gesture aborted");
        let mut actions = vec![Action::RenderNeeded];
        actions.extend(self.set_cursor(self.ui.mode.cursor()));
        actions
    }

    fn commit_paint(&mut self, mode: PaintMode, layer_id: LayerId, path: Vec<Point>) -> Vec<Action> {
        if self.doc.layers.get(&layer_id).is_none() {
            error!(%layer_id, "paint target layer vanished before commit");
            return vec![alert_no_active_layer(), Action::RenderNeeded];
        }
        let strength = match mode {
            PaintMode::Draw => self.config.brush_strength,
            PaintMode::Erase => self.config.eraser_radius,
        };
        let stroke = StrokeRecord::new(mode, path, self.ui.stroke.clone(), strength);
        self.history.commit(&mut self.doc, HistoryAction::Stroke { layer_id, stroke });
        vec![Action::DocumentChanged, Action::RenderNeeded]
    }

    fn hover(&mut self, screen_pt: Point) -> Vec<Action> {
        let cursor = if self.ui.mode.manipulates_elements() {
            let world = self.camera.screen_to_world(screen_pt);
            match hit::hit_test(&self.doc, &self.camera, world, self.config.handle_radius_px) {
                Some(h) => match h.part {
                    HitPart::ResizeHandle(handle) => handle.cursor(),
                    HitPart::Body if h.focused => "move",
                    HitPart::Body => self.ui.mode.cursor(),
                },
                None => self.ui.mode.cursor(),
            }
        } else {
            self.ui.mode.cursor()
        };
        self.set_cursor(cursor).into_iter().collect()
    }

    fn set_cursor(&mut self, cursor: &str) -> Option<Action> {
        if self.ui.cursor == cursor {
            return None;
        }
        self.ui.cursor = cursor.to_string();
        Some(Action::SetCursor(self.ui.cursor.clone()))
    }
}

/// Bounding box of a drag-created shape: from the anchor toward the pointer,
/// at least `min_size` on each axis.
fn creation_rect(anchor: Point, pointer: Point, min_size: f64) -> Rect {
    let width = (pointer.x - anchor.x).abs().max(min_size);
    let height = (pointer.y - anchor.y).abs().max(min_size);
    let x = if pointer.x < anchor.x { anchor.x - width } else { anchor.x };
    let y = if pointer.y < anchor.y { anchor.y - height } else { anchor.y };
    Rect { x, y, width, height }
}

fn alert_no_active_layer() -> Action {
    error!("no active layer");
    Action::Alert(NO_ACTIVE_LAYER_ALERT.to_string())
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas
/// elements.
///
/// The main canvas carries selection UI and in-progress gestures. Each layer
/// can be given its own canvas with [`Engine::attach_layer_canvas`]; layers
/// without one are drawn in isolation on an offscreen canvas and composited
/// onto the main canvas.
pub struct Engine {
    canvas: HtmlCanvasElement,
    layer_canvases: HashMap<LayerId, HtmlCanvasElement>,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, config: EditorConfig) -> Self {
        Self { canvas, layer_canvases: HashMap::new(), core: EngineCore::new(config) }
    }

    pub fn attach_layer_canvas(&mut self, id: LayerId, canvas: HtmlCanvasElement) {
        self.layer_canvases.insert(id, canvas);
    }

    pub fn detach_layer_canvas(&mut self, id: &LayerId) -> Option<HtmlCanvasElement> {
        self.layer_canvases.remove(id)
    }

    /// Convert client coordinates to canvas space using a fresh measurement.
    #[must_use]
    pub fn to_canvas(&self, client_x: f64, client_y: f64) -> Point {
        to_canvas_space(client_x, client_y, &CanvasMetrics::measure(&self.canvas))
    }

    /// Re-read the canvas backing-store size into the viewport.
    pub fn sync_viewport(&mut self) -> Vec<Action> {
        let metrics = CanvasMetrics::measure(&self.canvas);
        self.core.set_viewport(metrics.pixel_width, metrics.pixel_height)
    }

    // --- Input events (client coordinates) ---

    pub fn on_pointer_down(&mut self, client_x: f64, client_y: f64, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let pt = self.to_canvas(client_x, client_y);
        self.core.on_pointer_down(pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, client_x: f64, client_y: f64, buttons: Buttons, modifiers: Modifiers) -> Vec<Action> {
        let pt = self.to_canvas(client_x, client_y);
        self.core.on_pointer_move(pt, buttons, modifiers)
    }

    pub fn on_pointer_up(&mut self, client_x: f64, client_y: f64, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let pt = self.to_canvas(client_x, client_y);
        self.core.on_pointer_up(pt, button, modifiers)
    }

    pub fn on_pointer_enter(&mut self, client_x: f64, client_y: f64) -> Vec<Action> {
        let pt = self.to_canvas(client_x, client_y);
        self.core.on_pointer_enter(pt)
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.on_pointer_leave()
    }

    pub fn on_blur(&mut self) -> Vec<Action> {
        self.core.on_blur()
    }

    pub fn on_wheel(&mut self, client_x: f64, client_y: f64, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        let pt = self.to_canvas(client_x, client_y);
        self.core.on_wheel(pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: &str, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(Key::from_browser(key), modifiers)
    }

    pub fn on_key_up(&mut self, key: &str, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_up(Key::from_browser(key), modifiers)
    }

    // --- Render ---

    /// Draw every layer canvas and the main canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a 2D context is unavailable or a `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let main = match render::context_2d(&self.canvas) {
            Ok(ctx) => ctx,
            Err(err) => {
                error!("main canvas has no 2d context");
                return Err(err);
            }
        };
        let core = &self.core;
        let (w, h) = (core.viewport_width, core.viewport_height);
        render::clear(&main, w, h)?;

        let scratch = if render::shares_main_canvas(&core.doc.layers, |id| self.layer_canvases.contains_key(id)) {
            Some(render::offscreen_canvas(self.canvas.width(), self.canvas.height())?)
        } else {
            None
        };
        for layer in core.doc.layers.iter().rev() {
            match (self.layer_canvases.get(&layer.id), &scratch) {
                (Some(canvas), _) => {
                    let ctx = render::context_2d(canvas)?;
                    render::clear(&ctx, w, h)?;
                    render::draw_layer(&ctx, &core.doc, layer, &core.camera)?;
                }
                (None, Some(scratch)) => render::composite_layer(&main, scratch, &core.doc, layer, &core.camera)?,
                (None, None) => {}
            }
        }
        render::draw_overlay(&main, &core.doc, &core.camera, &core.input, &core.ui, &core.config)
    }
}
