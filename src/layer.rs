//! Layer model: ordered layers with a single active layer and a raster
//! backing recorded as paint operations.
//!
//! Index 0 of a [`LayerStack`] is the top of the stack (drawn last). "Move up"
//! swaps a layer toward index 0.
//!
//! A layer's raster is the ordered list of [`StrokeRecord`]s painted onto it.
//! Replaying the list onto a blank surface reproduces the pixels, and undoing
//! a stroke removes its record, so history never needs pixel snapshots.

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::DEFAULT_LAYER_NAME;

/// Unique identifier for a layer.
pub type LayerId = Uuid;

/// Whether a stroke adds paint or clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintMode {
    Draw,
    Erase,
}

/// One freehand stroke painted into a layer's raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecord {
    pub id: Uuid,
    pub mode: PaintMode,
    /// World-space polyline.
    pub path: Vec<Point>,
    pub color: String,
    /// Line width for draw strokes, radius for erase strokes.
    pub strength: f64,
}

impl StrokeRecord {
    #[must_use]
    pub fn new(mode: PaintMode, path: Vec<Point>, color: impl Into<String>, strength: f64) -> Self {
        Self { id: Uuid::new_v4(), mode, path, color: color.into(), strength }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub active: bool,
    pub hidden: bool,
    /// Paint operations in the order they were applied.
    #[serde(default)]
    pub raster: Vec<StrokeRecord>,
}

impl Layer {
    #[must_use]
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), active: false, hidden: false, raster: Vec::new() }
    }

    /// Append a paint operation.
    pub fn paint(&mut self, stroke: StrokeRecord) {
        self.raster.push(stroke);
    }

    /// Remove the paint operation with `stroke_id`. Returns it if present.
    pub fn unpaint(&mut self, stroke_id: &Uuid) -> Option<StrokeRecord> {
        let index = self.raster.iter().position(|s| s.id == *stroke_id)?;
        Some(self.raster.remove(index))
    }
}

/// Ordered layers. Whenever the stack is non-empty exactly one layer is active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stack from loaded layers, repairing the active flag.
    #[must_use]
    pub fn from_layers(layers: Vec<Layer>) -> Self {
        let mut stack = Self { layers };
        stack.ensure_active();
        stack
    }

    /// Append a new layer at the bottom of the order.
    ///
    /// Blank or absent names become the default name. A requested id already
    /// in use is replaced by a fresh one. The first layer of an empty stack
    /// starts active; every later layer starts inactive.
    pub fn create(&mut self, name: Option<&str>, id: Option<LayerId>) -> LayerId {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => DEFAULT_LAYER_NAME.to_string(),
        };
        let id = match id {
            Some(id) if self.index_of(&id).is_some() => {
                warn!(%id, "layer id already in use; assigning a fresh one");
                Uuid::new_v4()
            }
            Some(id) => id,
            None => Uuid::new_v4(),
        };
        let mut layer = Layer::new(id, name);
        layer.active = self.layers.is_empty();
        self.layers.push(layer);
        id
    }

    /// Make `id` the active layer, clearing the flag on the previous holder.
    /// Returns false if `id` is unknown.
    pub fn toggle_active(&mut self, id: &LayerId) -> bool {
        if self.index_of(id).is_none() {
            debug!(%id, "toggle_active on unknown layer");
            return false;
        }
        for layer in &mut self.layers {
            layer.active = layer.id == *id;
        }
        true
    }

    /// Swap with the layer above (toward index 0). No-op at the top.
    pub fn move_up(&mut self, id: &LayerId) -> bool {
        match self.index_of(id) {
            Some(index) if index > 0 => {
                self.layers.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    /// Swap with the layer below. No-op at the bottom.
    pub fn move_down(&mut self, id: &LayerId) -> bool {
        match self.index_of(id) {
            Some(index) if index + 1 < self.layers.len() => {
                self.layers.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    /// Move the layer `id` to `to` (clamped), shifting the others.
    pub fn move_to(&mut self, id: &LayerId, to: usize) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let to = to.min(self.layers.len() - 1);
        if from == to {
            return false;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        true
    }

    /// Remove a layer. Refuses to remove the last one. If the removed layer
    /// was active, the new first layer becomes active. Returns the removed
    /// layer with its former index.
    pub fn remove(&mut self, id: &LayerId) -> Option<(usize, Layer)> {
        if self.layers.len() <= 1 {
            debug!(%id, "refusing to remove the last layer");
            return None;
        }
        self.take(id)
    }

    /// Remove a layer without the last-layer rule. Used when reverting the
    /// creation of the only layer.
    pub(crate) fn take(&mut self, id: &LayerId) -> Option<(usize, Layer)> {
        let index = self.index_of(id)?;
        let layer = self.layers.remove(index);
        if layer.active {
            self.ensure_active();
        }
        Some((index, layer))
    }

    /// Insert a layer at `index` (clamped). An inserted active layer takes the
    /// active flag from the current holder.
    pub fn insert_at(&mut self, index: usize, layer: Layer) {
        let index = index.min(self.layers.len());
        let id = layer.id;
        let active = layer.active;
        self.layers.insert(index, layer);
        if active {
            self.toggle_active(&id);
        } else {
            self.ensure_active();
        }
    }

    /// Rename a layer. Empty or whitespace-only names are refused.
    pub fn rename(&mut self, id: &LayerId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            debug!(%id, "refusing empty layer name");
            return false;
        }
        match self.get_mut(id) {
            Some(layer) if layer.name != name => {
                layer.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    /// Flip `hidden`. Returns the new value, or `None` for an unknown id.
    pub fn toggle_visibility(&mut self, id: &LayerId) -> Option<bool> {
        let layer = self.get_mut(id)?;
        layer.hidden = !layer.hidden;
        Some(layer.hidden)
    }

    /// Restore the single-active invariant: keep the first active layer,
    /// clear any others, and activate the first layer if none is active.
    pub fn ensure_active(&mut self) {
        let mut seen = false;
        for layer in &mut self.layers {
            if layer.active {
                if seen {
                    warn!(id = %layer.id, "clearing duplicate active flag");
                    layer.active = false;
                }
                seen = true;
            }
        }
        if !seen {
            if let Some(first) = self.layers.first_mut() {
                first.active = true;
            }
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<&Layer> {
        self.layers.iter().find(|l| l.active)
    }

    #[must_use]
    pub fn active_id(&self) -> Option<LayerId> {
        self.active().map(|l| l.id)
    }

    #[must_use]
    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == *id)
    }

    pub fn get_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == *id)
    }

    #[must_use]
    pub fn index_of(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == *id)
    }

    /// Whether `id` exists and is not hidden.
    #[must_use]
    pub fn is_visible(&self, id: &LayerId) -> bool {
        self.get(id).is_some_and(|l| !l.hidden)
    }

    /// Layers top (index 0) to bottom.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> {
        self.layers.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
