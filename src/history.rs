//! Undo/redo history.
//!
//! Every recorded mutation is a [`HistoryAction`] that knows how to re-apply
//! and revert itself against a [`Document`]. [`History`] keeps two bounded
//! stacks: recording a new action evicts the oldest undo entry past capacity
//! and always discards the redo stack.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use tracing::debug;

use crate::document::Document;
use crate::element::{Element, ElementId};
use crate::layer::{Layer, LayerId, StrokeRecord};

/// One reversible mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryAction {
    /// A draw or erase stroke painted into a layer's raster.
    Stroke { layer_id: LayerId, stroke: StrokeRecord },
    /// Cumulative world-space translation of a set of elements.
    MoveElements { ids: Vec<ElementId>, dx: f64, dy: f64 },
    /// Full before/after records of every changed element.
    PropertyChange { before: Vec<Element>, after: Vec<Element> },
    /// Elements added, with their indices in the element store.
    CreateElements { elements: Vec<(usize, Element)> },
    /// Elements removed, with the indices they occupied.
    DeleteElements { removed: Vec<(usize, Element)> },
    CreateLayer { index: usize, layer: Layer },
    /// A removed layer together with the elements it owned.
    RemoveLayer { index: usize, layer: Layer, elements: Vec<(usize, Element)> },
    RenameLayer { id: LayerId, before: String, after: String },
    ReorderLayer { id: LayerId, from: usize, to: usize },
}

impl HistoryAction {
    /// Short name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stroke { .. } => "stroke",
            Self::MoveElements { .. } => "move_element",
            Self::PropertyChange { .. } => "property_change",
            Self::CreateElements { .. } => "create",
            Self::DeleteElements { .. } => "delete",
            Self::CreateLayer { .. } => "create_layer",
            Self::RemoveLayer { .. } => "remove_layer",
            Self::RenameLayer { .. } => "rename_layer",
            Self::ReorderLayer { .. } => "reorder_layer",
        }
    }

    /// Perform the mutation forward.
    pub fn apply(&self, doc: &mut Document) {
        match self {
            Self::Stroke { layer_id, stroke } => {
                if let Some(layer) = doc.layers.get_mut(layer_id) {
                    layer.paint(stroke.clone());
                }
            }
            Self::MoveElements { ids, dx, dy } => doc.elements.translate(ids, *dx, *dy),
            Self::PropertyChange { after, .. } => replace_elements(doc, after),
            Self::CreateElements { elements } => restore_elements(doc, elements),
            Self::DeleteElements { removed } => {
                doc.elements.delete(&element_ids(removed));
            }
            Self::CreateLayer { index, layer } => doc.layers.insert_at(*index, layer.clone()),
            Self::RemoveLayer { layer, elements, .. } => {
                doc.elements.delete(&element_ids(elements));
                doc.layers.take(&layer.id);
            }
            Self::RenameLayer { id, after, .. } => {
                doc.layers.rename(id, after);
            }
            Self::ReorderLayer { id, to, .. } => {
                doc.layers.move_to(id, *to);
            }
        }
    }

    /// Undo the mutation.
    pub fn revert(&self, doc: &mut Document) {
        match self {
            Self::Stroke { layer_id, stroke } => {
                if let Some(layer) = doc.layers.get_mut(layer_id) {
                    layer.unpaint(&stroke.id);
                }
            }
            Self::MoveElements { ids, dx, dy } => doc.elements.translate(ids, -dx, -dy),
            Self::PropertyChange { before, .. } => replace_elements(doc, before),
            Self::CreateElements { elements } => {
                doc.elements.delete(&element_ids(elements));
            }
            Self::DeleteElements { removed } => restore_elements(doc, removed),
            Self::CreateLayer { layer, .. } => {
                doc.layers.take(&layer.id);
            }
            Self::RemoveLayer { index, layer, elements } => {
                doc.layers.insert_at(*index, layer.clone());
                restore_elements(doc, elements);
            }
            Self::RenameLayer { id, before, .. } => {
                doc.layers.rename(id, before);
            }
            Self::ReorderLayer { id, from, .. } => {
                doc.layers.move_to(id, *from);
            }
        }
    }
}

fn element_ids(entries: &[(usize, Element)]) -> Vec<ElementId> {
    entries.iter().map(|(_, e)| e.id).collect()
}

/// Swap in recorded element state. Selection is not part of the record; each
/// element keeps its live `focused` flag.
fn replace_elements(doc: &mut Document, recorded: &[Element]) {
    for e in recorded {
        let mut next = e.clone();
        next.focused = doc.elements.get(&e.id).is_some_and(|live| live.focused);
        doc.elements.replace(next);
    }
}

/// Re-insert elements at their recorded indices, unselected. Entries are
/// ascending by index, so inserting in order reproduces the original
/// positions.
fn restore_elements(doc: &mut Document, entries: &[(usize, Element)]) {
    for (index, e) in entries {
        let mut restored = e.clone();
        restored.focused = false;
        doc.elements.insert_at(*index, restored);
    }
}

/// Bounded undo/redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<HistoryAction>,
    redo: VecDeque<HistoryAction>,
    capacity: usize,
}

impl History {
    /// A history holding at most `capacity` undo entries (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { undo: VecDeque::with_capacity(capacity), redo: VecDeque::new(), capacity }
    }

    /// Record an action whose mutation has already been applied.
    pub fn push(&mut self, action: HistoryAction) {
        debug!(kind = action.kind(), "history push");
        self.undo.push_back(action);
        self.redo.clear();
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }

    /// Apply `action` to `doc` and record it.
    pub fn commit(&mut self, doc: &mut Document, action: HistoryAction) {
        action.apply(doc);
        self.push(action);
    }

    /// Revert the most recent action. Returns false when there is nothing to
    /// undo.
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        let Some(action) = self.undo.pop_back() else {
            debug!("undo with empty stack");
            return false;
        };
        action.revert(doc);
        debug!(kind = action.kind(), "undo");
        self.redo.push_back(action);
        true
    }

    /// Re-apply the most recently undone action. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        let Some(action) = self.redo.pop_back() else {
            debug!("redo with empty stack");
            return false;
        };
        action.apply(doc);
        debug!(kind = action.kind(), "redo");
        self.undo.push_back(action);
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries on the undo stack, oldest first.
    pub fn undo_entries(&self) -> impl Iterator<Item = &HistoryAction> {
        self.undo.iter()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
