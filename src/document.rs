//! Document: the layer stack plus the element store.
//!
//! A [`DocumentSnapshot`] is the serializable `{layers, elements}` pair handed
//! to persistence. Loading a snapshot repairs anything that would break a
//! model invariant instead of rejecting the whole document.

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::element::{Element, ElementStore};
use crate::layer::{Layer, LayerId, LayerStack};

/// Layers and elements that make up one drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub layers: LayerStack,
    pub elements: ElementStore,
}

/// Point-in-time copy of a document for persistence and export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub layers: Vec<Layer>,
    pub elements: Vec<Element>,
}

impl Document {
    /// An empty document with no layers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A document with one active layer of the given name.
    #[must_use]
    pub fn with_default_layer(name: Option<&str>) -> Self {
        let mut doc = Self::new();
        doc.layers.create(name, None);
        doc
    }

    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            layers: self.layers.as_slice().to_vec(),
            elements: self.elements.as_slice().to_vec(),
        }
    }

    /// Build a document from a loaded snapshot.
    ///
    /// Repairs applied, in order:
    /// - an empty layer list gets one default layer
    /// - the active flag is normalized to exactly one layer
    /// - elements failing the text invariant are dropped
    /// - elements on unknown layers are reassigned to the active layer
    /// - focus is cleared
    #[must_use]
    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Self {
        let mut layers = LayerStack::from_layers(snapshot.layers);
        if layers.is_empty() {
            warn!("snapshot has no layers; creating a default layer");
            layers.create(None, None);
        }

        let elements: Vec<Element> = snapshot
            .elements
            .into_iter()
            .filter(|e| match e.validate() {
                Ok(()) => true,
                Err(err) => {
                    warn!(id = %e.id, %err, "dropping invalid element from snapshot");
                    false
                }
            })
            .map(|mut e| {
                e.focused = false;
                e
            })
            .collect();

        let mut doc = Self { layers, elements: ElementStore::from_elements(elements) };
        doc.repair_orphans();
        info!(layers = doc.layers.len(), elements = doc.elements.len(), "document loaded");
        doc
    }

    /// Reassign elements whose layer no longer exists to the active layer.
    /// Returns how many were reassigned.
    pub fn repair_orphans(&mut self) -> usize {
        let Some(active) = self.layers.active_id() else {
            return 0;
        };
        let orphaned_layers: Vec<LayerId> = {
            let mut ids: Vec<LayerId> = self
                .elements
                .iter()
                .map(|e| e.layer_id)
                .filter(|id| self.layers.get(id).is_none())
                .collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        let mut count = 0;
        for layer_id in &orphaned_layers {
            count += self.elements.reassign_layer(layer_id, active);
        }
        if count > 0 {
            warn!(count, %active, "reassigned orphaned elements to the active layer");
        }
        count
    }

    /// Whether the element's layer exists and is visible.
    #[must_use]
    pub fn is_element_visible(&self, element: &Element) -> bool {
        self.layers.is_visible(&element.layer_id)
    }

    /// Elements on visible layers in hit-test order: topmost layer first, and
    /// within a layer the most recently drawn first.
    pub fn elements_top_down(&self) -> impl Iterator<Item = &Element> {
        self.layers
            .iter()
            .filter(|l| !l.hidden)
            .flat_map(move |layer| self.elements.iter().rev().filter(move |e| e.layer_id == layer.id))
    }

    /// Elements on visible layers in paint order: bottom layer first.
    pub fn elements_bottom_up(&self) -> impl Iterator<Item = &Element> {
        self.layers
            .iter()
            .rev()
            .filter(|l| !l.hidden)
            .flat_map(move |layer| self.elements.iter().filter(move |e| e.layer_id == layer.id))
    }
}
