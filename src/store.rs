//! Persistence seam.
//!
//! A [`DocumentStore`] is an explicitly constructed key-value store with an
//! `open`/`close` lifecycle: layer records keyed by layer id, element records
//! keyed by element id, both written by bulk upsert and read back as
//! `(key, record)` entries. The store is passed to [`save`] and [`load`]
//! rather than reached through global state.
//!
//! [`MemoryStore`] keeps JSON-encoded records in memory. It is what the tests
//! use, and what a browser host can use until its IndexedDB-backed store is
//! ready.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::document::{Document, DocumentSnapshot};
use crate::element::{Element, ElementId};
use crate::layer::{Layer, LayerId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store is not open")]
    Closed,
    #[error("serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A layer record plus its index in the stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLayer {
    pub position: usize,
    pub layer: Layer,
}

/// An element record plus its index in the element store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredElement {
    pub position: usize,
    pub element: Element,
}

pub trait DocumentStore {
    /// Acquire the underlying handle. Opening an open store is a no-op.
    ///
    /// # Errors
    ///
    /// Backend-specific failure to acquire the handle.
    fn open(&mut self) -> Result<(), StoreError>;

    /// Release the handle. Later reads and writes fail with
    /// [`StoreError::Closed`] until reopened.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Remove every record.
    ///
    /// # Errors
    ///
    /// [`StoreError::Closed`] when the store is not open.
    fn clear(&mut self) -> Result<(), StoreError>;

    /// Insert or replace layer records by id.
    ///
    /// # Errors
    ///
    /// [`StoreError::Closed`], or [`StoreError::Serialize`] if a record fails
    /// to encode.
    fn upsert_layers(&mut self, layers: &[StoredLayer]) -> Result<(), StoreError>;

    /// Insert or replace element records by id.
    ///
    /// # Errors
    ///
    /// [`StoreError::Closed`], or [`StoreError::Serialize`] if a record fails
    /// to encode.
    fn upsert_elements(&mut self, elements: &[StoredElement]) -> Result<(), StoreError>;

    /// Every layer record as `(id, record)`. Undecodable records are skipped.
    ///
    /// # Errors
    ///
    /// [`StoreError::Closed`] when the store is not open.
    fn layers(&self) -> Result<Vec<(LayerId, StoredLayer)>, StoreError>;

    /// Every element record as `(id, record)`. Undecodable records are skipped.
    ///
    /// # Errors
    ///
    /// [`StoreError::Closed`] when the store is not open.
    fn elements(&self) -> Result<Vec<(ElementId, StoredElement)>, StoreError>;
}

/// In-memory store holding JSON-encoded records.
#[derive(Debug, Default)]
pub struct MemoryStore {
    open: bool,
    layers: HashMap<Uuid, String>,
    elements: HashMap<Uuid, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a raw element record. Used to simulate corrupt storage.
    pub fn put_raw_element(&mut self, id: ElementId, raw: impl Into<String>) {
        self.elements.insert(id, raw.into());
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.open { Ok(()) } else { Err(StoreError::Closed) }
    }
}

impl DocumentStore for MemoryStore {
    fn open(&mut self) -> Result<(), StoreError> {
        if !self.open {
            self.open = true;
            info!("memory store opened");
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            info!("memory store closed");
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.layers.clear();
        self.elements.clear();
        Ok(())
    }

    fn upsert_layers(&mut self, layers: &[StoredLayer]) -> Result<(), StoreError> {
        self.ensure_open()?;
        for record in layers {
            self.layers.insert(record.layer.id, serde_json::to_string(record)?);
        }
        Ok(())
    }

    fn upsert_elements(&mut self, elements: &[StoredElement]) -> Result<(), StoreError> {
        self.ensure_open()?;
        for record in elements {
            self.elements.insert(record.element.id, serde_json::to_string(record)?);
        }
        Ok(())
    }

    fn layers(&self) -> Result<Vec<(LayerId, StoredLayer)>, StoreError> {
        self.ensure_open()?;
        Ok(decode_entries(&self.layers, "layer"))
    }

    fn elements(&self) -> Result<Vec<(ElementId, StoredElement)>, StoreError> {
        self.ensure_open()?;
        Ok(decode_entries(&self.elements, "element"))
    }
}

fn decode_entries<T>(records: &HashMap<Uuid, String>, what: &str) -> Vec<(Uuid, T)>
where
    T: for<'de> Deserialize<'de>,
{
    records
        .iter()
        .filter_map(|(id, raw)| match serde_json::from_str::<T>(raw) {
            Ok(record) => Some((*id, record)),
            Err(err) => {
                warn!(%id, %err, what, "skipping undecodable record");
                None
            }
        })
        .collect()
}

/// Replace the store's contents with `doc`.
///
/// # Errors
///
/// Any [`StoreError`] from the backend.
pub fn save<S: DocumentStore + ?Sized>(doc: &Document, store: &mut S) -> Result<(), StoreError> {
    let snapshot = doc.snapshot();
    let layers: Vec<StoredLayer> = snapshot
        .layers
        .into_iter()
        .enumerate()
        .map(|(position, layer)| StoredLayer { position, layer })
        .collect();
    let elements: Vec<StoredElement> = snapshot
        .elements
        .into_iter()
        .enumerate()
        .map(|(position, element)| StoredElement { position, element })
        .collect();
    store.clear()?;
    store.upsert_layers(&layers)?;
    store.upsert_elements(&elements)?;
    info!(layers = layers.len(), elements = elements.len(), "document saved");
    Ok(())
}

/// Read every record and rebuild a repaired document.
///
/// # Errors
///
/// Any [`StoreError`] from the backend.
pub fn load<S: DocumentStore + ?Sized>(store: &S) -> Result<Document, StoreError> {
    let mut layers = store.layers()?;
    let mut elements = store.elements()?;
    layers.sort_by_key(|(_, r)| r.position);
    elements.sort_by_key(|(_, r)| r.position);
    let snapshot = DocumentSnapshot {
        layers: layers.into_iter().map(|(_, r)| r.layer).collect(),
        elements: elements.into_iter().map(|(_, r)| r.element).collect(),
    };
    Ok(Document::from_snapshot(snapshot))
}
