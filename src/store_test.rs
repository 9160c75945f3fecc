use super::*;
use crate::camera::Point;
use crate::element::{ElementKind, ElementProps};

fn sample_doc() -> Document {
    let mut doc = Document::with_default_layer(Some("Ink"));
    let top = doc.layers.active_id().unwrap();
    let bottom = doc.layers.create(Some("Paper"), None);
    for (layer, x) in [(top, 1.0), (bottom, 2.0), (top, 3.0)] {
        doc.elements
            .create(
                ElementKind::Rectangle,
                ElementProps { layer_id: Some(layer), position: Some(Point::new(x, x)), ..Default::default() },
            )
            .unwrap();
    }
    doc
}

fn open_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.open().unwrap();
    store
}

// =============================================================
// Lifecycle
// =============================================================

#[test]
fn new_store_is_closed() {
    let store = MemoryStore::new();
    assert!(!store.is_open());
    assert!(matches!(store.layers(), Err(StoreError::Closed)));
}

#[test]
fn open_is_idempotent() {
    let mut store = open_store();
    store.open().unwrap();
    assert!(store.is_open());
}

#[test]
fn closed_store_refuses_writes() {
    let mut store = open_store();
    store.close();
    assert!(matches!(store.upsert_elements(&[]), Err(StoreError::Closed)));
    assert!(matches!(save(&sample_doc(), &mut store), Err(StoreError::Closed)));
}

#[test]
fn reopen_keeps_records() {
    let mut store = open_store();
    save(&sample_doc(), &mut store).unwrap();
    store.close();
    store.open().unwrap();
    assert_eq!(store.elements().unwrap().len(), 3);
}

// =============================================================
// Upsert / fetch
// =============================================================

#[test]
fn upsert_replaces_by_id() {
    let mut store = open_store();
    let mut layer = Layer::new(Uuid::new_v4(), "A");
    store.upsert_layers(&[StoredLayer { position: 0, layer: layer.clone() }]).unwrap();
    layer.name = "B".into();
    store.upsert_layers(&[StoredLayer { position: 0, layer: layer.clone() }]).unwrap();
    let entries = store.layers().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, layer.id);
    assert_eq!(entries[0].1.layer.name, "B");
}

#[test]
fn corrupt_record_is_skipped() {
    let mut store = open_store();
    save(&sample_doc(), &mut store).unwrap();
    store.put_raw_element(Uuid::new_v4(), "{not json");
    assert_eq!(store.elements().unwrap().len(), 3);
}

// =============================================================
// save / load
// =============================================================

#[test]
fn save_then_load_preserves_document() {
    let doc = sample_doc();
    let mut store = open_store();
    save(&doc, &mut store).unwrap();
    assert_eq!(load(&store).unwrap(), doc);
}

#[test]
fn save_drops_records_no_longer_present() {
    let mut doc = sample_doc();
    let mut store = open_store();
    save(&doc, &mut store).unwrap();
    let first = doc.elements.iter().next().unwrap().id;
    doc.elements.delete(&[first]);
    save(&doc, &mut store).unwrap();
    assert_eq!(store.elements().unwrap().len(), 2);
}

#[test]
fn load_empty_store_gives_default_layer() {
    let store = open_store();
    let doc = load(&store).unwrap();
    assert_eq!(doc.layers.len(), 1);
    assert!(doc.elements.is_empty());
}

#[test]
fn store_works_through_trait_object() {
    let doc = sample_doc();
    let mut store: Box<dyn DocumentStore> = Box::new(open_store());
    save(&doc, store.as_mut()).unwrap();
    assert_eq!(load(store.as_ref()).unwrap().layers.len(), 2);
}
