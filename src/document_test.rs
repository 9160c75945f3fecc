use uuid::Uuid;

use super::*;
use crate::camera::Point;
use crate::element::{ElementKind, ElementProps, TextProps};

fn add_rect(doc: &mut Document, layer_id: LayerId) -> Uuid {
    doc.elements
        .create(
            ElementKind::Rectangle,
            ElementProps { layer_id: Some(layer_id), position: Some(Point::new(0.0, 0.0)), ..Default::default() },
        )
        .unwrap()
}

#[test]
fn with_default_layer_has_one_active() {
    let doc = Document::with_default_layer(Some("Background"));
    assert_eq!(doc.layers.len(), 1);
    assert_eq!(doc.layers.active().unwrap().name, "Background");
}

#[test]
fn snapshot_round_trips_through_json() {
    let mut doc = Document::with_default_layer(None);
    let layer = doc.layers.active_id().unwrap();
    add_rect(&mut doc, layer);
    let json = serde_json::to_string(&doc.snapshot()).unwrap();
    let restored = Document::from_snapshot(serde_json::from_str(&json).unwrap());
    assert_eq!(restored, doc);
}

#[test]
fn from_empty_snapshot_creates_layer() {
    let doc = Document::from_snapshot(DocumentSnapshot::default());
    assert_eq!(doc.layers.len(), 1);
    assert!(doc.layers.active().is_some());
}

#[test]
fn from_snapshot_reassigns_orphans() {
    let mut source = Document::with_default_layer(None);
    let ghost = Uuid::new_v4();
    let id = add_rect(&mut source, ghost);
    let doc = Document::from_snapshot(source.snapshot());
    assert_eq!(doc.elements.get(&id).unwrap().layer_id, doc.layers.active_id().unwrap());
}

#[test]
fn from_snapshot_drops_invalid_text() {
    let mut source = Document::with_default_layer(None);
    let layer = source.layers.active_id().unwrap();
    let text = source
        .elements
        .create(
            ElementKind::Text,
            ElementProps { layer_id: Some(layer), text: Some(TextProps::default()), ..Default::default() },
        )
        .unwrap();
    let mut snapshot = source.snapshot();
    snapshot.elements[0].text = None;
    let doc = Document::from_snapshot(snapshot);
    assert!(doc.elements.get(&text).is_none());
}

#[test]
fn from_snapshot_clears_focus() {
    let mut source = Document::with_default_layer(None);
    let layer = source.layers.active_id().unwrap();
    let id = add_rect(&mut source, layer);
    source.elements.focus(&[id]);
    let doc = Document::from_snapshot(source.snapshot());
    assert!(doc.elements.focused_ids().is_empty());
}

#[test]
fn repair_orphans_without_layers_is_noop() {
    let mut doc = Document::new();
    add_rect(&mut doc, Uuid::new_v4());
    assert_eq!(doc.repair_orphans(), 0);
}

#[test]
fn top_down_orders_layers_then_recency() {
    let mut doc = Document::with_default_layer(Some("Top"));
    let top = doc.layers.active_id().unwrap();
    let bottom = doc.layers.create(Some("Bottom"), None);
    let b1 = add_rect(&mut doc, bottom);
    let t1 = add_rect(&mut doc, top);
    let t2 = add_rect(&mut doc, top);

    let order: Vec<Uuid> = doc.elements_top_down().map(|e| e.id).collect();
    assert_eq!(order, vec![t2, t1, b1]);

    let paint: Vec<Uuid> = doc.elements_bottom_up().map(|e| e.id).collect();
    assert_eq!(paint, vec![b1, t1, t2]);
}

#[test]
fn hidden_layer_elements_are_skipped() {
    let mut doc = Document::with_default_layer(None);
    let top = doc.layers.active_id().unwrap();
    let other = doc.layers.create(None, None);
    let hidden_el = add_rect(&mut doc, other);
    add_rect(&mut doc, top);
    doc.layers.toggle_visibility(&other);

    assert!(doc.elements_top_down().all(|e| e.id != hidden_el));
    assert!(!doc.is_element_visible(doc.elements.get(&hidden_el).unwrap()));
}
