#![allow(clippy::float_cmp)]

use std::cell::RefCell;

use super::*;
use crate::camera::Point;
use crate::element::{ElementKind, ElementProps};
use crate::layer::PaintMode;

/// Records what it was asked to render and returns a fixed payload.
#[derive(Default)]
struct RecordingCompositor {
    calls: RefCell<Vec<(usize, f64)>>,
}

impl Compositor for RecordingCompositor {
    type Error = String;

    fn render_flattened(&self, scene: &FlattenedScene, quality: f64) -> Result<Vec<u8>, Self::Error> {
        self.calls.borrow_mut().push((scene.layers.len(), quality));
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

struct FailingCompositor;

impl Compositor for FailingCompositor {
    type Error = String;

    fn render_flattened(&self, _scene: &FlattenedScene, _quality: f64) -> Result<Vec<u8>, Self::Error> {
        Err("surface lost".into())
    }
}

fn two_layer_doc() -> (Document, LayerId, LayerId) {
    let mut doc = Document::with_default_layer(Some("Top"));
    let top = doc.layers.active_id().unwrap();
    let bottom = doc.layers.create(Some("Bottom"), None);
    (doc, top, bottom)
}

#[test]
fn capture_orders_bottom_first() {
    let (doc, top, bottom) = two_layer_doc();
    let scene = FlattenedScene::capture(&doc, 800.0, 600.0);
    let ids: Vec<LayerId> = scene.layers.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![bottom, top]);
    assert_eq!(scene.width, 800.0);
}

#[test]
fn capture_skips_hidden_layers() {
    let (mut doc, top, bottom) = two_layer_doc();
    doc.layers.toggle_visibility(&bottom);
    let scene = FlattenedScene::capture(&doc, 10.0, 10.0);
    assert_eq!(scene.layers.len(), 1);
    assert_eq!(scene.layers[0].id, top);
}

#[test]
fn capture_clears_focus_and_skips_unplaced() {
    let (mut doc, top, _) = two_layer_doc();
    let placed = doc
        .elements
        .create(
            ElementKind::Rectangle,
            ElementProps { layer_id: Some(top), position: Some(Point::new(1.0, 1.0)), ..Default::default() },
        )
        .unwrap();
    doc.elements
        .create(ElementKind::Circle, ElementProps { layer_id: Some(top), ..Default::default() })
        .unwrap();
    doc.elements.focus(&[placed]);

    let scene = FlattenedScene::capture(&doc, 10.0, 10.0);
    let layer = scene.layers.iter().find(|l| l.id == top).unwrap();
    assert_eq!(layer.elements.len(), 1);
    assert!(!layer.elements[0].focused);
}

#[test]
fn capture_is_point_in_time() {
    let (mut doc, top, _) = two_layer_doc();
    let scene = FlattenedScene::capture(&doc, 10.0, 10.0);
    doc.layers
        .get_mut(&top)
        .unwrap()
        .paint(StrokeRecord::new(PaintMode::Draw, vec![Point::new(0.0, 0.0)], "#000", 4.0));
    assert!(scene.is_blank());
    assert!(!FlattenedScene::capture(&doc, 10.0, 10.0).is_blank());
}

#[test]
fn export_clamps_quality() {
    let (doc, _, _) = two_layer_doc();
    let scene = FlattenedScene::capture(&doc, 10.0, 10.0);
    let compositor = RecordingCompositor::default();
    export(&compositor, &scene, 7.0).unwrap();
    export(&compositor, &scene, -1.0).unwrap();
    export(&compositor, &scene, f64::NAN).unwrap();
    let qualities: Vec<f64> = compositor.calls.borrow().iter().map(|(_, q)| *q).collect();
    assert_eq!(qualities, vec![1.0, 0.0, 1.0]);
}

#[test]
fn export_returns_compositor_bytes() {
    let (doc, _, _) = two_layer_doc();
    let scene = FlattenedScene::capture(&doc, 10.0, 10.0);
    let bytes = export(&RecordingCompositor::default(), &scene, 0.9).unwrap();
    assert_eq!(&bytes[1..], b"PNG");
}

#[test]
fn export_propagates_errors() {
    let (doc, _, _) = two_layer_doc();
    let scene = FlattenedScene::capture(&doc, 10.0, 10.0);
    assert_eq!(export(&FailingCompositor, &scene, 0.5).unwrap_err(), "surface lost");
}
