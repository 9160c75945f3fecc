use super::*;

fn stack_of(n: usize) -> (LayerStack, Vec<LayerId>) {
    let mut stack = LayerStack::new();
    let ids = (0..n).map(|i| stack.create(Some(&format!("L{}", i + 1)), None)).collect();
    (stack, ids)
}

fn active_count(stack: &LayerStack) -> usize {
    stack.iter().filter(|l| l.active).count()
}

fn order(stack: &LayerStack) -> Vec<LayerId> {
    stack.iter().map(|l| l.id).collect()
}

// =============================================================
// create
// =============================================================

#[test]
fn first_layer_starts_active() {
    let (stack, ids) = stack_of(1);
    assert_eq!(stack.active_id(), Some(ids[0]));
}

#[test]
fn later_layers_start_inactive_and_visible() {
    let (stack, ids) = stack_of(3);
    assert_eq!(active_count(&stack), 1);
    let l3 = stack.get(&ids[2]).unwrap();
    assert!(!l3.active);
    assert!(!l3.hidden);
    assert_eq!(order(&stack), ids);
}

#[test]
fn create_default_name() {
    let mut stack = LayerStack::new();
    let a = stack.create(None, None);
    let b = stack.create(Some("   "), None);
    assert_eq!(stack.get(&a).unwrap().name, "New Layer");
    assert_eq!(stack.get(&b).unwrap().name, "New Layer");
}

#[test]
fn create_with_requested_id() {
    let mut stack = LayerStack::new();
    let wanted = Uuid::new_v4();
    assert_eq!(stack.create(None, Some(wanted)), wanted);
}

#[test]
fn create_with_duplicate_id_gets_fresh_one() {
    let (mut stack, ids) = stack_of(1);
    let got = stack.create(None, Some(ids[0]));
    assert_ne!(got, ids[0]);
    assert_eq!(stack.len(), 2);
}

// =============================================================
// toggle_active
// =============================================================

#[test]
fn toggle_active_swaps_holder() {
    let (mut stack, ids) = stack_of(3);
    assert!(stack.toggle_active(&ids[2]));
    assert_eq!(stack.active_id(), Some(ids[2]));
    assert_eq!(active_count(&stack), 1);
}

#[test]
fn toggle_active_on_current_holder_keeps_it() {
    let (mut stack, ids) = stack_of(2);
    assert!(stack.toggle_active(&ids[0]));
    assert_eq!(stack.active_id(), Some(ids[0]));
}

#[test]
fn toggle_active_unknown_is_noop() {
    let (mut stack, ids) = stack_of(2);
    assert!(!stack.toggle_active(&Uuid::new_v4()));
    assert_eq!(stack.active_id(), Some(ids[0]));
}

// =============================================================
// move_up / move_down / move_to
// =============================================================

#[test]
fn move_up_swaps_toward_top() {
    let (mut stack, ids) = stack_of(3);
    assert!(stack.move_up(&ids[1]));
    assert_eq!(order(&stack), vec![ids[1], ids[0], ids[2]]);
}

#[test]
fn move_up_at_top_is_noop() {
    let (mut stack, ids) = stack_of(3);
    assert!(!stack.move_up(&ids[0]));
    assert_eq!(order(&stack), ids);
}

#[test]
fn move_down_swaps_toward_bottom() {
    let (mut stack, ids) = stack_of(3);
    assert!(stack.move_down(&ids[0]));
    assert_eq!(order(&stack), vec![ids[1], ids[0], ids[2]]);
}

#[test]
fn move_down_at_bottom_is_noop() {
    let (mut stack, ids) = stack_of(3);
    assert!(!stack.move_down(&ids[2]));
    assert_eq!(order(&stack), ids);
}

#[test]
fn move_to_clamps_and_shifts() {
    let (mut stack, ids) = stack_of(3);
    assert!(stack.move_to(&ids[0], 99));
    assert_eq!(order(&stack), vec![ids[1], ids[2], ids[0]]);
    assert!(!stack.move_to(&ids[0], 2));
}

// =============================================================
// remove
// =============================================================

#[test]
fn remove_active_promotes_new_first() {
    let (mut stack, ids) = stack_of(2);
    let (index, removed) = stack.remove(&ids[0]).unwrap();
    assert_eq!(index, 0);
    assert!(removed.active);
    assert_eq!(order(&stack), vec![ids[1]]);
    assert_eq!(stack.active_id(), Some(ids[1]));
}

#[test]
fn remove_inactive_keeps_active() {
    let (mut stack, ids) = stack_of(3);
    stack.toggle_active(&ids[2]);
    stack.remove(&ids[0]).unwrap();
    assert_eq!(stack.active_id(), Some(ids[2]));
    assert_eq!(active_count(&stack), 1);
}

#[test]
fn remove_last_layer_refused() {
    let (mut stack, ids) = stack_of(1);
    assert!(stack.remove(&ids[0]).is_none());
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.active_id(), Some(ids[0]));
}

#[test]
fn remove_unknown_is_noop() {
    let (mut stack, _) = stack_of(2);
    assert!(stack.remove(&Uuid::new_v4()).is_none());
    assert_eq!(stack.len(), 2);
}

#[test]
fn take_allows_emptying() {
    let (mut stack, ids) = stack_of(1);
    assert!(stack.take(&ids[0]).is_some());
    assert!(stack.is_empty());
    assert!(stack.active().is_none());
}

#[test]
fn insert_at_restores_position_and_active() {
    let (mut stack, ids) = stack_of(3);
    let (index, layer) = stack.remove(&ids[0]).unwrap();
    stack.insert_at(index, layer);
    assert_eq!(order(&stack), ids);
    assert_eq!(stack.active_id(), Some(ids[0]));
    assert_eq!(active_count(&stack), 1);
}

#[test]
fn insert_inactive_into_empty_becomes_active() {
    let mut stack = LayerStack::new();
    let layer = Layer::new(Uuid::new_v4(), "Solo");
    let id = layer.id;
    stack.insert_at(0, layer);
    assert_eq!(stack.active_id(), Some(id));
}

// =============================================================
// rename / visibility
// =============================================================

#[test]
fn rename_trims_and_applies() {
    let (mut stack, ids) = stack_of(1);
    assert!(stack.rename(&ids[0], "  Sky  "));
    assert_eq!(stack.get(&ids[0]).unwrap().name, "Sky");
}

#[test]
fn rename_to_blank_keeps_previous() {
    let (mut stack, ids) = stack_of(1);
    assert!(!stack.rename(&ids[0], ""));
    assert!(!stack.rename(&ids[0], " \t "));
    assert_eq!(stack.get(&ids[0]).unwrap().name, "L1");
}

#[test]
fn toggle_visibility_flips_hidden() {
    let (mut stack, ids) = stack_of(2);
    assert_eq!(stack.toggle_visibility(&ids[1]), Some(true));
    assert!(!stack.is_visible(&ids[1]));
    assert_eq!(stack.toggle_visibility(&ids[1]), Some(false));
    assert!(stack.is_visible(&ids[1]));
    assert_eq!(stack.toggle_visibility(&Uuid::new_v4()), None);
}

#[test]
fn hidden_layer_stays_in_order() {
    let (mut stack, ids) = stack_of(2);
    stack.toggle_visibility(&ids[0]);
    assert_eq!(order(&stack), ids);
}

// =============================================================
// ensure_active / raster
// =============================================================

#[test]
fn from_layers_repairs_multiple_active() {
    let mut a = Layer::new(Uuid::new_v4(), "A");
    let mut b = Layer::new(Uuid::new_v4(), "B");
    a.active = true;
    b.active = true;
    let stack = LayerStack::from_layers(vec![a.clone(), b]);
    assert_eq!(active_count(&stack), 1);
    assert_eq!(stack.active_id(), Some(a.id));
}

#[test]
fn from_layers_repairs_none_active() {
    let a = Layer::new(Uuid::new_v4(), "A");
    let b = Layer::new(Uuid::new_v4(), "B");
    let stack = LayerStack::from_layers(vec![a.clone(), b]);
    assert_eq!(stack.active_id(), Some(a.id));
}

#[test]
fn paint_and_unpaint() {
    let mut layer = Layer::new(Uuid::new_v4(), "Paint");
    let stroke = StrokeRecord::new(PaintMode::Draw, vec![Point::new(0.0, 0.0)], "#000000", 4.0);
    let sid = stroke.id;
    layer.paint(stroke.clone());
    assert_eq!(layer.raster.len(), 1);
    assert_eq!(layer.unpaint(&sid), Some(stroke));
    assert!(layer.raster.is_empty());
    assert_eq!(layer.unpaint(&sid), None);
}

#[test]
fn paint_mode_serde_lowercase() {
    assert_eq!(serde_json::to_string(&PaintMode::Erase).unwrap(), "\"erase\"");
}

#[test]
fn layer_without_raster_deserializes() {
    let id = Uuid::new_v4();
    let raw = format!(r#"{{"id":"{id}","name":"X","active":true,"hidden":false}}"#);
    let layer: Layer = serde_json::from_str(&raw).unwrap();
    assert!(layer.raster.is_empty());
}
