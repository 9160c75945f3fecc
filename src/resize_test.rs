#![allow(clippy::float_cmp)]

use super::*;

const MIN: f64 = 18.0;

fn base() -> Rect {
    Rect { x: 100.0, y: 100.0, width: 100.0, height: 80.0 }
}

// =============================================================
// Handle parsing
// =============================================================

#[test]
fn parse_every_tag() {
    for handle in ResizeHandle::ALL {
        assert_eq!(handle.as_str().parse::<ResizeHandle>().unwrap(), handle);
        assert_eq!(handle.to_string(), handle.as_str());
    }
}

#[test]
fn parse_unknown_tag_fails() {
    let err = "north".parse::<ResizeHandle>().unwrap_err();
    assert_eq!(err, EditorError::InvalidResizeHandle("north".into()));
}

#[test]
fn parse_is_case_sensitive() {
    assert!("SE".parse::<ResizeHandle>().is_err());
}

#[test]
fn resize_tagged_rejects_unknown() {
    assert!(resize_tagged(base(), "x", 1.0, 1.0, MIN).is_err());
}

#[test]
fn resize_tagged_matches_typed() {
    let typed = resize(base(), ResizeHandle::Ne, 5.0, -5.0, MIN);
    assert_eq!(resize_tagged(base(), "ne", 5.0, -5.0, MIN).unwrap(), typed);
}

// =============================================================
// Trailing edges
// =============================================================

#[test]
fn se_grows_both_axes() {
    let r = resize(base(), ResizeHandle::Se, 20.0, 10.0, MIN);
    assert_eq!(r, Rect { x: 100.0, y: 100.0, width: 120.0, height: 90.0 });
}

#[test]
fn se_below_floor_clamps_to_exactly_min() {
    let r = resize(base(), ResizeHandle::Se, -500.0, -500.0, MIN);
    assert_eq!(r.width, 18.0);
    assert_eq!(r.height, 18.0);
    assert_eq!(r.x, 100.0);
    assert_eq!(r.y, 100.0);
}

#[test]
fn e_touches_only_width() {
    let r = resize(base(), ResizeHandle::E, 30.0, 999.0, MIN);
    assert_eq!(r, Rect { x: 100.0, y: 100.0, width: 130.0, height: 80.0 });
}

#[test]
fn s_touches_only_height() {
    let r = resize(base(), ResizeHandle::S, 999.0, -30.0, MIN);
    assert_eq!(r, Rect { x: 100.0, y: 100.0, width: 100.0, height: 50.0 });
}

// =============================================================
// Leading edges
// =============================================================

#[test]
fn nw_keeps_opposite_corner_fixed() {
    let r = resize(base(), ResizeHandle::Nw, 10.0, 20.0, MIN);
    assert_eq!(r, Rect { x: 110.0, y: 120.0, width: 90.0, height: 60.0 });
    assert_eq!(r.right(), base().right());
    assert_eq!(r.bottom(), base().bottom());
}

#[test]
fn w_past_floor_pins_to_right_edge() {
    let r = resize(base(), ResizeHandle::W, 250.0, 0.0, MIN);
    assert_eq!(r.width, 18.0);
    assert_eq!(r.x, 182.0);
    assert_eq!(r.right(), 200.0);
}

#[test]
fn n_past_floor_pins_to_bottom_edge() {
    let r = resize(base(), ResizeHandle::N, 0.0, 300.0, MIN);
    assert_eq!(r.height, 18.0);
    assert_eq!(r.bottom(), 180.0);
}

#[test]
fn w_grows_leftward() {
    let r = resize(base(), ResizeHandle::W, -40.0, 0.0, MIN);
    assert_eq!(r, Rect { x: 60.0, y: 100.0, width: 140.0, height: 80.0 });
}

// =============================================================
// Mixed corners
// =============================================================

#[test]
fn ne_combines_leading_y_and_trailing_x() {
    let r = resize(base(), ResizeHandle::Ne, 10.0, -10.0, MIN);
    assert_eq!(r, Rect { x: 100.0, y: 90.0, width: 110.0, height: 90.0 });
}

#[test]
fn sw_combines_leading_x_and_trailing_y() {
    let r = resize(base(), ResizeHandle::Sw, -10.0, 10.0, MIN);
    assert_eq!(r, Rect { x: 90.0, y: 100.0, width: 110.0, height: 90.0 });
}

#[test]
fn corner_axes_clamp_independently() {
    let r = resize(base(), ResizeHandle::Se, -500.0, 20.0, MIN);
    assert_eq!(r.width, 18.0);
    assert_eq!(r.height, 100.0);
}

// =============================================================
// Handle follows cursor
// =============================================================

#[test]
fn returning_within_range_tracks_cursor_again() {
    let orig = base();
    let overshoot = resize(orig, ResizeHandle::W, 300.0, 0.0, MIN);
    assert_eq!(overshoot.width, MIN);

    // Pointer came back to 50 right of the original left edge.
    let back = resize(orig, ResizeHandle::W, 50.0, 0.0, MIN);
    assert_eq!(back.x, 150.0);
    assert_eq!(back.width, 50.0);
}

#[test]
fn zero_delta_is_identity_for_every_handle() {
    for handle in ResizeHandle::ALL {
        assert_eq!(resize(base(), handle, 0.0, 0.0, MIN), base(), "{handle}");
    }
}

// =============================================================
// Handle geometry
// =============================================================

#[test]
fn handle_points_on_rect() {
    let r = base();
    assert_eq!(ResizeHandle::Nw.point_on(&r), Point::new(100.0, 100.0));
    assert_eq!(ResizeHandle::N.point_on(&r), Point::new(150.0, 100.0));
    assert_eq!(ResizeHandle::E.point_on(&r), Point::new(200.0, 140.0));
    assert_eq!(ResizeHandle::Se.point_on(&r), Point::new(200.0, 180.0));
    assert_eq!(ResizeHandle::Sw.point_on(&r), Point::new(100.0, 180.0));
}

#[test]
fn cursors_pair_opposite_handles() {
    assert_eq!(ResizeHandle::Nw.cursor(), ResizeHandle::Se.cursor());
    assert_eq!(ResizeHandle::Ne.cursor(), ResizeHandle::Sw.cursor());
    assert_eq!(ResizeHandle::N.cursor(), "ns-resize");
    assert_eq!(ResizeHandle::E.cursor(), "ew-resize");
}
