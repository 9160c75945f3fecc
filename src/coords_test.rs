#![allow(clippy::float_cmp)]

use super::*;

fn metrics(left: f64, top: f64, css: (f64, f64), px: (f64, f64)) -> CanvasMetrics {
    CanvasMetrics {
        left,
        top,
        rendered_width: css.0,
        rendered_height: css.1,
        pixel_width: px.0,
        pixel_height: px.1,
    }
}

#[test]
fn identity_when_unscaled_at_origin() {
    let m = metrics(0.0, 0.0, (800.0, 600.0), (800.0, 600.0));
    assert_eq!(to_canvas_space(120.0, 45.0, &m), Point::new(120.0, 45.0));
}

#[test]
fn subtracts_bounding_rect_origin() {
    let m = metrics(30.0, 70.0, (800.0, 600.0), (800.0, 600.0));
    assert_eq!(to_canvas_space(130.0, 170.0, &m), Point::new(100.0, 100.0));
}

#[test]
fn device_pixel_ratio_doubles() {
    let m = metrics(0.0, 0.0, (400.0, 300.0), (800.0, 600.0));
    assert_eq!(to_canvas_space(10.0, 20.0, &m), Point::new(20.0, 40.0));
}

#[test]
fn non_uniform_scaling_x() {
    let m = metrics(0.0, 0.0, (500.0, 300.0), (1000.0, 300.0));
    let p = to_canvas_space(100.0, 100.0, &m);
    assert_eq!(p.x, 200.0);
    assert_eq!(p.y, 100.0);
}

#[test]
fn non_uniform_scaling_y() {
    let m = metrics(0.0, 0.0, (300.0, 500.0), (300.0, 250.0));
    let p = to_canvas_space(100.0, 100.0, &m);
    assert_eq!(p.x, 100.0);
    assert_eq!(p.y, 50.0);
}

#[test]
fn offset_and_scale_combined() {
    let m = metrics(10.0, 20.0, (200.0, 100.0), (400.0, 300.0));
    assert_eq!(to_canvas_space(60.0, 70.0, &m), Point::new(100.0, 150.0));
}

#[test]
fn collapsed_axis_maps_one_to_one() {
    let m = metrics(0.0, 0.0, (0.0, 0.0), (300.0, 150.0));
    assert_eq!(m.scale(), (1.0, 1.0));
    assert_eq!(to_canvas_space(5.0, 6.0, &m), Point::new(5.0, 6.0));
}

#[test]
fn center_is_half_backing_store() {
    let m = metrics(0.0, 0.0, (100.0, 100.0), (640.0, 480.0));
    assert_eq!(m.center(), Point::new(320.0, 240.0));
}
