#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn default_matches_constants() {
    let config = EditorConfig::default();
    assert_eq!(config.history_capacity, 20);
    assert_eq!(config.min_shape_size, 18.0);
    assert_eq!(config.paste_offset, 10.0);
    assert_eq!(config.zoom_min, 0.1);
    assert_eq!(config.zoom_max, 3.0);
}

#[test]
fn from_json_partial_keeps_defaults() {
    let config = EditorConfig::from_json(r#"{ "history_capacity": 5 }"#).unwrap();
    assert_eq!(config.history_capacity, 5);
    assert_eq!(config.min_shape_size, 18.0);
    assert_eq!(config.default_text.family, "sans-serif");
}

#[test]
fn from_json_nested_text_defaults() {
    let config = EditorConfig::from_json(r#"{ "default_text": { "content": "Hi", "family": "serif", "size": 24 } }"#).unwrap();
    assert_eq!(config.default_text.content, "Hi");
    assert_eq!(config.default_text.size, 24.0);
}

#[test]
fn from_json_rejects_non_object() {
    assert!(EditorConfig::from_json("42").is_err());
    assert!(EditorConfig::from_json(r#"{ "zoom_min": "low" }"#).is_err());
}

#[test]
fn sanitized_swaps_inverted_zoom_range() {
    let config = EditorConfig { zoom_min: 4.0, zoom_max: 0.5, ..EditorConfig::default() }.sanitized();
    assert_eq!(config.zoom_min, 0.5);
    assert_eq!(config.zoom_max, 4.0);
}

#[test]
fn sanitized_enforces_minimums() {
    let config = EditorConfig {
        history_capacity: 0,
        min_shape_size: 0.5,
        zoom_min: -1.0,
        ..EditorConfig::default()
    }
    .sanitized();
    assert_eq!(config.history_capacity, 1);
    assert_eq!(config.min_shape_size, 1.0);
    assert_eq!(config.zoom_min, 0.1);
}

#[test]
fn sanitized_replaces_nan_zoom_bounds() {
    let config = EditorConfig { zoom_min: f64::NAN, zoom_max: f64::NAN, ..EditorConfig::default() }.sanitized();
    assert_eq!(config.zoom_min, 0.1);
    assert_eq!(config.zoom_max, 3.0);
}

#[test]
fn env_parse_missing_key_uses_default() {
    assert_eq!(env_parse("SKETCHPAD_TEST_DEFINITELY_UNSET", 7_usize), 7);
}

#[test]
fn from_env_without_vars_is_default() {
    // None of the SKETCHPAD_* variables are set in the test environment.
    assert_eq!(EditorConfig::from_env(), EditorConfig::default());
}
