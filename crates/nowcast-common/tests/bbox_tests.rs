//! Tests for BoundingBox validation and helpers.

use nowcast_common::{BoundingBox, NowcastError};

// ============================================================================
// validate tests
// ============================================================================

#[test]
fn test_validate_accepts_degenerate_box() {
    let bbox = BoundingBox::new(28.0, 41.0, 28.0, 41.0);
    assert!(bbox.validate().is_ok());
}

#[test]
fn test_validate_rejects_nan() {
    let bbox = BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0);
    assert!(bbox.validate().is_err());
}

#[test]
fn test_validate_rejects_latitude_out_of_range() {
    let bbox = BoundingBox::new(0.0, -91.0, 1.0, 1.0);
    assert!(bbox.validate().is_err());
}

#[test]
fn test_validate_error_maps_to_bad_request() {
    let err = BoundingBox::new(30.0, 36.0, 26.0, 42.0).validate().unwrap_err();
    assert!(matches!(err, NowcastError::InvalidBbox(_)));
    assert_eq!(err.http_status_code(), 400);
}

// ============================================================================
// geometry helpers
// ============================================================================

#[test]
fn test_contains_point_edges_inclusive() {
    let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    assert!(bbox.contains_point(0.0, 0.0));
    assert!(bbox.contains_point(1.0, 1.0));
    assert!(!bbox.contains_point(1.0001, 0.5));
}

#[test]
fn test_union() {
    let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    let b = BoundingBox::new(-1.0, 0.5, 0.5, 2.0);
    assert_eq!(a.union(&b), BoundingBox::new(-1.0, 0.0, 1.0, 2.0));
}

#[test]
fn test_serde_camel_case() {
    let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
    let json = serde_json::to_value(bbox).unwrap();
    assert_eq!(json["minLon"], 1.0);
    assert_eq!(json["maxLat"], 4.0);
}
