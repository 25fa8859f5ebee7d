#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn point_approx_eq(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

// =============================================================
// Viewport
// =============================================================

#[test]
fn default_is_identity() {
    let v = Viewport::default();
    assert_eq!(v, Viewport::new(0.0, 0.0, 1.0));
    assert_eq!(v.safe_scale(), 1.0);
}

#[test]
fn safe_scale_passes_normal_scale_through() {
    assert_eq!(Viewport::new(0.0, 0.0, 2.5).safe_scale(), 2.5);
}

#[test]
fn safe_scale_clamps_degenerate_values() {
    for scale in [0.0, -1.0, 1e-9, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let v = Viewport::new(0.0, 0.0, scale);
        assert_eq!(v.safe_scale(), VIEWPORT_SCALE_EPSILON, "scale {scale}");
    }
}

#[test]
fn screen_dist_scales_inversely() {
    let v = Viewport::new(100.0, 100.0, 2.0);
    assert_eq!(v.screen_dist_to_board(8.0), 4.0);
    let v = Viewport::new(0.0, 0.0, 0.5);
    assert_eq!(v.screen_dist_to_board(8.0), 16.0);
}

// =============================================================
// Transforms
// =============================================================

#[test]
fn board_to_canvas_applies_scale_then_pan() {
    let v = Viewport::new(10.0, -20.0, 2.0);
    assert_eq!(to_canvas_point(Point::new(5.0, 5.0), &v), Point::new(20.0, -10.0));
}

#[test]
fn client_to_board_inverts_canvas_transform() {
    let v = Viewport::new(37.0, -12.5, 1.75);
    let board = Point::new(123.4, -56.7);
    let client = to_canvas_point(board, &v);
    assert!(point_approx_eq(project_client_to_board(client, &v), board));
}

#[test]
fn client_to_board_at_identity_is_noop() {
    let p = Point::new(42.0, 17.0);
    assert_eq!(project_client_to_board(p, &Viewport::default()), p);
}

#[test]
fn client_to_board_stays_finite_for_degenerate_scale() {
    for scale in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        let v = Viewport::new(0.0, 0.0, scale);
        let p = project_client_to_board(Point::new(10.0, 10.0), &v);
        assert!(p.x.is_finite() && p.y.is_finite(), "scale {scale}");
    }
}
