#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::geometry::{ConnectorAnchor, ObjectGeometry, distance_to_segment};

const ANCHORS: [ConnectorAnchor; 4] =
    [ConnectorAnchor::Top, ConnectorAnchor::Right, ConnectorAnchor::Bottom, ConnectorAnchor::Left];

const EPSILON: f64 = 1e-9;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

struct Shape {
    id: ObjectId,
    geometry: ObjectGeometry,
}

fn shape(x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape { id: Uuid::new_v4(), geometry: ObjectGeometry::new(x, y, w, h, 0.0) }
}

fn rotated(x: f64, y: f64, w: f64, h: f64, deg: f64) -> Shape {
    Shape { id: Uuid::new_v4(), geometry: ObjectGeometry::new(x, y, w, h, deg) }
}

fn anchored(s: &Shape, anchor: ConnectorAnchor) -> ResolvedConnectorEndpoint {
    let p = s.geometry.anchor_point(anchor);
    ResolvedConnectorEndpoint {
        x: p.x,
        y: p.y,
        object_id: Some(s.id),
        anchor: Some(anchor),
        direction: Some(s.geometry.anchor_direction(anchor)),
        connected: true,
        bounds: Some(s.geometry.bounds()),
    }
}

fn free(x: f64, y: f64) -> ResolvedConnectorEndpoint {
    ResolvedConnectorEndpoint::unconnected(pt(x, y))
}

fn obstacle(s: &Shape) -> ConnectorRoutingObstacle {
    ConnectorRoutingObstacle { object_id: s.id, bounds: s.geometry.bounds() }
}

/// How far `p` lies outside `b` along the nearest axis; negative when inside.
fn distance_outside(b: &Bounds, p: Point) -> f64 {
    (b.left - p.x).max(p.x - b.right).max(b.top - p.y).max(p.y - b.bottom)
}

fn segment_crosses(route: &ConnectorRouteGeometry, b: &Bounds) -> bool {
    route.points.windows(2).any(|seg| b.intersects_segment(seg[0], seg[1]))
}

fn is_orthogonal(route: &ConnectorRouteGeometry) -> bool {
    route
        .points
        .windows(2)
        .all(|seg| (seg[0].x - seg[1].x).abs() < EPSILON || (seg[0].y - seg[1].y).abs() < EPSILON)
}

// =============================================================
// Free endpoints
// =============================================================

#[test]
fn free_to_free_is_a_straight_segment() {
    let route =
        route_connector(&free(10.0, 10.0), &free(110.0, 60.0), &[], &RouterOptions::default());
    assert_eq!(route.points, vec![pt(10.0, 10.0), pt(110.0, 60.0)]);
    assert_eq!(route.bounds, Bounds::new(10.0, 110.0, 10.0, 60.0));
    assert_eq!(route.mid_point, pt(60.0, 35.0));
    assert!(point_approx_eq(route.start_direction, pt(0.8944271909999159, 0.4472135954999579)));
    assert_eq!(route.start_direction, route.end_direction);
    assert_eq!(route.crossings, 0);
}

#[test]
fn free_to_free_reports_crossings() {
    let blocker = shape(40.0, -20.0, 20.0, 40.0);
    let obstacles = [obstacle(&blocker)];
    let options = RouterOptions::default();
    let route = route_connector(&free(0.0, 0.0), &free(100.0, 0.0), &obstacles, &options);
    assert_eq!(route.points.len(), 2);
    assert_eq!(route.crossings, 1);
}

#[test]
fn coincident_free_endpoints_still_produce_a_route() {
    let route = route_connector(&free(5.0, 5.0), &free(5.0, 5.0), &[], &RouterOptions::default());
    assert_eq!(route.points.len(), 2);
    assert_eq!(route.mid_point, pt(5.0, 5.0));
    assert_eq!(route.start_direction, pt(1.0, 0.0));
}

// =============================================================
// Anchored endpoints
// =============================================================

#[test]
fn facing_sides_route_straight_through_stubs() {
    let a = shape(0.0, 0.0, 100.0, 100.0);
    let b = shape(300.0, 0.0, 100.0, 100.0);
    let obstacles = [obstacle(&a), obstacle(&b)];
    let route = route_connector(
        &anchored(&a, ConnectorAnchor::Right),
        &anchored(&b, ConnectorAnchor::Left),
        &obstacles,
        &RouterOptions::default(),
    );
    assert_eq!(route.points, vec![pt(124.0, 50.0), pt(276.0, 50.0)]);
    assert_eq!(route.crossings, 0);
    assert_eq!(route.start_direction, pt(1.0, 0.0));
    assert_eq!(route.end_direction, pt(1.0, 0.0));
    assert_eq!(route.mid_point, pt(200.0, 50.0));
    assert_eq!(route.bounds, Bounds::new(124.0, 276.0, 50.0, 50.0));
}

#[test]
fn route_leaves_and_enters_perpendicular_to_edges() {
    let a = shape(0.0, 0.0, 100.0, 100.0);
    let b = shape(300.0, 300.0, 100.0, 100.0);
    let route = route_connector(
        &anchored(&a, ConnectorAnchor::Bottom),
        &anchored(&b, ConnectorAnchor::Left),
        &[obstacle(&a), obstacle(&b)],
        &RouterOptions::default(),
    );
    assert_eq!(route.start_direction, pt(0.0, 1.0));
    assert_eq!(route.end_direction, pt(1.0, 0.0));
    assert!(is_orthogonal(&route));
    assert_eq!(route.crossings, 0);
}

#[test]
fn endpoints_clear_the_object_bounds_for_every_anchor_pair() {
    let options = RouterOptions::default();
    let a = shape(0.0, 0.0, 100.0, 60.0);
    let b = shape(260.0, 180.0, 80.0, 120.0);
    let obstacles = [obstacle(&a), obstacle(&b)];
    for from_anchor in ANCHORS {
        for to_anchor in ANCHORS {
            let from = anchored(&a, from_anchor);
            let to = anchored(&b, to_anchor);
            let route = route_connector(&from, &to, &obstacles, &options);
            let label = format!("{from_anchor:?}->{to_anchor:?}: {:?}", route.points);
            let first = route.points[0];
            let last = route.points[route.points.len() - 1];
            assert!(!first.approx_eq(from.point()), "{label}");
            assert!(!last.approx_eq(to.point()), "{label}");
            let a_gap = distance_outside(&a.geometry.bounds(), first);
            let b_gap = distance_outside(&b.geometry.bounds(), last);
            assert!(a_gap >= options.min_segment_size - EPSILON, "{label}: {a_gap}");
            assert!(b_gap >= options.min_segment_size - EPSILON, "{label}: {b_gap}");
            // The implied anchor legs run along the end directions.
            let leaving = from.point().direction_to(first).unwrap();
            let arriving = last.direction_to(to.point()).unwrap();
            assert!(point_approx_eq(leaving, route.start_direction), "{label}");
            assert!(point_approx_eq(arriving, route.end_direction), "{label}");
            assert!(is_orthogonal(&route), "{label}");
        }
    }
}

#[test]
fn stub_clears_rotated_object_bounds() {
    let options = RouterOptions::default();
    let a = rotated(0.0, 0.0, 100.0, 100.0, 45.0);
    let from = anchored(&a, ConnectorAnchor::Right);
    let route = route_connector(&from, &free(500.0, 50.0), &[obstacle(&a)], &options);
    let gap = distance_outside(&a.geometry.bounds(), route.points[0]);
    assert!(gap >= options.min_segment_size - EPSILON, "{gap}");
    assert_eq!(*route.points.last().unwrap(), pt(500.0, 50.0));
}

#[test]
fn attached_to_free_ends_at_free_point() {
    let a = shape(0.0, 0.0, 100.0, 100.0);
    let route = route_connector(
        &anchored(&a, ConnectorAnchor::Top),
        &free(300.0, -200.0),
        &[obstacle(&a)],
        &RouterOptions::default(),
    );
    assert_eq!(route.points[0], pt(50.0, -24.0));
    assert_eq!(*route.points.last().unwrap(), pt(300.0, -200.0));
    assert_eq!(route.start_direction, pt(0.0, -1.0));
    assert_eq!(route.crossings, 0);
}

// =============================================================
// Obstacle avoidance
// =============================================================

#[test]
fn detours_around_a_blocking_object() {
    let a = shape(0.0, 0.0, 100.0, 100.0);
    let b = shape(400.0, 0.0, 100.0, 100.0);
    let c = shape(200.0, 20.0, 60.0, 60.0);
    let obstacles = [obstacle(&a), obstacle(&b), obstacle(&c)];
    let route = route_connector(
        &anchored(&a, ConnectorAnchor::Right),
        &anchored(&b, ConnectorAnchor::Left),
        &obstacles,
        &RouterOptions::default(),
    );
    assert_eq!(
        route.points,
        vec![pt(124.0, 50.0), pt(124.0, 4.0), pt(376.0, 4.0), pt(376.0, 50.0)]
    );
    assert_eq!(route.crossings, 0);
    assert!(!segment_crosses(&route, &c.geometry.bounds()));
    assert_eq!(route.start_direction, pt(1.0, 0.0));
    assert_eq!(route.end_direction, pt(1.0, 0.0));
}

#[test]
fn detour_keeps_clearance_from_obstacle() {
    let options = RouterOptions::default();
    let a = shape(0.0, 0.0, 100.0, 100.0);
    let b = shape(400.0, 0.0, 100.0, 100.0);
    let c = shape(200.0, 20.0, 60.0, 60.0);
    let route = route_connector(
        &anchored(&a, ConnectorAnchor::Right),
        &anchored(&b, ConnectorAnchor::Left),
        &[obstacle(&c)],
        &options,
    );
    // C is centred on (230, 50) with a half height of 30.
    for seg in route.points.windows(2) {
        let gap = distance_to_segment(pt(230.0, 50.0), seg[0], seg[1]);
        assert!(gap >= 30.0 + options.obstacle_clearance - EPSILON, "{seg:?}");
    }
}

#[test]
fn detours_around_several_obstacles() {
    let a = shape(0.0, 0.0, 100.0, 100.0);
    let b = shape(600.0, 0.0, 100.0, 100.0);
    let c1 = shape(200.0, 0.0, 60.0, 100.0);
    let c2 = shape(380.0, -10.0, 60.0, 120.0);
    let obstacles = [obstacle(&a), obstacle(&b), obstacle(&c1), obstacle(&c2)];
    let route = route_connector(
        &anchored(&a, ConnectorAnchor::Right),
        &anchored(&b, ConnectorAnchor::Left),
        &obstacles,
        &RouterOptions::default(),
    );
    assert_eq!(route.crossings, 0);
    assert!(!segment_crosses(&route, &c1.geometry.bounds()));
    assert!(!segment_crosses(&route, &c2.geometry.bounds()));
    assert_eq!(route.points[0], pt(124.0, 50.0));
    assert_eq!(*route.points.last().unwrap(), pt(576.0, 50.0));
}

#[test]
fn route_does_not_run_back_through_its_own_target() {
    let a = shape(0.0, 0.0, 100.0, 100.0);
    let b = shape(300.0, 0.0, 100.0, 100.0);
    let route = route_connector(
        &anchored(&a, ConnectorAnchor::Right),
        &anchored(&b, ConnectorAnchor::Right),
        &[obstacle(&a), obstacle(&b)],
        &RouterOptions::default(),
    );
    let bb = b.geometry.bounds();
    for seg in route.points.windows(2) {
        assert!(!bb.intersects_segment(seg[0], seg[1]), "{:?}", route.points);
    }
    assert_eq!(*route.points.last().unwrap(), pt(424.0, 50.0));
    assert_eq!(route.end_direction, pt(-1.0, 0.0));
    assert_eq!(route.crossings, 0);
}

#[test]
fn unreachable_target_returns_best_effort() {
    let a = shape(0.0, 0.0, 100.0, 100.0);
    let wall = shape(300.0, -200.0, 400.0, 500.0);
    let route = route_connector(
        &anchored(&a, ConnectorAnchor::Right),
        &free(500.0, 50.0),
        &[obstacle(&a), obstacle(&wall)],
        &RouterOptions::default(),
    );
    assert!(route.points.len() >= 2);
    assert!(route.crossings > 0);
    assert_eq!(route.points[0], pt(124.0, 50.0));
    assert_eq!(*route.points.last().unwrap(), pt(500.0, 50.0));
}

#[test]
fn zero_attempts_keeps_direct_route() {
    let a = shape(0.0, 0.0, 100.0, 100.0);
    let b = shape(400.0, 0.0, 100.0, 100.0);
    let c = shape(200.0, 20.0, 60.0, 60.0);
    let options = RouterOptions { max_route_attempts: 0, ..RouterOptions::default() };
    let route = route_connector(
        &anchored(&a, ConnectorAnchor::Right),
        &anchored(&b, ConnectorAnchor::Left),
        &[obstacle(&c)],
        &options,
    );
    assert_eq!(route.points, vec![pt(124.0, 50.0), pt(376.0, 50.0)]);
    assert_eq!(route.crossings, 1);
}

// =============================================================
// Helpers
// =============================================================

#[test]
fn simplify_drops_duplicates_and_collinear_points() {
    let points =
        [pt(0.0, 0.0), pt(0.0, 0.0), pt(5.0, 0.0), pt(10.0, 0.0), pt(10.0, 5.0), pt(10.0, 10.0)];
    assert_eq!(simplify(&points), vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0)]);
}

#[test]
fn simplify_keeps_reversals() {
    let points = [pt(0.0, 0.0), pt(10.0, 0.0), pt(5.0, 0.0)];
    assert_eq!(simplify(&points), points.to_vec());
}

#[test]
fn polyline_midpoint_walks_half_the_length() {
    let points = [pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 30.0)];
    assert!(point_approx_eq(polyline_midpoint(&points).unwrap(), pt(10.0, 10.0)));
    assert_eq!(polyline_midpoint(&[]), None);
    assert_eq!(polyline_midpoint(&[pt(3.0, 4.0)]), Some(pt(3.0, 4.0)));
}
