//! Path routing: turns two resolved endpoints and the scene's obstacles into a
//! renderable connector path.
//!
//! DESIGN
//! ======
//! Free-to-free connectors are a straight segment. Anything attached to an
//! object is routed orthogonally:
//!
//! 1. Each attached end gets a stub: its anchor direction is snapped to the
//!    dominant axis and the stub point sits at least `min_segment_size` past
//!    the object's bounds along that axis. The returned path runs
//!    `stub, ..., stub`; the leg from the anchor out to its stub is implied by
//!    `start_direction` and `end_direction`, so a connector always leaves an
//!    object perpendicular to its edge before turning.
//! 2. Between the stubs the router runs a bounded search over a fixed list of
//!    strategies: `Direct` (straight, L and Z shapes), `SingleOffset` (one
//!    channel beside the blocking region) and `DoubleOffset` (two channels
//!    around a corner of the region). The blocking region starts as the union
//!    of whatever the direct route crossed and grows by the obstacles later
//!    candidates cross, for at most `max_route_attempts` rounds.
//! 3. Candidates are ranked by crossings of other objects, then crossings of
//!    the endpoint objects themselves, then bends, then length.
//!
//! ERROR HANDLING
//! ==============
//! Routing never fails. When no candidate clears every obstacle the best one
//! found is returned with a non-zero `crossings` count.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use serde::{Deserialize, Serialize};

use crate::connector::ResolvedConnectorEndpoint;
use crate::consts::{
    CONNECTOR_MAX_ROUTE_ATTEMPTS, CONNECTOR_MIN_SEGMENT_SIZE, CONNECTOR_OBSTACLE_CLEARANCE,
    GEOMETRY_EPSILON,
};
use crate::doc::ObjectId;
use crate::geometry::{Bounds, Point};

/// A non-connector object a route must not pass through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectorRoutingObstacle {
    pub object_id: ObjectId,
    pub bounds: Bounds,
}

/// A computed connector path, ready to draw.
///
/// Never mutated after routing; a recompute replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorRouteGeometry {
    /// Polyline from the `from` end to the `to` end. Always at least two
    /// points. Attached ends start and stop at their stub, clear of the object.
    pub points: Vec<Point>,
    /// Bounds of `points`, used to pick the connector itself.
    pub bounds: Bounds,
    /// Point halfway along the polyline, where the selection HUD sits.
    pub mid_point: Point,
    /// Direction the connector leaves its `from` end: the snapped anchor
    /// normal when attached, else the first segment's direction.
    pub start_direction: Point,
    /// Direction the connector arrives at its `to` end (the arrowhead
    /// orientation): into the object when attached, else along the last segment.
    pub end_direction: Point,
    /// Obstacle crossings left in a best-effort route; 0 when fully clear.
    pub crossings: usize,
}

/// Router tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterOptions {
    pub min_segment_size: f64,
    pub obstacle_clearance: f64,
    pub max_route_attempts: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            min_segment_size: CONNECTOR_MIN_SEGMENT_SIZE,
            obstacle_clearance: CONNECTOR_OBSTACLE_CLEARANCE,
            max_route_attempts: CONNECTOR_MAX_ROUTE_ATTEMPTS,
        }
    }
}

/// The fixed set of candidate generators, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStrategy {
    Direct,
    SingleOffset,
    DoubleOffset,
}

/// Ranking of a candidate path; lower is better, compared field by field.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
struct RouteScore {
    crossings: usize,
    self_crossings: usize,
    bends: usize,
    length: f64,
}

impl RouteScore {
    fn is_clear(&self) -> bool {
        self.crossings == 0 && self.self_crossings == 0
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    points: Vec<Point>,
    score: RouteScore,
    strategy: RouteStrategy,
}

/// Per-connector routing inputs, fixed for the duration of one search.
struct RouteContext<'a> {
    start: Point,
    start_stub: Point,
    start_attached: bool,
    end: Point,
    end_stub: Point,
    end_attached: bool,
    /// Obstacles other than the two endpoint objects.
    foreign: Vec<&'a ConnectorRoutingObstacle>,
    /// Bounds of the endpoint objects themselves.
    own: Vec<Bounds>,
}

impl<'a> RouteContext<'a> {
    fn new(
        from: &ResolvedConnectorEndpoint,
        to: &ResolvedConnectorEndpoint,
        obstacles: &'a [ConnectorRoutingObstacle],
        options: &RouterOptions,
    ) -> Self {
        let foreign = obstacles
            .iter()
            .filter(|o| Some(o.object_id) != from.object_id && Some(o.object_id) != to.object_id)
            .collect();
        let own = from.bounds.into_iter().chain(to.bounds).collect();
        Self {
            start: from.point(),
            start_stub: stub_point(from, options.min_segment_size),
            start_attached: from.direction.is_some(),
            end: to.point(),
            end_stub: stub_point(to, options.min_segment_size),
            end_attached: to.direction.is_some(),
            foreign,
            own,
        }
    }

    /// Clean up a stub-to-stub candidate. Never shorter than two points.
    fn assemble(&self, middle: &[Point]) -> Vec<Point> {
        let mut points = simplify(middle);
        while points.len() < 2 {
            points.push(self.end_stub);
        }
        points
    }

    fn score(&self, points: &[Point]) -> RouteScore {
        let mut crossings = 0;
        let mut self_crossings = 0;
        let mut length = 0.0;
        for seg in points.windows(2) {
            let (a, b) = (seg[0], seg[1]);
            length += a.distance_to(b);
            crossings += self.foreign.iter().filter(|o| o.bounds.intersects_segment(a, b)).count();
            self_crossings +=
                self.own.iter().filter(|bounds| bounds.intersects_segment(a, b)).count();
        }
        RouteScore { crossings, self_crossings, bends: points.len().saturating_sub(2), length }
    }

    /// Union of every object bounds the path passes through.
    fn blocking_bounds(&self, points: &[Point]) -> Option<Bounds> {
        let mut region: Option<Bounds> = None;
        for seg in points.windows(2) {
            let (a, b) = (seg[0], seg[1]);
            let foreign = self.foreign.iter().map(|o| o.bounds);
            for bounds in foreign.chain(self.own.iter().copied()) {
                if bounds.intersects_segment(a, b) {
                    region = Some(region.map_or(bounds, |r| r.union(&bounds)));
                }
            }
        }
        region
    }

    /// Grow `region` by the obstacles `points` crosses and by any foreign
    /// obstacle within `clearance` of it.
    fn grow_region(&self, region: Bounds, points: &[Point], clearance: f64) -> Bounds {
        let mut grown = self.blocking_bounds(points).map_or(region, |hit| region.union(&hit));
        let reach = grown.expand(clearance);
        for obstacle in &self.foreign {
            if obstacle.bounds.intersects(&reach) {
                grown = grown.union(&obstacle.bounds);
            }
        }
        grown
    }

    fn candidate_paths(&self, strategy: RouteStrategy, region: Option<&Bounds>) -> Vec<Vec<Point>> {
        let s = self.start_stub;
        let e = self.end_stub;
        match (strategy, region) {
            (RouteStrategy::Direct, _) => {
                let mx = (s.x + e.x) * 0.5;
                let my = (s.y + e.y) * 0.5;
                let mut paths = Vec::with_capacity(5);
                if (s.x - e.x).abs() <= GEOMETRY_EPSILON || (s.y - e.y).abs() <= GEOMETRY_EPSILON {
                    paths.push(vec![s, e]);
                }
                paths.push(vec![s, Point::new(e.x, s.y), e]);
                paths.push(vec![s, Point::new(s.x, e.y), e]);
                paths.push(vec![s, Point::new(mx, s.y), Point::new(mx, e.y), e]);
                paths.push(vec![s, Point::new(s.x, my), Point::new(e.x, my), e]);
                paths
            }
            (RouteStrategy::SingleOffset, Some(r)) => vec![
                vec![s, Point::new(s.x, r.top), Point::new(e.x, r.top), e],
                vec![s, Point::new(s.x, r.bottom), Point::new(e.x, r.bottom), e],
                vec![s, Point::new(r.left, s.y), Point::new(r.left, e.y), e],
                vec![s, Point::new(r.right, s.y), Point::new(r.right, e.y), e],
            ],
            (RouteStrategy::DoubleOffset, Some(r)) => {
                let mut paths = Vec::with_capacity(8);
                for y in [r.top, r.bottom] {
                    for x in [r.left, r.right] {
                        let (sy, ey) = (Point::new(s.x, y), Point::new(x, e.y));
                        paths.push(vec![s, sy, Point::new(x, y), ey, e]);
                        let (sx, ex) = (Point::new(x, s.y), Point::new(e.x, y));
                        paths.push(vec![s, sx, Point::new(x, y), ex, e]);
                    }
                }
                paths
            }
            (RouteStrategy::SingleOffset | RouteStrategy::DoubleOffset, None) => Vec::new(),
        }
    }

    /// Best candidate `strategy` produces around `region`, or `None` when the
    /// strategy has nothing to offer (offset strategies need a region).
    fn try_candidate_route(
        &self,
        strategy: RouteStrategy,
        region: Option<&Bounds>,
    ) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for middle in self.candidate_paths(strategy, region) {
            let points = self.assemble(&middle);
            let score = self.score(&points);
            if best.as_ref().is_none_or(|b| score < b.score) {
                best = Some(Candidate { points, score, strategy });
            }
        }
        best
    }
}

/// Route a connector between two resolved endpoints.
///
/// Obstacles belonging to either endpoint object are ignored for crossing
/// counts; the path only avoids running back through those objects.
#[must_use]
pub fn route_connector(
    from: &ResolvedConnectorEndpoint,
    to: &ResolvedConnectorEndpoint,
    obstacles: &[ConnectorRoutingObstacle],
    options: &RouterOptions,
) -> ConnectorRouteGeometry {
    let ctx = RouteContext::new(from, to, obstacles, options);

    if !ctx.start_attached && !ctx.end_attached {
        let points = vec![ctx.start, ctx.end];
        let score = ctx.score(&points);
        return finish(points, score.crossings, from, to);
    }

    let best = search(&ctx, options);
    tracing::trace!(
        strategy = ?best.strategy,
        crossings = best.score.crossings,
        bends = best.score.bends,
        "connector routed"
    );
    finish(best.points, best.score.crossings, from, to)
}

fn search(ctx: &RouteContext<'_>, options: &RouterOptions) -> Candidate {
    let direct = ctx.try_candidate_route(RouteStrategy::Direct, None);
    let mut best = direct.unwrap_or_else(|| {
        let points = ctx.assemble(&[ctx.start_stub, ctx.end_stub]);
        let score = ctx.score(&points);
        Candidate { points, score, strategy: RouteStrategy::Direct }
    });
    if best.score.is_clear() {
        return best;
    }

    let Some(mut region) = ctx.blocking_bounds(&best.points) else {
        return best;
    };
    for _ in 0..options.max_route_attempts {
        let channels = region.expand(options.obstacle_clearance);
        let mut round_best: Option<Candidate> = None;
        for strategy in [RouteStrategy::SingleOffset, RouteStrategy::DoubleOffset] {
            let Some(candidate) = ctx.try_candidate_route(strategy, Some(&channels)) else {
                continue;
            };
            if candidate.score.is_clear() {
                return candidate;
            }
            if round_best.as_ref().is_none_or(|b| candidate.score < b.score) {
                round_best = Some(candidate);
            }
        }
        let Some(round_best) = round_best else {
            break;
        };
        let grown = ctx.grow_region(region, &round_best.points, options.obstacle_clearance);
        if round_best.score < best.score {
            best = round_best;
        }
        if grown == region {
            break;
        }
        region = grown;
    }
    best
}

fn finish(
    points: Vec<Point>,
    crossings: usize,
    from: &ResolvedConnectorEndpoint,
    to: &ResolvedConnectorEndpoint,
) -> ConnectorRouteGeometry {
    let fallback = Point::new(1.0, 0.0);
    let start_direction = from
        .direction
        .map(Point::cardinal)
        .or_else(|| points.windows(2).find_map(|seg| seg[0].direction_to(seg[1])))
        .unwrap_or(fallback);
    let end_direction = to
        .direction
        .map(|d| Point::new(-d.x, -d.y).cardinal())
        .or_else(|| points.windows(2).rev().find_map(|seg| seg[0].direction_to(seg[1])))
        .unwrap_or(fallback);
    let bounds = Bounds::from_points(points.iter().copied())
        .unwrap_or(Bounds::new(from.x, from.x, from.y, from.y));
    let mid_point = polyline_midpoint(&points).unwrap_or(from.point());
    ConnectorRouteGeometry { points, bounds, mid_point, start_direction, end_direction, crossings }
}

/// Offset an attached endpoint out of its object.
///
/// The stub lies on the anchor's dominant axis, `min_segment_size` past the
/// anchor and at least that far past the object's bounds. Unattached
/// endpoints are their own stub.
fn stub_point(endpoint: &ResolvedConnectorEndpoint, min_segment_size: f64) -> Point {
    let p = endpoint.point();
    let Some(direction) = endpoint.direction else {
        return p;
    };
    let d = direction.cardinal();
    let mut stub = p.offset(d, min_segment_size);
    if let Some(b) = endpoint.bounds {
        if d.x > 0.0 {
            stub.x = stub.x.max(b.right + min_segment_size);
        } else if d.x < 0.0 {
            stub.x = stub.x.min(b.left - min_segment_size);
        } else if d.y > 0.0 {
            stub.y = stub.y.max(b.bottom + min_segment_size);
        } else {
            stub.y = stub.y.min(b.top - min_segment_size);
        }
    }
    stub
}

/// Drop repeated points and interior points that continue straight on.
///
/// The first and last points are always kept.
fn simplify(points: &[Point]) -> Vec<Point> {
    let mut deduped: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if deduped.last().is_none_or(|last| !last.approx_eq(p)) {
            deduped.push(p);
        }
    }
    if deduped.len() <= 2 {
        return deduped;
    }

    let mut out: Vec<Point> = Vec::with_capacity(deduped.len());
    out.push(deduped[0]);
    for i in 1..deduped.len() - 1 {
        let prev = out[out.len() - 1];
        let curr = deduped[i];
        let next = deduped[i + 1];
        let straight = match (prev.direction_to(curr), curr.direction_to(next)) {
            (Some(d1), Some(d2)) => d1.approx_eq(d2),
            _ => true,
        };
        if !straight {
            out.push(curr);
        }
    }
    out.push(deduped[deduped.len() - 1]);
    out
}

/// Point at half the polyline's length, or `None` for an empty input.
fn polyline_midpoint(points: &[Point]) -> Option<Point> {
    let first = *points.first()?;
    let total: f64 = points.windows(2).map(|seg| seg[0].distance_to(seg[1])).sum();
    if total <= GEOMETRY_EPSILON {
        return Some(first);
    }
    let half = total * 0.5;
    let mut walked = 0.0;
    for seg in points.windows(2) {
        let (a, b) = (seg[0], seg[1]);
        let len = a.distance_to(b);
        if walked + len >= half && len > 0.0 {
            let t = (half - walked) / len;
            return Some(Point::new((b.x - a.x).mul_add(t, a.x), (b.y - a.y).mul_add(t, a.y)));
        }
        walked += len;
    }
    points.last().copied()
}
