//! Geometry primitives: board points, axis-aligned bounds, rotated object
//! geometry and the anchor sides connectors attach to.
//!
//! Everything here is plain `Copy` data and pure functions. Object geometry is
//! owned by the board's object store; the routing engine works on copies of it
//! taken at the start of each tick.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::GEOMETRY_EPSILON;

/// A point in board space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Move `distance` units along `direction` (expected to be a unit vector).
    #[must_use]
    pub fn offset(self, direction: Point, distance: f64) -> Self {
        Self { x: direction.x.mul_add(distance, self.x), y: direction.y.mul_add(distance, self.y) }
    }

    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Whether both coordinates match within [`GEOMETRY_EPSILON`].
    #[must_use]
    pub fn approx_eq(self, other: Point) -> bool {
        (self.x - other.x).abs() <= GEOMETRY_EPSILON && (self.y - other.y).abs() <= GEOMETRY_EPSILON
    }

    /// Unit vector from `self` toward `other`, or `None` when they coincide.
    #[must_use]
    pub fn direction_to(self, other: Point) -> Option<Point> {
        let len = self.distance_to(other);
        if len <= GEOMETRY_EPSILON {
            return None;
        }
        Some(Point::new((other.x - self.x) / len, (other.y - self.y) / len))
    }

    /// Snap a direction vector onto its dominant axis.
    ///
    /// Ties favour the horizontal axis. The zero vector snaps to `+x`.
    #[must_use]
    pub fn cardinal(self) -> Point {
        if self.x.abs() >= self.y.abs() {
            Point::new(if self.x < 0.0 { -1.0 } else { 1.0 }, 0.0)
        } else {
            Point::new(0.0, if self.y < 0.0 { -1.0 } else { 1.0 })
        }
    }
}

/// Axis-aligned bounds in board space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self { left, right, top, bottom }
    }

    /// Smallest bounds containing every point, or `None` for an empty input.
    #[must_use]
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(first.x, first.x, first.y, first.y);
        for p in iter {
            bounds.left = bounds.left.min(p.x);
            bounds.right = bounds.right.max(p.x);
            bounds.top = bounds.top.min(p.y);
            bounds.bottom = bounds.bottom.max(p.y);
        }
        Some(bounds)
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Inclusive overlap test; bounds that share only an edge still overlap.
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.left <= other.right
            && self.right >= other.left
            && self.top <= other.bottom
            && self.bottom >= other.top
    }

    /// Grow every side outward by `margin`.
    #[must_use]
    pub fn expand(&self, margin: f64) -> Self {
        Self::new(self.left - margin, self.right + margin, self.top - margin, self.bottom + margin)
    }

    #[must_use]
    pub fn union(&self, other: &Bounds) -> Self {
        Self::new(
            self.left.min(other.left),
            self.right.max(other.right),
            self.top.min(other.top),
            self.bottom.max(other.bottom),
        )
    }

    /// Whether the segment `a`-`b` passes through the interior of these bounds.
    ///
    /// Strict: a segment that only runs along an edge or touches a corner does
    /// not intersect. Uses Liang-Barsky clipping, so any segment orientation
    /// works.
    #[must_use]
    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;

        let edges = [
            (-dx, a.x - self.left),
            (dx, self.right - a.x),
            (-dy, a.y - self.top),
            (dy, self.bottom - a.y),
        ];
        for (p, q) in edges {
            if p.abs() <= f64::EPSILON {
                // Parallel to this edge: outside or on the boundary line.
                if q <= GEOMETRY_EPSILON {
                    return false;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return false;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return false;
                }
                t1 = t1.min(r);
            }
        }
        t1 - t0 > GEOMETRY_EPSILON
    }
}

/// Shortest distance from `p` to the segment `a`-`b`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx.mul_add(dx, dy * dy);
    if len_sq <= f64::EPSILON {
        return p.distance_to(a);
    }
    let t = ((p.x - a.x).mul_add(dx, (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(dx.mul_add(t, a.x), dy.mul_add(t, a.y)))
}

/// Side of an object where a connector leg attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorAnchor {
    Top,
    Right,
    Bottom,
    Left,
}

impl ConnectorAnchor {
    /// Wire name, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    /// Outward normal of this side on an unrotated object.
    #[must_use]
    pub fn normal(self) -> Point {
        match self {
            Self::Top => Point::new(0.0, -1.0),
            Self::Right => Point::new(1.0, 0.0),
            Self::Bottom => Point::new(0.0, 1.0),
            Self::Left => Point::new(-1.0, 0.0),
        }
    }
}

/// Canonical per-object shape state.
///
/// `x` / `y` is the top-left corner of the unrotated box. `rotation_deg` is a
/// clockwise rotation around the box center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation_deg: f64,
}

impl ObjectGeometry {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64, rotation_deg: f64) -> Self {
        Self { x, y, width, height, rotation_deg }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Rotate a vector from the object's local frame into board space.
    fn rotate(&self, local: Point) -> Point {
        if self.rotation_deg.abs() <= f64::EPSILON {
            return local;
        }
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        Point::new(local.x.mul_add(cos, -(local.y * sin)), local.x.mul_add(sin, local.y * cos))
    }

    /// Rotate a board-space vector into the object's local frame.
    fn unrotate(&self, v: Point) -> Point {
        if self.rotation_deg.abs() <= f64::EPSILON {
            return v;
        }
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        Point::new(v.x.mul_add(cos, v.y * sin), v.y.mul_add(cos, -(v.x * sin)))
    }

    /// The four corners in board space, clockwise from the local top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        let c = self.center();
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        let local = [
            Point::new(-hw, -hh),
            Point::new(hw, -hh),
            Point::new(hw, hh),
            Point::new(-hw, hh),
        ];
        local.map(|p| {
            let r = self.rotate(p);
            Point::new(c.x + r.x, c.y + r.y)
        })
    }

    /// Axis-aligned bounds of the rotated box.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        if self.rotation_deg.abs() <= f64::EPSILON {
            return Bounds::new(self.x, self.x + self.width, self.y, self.y + self.height);
        }
        let [a, b, c, d] = self.corners();
        Bounds::new(
            a.x.min(b.x).min(c.x).min(d.x),
            a.x.max(b.x).max(c.x).max(d.x),
            a.y.min(b.y).min(c.y).min(d.y),
            a.y.max(b.y).max(c.y).max(d.y),
        )
    }

    /// Midpoint of the given side, in board space.
    #[must_use]
    pub fn anchor_point(&self, anchor: ConnectorAnchor) -> Point {
        let n = anchor.normal();
        let local = Point::new(n.x * self.width * 0.5, n.y * self.height * 0.5);
        let r = self.rotate(local);
        let c = self.center();
        Point::new(c.x + r.x, c.y + r.y)
    }

    /// Outward unit normal of the given side, in board space.
    #[must_use]
    pub fn anchor_direction(&self, anchor: ConnectorAnchor) -> Point {
        self.rotate(anchor.normal())
    }

    /// The side whose outward normal best faces `target`.
    ///
    /// Offsets are normalised by the half extents so wide shapes still pick a
    /// top/bottom side for targets that sit mostly above or below them.
    #[must_use]
    pub fn anchor_facing(&self, target: Point) -> ConnectorAnchor {
        let c = self.center();
        let local = self.unrotate(Point::new(target.x - c.x, target.y - c.y));
        let nx = local.x / (self.width * 0.5).max(GEOMETRY_EPSILON);
        let ny = local.y / (self.height * 0.5).max(GEOMETRY_EPSILON);
        if nx.abs() >= ny.abs() {
            if nx < 0.0 { ConnectorAnchor::Left } else { ConnectorAnchor::Right }
        } else if ny < 0.0 {
            ConnectorAnchor::Top
        } else {
            ConnectorAnchor::Bottom
        }
    }
}
