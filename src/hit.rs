//! Hit testing: which object or connector sits under a pointer.
//!
//! Objects are scanned topmost first. Connectors are hit within a slop
//! distance of their latest route; the slop is given in screen pixels and
//! shrinks on the board as the viewport zooms in.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::{BoardObject, DocStore, ObjectId};
use crate::geometry::{Bounds, Point, distance_to_segment};
use crate::route_cache::RouteCache;
use crate::router::ConnectorRouteGeometry;
use crate::viewport::{Viewport, project_client_to_board};

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A shape (anything that is not a connector).
    Object(ObjectId),
    /// A connector path.
    Connector(ObjectId),
    /// Nothing under the pointer.
    Canvas,
}

impl HitTarget {
    /// Id of the hit object or connector; `None` for a canvas miss.
    #[must_use]
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) | Self::Connector(id) => Some(*id),
            Self::Canvas => None,
        }
    }
}

/// Whether `point` falls inside an object's bounds.
#[must_use]
pub fn is_object_selectable(bounds: &Bounds, point: Point) -> bool {
    bounds.contains(point)
}

/// Whether `point` lies within `slop` of any segment of a routed path.
#[must_use]
pub fn is_connector_hit(route: &ConnectorRouteGeometry, point: Point, slop: f64) -> bool {
    if !route.bounds.expand(slop).contains(point) {
        return false;
    }
    route
        .points
        .windows(2)
        .any(|seg| distance_to_segment(point, seg[0], seg[1]) <= slop)
}

/// Topmost object or connector under `point` (board space).
///
/// `objects` must be in paint order (bottom first); the scan runs in reverse
/// so the last-drawn match wins. Connectors are tested against their latest
/// cached route and are skipped until they have one.
#[must_use]
pub fn object_hit_target(
    objects: &[&BoardObject],
    routes: &RouteCache,
    point: Point,
    slop: f64,
) -> HitTarget {
    for obj in objects.iter().rev() {
        if obj.kind.is_connector() {
            let Some(route) = routes.latest(&obj.id) else {
                continue;
            };
            if is_connector_hit(route, point, slop) {
                return HitTarget::Connector(obj.id);
            }
        } else if is_object_selectable(&obj.geometry().bounds(), point) {
            return HitTarget::Object(obj.id);
        }
    }
    HitTarget::Canvas
}

/// Hit test a client-space pointer position.
///
/// The pointer is projected through the viewport and the screen-space
/// `slop_px` is converted to board units at the current scale.
#[must_use]
pub fn client_hit_target(
    doc: &DocStore,
    routes: &RouteCache,
    viewport: &Viewport,
    client: Point,
    slop_px: f64,
) -> HitTarget {
    let point = project_client_to_board(client, viewport);
    let slop = viewport.screen_dist_to_board(slop_px);
    object_hit_target(&doc.sorted_objects(), routes, point, slop)
}
