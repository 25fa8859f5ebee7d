//! Route keys: cache keys summarising every input that can change a
//! connector's computed path.
//!
//! Coordinates are rounded to one decimal before they enter a key, so
//! sub-pixel jitter during a drag keeps hitting the cache while any move of a
//! tenth of a unit or more produces a new key.

#[cfg(test)]
#[path = "route_key_test.rs"]
mod route_key_test;

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::connector::ResolvedConnectorEndpoint;
use crate::doc::{GeometrySource, ObjectId};
use crate::geometry::{Bounds, ObjectGeometry};
use crate::router::ConnectorRoutingObstacle;

/// Round to one decimal. Negative zero folds into zero so `-0.04` and `0.04`
/// share a key.
#[must_use]
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0 + 0.0
}

/// Rounded `x,y,width,height,rotation` of an object.
#[must_use]
pub fn geometry_signature(g: &ObjectGeometry) -> String {
    format!(
        "{:.1},{:.1},{:.1},{:.1},{:.1}",
        round1(g.x),
        round1(g.y),
        round1(g.width),
        round1(g.height),
        round1(g.rotation_deg)
    )
}

fn bounds_signature(b: &Bounds) -> String {
    format!(
        "{:.1},{:.1},{:.1},{:.1}",
        round1(b.left),
        round1(b.right),
        round1(b.top),
        round1(b.bottom)
    )
}

/// Digest of the obstacle set a route has to avoid.
///
/// Obstacles are sorted by id first, so the digest does not depend on the
/// order the caller collected them in.
#[must_use]
pub fn obstacle_signature(obstacles: &[ConnectorRoutingObstacle]) -> String {
    let mut sorted: Vec<&ConnectorRoutingObstacle> = obstacles.iter().collect();
    sorted.sort_by_key(|o| o.object_id);

    let mut hasher = DefaultHasher::new();
    for obstacle in &sorted {
        obstacle.object_id.hash(&mut hasher);
        bounds_signature(&obstacle.bounds).hash(&mut hasher);
    }
    format!("{}:{:016x}", sorted.len(), hasher.finish())
}

fn push_endpoint<S>(key: &mut String, endpoint: &ResolvedConnectorEndpoint, source: &S)
where
    S: GeometrySource + ?Sized,
{
    match endpoint.object_id {
        Some(id) => key.push_str(&id.to_string()),
        None => key.push('-'),
    }
    key.push(':');
    key.push_str(endpoint.anchor.map_or("-", |a| a.as_str()));
    key.push_str(&format!("@{:.1},{:.1}#", round1(endpoint.x), round1(endpoint.y)));
    match endpoint.object_id.and_then(|id| source.geometry(&id)) {
        Some(g) => key.push_str(&geometry_signature(&g)),
        None => key.push('-'),
    }
}

/// Build the cache key for one connector.
///
/// The key covers the connector id, both endpoints (bound object, anchor and
/// rounded position), the rounded geometry of each bound object, and the
/// caller's obstacle signature.
#[must_use]
pub fn build_route_key<S>(
    connector_id: &ObjectId,
    from: &ResolvedConnectorEndpoint,
    to: &ResolvedConnectorEndpoint,
    source: &S,
    obstacle_signature: &str,
) -> String
where
    S: GeometrySource + ?Sized,
{
    let mut key = String::with_capacity(192);
    key.push_str(&connector_id.to_string());
    key.push('|');
    push_endpoint(&mut key, from, source);
    key.push('|');
    push_endpoint(&mut key, to, source);
    key.push('|');
    key.push_str(obstacle_signature);
    key
}
