//! Connector endpoints: the stored draft form and its resolution against live
//! geometry.
//!
//! A connector object keeps its two endpoints in `props.a` (the `from` end) and
//! `props.b` (the `to` end). Each endpoint is either free-floating at explicit
//! coordinates or attached to another object's side. Attached endpoints keep
//! the last explicit coordinates only as a fallback for when the object they
//! point at has been deleted; while the object exists the endpoint position is
//! always re-derived from its current geometry.

#[cfg(test)]
#[path = "connector_test.rs"]
mod connector_test;

use serde::{Deserialize, Serialize};

use crate::doc::{BoardObject, GeometrySource, ObjectId};
use crate::geometry::{Bounds, ConnectorAnchor, ObjectGeometry, Point};

/// Props key holding the `from` endpoint.
pub const FROM_KEY: &str = "a";
/// Props key holding the `to` endpoint.
pub const TO_KEY: &str = "b";

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("object is not a connector: {0}")]
    NotAConnector(ObjectId),
    #[error("connector {id} has no `{key}` endpoint")]
    MissingEndpoint { id: ObjectId, key: &'static str },
    #[error("connector {id} has an invalid `{key}` endpoint: {source}")]
    InvalidEndpoint {
        id: ObjectId,
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// One end of a connector as stored on the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConnectorEndpoint {
    /// Free-floating at explicit board coordinates.
    Free { x: f64, y: f64 },
    /// Attached to a side of another object.
    ///
    /// With no `anchor` the side facing the opposite endpoint is used.
    /// `x` / `y` are the last explicit coordinates, used only if the object is gone.
    Attached {
        object_id: ObjectId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        anchor: Option<ConnectorAnchor>,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
}

impl ConnectorEndpoint {
    #[must_use]
    pub fn free(x: f64, y: f64) -> Self {
        Self::Free { x, y }
    }

    #[must_use]
    pub fn attached(object_id: ObjectId, anchor: Option<ConnectorAnchor>, x: f64, y: f64) -> Self {
        Self::Attached { object_id, anchor, x, y }
    }

    /// Bound object id, if any.
    #[must_use]
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Self::Free { .. } => None,
            Self::Attached { object_id, .. } => Some(*object_id),
        }
    }

    /// The stored coordinates: the position of a free endpoint, the fallback of
    /// an attached one.
    #[must_use]
    pub fn explicit_point(&self) -> Point {
        match *self {
            Self::Free { x, y } | Self::Attached { x, y, .. } => Point::new(x, y),
        }
    }
}

/// Both ends of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectorDraft {
    pub from: ConnectorEndpoint,
    pub to: ConnectorEndpoint,
}

impl ConnectorDraft {
    #[must_use]
    pub fn new(from: ConnectorEndpoint, to: ConnectorEndpoint) -> Self {
        Self { from, to }
    }

    /// Read the endpoints out of a connector object's props.
    ///
    /// # Errors
    ///
    /// Fails when the object is not a connector kind, or when either endpoint
    /// is missing or does not deserialize.
    pub fn from_object(obj: &BoardObject) -> Result<Self, ConnectorError> {
        if !obj.kind.is_connector() {
            return Err(ConnectorError::NotAConnector(obj.id));
        }
        let from = endpoint_from_props(obj, FROM_KEY)?;
        let to = endpoint_from_props(obj, TO_KEY)?;
        Ok(Self { from, to })
    }

    /// The props patch that stores this draft on a connector object.
    #[must_use]
    pub fn to_props(&self) -> serde_json::Value {
        serde_json::json!({
            "a": self.from,
            "b": self.to,
        })
    }

    /// Ids of the objects either end is attached to.
    pub fn bound_object_ids(&self) -> impl Iterator<Item = ObjectId> {
        self.from.object_id().into_iter().chain(self.to.object_id())
    }

    /// Whether either end is attached to `id`.
    #[must_use]
    pub fn is_bound_to(&self, id: &ObjectId) -> bool {
        self.bound_object_ids().any(|bound| bound == *id)
    }
}

fn endpoint_from_props(
    obj: &BoardObject,
    key: &'static str,
) -> Result<ConnectorEndpoint, ConnectorError> {
    let Some(value) = obj.props.get(key) else {
        return Err(ConnectorError::MissingEndpoint { id: obj.id, key });
    };
    ConnectorEndpoint::deserialize(value)
        .map_err(|source| ConnectorError::InvalidEndpoint { id: obj.id, key, source })
}

/// A connector endpoint resolved against current geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConnectorEndpoint {
    pub x: f64,
    pub y: f64,
    /// Bound object, present only when it still exists.
    pub object_id: Option<ObjectId>,
    pub anchor: Option<ConnectorAnchor>,
    /// Outward unit vector at the anchor, used to route the first leg.
    pub direction: Option<Point>,
    pub connected: bool,
    /// Rotation-aware bounds of the bound object.
    pub bounds: Option<Bounds>,
}

impl ResolvedConnectorEndpoint {
    /// An endpoint not attached to anything.
    #[must_use]
    pub fn unconnected(p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            object_id: None,
            anchor: None,
            direction: None,
            connected: false,
            bounds: None,
        }
    }

    fn anchored(object_id: ObjectId, geometry: &ObjectGeometry, anchor: ConnectorAnchor) -> Self {
        let p = geometry.anchor_point(anchor);
        Self {
            x: p.x,
            y: p.y,
            object_id: Some(object_id),
            anchor: Some(anchor),
            direction: Some(geometry.anchor_direction(anchor)),
            connected: true,
            bounds: Some(geometry.bounds()),
        }
    }

    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Resolve both ends of a connector against the geometry in `source`.
///
/// An endpoint attached to an object that no longer exists resolves as
/// unconnected at its stored fallback coordinates. Auto anchors face the
/// other end: its object's center when that end is attached, otherwise its
/// point.
pub fn resolve_connector<S>(
    draft: &ConnectorDraft,
    source: &S,
) -> (ResolvedConnectorEndpoint, ResolvedConnectorEndpoint)
where
    S: GeometrySource + ?Sized,
{
    let from_geom = draft.from.object_id().and_then(|id| source.geometry(&id));
    let to_geom = draft.to.object_id().and_then(|id| source.geometry(&id));

    let from_ref = from_geom.map_or_else(|| draft.from.explicit_point(), |g| g.center());
    let to_ref = to_geom.map_or_else(|| draft.to.explicit_point(), |g| g.center());

    let from = resolve_endpoint(&draft.from, from_geom.as_ref(), to_ref);
    let to = resolve_endpoint(&draft.to, to_geom.as_ref(), from_ref);
    (from, to)
}

fn resolve_endpoint(
    endpoint: &ConnectorEndpoint,
    geometry: Option<&ObjectGeometry>,
    facing: Point,
) -> ResolvedConnectorEndpoint {
    match (endpoint, geometry) {
        (ConnectorEndpoint::Attached { object_id, anchor, .. }, Some(geometry)) => {
            let anchor = anchor.unwrap_or_else(|| geometry.anchor_facing(facing));
            ResolvedConnectorEndpoint::anchored(*object_id, geometry, anchor)
        }
        (ConnectorEndpoint::Attached { object_id, .. }, None) => {
            tracing::trace!(%object_id, "attached object missing, using fallback point");
            ResolvedConnectorEndpoint::unconnected(endpoint.explicit_point())
        }
        (ConnectorEndpoint::Free { .. }, _) => {
            ResolvedConnectorEndpoint::unconnected(endpoint.explicit_point())
        }
    }
}
