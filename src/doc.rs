//! Document model: board objects as the router sees them, and the in-memory
//! store that owns them.
//!
//! The board's object store is the single owner of object geometry. This
//! module defines a snapshot-oriented view of it: `BoardObject` carries the
//! geometry fields plus the open `props` bag where connector endpoints live,
//! and `DocStore` keeps the live set keyed by id. The routing engine only ever
//! reads from the store through the [`GeometrySource`] seam or by copying
//! objects out at the start of a tick.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::ObjectGeometry;
use crate::router::ConnectorRoutingObstacle;

/// Unique identifier for a board object.
pub type ObjectId = Uuid;

/// The kind of a board object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Rect,
    Text,
    /// Container drawn behind its children; never blocks a route.
    Frame,
    Ellipse,
    Diamond,
    Star,
    /// Connector drawn as a plain path.
    Line,
    /// Connector drawn with an arrowhead at its `b` end.
    Arrow,
}

impl ObjectKind {
    /// Whether objects of this kind are connectors routed by the engine.
    #[must_use]
    pub fn is_connector(self) -> bool {
        matches!(self, Self::Line | Self::Arrow)
    }

    /// Whether objects of this kind are obstacles that routes must avoid.
    #[must_use]
    pub fn is_obstacle(self) -> bool {
        !self.is_connector() && self != Self::Frame
    }
}

/// A board object as stored in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    /// Left edge of the unrotated bounding box in board coordinates.
    pub x: f64,
    /// Top edge of the unrotated bounding box in board coordinates.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the bounding-box center.
    pub rotation: f64,
    /// Stacking order; lower values are drawn beneath higher values.
    pub z_index: i64,
    /// Open-ended per-kind properties. Connectors keep their endpoints under
    /// `a` and `b`.
    pub props: serde_json::Value,
}

impl BoardObject {
    /// Copy of this object's geometry.
    #[must_use]
    pub fn geometry(&self) -> ObjectGeometry {
        ObjectGeometry::new(self.x, self.y, self.width, self.height, self.rotation)
    }
}

/// Sparse update for a board object. Only present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialBoardObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    /// Props keys to merge or remove (null values delete keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Value>,
}

impl PartialBoardObject {
    /// Whether applying this update can move or resize the object.
    #[must_use]
    pub fn touches_geometry(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.rotation.is_some()
    }
}

/// Read-only access to current object geometry, keyed by object id.
///
/// This is the seam to the board's object store. Implementations hand out
/// copies, so nothing the router does can mutate live geometry. Connectors
/// themselves have no anchorable geometry.
pub trait GeometrySource {
    fn geometry(&self, id: &ObjectId) -> Option<ObjectGeometry>;
}

impl GeometrySource for HashMap<ObjectId, ObjectGeometry> {
    fn geometry(&self, id: &ObjectId) -> Option<ObjectGeometry> {
        self.get(id).copied()
    }
}

/// In-memory store of board objects.
#[derive(Debug, Default)]
pub struct DocStore {
    objects: HashMap<ObjectId, BoardObject>,
}

impl DocStore {
    #[must_use]
    pub fn new() -> Self {
        Self { objects: HashMap::new() }
    }

    /// Insert or replace an object.
    pub fn insert(&mut self, obj: BoardObject) {
        self.objects.insert(obj.id, obj);
    }

    /// Remove an object by id, returning it if it was present.
    pub fn remove(&mut self, id: &ObjectId) -> Option<BoardObject> {
        self.objects.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&BoardObject> {
        self.objects.get(id)
    }

    /// Apply a partial update to an existing object. Returns false if the
    /// object doesn't exist or the props patch is not a JSON object.
    pub fn apply_partial(&mut self, id: &ObjectId, partial: &PartialBoardObject) -> bool {
        let Some(obj) = self.objects.get_mut(id) else {
            return false;
        };
        if let Some(ref props) = partial.props {
            let Some(incoming) = props.as_object() else {
                return false;
            };
            if !obj.props.is_object() {
                obj.props = serde_json::json!({});
            }
            if let Some(existing) = obj.props.as_object_mut() {
                for (k, v) in incoming {
                    if v.is_null() {
                        existing.remove(k);
                    } else {
                        existing.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        if let Some(x) = partial.x {
            obj.x = x;
        }
        if let Some(y) = partial.y {
            obj.y = y;
        }
        if let Some(w) = partial.width {
            obj.width = w;
        }
        if let Some(h) = partial.height {
            obj.height = h;
        }
        if let Some(r) = partial.rotation {
            obj.rotation = r;
        }
        if let Some(z) = partial.z_index {
            obj.z_index = z;
        }
        true
    }

    /// Replace all objects with a full snapshot.
    pub fn load_snapshot(&mut self, objects: Vec<BoardObject>) {
        self.objects.clear();
        for obj in objects {
            self.objects.insert(obj.id, obj);
        }
    }

    /// All objects sorted by `(z_index, id)`, i.e. paint order.
    #[must_use]
    pub fn sorted_objects(&self) -> Vec<&BoardObject> {
        let mut objs: Vec<&BoardObject> = self.objects.values().collect();
        objs.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        objs
    }

    /// Connector objects, in id order.
    #[must_use]
    pub fn connectors(&self) -> Vec<&BoardObject> {
        let mut out: Vec<&BoardObject> =
            self.objects.values().filter(|o| o.kind.is_connector()).collect();
        out.sort_by_key(|o| o.id);
        out
    }

    /// Snapshot of every object a route must avoid.
    #[must_use]
    pub fn obstacles(&self) -> Vec<ConnectorRoutingObstacle> {
        let mut out: Vec<ConnectorRoutingObstacle> = self
            .objects
            .values()
            .filter(|o| o.kind.is_obstacle())
            .map(|o| ConnectorRoutingObstacle { object_id: o.id, bounds: o.geometry().bounds() })
            .collect();
        out.sort_by_key(|o| o.object_id);
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl GeometrySource for DocStore {
    fn geometry(&self, id: &ObjectId) -> Option<ObjectGeometry> {
        self.objects
            .get(id)
            .filter(|o| !o.kind.is_connector())
            .map(BoardObject::geometry)
    }
}
