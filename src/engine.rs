//! Routing engine: the per-board owner of the route cache, the scheduler
//! cursor and the dirty set.
//!
//! DESIGN
//! ======
//! One engine is created per board session and driven from a single thread.
//! Mutations (local drags or remote broadcasts) mark connectors dirty; each
//! animation tick then recomputes a budgeted subset against snapshots taken at
//! the start of the tick. A connector whose inputs change again before its
//! turn simply routes against the newer snapshot when it is picked.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here is fatal. Malformed connectors are logged, lose their cached
//! route and are skipped until their props change. Missing objects resolve
//! to unconnected endpoints. A route that cannot clear every obstacle is
//! stored as best effort.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, trace, warn};

use crate::config::RoutingConfig;
use crate::connector::{ConnectorDraft, resolve_connector};
use crate::doc::{BoardObject, DocStore, ObjectId, PartialBoardObject};
use crate::geometry::{Bounds, Point};
use crate::hit::{HitTarget, client_hit_target};
use crate::route_cache::RouteCache;
use crate::route_key::{build_route_key, obstacle_signature};
use crate::router::{ConnectorRouteGeometry, RouterOptions, route_connector};
use crate::scheduler::{DirtyConnectorEntry, RecomputeScheduler};
use crate::viewport::Viewport;

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Connectors the scheduler picked.
    pub selected: usize,
    /// Connectors that got a freshly computed route, in processing order.
    pub recomputed: Vec<ObjectId>,
    /// Picked connectors whose route key still matched the cache.
    pub cache_hits: usize,
    /// Picked connectors that were deleted or malformed.
    pub skipped: usize,
    /// Connectors still dirty after the tick.
    pub pending: usize,
}

/// Connector routing state for one board session.
#[derive(Debug)]
pub struct RoutingEngine {
    config: RoutingConfig,
    options: RouterOptions,
    cache: RouteCache,
    scheduler: RecomputeScheduler,
    /// Dirty connectors and their priority flag, in id order so round-robin
    /// order is stable between ticks.
    dirty: BTreeMap<ObjectId, bool>,
    /// Connectors whose props failed to parse; not re-queued until marked dirty.
    malformed: HashSet<ObjectId>,
}

impl Default for RoutingEngine {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

impl RoutingEngine {
    #[must_use]
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            options: config.router_options(),
            config,
            cache: RouteCache::new(),
            scheduler: RecomputeScheduler::new(),
            dirty: BTreeMap::new(),
            malformed: HashSet::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    /// Latest route for a connector, possibly computed under an older key.
    #[must_use]
    pub fn route(&self, connector_id: &ObjectId) -> Option<&ConnectorRouteGeometry> {
        self.cache.latest(connector_id)
    }

    /// Number of connectors waiting for a recompute.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.dirty.len()
    }

    #[must_use]
    pub fn is_dirty(&self, connector_id: &ObjectId) -> bool {
        self.dirty.contains_key(connector_id)
    }

    // --- Dirty tracking ---

    /// Queue a connector for recompute. Priority is sticky until the connector
    /// is processed.
    pub fn mark_dirty(&mut self, connector_id: ObjectId, priority: bool) {
        self.malformed.remove(&connector_id);
        let entry = self.dirty.entry(connector_id).or_insert(false);
        *entry |= priority;
    }

    /// Mark the connectors affected by a geometry change of `object_id`.
    ///
    /// Connectors attached to the object are urgent. Connectors whose latest
    /// route crosses the object's new bounds, passes near its previous bounds,
    /// or was left with unresolved crossings are queued at normal priority.
    /// Returns how many connectors were marked.
    pub fn mark_object_changed(
        &mut self,
        doc: &DocStore,
        object_id: &ObjectId,
        previous: Option<Bounds>,
    ) -> usize {
        let current = doc.get(object_id).map(|o| o.geometry().bounds());
        let near_previous = previous.map(|b| b.expand(self.config.obstacle_clearance));

        let mut marks: Vec<(ObjectId, bool)> = Vec::new();
        for conn in doc.connectors() {
            if conn.id == *object_id {
                marks.push((conn.id, true));
                continue;
            }
            let attached =
                ConnectorDraft::from_object(conn).is_ok_and(|draft| draft.is_bound_to(object_id));
            if attached {
                marks.push((conn.id, true));
                continue;
            }
            let Some(route) = self.cache.latest(&conn.id) else {
                continue;
            };
            let crosses_current = current.is_some_and(|b| route_crosses(route, &b));
            let near_old = near_previous.is_some_and(|b| route.bounds.intersects(&b));
            if crosses_current || near_old || route.crossings > 0 {
                marks.push((conn.id, false));
            }
        }

        let marked = marks.len();
        for (id, priority) in marks {
            self.mark_dirty(id, priority);
        }
        trace!(%object_id, marked, "object change marked connectors dirty");
        marked
    }

    // --- Document mutations ---

    /// Insert an object and mark what it affects.
    pub fn apply_create(&mut self, doc: &mut DocStore, object: BoardObject) {
        let id = object.id;
        let is_connector = object.kind.is_connector();
        doc.insert(object);
        if is_connector {
            self.mark_dirty(id, true);
        } else {
            self.mark_object_changed(doc, &id, None);
        }
    }

    /// Apply a partial update and mark what it affects. Returns false if the
    /// update was rejected by the store.
    pub fn apply_update(
        &mut self,
        doc: &mut DocStore,
        id: &ObjectId,
        fields: &PartialBoardObject,
    ) -> bool {
        let previous = doc.get(id).map(|o| (o.kind, o.geometry().bounds()));
        if !doc.apply_partial(id, fields) {
            return false;
        }
        match previous {
            Some((kind, _)) if kind.is_connector() => self.mark_dirty(*id, true),
            Some((_, bounds)) if fields.touches_geometry() => {
                self.mark_object_changed(doc, id, Some(bounds));
            }
            _ => {}
        }
        true
    }

    /// Remove an object and mark what it affects. Deleting a connector drops
    /// its cached route immediately; connectors attached to a deleted shape
    /// fall back to their stored coordinates on the next tick.
    pub fn apply_delete(&mut self, doc: &mut DocStore, id: &ObjectId) -> Option<BoardObject> {
        let removed = doc.remove(id)?;
        if removed.kind.is_connector() {
            self.cleanup(doc);
        } else {
            self.mark_object_changed(doc, id, Some(removed.geometry().bounds()));
        }
        Some(removed)
    }

    /// Replace the whole board, e.g. on join or reconnect. Routes of
    /// connectors that are gone are dropped and every remaining connector is
    /// queued, since any of its inputs may have changed.
    pub fn load_snapshot(&mut self, doc: &mut DocStore, objects: Vec<BoardObject>) {
        doc.load_snapshot(objects);
        self.cleanup(doc);
        let ids: Vec<ObjectId> = doc.connectors().iter().map(|c| c.id).collect();
        for id in ids {
            self.mark_dirty(id, false);
        }
        debug!(objects = doc.len(), queued = self.dirty.len(), "board snapshot loaded");
    }

    // --- Tick ---

    /// Recompute a budgeted subset of dirty connectors.
    ///
    /// Connectors in the store that have never been routed are queued
    /// automatically. Obstacles are snapshotted once per tick.
    pub fn tick(&mut self, doc: &DocStore) -> TickReport {
        for conn in doc.connectors() {
            if !self.cache.contains(&conn.id) && !self.malformed.contains(&conn.id) {
                self.dirty.entry(conn.id).or_insert(false);
            }
        }
        if self.dirty.is_empty() {
            return TickReport::default();
        }

        let entries: Vec<DirtyConnectorEntry> = self
            .dirty
            .iter()
            .map(|(id, priority)| DirtyConnectorEntry {
                connector_id: *id,
                priority: *priority,
                has_cached_route: self.cache.contains(id),
            })
            .collect();
        let selected = self.scheduler.select(&entries, self.config.budget);

        let obstacles = doc.obstacles();
        let signature = obstacle_signature(&obstacles);

        let mut report = TickReport { selected: selected.len(), ..TickReport::default() };
        for id in selected {
            self.dirty.remove(&id);
            let Some(obj) = doc.get(&id) else {
                trace!(connector_id = %id, "dirty connector no longer in store");
                report.skipped += 1;
                continue;
            };
            let draft = match ConnectorDraft::from_object(obj) {
                Ok(draft) => draft,
                Err(e) => {
                    warn!(connector_id = %id, error = %e, "skipping malformed connector");
                    self.malformed.insert(id);
                    self.cache.remove(&id);
                    report.skipped += 1;
                    continue;
                }
            };

            let (from, to) = resolve_connector(&draft, doc);
            let key = build_route_key(&id, &from, &to, doc, &signature);
            if self.cache.get(&id, &key).is_some() {
                report.cache_hits += 1;
                continue;
            }

            let route = route_connector(&from, &to, &obstacles, &self.options);
            if route.crossings > 0 {
                debug!(
                    connector_id = %id,
                    crossings = route.crossings,
                    "connector routed best effort"
                );
            }
            trace!(connector_id = %id, points = route.points.len(), "connector recomputed");
            self.cache.set(id, key, route);
            report.recomputed.push(id);
        }

        report.pending = self.dirty.len();
        debug!(
            selected = report.selected,
            recomputed = report.recomputed.len(),
            cache_hits = report.cache_hits,
            skipped = report.skipped,
            pending = report.pending,
            "connector routing tick"
        );
        report
    }

    /// Drop cached routes and queued work for connectors no longer in `doc`.
    /// Returns how many cache entries were removed.
    pub fn cleanup(&mut self, doc: &DocStore) -> usize {
        let active: HashSet<ObjectId> = doc.connectors().iter().map(|c| c.id).collect();
        let removed = self.cache.cleanup(&active);
        self.dirty.retain(|id, _| active.contains(id));
        self.malformed.retain(|id| active.contains(id));
        if removed > 0 {
            debug!(removed, remaining = self.cache.len(), "route cache cleaned up");
        }
        removed
    }

    /// Forget all cached routes and queued work, e.g. when the board closes.
    pub fn reset(&mut self) {
        self.cache = RouteCache::new();
        self.scheduler.reset();
        self.dirty.clear();
        self.malformed.clear();
    }

    // --- Queries ---

    /// Topmost object or connector under a client-space pointer position.
    #[must_use]
    pub fn hit_test(&self, doc: &DocStore, viewport: &Viewport, client: Point) -> HitTarget {
        client_hit_target(doc, &self.cache, viewport, client, self.config.hit_slop_px)
    }
}

fn route_crosses(route: &ConnectorRouteGeometry, bounds: &Bounds) -> bool {
    route.bounds.intersects(bounds)
        && route.points.windows(2).any(|seg| bounds.intersects_segment(seg[0], seg[1]))
}
